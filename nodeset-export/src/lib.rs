// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Export a subgraph of an OPC UA server's address space into a NodeSet2
//! XML document that any compliant server can load back.
//!
//! The exporter browses the server from one or more starting nodes, reads
//! classes, attributes and references in batches, rewrites the references
//! into a self-consistent set and emits one XML element per node. The
//! server itself stays behind the [`ServerAdapter`] trait; this crate ships
//! no transport.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::str::FromStr;
//!
//! use nodeset_export::{
//!     browse_all, export_nodeset_from_client, ExportTarget, Options, ServerAdapter,
//! };
//! use nodeset_types::ExpandedNodeId;
//!
//! fn run(adapter: &mut (impl ServerAdapter + Clone)) -> Result<(), Box<dyn std::error::Error>> {
//!     let options = Options::default();
//!     let start = ExpandedNodeId::from_str("ns=2;s=Plant")?;
//!     let collected = browse_all(&mut adapter.clone(), &start, &options.ignored_node_classes())?;
//!     let mut node_ids = BTreeMap::new();
//!     node_ids.insert("plant".to_owned(), collected);
//!     export_nodeset_from_client(
//!         adapter.clone(),
//!         &node_ids,
//!         ExportTarget::File("nodeset_export.xml".into()),
//!         &options,
//!     )?;
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;

use nodeset_types::ExpandedNodeId;

mod adapter;
mod aliases;
mod browse;
mod encoder;
mod errors;
mod export;
mod hierarchy;
mod model;
mod options;
mod perf;

pub use adapter::{AttributeRequest, AttributeValues, ServerAdapter};
pub use aliases::{data_type_alias, reference_type_alias, AliasTable};
pub use browse::browse_all;
pub use encoder::{Encoder, ExportTarget, XmlEncoder};
pub use errors::{ExportError, ExportResult};
pub use export::ExporterLoop;
pub use hierarchy::{is_hierarchical_reference, is_standard_ns0_node};
pub use model::NodeIntermediateModel;
pub use options::{EncoderType, FlatListOfNodes, Options, DEFAULT_MAX_NODES_TO_REQUEST_DATA};
pub use perf::PerfTimer;

fn export_nodeset<A: ServerAdapter>(
    mut adapter: A,
    node_ids: &BTreeMap<String, Vec<ExpandedNodeId>>,
    target: ExportTarget<'_>,
    options: &Options,
) -> ExportResult<()> {
    if options.is_perf_timer_enable {
        log::info!("Perf-monitoring mode is enabled...");
    }
    adapter.set_max_references_per_node(options.max_references_per_node);
    adapter.set_max_browse_continuation_points(options.max_browse_continuation_points);
    adapter.set_max_nodes_per_browse(options.max_nodes_per_browse);
    adapter.set_max_nodes_per_read(options.max_nodes_per_read);

    // The encoder selection mirrors the options; XML is the only format.
    let mut encoder = match options.encoder_type {
        EncoderType::Xml => XmlEncoder::new(target),
    };

    ExporterLoop::new(&mut adapter, &mut encoder, node_ids, options)?.start_export()
}

/// Export the nodes of `node_ids` through an adapter backed by an
/// in-process server.
///
/// `node_ids` maps an arbitrary list name to the nodes collected for one
/// starting node, as produced by [`browse_all`], the start first. The lists
/// of different starts must not overlap.
pub fn export_nodeset_from_server<A: ServerAdapter>(
    server: A,
    node_ids: &BTreeMap<String, Vec<ExpandedNodeId>>,
    target: ExportTarget<'_>,
    options: &Options,
) -> ExportResult<()> {
    export_nodeset(server, node_ids, target, options)
}

/// Export the nodes of `node_ids` through an adapter backed by a client
/// session. Identical to [`export_nodeset_from_server`] apart from the
/// adapter implementation handed in.
pub fn export_nodeset_from_client<A: ServerAdapter>(
    client: A,
    node_ids: &BTreeMap<String, Vec<ExpandedNodeId>>,
    target: ExportTarget<'_>,
    options: &Options,
) -> ExportResult<()> {
    export_nodeset(client, node_ids, target, options)
}
