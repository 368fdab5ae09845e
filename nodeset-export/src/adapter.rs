// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The contract between the export core and the OPC UA transport.

use std::collections::BTreeMap;

use nodeset_types::{
    AttributeId, AttributeValue, ExpandedNodeId, NodeClass, ReferenceDescription, Variant,
};

use crate::errors::ExportResult;

/// One entry of a batched attribute read: a node and the attributes wanted
/// for it.
#[derive(Debug, Clone)]
pub struct AttributeRequest {
    /// The node to read.
    pub node_id: ExpandedNodeId,
    /// The attributes to read for it.
    pub attribute_ids: Vec<AttributeId>,
}

/// The attributes returned for one node. A requested attribute the server
/// could not deliver is either absent or maps to `None`; both mean the same
/// thing to the core.
pub type AttributeValues = BTreeMap<AttributeId, Option<AttributeValue>>;

/// Abstraction over the live server the export reads from, whether backed by
/// a client session or an in-process server.
///
/// Every batched operation MUST return its results in the order of its
/// inputs, one entry per input; windowing of large requests is the caller's
/// concern, following continuation points is the implementation's. Per-item
/// failures are reported in-band (an `Unspecified` class, an empty reference
/// list, an absent attribute entry); `Err` is reserved for transport-level
/// failure of the whole call.
pub trait ServerAdapter {
    /// Read the node class of each node.
    fn read_node_classes(&mut self, node_ids: &[ExpandedNodeId]) -> ExportResult<Vec<NodeClass>>;

    /// Read all references of each node, forward and inverse, all reference
    /// types.
    fn read_node_references(
        &mut self,
        node_ids: &[ExpandedNodeId],
    ) -> ExportResult<Vec<Vec<ReferenceDescription>>>;

    /// Read the requested attributes of each node.
    fn read_node_attributes(
        &mut self,
        requests: &[AttributeRequest],
    ) -> ExportResult<Vec<AttributeValues>>;

    /// Read the current value of a single node.
    fn read_node_data_value(&mut self, node_id: &ExpandedNodeId) -> ExportResult<Variant>;

    /// Requested maximum references per node in browse responses. 0 lets
    /// the server decide.
    fn set_max_references_per_node(&mut self, _value: u32) {}

    /// Maximum number of browse continuation points to keep alive. 0 lets
    /// the server decide.
    fn set_max_browse_continuation_points(&mut self, _value: u32) {}

    /// Maximum nodes per browse request. 0 lets the server decide.
    fn set_max_nodes_per_browse(&mut self, _value: u32) {}

    /// Maximum nodes per read request. 0 lets the server decide.
    fn set_max_nodes_per_read(&mut self, _value: u32) {}

    /// Session state probe, checked by the core between batches. A `false`
    /// return is treated as an interrupt request and stops the export.
    fn is_connected(&self) -> bool {
        true
    }
}
