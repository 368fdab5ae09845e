// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The export core loop.
//!
//! Drives the pipeline: starting-node checks, namespace collection, the
//! batched class/attribute/reference reads, reference rewriting, per-class
//! dispatch to the encoder and the final alias emission. Execution is
//! sequential; every adapter call blocks, and the session probe is checked
//! between batch windows.

use std::collections::BTreeMap;
use std::fmt;

use hashbrown::HashSet;
use log::{debug, error, info, warn};
use nodeset_types::{AttributeId, DataTypeId, ExpandedNodeId, NodeClass, ObjectId, VariableId};

use crate::{
    adapter::{AttributeRequest, ServerAdapter},
    aliases::{data_type_alias, reference_type_alias, AliasTable},
    encoder::Encoder,
    errors::{ExportError, ExportResult},
    hierarchy::is_standard_ns0_node,
    model::NodeIntermediateModel,
    options::Options,
    perf::PerfTimer,
};

mod rewrite;

use rewrite::{resolve_parent, rewrite_references, WindowNode};

/// Counts of nodes per class over one export run, logged as the final
/// statistics line.
#[derive(Debug, Default, Clone, Copy)]
struct ExportedNodes {
    object_nodes: usize,
    variable_nodes: usize,
    objecttype_nodes: usize,
    variabletype_nodes: usize,
    referencetype_nodes: usize,
    datatype_nodes: usize,
    method_nodes: usize,
    view_nodes: usize,
    unspecified_nodes: usize,
}

impl ExportedNodes {
    fn count(&mut self, node_class: NodeClass) {
        match node_class {
            NodeClass::Object => self.object_nodes += 1,
            NodeClass::Variable => self.variable_nodes += 1,
            NodeClass::ObjectType => self.objecttype_nodes += 1,
            NodeClass::VariableType => self.variabletype_nodes += 1,
            NodeClass::ReferenceType => self.referencetype_nodes += 1,
            NodeClass::DataType => self.datatype_nodes += 1,
            NodeClass::Method => self.method_nodes += 1,
            NodeClass::View => self.view_nodes += 1,
            NodeClass::Unspecified => self.unspecified_nodes += 1,
        }
    }

    fn exported_sum(&self) -> usize {
        self.object_nodes
            + self.variable_nodes
            + self.objecttype_nodes
            + self.variabletype_nodes
            + self.referencetype_nodes
            + self.datatype_nodes
    }
}

impl fmt::Display for ExportedNodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NODECLASS OBJECT: {}\nNODECLASS VARIABLE: {}\nNODECLASS OBJECTTYPE: {}\n\
             NODECLASS VARIABLETYPE: {}\nNODECLASS REFERENCETYPE: {}\nNODECLASS DATATYPE: {}\n\
             NODECLASS METHOD: {}\nNODECLASS VIEW: {}\nNODECLASS UNSPECIFIED: {}",
            self.object_nodes,
            self.variable_nodes,
            self.objecttype_nodes,
            self.variabletype_nodes,
            self.referencetype_nodes,
            self.datatype_nodes,
            self.method_nodes,
            self.view_nodes,
            self.unspecified_nodes
        )
    }
}

/// The attributes to request for one node: the common set plus the class
/// specific additions.
fn requested_attributes(node_class: NodeClass) -> Vec<AttributeId> {
    let mut ids = vec![
        AttributeId::BrowseName,
        AttributeId::DisplayName,
        AttributeId::Description,
        AttributeId::WriteMask,
        AttributeId::UserWriteMask,
    ];
    match node_class {
        NodeClass::Object => ids.push(AttributeId::EventNotifier),
        NodeClass::ObjectType => ids.push(AttributeId::IsAbstract),
        NodeClass::Variable => ids.extend([
            AttributeId::DataType,
            AttributeId::ValueRank,
            AttributeId::ArrayDimensions,
            AttributeId::Value,
            AttributeId::AccessLevel,
            AttributeId::UserAccessLevel,
            AttributeId::MinimumSamplingInterval,
            AttributeId::Historizing,
        ]),
        NodeClass::VariableType => ids.extend([
            AttributeId::IsAbstract,
            AttributeId::DataType,
            AttributeId::ValueRank,
            AttributeId::ArrayDimensions,
            AttributeId::Value,
        ]),
        NodeClass::ReferenceType => ids.extend([
            AttributeId::InverseName,
            AttributeId::IsAbstract,
            AttributeId::Symmetric,
        ]),
        NodeClass::DataType => {
            ids.extend([AttributeId::DataTypeDefinition, AttributeId::IsAbstract])
        }
        NodeClass::Method | NodeClass::View | NodeClass::Unspecified => {}
    }
    ids
}

/// The main core of the algorithm for exporting an OPC UA node structure to
/// a specific format.
pub struct ExporterLoop<'a, A, E> {
    adapter: &'a mut A,
    encoder: &'a mut E,
    node_ids: &'a BTreeMap<String, Vec<ExpandedNodeId>>,
    options: &'a Options,
    ignored_classes: HashSet<NodeClass>,
}

impl<'a, A: ServerAdapter, E: Encoder> ExporterLoop<'a, A, E> {
    /// Build the loop, validating the option combination and the node list
    /// shape up front.
    pub fn new(
        adapter: &'a mut A,
        encoder: &'a mut E,
        node_ids: &'a BTreeMap<String, Vec<ExpandedNodeId>>,
        options: &'a Options,
    ) -> ExportResult<Self> {
        options.validate()?;
        if node_ids.is_empty() || node_ids.values().any(|list| list.is_empty()) {
            error!("The list of node IDs is empty");
            return Err(ExportError::EmptyNodeIdList);
        }

        Ok(Self {
            adapter,
            encoder,
            node_ids,
            options,
            ignored_classes: options.ignored_node_classes(),
        })
    }

    /// Run the export: begin, namespaces, the batched loop over every
    /// starting list, aliases, end. The first failing stage aborts the run
    /// without finalizing the encoder, so no partial document is committed.
    pub fn start_export(&mut self) -> ExportResult<()> {
        info!("Start of export...");
        let total_timer = self.options.is_perf_timer_enable.then(PerfTimer::new);

        self.check_start_nodes_on_ns0()?;

        let lists: Vec<(&String, Vec<ExpandedNodeId>)> = self
            .node_ids
            .iter()
            .map(|(key, list)| (key, distinct(list)))
            .collect();
        check_crossing(&lists)?;

        let all_node_ids: HashSet<ExpandedNodeId> = lists
            .iter()
            .flat_map(|(_, list)| list.iter().cloned())
            .collect();

        self.encoder.begin()?;

        let stage_timer = self.options.is_perf_timer_enable.then(PerfTimer::new);
        let namespaces = self.read_namespaces()?;
        info!("Export namespaces:");
        for namespace in &namespaces {
            debug!("  {namespace}");
        }
        self.encoder.add_namespaces(&namespaces)?;
        if let Some(timer) = &stage_timer {
            info!("Time to collect and export namespaces: {}", timer.elapsed_string());
        }

        let mut aliases = AliasTable::new();
        let mut ignored_node_ids: HashSet<ExpandedNodeId> = HashSet::new();
        let mut statistics = ExportedNodes::default();

        let batch_size = self.options.number_of_max_nodes_to_request_data as usize;
        for (root_key, list) in &lists {
            let window_size = if batch_size == 0 { list.len() } else { batch_size };
            let mut offset = 0;
            for window in list.chunks(window_size.max(1)) {
                if !self.adapter.is_connected() {
                    warn!("Session disconnected, interrupting the export");
                    return Err(ExportError::Interrupted);
                }
                let window_timer = self.options.is_perf_timer_enable.then(PerfTimer::new);
                self.process_window(
                    root_key.as_str(),
                    window,
                    offset == 0,
                    &all_node_ids,
                    &mut ignored_node_ids,
                    &mut aliases,
                    &mut statistics,
                )?;
                if let Some(timer) = &window_timer {
                    info!(
                        "Time to process {} nodes of list '{root_key}': {}",
                        window.len(),
                        timer.elapsed_string()
                    );
                }
                offset += window.len();
            }
        }

        info!("Export aliases:");
        for (alias, node_id) in aliases.iter() {
            debug!("  Alias: {alias}, nodeId: {node_id}");
        }
        self.encoder.add_aliases(&aliases)?;
        self.encoder.end()?;

        info!("End of export");
        info!(
            "Exported {} nodes in total:\n{statistics}",
            statistics.exported_sum()
        );
        if let Some(timer) = &total_timer {
            info!("Total time to export: {}", timer.elapsed_string());
        }
        Ok(())
    }

    /// Starting nodes inside ns=0 are only acceptable in narrow cases: the
    /// ObjectsFolder as a flat mode anchor, or custom ns=0 nodes when the
    /// mode allows them. Standard nodes are never exported.
    fn check_start_nodes_on_ns0(&self) -> ExportResult<()> {
        for (root_key, list) in self.node_ids {
            let start = &list[0];
            if start.namespace_uri.is_some() || start.node_id.namespace != 0 {
                continue;
            }
            if self.options.flat_list_of_nodes.is_enable
                && start.node_id == ObjectId::ObjectsFolder
            {
                continue;
            }
            if !self.options.ns0_custom_nodes_ready_to_work {
                error!(
                    "Starting node {start} of list '{root_key}' is in the OPC UA standard \
                     namespace (ns=0), which is not enabled for export"
                );
                return Err(ExportError::InvalidOption(format!(
                    "starting node {start} of list '{root_key}' is in namespace 0"
                )));
            }
            if is_standard_ns0_node(&start.node_id) {
                error!(
                    "Starting node {start} of list '{root_key}' belongs to the OPC UA standard \
                     address space and cannot be exported"
                );
                return Err(ExportError::InvalidOption(format!(
                    "starting node {start} of list '{root_key}' is an OPC UA standard node"
                )));
            }
        }
        Ok(())
    }

    /// Read the server namespace table and drop the standard namespace at
    /// index 0; the remainder maps positionally onto the indices in emitted
    /// node ids.
    fn read_namespaces(&mut self) -> ExportResult<Vec<String>> {
        let namespace_array = ExpandedNodeId::new(VariableId::Server_NamespaceArray);
        let value = self.adapter.read_node_data_value(&namespace_array)?;
        let Some(mut uris) = value.as_string_array() else {
            error!("NamespaceArray (i=2255) did not hold an array of strings");
            return Err(ExportError::Transport(
                "NamespaceArray did not hold an array of strings".to_owned(),
            ));
        };
        if !uris.is_empty() {
            uris.remove(0);
        }
        Ok(uris)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_window(
        &mut self,
        root_key: &str,
        window: &[ExpandedNodeId],
        is_first_window: bool,
        all_node_ids: &HashSet<ExpandedNodeId>,
        ignored_node_ids: &mut HashSet<ExpandedNodeId>,
        aliases: &mut AliasTable,
        statistics: &mut ExportedNodes,
    ) -> ExportResult<()> {
        let classes = self.adapter.read_node_classes(window)?;
        ensure_response_len("read_node_classes", window.len(), classes.len())?;

        let mut nodes: Vec<WindowNode> = Vec::with_capacity(window.len());
        for (index, (node_id, node_class)) in window.iter().zip(classes).enumerate() {
            let is_start = is_first_window && index == 0;
            if self.ignored_classes.contains(&node_class) {
                debug!("{node_id}: class {node_class} is ignored, node skipped");
                ignored_node_ids.insert(node_id.clone());
                statistics.count(node_class);
                continue;
            }
            if node_class == NodeClass::Unspecified {
                if is_start && self.options.flat_list_of_nodes.create_missing_start_node {
                    // Synthesized during reference rewriting.
                } else if is_start {
                    error!("Starting node {node_id} of list '{root_key}' does not exist on the server");
                    return Err(ExportError::UnknownNode(node_id.clone()));
                } else {
                    error!("{node_id}: server returned no node class, node skipped");
                    ignored_node_ids.insert(node_id.clone());
                    statistics.count(node_class);
                    continue;
                }
            }
            nodes.push(WindowNode {
                node_id: node_id.clone(),
                node_class,
                is_start,
                references: Vec::new(),
                attributes: Default::default(),
            });
        }

        let requests: Vec<AttributeRequest> = nodes
            .iter()
            .map(|node| AttributeRequest {
                node_id: node.node_id.clone(),
                attribute_ids: requested_attributes(node.node_class),
            })
            .collect();
        let attribute_sets = self.adapter.read_node_attributes(&requests)?;
        ensure_response_len("read_node_attributes", requests.len(), attribute_sets.len())?;
        for ((node, request), values) in nodes.iter_mut().zip(&requests).zip(attribute_sets) {
            if node.node_class != NodeClass::Unspecified {
                for attribute in &request.attribute_ids {
                    if values.get(attribute).map_or(true, |v| v.is_none()) {
                        if *attribute == AttributeId::BrowseName {
                            error!(
                                "{}: required attribute {attribute} was not returned",
                                node.node_id
                            );
                        } else {
                            info!(
                                "{}: attribute {attribute} was not returned, the default applies",
                                node.node_id
                            );
                        }
                    }
                }
            }
            node.attributes = values;
        }

        let kept_ids: Vec<ExpandedNodeId> = nodes.iter().map(|n| n.node_id.clone()).collect();
        let reference_sets = self.adapter.read_node_references(&kept_ids)?;
        ensure_response_len("read_node_references", kept_ids.len(), reference_sets.len())?;
        for (node, references) in nodes.iter_mut().zip(reference_sets) {
            node.references = references;
        }

        rewrite_references(
            &mut nodes,
            all_node_ids,
            ignored_node_ids,
            &self.ignored_classes,
            self.options,
        );

        for node in nodes {
            let parent_node_id = resolve_parent(node.node_class, &node.references);
            let model = NodeIntermediateModel {
                node_id: node.node_id,
                parent_node_id,
                node_class: node.node_class,
                references: node.references,
                attributes: node.attributes,
            };
            collect_aliases(aliases, &model);
            match model.node_class {
                NodeClass::Object => self.encoder.add_node_object(&model)?,
                NodeClass::Variable => self.encoder.add_node_variable(&model)?,
                NodeClass::ObjectType => self.encoder.add_node_object_type(&model)?,
                NodeClass::VariableType => self.encoder.add_node_variable_type(&model)?,
                NodeClass::ReferenceType => self.encoder.add_node_reference_type(&model)?,
                NodeClass::DataType => self.encoder.add_node_data_type(&model)?,
                NodeClass::Method | NodeClass::View | NodeClass::Unspecified => {
                    // Filtered before this point.
                    continue;
                }
            }
            statistics.count(model.node_class);
        }
        Ok(())
    }
}

/// Pick up the standard aliases a node's emission will rely on: its data
/// type, when standard and not suppressed as the default, and the types of
/// all its references. Custom ids never produce aliases.
fn collect_aliases(aliases: &mut AliasTable, model: &NodeIntermediateModel) {
    if matches!(
        model.node_class,
        NodeClass::Variable | NodeClass::VariableType
    ) {
        if let Some(Some(value)) = model.attributes.get(&AttributeId::DataType) {
            if let Some(data_type) = value.as_node_id() {
                if *data_type != DataTypeId::BaseDataType {
                    if let Some(alias) = data_type_alias(data_type) {
                        aliases.insert(alias, data_type.clone());
                    }
                }
            }
        }
    }
    for reference in &model.references {
        if let Some(alias) = reference_type_alias(&reference.reference_type_id) {
            aliases.insert(alias, reference.reference_type_id.clone());
        }
    }
}

/// Order preserving de-duplication of one starting list.
fn distinct(list: &[ExpandedNodeId]) -> Vec<ExpandedNodeId> {
    let mut seen: HashSet<&ExpandedNodeId> = HashSet::with_capacity(list.len());
    list.iter()
        .filter(|node_id| seen.insert(*node_id))
        .cloned()
        .collect()
}

/// No starting node may appear inside the collected list of a different
/// start; overlapping roots would emit the same subtree twice and produce
/// duplicate node ids in the output.
fn check_crossing(lists: &[(&String, Vec<ExpandedNodeId>)]) -> ExportResult<()> {
    let sets: Vec<HashSet<&ExpandedNodeId>> = lists
        .iter()
        .map(|(_, list)| list.iter().collect())
        .collect();
    for (index_a, (key_a, list_a)) in lists.iter().enumerate() {
        let start_a = &list_a[0];
        for (index_b, (key_b, _)) in lists.iter().enumerate() {
            if index_a == index_b {
                continue;
            }
            if sets[index_b].contains(start_a) {
                error!(
                    "Starting node {start_a} of list '{key_a}' is contained in the nodes \
                     collected for starting node of list '{key_b}'"
                );
                return Err(ExportError::InvalidOption(format!(
                    "starting node {start_a} of list '{key_a}' crosses the node list of \
                     '{key_b}'; remove one of the overlapping starts"
                )));
            }
        }
    }
    Ok(())
}

fn ensure_response_len(operation: &str, requested: usize, returned: usize) -> ExportResult<()> {
    if requested != returned {
        error!("{operation} returned {returned} entries for {requested} requests");
        return Err(ExportError::Transport(format!(
            "{operation} returned {returned} entries for {requested} requests"
        )));
    }
    Ok(())
}
