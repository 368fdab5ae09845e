// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Exporter configuration.

use hashbrown::HashSet;
use nodeset_types::{ExpandedNodeId, NodeClass, ObjectId};
use serde::{Deserialize, Serialize};

use crate::errors::{ExportError, ExportResult};

/// Default for [`Options::number_of_max_nodes_to_request_data`].
pub const DEFAULT_MAX_NODES_TO_REQUEST_DATA: u32 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// The output encoder to use. XML is the only implemented format.
pub enum EncoderType {
    /// NodeSet2 XML.
    #[default]
    Xml,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Flat export mode: all type classes are ignored and every exported node is
/// bound directly to one parent, with the hierarchy between them removed.
pub struct FlatListOfNodes {
    /// Enable flat mode.
    pub is_enable: bool,
    /// Synthesize a starting node that does not exist on the server as an
    /// Object bound to the replacement parent. Requires `is_enable`.
    pub create_missing_start_node: bool,
    /// Add the two inverse HasComponent references that let loaders accept
    /// variables of abstract types, and keep abstract type definitions
    /// unrewritten. Requires `create_missing_start_node`.
    pub allow_abstract_variable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// The options bundle of the exporter. All fields have usable defaults.
pub struct Options {
    /// Log elapsed time around every major stage at info level.
    pub is_perf_timer_enable: bool,
    /// The output encoder.
    pub encoder_type: EncoderType,
    /// Window size for batched attribute/reference requests, 0 means one
    /// unbounded batch.
    pub number_of_max_nodes_to_request_data: u32,
    /// Requested maximum references per node in browse responses,
    /// 0 lets the server decide.
    pub max_references_per_node: u32,
    /// Maximum number of browse continuation points, 0 lets the server
    /// decide.
    pub max_browse_continuation_points: u32,
    /// Maximum nodes per browse request, 0 lets the server decide.
    pub max_nodes_per_browse: u32,
    /// Maximum nodes per read request, 0 lets the server decide.
    pub max_nodes_per_read: u32,
    /// Accept custom (user authored) starting nodes inside namespace 0.
    /// Nodes belonging to the OPC UA standard address space are never
    /// exported.
    pub ns0_custom_nodes_ready_to_work: bool,
    /// Flat export mode settings.
    pub flat_list_of_nodes: FlatListOfNodes,
    /// Node used as the synthetic parent for starting nodes without one.
    #[serde(with = "expanded_node_id_text")]
    pub parent_start_node_replacer: ExpandedNodeId,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            is_perf_timer_enable: false,
            encoder_type: EncoderType::Xml,
            number_of_max_nodes_to_request_data: DEFAULT_MAX_NODES_TO_REQUEST_DATA,
            max_references_per_node: 0,
            max_browse_continuation_points: 0,
            max_nodes_per_browse: 0,
            max_nodes_per_read: 0,
            ns0_custom_nodes_ready_to_work: false,
            flat_list_of_nodes: FlatListOfNodes::default(),
            parent_start_node_replacer: ExpandedNodeId::new(ObjectId::ObjectsFolder),
        }
    }
}

impl Options {
    /// The node classes this configuration ignores: always Method and View,
    /// plus the four type classes in flat mode. Ignored nodes are skipped
    /// during export and their subtrees are not browsed.
    pub fn ignored_node_classes(&self) -> HashSet<NodeClass> {
        let mut ignored: HashSet<NodeClass> =
            [NodeClass::Method, NodeClass::View].into_iter().collect();
        if self.flat_list_of_nodes.is_enable {
            ignored.extend([
                NodeClass::ObjectType,
                NodeClass::VariableType,
                NodeClass::ReferenceType,
                NodeClass::DataType,
            ]);
        }
        ignored
    }

    /// Check the mode combination. Called by the export loop before any
    /// server traffic.
    pub fn validate(&self) -> ExportResult<()> {
        if self.flat_list_of_nodes.create_missing_start_node && !self.flat_list_of_nodes.is_enable {
            return Err(ExportError::BadConfiguration(
                "The 'create_missing_start_node' parameter was enabled without 'flat_list_of_nodes'"
                    .to_owned(),
            ));
        }
        if self.flat_list_of_nodes.allow_abstract_variable
            && !self.flat_list_of_nodes.create_missing_start_node
        {
            return Err(ExportError::BadConfiguration(
                "The 'allow_abstract_variable' parameter was enabled without 'create_missing_start_node'"
                    .to_owned(),
            ));
        }
        if self.parent_start_node_replacer.node_id.is_null() {
            return Err(ExportError::BadConfiguration(
                "'parent_start_node_replacer' must be a non-null node id".to_owned(),
            ));
        }
        Ok(())
    }
}

mod expanded_node_id_text {
    use std::str::FromStr;

    use nodeset_types::ExpandedNodeId;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &ExpandedNodeId,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ExpandedNodeId, D::Error> {
        let text = String::deserialize(deserializer)?;
        ExpandedNodeId::from_str(&text)
            .map_err(|_| D::Error::custom(format!("invalid node id: {text}")))
    }
}
