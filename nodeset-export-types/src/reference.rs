// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The [`ReferenceDescription`] returned for each edge of a browse.

use crate::{
    expanded_node_id::ExpandedNodeId, localized_text::LocalizedText, node_class::NodeClass,
    node_id::NodeId, qualified_name::QualifiedName,
};

/// A typed, directed edge between two nodes, as described by the Browse
/// service (Part 4, 5.8.2).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ReferenceDescription {
    /// Id of the reference type, e.g. `i=47` for HasComponent.
    pub reference_type_id: NodeId,
    /// `true` when the edge points away from the browsed node.
    pub is_forward: bool,
    /// The target node.
    pub node_id: ExpandedNodeId,
    /// Browse name of the target node.
    pub browse_name: QualifiedName,
    /// Display name of the target node.
    pub display_name: LocalizedText,
    /// Class of the target node.
    pub node_class: NodeClass,
    /// Type definition of the target node, when it is an instance.
    pub type_definition: ExpandedNodeId,
}

impl ReferenceDescription {
    /// A bare reference of the given type and direction to `target`,
    /// with all target metadata left empty. This is the shape synthesized
    /// references take.
    pub fn new(
        reference_type_id: impl Into<NodeId>,
        target: impl Into<ExpandedNodeId>,
        is_forward: bool,
    ) -> Self {
        Self {
            reference_type_id: reference_type_id.into(),
            is_forward,
            node_id: target.into(),
            ..Default::default()
        }
    }
}
