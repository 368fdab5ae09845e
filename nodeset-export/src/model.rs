// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The intermediate per-node record handed to the encoder.

use nodeset_types::{AttributeId, ExpandedNodeId, NodeClass, ReferenceDescription};

use crate::{
    adapter::AttributeValues,
    aliases::{data_type_alias, reference_type_alias},
};

/// Everything the encoder needs to know about one node: its id, resolved
/// parent, class, rewritten references and attribute map.
///
/// Models are built per batch window, mutated only by the reference
/// rewriting stage, consumed by the encoder and then dropped.
#[derive(Debug, Default, Clone)]
pub struct NodeIntermediateModel {
    /// The id of the node the model represents.
    pub node_id: ExpandedNodeId,
    /// The resolved parent, `None` only for type class nodes.
    pub parent_node_id: Option<ExpandedNodeId>,
    /// The node class.
    pub node_class: NodeClass,
    /// References after rewriting, forward and inverse.
    pub references: Vec<ReferenceDescription>,
    /// Attribute id → payload, absent payloads meaning "use the default".
    pub attributes: AttributeValues,
}

impl NodeIntermediateModel {
    /// Text to place in the `DataType` XML attribute: the alias when the
    /// data type is standard, the raw node id text otherwise. Empty for
    /// classes without a data type or when the attribute was not read.
    pub fn data_type_alias(&self) -> String {
        if !matches!(
            self.node_class,
            NodeClass::Variable | NodeClass::VariableType
        ) {
            return String::new();
        }
        let Some(Some(value)) = self.attributes.get(&AttributeId::DataType) else {
            return String::new();
        };
        let Some(data_type) = value.as_node_id() else {
            return String::new();
        };
        match data_type_alias(data_type) {
            Some(alias) => alias.to_owned(),
            None => data_type.to_string(),
        }
    }

    /// The references paired with the text for their `ReferenceType` XML
    /// attribute: the alias for standard reference types, the raw node id
    /// text for custom ones.
    pub fn reference_type_aliases(&self) -> Vec<(&ReferenceDescription, String)> {
        self.references
            .iter()
            .map(|reference| {
                let text = match reference_type_alias(&reference.reference_type_id) {
                    Some(alias) => alias.to_owned(),
                    None => reference.reference_type_id.to_string(),
                };
                (reference, text)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use nodeset_types::{
        AttributeId, AttributeValue, ExpandedNodeId, NodeClass, NodeId, ReferenceDescription,
    };

    use super::NodeIntermediateModel;

    fn variable_with_data_type(data_type: NodeId) -> NodeIntermediateModel {
        let mut model = NodeIntermediateModel {
            node_id: ExpandedNodeId::new(NodeId::new(2, 1u32)),
            node_class: NodeClass::Variable,
            ..Default::default()
        };
        model.attributes.insert(
            AttributeId::DataType,
            Some(AttributeValue::NodeId(data_type)),
        );
        model
    }

    #[test]
    fn standard_data_type_uses_alias() {
        let model = variable_with_data_type(NodeId::new(0, 6u32));
        assert_eq!(model.data_type_alias(), "Int32");
    }

    #[test]
    fn custom_data_type_uses_raw_text() {
        let model = variable_with_data_type(NodeId::new(2, 3001u32));
        assert_eq!(model.data_type_alias(), "ns=2;i=3001");
    }

    #[test]
    fn data_type_alias_empty_for_objects() {
        let mut model = variable_with_data_type(NodeId::new(0, 6u32));
        model.node_class = NodeClass::Object;
        assert_eq!(model.data_type_alias(), "");
    }

    #[test]
    fn data_type_alias_empty_without_attribute() {
        let model = NodeIntermediateModel {
            node_class: NodeClass::Variable,
            ..Default::default()
        };
        assert_eq!(model.data_type_alias(), "");
    }

    #[test]
    fn reference_aliases_mix_standard_and_custom() {
        let model = NodeIntermediateModel {
            node_class: NodeClass::Object,
            references: vec![
                ReferenceDescription::new(
                    NodeId::new(0, 35u32),
                    ExpandedNodeId::new(NodeId::new(0, 85u32)),
                    false,
                ),
                ReferenceDescription::new(
                    NodeId::new(2, 900u32),
                    ExpandedNodeId::new(NodeId::new(2, 5u32)),
                    true,
                ),
            ],
            ..Default::default()
        };
        let aliases = model.reference_type_aliases();
        assert_eq!(aliases[0].1, "Organizes");
        assert_eq!(aliases[1].1, "ns=2;i=900");
    }
}
