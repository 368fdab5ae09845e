// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The NodeSet2 XML implementation of [`Encoder`].

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use nodeset_types::{AttributeId, AttributeValue, DataTypeId, Variant};
use nodeset_xml::{
    schema::ua_node_set::{
        AliasTable as XmlAliasTable, ListOfReferences, LocalizedTextValue, NodeIdAlias, Reference,
        UADataType, UAInstance, UANode, UANodeBase, UANodeSet, UAObject, UAObjectType,
        UAReferenceType, UAType, UAVariable, UAVariableType, UriTable,
    },
    schema::value::{XmlVariantScalar, XmlVariantValue},
    XmlStreamWriter,
};

use crate::{
    aliases::AliasTable,
    encoder::{Encoder, ExportTarget},
    errors::{ExportError, ExportResult},
    model::NodeIntermediateModel,
};

const DEFINITION_PLACEHOLDER: &str =
    "Definition elements are currently not supported in UADataType.";

/// Produces a NodeSet2 XML document.
///
/// The document tree is accumulated in memory across all `add_*` calls and
/// only serialized by [`Encoder::end`], which is what allows the alias table
/// to be added after the nodes while still preceding them in the output.
/// Nothing reaches the target on failure; file targets are written to a
/// temporary sibling and renamed into place.
pub struct XmlEncoder<'a> {
    target: ExportTarget<'a>,
    document: UANodeSet,
    began: bool,
}

impl<'a> XmlEncoder<'a> {
    /// Create an encoder writing to `target`.
    pub fn new(target: ExportTarget<'a>) -> Self {
        Self {
            target,
            document: UANodeSet::default(),
            began: false,
        }
    }

    fn basic_check(&self, method: &str) -> ExportResult<()> {
        if !self.began {
            error!("XmlEncoder::{method}: begin() didn't run");
            return Err(ExportError::Encoder(format!(
                "{method} called before begin()"
            )));
        }
        Ok(())
    }

    /// An attribute payload, with schema-default and absent values folded
    /// into `None` so a `None` result simply means "do not emit".
    fn optional_attr<'m>(
        &self,
        node_model: &'m NodeIntermediateModel,
        attribute: AttributeId,
    ) -> Option<&'m AttributeValue> {
        node_model
            .attributes
            .get(&attribute)
            .and_then(|value| value.as_ref())
            .filter(|value| !is_default(attribute, value))
    }

    fn build_base(&self, node_model: &NodeIntermediateModel) -> ExportResult<UANodeBase> {
        if node_model.node_id.is_null() {
            error!("XmlEncoder: node with null NodeId cannot be encoded");
            return Err(ExportError::Encoder(
                "required attribute NodeId is empty".to_owned(),
            ));
        }
        let browse_name = node_model
            .attributes
            .get(&AttributeId::BrowseName)
            .and_then(|value| value.as_ref())
            .and_then(|value| value.as_qualified_name())
            .filter(|name| !name.is_null());
        let Some(browse_name) = browse_name else {
            error!(
                "XmlEncoder: NodeId {}: required attribute BrowseName is missing or empty",
                node_model.node_id
            );
            return Err(ExportError::Encoder(format!(
                "NodeId {}: required attribute BrowseName is missing or empty",
                node_model.node_id
            )));
        };

        Ok(UANodeBase {
            node_id: node_model.node_id.to_string().into(),
            browse_name: browse_name.to_string().into(),
            display_name: self.localized_text_child(node_model, AttributeId::DisplayName),
            description: self.localized_text_child(node_model, AttributeId::Description),
            write_mask: self
                .optional_attr(node_model, AttributeId::WriteMask)
                .and_then(|v| expect_u32(node_model, AttributeId::WriteMask, v)),
            user_write_mask: self
                .optional_attr(node_model, AttributeId::UserWriteMask)
                .and_then(|v| expect_u32(node_model, AttributeId::UserWriteMask, v)),
            references: self.build_references(node_model)?,
        })
    }

    fn localized_text_child(
        &self,
        node_model: &NodeIntermediateModel,
        attribute: AttributeId,
    ) -> Option<LocalizedTextValue> {
        self.optional_attr(node_model, attribute)
            .and_then(|value| value.as_localized_text())
            .filter(|text| !text.text.is_empty())
            .map(|text| LocalizedTextValue {
                text: text.text.clone(),
                locale: text.locale.clone(),
            })
    }

    fn build_references(&self, node_model: &NodeIntermediateModel) -> ExportResult<ListOfReferences> {
        let with_aliases = node_model.reference_type_aliases();
        if with_aliases.is_empty() {
            info!(
                "XmlEncoder: NodeId {}: references are empty",
                node_model.node_id
            );
        }
        let mut references = Vec::with_capacity(with_aliases.len());
        for (reference, type_text) in with_aliases {
            if reference.reference_type_id.is_null() || type_text.is_empty() {
                error!(
                    "XmlEncoder: NodeId {}: reference with empty ReferenceType",
                    node_model.node_id
                );
                return Err(ExportError::Encoder(format!(
                    "NodeId {}: reference with empty ReferenceType",
                    node_model.node_id
                )));
            }
            if reference.node_id.is_null() {
                error!(
                    "XmlEncoder: NodeId {}: reference with null target",
                    node_model.node_id
                );
                return Err(ExportError::Encoder(format!(
                    "NodeId {}: reference with null target",
                    node_model.node_id
                )));
            }
            references.push(Reference {
                node_id: reference.node_id.to_string().into(),
                reference_type: type_text.into(),
                is_forward: reference.is_forward,
            });
        }
        Ok(ListOfReferences { references })
    }

    fn build_instance(&self, node_model: &NodeIntermediateModel) -> ExportResult<UAInstance> {
        let parent_node_id = match &node_model.parent_node_id {
            Some(parent) => Some(parent.to_string().into()),
            None => {
                warn!(
                    "XmlEncoder: NodeId {}: instance node has no parent",
                    node_model.node_id
                );
                None
            }
        };
        Ok(UAInstance {
            base: self.build_base(node_model)?,
            parent_node_id,
        })
    }

    fn build_type(&self, node_model: &NodeIntermediateModel) -> ExportResult<UAType> {
        Ok(UAType {
            base: self.build_base(node_model)?,
            is_abstract: self
                .optional_attr(node_model, AttributeId::IsAbstract)
                .and_then(|v| expect_bool(node_model, AttributeId::IsAbstract, v)),
        })
    }

    fn data_type_attribute(
        &self,
        node_model: &NodeIntermediateModel,
    ) -> Option<nodeset_xml::schema::ua_node_set::NodeId> {
        self.optional_attr(node_model, AttributeId::DataType)?;
        let alias = node_model.data_type_alias();
        if alias.is_empty() {
            warn!(
                "XmlEncoder: NodeId {}: DataType attribute has wrong or unsupported payload",
                node_model.node_id
            );
            return None;
        }
        Some(alias.into())
    }

    fn value_rank_attribute(&self, node_model: &NodeIntermediateModel) -> Option<i32> {
        self.optional_attr(node_model, AttributeId::ValueRank)
            .and_then(|v| expect_i32(node_model, AttributeId::ValueRank, v))
    }

    fn array_dimensions_attribute(&self, node_model: &NodeIntermediateModel) -> Option<String> {
        self.optional_attr(node_model, AttributeId::ArrayDimensions)
            .and_then(|value| value.as_array_dimensions())
            .filter(|dimensions| !dimensions.is_empty())
            .map(|dimensions| {
                dimensions
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
    }

    fn value_element(&self, node_model: &NodeIntermediateModel) -> Option<XmlVariantValue> {
        let value = self
            .optional_attr(node_model, AttributeId::Value)
            .and_then(|value| value.as_value())?;
        let converted = variant_to_xml(value);
        if converted.is_none() && !value.is_empty() {
            warn!(
                "XmlEncoder: NodeId {}: value is not of an emittable primitive type",
                node_model.node_id
            );
        }
        converted
    }

    fn push_node(&mut self, node: UANode) {
        self.document.nodes.push(node);
    }

    fn serialize(&mut self) -> ExportResult<()> {
        match &mut self.target {
            ExportTarget::Stream(stream) => {
                let mut writer = XmlStreamWriter::new(&mut **stream);
                self.document.write_document(&mut writer)?;
                Ok(())
            }
            ExportTarget::File(path) => {
                let tmp_path = temp_sibling(path);
                let result = write_document_to_file(&self.document, &tmp_path).and_then(|()| {
                    std::fs::rename(&tmp_path, path).map_err(|e| {
                        ExportError::Encoder(format!(
                            "failed to move {} into place: {e}",
                            tmp_path.display()
                        ))
                    })
                });
                if result.is_err() {
                    let _ = std::fs::remove_file(&tmp_path);
                }
                result
            }
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.as_os_str().to_owned();
    file_name.push(".tmp");
    PathBuf::from(file_name)
}

fn write_document_to_file(document: &UANodeSet, path: &Path) -> ExportResult<()> {
    let file = File::create(path)
        .map_err(|e| ExportError::Encoder(format!("failed to create {}: {e}", path.display())))?;
    let mut buffered = BufWriter::new(file);
    {
        let mut writer = XmlStreamWriter::new(&mut buffered);
        document.write_document(&mut writer)?;
    }
    buffered
        .flush()
        .map_err(|e| ExportError::Encoder(format!("failed to write {}: {e}", path.display())))
}

impl<'a> Encoder for XmlEncoder<'a> {
    fn begin(&mut self) -> ExportResult<()> {
        self.document = UANodeSet {
            leading_comment: Some(DEFINITION_PLACEHOLDER.to_owned()),
            ..Default::default()
        };
        self.began = true;
        Ok(())
    }

    fn end(&mut self) -> ExportResult<()> {
        self.basic_check("end()")?;
        self.serialize()?;
        self.began = false;
        self.document = UANodeSet::default();
        Ok(())
    }

    fn add_namespaces(&mut self, namespaces: &[String]) -> ExportResult<()> {
        self.basic_check("add_namespaces()")?;
        if self.document.namespace_uris.is_some() {
            error!("XmlEncoder::add_namespaces: the method has been called before");
            return Err(ExportError::Encoder(
                "add_namespaces() called twice".to_owned(),
            ));
        }
        self.document.namespace_uris = Some(UriTable {
            uris: namespaces.to_vec(),
        });
        Ok(())
    }

    fn add_aliases(&mut self, aliases: &AliasTable) -> ExportResult<()> {
        self.basic_check("add_aliases()")?;
        if self.document.aliases.is_some() {
            error!("XmlEncoder::add_aliases: the method has been called before");
            return Err(ExportError::Encoder("add_aliases() called twice".to_owned()));
        }
        self.document.aliases = Some(XmlAliasTable {
            aliases: aliases
                .iter()
                .map(|(alias, node_id)| NodeIdAlias {
                    id: node_id.to_string().into(),
                    alias: alias.clone(),
                })
                .collect(),
        });
        Ok(())
    }

    fn add_node_object(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_object()")?;
        let node = UAObject {
            base: self.build_instance(node_model)?,
            event_notifier: self
                .optional_attr(node_model, AttributeId::EventNotifier)
                .and_then(|v| expect_byte(node_model, AttributeId::EventNotifier, v)),
        };
        self.push_node(UANode::Object(node));
        Ok(())
    }

    fn add_node_object_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_object_type()")?;
        let node = UAObjectType {
            base: self.build_type(node_model)?,
        };
        self.push_node(UANode::ObjectType(node));
        Ok(())
    }

    fn add_node_variable(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_variable()")?;
        let node = UAVariable {
            base: self.build_instance(node_model)?,
            data_type: self.data_type_attribute(node_model),
            value_rank: self.value_rank_attribute(node_model),
            array_dimensions: self.array_dimensions_attribute(node_model),
            access_level: self
                .optional_attr(node_model, AttributeId::AccessLevel)
                .and_then(|v| expect_byte(node_model, AttributeId::AccessLevel, v)),
            user_access_level: self
                .optional_attr(node_model, AttributeId::UserAccessLevel)
                .and_then(|v| expect_byte(node_model, AttributeId::UserAccessLevel, v)),
            minimum_sampling_interval: self
                .optional_attr(node_model, AttributeId::MinimumSamplingInterval)
                .and_then(|v| expect_f64(node_model, AttributeId::MinimumSamplingInterval, v)),
            historizing: self
                .optional_attr(node_model, AttributeId::Historizing)
                .and_then(|v| expect_bool(node_model, AttributeId::Historizing, v)),
            value: self.value_element(node_model),
        };
        self.push_node(UANode::Variable(node));
        Ok(())
    }

    fn add_node_variable_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_variable_type()")?;
        let node = UAVariableType {
            base: self.build_type(node_model)?,
            data_type: self.data_type_attribute(node_model),
            value_rank: self.value_rank_attribute(node_model),
            array_dimensions: self.array_dimensions_attribute(node_model),
            value: self.value_element(node_model),
        };
        self.push_node(UANode::VariableType(node));
        Ok(())
    }

    fn add_node_reference_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_reference_type()")?;
        let node = UAReferenceType {
            base: self.build_type(node_model)?,
            symmetric: self
                .optional_attr(node_model, AttributeId::Symmetric)
                .and_then(|v| expect_bool(node_model, AttributeId::Symmetric, v)),
            inverse_name: self.localized_text_child(node_model, AttributeId::InverseName),
        };
        self.push_node(UANode::ReferenceType(node));
        Ok(())
    }

    fn add_node_data_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()> {
        self.basic_check("add_node_data_type()")?;
        // The DataTypeDefinition attribute is read but Definition elements
        // are not emitted, see the document comment placeholder.
        let node = UADataType {
            base: self.build_type(node_model)?,
        };
        self.push_node(UANode::DataType(node));
        Ok(())
    }
}

/// Whether an attribute payload equals the value the NodeSet schema assumes
/// when the XML attribute is absent.
fn is_default(attribute: AttributeId, value: &AttributeValue) -> bool {
    match attribute {
        AttributeId::WriteMask | AttributeId::UserWriteMask => value.as_u32() == Some(0),
        AttributeId::EventNotifier => value.as_byte() == Some(0),
        AttributeId::DataType => value
            .as_node_id()
            .is_some_and(|id| *id == DataTypeId::BaseDataType),
        AttributeId::ValueRank => value.as_i32() == Some(-1),
        AttributeId::AccessLevel | AttributeId::UserAccessLevel => value.as_byte() == Some(1),
        AttributeId::MinimumSamplingInterval => value.as_f64() == Some(0.0),
        AttributeId::Historizing | AttributeId::Symmetric | AttributeId::IsAbstract => {
            value.as_bool() == Some(false)
        }
        AttributeId::ArrayDimensions => value
            .as_array_dimensions()
            .is_some_and(|dimensions| dimensions.is_empty()),
        _ => false,
    }
}

macro_rules! expect_fn {
    ($name:ident, $accessor:ident, $out:ty, $what:literal) => {
        fn $name(
            node_model: &NodeIntermediateModel,
            attribute: AttributeId,
            value: &AttributeValue,
        ) -> Option<$out> {
            let result = value.$accessor();
            if result.is_none() {
                warn!(
                    "XmlEncoder: NodeId {}: {attribute} does not hold {}, attribute skipped",
                    node_model.node_id, $what
                );
            }
            result
        }
    };
}

expect_fn!(expect_u32, as_u32, u32, "a UInt32");
expect_fn!(expect_byte, as_byte, u8, "a Byte");
expect_fn!(expect_i32, as_i32, i32, "an Int32");
expect_fn!(expect_f64, as_f64, f64, "a Double");
expect_fn!(expect_bool, as_bool, bool, "a Boolean");

fn variant_scalar_to_xml(value: &Variant) -> Option<XmlVariantScalar> {
    Some(match value {
        Variant::Boolean(v) => XmlVariantScalar::Boolean(*v),
        Variant::SByte(v) => XmlVariantScalar::SByte(*v),
        Variant::Byte(v) => XmlVariantScalar::Byte(*v),
        Variant::Int16(v) => XmlVariantScalar::Int16(*v),
        Variant::UInt16(v) => XmlVariantScalar::UInt16(*v),
        Variant::Int32(v) => XmlVariantScalar::Int32(*v),
        Variant::UInt32(v) => XmlVariantScalar::UInt32(*v),
        Variant::Int64(v) => XmlVariantScalar::Int64(*v),
        Variant::UInt64(v) => XmlVariantScalar::UInt64(*v),
        Variant::Float(v) => XmlVariantScalar::Float(*v),
        Variant::Double(v) => XmlVariantScalar::Double(*v),
        Variant::String(v) => XmlVariantScalar::String(v.clone()),
        Variant::DateTime(v) => XmlVariantScalar::DateTime(**v),
        Variant::Guid(v) => XmlVariantScalar::Guid(**v),
        Variant::ByteString(v) => XmlVariantScalar::ByteString(v.as_base64()),
        Variant::Empty | Variant::Array(..) => return None,
    })
}

fn variant_to_xml(value: &Variant) -> Option<XmlVariantValue> {
    match value {
        Variant::Empty => None,
        Variant::Array(_, values) => {
            if values.is_empty() {
                return None;
            }
            values
                .iter()
                .map(variant_scalar_to_xml)
                .collect::<Option<Vec<_>>>()
                .map(XmlVariantValue::Array)
        }
        scalar => variant_scalar_to_xml(scalar).map(XmlVariantValue::Scalar),
    }
}

#[cfg(test)]
mod tests {
    use nodeset_types::{
        AttributeId, AttributeValue, ExpandedNodeId, LocalizedText, NodeClass, NodeId,
        QualifiedName, ReferenceDescription, Variant, VariantScalarTypeId,
    };

    use super::XmlEncoder;
    use crate::{
        aliases::AliasTable,
        encoder::{Encoder, ExportTarget},
        errors::ExportError,
        model::NodeIntermediateModel,
    };

    fn variable_model() -> NodeIntermediateModel {
        let mut model = NodeIntermediateModel {
            node_id: ExpandedNodeId::new(NodeId::new(2, 1u32)),
            parent_node_id: Some(ExpandedNodeId::new(NodeId::new(0, 85u32))),
            node_class: NodeClass::Variable,
            ..Default::default()
        };
        model.attributes.insert(
            AttributeId::BrowseName,
            Some(AttributeValue::QualifiedName(QualifiedName::new(2, "Var"))),
        );
        model.attributes.insert(
            AttributeId::DisplayName,
            Some(AttributeValue::LocalizedText(LocalizedText::from("X"))),
        );
        for (attribute, value) in [
            (AttributeId::WriteMask, AttributeValue::UInt32(0)),
            (AttributeId::UserWriteMask, AttributeValue::UInt32(0)),
            (
                AttributeId::DataType,
                AttributeValue::NodeId(NodeId::new(0, 24u32)),
            ),
            (AttributeId::ValueRank, AttributeValue::Int32(-1)),
            (AttributeId::ArrayDimensions, AttributeValue::ArrayDimensions(vec![])),
            (AttributeId::AccessLevel, AttributeValue::Byte(1)),
            (AttributeId::UserAccessLevel, AttributeValue::Byte(1)),
            (
                AttributeId::MinimumSamplingInterval,
                AttributeValue::Double(0.0),
            ),
            (AttributeId::Historizing, AttributeValue::Boolean(false)),
        ] {
            model.attributes.insert(attribute, Some(value));
        }
        model
    }

    fn encode(call: impl FnOnce(&mut XmlEncoder)) -> String {
        let mut buffer = Vec::new();
        {
            let mut encoder = XmlEncoder::new(ExportTarget::Stream(&mut buffer));
            encoder.begin().unwrap();
            call(&mut encoder);
            encoder.end().unwrap();
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn default_values_suppress_attributes() {
        let text = encode(|encoder| encoder.add_node_variable(&variable_model()).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        let variable = doc
            .descendants()
            .find(|n| n.tag_name().name() == "UAVariable")
            .unwrap();
        let names: Vec<&str> = variable.attributes().map(|a| a.name()).collect();
        assert_eq!(names, vec!["NodeId", "BrowseName", "ParentNodeId"]);
        assert_eq!(variable.attribute("NodeId"), Some("ns=2;i=1"));
        assert_eq!(variable.attribute("BrowseName"), Some("2:Var"));
        assert_eq!(variable.attribute("ParentNodeId"), Some("i=85"));
        let display = variable
            .children()
            .find(|n| n.tag_name().name() == "DisplayName")
            .unwrap();
        assert_eq!(display.text(), Some("X"));
        assert!(variable
            .children()
            .any(|n| n.tag_name().name() == "References"));
    }

    #[test]
    fn non_default_values_are_emitted() {
        let mut model = variable_model();
        for (attribute, value) in [
            (AttributeId::WriteMask, AttributeValue::UInt32(96)),
            (
                AttributeId::DataType,
                AttributeValue::NodeId(NodeId::new(0, 6u32)),
            ),
            (AttributeId::ValueRank, AttributeValue::Int32(1)),
            (
                AttributeId::ArrayDimensions,
                AttributeValue::ArrayDimensions(vec![4, 2]),
            ),
            (AttributeId::AccessLevel, AttributeValue::Byte(3)),
            (
                AttributeId::MinimumSamplingInterval,
                AttributeValue::Double(100.0),
            ),
            (AttributeId::Historizing, AttributeValue::Boolean(true)),
        ] {
            model.attributes.insert(attribute, Some(value));
        }
        let text = encode(|encoder| encoder.add_node_variable(&model).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        let variable = doc
            .descendants()
            .find(|n| n.tag_name().name() == "UAVariable")
            .unwrap();
        assert_eq!(variable.attribute("WriteMask"), Some("96"));
        assert_eq!(variable.attribute("DataType"), Some("Int32"));
        assert_eq!(variable.attribute("ValueRank"), Some("1"));
        assert_eq!(variable.attribute("ArrayDimensions"), Some("4,2"));
        assert_eq!(variable.attribute("AccessLevel"), Some("3"));
        assert_eq!(variable.attribute("MinimumSamplingInterval"), Some("100"));
        assert_eq!(variable.attribute("Historizing"), Some("true"));
    }

    #[test]
    fn missing_browse_name_is_fatal() {
        let mut model = variable_model();
        model.attributes.remove(&AttributeId::BrowseName);
        let mut buffer = Vec::new();
        let mut encoder = XmlEncoder::new(ExportTarget::Stream(&mut buffer));
        encoder.begin().unwrap();
        assert!(matches!(
            encoder.add_node_variable(&model),
            Err(ExportError::Encoder(_))
        ));
    }

    #[test]
    fn null_reference_target_is_fatal() {
        let mut model = variable_model();
        model.references.push(ReferenceDescription::new(
            NodeId::new(0, 35u32),
            ExpandedNodeId::null(),
            false,
        ));
        let mut buffer = Vec::new();
        let mut encoder = XmlEncoder::new(ExportTarget::Stream(&mut buffer));
        encoder.begin().unwrap();
        assert!(matches!(
            encoder.add_node_variable(&model),
            Err(ExportError::Encoder(_))
        ));
    }

    #[test]
    fn scalar_value_is_emitted() {
        let mut model = variable_model();
        model.attributes.insert(
            AttributeId::Value,
            Some(AttributeValue::Value(Variant::Int32(11))),
        );
        let text = encode(|encoder| encoder.add_node_variable(&model).unwrap());
        assert!(text.contains("<uax:Int32>11</uax:Int32>"));
    }

    #[test]
    fn array_value_is_emitted() {
        let mut model = variable_model();
        let array = Variant::array_of(
            VariantScalarTypeId::Double,
            [Variant::Double(1.0), Variant::Double(2.5)],
        )
        .unwrap();
        model
            .attributes
            .insert(AttributeId::Value, Some(AttributeValue::Value(array)));
        let text = encode(|encoder| encoder.add_node_variable(&model).unwrap());
        assert!(text.contains("<uax:ListOfDouble>"));
        assert!(text.contains("<uax:Double>2.5</uax:Double>"));
    }

    #[test]
    fn reference_type_aliases_and_raw_ids() {
        let mut model = variable_model();
        model.references.push(ReferenceDescription::new(
            NodeId::new(0, 35u32),
            ExpandedNodeId::new(NodeId::new(0, 85u32)),
            false,
        ));
        model.references.push(ReferenceDescription::new(
            NodeId::new(2, 700u32),
            ExpandedNodeId::new(NodeId::new(2, 9u32)),
            true,
        ));
        let text = encode(|encoder| encoder.add_node_variable(&model).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        let types: Vec<&str> = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "Reference")
            .map(|n| n.attribute("ReferenceType").unwrap())
            .collect();
        assert_eq!(types, vec!["Organizes", "ns=2;i=700"]);
    }

    #[test]
    fn namespaces_and_aliases_can_only_be_added_once() {
        let mut buffer = Vec::new();
        let mut encoder = XmlEncoder::new(ExportTarget::Stream(&mut buffer));
        encoder.begin().unwrap();
        encoder.add_namespaces(&["http://a/".to_owned()]).unwrap();
        assert!(encoder.add_namespaces(&["http://b/".to_owned()]).is_err());
        let mut aliases = AliasTable::new();
        aliases.insert("Int32", NodeId::new(0, 6u32));
        encoder.add_aliases(&aliases).unwrap();
        assert!(encoder.add_aliases(&aliases).is_err());
    }

    #[test]
    fn calls_before_begin_fail() {
        let mut buffer = Vec::new();
        let mut encoder = XmlEncoder::new(ExportTarget::Stream(&mut buffer));
        assert!(encoder.add_namespaces(&[]).is_err());
        assert!(encoder.end().is_err());
    }

    #[test]
    fn file_target_appears_only_after_end() {
        let dir = std::env::temp_dir().join("nodeset-export-test-enc");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.xml");
        let _ = std::fs::remove_file(&path);
        {
            let mut encoder = XmlEncoder::new(ExportTarget::File(path.clone()));
            encoder.begin().unwrap();
            encoder.add_node_object(&object_model()).unwrap();
            assert!(!path.exists());
            encoder.end().unwrap();
        }
        assert!(path.exists());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<UAObject"));
        std::fs::remove_file(&path).unwrap();
    }

    fn object_model() -> NodeIntermediateModel {
        let mut model = NodeIntermediateModel {
            node_id: ExpandedNodeId::new(NodeId::new(2, 10u32)),
            parent_node_id: Some(ExpandedNodeId::new(NodeId::new(0, 85u32))),
            node_class: NodeClass::Object,
            ..Default::default()
        };
        model.attributes.insert(
            AttributeId::BrowseName,
            Some(AttributeValue::QualifiedName(QualifiedName::new(2, "Obj"))),
        );
        model
    }

    fn reference_type_model() -> NodeIntermediateModel {
        let mut model = NodeIntermediateModel {
            node_id: ExpandedNodeId::new(NodeId::new(2, 200u32)),
            parent_node_id: None,
            node_class: NodeClass::ReferenceType,
            ..Default::default()
        };
        model.attributes.insert(
            AttributeId::BrowseName,
            Some(AttributeValue::QualifiedName(QualifiedName::new(2, "Feeds"))),
        );
        model.attributes.insert(
            AttributeId::IsAbstract,
            Some(AttributeValue::Boolean(false)),
        );
        model.attributes.insert(
            AttributeId::Symmetric,
            Some(AttributeValue::Boolean(false)),
        );
        model
    }

    #[test]
    fn reference_type_with_defaults_emits_minimal_attributes() {
        let text = encode(|encoder| {
            encoder
                .add_node_reference_type(&reference_type_model())
                .unwrap()
        });
        let doc = roxmltree::Document::parse(&text).unwrap();
        let reference_type = doc
            .descendants()
            .find(|n| n.tag_name().name() == "UAReferenceType")
            .unwrap();
        // Symmetric and IsAbstract equal their defaults, types never carry
        // a ParentNodeId.
        let names: Vec<&str> = reference_type.attributes().map(|a| a.name()).collect();
        assert_eq!(names, vec!["NodeId", "BrowseName"]);
        assert!(!reference_type
            .children()
            .any(|n| n.tag_name().name() == "InverseName"));
    }

    #[test]
    fn empty_inverse_name_is_omitted() {
        let mut model = reference_type_model();
        // An empty text suppresses the element even when a locale is set.
        model.attributes.insert(
            AttributeId::InverseName,
            Some(AttributeValue::LocalizedText(LocalizedText::new("en", ""))),
        );
        let text = encode(|encoder| encoder.add_node_reference_type(&model).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        assert!(!doc
            .descendants()
            .any(|n| n.tag_name().name() == "InverseName"));
    }

    #[test]
    fn inverse_name_locale_attribute_only_when_set() {
        let mut model = reference_type_model();
        model.attributes.insert(
            AttributeId::Symmetric,
            Some(AttributeValue::Boolean(true)),
        );
        model.attributes.insert(
            AttributeId::InverseName,
            Some(AttributeValue::LocalizedText(LocalizedText::new("", "FedBy"))),
        );
        let text = encode(|encoder| encoder.add_node_reference_type(&model).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        let reference_type = doc
            .descendants()
            .find(|n| n.tag_name().name() == "UAReferenceType")
            .unwrap();
        assert_eq!(reference_type.attribute("Symmetric"), Some("true"));
        let inverse_name = reference_type
            .children()
            .find(|n| n.tag_name().name() == "InverseName")
            .unwrap();
        assert_eq!(inverse_name.attribute("Locale"), None);
        assert_eq!(inverse_name.text(), Some("FedBy"));

        model.attributes.insert(
            AttributeId::InverseName,
            Some(AttributeValue::LocalizedText(LocalizedText::new(
                "en", "FedBy",
            ))),
        );
        let text = encode(|encoder| encoder.add_node_reference_type(&model).unwrap());
        let doc = roxmltree::Document::parse(&text).unwrap();
        let inverse_name = doc
            .descendants()
            .find(|n| n.tag_name().name() == "InverseName")
            .unwrap();
        assert_eq!(inverse_name.attribute("Locale"), Some("en"));
        assert_eq!(inverse_name.text(), Some("FedBy"));
    }
}
