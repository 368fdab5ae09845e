// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Write-side model of UANodeSet documents.
//!
//! The structs here mirror the element vocabulary of the NodeSet2 XSD at
//! `http://opcfoundation.org/UA/2011/03/UANodeSet.xsd`: a [`UANodeSet`] root
//! holding namespace URIs, aliases and node elements, with the common node
//! layering (`UANodeBase` → `UAInstance` / `UAType`) the schema uses.
//!
//! Identifiers and names are carried as already-rendered text; optional XML
//! attributes are `Option` fields and are simply not emitted when `None`.
//! Deciding *when* an attribute is at its schema default and must be
//! suppressed is the producer's concern, not this model's.

use std::io::Write;

use crate::writer::{XmlStreamWriter, XmlWriteError};

use super::value::XmlVariantValue;

const UA_NODESET_XMLNS: &str = "http://opcfoundation.org/UA/2011/03/UANodeSet.xsd";
const XSI_XMLNS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const UAX_XMLNS: &str = "http://opcfoundation.org/UA/2008/02/Types.xsd";
const XSD_XMLNS: &str = "http://www.w3.org/2001/XMLSchema";

macro_rules! value_wrapper {
    ($key:ident, $doc:expr) => {
        #[derive(Debug, Default, Clone, PartialEq, Eq)]
        #[doc = $doc]
        pub struct $key(pub String);

        impl From<String> for $key {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl<'a> From<&'a str> for $key {
            fn from(value: &'a str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

value_wrapper!(NodeId, "An OPC UA node ID or alias, rendered as text.");
value_wrapper!(
    QualifiedName,
    "An OPC UA QualifiedName on the form Index:Name, rendered as text."
);

/// A full OPC UA node set document.
#[derive(Debug, Default)]
pub struct UANodeSet {
    /// List of namespace URIs covered by this node set.
    pub namespace_uris: Option<UriTable>,
    /// List of aliases available in this node set.
    pub aliases: Option<AliasTable>,
    /// The full list of nodes, in emission order.
    pub nodes: Vec<UANode>,
    /// Comment emitted directly inside the root element.
    pub leading_comment: Option<String>,
}

impl UANodeSet {
    /// Serialize the whole document: XML declaration, the `UANodeSet` root
    /// with its schema namespaces, then `NamespaceUris`, `Aliases` and the
    /// node elements, in that order.
    pub fn write_document<W: Write>(
        &self,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<(), XmlWriteError> {
        writer.write_declaration()?;
        writer.write_start_with(
            "UANodeSet",
            &[
                ("xmlns:xsi", XSI_XMLNS),
                ("xmlns:uax", UAX_XMLNS),
                ("xmlns:xsd", XSD_XMLNS),
                ("xmlns", UA_NODESET_XMLNS),
            ],
        )?;
        if let Some(comment) = &self.leading_comment {
            writer.write_comment(comment)?;
        }
        if let Some(uris) = &self.namespace_uris {
            uris.write(writer)?;
        }
        if let Some(aliases) = &self.aliases {
            aliases.write(writer)?;
        }
        for node in &self.nodes {
            node.write(writer)?;
        }
        writer.write_end("UANodeSet")
    }
}

/// List of URIs, `<NamespaceUris>`.
#[derive(Debug, Default)]
pub struct UriTable {
    /// URIs in server order.
    pub uris: Vec<String>,
}

impl UriTable {
    fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        writer.write_start("NamespaceUris")?;
        for uri in &self.uris {
            writer.write_text_element("Uri", uri)?;
        }
        writer.write_end("NamespaceUris")
    }
}

/// Entry in the alias table.
#[derive(Debug, Clone)]
pub struct NodeIdAlias {
    /// Node ID the alias stands for.
    pub id: NodeId,
    /// Alias name.
    pub alias: String,
}

/// List of aliases used in the nodeset, `<Aliases>`.
#[derive(Debug, Default)]
pub struct AliasTable {
    /// Alias list, in insertion order.
    pub aliases: Vec<NodeIdAlias>,
}

impl AliasTable {
    fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        writer.write_start("Aliases")?;
        for alias in &self.aliases {
            writer.write_start_with("Alias", &[("Alias", alias.alias.as_str())])?;
            writer.write_text(&alias.id.0)?;
            writer.write_end("Alias")?;
        }
        writer.write_end("Aliases")
    }
}

/// A reference defined inside a node.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Target node ID, rendered as text.
    pub node_id: NodeId,
    /// Reference type, an alias or a rendered node ID.
    pub reference_type: NodeId,
    /// Whether this is a forward or inverse reference.
    pub is_forward: bool,
}

/// List of references in a node definition, `<References>`. The element is
/// required by the schema and emitted even when empty.
#[derive(Debug, Default, Clone)]
pub struct ListOfReferences {
    /// References.
    pub references: Vec<Reference>,
}

impl ListOfReferences {
    fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        if self.references.is_empty() {
            return writer.write_empty("References");
        }
        writer.write_start("References")?;
        for reference in &self.references {
            if reference.is_forward {
                writer.write_start_with(
                    "Reference",
                    &[("ReferenceType", reference.reference_type.0.as_str())],
                )?;
            } else {
                writer.write_start_with(
                    "Reference",
                    &[
                        ("ReferenceType", reference.reference_type.0.as_str()),
                        ("IsForward", "false"),
                    ],
                )?;
            }
            writer.write_text(&reference.node_id.0)?;
            writer.write_end("Reference")?;
        }
        writer.write_end("References")
    }
}

/// A localized text with a body and a locale, used for display names,
/// descriptions and inverse names.
#[derive(Debug, Default, Clone)]
pub struct LocalizedTextValue {
    /// Localized text body.
    pub text: String,
    /// Localized text locale, omitted when empty.
    pub locale: String,
}

impl LocalizedTextValue {
    fn write_as<W: Write>(
        &self,
        tag: &str,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<(), XmlWriteError> {
        if self.locale.is_empty() {
            writer.write_text_element(tag, &self.text)
        } else {
            writer.write_start_with(tag, &[("Locale", self.locale.as_str())])?;
            writer.write_text(&self.text)?;
            writer.write_end(tag)
        }
    }
}

/// Common fields for nodeset nodes.
#[derive(Debug, Default, Clone)]
pub struct UANodeBase {
    /// Node ID of this node. Required.
    pub node_id: NodeId,
    /// Browse name of this node. Required.
    pub browse_name: QualifiedName,
    /// Display name, omitted when `None`.
    pub display_name: Option<LocalizedTextValue>,
    /// Description, omitted when `None`.
    pub description: Option<LocalizedTextValue>,
    /// Write mask, omitted when `None`.
    pub write_mask: Option<u32>,
    /// User write mask, omitted when `None`.
    pub user_write_mask: Option<u32>,
    /// List of references.
    pub references: ListOfReferences,
}

impl UANodeBase {
    fn push_attributes(&self, attributes: &mut Vec<(&'static str, String)>) {
        attributes.push(("NodeId", self.node_id.0.clone()));
        attributes.push(("BrowseName", self.browse_name.0.clone()));
        if let Some(write_mask) = self.write_mask {
            attributes.push(("WriteMask", write_mask.to_string()));
        }
        if let Some(user_write_mask) = self.user_write_mask {
            attributes.push(("UserWriteMask", user_write_mask.to_string()));
        }
    }

    fn write_children<W: Write>(
        &self,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<(), XmlWriteError> {
        if let Some(display_name) = &self.display_name {
            display_name.write_as("DisplayName", writer)?;
        }
        if let Some(description) = &self.description {
            description.write_as("Description", writer)?;
        }
        self.references.write(writer)
    }
}

/// Base type for node instances, adds the parent node id.
#[derive(Debug, Default, Clone)]
pub struct UAInstance {
    /// Common fields.
    pub base: UANodeBase,
    /// Parent node ID, omitted when `None`.
    pub parent_node_id: Option<NodeId>,
}

impl UAInstance {
    fn push_attributes(&self, attributes: &mut Vec<(&'static str, String)>) {
        self.base.push_attributes(attributes);
        if let Some(parent) = &self.parent_node_id {
            attributes.push(("ParentNodeId", parent.0.clone()));
        }
    }
}

/// Base type for node set types, adds the abstract flag.
#[derive(Debug, Default, Clone)]
pub struct UAType {
    /// Common fields.
    pub base: UANodeBase,
    /// Whether this type is abstract, omitted when `None`.
    pub is_abstract: Option<bool>,
}

impl UAType {
    fn push_attributes(&self, attributes: &mut Vec<(&'static str, String)>) {
        self.base.push_attributes(attributes);
        if let Some(is_abstract) = self.is_abstract {
            attributes.push(("IsAbstract", is_abstract.to_string()));
        }
    }
}

/// OPC UA Object in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UAObject {
    /// Base data.
    pub base: UAInstance,
    /// Node event notifier, omitted when `None`.
    pub event_notifier: Option<u8>,
}

/// Variable defined in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UAVariable {
    /// Base data.
    pub base: UAInstance,
    /// Data type alias or rendered id, omitted when `None`.
    pub data_type: Option<NodeId>,
    /// Value rank, omitted when `None`.
    pub value_rank: Option<i32>,
    /// Array dimensions as a comma separated list, omitted when `None`.
    pub array_dimensions: Option<String>,
    /// Access level, omitted when `None`.
    pub access_level: Option<u8>,
    /// User access level, omitted when `None`.
    pub user_access_level: Option<u8>,
    /// Minimum sampling interval, omitted when `None`.
    pub minimum_sampling_interval: Option<f64>,
    /// Historizing, omitted when `None`.
    pub historizing: Option<bool>,
    /// Initial value.
    pub value: Option<XmlVariantValue>,
}

impl UAVariable {
    fn push_value_attributes(&self, attributes: &mut Vec<(&'static str, String)>) {
        if let Some(data_type) = &self.data_type {
            attributes.push(("DataType", data_type.0.clone()));
        }
        if let Some(value_rank) = self.value_rank {
            attributes.push(("ValueRank", value_rank.to_string()));
        }
        if let Some(array_dimensions) = &self.array_dimensions {
            attributes.push(("ArrayDimensions", array_dimensions.clone()));
        }
        if let Some(access_level) = self.access_level {
            attributes.push(("AccessLevel", access_level.to_string()));
        }
        if let Some(user_access_level) = self.user_access_level {
            attributes.push(("UserAccessLevel", user_access_level.to_string()));
        }
        if let Some(interval) = self.minimum_sampling_interval {
            attributes.push(("MinimumSamplingInterval", interval.to_string()));
        }
        if let Some(historizing) = self.historizing {
            attributes.push(("Historizing", historizing.to_string()));
        }
    }
}

/// Object type defined in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UAObjectType {
    /// Base data.
    pub base: UAType,
}

/// Variable type defined in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UAVariableType {
    /// Base data.
    pub base: UAType,
    /// Data type alias or rendered id, omitted when `None`.
    pub data_type: Option<NodeId>,
    /// Value rank, omitted when `None`.
    pub value_rank: Option<i32>,
    /// Array dimensions, omitted when `None`.
    pub array_dimensions: Option<String>,
    /// Default value of instances of this type.
    pub value: Option<XmlVariantValue>,
}

/// Reference type defined in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UAReferenceType {
    /// Base data.
    pub base: UAType,
    /// Whether forward and inverse references use the same name, omitted
    /// when `None`.
    pub symmetric: Option<bool>,
    /// Inverse name.
    pub inverse_name: Option<LocalizedTextValue>,
}

/// Data type defined in a nodeset.
#[derive(Debug, Default, Clone)]
pub struct UADataType {
    /// Base data.
    pub base: UAType,
}

/// A NodeSet2 node element.
#[derive(Debug, Clone)]
pub enum UANode {
    /// Object.
    Object(UAObject),
    /// Variable, can have a value.
    Variable(UAVariable),
    /// Object type.
    ObjectType(UAObjectType),
    /// Variable type, can have a value.
    VariableType(UAVariableType),
    /// Reference type.
    ReferenceType(UAReferenceType),
    /// Data type.
    DataType(UADataType),
}

impl UANode {
    /// The element tag for this node class.
    pub fn tag_name(&self) -> &'static str {
        match self {
            UANode::Object(_) => "UAObject",
            UANode::Variable(_) => "UAVariable",
            UANode::ObjectType(_) => "UAObjectType",
            UANode::VariableType(_) => "UAVariableType",
            UANode::ReferenceType(_) => "UAReferenceType",
            UANode::DataType(_) => "UADataType",
        }
    }

    /// Get the base node, independent of node class.
    pub fn base(&self) -> &UANodeBase {
        match self {
            UANode::Object(n) => &n.base.base,
            UANode::Variable(n) => &n.base.base,
            UANode::ObjectType(n) => &n.base.base,
            UANode::VariableType(n) => &n.base.base,
            UANode::ReferenceType(n) => &n.base.base,
            UANode::DataType(n) => &n.base.base,
        }
    }

    fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        let tag = self.tag_name();
        let mut attributes: Vec<(&'static str, String)> = Vec::new();
        match self {
            UANode::Object(n) => {
                n.base.push_attributes(&mut attributes);
                if let Some(event_notifier) = n.event_notifier {
                    attributes.push(("EventNotifier", event_notifier.to_string()));
                }
            }
            UANode::Variable(n) => {
                n.base.push_attributes(&mut attributes);
                n.push_value_attributes(&mut attributes);
            }
            UANode::ObjectType(n) => n.base.push_attributes(&mut attributes),
            UANode::VariableType(n) => {
                n.base.push_attributes(&mut attributes);
                if let Some(data_type) = &n.data_type {
                    attributes.push(("DataType", data_type.0.clone()));
                }
                if let Some(value_rank) = n.value_rank {
                    attributes.push(("ValueRank", value_rank.to_string()));
                }
                if let Some(array_dimensions) = &n.array_dimensions {
                    attributes.push(("ArrayDimensions", array_dimensions.clone()));
                }
            }
            UANode::ReferenceType(n) => {
                n.base.push_attributes(&mut attributes);
                if let Some(symmetric) = n.symmetric {
                    attributes.push(("Symmetric", symmetric.to_string()));
                }
            }
            UANode::DataType(n) => n.base.push_attributes(&mut attributes),
        }

        let borrowed: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        writer.write_start_with(tag, &borrowed)?;

        self.base().write_children(writer)?;
        match self {
            UANode::ReferenceType(n) => {
                if let Some(inverse_name) = &n.inverse_name {
                    inverse_name.write_as("InverseName", writer)?;
                }
            }
            UANode::Variable(n) => {
                if let Some(value) = &n.value {
                    value.write(writer)?;
                }
            }
            UANode::VariableType(n) => {
                if let Some(value) = &n.value {
                    value.write(writer)?;
                }
            }
            _ => {}
        }
        writer.write_end(tag)
    }
}
