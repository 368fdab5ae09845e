// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Tagged value sums: [`Variant`] for variable values and [`AttributeValue`]
//! for node attribute payloads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    byte_string::ByteString, expanded_node_id::ExpandedNodeId, localized_text::LocalizedText,
    node_id::NodeId, qualified_name::QualifiedName,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// Type of a scalar variant value.
pub enum VariantScalarTypeId {
    /// Boolean
    Boolean,
    /// Signed byte
    SByte,
    /// Unsigned byte
    Byte,
    /// Signed 16-bit int
    Int16,
    /// Unsigned 16-bit int
    UInt16,
    /// Signed 32-bit int
    Int32,
    /// Unsigned 32-bit int
    UInt32,
    /// Signed 64-bit int
    Int64,
    /// Unsigned 64-bit int
    UInt64,
    /// Float
    Float,
    /// Double
    Double,
    /// String
    String,
    /// DateTime
    DateTime,
    /// Guid
    Guid,
    /// ByteString
    ByteString,
}

impl VariantScalarTypeId {
    /// Get the XML name of a variant type, as used for element names in the
    /// `http://opcfoundation.org/UA/2008/02/Types.xsd` schema.
    pub fn xml_name(&self) -> &'static str {
        match self {
            VariantScalarTypeId::Boolean => "Boolean",
            VariantScalarTypeId::SByte => "SByte",
            VariantScalarTypeId::Byte => "Byte",
            VariantScalarTypeId::Int16 => "Int16",
            VariantScalarTypeId::UInt16 => "UInt16",
            VariantScalarTypeId::Int32 => "Int32",
            VariantScalarTypeId::UInt32 => "UInt32",
            VariantScalarTypeId::Int64 => "Int64",
            VariantScalarTypeId::UInt64 => "UInt64",
            VariantScalarTypeId::Float => "Float",
            VariantScalarTypeId::Double => "Double",
            VariantScalarTypeId::String => "String",
            VariantScalarTypeId::DateTime => "DateTime",
            VariantScalarTypeId::Guid => "Guid",
            VariantScalarTypeId::ByteString => "ByteString",
        }
    }
}

/// A `Variant` holds the subset of built-in OPC UA data types the exporter
/// emits: scalars of the standard primitive types and single dimension
/// homogeneous arrays of those scalars.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum Variant {
    /// Empty type has no value. Equivalent to a null value.
    #[default]
    Empty,
    /// Boolean
    Boolean(bool),
    /// Signed byte
    SByte(i8),
    /// Unsigned byte
    Byte(u8),
    /// Signed 16-bit int
    Int16(i16),
    /// Unsigned 16-bit int
    UInt16(u16),
    /// Signed 32-bit int
    Int32(i32),
    /// Unsigned 32-bit int
    UInt32(u32),
    /// Signed 64-bit int
    Int64(i64),
    /// Unsigned 64-bit int
    UInt64(u64),
    /// Float
    Float(f32),
    /// Double
    Double(f64),
    /// String
    String(String),
    /// DateTime
    DateTime(Box<DateTime<Utc>>),
    /// Guid
    Guid(Box<Uuid>),
    /// ByteString
    ByteString(ByteString),
    /// Single dimension array of scalars, all of the declared type.
    Array(VariantScalarTypeId, Vec<Variant>),
}

macro_rules! impl_variant_from {
    ($tp: ty, $vt: path) => {
        impl From<$tp> for Variant {
            fn from(value: $tp) -> Self {
                $vt(value)
            }
        }
    };
}

impl_variant_from!(bool, Variant::Boolean);
impl_variant_from!(i8, Variant::SByte);
impl_variant_from!(u8, Variant::Byte);
impl_variant_from!(i16, Variant::Int16);
impl_variant_from!(u16, Variant::UInt16);
impl_variant_from!(i32, Variant::Int32);
impl_variant_from!(u32, Variant::UInt32);
impl_variant_from!(i64, Variant::Int64);
impl_variant_from!(u64, Variant::UInt64);
impl_variant_from!(f32, Variant::Float);
impl_variant_from!(f64, Variant::Double);
impl_variant_from!(String, Variant::String);
impl_variant_from!(ByteString, Variant::ByteString);

impl<'a> From<&'a str> for Variant {
    fn from(value: &'a str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl From<DateTime<Utc>> for Variant {
    fn from(value: DateTime<Utc>) -> Self {
        Variant::DateTime(Box::new(value))
    }
}

impl From<Uuid> for Variant {
    fn from(value: Uuid) -> Self {
        Variant::Guid(Box::new(value))
    }
}

impl Variant {
    /// The scalar type of this value, the element type for arrays, `None`
    /// when empty.
    pub fn scalar_type_id(&self) -> Option<VariantScalarTypeId> {
        Some(match self {
            Variant::Empty => return None,
            Variant::Boolean(_) => VariantScalarTypeId::Boolean,
            Variant::SByte(_) => VariantScalarTypeId::SByte,
            Variant::Byte(_) => VariantScalarTypeId::Byte,
            Variant::Int16(_) => VariantScalarTypeId::Int16,
            Variant::UInt16(_) => VariantScalarTypeId::UInt16,
            Variant::Int32(_) => VariantScalarTypeId::Int32,
            Variant::UInt32(_) => VariantScalarTypeId::UInt32,
            Variant::Int64(_) => VariantScalarTypeId::Int64,
            Variant::UInt64(_) => VariantScalarTypeId::UInt64,
            Variant::Float(_) => VariantScalarTypeId::Float,
            Variant::Double(_) => VariantScalarTypeId::Double,
            Variant::String(_) => VariantScalarTypeId::String,
            Variant::DateTime(_) => VariantScalarTypeId::DateTime,
            Variant::Guid(_) => VariantScalarTypeId::Guid,
            Variant::ByteString(_) => VariantScalarTypeId::ByteString,
            Variant::Array(ty, _) => *ty,
        })
    }

    /// Test if the variant holds nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// Build an array variant from an iterator of scalars, verifying each
    /// element against the declared type. `None` if any element mismatches
    /// or is itself an array.
    pub fn array_of(
        ty: VariantScalarTypeId,
        values: impl IntoIterator<Item = Variant>,
    ) -> Option<Variant> {
        let values: Vec<Variant> = values.into_iter().collect();
        if values
            .iter()
            .any(|v| v.scalar_type_id() != Some(ty) || matches!(v, Variant::Array(..)))
        {
            return None;
        }
        Some(Variant::Array(ty, values))
    }

    /// Interpret this value as an array of strings, as read from the server
    /// namespace array. `None` when it is anything else.
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        let Variant::Array(VariantScalarTypeId::String, values) = self else {
            return None;
        };
        values
            .iter()
            .map(|v| match v {
                Variant::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

/// A node attribute payload, one arm per value shape the exporter handles.
///
/// The `Value` attribute nests a [`Variant`]; everything else maps onto the
/// concrete type the OPC UA standard gives the attribute.
#[derive(PartialEq, Debug, Clone)]
pub enum AttributeValue {
    /// Boolean attributes: IsAbstract, Symmetric, Historizing.
    Boolean(bool),
    /// Byte attributes: EventNotifier, AccessLevel, UserAccessLevel.
    Byte(u8),
    /// Int32 attributes: ValueRank.
    Int32(i32),
    /// UInt32 attributes: WriteMask, UserWriteMask.
    UInt32(u32),
    /// Double attributes: MinimumSamplingInterval.
    Double(f64),
    /// Plain string payloads.
    String(String),
    /// BrowseName.
    QualifiedName(QualifiedName),
    /// DisplayName, Description, InverseName.
    LocalizedText(LocalizedText),
    /// DataType and other id-valued attributes.
    NodeId(NodeId),
    /// Id-valued attributes crossing namespaces.
    ExpandedNodeId(ExpandedNodeId),
    /// ArrayDimensions.
    ArrayDimensions(Vec<u32>),
    /// The Value attribute.
    Value(Variant),
}

impl AttributeValue {
    /// The boolean payload, if that is what is held.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// The byte payload, if that is what is held.
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            AttributeValue::Byte(v) => Some(*v),
            _ => None,
        }
    }

    /// The Int32 payload, if that is what is held.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            AttributeValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// The UInt32 payload, if that is what is held.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttributeValue::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// The double payload, if that is what is held.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The qualified name payload, if that is what is held.
    pub fn as_qualified_name(&self) -> Option<&QualifiedName> {
        match self {
            AttributeValue::QualifiedName(v) => Some(v),
            _ => None,
        }
    }

    /// The localized text payload, if that is what is held.
    pub fn as_localized_text(&self) -> Option<&LocalizedText> {
        match self {
            AttributeValue::LocalizedText(v) => Some(v),
            _ => None,
        }
    }

    /// The node id payload, if that is what is held.
    pub fn as_node_id(&self) -> Option<&NodeId> {
        match self {
            AttributeValue::NodeId(v) => Some(v),
            _ => None,
        }
    }

    /// The array dimensions payload, if that is what is held.
    pub fn as_array_dimensions(&self) -> Option<&[u32]> {
        match self {
            AttributeValue::ArrayDimensions(v) => Some(v),
            _ => None,
        }
    }

    /// The nested variant, if this is a `Value` payload.
    pub fn as_value(&self) -> Option<&Variant> {
        match self {
            AttributeValue::Value(v) => Some(v),
            _ => None,
        }
    }
}
