// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Variable value payloads for `<Value>` elements.
//!
//! NodeSet files carry values in the `http://opcfoundation.org/UA/2008/02/Types.xsd`
//! schema, conventionally bound to the `uax` prefix: scalars as
//! `<uax:Int32>5</uax:Int32>`, arrays as `<uax:ListOfInt32>` wrapping one
//! scalar element per entry.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::writer::{XmlStreamWriter, XmlWriteError};

/// A scalar value of one of the standard OPC UA primitive types.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlVariantScalar {
    /// Boolean, `true`/`false`.
    Boolean(bool),
    /// Signed byte.
    SByte(i8),
    /// Unsigned byte.
    Byte(u8),
    /// Signed 16-bit int.
    Int16(i16),
    /// Unsigned 16-bit int.
    UInt16(u16),
    /// Signed 32-bit int.
    Int32(i32),
    /// Unsigned 32-bit int.
    UInt32(u32),
    /// Signed 64-bit int.
    Int64(i64),
    /// Unsigned 64-bit int.
    UInt64(u64),
    /// Float.
    Float(f32),
    /// Double.
    Double(f64),
    /// String.
    String(String),
    /// DateTime, serialized as RFC 3339 with millisecond precision.
    DateTime(DateTime<Utc>),
    /// Guid, serialized as its `<uax:String>` child per the Types schema.
    Guid(Uuid),
    /// ByteString, already base64 encoded.
    ByteString(String),
}

impl XmlVariantScalar {
    /// The element name for this scalar in the Types schema.
    pub fn xml_name(&self) -> &'static str {
        match self {
            XmlVariantScalar::Boolean(_) => "Boolean",
            XmlVariantScalar::SByte(_) => "SByte",
            XmlVariantScalar::Byte(_) => "Byte",
            XmlVariantScalar::Int16(_) => "Int16",
            XmlVariantScalar::UInt16(_) => "UInt16",
            XmlVariantScalar::Int32(_) => "Int32",
            XmlVariantScalar::UInt32(_) => "UInt32",
            XmlVariantScalar::Int64(_) => "Int64",
            XmlVariantScalar::UInt64(_) => "UInt64",
            XmlVariantScalar::Float(_) => "Float",
            XmlVariantScalar::Double(_) => "Double",
            XmlVariantScalar::String(_) => "String",
            XmlVariantScalar::DateTime(_) => "DateTime",
            XmlVariantScalar::Guid(_) => "Guid",
            XmlVariantScalar::ByteString(_) => "ByteString",
        }
    }

    fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        let tag = format!("uax:{}", self.xml_name());
        match self {
            XmlVariantScalar::Guid(v) => {
                // A Guid is a structured type in the Types schema, its
                // text lives in a nested String element.
                writer.write_start(&tag)?;
                writer.write_text_element("uax:String", &v.to_string())?;
                writer.write_end(&tag)
            }
            other => writer.write_text_element(&tag, &other.text()),
        }
    }

    fn text(&self) -> String {
        match self {
            XmlVariantScalar::Boolean(v) => v.to_string(),
            XmlVariantScalar::SByte(v) => v.to_string(),
            XmlVariantScalar::Byte(v) => v.to_string(),
            XmlVariantScalar::Int16(v) => v.to_string(),
            XmlVariantScalar::UInt16(v) => v.to_string(),
            XmlVariantScalar::Int32(v) => v.to_string(),
            XmlVariantScalar::UInt32(v) => v.to_string(),
            XmlVariantScalar::Int64(v) => v.to_string(),
            XmlVariantScalar::UInt64(v) => v.to_string(),
            XmlVariantScalar::Float(v) => v.to_string(),
            XmlVariantScalar::Double(v) => v.to_string(),
            XmlVariantScalar::String(v) => v.clone(),
            XmlVariantScalar::DateTime(v) => v.to_rfc3339_opts(SecondsFormat::Millis, true),
            XmlVariantScalar::Guid(v) => v.to_string(),
            XmlVariantScalar::ByteString(v) => v.clone(),
        }
    }
}

/// The payload of a `<Value>` element, either one scalar or a non-empty
/// homogeneous array.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlVariantValue {
    /// A single scalar.
    Scalar(XmlVariantScalar),
    /// A single dimension array. Must be non-empty and homogeneous; the
    /// list element name is derived from the first entry.
    Array(Vec<XmlVariantScalar>),
}

impl XmlVariantValue {
    /// Serialize the payload, wrapped in its `<Value>` element.
    pub fn write<W: Write>(&self, writer: &mut XmlStreamWriter<W>) -> Result<(), XmlWriteError> {
        writer.write_start("Value")?;
        match self {
            XmlVariantValue::Scalar(scalar) => scalar.write(writer)?,
            XmlVariantValue::Array(values) => {
                let Some(first) = values.first() else {
                    return writer.write_end("Value");
                };
                let list_tag = format!("uax:ListOf{}", first.xml_name());
                writer.write_start(&list_tag)?;
                for value in values {
                    value.write(writer)?;
                }
                writer.write_end(&list_tag)?;
            }
        }
        writer.write_end("Value")
    }
}
