// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The [`NodeClass`] enumeration.

use std::fmt;

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
#[repr(u32)]
/// Node class, from the OPC UA standard. Defined in Part 3, 5.9.
pub enum NodeClass {
    /// Class is unknown, used for nodes the server failed to classify.
    #[default]
    Unspecified = 0,
    /// Object node.
    Object = 1,
    /// Variable node, has a value.
    Variable = 2,
    /// Method node.
    Method = 4,
    /// Object type node.
    ObjectType = 8,
    /// Variable type node.
    VariableType = 16,
    /// Reference type node.
    ReferenceType = 32,
    /// Data type node.
    DataType = 64,
    /// View node.
    View = 128,
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeClass::Unspecified => "Unspecified",
            NodeClass::Object => "Object",
            NodeClass::Variable => "Variable",
            NodeClass::Method => "Method",
            NodeClass::ObjectType => "ObjectType",
            NodeClass::VariableType => "VariableType",
            NodeClass::ReferenceType => "ReferenceType",
            NodeClass::DataType => "DataType",
            NodeClass::View => "View",
        };
        write!(f, "{name}")
    }
}

impl NodeClass {
    /// Get a node class from the numeric wire value, `None` for anything
    /// outside the closed set.
    pub fn from_u32(value: u32) -> Option<NodeClass> {
        Some(match value {
            0 => NodeClass::Unspecified,
            1 => NodeClass::Object,
            2 => NodeClass::Variable,
            4 => NodeClass::Method,
            8 => NodeClass::ObjectType,
            16 => NodeClass::VariableType,
            32 => NodeClass::ReferenceType,
            64 => NodeClass::DataType,
            128 => NodeClass::View,
            _ => return None,
        })
    }

    /// Whether this class is one of the four type classes.
    pub fn is_type_class(&self) -> bool {
        matches!(
            self,
            NodeClass::ObjectType
                | NodeClass::VariableType
                | NodeClass::ReferenceType
                | NodeClass::DataType
        )
    }
}
