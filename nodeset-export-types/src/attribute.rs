// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The [`AttributeId`] enum, identifying OPC UA node attributes by a numeric
//! value. Defined in Part 4, Figure B.7. Only the attributes the exporter
//! reads are represented.

use std::{error::Error, fmt};

use log::debug;

#[derive(Debug)]
/// Error returned when working with an attribute ID.
pub struct AttributeIdError;

impl fmt::Display for AttributeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeIdError")
    }
}

impl Error for AttributeIdError {}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
/// Node attribute ID, from the OPC UA standard.
pub enum AttributeId {
    /// Node ID.
    NodeId = 1,
    /// Node class.
    NodeClass = 2,
    /// Browse name.
    BrowseName = 3,
    /// Display name.
    DisplayName = 4,
    /// Description.
    Description = 5,
    /// Write mask.
    WriteMask = 6,
    /// User write mask.
    UserWriteMask = 7,
    /// Is abstract, applies to type nodes.
    IsAbstract = 8,
    /// Is symmetric, applies to reference types.
    Symmetric = 9,
    /// Inverse name of reference type.
    InverseName = 10,
    /// Whether this object can produce events.
    EventNotifier = 12,
    /// Variable value.
    Value = 13,
    /// Data type.
    DataType = 14,
    /// Variable value rank.
    ValueRank = 15,
    /// Variable array dimensions.
    ArrayDimensions = 16,
    /// Variable access level.
    AccessLevel = 17,
    /// Variable user access level.
    UserAccessLevel = 18,
    /// Variable minimum sampling interval.
    MinimumSamplingInterval = 19,
    /// Whether a variable stores history.
    Historizing = 20,
    /// Data type definition.
    DataTypeDefinition = 23,
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl AttributeId {
    /// Try to get this attribute ID from a 32 bit integer.
    pub fn from_u32(attribute_id: u32) -> Result<AttributeId, AttributeIdError> {
        let attribute_id = match attribute_id {
            1 => AttributeId::NodeId,
            2 => AttributeId::NodeClass,
            3 => AttributeId::BrowseName,
            4 => AttributeId::DisplayName,
            5 => AttributeId::Description,
            6 => AttributeId::WriteMask,
            7 => AttributeId::UserWriteMask,
            8 => AttributeId::IsAbstract,
            9 => AttributeId::Symmetric,
            10 => AttributeId::InverseName,
            12 => AttributeId::EventNotifier,
            13 => AttributeId::Value,
            14 => AttributeId::DataType,
            15 => AttributeId::ValueRank,
            16 => AttributeId::ArrayDimensions,
            17 => AttributeId::AccessLevel,
            18 => AttributeId::UserAccessLevel,
            19 => AttributeId::MinimumSamplingInterval,
            20 => AttributeId::Historizing,
            23 => AttributeId::DataTypeDefinition,
            _ => {
                debug!("Invalid attribute id {}", attribute_id);
                return Err(AttributeIdError);
            }
        };
        Ok(attribute_id)
    }
}
