// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Alias names for standard node ids, and the alias table accumulated over
//! an export run.

use hashbrown::HashSet;
use nodeset_types::{Identifier, NodeId};

/// Alias for a standard data type node, `None` for anything custom.
pub fn data_type_alias(node_id: &NodeId) -> Option<&'static str> {
    if node_id.namespace != 0 {
        return None;
    }
    let Identifier::Numeric(id) = node_id.identifier else {
        return None;
    };
    Some(match id {
        1 => "Boolean",
        2 => "SByte",
        3 => "Byte",
        4 => "Int16",
        5 => "UInt16",
        6 => "Int32",
        7 => "UInt32",
        8 => "Int64",
        9 => "UInt64",
        10 => "Float",
        11 => "Double",
        12 => "String",
        13 => "DateTime",
        14 => "Guid",
        15 => "ByteString",
        16 => "XmlElement",
        17 => "NodeId",
        18 => "ExpandedNodeId",
        19 => "StatusCode",
        20 => "QualifiedName",
        21 => "LocalizedText",
        22 => "Structure",
        23 => "DataValue",
        24 => "BaseDataType",
        25 => "DiagnosticInfo",
        26 => "Number",
        27 => "Integer",
        28 => "UInteger",
        29 => "Enumeration",
        30 => "Image",
        _ => return None,
    })
}

/// Alias for a standard reference type node, `None` for anything custom.
pub fn reference_type_alias(node_id: &NodeId) -> Option<&'static str> {
    if node_id.namespace != 0 {
        return None;
    }
    let Identifier::Numeric(id) = node_id.identifier else {
        return None;
    };
    Some(match id {
        31 => "References",
        32 => "NonHierarchicalReferences",
        33 => "HierarchicalReferences",
        34 => "HasChild",
        35 => "Organizes",
        36 => "HasEventSource",
        37 => "HasModellingRule",
        38 => "HasEncoding",
        39 => "HasDescription",
        40 => "HasTypeDefinition",
        41 => "GeneratesEvent",
        44 => "Aggregates",
        45 => "HasSubtype",
        46 => "HasProperty",
        47 => "HasComponent",
        48 => "HasNotifier",
        49 => "HasOrderedComponent",
        _ => return None,
    })
}

/// The alias table of one export run: alias name → node id, in first
/// insertion order. Only standard ids ever land here; the table grows while
/// batches are processed and is emitted once, after all of them.
#[derive(Debug, Default)]
pub struct AliasTable {
    entries: Vec<(String, NodeId)>,
    seen: HashSet<String>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alias unless already present. The first mapping for a name
    /// wins.
    pub fn insert(&mut self, alias: &str, node_id: NodeId) {
        if self.seen.insert(alias.to_owned()) {
            self.entries.push((alias.to_owned(), node_id));
        }
    }

    /// Whether the table holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether a name is present.
    pub fn contains(&self, alias: &str) -> bool {
        self.seen.contains(alias)
    }

    /// The entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, NodeId)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use nodeset_types::NodeId;

    use super::{data_type_alias, reference_type_alias, AliasTable};

    #[test]
    fn standard_data_types_have_aliases() {
        assert_eq!(data_type_alias(&NodeId::new(0, 6u32)), Some("Int32"));
        assert_eq!(data_type_alias(&NodeId::new(0, 24u32)), Some("BaseDataType"));
        assert_eq!(data_type_alias(&NodeId::new(0, 30u32)), Some("Image"));
    }

    #[test]
    fn custom_types_have_no_alias() {
        assert_eq!(data_type_alias(&NodeId::new(2, 6u32)), None);
        assert_eq!(data_type_alias(&NodeId::new(0, "Custom")), None);
        assert_eq!(data_type_alias(&NodeId::new(0, 31u32)), None);
        assert_eq!(reference_type_alias(&NodeId::new(0, 6u32)), None);
        assert_eq!(reference_type_alias(&NodeId::new(1, 47u32)), None);
    }

    #[test]
    fn reference_types_have_aliases() {
        assert_eq!(reference_type_alias(&NodeId::new(0, 35u32)), Some("Organizes"));
        assert_eq!(
            reference_type_alias(&NodeId::new(0, 40u32)),
            Some("HasTypeDefinition")
        );
    }

    #[test]
    fn table_keeps_insertion_order_and_dedupes() {
        let mut table = AliasTable::new();
        table.insert("Int32", NodeId::new(0, 6u32));
        table.insert("Organizes", NodeId::new(0, 35u32));
        table.insert("Int32", NodeId::new(0, 6u32));
        assert_eq!(table.len(), 2);
        let names: Vec<_> = table.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Int32", "Organizes"]);
        assert!(table.contains("Organizes"));
        assert!(!table.contains("HasComponent"));
    }
}
