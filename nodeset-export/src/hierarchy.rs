// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Knowledge about the standard reference type hierarchy.

use nodeset_types::{Identifier, NodeId, ReferenceTypeId};

/// The transitive closure of HierarchicalReferences (i=33) in the standard
/// address space.
const HIERARCHICAL_REFERENCE_IDS: [u32; 10] = [
    ReferenceTypeId::HierarchicalReferences as u32,
    ReferenceTypeId::HasChild as u32,
    ReferenceTypeId::Organizes as u32,
    ReferenceTypeId::HasEventSource as u32,
    ReferenceTypeId::Aggregates as u32,
    ReferenceTypeId::HasSubtype as u32,
    ReferenceTypeId::HasProperty as u32,
    ReferenceTypeId::HasComponent as u32,
    ReferenceTypeId::HasNotifier as u32,
    ReferenceTypeId::HasOrderedComponent as u32,
];

/// Whether `reference_type_id` names one of the standard hierarchical
/// reference types.
pub fn is_hierarchical_reference(reference_type_id: &NodeId) -> bool {
    reference_type_id.namespace == 0
        && matches!(
            reference_type_id.identifier,
            Identifier::Numeric(id) if HIERARCHICAL_REFERENCE_IDS.contains(&id)
        )
}

/// Whether `node_id` belongs to the OPC UA standard address space. The
/// standard reserves numeric identifiers in namespace 0; custom ns=0 nodes
/// use string, GUID or opaque identifiers.
pub fn is_standard_ns0_node(node_id: &NodeId) -> bool {
    node_id.namespace == 0 && node_id.is_numeric()
}

#[cfg(test)]
mod tests {
    use nodeset_types::NodeId;

    use super::{is_hierarchical_reference, is_standard_ns0_node};

    #[test]
    fn hierarchical_references() {
        for id in [33u32, 34, 35, 36, 44, 45, 46, 47, 48, 49] {
            assert!(is_hierarchical_reference(&NodeId::new(0, id)), "i={id}");
        }
        // HasTypeDefinition and friends are non-hierarchical.
        for id in [31u32, 32, 37, 38, 39, 40, 41] {
            assert!(!is_hierarchical_reference(&NodeId::new(0, id)), "i={id}");
        }
        // Only ns=0 types can be hierarchical.
        assert!(!is_hierarchical_reference(&NodeId::new(2, 35u32)));
    }

    #[test]
    fn standard_ns0_membership() {
        assert!(is_standard_ns0_node(&NodeId::new(0, 85u32)));
        assert!(!is_standard_ns0_node(&NodeId::new(0, "Custom")));
        assert!(!is_standard_ns0_node(&NodeId::new(2, 85u32)));
    }
}
