// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Recursive discovery of the nodes below a starting node.

use hashbrown::HashSet;
use log::trace;
use nodeset_types::{ExpandedNodeId, NodeClass};

use crate::{adapter::ServerAdapter, errors::ExportResult, hierarchy::is_hierarchical_reference};

/// Collect `start` and every node reachable from it through forward
/// hierarchical references, once each, in depth-first pre-order with
/// children in server order.
///
/// Nodes whose class is in `ignored_classes` are collected but their
/// subtrees are not entered. A starting node the server does not know
/// yields a single-element list; whether that is an error is decided later
/// in the pipeline. References to nodes on other servers are not followed.
pub fn browse_all<A: ServerAdapter>(
    adapter: &mut A,
    start: &ExpandedNodeId,
    ignored_classes: &HashSet<NodeClass>,
) -> ExportResult<Vec<ExpandedNodeId>> {
    let mut collected = Vec::new();
    let mut visited: HashSet<ExpandedNodeId> = HashSet::new();
    visited.insert(start.clone());
    // Stack entries carry whether the node's subtree should be entered.
    let mut stack = vec![(start.clone(), true)];

    while let Some((node, expand)) = stack.pop() {
        collected.push(node.clone());
        if !expand {
            continue;
        }
        let mut responses = adapter.read_node_references(std::slice::from_ref(&node))?;
        let references = if responses.is_empty() {
            Vec::new()
        } else {
            responses.swap_remove(0)
        };

        let mut children = Vec::new();
        for reference in references {
            if !reference.is_forward || !is_hierarchical_reference(&reference.reference_type_id) {
                continue;
            }
            if !reference.node_id.is_local() {
                continue;
            }
            if !visited.insert(reference.node_id.clone()) {
                continue;
            }
            let enter = !ignored_classes.contains(&reference.node_class);
            if !enter {
                trace!(
                    "browse_all: not entering {} with ignored class {}",
                    reference.node_id,
                    reference.node_class
                );
            }
            children.push((reference.node_id, enter));
        }
        // Reversed so the leftmost child is popped first.
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use hashbrown::{HashMap, HashSet};
    use nodeset_types::{
        ExpandedNodeId, NodeClass, NodeId, ReferenceDescription, ReferenceTypeId, Variant,
    };

    use super::browse_all;
    use crate::{
        adapter::{AttributeRequest, AttributeValues, ServerAdapter},
        errors::ExportResult,
    };

    /// Adapter over a fixed forward-edge list.
    struct GraphAdapter {
        edges: HashMap<ExpandedNodeId, Vec<ReferenceDescription>>,
    }

    impl GraphAdapter {
        fn new(
            edges: impl IntoIterator<Item = (u32, Vec<(u32, NodeClass, ReferenceTypeId)>)>,
        ) -> Self {
            let edges = edges
                .into_iter()
                .map(|(source, targets)| {
                    let references = targets
                        .into_iter()
                        .map(|(target, node_class, reference_type)| ReferenceDescription {
                            node_class,
                            ..ReferenceDescription::new(
                                reference_type,
                                ExpandedNodeId::new(NodeId::new(2, target)),
                                true,
                            )
                        })
                        .collect();
                    (ExpandedNodeId::new(NodeId::new(2, source)), references)
                })
                .collect();
            Self { edges }
        }
    }

    impl ServerAdapter for GraphAdapter {
        fn read_node_classes(
            &mut self,
            node_ids: &[ExpandedNodeId],
        ) -> ExportResult<Vec<NodeClass>> {
            Ok(vec![NodeClass::Object; node_ids.len()])
        }

        fn read_node_references(
            &mut self,
            node_ids: &[ExpandedNodeId],
        ) -> ExportResult<Vec<Vec<ReferenceDescription>>> {
            Ok(node_ids
                .iter()
                .map(|id| self.edges.get(id).cloned().unwrap_or_default())
                .collect())
        }

        fn read_node_attributes(
            &mut self,
            requests: &[AttributeRequest],
        ) -> ExportResult<Vec<AttributeValues>> {
            Ok(requests.iter().map(|_| AttributeValues::new()).collect())
        }

        fn read_node_data_value(&mut self, _node_id: &ExpandedNodeId) -> ExportResult<Variant> {
            Ok(Variant::Empty)
        }
    }

    fn ids(values: &[u32]) -> Vec<ExpandedNodeId> {
        values
            .iter()
            .map(|v| ExpandedNodeId::new(NodeId::new(2, *v)))
            .collect()
    }

    #[test]
    fn pre_order_with_children_in_server_order() {
        let mut adapter = GraphAdapter::new([
            (
                1,
                vec![
                    (2, NodeClass::Object, ReferenceTypeId::Organizes),
                    (5, NodeClass::Object, ReferenceTypeId::HasComponent),
                ],
            ),
            (
                2,
                vec![
                    (3, NodeClass::Variable, ReferenceTypeId::HasComponent),
                    (4, NodeClass::Variable, ReferenceTypeId::HasProperty),
                ],
            ),
        ]);
        let result = browse_all(
            &mut adapter,
            &ExpandedNodeId::new(NodeId::new(2, 1u32)),
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(result, ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn duplicates_are_suppressed() {
        // A diamond: 1 -> 2, 1 -> 3, both -> 4.
        let mut adapter = GraphAdapter::new([
            (
                1,
                vec![
                    (2, NodeClass::Object, ReferenceTypeId::Organizes),
                    (3, NodeClass::Object, ReferenceTypeId::Organizes),
                ],
            ),
            (2, vec![(4, NodeClass::Variable, ReferenceTypeId::HasComponent)]),
            (3, vec![(4, NodeClass::Variable, ReferenceTypeId::HasComponent)]),
        ]);
        let result = browse_all(
            &mut adapter,
            &ExpandedNodeId::new(NodeId::new(2, 1u32)),
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(result, ids(&[1, 2, 4, 3]));
    }

    #[test]
    fn ignored_class_subtree_is_not_entered() {
        let mut adapter = GraphAdapter::new([
            (
                1,
                vec![
                    (2, NodeClass::Method, ReferenceTypeId::HasComponent),
                    (4, NodeClass::Object, ReferenceTypeId::Organizes),
                ],
            ),
            // Below the method, must not appear.
            (2, vec![(3, NodeClass::Variable, ReferenceTypeId::HasProperty)]),
        ]);
        let ignored: HashSet<NodeClass> = [NodeClass::Method, NodeClass::View].into_iter().collect();
        let result = browse_all(
            &mut adapter,
            &ExpandedNodeId::new(NodeId::new(2, 1u32)),
            &ignored,
        )
        .unwrap();
        // The method itself is collected, its subtree is not.
        assert_eq!(result, ids(&[1, 2, 4]));
    }

    #[test]
    fn non_hierarchical_references_are_not_followed() {
        let mut adapter = GraphAdapter::new([(
            1,
            vec![(63, NodeClass::VariableType, ReferenceTypeId::HasTypeDefinition)],
        )]);
        let result = browse_all(
            &mut adapter,
            &ExpandedNodeId::new(NodeId::new(2, 1u32)),
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(result, ids(&[1]));
    }

    #[test]
    fn unknown_start_yields_single_element() {
        let mut adapter = GraphAdapter::new([]);
        let start = ExpandedNodeId::new(NodeId::new(2, "Missing"));
        let result = browse_all(&mut adapter, &start, &HashSet::new()).unwrap();
        assert_eq!(result, vec![start]);
    }
}
