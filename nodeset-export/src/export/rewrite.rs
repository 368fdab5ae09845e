// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The reference rewriting pipeline.
//!
//! A live server's view of a subgraph is rarely emittable as-is: references
//! point at nodes outside the selection, type nodes carry instance
//! back-references, some servers hand out abstract type definitions, and in
//! flat mode the hierarchy is dropped entirely. This module turns the raw
//! per-window reference lists into a set where every emitted instance can
//! resolve a parent and every reference target exists, either in the export
//! or in the standard address space. Step order matters.

use hashbrown::HashSet;
use log::{debug, info};
use nodeset_types::{
    AttributeId, AttributeValue, DataTypeId, ExpandedNodeId, Identifier, LocalizedText, NodeClass,
    ObjectTypeId, QualifiedName, ReferenceDescription, ReferenceTypeId, VariableTypeId,
};

use crate::{
    adapter::AttributeValues,
    hierarchy::{is_hierarchical_reference, is_standard_ns0_node},
    options::Options,
};

/// One node of the current batch window, between the read stages and the
/// encoder dispatch.
#[derive(Debug, Clone)]
pub(crate) struct WindowNode {
    /// The node id.
    pub node_id: ExpandedNodeId,
    /// The class, possibly `Unspecified` for a node the server rejected.
    pub node_class: NodeClass,
    /// Whether this node is the starting node of its list.
    pub is_start: bool,
    /// Raw references from the server, rewritten in place.
    pub references: Vec<ReferenceDescription>,
    /// The attribute payloads read for this node.
    pub attributes: AttributeValues,
}

impl WindowNode {
    fn has_inverse_hierarchical_reference(&self) -> bool {
        self.references
            .iter()
            .any(|r| !r.is_forward && is_hierarchical_reference(&r.reference_type_id))
    }
}

/// Apply the whole pipeline to one window.
///
/// `all_node_ids` is the union of the collected ids of every starting list;
/// `ignored_node_ids` accumulates ignored and unknown nodes across windows.
pub(crate) fn rewrite_references(
    nodes: &mut [WindowNode],
    all_node_ids: &HashSet<ExpandedNodeId>,
    ignored_node_ids: &HashSet<ExpandedNodeId>,
    ignored_classes: &HashSet<NodeClass>,
    options: &Options,
) {
    for node in nodes.iter_mut() {
        drop_unresolvable_references(node, all_node_ids, ignored_node_ids, ignored_classes);
        drop_type_back_references(node);
        fix_abstract_type_definitions(node, options);
        strip_hierarchy_in_flat_mode(node, options);
        guarantee_start_node(node, options);
    }
    for node in nodes.iter_mut() {
        synthesize_parent_from_browse_path(node, options);
    }
}

/// Step 1: drop references that cannot be resolved in a standalone file:
/// targets outside the collected set (unless they belong to the standard
/// address space, which every server provides), targets of ignored or
/// unknown nodes, and targets on other servers.
fn drop_unresolvable_references(
    node: &mut WindowNode,
    all_node_ids: &HashSet<ExpandedNodeId>,
    ignored_node_ids: &HashSet<ExpandedNodeId>,
    ignored_classes: &HashSet<NodeClass>,
) {
    let node_id = node.node_id.clone();
    node.references.retain(|reference| {
        let target = &reference.node_id;
        let keep = target.is_local()
            && !ignored_node_ids.contains(target)
            && !ignored_classes.contains(&reference.node_class)
            && (all_node_ids.contains(target) || is_standard_ns0_node(&target.node_id));
        if !keep {
            debug!("{node_id}: dropping unresolvable reference to {target}");
        }
        keep
    });
}

/// Step 2: type nodes keep only their HasSubtype uplink among the inverse
/// references; forward content stays. This is the NodeSet convention for
/// ObjectType, VariableType, ReferenceType and DataType nodes.
fn drop_type_back_references(node: &mut WindowNode) {
    if !node.node_class.is_type_class() {
        return;
    }
    node.references.retain(|reference| {
        reference.is_forward || reference.reference_type_id == ReferenceTypeId::HasSubtype
    });
}

/// Step 3: servers in the KEPServerEx family type variables with the
/// abstract BaseVariableType (i=62). A loadable nodeset needs the concrete
/// BaseDataVariableType (i=63), so the forward HasTypeDefinition target is
/// rewritten, unless abstract variable types were explicitly allowed.
fn fix_abstract_type_definitions(node: &mut WindowNode, options: &Options) {
    if options.flat_list_of_nodes.allow_abstract_variable {
        return;
    }
    for reference in node.references.iter_mut() {
        if reference.is_forward
            && reference.reference_type_id == ReferenceTypeId::HasTypeDefinition
            && reference.node_id.node_id == VariableTypeId::BaseVariableType
        {
            debug!(
                "{}: retargeting HasTypeDefinition from BaseVariableType to BaseDataVariableType",
                node.node_id
            );
            reference.node_id.node_id = VariableTypeId::BaseDataVariableType.into();
        }
    }
}

/// Step 4: flat mode removes every hierarchical reference, in both
/// directions, from every node that is not a starting node.
fn strip_hierarchy_in_flat_mode(node: &mut WindowNode, options: &Options) {
    if !options.flat_list_of_nodes.is_enable || node.is_start {
        return;
    }
    node.references
        .retain(|reference| !is_hierarchical_reference(&reference.reference_type_id));
}

/// Step 5: every starting node ends up with a parent: one inverse Organizes
/// reference to the replacement parent when the server provided none. A
/// start the server does not know is synthesized as an Object here when the
/// mode allows it.
fn guarantee_start_node(node: &mut WindowNode, options: &Options) {
    if !node.is_start {
        return;
    }
    let missing_on_server = node.node_class == NodeClass::Unspecified;
    if missing_on_server && options.flat_list_of_nodes.create_missing_start_node {
        info!("{}: start node does not exist, synthesizing it", node.node_id);
        node.node_class = NodeClass::Object;
        node.attributes = synthesized_start_attributes(&node.node_id);
        if options.flat_list_of_nodes.allow_abstract_variable {
            node.references.push(ReferenceDescription::new(
                ReferenceTypeId::HasComponent,
                ExpandedNodeId::new(DataTypeId::BaseDataType),
                false,
            ));
            node.references.push(ReferenceDescription::new(
                ReferenceTypeId::HasComponent,
                ExpandedNodeId::new(ObjectTypeId::BaseObjectType),
                false,
            ));
        }
    }
    if !node.has_inverse_hierarchical_reference() {
        debug!(
            "{}: start node has no parent, binding it to {}",
            node.node_id, options.parent_start_node_replacer
        );
        node.references.push(ReferenceDescription::new(
            ReferenceTypeId::Organizes,
            options.parent_start_node_replacer.clone(),
            false,
        ));
    }
}

/// Step 6: any remaining instance without an inverse hierarchical reference
/// gets a synthetic parent. Servers using dotted browse paths as string
/// identifiers encode the hierarchy in the id itself, so the parent is the
/// id with the last segment removed; otherwise the replacement parent is
/// used.
fn synthesize_parent_from_browse_path(node: &mut WindowNode, options: &Options) {
    if !matches!(node.node_class, NodeClass::Object | NodeClass::Variable) {
        return;
    }
    if node.has_inverse_hierarchical_reference() {
        return;
    }
    let parent = browse_path_parent(&node.node_id)
        .unwrap_or_else(|| options.parent_start_node_replacer.clone());
    debug!("{}: no parent reference, synthesizing one to {parent}", node.node_id);
    node.references.push(ReferenceDescription::new(
        ReferenceTypeId::HasComponent,
        parent,
        false,
    ));
}

/// The dotted-browse-path parent of a string id: `ns=2;s=A.B.C` → `ns=2;s=A.B`.
fn browse_path_parent(node_id: &ExpandedNodeId) -> Option<ExpandedNodeId> {
    let Identifier::String(id) = &node_id.node_id.identifier else {
        return None;
    };
    let (parent, _) = id.rsplit_once('.')?;
    if parent.is_empty() {
        return None;
    }
    let mut parent_id = node_id.clone();
    parent_id.node_id.identifier = Identifier::String(parent.to_owned());
    Some(parent_id)
}

/// The attribute set of a synthesized start node: a browse and display name
/// derived from the identifier, everything else at its default.
fn synthesized_start_attributes(node_id: &ExpandedNodeId) -> AttributeValues {
    let name = match &node_id.node_id.identifier {
        Identifier::String(id) => id
            .rsplit_once('.')
            .map(|(_, tail)| tail)
            .unwrap_or(id.as_str())
            .to_owned(),
        Identifier::Numeric(id) => id.to_string(),
        Identifier::Guid(id) => id.to_string(),
        Identifier::ByteString(id) => id.as_base64(),
    };
    let mut attributes = AttributeValues::new();
    attributes.insert(
        AttributeId::BrowseName,
        Some(AttributeValue::QualifiedName(QualifiedName::new(
            node_id.node_id.namespace,
            name.clone(),
        ))),
    );
    attributes.insert(
        AttributeId::DisplayName,
        Some(AttributeValue::LocalizedText(LocalizedText::new("", name))),
    );
    attributes
}

/// Parent resolution: the target of the first inverse hierarchical
/// reference. Type nodes only follow their HasSubtype uplink and may
/// legitimately resolve to nothing, since NodeSet type elements omit
/// `ParentNodeId`.
pub(crate) fn resolve_parent(
    node_class: NodeClass,
    references: &[ReferenceDescription],
) -> Option<ExpandedNodeId> {
    if node_class.is_type_class() {
        references
            .iter()
            .find(|r| !r.is_forward && r.reference_type_id == ReferenceTypeId::HasSubtype)
            .map(|r| r.node_id.clone())
    } else {
        references
            .iter()
            .find(|r| !r.is_forward && is_hierarchical_reference(&r.reference_type_id))
            .map(|r| r.node_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashSet;
    use nodeset_types::{
        AttributeId, ExpandedNodeId, NodeClass, NodeId, ReferenceDescription, ReferenceTypeId,
    };

    use super::{resolve_parent, rewrite_references, WindowNode};
    use crate::options::{FlatListOfNodes, Options};

    fn id(namespace: u16, value: u32) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(namespace, value))
    }

    fn sid(namespace: u16, value: &str) -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::new(namespace, value))
    }

    fn node(node_id: ExpandedNodeId, node_class: NodeClass, is_start: bool) -> WindowNode {
        WindowNode {
            node_id,
            node_class,
            is_start,
            references: Vec::new(),
            attributes: Default::default(),
        }
    }

    fn rewrite(nodes: &mut [WindowNode], all: &[ExpandedNodeId], options: &Options) {
        let all: HashSet<ExpandedNodeId> = all.iter().cloned().collect();
        rewrite_references(nodes, &all, &HashSet::new(), &HashSet::new(), options);
    }

    #[test]
    fn orphan_references_are_dropped_standard_targets_kept() {
        let mut n = node(id(2, 1), NodeClass::Object, true);
        // Collected target, uncollected custom target, standard target.
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasComponent,
            id(2, 2),
            true,
        ));
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasComponent,
            id(2, 99),
            true,
        ));
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasTypeDefinition,
            id(0, 61),
            true,
        ));
        let mut nodes = [n];
        rewrite(&mut nodes, &[id(2, 1), id(2, 2)], &Options::default());
        let targets: Vec<String> = nodes[0]
            .references
            .iter()
            .filter(|r| r.is_forward)
            .map(|r| r.node_id.to_string())
            .collect();
        assert_eq!(targets, vec!["ns=2;i=2", "i=61"]);
    }

    #[test]
    fn ignored_targets_are_dropped() {
        let mut n = node(id(2, 1), NodeClass::Object, true);
        n.references.push(ReferenceDescription {
            node_class: NodeClass::Method,
            ..ReferenceDescription::new(ReferenceTypeId::HasComponent, id(2, 3), true)
        });
        let mut nodes = [n];
        let all: HashSet<ExpandedNodeId> = [id(2, 1), id(2, 3)].into_iter().collect();
        let ignored_classes: HashSet<NodeClass> =
            [NodeClass::Method, NodeClass::View].into_iter().collect();
        rewrite_references(
            &mut nodes,
            &all,
            &HashSet::new(),
            &ignored_classes,
            &Options::default(),
        );
        assert!(nodes[0].references.iter().all(|r| !r.is_forward));
    }

    #[test]
    fn type_nodes_keep_only_has_subtype_back_references() {
        let mut n = node(id(2, 5), NodeClass::ObjectType, false);
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasSubtype,
            id(0, 58),
            false,
        ));
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasComponent,
            id(0, 85),
            false,
        ));
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasProperty,
            id(0, 68),
            true,
        ));
        let mut nodes = [n];
        rewrite(&mut nodes, &[id(2, 5)], &Options::default());
        let kept: Vec<(bool, String)> = nodes[0]
            .references
            .iter()
            .map(|r| (r.is_forward, r.reference_type_id.to_string()))
            .collect();
        assert_eq!(
            kept,
            vec![(false, "i=45".to_owned()), (true, "i=46".to_owned())]
        );
    }

    #[test]
    fn abstract_type_definition_is_fixed_up() {
        let mut n = node(id(2, 10), NodeClass::Variable, true);
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasTypeDefinition,
            id(0, 62),
            true,
        ));
        let mut nodes = [n];
        rewrite(&mut nodes, &[id(2, 10)], &Options::default());
        let type_def = nodes[0]
            .references
            .iter()
            .find(|r| r.reference_type_id == ReferenceTypeId::HasTypeDefinition)
            .unwrap();
        assert_eq!(type_def.node_id.to_string(), "i=63");
    }

    #[test]
    fn abstract_type_definition_kept_when_allowed() {
        let options = Options {
            flat_list_of_nodes: FlatListOfNodes {
                is_enable: true,
                create_missing_start_node: true,
                allow_abstract_variable: true,
            },
            ..Default::default()
        };
        let mut n = node(id(2, 10), NodeClass::Variable, true);
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasTypeDefinition,
            id(0, 62),
            true,
        ));
        let mut nodes = [n];
        rewrite(&mut nodes, &[id(2, 10)], &options);
        let type_def = nodes[0]
            .references
            .iter()
            .find(|r| r.is_forward && r.reference_type_id == ReferenceTypeId::HasTypeDefinition)
            .unwrap();
        assert_eq!(type_def.node_id.to_string(), "i=62");
    }

    #[test]
    fn flat_mode_strips_hierarchy_of_non_start_nodes() {
        let options = Options {
            flat_list_of_nodes: FlatListOfNodes {
                is_enable: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut child = node(sid(2, "Root.Child"), NodeClass::Variable, false);
        child.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasComponent,
            sid(2, "Root"),
            false,
        ));
        child.references.push(ReferenceDescription::new(
            ReferenceTypeId::HasTypeDefinition,
            id(0, 63),
            true,
        ));
        let mut nodes = [child];
        rewrite(&mut nodes, &[sid(2, "Root"), sid(2, "Root.Child")], &options);
        // The inverse HasComponent from the server is stripped, then step 6
        // re-binds the node through its dotted id.
        let inverse: Vec<String> = nodes[0]
            .references
            .iter()
            .filter(|r| !r.is_forward)
            .map(|r| r.node_id.to_string())
            .collect();
        assert_eq!(inverse, vec!["ns=2;s=Root"]);
        assert!(nodes[0]
            .references
            .iter()
            .any(|r| r.is_forward && r.node_id.to_string() == "i=63"));
    }

    #[test]
    fn start_node_without_parent_gets_organizes() {
        let mut nodes = [node(id(2, 1), NodeClass::Object, true)];
        rewrite(&mut nodes, &[id(2, 1)], &Options::default());
        let synthesized = &nodes[0].references[0];
        assert!(!synthesized.is_forward);
        assert_eq!(synthesized.reference_type_id, ReferenceTypeId::Organizes);
        assert_eq!(synthesized.node_id.to_string(), "i=85");
    }

    #[test]
    fn start_node_with_parent_is_untouched() {
        let mut n = node(id(2, 1), NodeClass::Object, true);
        n.references.push(ReferenceDescription::new(
            ReferenceTypeId::Organizes,
            id(0, 85),
            false,
        ));
        let mut nodes = [n];
        rewrite(&mut nodes, &[id(2, 1)], &Options::default());
        assert_eq!(nodes[0].references.len(), 1);
    }

    #[test]
    fn missing_start_node_is_synthesized() {
        let options = Options {
            flat_list_of_nodes: FlatListOfNodes {
                is_enable: true,
                create_missing_start_node: true,
                allow_abstract_variable: false,
            },
            ..Default::default()
        };
        let mut nodes = [node(sid(2, "Missing"), NodeClass::Unspecified, true)];
        rewrite(&mut nodes, &[sid(2, "Missing")], &options);
        let n = &nodes[0];
        assert_eq!(n.node_class, NodeClass::Object);
        let browse_name = n.attributes[&AttributeId::BrowseName]
            .as_ref()
            .unwrap()
            .as_qualified_name()
            .unwrap();
        assert_eq!(browse_name.to_string(), "2:Missing");
        assert_eq!(n.references.len(), 1);
        assert_eq!(n.references[0].node_id.to_string(), "i=85");
    }

    #[test]
    fn synthesized_start_node_with_abstract_variables_allowed() {
        let options = Options {
            flat_list_of_nodes: FlatListOfNodes {
                is_enable: true,
                create_missing_start_node: true,
                allow_abstract_variable: true,
            },
            ..Default::default()
        };
        let mut nodes = [node(sid(2, "Missing"), NodeClass::Unspecified, true)];
        rewrite(&mut nodes, &[sid(2, "Missing")], &options);
        let inverse_components: Vec<String> = nodes[0]
            .references
            .iter()
            .filter(|r| !r.is_forward && r.reference_type_id == ReferenceTypeId::HasComponent)
            .map(|r| r.node_id.to_string())
            .collect();
        assert_eq!(inverse_components, vec!["i=24", "i=58"]);
    }

    #[test]
    fn browse_path_parent_synthesis() {
        let mut nodes = [
            node(sid(2, "Plant.Line.Speed"), NodeClass::Variable, false),
            node(id(2, 7), NodeClass::Object, false),
        ];
        rewrite(
            &mut nodes,
            &[sid(2, "Plant.Line.Speed"), id(2, 7)],
            &Options::default(),
        );
        assert_eq!(
            nodes[0].references[0].node_id.to_string(),
            "ns=2;s=Plant.Line"
        );
        assert_eq!(
            nodes[0].references[0].reference_type_id,
            ReferenceTypeId::HasComponent
        );
        assert_eq!(nodes[1].references[0].node_id.to_string(), "i=85");
    }

    #[test]
    fn parent_resolution() {
        let instance_refs = vec![
            ReferenceDescription::new(ReferenceTypeId::HasTypeDefinition, id(0, 63), true),
            ReferenceDescription::new(ReferenceTypeId::HasComponent, id(2, 1), false),
            ReferenceDescription::new(ReferenceTypeId::Organizes, id(0, 85), false),
        ];
        assert_eq!(
            resolve_parent(NodeClass::Variable, &instance_refs)
                .unwrap()
                .to_string(),
            "ns=2;i=1"
        );

        let type_refs = vec![ReferenceDescription::new(
            ReferenceTypeId::HasSubtype,
            id(0, 58),
            false,
        )];
        assert_eq!(
            resolve_parent(NodeClass::ObjectType, &type_refs)
                .unwrap()
                .to_string(),
            "i=58"
        );
        // A type without a HasSubtype uplink has no parent, and inverse
        // references of other kinds do not count for types.
        assert_eq!(resolve_parent(NodeClass::ObjectType, &instance_refs), None);
    }
}
