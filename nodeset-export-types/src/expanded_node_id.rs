// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `ExpandedNodeId`.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use crate::node_id::{Identifier, NodeId, NodeIdError};

/// A NodeId that allows the namespace to be specified as a URI instead of an
/// index, and a node to live on another server.
///
/// The canonical text form is `ns=<i>;<t>=<v>` or `nsu=<URI>;<t>=<v>`, with
/// a `svr=<n>;` prefix when the server index is set. Ordering is
/// lexicographic on the canonical form and hashing follows it, so values are
/// usable as stable map keys and in diagnostics.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct ExpandedNodeId {
    /// The inner node id.
    pub node_id: NodeId,
    /// An optional namespace URI, overriding the namespace index when set.
    pub namespace_uri: Option<String>,
    /// Index of the server the node lives on, 0 for the local server.
    pub server_index: u32,
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        match &self.namespace_uri {
            Some(uri) if !uri.is_empty() => {
                write!(f, "nsu={};{}", uri, self.node_id.identifier)
            }
            _ => write!(f, "{}", self.node_id),
        }
    }
}

impl FromStr for ExpandedNodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s;
        let mut server_index = 0u32;
        if let Some(tail) = rest.strip_prefix("svr=") {
            let (idx, tail) = tail.split_once(';').ok_or(NodeIdError)?;
            server_index = idx.parse().map_err(|_| NodeIdError)?;
            rest = tail;
        }
        if let Some(tail) = rest.strip_prefix("nsu=") {
            let (uri, identifier) = tail.split_once(';').ok_or(NodeIdError)?;
            if uri.is_empty() {
                return Err(NodeIdError);
            }
            let identifier = Identifier::from_str(identifier)?;
            return Ok(ExpandedNodeId {
                node_id: NodeId {
                    namespace: 0,
                    identifier,
                },
                namespace_uri: Some(uri.to_owned()),
                server_index,
            });
        }
        Ok(ExpandedNodeId {
            node_id: NodeId::from_str(rest)?,
            namespace_uri: None,
            server_index,
        })
    }
}

impl Ord for ExpandedNodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for ExpandedNodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ExpandedNodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        ExpandedNodeId {
            node_id,
            namespace_uri: None,
            server_index: 0,
        }
    }
}

impl From<&NodeId> for ExpandedNodeId {
    fn from(node_id: &NodeId) -> Self {
        node_id.clone().into()
    }
}

impl ExpandedNodeId {
    /// Creates an expanded node id from a node id.
    pub fn new(node_id: impl Into<NodeId>) -> ExpandedNodeId {
        ExpandedNodeId {
            node_id: node_id.into(),
            namespace_uri: None,
            server_index: 0,
        }
    }

    /// Returns the null expanded node id.
    pub fn null() -> ExpandedNodeId {
        Self::new(NodeId::null())
    }

    /// Test if the inner node id is null and no namespace URI is set.
    pub fn is_null(&self) -> bool {
        self.node_id.is_null() && self.namespace_uri.is_none()
    }

    /// Test whether this id can be resolved on the local server.
    pub fn is_local(&self) -> bool {
        self.server_index == 0
    }
}
