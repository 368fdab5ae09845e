// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `NodeId`.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use uuid::Uuid;

use crate::byte_string::ByteString;

/// The kind of identifier, numeric, string, guid or opaque.
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Identifier {
    /// Numeric identifier, `i=123`.
    Numeric(u32),
    /// String identifier, `s=...`.
    String(String),
    /// GUID identifier, `g=...`.
    Guid(Uuid),
    /// Opaque identifier, `b=...` (base64).
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={}", *v),
            Identifier::String(v) => write!(f, "s={}", v),
            Identifier::Guid(v) => write!(f, "g={}", v),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl FromStr for Identifier {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = match (s.get(..2), s.get(2..)) {
            (Some(k), Some(v)) => (k, v),
            _ => return Err(NodeIdError),
        };
        match k {
            "i=" => v.parse::<u32>().map(|v| v.into()).map_err(|_| NodeIdError),
            "s=" => Ok(Identifier::String(v.to_owned())),
            "g=" => Uuid::parse_str(v).map(|v| v.into()).map_err(|_| NodeIdError),
            "b=" => ByteString::from_base64(v).map(|v| v.into()).ok_or(NodeIdError),
            _ => Err(NodeIdError),
        }
    }
}

impl From<u32> for Identifier {
    fn from(v: u32) -> Self {
        Identifier::Numeric(v)
    }
}

impl<'a> From<&'a str> for Identifier {
    fn from(v: &'a str) -> Self {
        Identifier::String(v.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::String(v)
    }
}

impl From<Uuid> for Identifier {
    fn from(v: Uuid) -> Self {
        Identifier::Guid(v)
    }
}

impl From<ByteString> for Identifier {
    fn from(v: ByteString) -> Self {
        Identifier::ByteString(v)
    }
}

#[derive(Debug)]
/// Error returned from working with node IDs.
pub struct NodeIdError;

impl fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIdError")
    }
}

impl std::error::Error for NodeIdError {}

/// An identifier for a node in the address space of an OPC UA server.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct NodeId {
    /// The index for a namespace.
    pub namespace: u16,
    /// The identifier for the node in the address space.
    pub identifier: Identifier,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};{}", self.namespace, self.identifier)
        } else {
            write!(f, "{}", self.identifier)
        }
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Format specified in part 6, 5.3.1.10:
        //
        // ns=<namespaceindex>;<type>=<value>
        //
        // ns=0; is omitted when the namespace is 0.
        static RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^(ns=(?P<ns>[0-9]+);)?(?P<t>[isgb]=.+)$").unwrap());

        let captures = RE.captures(s).ok_or(NodeIdError)?;

        let namespace = if let Some(ns) = captures.name("ns") {
            ns.as_str().parse::<u16>().map_err(|_| NodeIdError)?
        } else {
            0
        };

        let t = captures.name("t").unwrap();
        Identifier::from_str(t.as_str()).map(|t| NodeId::new(namespace, t))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::null()
    }
}

impl From<&NodeId> for NodeId {
    fn from(v: &NodeId) -> Self {
        v.clone()
    }
}

impl<'a> From<(u16, &'a str)> for NodeId {
    fn from(v: (u16, &'a str)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, u32)> for NodeId {
    fn from(v: (u16, u32)) -> Self {
        Self::new(v.0, v.1)
    }
}

// Cheap comparisons intended for use when comparing node IDs to constants.
impl PartialEq<(u16, u32)> for NodeId {
    fn eq(&self, other: &(u16, u32)) -> bool {
        self.namespace == other.0
            && match &self.identifier {
                Identifier::Numeric(s) => s == &other.1,
                _ => false,
            }
    }
}

impl PartialEq<(u16, &str)> for NodeId {
    fn eq(&self, other: &(u16, &str)) -> bool {
        self.namespace == other.0
            && match &self.identifier {
                Identifier::String(s) => s == other.1,
                _ => false,
            }
    }
}

impl NodeId {
    /// Constructs a new NodeId from anything that can be turned into
    /// an [`Identifier`]: u32, Uuid, ByteString or string types.
    pub fn new<T>(namespace: u16, value: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: value.into(),
        }
    }

    /// Returns a null node id.
    pub fn null() -> NodeId {
        NodeId::new(0, 0u32)
    }

    /// Test if the node id is null, i.e. 0 namespace and 0 identifier.
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.identifier == Identifier::Numeric(0)
    }

    /// Test if the node id is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(_))
    }

    /// Get the numeric value of this node ID if it is numeric.
    pub fn as_u32(&self) -> Option<u32> {
        match &self.identifier {
            Identifier::Numeric(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the string value of this node ID if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match &self.identifier {
            Identifier::String(s) => Some(s),
            _ => None,
        }
    }
}
