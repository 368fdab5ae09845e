// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `ByteString`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

/// An opaque sequence of bytes, used as the payload of opaque node
/// identifiers. The text form is standard base64.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Default)]
pub struct ByteString {
    /// The raw bytes.
    pub value: Vec<u8>,
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_base64())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        Self { value }
    }
}

impl From<&[u8]> for ByteString {
    fn from(value: &[u8]) -> Self {
        Self {
            value: value.to_vec(),
        }
    }
}

impl ByteString {
    /// Create a byte string from anything resembling bytes.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Test if the byte string is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Encode the contents as base64.
    pub fn as_base64(&self) -> String {
        STANDARD.encode(&self.value)
    }

    /// Decode a byte string from base64, `None` if the input is not valid
    /// base64.
    pub fn from_base64(data: &str) -> Option<Self> {
        STANDARD.decode(data).ok().map(|value| Self { value })
    }
}
