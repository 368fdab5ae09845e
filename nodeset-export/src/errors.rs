// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The export error taxonomy.

use nodeset_types::ExpandedNodeId;
use nodeset_xml::XmlWriteError;
use thiserror::Error;

/// Result alias used throughout the exporter.
pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Error)]
/// Everything that can stop an export. The variants form a closed set; a
/// successful run is simply `Ok`.
pub enum ExportError {
    /// The list of starting node IDs was empty.
    #[error("The list of node IDs is empty")]
    EmptyNodeIdList,
    /// The request is inconsistent, e.g. overlapping starting nodes or a
    /// forbidden ns=0 start.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    /// The server adapter failed to complete a request.
    #[error("Transport error: {0}")]
    Transport(String),
    /// A node required for the export does not exist on the server.
    #[error("Unknown node: {0}")]
    UnknownNode(ExpandedNodeId),
    /// The encoder rejected the document or failed to produce it.
    #[error("Encoder error: {0}")]
    Encoder(String),
    /// The session was disconnected between batches; the partial export is
    /// discarded. Embedding programs usually treat this as a clean stop.
    #[error("Export interrupted, session disconnected")]
    Interrupted,
    /// The option combination is invalid.
    #[error("Bad configuration: {0}")]
    BadConfiguration(String),
}

impl From<XmlWriteError> for ExportError {
    fn from(value: XmlWriteError) -> Self {
        ExportError::Encoder(value.to_string())
    }
}
