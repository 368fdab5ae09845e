// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! The sink side of the export: an [`Encoder`] receives namespaces, aliases
//! and one call per exported node, and produces the output document.

use std::{io::Write, path::PathBuf};

use crate::{aliases::AliasTable, errors::ExportResult, model::NodeIntermediateModel};

mod xml;

pub use xml::XmlEncoder;

/// Where the produced document goes.
pub enum ExportTarget<'a> {
    /// Write to a file under this path. The file only appears once the
    /// export finished successfully.
    File(PathBuf),
    /// Write into a caller supplied stream.
    Stream(&'a mut dyn Write),
}

impl<'a> std::fmt::Debug for ExportTarget<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTarget::File(path) => f.debug_tuple("File").field(path).finish(),
            ExportTarget::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// Abstraction over export encoders.
///
/// Errors that can be corrected locally or have no critical consequence are
/// logged by the implementation and do not fail the call; the error return
/// is for problems that make the document unusable.
pub trait Encoder {
    /// Prepare for a new document. Must be called before anything else.
    fn begin(&mut self) -> ExportResult<()>;

    /// Finish and flush the document to its target. Nothing may reach the
    /// target before this succeeds.
    fn end(&mut self) -> ExportResult<()>;

    /// Add the namespace URI table. May be called at most once per document.
    fn add_namespaces(&mut self, namespaces: &[String]) -> ExportResult<()>;

    /// Add the alias table. May be called at most once per document.
    fn add_aliases(&mut self, aliases: &AliasTable) -> ExportResult<()>;

    /// Add a node of class Object.
    fn add_node_object(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;

    /// Add a node of class ObjectType.
    fn add_node_object_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;

    /// Add a node of class Variable.
    fn add_node_variable(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;

    /// Add a node of class VariableType.
    fn add_node_variable_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;

    /// Add a node of class ReferenceType.
    fn add_node_reference_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;

    /// Add a node of class DataType.
    fn add_node_data_type(&mut self, node_model: &NodeIntermediateModel) -> ExportResult<()>;
}
