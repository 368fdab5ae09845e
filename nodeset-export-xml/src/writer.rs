// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! A thin XML serializer for NodeSet documents.
//!
//! The document model only ever needs a handful of shapes: elements with or
//! without attributes, text content, comments and the leading declaration.
//! This wrapper narrows `quick-xml` down to exactly that vocabulary and
//! funnels every shape through one event sink, so the rest of the crate
//! never touches raw events.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

#[derive(Debug, Error)]
/// Error produced while serializing a document.
pub enum XmlWriteError {
    /// The underlying XML writer rejected an event.
    #[error("xml serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The output stream could not be written.
    #[error("output stream failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes NodeSet documents to a stream, indented with two spaces per
/// level.
pub struct XmlStreamWriter<T> {
    inner: quick_xml::Writer<T>,
}

impl<T: Write> XmlStreamWriter<T> {
    /// Wrap an output stream.
    pub fn new(stream: T) -> Self {
        Self {
            inner: quick_xml::Writer::new_with_indent(stream, b' ', 2),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), XmlWriteError> {
        self.inner.write_event(event)?;
        Ok(())
    }

    fn start_tag(tag: &str, attributes: &[(&str, &str)]) -> BytesStart<'static> {
        let mut start = BytesStart::new(tag.to_owned());
        for (key, value) in attributes {
            start.push_attribute((*key, *value));
        }
        start
    }

    /// Write the leading `<?xml ...?>` declaration.
    pub fn write_declaration(&mut self) -> Result<(), XmlWriteError> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    /// Open an element.
    pub fn write_start(&mut self, tag: &str) -> Result<(), XmlWriteError> {
        self.write_start_with(tag, &[])
    }

    /// Open an element carrying attributes. Attribute values are escaped.
    pub fn write_start_with(
        &mut self,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), XmlWriteError> {
        self.emit(Event::Start(Self::start_tag(tag, attributes)))
    }

    /// Close the innermost open element.
    pub fn write_end(&mut self, tag: &str) -> Result<(), XmlWriteError> {
        self.emit(Event::End(BytesEnd::new(tag.to_owned())))
    }

    /// Write a childless element, `<tag/>`.
    pub fn write_empty(&mut self, tag: &str) -> Result<(), XmlWriteError> {
        self.emit(Event::Empty(Self::start_tag(tag, &[])))
    }

    /// Write escaped character content into the open element.
    pub fn write_text(&mut self, text: &str) -> Result<(), XmlWriteError> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    /// Write a `<!-- ... -->` comment.
    pub fn write_comment(&mut self, text: &str) -> Result<(), XmlWriteError> {
        self.emit(Event::Comment(BytesText::new(text)))
    }

    /// Write an element whose only content is text, `<tag>text</tag>`.
    pub fn write_text_element(&mut self, tag: &str, text: &str) -> Result<(), XmlWriteError> {
        self.write_start(tag)?;
        self.write_text(text)?;
        self.write_end(tag)
    }
}
