// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! Contains the definition of `LocalizedText`.

use std::fmt;

/// A human readable text with an optional locale identifier.
#[derive(PartialEq, Eq, Default, Debug, Clone, Hash)]
pub struct LocalizedText {
    /// The locale, empty when not set.
    pub locale: String,
    /// The text in the specified locale.
    pub text: String,
}

impl<'a> From<&'a str> for LocalizedText {
    fn from(value: &'a str) -> Self {
        Self {
            locale: String::new(),
            text: value.to_owned(),
        }
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self {
            locale: String::new(),
            text: value,
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl LocalizedText {
    /// Create a new localized text from locale and text.
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> LocalizedText {
        LocalizedText {
            locale: locale.into(),
            text: text.into(),
        }
    }

    /// Return `true` if both locale and text are empty.
    pub fn is_empty(&self) -> bool {
        self.locale.is_empty() && self.text.is_empty()
    }
}
