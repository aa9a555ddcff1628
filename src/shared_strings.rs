//! XLSX shared strings table.

use crate::error::{Error, Result};
use crate::xml::{self, XmlNode};
use std::path::Path;

/// Shared strings table.
///
/// Each `<si>` entry may hold plain text (`<si><t>..</t></si>`) or rich
/// text split into runs (`<si><r><t>..</t></r>..</si>`). Runs are joined
/// in document order with nothing in between.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// All strings in order
    strings: Vec<String>,
}

impl SharedStrings {
    /// Build the table from a parsed `<sst>` root.
    pub fn from_node<N: XmlNode>(sst: &N) -> Self {
        let strings = sst
            .children_named("si")
            .map(|si| si.descendant_text("t"))
            .collect();
        Self { strings }
    }

    /// Parse shared strings from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self::from_node(&xml::parse_str(xml)?))
    }

    /// Load the shared strings part from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_node(&xml::load(path)?))
    }

    /// Resolve an entry by index.
    ///
    /// An index past the end of the table is a [`Error::Lookup`].
    pub fn get(&self, index: usize) -> Result<&str> {
        self.strings.get(index).map(|s| s.as_str()).ok_or_else(|| {
            Error::Lookup(format!(
                "shared string index {} out of range (table has {} entries)",
                index,
                self.strings.len()
            ))
        })
    }

    /// Get the count of shared strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
