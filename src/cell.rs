//! Cell value resolution.

use crate::error::{Error, Result};
use crate::shared_strings::SharedStrings;
use crate::xml::XmlNode;

/// The stored content of one `<c>` element, before lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Raw text stored on the cell: numbers, booleans, serial dates,
    /// formula results and inline strings, all verbatim.
    Inline(String),
    /// Index into the shared strings table (`t="s"`).
    SharedRef(usize),
}

impl CellContent {
    /// Read the content of a cell node.
    ///
    /// A missing `<v>` yields an empty inline value. A shared-string cell
    /// whose value is not an integer is a [`Error::Lookup`].
    pub fn from_node<N: XmlNode>(cell: &N) -> Result<Self> {
        let raw = cell.child("v").map(|v| v.text()).unwrap_or_default();

        match cell.attribute("t") {
            Some("s") => raw.trim().parse::<usize>().map(CellContent::SharedRef).map_err(|_| {
                Error::Lookup(format!(
                    "shared string index {:?} in cell {} is not a number",
                    raw,
                    cell.attribute("r").unwrap_or("?")
                ))
            }),
            Some("inlineStr") => {
                let text = cell
                    .child("is")
                    .map(|is| is.descendant_text("t"))
                    .unwrap_or_else(|| raw.to_string());
                Ok(CellContent::Inline(text))
            }
            _ => Ok(CellContent::Inline(raw.to_string())),
        }
    }

    /// Resolve to the cell's effective text.
    pub fn resolve(self, strings: &SharedStrings) -> Result<String> {
        match self {
            CellContent::Inline(text) => Ok(text),
            CellContent::SharedRef(idx) => strings.get(idx).map(str::to_string),
        }
    }
}

/// Resolve a cell node straight to its text value.
pub fn cell_value<N: XmlNode>(cell: &N, strings: &SharedStrings) -> Result<String> {
    CellContent::from_node(cell)?.resolve(strings)
}
