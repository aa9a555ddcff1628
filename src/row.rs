//! Row types produced by a parse.

use crate::error::{Error, Result};
use crate::headers::HeaderTable;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Reserved key under which the source row number is emitted.
pub const ROW_NUMBER_KEY: &str = "__row_number";

/// One worksheet row keyed by zero-based column index.
///
/// Sparse: only columns with a `<c>` element are present, in the order
/// they were encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: IndexMap<usize, String>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a column, replacing any earlier value for it.
    pub fn insert(&mut self, column: usize, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }

    /// Value at a column, if the row has one.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }

    /// Iterate `(column, value)` pairs in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.cells.iter().map(|(c, v)| (*c, v.as_str()))
    }

    /// Number of populated columns.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One output row: header name to cell text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRow {
    /// One-based source row number, when row numbering is enabled.
    pub row_number: Option<u32>,
    fields: IndexMap<String, String>,
}

impl ParsedRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. A repeated name keeps its first position and takes the
    /// newer value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Attach the source row number.
    ///
    /// A field named [`ROW_NUMBER_KEY`] is dropped, since the row number
    /// takes that key.
    pub fn set_row_number(&mut self, number: u32) {
        self.row_number = Some(number);
        self.fields.shift_remove(ROW_NUMBER_KEY);
    }

    /// Value of a field by header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Header names in output order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate `(name, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of named fields, not counting the row number.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ParsedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(n) = self.row_number {
            map.serialize_entry(ROW_NUMBER_KEY, &n)?;
        }
        for (name, value) in &self.fields {
            if self.row_number.is_some() && name == ROW_NUMBER_KEY {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Outcome of one parse: rows plus every error recorded along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    /// Whether every stage up to row processing completed.
    pub success: bool,
    /// Output rows in worksheet order; the header row is not included.
    pub rows: Vec<ParsedRow>,
    /// Header table consumed from the header row, if any.
    #[serde(skip)]
    pub headers: Option<HeaderTable>,
    /// Human-readable error messages in the order they occurred.
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Convert the rows to a JSON array.
    pub fn rows_to_json(&self, format: JsonFormat) -> Result<String> {
        let json = match format {
            JsonFormat::Compact => serde_json::to_string(&self.rows),
            JsonFormat::Pretty => serde_json::to_string_pretty(&self.rows),
        };
        json.map_err(|e| Error::Serialize(e.to_string()))
    }
}
