//! Column naming for parsed rows.
//!
//! Names come either from the first worksheet row (normalized) or from the
//! alphabetic column labels, with caller overrides replacing individual
//! columns in both cases.

use crate::column::{self, ColumnRef};
use crate::error::Result;
use crate::row::{ParsedRow, RawRow};
use indexmap::IndexMap;

/// Normalize a header cell: trim, lower-case, and collapse internal
/// whitespace runs into a single underscore.
///
/// Normalizing an already-normalized name returns it unchanged.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Column index to header name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    columns: IndexMap<usize, String>,
}

impl HeaderTable {
    /// Derive a table from a header row, normalizing each value.
    pub fn from_row(row: &RawRow) -> Self {
        let mut table = Self::default();
        for (col, value) in row.iter() {
            table.set(col, normalize_header(value));
        }
        table
    }

    /// Set the name for a column; an existing column keeps its position.
    pub fn set(&mut self, column: usize, name: impl Into<String>) {
        self.columns.insert(column, name.into());
    }

    /// Header name for a column.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.columns.get(&column).map(String::as_str)
    }

    /// Iterate `(column, name)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().map(|(c, n)| (*c, n.as_str()))
    }

    /// Header names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone)]
enum HeaderState {
    /// No header row expected; columns are named by their labels.
    Default,
    /// Waiting for the header row.
    Awaiting,
    /// Header row consumed.
    Set(HeaderTable),
}

/// Tracks how columns are named for the rest of a parse.
#[derive(Debug, Clone)]
pub struct HeaderManager {
    state: HeaderState,
    overrides: IndexMap<usize, String>,
}

impl HeaderManager {
    /// Create a manager, resolving every override to a column index.
    ///
    /// An alphabetic override that is not a valid label is an
    /// [`Error::InvalidColumn`](crate::Error::InvalidColumn).
    pub fn new(has_header_row: bool, overrides: &[(ColumnRef, String)]) -> Result<Self> {
        let overrides = overrides
            .iter()
            .map(|(col, name)| col.resolve().map(|idx| (idx, name.clone())))
            .collect::<Result<IndexMap<_, _>>>()?;

        let state = if has_header_row {
            HeaderState::Awaiting
        } else {
            HeaderState::Default
        };

        Ok(Self { state, overrides })
    }

    /// Whether the next row should be consumed as the header row.
    pub fn needs_headers(&self) -> bool {
        matches!(self.state, HeaderState::Awaiting)
    }

    /// Whether columns are named by their alphabetic labels.
    pub fn is_using_default_headers(&self) -> bool {
        matches!(self.state, HeaderState::Default)
    }

    /// Consume the header row.
    ///
    /// Overrides replace the derived name of their column, or add the
    /// column if the header row did not have it. A row that yields no
    /// names at all leaves the manager waiting for the next row.
    pub fn set_headers(&mut self, row: &RawRow) {
        let mut table = HeaderTable::from_row(row);
        for (col, name) in &self.overrides {
            table.set(*col, name.clone());
        }

        if table.is_empty() {
            log::trace!("header row produced no columns, waiting for the next row");
            return;
        }

        log::trace!("headers set: {:?}", table);
        self.state = HeaderState::Set(table);
    }

    /// The derived header table, once the header row has been consumed.
    pub fn headers(&self) -> Option<&HeaderTable> {
        match &self.state {
            HeaderState::Set(table) => Some(table),
            _ => None,
        }
    }

    /// Name a raw row.
    ///
    /// With derived headers every declared column appears, empty when the
    /// row has no value there, and columns without a header are dropped.
    /// Otherwise each present column is named by its override or label.
    pub fn apply(&self, row: &RawRow) -> ParsedRow {
        let mut parsed = ParsedRow::new();

        match &self.state {
            HeaderState::Set(table) => {
                for (col, name) in table.iter() {
                    parsed.insert(name, row.get(col).unwrap_or_default());
                }
            }
            HeaderState::Default | HeaderState::Awaiting => {
                for (col, value) in row.iter() {
                    parsed.insert(self.default_name(col), value);
                }
            }
        }

        parsed
    }

    fn default_name(&self, column: usize) -> String {
        self.overrides
            .get(&column)
            .cloned()
            .unwrap_or_else(|| column::encode(column))
    }
}
