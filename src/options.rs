//! Parse options configuration.

use crate::column::ColumnRef;
use std::path::PathBuf;

/// Options for parsing a worksheet.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// One-based worksheet number (`xl/worksheets/sheet<N>.xml`)
    pub sheet: u32,

    /// Derive column names from the first row
    pub has_header_row: bool,

    /// Replacement names for specific columns, applied in order
    pub header_overrides: Vec<(ColumnRef, String)>,

    /// Emit the source row number under `__row_number`
    pub row_numbers: bool,

    /// Existing directory that extraction working directories are created in
    pub tmp_dir: PathBuf,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sheet: 1,
            has_header_row: true,
            header_overrides: Vec::new(),
            row_numbers: false,
            tmp_dir: std::env::temp_dir(),
        }
    }
}

impl ParseOptions {
    /// Create new parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the worksheet to parse.
    pub fn with_sheet(mut self, sheet: u32) -> Self {
        self.sheet = sheet;
        self
    }

    /// Set whether the first row holds column names.
    pub fn with_header_row(mut self, has_header_row: bool) -> Self {
        self.has_header_row = has_header_row;
        self
    }

    /// Override the name of one column.
    pub fn with_header_override(
        mut self,
        column: impl Into<ColumnRef>,
        name: impl Into<String>,
    ) -> Self {
        self.header_overrides.push((column.into(), name.into()));
        self
    }

    /// Replace all header overrides.
    pub fn with_header_overrides<C, S, I>(mut self, overrides: I) -> Self
    where
        C: Into<ColumnRef>,
        S: Into<String>,
        I: IntoIterator<Item = (C, S)>,
    {
        self.header_overrides = overrides
            .into_iter()
            .map(|(c, s)| (c.into(), s.into()))
            .collect();
        self
    }

    /// Include source row numbers in the output.
    pub fn with_row_numbers(mut self, row_numbers: bool) -> Self {
        self.row_numbers = row_numbers;
        self
    }

    /// Set the base directory for extraction.
    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = dir.into();
        self
    }
}
