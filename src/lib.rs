//! # vsxlsx
//!
//! Read one worksheet of an XLSX workbook into an ordered list of rows,
//! each row a mapping from column name to the cell's stored text.
//!
//! Column names come from the first row (trimmed, lower-cased, with
//! whitespace collapsed to `_`) or, without a header row, from the
//! column labels `a`, `b`, ... `aa`. Values are returned exactly as
//! stored: numbers, serial dates and booleans are not converted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vsxlsx::{Parser, ParseOptions};
//!
//! let mut parser = Parser::with_options(
//!     "workbook.xlsx",
//!     ParseOptions::new().with_sheet(1).with_row_numbers(true),
//! );
//!
//! if parser.parse() {
//!     for row in parser.parsed() {
//!         println!("{:?} {:?}", row.row_number, row.get("name"));
//!     }
//! } else {
//!     for error in parser.errors() {
//!         eprintln!("{}", error);
//!     }
//! }
//! ```
//!
//! ## Lifecycle
//!
//! Each [`Parser::parse`] call extracts the archive into a fresh directory
//! under the configured `tmp_dir`, loads `xl/worksheets/sheet<N>.xml` and
//! `xl/sharedStrings.xml`, composes rows, and removes the directory again
//! whether or not the earlier stages succeeded. Failures never escape
//! `parse`; they are collected as messages in [`Parser::errors`].

pub mod cell;
pub mod column;
pub mod container;
pub mod error;
pub mod headers;
pub mod options;
pub mod parser;
pub mod row;
pub mod shared_strings;
pub mod xml;

// Re-exports
pub use cell::CellContent;
pub use column::ColumnRef;
pub use error::{Error, Result};
pub use headers::{normalize_header, HeaderManager, HeaderTable};
pub use options::ParseOptions;
pub use parser::{compose_rows, Parser};
pub use row::{JsonFormat, ParseResult, ParsedRow, RawRow, ROW_NUMBER_KEY};
pub use shared_strings::SharedStrings;

use std::path::Path;

/// Parse the first worksheet of a file with default options.
///
/// # Example
///
/// ```no_run
/// let result = vsxlsx::parse_file("workbook.xlsx");
/// println!("{} rows, {} errors", result.rows.len(), result.errors.len());
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse a file with explicit options.
pub fn parse_file_with_options(path: impl AsRef<Path>, options: ParseOptions) -> ParseResult {
    let mut parser = Parser::with_options(path.as_ref(), options);
    parser.parse();
    parser.into_result()
}
