//! Worksheet parser: extraction, loading, row composition and cleanup.

use crate::cell::cell_value;
use crate::column::{column_index_of, row_number_of, ColumnRef};
use crate::container::{worksheet_part, WorkingDir, SHARED_STRINGS_PART};
use crate::error::{Error, Result};
use crate::headers::{HeaderManager, HeaderTable};
use crate::options::ParseOptions;
use crate::row::{ParseResult, ParsedRow, RawRow};
use crate::shared_strings::SharedStrings;
use crate::xml::{self, Element, XmlNode};
use std::path::{Path, PathBuf};

/// Parser for one worksheet of an XLSX workbook.
///
/// Configuration mirrors [`ParseOptions`]; [`Parser::parse`] runs the
/// whole pipeline and reports success as a `bool`, leaving rows and error
/// messages on the parser.
///
/// # Example
///
/// ```no_run
/// use vsxlsx::Parser;
///
/// let mut parser = Parser::new("workbook.xlsx");
/// parser.row_numbers(true);
///
/// if parser.parse() {
///     for row in parser.parsed() {
///         println!("{:?}", row.get("id"));
///     }
/// } else {
///     eprintln!("{:?}", parser.errors());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    file: PathBuf,
    options: ParseOptions,
    result: ParseResult,
}

impl Parser {
    /// Create a parser for an XLSX file with default options.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_options(file, ParseOptions::default())
    }

    /// Create a parser with explicit options.
    pub fn with_options(file: impl Into<PathBuf>, options: ParseOptions) -> Self {
        Self {
            file: file.into(),
            options,
            result: ParseResult::default(),
        }
    }

    /// Set the file to parse.
    pub fn set_file(&mut self, file: impl Into<PathBuf>) -> &mut Self {
        self.file = file.into();
        self
    }

    /// Select the worksheet to parse (1-based).
    pub fn use_sheet(&mut self, sheet: u32) -> &mut Self {
        self.options.sheet = sheet;
        self
    }

    /// Set whether the first row holds column names.
    pub fn has_header_row(&mut self, value: bool) -> &mut Self {
        self.options.has_header_row = value;
        self
    }

    /// Replace the header overrides.
    pub fn header_names<C, S, I>(&mut self, overrides: I) -> &mut Self
    where
        C: Into<ColumnRef>,
        S: Into<String>,
        I: IntoIterator<Item = (C, S)>,
    {
        self.options.header_overrides = overrides
            .into_iter()
            .map(|(c, s)| (c.into(), s.into()))
            .collect();
        self
    }

    /// Include the source row number in every output row.
    pub fn row_numbers(&mut self, value: bool) -> &mut Self {
        self.options.row_numbers = value;
        self
    }

    /// Set the directory extraction happens in. It must already exist.
    pub fn set_tmp_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.options.tmp_dir = dir.into();
        self
    }

    /// The file this parser reads.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Current options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Base directory for extraction.
    pub fn tmp_dir(&self) -> &Path {
        &self.options.tmp_dir
    }

    /// Path of the selected worksheet part inside the archive.
    pub fn sheet_part(&self) -> String {
        worksheet_part(self.options.sheet)
    }

    /// Run extract, load and process, then clean up.
    ///
    /// Returns whether every stage succeeded. Rows and errors from this
    /// call replace those of any earlier call.
    pub fn parse(&mut self) -> bool {
        let mut errors = Vec::new();

        let composed = match self.check_input() {
            Ok(()) => self.run(&mut errors),
            Err(e) => {
                record(&mut errors, e);
                None
            }
        };

        let success = composed.is_some();
        let (rows, headers) = composed.unwrap_or_default();
        self.result = ParseResult {
            success,
            rows,
            headers,
            errors,
        };
        success
    }

    /// Rows from the last parse.
    pub fn parsed(&self) -> &[ParsedRow] {
        &self.result.rows
    }

    /// Header table derived by the last parse.
    ///
    /// `None` when columns were named by their labels, or when no row ever
    /// produced headers.
    pub fn headers(&self) -> Option<&HeaderTable> {
        self.result.headers.as_ref()
    }

    /// Error messages from the last parse.
    pub fn errors(&self) -> &[String] {
        &self.result.errors
    }

    /// Full outcome of the last parse.
    pub fn result(&self) -> &ParseResult {
        &self.result
    }

    /// Consume the parser, keeping the outcome of the last parse.
    pub fn into_result(self) -> ParseResult {
        self.result
    }

    fn check_input(&self) -> Result<()> {
        if self.file.as_os_str().is_empty() {
            return Err(Error::missing_filename());
        }
        if !self.file.exists() {
            return Err(Error::file_not_found(&self.file));
        }
        if self.options.sheet == 0 {
            return Err(Error::Configuration(
                "Invalid worksheet number: 0 (worksheets are numbered from 1)".to_string(),
            ));
        }
        if !self.options.tmp_dir.is_dir() {
            return Err(Error::Configuration(format!(
                "Temporary directory does not exist: \"{}\"",
                self.options.tmp_dir.display()
            )));
        }
        Ok(())
    }

    fn run(&self, errors: &mut Vec<String>) -> Option<(Vec<ParsedRow>, Option<HeaderTable>)> {
        let working = match WorkingDir::extract(&self.options.tmp_dir, &self.file) {
            Ok(working) => working,
            Err(e) => {
                record(errors, e);
                return None;
            }
        };

        let outcome = self
            .load(&working)
            .and_then(|(sheet, strings)| compose(&sheet, &strings, &self.options));

        working.cleanup();

        match outcome {
            Ok((rows, headers)) => {
                log::debug!("parsed {} rows from {}", rows.len(), self.file.display());
                Some((rows, headers.headers().cloned()))
            }
            Err(e) => {
                record(errors, e);
                None
            }
        }
    }

    fn load(&self, working: &WorkingDir) -> Result<(Element, SharedStrings)> {
        let sheet_path = working.part(&self.sheet_part());
        if !sheet_path.is_file() {
            return Err(Error::missing_worksheet(self.options.sheet));
        }

        let strings_path = working.part(SHARED_STRINGS_PART);
        if !strings_path.is_file() {
            return Err(Error::missing_shared_strings(SHARED_STRINGS_PART));
        }

        let sheet = xml::load(&sheet_path)?;
        let strings = SharedStrings::load(&strings_path)?;
        log::debug!(
            "loaded {} ({} shared strings)",
            self.sheet_part(),
            strings.len()
        );

        Ok((sheet, strings))
    }
}

fn record(errors: &mut Vec<String>, err: Error) {
    log::warn!("{}", err);
    errors.push(err.to_string());
}

/// Build named rows from a `<worksheet>` tree.
///
/// Rows are taken in document order. With a header row expected, the
/// first row that yields any column names is consumed as headers and not
/// returned.
pub fn compose_rows<N: XmlNode>(
    worksheet: &N,
    strings: &SharedStrings,
    options: &ParseOptions,
) -> Result<Vec<ParsedRow>> {
    compose(worksheet, strings, options).map(|(rows, _)| rows)
}

fn compose<N: XmlNode>(
    worksheet: &N,
    strings: &SharedStrings,
    options: &ParseOptions,
) -> Result<(Vec<ParsedRow>, HeaderManager)> {
    let mut headers = HeaderManager::new(options.has_header_row, &options.header_overrides)?;
    let mut parsed = Vec::new();

    let Some(sheet_data) = worksheet.child("sheetData") else {
        return Ok((parsed, headers));
    };

    for (position, xlrow) in sheet_data.children_named("row").enumerate() {
        let (row, first_ref) = read_row(xlrow, strings)?;

        if headers.needs_headers() {
            headers.set_headers(&row);
            continue;
        }

        let mut named = headers.apply(&row);
        if options.row_numbers {
            named.set_row_number(source_row_number(xlrow, first_ref, position)?);
        }
        parsed.push(named);
    }

    Ok((parsed, headers))
}

/// Resolve every cell of a `<row>`, returning the row and the coordinate
/// reference of its first cell.
fn read_row<'a, N: XmlNode>(
    xlrow: &'a N,
    strings: &SharedStrings,
) -> Result<(RawRow, Option<&'a str>)> {
    let mut row = RawRow::new();
    let mut first_ref = None;
    let mut next_column = 0;

    for cell in xlrow.children_named("c") {
        let column = match cell.attribute("r") {
            Some(reference) => {
                first_ref.get_or_insert(reference);
                column_index_of(reference)?
            }
            None => next_column,
        };
        row.insert(column, cell_value(cell, strings)?);
        next_column = column + 1;
    }

    Ok((row, first_ref))
}

fn source_row_number<N: XmlNode>(
    xlrow: &N,
    first_ref: Option<&str>,
    position: usize,
) -> Result<u32> {
    if let Some(reference) = first_ref {
        return row_number_of(reference);
    }
    match xlrow.attribute("r") {
        Some(r) => r
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Lookup(format!("malformed row number {:?}", r))),
        None => Ok(position as u32 + 1),
    }
}
