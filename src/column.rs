//! Column label arithmetic and cell coordinate references.
//!
//! Columns are identified by a zero-based index. Spreadsheet-style labels
//! use bijective base-26 with digits `a..=z` and no zero digit, so index
//! 25 is `z` and index 26 is `aa`.

use crate::error::{Error, Result};
use std::fmt;

/// Encode a zero-based column index as a lower-case column label.
///
/// # Example
///
/// ```
/// use vsxlsx::column::encode;
///
/// assert_eq!(encode(0), "a");
/// assert_eq!(encode(26), "aa");
/// ```
pub fn encode(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Decode a column label (case-insensitive) into a zero-based index.
///
/// Returns [`Error::InvalidColumn`] for an empty label, any non-letter
/// character, or a label too long to fit in `usize`.
pub fn decode(label: &str) -> Result<usize> {
    if label.is_empty() {
        return Err(Error::InvalidColumn(label.to_string()));
    }

    let mut value: usize = 0;
    for ch in label.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::InvalidColumn(label.to_string()));
        }
        let digit = (ch.to_ascii_lowercase() as u8 - b'a') as usize + 1;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::InvalidColumn(label.to_string()))?;
    }

    Ok(value - 1)
}

/// A caller-supplied column identifier, either numeric or alphabetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    /// Zero-based column index.
    Index(usize),
    /// Column label such as `"C"` or `"aa"`.
    Label(String),
}

impl ColumnRef {
    /// Resolve this identifier to a zero-based column index.
    pub fn resolve(&self) -> Result<usize> {
        match self {
            ColumnRef::Index(idx) => Ok(*idx),
            ColumnRef::Label(label) => decode(label),
        }
    }
}

impl From<usize> for ColumnRef {
    fn from(idx: usize) -> Self {
        ColumnRef::Index(idx)
    }
}

impl From<&str> for ColumnRef {
    /// Numeric strings are taken as indices, anything else as a label.
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<usize>() {
            Ok(idx) => ColumnRef::Index(idx),
            Err(_) => ColumnRef::Label(trimmed.to_string()),
        }
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::from(s.as_str())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(idx) => write!(f, "{}", idx),
            ColumnRef::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Resolve a numeric or alphabetic column identifier to an index.
pub fn resolve_column_identifier(input: impl Into<ColumnRef>) -> Result<usize> {
    input.into().resolve()
}

/// Split a coordinate reference like `"C12"` into its letters and digits.
fn split_reference(reference: &str) -> (&str, &str) {
    let letters_end = reference
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .len();
    reference.split_at(letters_end)
}

/// Column index of a coordinate reference (`"C12"` gives 2).
///
/// The trailing digit run is stripped and the remaining letters decoded.
/// Callers that key cells within a row sometimes call this the row
/// index, but it yields the column. The row comes from [`row_number_of`].
pub fn column_index_of(reference: &str) -> Result<usize> {
    let (letters, _) = split_reference(reference);
    decode(letters).map_err(|_| malformed(reference))
}

/// One-based row number of a coordinate reference (`"C12"` gives 12).
pub fn row_number_of(reference: &str) -> Result<u32> {
    let (letters, digits) = split_reference(reference);
    if digits.is_empty() || decode(letters).is_err() {
        return Err(malformed(reference));
    }
    digits.parse::<u32>().map_err(|_| malformed(reference))
}

fn malformed(reference: &str) -> Error {
    Error::Lookup(format!("malformed cell reference {:?}", reference))
}
