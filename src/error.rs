//! Error types for the vsxlsx library.

use std::io;
use thiserror::Error;

/// Result type alias for vsxlsx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a worksheet.
///
/// [`Parser::parse`](crate::Parser::parse) never returns these directly;
/// it records their `Display` text in the error sequence instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The parser was configured with an unusable input or option.
    #[error("{0}")]
    Configuration(String),

    /// The archive could not be opened or unpacked.
    #[error("Failed to unzip file: {0}")]
    Extraction(String),

    /// An expected part was absent after extraction.
    #[error("{0}")]
    MissingPart(String),

    /// A reference inside the worksheet could not be resolved.
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// A column label contained something other than ASCII letters.
    #[error("Invalid column: {0:?}")]
    InvalidColumn(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error serializing parsed rows.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Error for a parser constructed without a filename.
    pub fn missing_filename() -> Self {
        Error::Configuration("Missing filename".to_string())
    }

    /// Error for an input path that does not exist.
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Error::Configuration(format!(
            "Cannot find file: \"{}\"",
            path.as_ref().display()
        ))
    }

    /// Error for a worksheet part that was not in the archive.
    pub fn missing_worksheet(sheet: u32) -> Self {
        Error::MissingPart(format!("Cannot find worksheet: {}", sheet))
    }

    /// Error for a shared-strings part that was not in the archive.
    pub fn missing_shared_strings(path: impl AsRef<std::path::Path>) -> Self {
        Error::MissingPart(format!(
            "Cannot find shared strings: {}",
            path.as_ref().display()
        ))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Extraction(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
