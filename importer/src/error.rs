//! Error types for the batch import core.
//!
//! - [`ReaderError`] - file decoding errors (unsupported format, I/O, corrupt data)
//! - [`ConfigError`] - invalid reader configuration values
//! - [`FormDataError`] - malformed submitted row payloads
//! - [`ImportError`] - top-level wrapper used by the CLI
//!
//! A structurally invalid table (empty input, blank header cell) is *not* an
//! error: the builder returns an empty [`crate::Matrix`] instead.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Reader Errors
// =============================================================================

/// Errors raised while decoding a file into raw rows.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Extension is not one of the supported tabular formats.
    ///
    /// Holds the extension in display form (`Txt`, `Pdf`).
    #[error("Reader for extension {0} is not supported")]
    UnsupportedFormat(String),

    /// The file name carries no extension to select a reader from.
    #[error("Cannot select a reader: '{}' has no extension", .0.display())]
    MissingExtension(PathBuf),

    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text.
    #[error("Invalid CSV content: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet container could not be decoded.
    #[error("Invalid {format} file: {message}")]
    Spreadsheet {
        format: &'static str,
        message: String,
    },

    /// The configured worksheet does not exist in the workbook.
    #[error("Workbook has no worksheet at index {index}")]
    SheetNotFound { index: usize },
}

impl ReaderError {
    /// Build an [`ReaderError::UnsupportedFormat`] from a raw extension token.
    pub fn unsupported(extension: &str) -> Self {
        Self::UnsupportedFormat(display_extension(extension))
    }
}

/// Lower-case the extension, then upper-case its first letter (`XLSX` -> `Xlsx`).
pub fn display_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from reader configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Delimiter must be exactly one ASCII character.
    #[error("Invalid CSV delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),

    /// Sheet index must be a non-negative integer.
    #[error("Invalid sheet index '{0}'")]
    InvalidSheetIndex(String),

    /// Encoding label not known to the WHATWG encoding standard.
    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),

    /// Environment variable is set but not valid UTF-8.
    #[error("Environment variable {0} is not valid UTF-8")]
    NotUnicode(&'static str),
}

// =============================================================================
// Form Data Errors
// =============================================================================

/// Errors while decoding submitted row data.
#[derive(Debug, Error)]
pub enum FormDataError {
    /// Payload is not an array of arrays of scalars.
    #[error("Invalid row payload: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level error wrapping every failure the import entry points can raise.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File could not be read.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submitted rows could not be decoded.
    #[error("Form data error: {0}")]
    FormData(#[from] FormDataError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for top-level import operations.
pub type ImportResult<T> = Result<T, ImportError>;
