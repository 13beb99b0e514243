//! Tabular readers: decode a file into raw rows.
//!
//! Each supported extension maps to one [`Format`], and each format has one
//! [`TabularReader`] adapter. The mapping is a static table, so an unknown
//! extension fails with [`ReaderError::UnsupportedFormat`] before any file
//! is opened.
//!
//! | Extension | Adapter                          |
//! |-----------|----------------------------------|
//! | `csv`     | [`CsvReader`] (csv + encoding_rs) |
//! | `xls`     | [`XlsReader`] (calamine)         |
//! | `xlsx`    | [`XlsxReader`] (calamine)        |
//! | `ods`     | [`OdsReader`] (calamine)         |
//!
//! Readers preserve row and column order and never drop blank rows or cells;
//! deciding what is header and what is data belongs to [`crate::factory`].

mod csv;
mod spreadsheet;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::ReaderConfig;
use crate::error::{ReaderError, ReaderResult};
use crate::models::RawRow;

pub use self::csv::{decode_content, detect_delimiter, detect_encoding, parse_csv_str, CsvReader};
pub use self::spreadsheet::{OdsReader, XlsReader, XlsxReader};

// =============================================================================
// Formats
// =============================================================================

/// Supported tabular file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Delimited text.
    Csv,
    /// Legacy Excel binary workbook (BIFF).
    Xls,
    /// Office Open XML workbook.
    Xlsx,
    /// OpenDocument spreadsheet.
    Ods,
}

static FORMATS: Lazy<HashMap<&'static str, Format>> = Lazy::new(|| {
    Format::ALL
        .iter()
        .map(|format| (format.extension(), *format))
        .collect()
});

impl Format {
    /// Every supported format, in display order.
    pub const ALL: [Format; 4] = [Format::Csv, Format::Xls, Format::Xlsx, Format::Ods];

    /// Look up the format for an extension, ignoring case and a leading dot.
    pub fn from_extension(extension: &str) -> ReaderResult<Self> {
        let normalized = extension.trim_start_matches('.').to_lowercase();
        FORMATS
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| ReaderError::unsupported(&normalized))
    }

    /// Canonical lower-case extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xls => "xls",
            Format::Xlsx => "xlsx",
            Format::Ods => "ods",
        }
    }

    /// Adapter for this format.
    pub fn reader(&self, config: &ReaderConfig) -> Box<dyn TabularReader> {
        match self {
            Format::Csv => Box::new(CsvReader::new(config)),
            Format::Xls => Box::new(XlsReader::new(config)),
            Format::Xlsx => Box::new(XlsxReader::new(config)),
            Format::Ods => Box::new(OdsReader::new(config)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// =============================================================================
// Reader Capability
// =============================================================================

/// Decode a file into raw rows.
///
/// Implementations open the file themselves and release it before returning,
/// on success and on failure.
pub trait TabularReader: Send + Sync {
    /// Read every row of `path`, in stored order.
    fn read(&self, path: &Path) -> ReaderResult<Vec<RawRow>>;
}

// =============================================================================
// Uploaded Files
// =============================================================================

/// A file stored under a temporary path, with the name the client sent.
///
/// The format is chosen from `original_name`, since temporary upload paths
/// usually carry no meaningful extension.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub original_name: String,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
        }
    }

    /// Extension of the client-side file name.
    pub fn extension(&self) -> ReaderResult<&str> {
        extension_of(Path::new(&self.original_name))
    }
}

fn extension_of(path: &Path) -> ReaderResult<&str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| ReaderError::MissingExtension(path.to_path_buf()))
}

// =============================================================================
// Entry Points
// =============================================================================

/// Read `path` with the adapter selected by `extension`.
///
/// A blank `extension` is treated like a file name without one.
pub fn read(path: &Path, extension: &str, config: &ReaderConfig) -> ReaderResult<Vec<RawRow>> {
    if extension.trim_start_matches('.').trim().is_empty() {
        return Err(ReaderError::MissingExtension(path.to_path_buf()));
    }
    let format = Format::from_extension(extension)?;
    let rows = format.reader(config).read(path)?;
    debug!(path = %path.display(), %format, rows = rows.len(), "decoded tabular file");
    Ok(rows)
}

/// Read `path`, taking the format from its own extension.
pub fn read_path(path: &Path, config: &ReaderConfig) -> ReaderResult<Vec<RawRow>> {
    let extension = extension_of(path)?;
    read(path, extension, config)
}

/// Read an uploaded file, taking the format from its original name.
pub fn read_uploaded(file: &UploadedFile, config: &ReaderConfig) -> ReaderResult<Vec<RawRow>> {
    read(&file.path, file.extension()?, config)
}
