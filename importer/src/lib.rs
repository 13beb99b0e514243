//! # Batch Import - tabular file and form row normalization
//!
//! Batch Import turns an uploaded spreadsheet (csv, xls, xlsx, ods) or a set
//! of rows submitted by an edit form into a [`Matrix`]: a header plus data
//! records, ready for downstream validation and persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  File / ext │────▶│   Reader    │────▶│   Builder   │────▶│   Matrix    │
//! │ csv/xls/ods │     │ (per format)│     │ (file mode) │     │ header+rows │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//! ┌─────────────┐                                │
//! │  Form rows  │────────────────────────────────┘ (form mode)
//! └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_import::{from_path, ReaderConfig};
//! use std::path::Path;
//!
//! let matrix = from_path(Path::new("catalog.xlsx"), &ReaderConfig::default()).unwrap();
//! if matrix.header().is_empty() {
//!     eprintln!("no usable data");
//! } else {
//!     println!("{} records", matrix.records().len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cell values, raw rows and the Matrix
//! - [`reader`] - Format-specific file decoding
//! - [`validation`] - Header validity predicate
//! - [`factory`] - Matrix construction policies
//! - [`config`] - Reader configuration from the environment
//! - [`logging`] - Subscriber setup for the binary

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Decoding
pub mod reader;

// Validation
pub mod validation;

// Construction
pub mod factory;

// Observability
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, FormDataError, ImportError, ImportResult, ReaderError, ReaderResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Matrix, RawRow, Scalar};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::ReaderConfig;

// =============================================================================
// Re-exports - Readers
// =============================================================================

pub use reader::{
    read, read_path, read_uploaded, CsvReader, Format, OdsReader, TabularReader, UploadedFile,
    XlsReader, XlsxReader,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::is_valid_header;

// =============================================================================
// Re-exports - Builder
// =============================================================================

pub use factory::{
    build, from_file, from_path, from_post_data, from_post_json, from_uploaded_file,
    parse_post_data, SourceMode,
};
