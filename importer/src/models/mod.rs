//! Domain models for the batch import core.
//!
//! - [`Scalar`] - a single non-missing cell value
//! - [`RawRow`] - one row of nullable cells, as decoded or submitted
//! - [`Matrix`] - the normalized header + records result

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Cell Values
// =============================================================================

/// A present cell value.
///
/// Missing cells are `None` in a [`RawRow`], never a `Scalar` variant.
/// Serialized untagged, so JSON `"a"`, `1`, `1.5` and `true` map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean cell.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text, kept verbatim.
    Text(String),
}

impl Scalar {
    /// True for text that is empty or whitespace only. Numbers and booleans are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(s) => s.trim().is_empty(),
            Scalar::Bool(_) | Scalar::Int(_) | Scalar::Float(_) => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// One row of nullable cells. Rows of the same table may differ in length.
pub type RawRow = Vec<Option<Scalar>>;

// =============================================================================
// Matrix
// =============================================================================

/// Normalized tabular data: an optional header row plus data records.
///
/// "No header" is represented by an empty header, there is no separate flag.
/// A non-empty header always passed [`crate::is_valid_header`] when the
/// matrix was built. Records are kept exactly as received, ragged or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Matrix {
    header: Vec<Scalar>,
    records: Vec<RawRow>,
}

impl Matrix {
    /// Matrix with no header and no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Only the builder creates populated matrices, after validating the header.
    pub(crate) fn new(header: Vec<Scalar>, records: Vec<RawRow>) -> Self {
        Self { header, records }
    }

    /// Header cells, empty when no valid header was found.
    pub fn header(&self) -> &[Scalar] {
        &self.header
    }

    /// Data records, possibly empty.
    pub fn records(&self) -> &[RawRow] {
        &self.records
    }

    /// Consume the matrix, returning `(header, records)`.
    pub fn into_parts(self) -> (Vec<Scalar>, Vec<RawRow>) {
        (self.header, self.records)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
