//! Header validity check.
//!
//! A header row is structurally valid when it has at least one cell and none
//! of its cells is missing or blank. The predicate is evaluated once per
//! build, against the first row only.
//!
//! # Example
//!
//! ```
//! use batch_import::{is_valid_header, Scalar};
//!
//! assert!(is_valid_header(&[Some(Scalar::from("id")), Some(Scalar::from("name"))]));
//! assert!(!is_valid_header(&[Some(Scalar::from("id")), None]));
//! assert!(!is_valid_header(&[]));
//! ```

use crate::models::Scalar;

/// Returns true if `row` can serve as a header: non-empty, no missing or blank cell.
pub fn is_valid_header(row: &[Option<Scalar>]) -> bool {
    !row.is_empty()
        && row
            .iter()
            .all(|cell| cell.as_ref().is_some_and(|value| !value.is_blank()))
}
