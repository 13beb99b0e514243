//! Workbook adapters (xls, xlsx, ods) built on calamine.
//!
//! Only one worksheet is read, selected by index (first sheet by default).
//! Rows are anchored at A1: calamine trims the used range to its first
//! non-empty cell, so leading empty rows and columns are restored as missing
//! cells to keep every value at its stored position.

use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};
use chrono::Timelike;

use super::TabularReader;
use crate::config::ReaderConfig;
use crate::error::{ReaderError, ReaderResult};
use crate::models::{RawRow, Scalar};

macro_rules! workbook_reader {
    ($(#[$doc:meta])* $name:ident, $workbook:ty, $format:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            sheet_index: usize,
        }

        impl $name {
            pub fn new(config: &ReaderConfig) -> Self {
                Self {
                    sheet_index: config.sheet_index,
                }
            }
        }

        impl TabularReader for $name {
            fn read(&self, path: &Path) -> ReaderResult<Vec<RawRow>> {
                let file = BufReader::new(File::open(path)?);
                let mut workbook =
                    <$workbook>::new(file).map_err(|e| spreadsheet_error($format, e))?;
                read_sheet(&mut workbook, self.sheet_index, $format)
            }
        }
    };
}

workbook_reader!(
    /// Reads legacy `.xls` workbooks.
    XlsReader,
    Xls<BufReader<File>>,
    "xls"
);

workbook_reader!(
    /// Reads `.xlsx` workbooks.
    XlsxReader,
    Xlsx<BufReader<File>>,
    "xlsx"
);

workbook_reader!(
    /// Reads OpenDocument `.ods` spreadsheets.
    OdsReader,
    Ods<BufReader<File>>,
    "ods"
);

fn spreadsheet_error(format: &'static str, err: impl Display) -> ReaderError {
    ReaderError::Spreadsheet {
        format,
        message: err.to_string(),
    }
}

fn read_sheet<R>(workbook: &mut R, index: usize, format: &'static str) -> ReaderResult<Vec<RawRow>>
where
    R: Reader<BufReader<File>>,
    R::Error: Display,
{
    let range = workbook
        .worksheet_range_at(index)
        .ok_or(ReaderError::SheetNotFound { index })?
        .map_err(|e| spreadsheet_error(format, e))?;

    Ok(range_to_rows(&range))
}

/// Expand a calamine range into rows starting at A1.
///
/// Each row ends at its own last present cell, so a wide data row does not
/// pad the header with missing cells.
fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };

    (0..=last_row)
        .map(|row| {
            let mut cells: RawRow = (0..=last_col)
                .map(|col| range.get_value((row, col)).and_then(to_cell))
                .collect();
            let width = cells.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
            cells.truncate(width);
            cells
        })
        .collect()
}

fn to_cell(data: &Data) -> Option<Scalar> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Scalar::Text(s.clone())),
        Data::Int(i) => Some(Scalar::Int(*i)),
        Data::Float(f) => Some(Scalar::Float(*f)),
        Data::Bool(b) => Some(Scalar::Bool(*b)),
        Data::DateTime(dt) if dt.is_duration() => Some(Scalar::Float(dt.as_f64())),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(value) if value.num_seconds_from_midnight() == 0 => {
                Scalar::Text(value.format("%Y-%m-%d").to_string())
            }
            Some(value) => Scalar::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Scalar::Float(dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Scalar::Text(s.clone())),
        Data::Error(e) => Some(Scalar::Text(e.to_string())),
    }
}
