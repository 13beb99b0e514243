//! Delimited text adapter with encoding and delimiter auto-detection.
//!
//! The file is read whole, decoded to UTF-8, then split into records with the
//! `csv` crate. Fields are kept verbatim; empty fields become missing cells.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use super::TabularReader;
use crate::config::ReaderConfig;
use crate::error::ReaderResult;
use crate::models::{RawRow, Scalar};

/// Candidate delimiters, in tie-breaking order.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Reads `.csv` files.
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    delimiter: Option<u8>,
    encoding: Option<&'static Encoding>,
}

impl CsvReader {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            delimiter: config.csv_delimiter,
            encoding: config.csv_encoding,
        }
    }
}

impl TabularReader for CsvReader {
    fn read(&self, path: &Path) -> ReaderResult<Vec<RawRow>> {
        let bytes = fs::read(path)?;

        let encoding = self.encoding.unwrap_or_else(|| detect_encoding(&bytes));
        let content = decode_content(&bytes, encoding);
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(&content));

        debug!(
            path = %path.display(),
            encoding = encoding.name(),
            delimiter = %(delimiter as char).escape_default(),
            "decoding delimited text"
        );

        parse_csv_str(&content, delimiter)
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (including plain ASCII) is taken as is; anything else is
/// handed to `chardet`, falling back to UTF-8 for labels `encoding_rs`
/// does not know.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let (charset, _confidence, _language) = chardet::detect(bytes);
    let label = chardet::charset2encoding(&charset);
    Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8)
}

/// Decode bytes with `encoding`. A byte-order mark, if present, wins over
/// `encoding` and is stripped. Malformed sequences become U+FFFD.
pub fn decode_content(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (content, _used, _had_errors) = encoding.decode(bytes);
    content.into_owned()
}

/// Detect the delimiter by counting candidates on the first line.
///
/// The most frequent candidate wins; ties go to the earlier of `,` `;` `\t`
/// `|`. A first line without any candidate yields `,`.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = DELIMITERS[0];
    let mut best_count = 0;

    for &candidate in &DELIMITERS {
        let count = first_line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best_count = count;
            best = candidate;
        }
    }

    best
}

/// Split decoded text into raw rows.
///
/// Records may have different lengths. Blank lines between records are kept
/// as empty rows; blank lines at the end of the text produce nothing.
pub fn parse_csv_str(content: &str, delimiter: u8) -> ReaderResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let bytes = content.as_bytes();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;

        // The csv crate silently skips empty lines; put them back.
        if let Some(position) = record.position() {
            let skipped = blank_lines_at(bytes, position.byte() as usize);
            rows.extend(std::iter::repeat_with(Vec::new).take(skipped));
        }

        rows.push(record.iter().map(to_cell).collect());
    }

    Ok(rows)
}

fn to_cell(field: &str) -> Option<Scalar> {
    if field.is_empty() {
        None
    } else {
        Some(Scalar::Text(field.to_string()))
    }
}

/// Count the empty lines starting at `start`, where the previous record ended.
fn blank_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut i = start;

    // A CRLF terminator is split: the reader stops after '\r' and leaves '\n'.
    if i > 0 && bytes.get(i - 1) == Some(&b'\r') && bytes.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut count = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\r' => {
                count += 1;
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\n' => {
                count += 1;
                i += 1;
            }
            _ => break,
        }
    }
    count
}
