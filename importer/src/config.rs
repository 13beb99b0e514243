//! Reader configuration.
//!
//! Values come from the process environment (after loading a `.env` file if
//! one is present). Every field has a default, so an empty environment is a
//! valid configuration.
//!
//! | Variable                     | Meaning                                   |
//! |------------------------------|-------------------------------------------|
//! | `BATCH_IMPORT_CSV_DELIMITER` | Force the CSV delimiter (`\t` for tab)    |
//! | `BATCH_IMPORT_CSV_ENCODING`  | Force the CSV encoding (WHATWG label)     |
//! | `BATCH_IMPORT_SHEET_INDEX`   | Worksheet to read from xls/xlsx/ods files |

use std::env::{self, VarError};

use encoding_rs::Encoding;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding the CSV delimiter.
pub const ENV_CSV_DELIMITER: &str = "BATCH_IMPORT_CSV_DELIMITER";
/// Environment variable overriding the CSV encoding.
pub const ENV_CSV_ENCODING: &str = "BATCH_IMPORT_CSV_ENCODING";
/// Environment variable selecting the worksheet.
pub const ENV_SHEET_INDEX: &str = "BATCH_IMPORT_SHEET_INDEX";

/// Options for the tabular readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderConfig {
    /// CSV delimiter; auto-detected from the first line when `None`.
    pub csv_delimiter: Option<u8>,
    /// CSV encoding; auto-detected when `None`.
    pub csv_encoding: Option<&'static Encoding>,
    /// Zero-based worksheet index for spreadsheet formats.
    pub sheet_index: usize,
}

impl ReaderConfig {
    /// Load from the environment, reading `.env` first if present.
    ///
    /// Only the `BATCH_IMPORT_*` keys are read; unrelated variables are never
    /// decoded.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let mut vars = Vec::new();
        for key in [ENV_CSV_DELIMITER, ENV_CSV_ENCODING, ENV_SHEET_INDEX] {
            match env::var(key) {
                Ok(value) => vars.push((key, value)),
                Err(VarError::NotPresent) => {}
                Err(VarError::NotUnicode(_)) => return Err(ConfigError::NotUnicode(key)),
            }
        }

        Self::from_vars(vars)
    }

    /// Build from key/value pairs. Unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_CSV_DELIMITER => config.csv_delimiter = Some(parse_delimiter(value)?),
                ENV_CSV_ENCODING => config.csv_encoding = Some(parse_encoding(value)?),
                ENV_SHEET_INDEX => {
                    config.sheet_index = value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidSheetIndex(value.to_string()))?;
                }
                _ => {}
            }
        }

        Ok(config)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.csv_delimiter = Some(delimiter);
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.csv_encoding = Some(encoding);
        self
    }

    pub fn with_sheet_index(mut self, index: usize) -> Self {
        self.sheet_index = index;
        self
    }
}

/// Parse a delimiter given as a single ASCII character or the escape `\t`.
pub fn parse_delimiter(value: &str) -> ConfigResult<u8> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(ConfigError::InvalidDelimiter(value.to_string()))
            }
        }
    }
}

/// Resolve a WHATWG encoding label (`utf-8`, `latin1`, `windows-1252`, ...).
pub fn parse_encoding(value: &str) -> ConfigResult<&'static Encoding> {
    Encoding::for_label(value.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(value.to_string()))
}
