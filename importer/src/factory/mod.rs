//! Matrix construction from decoded files and submitted rows.
//!
//! Two extraction policies share the same header gate:
//!
//! | Mode                     | First row invalid | First row valid                      |
//! |--------------------------|-------------------|--------------------------------------|
//! | [`SourceMode::File`]     | empty matrix      | header = row 1, records = rows 2..n  |
//! | [`SourceMode::PostData`] | empty matrix      | header = row 1, records = rows 1..n  |
//!
//! File sources carry a literal header line that must be split from the
//! data. Submitted rows come from a form whose columns are already known, so
//! the first row is checked but kept as data.
//!
//! Building never fails: empty or malformed input yields [`Matrix::empty`].
//! Only reader errors propagate from the file entry points.
//!
//! # Example
//!
//! ```
//! use batch_import::{from_post_data, Scalar};
//!
//! let rows = vec![
//!     vec![Some(Scalar::from("aaaa")), Some(Scalar::from("bbbb"))],
//!     vec![Some(Scalar::from("xxxx")), Some(Scalar::from("yyyy"))],
//! ];
//! let matrix = from_post_data(rows);
//! assert!(!matrix.header().is_empty());
//! assert_eq!(matrix.records().len(), 2);
//! ```

use std::path::Path;

use tracing::{info, warn};

use crate::config::ReaderConfig;
use crate::error::{FormDataError, ImportResult, ReaderResult};
use crate::models::{Matrix, RawRow, Scalar};
use crate::reader::{self, UploadedFile};
use crate::validation::is_valid_header;

/// Where the rows came from, which decides whether the header row is kept as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Decoded from a file: the header row is removed from the records.
    File,
    /// Submitted by a form: the header row is also the first record.
    PostData,
}

/// Apply the extraction policy for `mode` to `rows`.
pub fn build(rows: Vec<RawRow>, mode: SourceMode) -> Matrix {
    let Some(candidate) = rows.first() else {
        info!(?mode, "no rows, empty matrix");
        return Matrix::empty();
    };

    if !is_valid_header(candidate) {
        warn!(
            ?mode,
            rows = rows.len(),
            "first row has a missing or blank cell, discarding input"
        );
        return Matrix::empty();
    }

    let header: Vec<Scalar> = candidate.iter().flatten().cloned().collect();

    let records = match mode {
        SourceMode::File => rows.into_iter().skip(1).collect(),
        SourceMode::PostData => rows,
    };

    info!(
        ?mode,
        columns = header.len(),
        records = records.len(),
        "built matrix"
    );
    Matrix::new(header, records)
}

/// Read `path` as `extension` and build a file-mode matrix.
pub fn from_file(path: &Path, extension: &str, config: &ReaderConfig) -> ReaderResult<Matrix> {
    let rows = reader::read(path, extension, config)?;
    Ok(build(rows, SourceMode::File))
}

/// Read `path`, taking the format from its extension, and build a file-mode matrix.
pub fn from_path(path: &Path, config: &ReaderConfig) -> ReaderResult<Matrix> {
    let rows = reader::read_path(path, config)?;
    Ok(build(rows, SourceMode::File))
}

/// Read an uploaded file and build a file-mode matrix.
pub fn from_uploaded_file(file: &UploadedFile, config: &ReaderConfig) -> ReaderResult<Matrix> {
    let rows = reader::read_uploaded(file, config)?;
    Ok(build(rows, SourceMode::File))
}

/// Build a form-mode matrix from already decoded rows.
pub fn from_post_data(rows: Vec<RawRow>) -> Matrix {
    build(rows, SourceMode::PostData)
}

/// Decode a submitted JSON payload: an array of rows, each an array of scalars or nulls.
pub fn parse_post_data(json: &str) -> Result<Vec<RawRow>, FormDataError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a submitted JSON payload and build a form-mode matrix.
pub fn from_post_json(json: &str) -> ImportResult<Matrix> {
    let rows = parse_post_data(json)?;
    Ok(from_post_data(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};
    use zip::write::SimpleFileOptions;

    fn text(s: &str) -> Option<Scalar> {
        Some(Scalar::from(s))
    }

    fn row(cells: &[Option<&str>]) -> RawRow {
        cells.iter().map(|c| c.map(Scalar::from)).collect()
    }

    /// The four tables every format must handle, with (has header, record count).
    fn content_provider() -> Vec<(Vec<RawRow>, bool, usize)> {
        vec![
            (
                vec![
                    row(&[Some("header1"), Some("header2"), Some("header3")]),
                    row(&[Some("aaaa"), Some("bbbb"), Some("123")]),
                    row(&[Some("xxxx"), Some("yyyy"), Some("456")]),
                ],
                true,
                2,
            ),
            (vec![row(&[Some("header1"), Some("header2"), Some("header3")])], true, 0),
            (vec![row(&[None]), row(&[Some("abcd")])], false, 0),
            (vec![], false, 0),
        ]
    }

    // -------------------------------------------------------------------------
    // Fixture writers
    // -------------------------------------------------------------------------

    fn write_csv(path: &Path, rows: &[RawRow]) {
        let mut file = fs::File::create(path).unwrap();
        for r in rows {
            let line: Vec<String> = r
                .iter()
                .map(|c| c.as_ref().map(|v| format!("\"{}\"", v)).unwrap_or_default())
                .collect();
            writeln!(file, "{}", line.join(",")).unwrap();
        }
    }

    fn write_xlsx(path: &Path, rows: &[RawRow]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                if let Some(value) = cell {
                    sheet.write_string(r as u32, c as u16, value.to_string()).unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    fn write_ods(path: &Path, rows: &[RawRow]) {
        let mut table = String::new();
        for cells in rows {
            table.push_str("<table:table-row>");
            for cell in cells {
                match cell {
                    Some(value) => table.push_str(&format!(
                        "<table:table-cell office:value-type=\"string\"><text:p>{}</text:p></table:table-cell>",
                        value
                    )),
                    None => table.push_str("<table:table-cell/>"),
                }
            }
            table.push_str("</table:table-row>");
        }

        let content = format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
                "<office:document-content",
                " xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\"",
                " xmlns:table=\"urn:oasis:names:tc:opendocument:xmlns:table:1.0\"",
                " xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\"",
                " office:version=\"1.2\">",
                "<office:body><office:spreadsheet>",
                "<table:table table:name=\"Sheet1\">{}</table:table>",
                "</office:spreadsheet></office:body></office:document-content>"
            ),
            table
        );
        let manifest = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<manifest:manifest xmlns:manifest=\"urn:oasis:names:tc:opendocument:xmlns:manifest:1.0\">",
            "<manifest:file-entry manifest:full-path=\"/\"",
            " manifest:media-type=\"application/vnd.oasis.opendocument.spreadsheet\"/>",
            "<manifest:file-entry manifest:full-path=\"content.xml\" manifest:media-type=\"text/xml\"/>",
            "</manifest:manifest>"
        );

        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet").unwrap();
        zip.start_file("META-INF/manifest.xml", options).unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
        zip.start_file("content.xml", options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    /// There is no xls writer in the stack; prebuilt workbooks hold the
    /// content provider tables, in the same order.
    fn write_xls(path: &Path, rows: &[RawRow]) {
        let fixtures: [&[u8]; 4] = [
            include_bytes!("../../fixtures/header_and_records.xls"),
            include_bytes!("../../fixtures/header_only.xls"),
            include_bytes!("../../fixtures/missing_header_cell.xls"),
            include_bytes!("../../fixtures/empty.xls"),
        ];
        let index = content_provider()
            .iter()
            .position(|(case, _, _)| case.as_slice() == rows)
            .expect("no xls fixture for these rows");
        fs::write(path, fixtures[index]).unwrap();
    }

    /// Write `rows` as `file.<extension>` (lower-cased) in a fresh directory.
    fn create_file(extension: &str, rows: &[RawRow]) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let ext = extension.to_lowercase();
        let path = dir.path().join(format!("file.{}", ext));
        match ext.as_str() {
            "csv" => write_csv(&path, rows),
            "xls" => write_xls(&path, rows),
            "xlsx" => write_xlsx(&path, rows),
            "ods" => write_ods(&path, rows),
            other => panic!("no fixture writer for {}", other),
        }
        (dir, path)
    }

    // -------------------------------------------------------------------------
    // File mode
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_from_file_success() {
        for extension in ["csv", "xls", "xlsx", "ods", "CSV", "XLS", "XLSX", "ODS"] {
            for (rows, has_header, records) in content_provider() {
                let (_dir, path) = create_file(extension, &rows);
                let matrix = from_file(&path, extension, &ReaderConfig::default()).unwrap();

                assert_eq!(
                    !matrix.header().is_empty(),
                    has_header,
                    "{} header for {:?}",
                    extension,
                    rows
                );
                assert_eq!(matrix.records().len(), records, "{} records for {:?}", extension, rows);
            }
        }
    }

    #[test]
    fn test_file_values_keep_their_position() {
        for extension in ["csv", "xls", "xlsx", "ods"] {
            let rows = content_provider().remove(0).0;
            let (_dir, path) = create_file(extension, &rows);
            let matrix = from_path(&path, &ReaderConfig::default()).unwrap();

            assert_eq!(
                matrix.header(),
                &[Scalar::from("header1"), Scalar::from("header2"), Scalar::from("header3")]
            );
            assert_eq!(matrix.records()[0], vec![text("aaaa"), text("bbbb"), text("123")]);
            assert_eq!(matrix.records()[1], vec![text("xxxx"), text("yyyy"), text("456")]);
        }
    }

    #[test]
    fn test_wide_data_row_keeps_header() {
        let rows = vec![
            row(&[Some("h1"), Some("h2")]),
            row(&[Some("a"), Some("b"), Some("extra")]),
        ];

        for extension in ["csv", "xlsx", "ods"] {
            let (_dir, path) = create_file(extension, &rows);
            let matrix = from_path(&path, &ReaderConfig::default()).unwrap();

            assert_eq!(matrix.header(), &[Scalar::from("h1"), Scalar::from("h2")], "{}", extension);
            assert_eq!(matrix.records(), &rows[1..], "{}", extension);
        }
    }

    #[test]
    fn test_create_from_file_wrong_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "header1,header2\n").unwrap();

        let err = from_path(&path, &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Reader for extension Txt is not supported");

        let upload = UploadedFile::new(&path, "test.TXT");
        let err = from_uploaded_file(&upload, &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Reader for extension Txt is not supported");
    }

    #[test]
    fn test_corrupt_file_propagates_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, "definitely not a zip archive").unwrap();

        let err = from_path(&path, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, ReaderError::Spreadsheet { format: "xlsx", .. }));
    }

    #[test]
    fn test_uploaded_file_with_temporary_path() {
        let rows = content_provider().remove(0).0;
        let (_dir, path) = create_file("csv", &rows);
        let temp_path = path.with_file_name("php8A2F.tmp");
        fs::rename(&path, &temp_path).unwrap();

        let upload = UploadedFile::new(&temp_path, "catalog.csv");
        let matrix = from_uploaded_file(&upload, &ReaderConfig::default()).unwrap();
        assert_eq!(matrix.records().len(), 2);
    }

    #[test]
    fn test_file_mode_ragged_rows_pass_through() {
        let rows = vec![
            row(&[Some("a"), Some("b")]),
            row(&[Some("1")]),
            row(&[Some("1"), Some("2"), Some("3")]),
            vec![],
        ];
        let matrix = build(rows.clone(), SourceMode::File);

        assert_eq!(matrix.header().len(), 2);
        assert_eq!(matrix.records(), &rows[1..]);
    }

    #[test]
    fn test_file_mode_later_invalid_rows_are_kept() {
        let rows = vec![row(&[Some("a"), Some("b")]), row(&[None, Some("")])];
        let matrix = build(rows, SourceMode::File);

        assert_eq!(matrix.records().len(), 1);
        assert_eq!(matrix.records()[0], vec![None, text("")]);
    }

    #[test]
    fn test_blank_header_cell_discards_everything() {
        let rows = vec![
            row(&[Some("a"), Some(" ")]),
            row(&[Some("1"), Some("2")]),
            row(&[Some("3"), Some("4")]),
        ];
        assert_eq!(build(rows.clone(), SourceMode::File), Matrix::empty());
        assert_eq!(build(rows, SourceMode::PostData), Matrix::empty());
    }

    // -------------------------------------------------------------------------
    // Form mode
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_from_post_data_success() {
        let cases: Vec<(Vec<RawRow>, bool, usize)> = vec![
            (
                vec![
                    row(&[Some("aaaa"), Some("bbbb"), Some("123")]),
                    row(&[Some("xxxx"), Some("yyyy"), Some("456")]),
                ],
                true,
                2,
            ),
            (vec![row(&[Some("aaaa"), Some("bbbb"), Some("123")])], true, 1),
            (vec![row(&[None]), row(&[Some("abcd")])], false, 0),
            (vec![], false, 0),
        ];

        for (rows, has_header, records) in cases {
            let matrix = from_post_data(rows.clone());
            assert_eq!(!matrix.header().is_empty(), has_header, "header for {:?}", rows);
            assert_eq!(matrix.records().len(), records, "records for {:?}", rows);
        }
    }

    #[test]
    fn test_post_data_keeps_first_row_as_record() {
        let rows = vec![row(&[Some("a"), Some("b")]), row(&[Some("c"), None])];
        let matrix = from_post_data(rows.clone());

        assert_eq!(matrix.header(), &[Scalar::from("a"), Scalar::from("b")]);
        assert_eq!(matrix.records(), rows.as_slice());
    }

    #[test]
    fn test_parse_post_data() {
        let rows = parse_post_data(r#"[["aaaa", "bbbb", 123], ["xxxx", null, 4.5, true]]"#).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], Some(Scalar::Int(123)));
        assert_eq!(rows[1][1], None);
        assert_eq!(rows[1][3], Some(Scalar::Bool(true)));

        let matrix = from_post_data(rows);
        assert_eq!(matrix.records().len(), 2);
    }

    #[test]
    fn test_from_post_json() {
        let matrix = from_post_json(r#"[["id", "name"], [1, null]]"#).unwrap();
        assert_eq!(matrix.header(), &[Scalar::from("id"), Scalar::from("name")]);
        assert_eq!(matrix.records().len(), 2);

        let err = from_post_json("[[1, [2]]]").unwrap_err();
        assert!(matches!(err, crate::error::ImportError::FormData(_)));
    }

    #[test]
    fn test_parse_post_data_rejects_nested_values() {
        assert!(parse_post_data(r#"[["a", {"b": 1}]]"#).is_err());
        assert!(parse_post_data(r#"{"rows": []}"#).is_err());
        assert!(parse_post_data("not json").is_err());
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    #[test]
    fn test_build_is_idempotent() {
        for mode in [SourceMode::File, SourceMode::PostData] {
            for (rows, _, _) in content_provider() {
                assert_eq!(build(rows.clone(), mode), build(rows, mode));
            }
        }
    }
}
