//! Batch Import CLI - normalize tabular files and form rows into a Matrix
//!
//! # Commands
//!
//! ```bash
//! batch-import read catalog.xlsx               # File mode: header row split from records
//! batch-import read upload.tmp --extension csv # Format taken from the flag
//! batch-import form rows.json                  # Form mode: header row kept as a record
//! echo '[["a","b"]]' | batch-import form -     # Form rows from stdin
//! batch-import formats                         # List supported extensions
//! ```
//!
//! The Matrix is printed as JSON on stdout; status lines and logs go to stderr.

use batch_import::config::{parse_delimiter, parse_encoding};
use batch_import::logging::init_logging;
use batch_import::{
    from_file, from_path, from_post_json, Format, ImportResult, Matrix, ReaderConfig,
};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "batch-import")]
#[command(about = "Normalize spreadsheet files and form rows into header + records", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a csv/xls/xlsx/ods file and output the Matrix as JSON
    Read {
        /// Input file
        input: PathBuf,

        /// Format to read as (default: the file's own extension)
        #[arg(short, long)]
        extension: Option<String>,

        /// CSV delimiter, `\t` for tab (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<String>,

        /// CSV encoding label (auto-detect if not specified)
        #[arg(long)]
        encoding: Option<String>,

        /// Worksheet index for xls/xlsx/ods (default: 0)
        #[arg(short, long)]
        sheet: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a Matrix from submitted rows (JSON array of arrays)
    Form {
        /// Input JSON file, or `-` for stdin
        input: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported file extensions
    Formats,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Read {
            input,
            extension,
            delimiter,
            encoding,
            sheet,
            output,
        } => cmd_read(
            &input,
            extension.as_deref(),
            delimiter.as_deref(),
            encoding.as_deref(),
            sheet,
            output.as_deref(),
        ),

        Commands::Form { input, output } => cmd_form(&input, output.as_deref()),

        Commands::Formats => cmd_formats(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_read(
    input: &Path,
    extension: Option<&str>,
    delimiter: Option<&str>,
    encoding: Option<&str>,
    sheet: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading: {}", input.display());

    let config = reader_config(delimiter, encoding, sheet)?;
    let matrix = read_matrix(input, extension, &config)?;

    report(&matrix);
    write_output(&matrix.to_json()?, output)?;

    Ok(())
}

/// Environment first (.env included), flags override.
fn reader_config(
    delimiter: Option<&str>,
    encoding: Option<&str>,
    sheet: Option<usize>,
) -> ImportResult<ReaderConfig> {
    let mut config = ReaderConfig::from_env()?;
    if let Some(d) = delimiter {
        config = config.with_delimiter(parse_delimiter(d)?);
    }
    if let Some(label) = encoding {
        config = config.with_encoding(parse_encoding(label)?);
    }
    if let Some(index) = sheet {
        config = config.with_sheet_index(index);
    }
    Ok(config)
}

fn read_matrix(input: &Path, extension: Option<&str>, config: &ReaderConfig) -> ImportResult<Matrix> {
    let matrix = match extension {
        Some(ext) => from_file(input, ext, config)?,
        None => from_path(input, config)?,
    };
    Ok(matrix)
}

fn cmd_form(input: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let payload = if input == "-" {
        eprintln!("📝 Reading rows from stdin");
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        eprintln!("📝 Reading rows: {}", input);
        fs::read_to_string(input)?
    };

    let matrix = from_post_json(&payload)?;

    report(&matrix);
    write_output(&matrix.to_json()?, output)?;

    Ok(())
}

fn cmd_formats() -> Result<(), Box<dyn std::error::Error>> {
    println!("📋 Supported formats:\n");
    for format in Format::ALL {
        println!("  .{}", format);
    }
    println!("\nExtensions are matched case-insensitively.");
    Ok(())
}

fn report(matrix: &Matrix) {
    if matrix.header().is_empty() {
        eprintln!("⚠️  No usable data detected (empty input or invalid header row)");
        return;
    }

    let columns: Vec<String> = matrix.header().iter().map(|c| c.to_string()).collect();
    eprintln!("   Columns: {}", columns.join(", "));
    eprintln!("✅ Built matrix with {} records", matrix.records().len());
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
