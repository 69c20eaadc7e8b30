//! duke-relay CLI - runs one Drive/Sheets operation configured from the environment

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use duke_relay::prelude::*;
use tracing_subscriber::EnvFilter;

/// Key file tried when no credentials are configured
const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// Range written to when none is given
const DEFAULT_WRITE_RANGE: &str = "Sheet1!A1";

#[derive(Parser, Debug)]
#[command(name = "duke-relay")]
#[command(
    author,
    version,
    about = "Move data between Google Drive files and Google Sheets",
    long_about = "Runs a single operation. Every option can also be set through the \
                  environment variable shown next to it, which is how CI jobs configure it."
)]
struct Cli {
    /// Operation to run
    #[arg(long, env = "OPERATION", value_enum)]
    operation: Operation,

    /// Service account key file
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Service account key document (JSON)
    #[arg(long, env = "GOOGLE_CREDENTIALS_JSON", hide_env_values = true)]
    credentials_json: Option<String>,

    #[arg(long, env = "SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    #[arg(long, env = "DRIVE_FOLDER_ID")]
    folder_id: Option<String>,

    #[arg(long, env = "DRIVE_FILE_ID")]
    file_id: Option<String>,

    /// Drive file name, resolved to an ID (drive_to_sheets)
    #[arg(long, env = "DRIVE_FILENAME")]
    filename: Option<String>,

    /// Extra Drive query (list_drive_files)
    #[arg(long, env = "DRIVE_QUERY")]
    query: Option<String>,

    /// A1 range (writes default to Sheet1!A1)
    #[arg(long = "range", env = "RANGE_NAME")]
    range: Option<String>,

    #[arg(long = "sheet", env = "SHEET_NAME")]
    sheet_name: Option<String>,

    /// Rows to write as a JSON array of arrays (write_sheets)
    #[arg(long, env = "SHEETS_DATA")]
    data: Option<String>,

    /// Append instead of overwriting (write_sheets)
    #[arg(long, env = "APPEND", action = ArgAction::Set, default_value = "false", value_parser = parse_flag)]
    append: bool,

    /// RAW or USER_ENTERED
    #[arg(long, env = "VALUE_INPUT_OPTION", default_value = "RAW")]
    value_input: ValueInputMode,

    /// Name of the exported file (sheets_to_drive)
    #[arg(long, env = "OUTPUT_FILENAME", default_value = "export.csv")]
    output_filename: String,

    /// csv or tsv (sheets_to_drive)
    #[arg(long = "format", env = "EXPORT_FORMAT", default_value = "csv")]
    export_format: ExportFormat,

    /// Registered transform applied to the Drive file (drive_to_sheets)
    #[arg(long, env = "TRANSFORM", default_value = TransformRegistry::DEFAULT)]
    transform: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Operation {
    /// Read data from Google Sheets
    #[value(name = "read_sheets")]
    ReadSheets,
    /// Write data to Google Sheets
    #[value(name = "write_sheets")]
    WriteSheets,
    /// Process a Drive file into Sheets
    #[value(name = "drive_to_sheets")]
    DriveToSheets,
    /// Export Sheets data to Drive
    #[value(name = "sheets_to_drive")]
    SheetsToDrive,
    /// List files in Google Drive
    #[value(name = "list_drive_files")]
    ListDriveFiles,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => {
            println!("Workflow completed successfully!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = credential_source(cli.credentials.as_deref(), non_empty(&cli.credentials_json))?;
    let options = WorkflowOptions {
        value_input: cli.value_input,
        ..WorkflowOptions::default()
    };
    let workflow = Workflow::connect_with_options(&source, options)
        .context("Failed to initialize Google clients")?;

    println!("Running operation: {}", operation_name(cli.operation));
    println!(
        "Spreadsheet ID: {}",
        non_empty(&cli.spreadsheet_id).unwrap_or("Not provided")
    );
    println!(
        "Drive Folder ID: {}",
        non_empty(&cli.folder_id).unwrap_or("Not provided")
    );

    match cli.operation {
        Operation::ReadSheets => read_sheets(&workflow, &cli),
        Operation::WriteSheets => write_sheets(&workflow, &cli),
        Operation::DriveToSheets => drive_to_sheets(&workflow, &cli),
        Operation::SheetsToDrive => sheets_to_drive(&workflow, &cli),
        Operation::ListDriveFiles => list_drive_files(&workflow, &cli),
    }
}

fn read_sheets(workflow: &Workflow, cli: &Cli) -> Result<()> {
    let spreadsheet_id = require(&cli.spreadsheet_id, "SPREADSHEET_ID", "read_sheets")?;

    println!("Reading from Google Sheets...");
    let rows = workflow
        .read_table(
            spreadsheet_id,
            non_empty(&cli.range),
            non_empty(&cli.sheet_name),
        )
        .context("Failed to read data")?;

    println!("Successfully read {} rows", rows.len());
    if !rows.is_empty() {
        println!("First few rows:");
        for (i, row) in rows.iter().take(5).enumerate() {
            println!("  Row {}: {}", i + 1, format_row(row));
        }
    }
    Ok(())
}

fn write_sheets(workflow: &Workflow, cli: &Cli) -> Result<()> {
    let spreadsheet_id = require(&cli.spreadsheet_id, "SPREADSHEET_ID", "write_sheets")?;
    let rows = match non_empty(&cli.data) {
        Some(data) => parse_rows(data)?,
        None => sample_rows(),
    };
    let range = non_empty(&cli.range).unwrap_or(DEFAULT_WRITE_RANGE);

    println!("Writing to Google Sheets...");
    let summary = workflow
        .write_table(spreadsheet_id, range, &rows, cli.append)
        .context("Failed to write data")?;

    println!(
        "Data written successfully ({} cells)",
        summary.updated_cells
    );
    Ok(())
}

fn drive_to_sheets(workflow: &Workflow, cli: &Cli) -> Result<()> {
    let target = match (non_empty(&cli.file_id), non_empty(&cli.filename)) {
        (Some(id), _) => FileTarget::id(id),
        (None, Some(name)) => FileTarget::name(name, None),
        (None, None) => bail!(
            "DRIVE_FILE_ID or DRIVE_FILENAME is required for drive_to_sheets operation"
        ),
    };
    let spreadsheet_id = require(&cli.spreadsheet_id, "SPREADSHEET_ID", "drive_to_sheets")?;

    let registry = TransformRegistry::builtin();
    let transform = match registry.get(&cli.transform) {
        Some(transform) => transform,
        None => bail!(
            "Unknown transform '{}' (available: {})",
            cli.transform,
            registry.names().collect::<Vec<_>>().join(", ")
        ),
    };
    let range = non_empty(&cli.range).unwrap_or(DEFAULT_WRITE_RANGE);
    tracing::debug!("Using transform '{}'", cli.transform);

    println!("Processing Drive file to Sheets...");
    let file_id = workflow.resolve(&target).context("Failed to find Drive file")?;
    let summary = workflow
        .file_to_table(&file_id, spreadsheet_id, range, Some(transform))
        .context("Failed to process Drive file to Sheets")?;

    println!(
        "Successfully processed Drive file to Sheets ({} cells)",
        summary.updated_cells
    );
    Ok(())
}

fn sheets_to_drive(workflow: &Workflow, cli: &Cli) -> Result<()> {
    let spreadsheet_id = require(&cli.spreadsheet_id, "SPREADSHEET_ID", "sheets_to_drive")?;

    let mut request = ExportRequest::new(cli.output_filename.as_str()).format(cli.export_format);
    if let Some(range) = non_empty(&cli.range) {
        request = request.range(range);
    }
    if let Some(sheet) = non_empty(&cli.sheet_name) {
        request = request.sheet(sheet);
    }
    if let Some(folder) = non_empty(&cli.folder_id) {
        request = request.folder(folder);
    }

    println!("Processing Sheets to Drive...");
    let file_id = workflow
        .table_to_file(spreadsheet_id, &request)
        .context("Failed to export Sheets to Drive")?;

    println!("Successfully exported to Drive. File ID: {file_id}");
    Ok(())
}

fn list_drive_files(workflow: &Workflow, cli: &Cli) -> Result<()> {
    println!("Listing files in Google Drive...");
    let files = workflow
        .list_files(non_empty(&cli.folder_id), non_empty(&cli.query))
        .context("Failed to list files")?;

    println!("Found {} files", files.len());
    for file in files.iter().take(10) {
        println!("  - {file}");
    }
    Ok(())
}

/// Pick credentials: an existing key path, then inline JSON, then
/// `./credentials.json`
fn credential_source(path: Option<&Path>, json: Option<&str>) -> Result<CredentialSource> {
    if let Some(path) = path.filter(|path| path.exists()) {
        return Ok(CredentialSource::Path(path.to_path_buf()));
    }

    if let Some(path) = path {
        tracing::warn!("Credentials file {} does not exist", path.display());
    }

    if let Some(json) = json {
        tracing::debug!("Using credentials from GOOGLE_CREDENTIALS_JSON");
        let document: serde_json::Value =
            serde_json::from_str(json).context("GOOGLE_CREDENTIALS_JSON is not valid JSON")?;
        return Ok(CredentialSource::Document(document));
    }

    let fallback = Path::new(DEFAULT_CREDENTIALS_FILE);
    if fallback.exists() {
        tracing::debug!("Using {}", DEFAULT_CREDENTIALS_FILE);
        return Ok(CredentialSource::Path(fallback.to_path_buf()));
    }

    let tried = path.unwrap_or(fallback);
    bail!(
        "Credentials file not found at {}. Set GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_CREDENTIALS_JSON",
        tried.display()
    )
}

fn parse_rows(data: &str) -> Result<TableRows> {
    serde_json::from_str(data).context("SHEETS_DATA is not valid JSON")
}

fn sample_rows() -> TableRows {
    table![
        ["Timestamp", "Status", "Message"],
        [
            chrono::Utc::now().to_rfc3339(),
            "Success",
            "Workflow executed successfully"
        ],
    ]
}

fn require<'a>(value: &'a Option<String>, env: &str, operation: &str) -> Result<&'a str> {
    match non_empty(value) {
        Some(value) => Ok(value),
        None => bail!("{env} is required for {operation} operation"),
    }
}

/// CI systems pass unset variables as empty strings
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

fn operation_name(operation: Operation) -> String {
    operation
        .to_possible_value()
        .map(|value| value.get_name().to_string())
        .unwrap_or_default()
}

fn format_row(row: &[CellValue]) -> String {
    let cells: Vec<String> = row.iter().map(|cell| format!("{cell:?}")).collect();
    format!("[{}]", cells.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["duke-relay"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_operation_names() {
        let cli = parse(&["--operation", "sheets_to_drive"]);
        assert_eq!(cli.operation, Operation::SheetsToDrive);
        assert_eq!(operation_name(cli.operation), "sheets_to_drive");

        let err = Cli::try_parse_from(["duke-relay", "--operation", "custom"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_value_options() {
        let cli = parse(&[
            "--operation",
            "write_sheets",
            "--append",
            "TRUE",
            "--value-input",
            "user_entered",
            "--format",
            "tsv",
        ]);
        assert!(cli.append);
        assert_eq!(cli.value_input, ValueInputMode::UserEntered);
        assert_eq!(cli.export_format, ExportFormat::Tsv);

        let cli = parse(&["--operation", "write_sheets", "--append", "yes"]);
        assert!(!cli.append);
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(r#"[["Name", "Age"], ["Ana", 30]]"#).unwrap();
        assert_eq!(rows, table![["Name", "Age"], ["Ana", 30]]);
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn test_sample_rows_shape() {
        let rows = sample_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], table![["Timestamp", "Status", "Message"]][0]);
        assert_eq!(rows[1][1], CellValue::from("Success"));
    }

    #[test]
    fn test_non_empty_and_require() {
        assert_eq!(non_empty(&Some("  ".into())), None);
        assert_eq!(non_empty(&Some("abc".into())), Some("abc"));
        assert!(require(&None, "SPREADSHEET_ID", "read_sheets").is_err());
    }

    #[test]
    fn test_credential_source_prefers_existing_path() {
        let dir = std::env::temp_dir();
        let source = credential_source(Some(&dir), Some("{}")).unwrap();
        assert!(matches!(source, CredentialSource::Path(_)));

        let source = credential_source(Some(Path::new("/no/such/key.json")), Some(r#"{"a": 1}"#)).unwrap();
        assert!(matches!(source, CredentialSource::Document(_)));

        assert!(credential_source(None, Some("{broken")).is_err());
    }
}
