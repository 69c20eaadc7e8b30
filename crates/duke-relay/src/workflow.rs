//! Composite Drive and Sheets operations
//!
//! A [`Workflow`] owns one [`FileStore`] and one [`TableStore`] and chains
//! them through a per-call [`StagingArea`]. Nothing persists between calls.

use std::path::{Path, PathBuf};

use duke_relay_core::{
    FileStore, RemoteFile, SheetRange, TableRows, TableStore, UpdateSummary, UploadOptions,
    ValueInputMode,
};
use duke_relay_csv::{ExportFormat, ExportOptions, TableWriter};
use duke_relay_google::{CredentialSource, DriveClient, SheetsClient};

use crate::error::{Step, StepContext, WorkflowError, WorkflowResult};
use crate::staging::StagingArea;
use crate::transform::{LinesTransform, Transform};

/// Library-level workflow settings
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    /// Parent of the staging directories (default: the system temp dir)
    pub staging_dir: Option<PathBuf>,
    /// How written values are interpreted (default: raw)
    pub value_input: ValueInputMode,
}

/// A file addressed by ID or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTarget {
    Id(String),
    /// Resolved through [`FileStore::find_by_name`]
    Name {
        name: String,
        folder_id: Option<String>,
    },
}

impl FileTarget {
    pub fn id(id: impl Into<String>) -> Self {
        FileTarget::Id(id.into())
    }

    pub fn name(name: impl Into<String>, folder_id: Option<&str>) -> Self {
        FileTarget::Name {
            name: name.into(),
            folder_id: folder_id.map(str::to_string),
        }
    }
}

/// Parameters of [`Workflow::table_to_file`]
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Remote name of the uploaded file
    pub output_name: String,
    /// Range to export; the whole sheet when absent
    pub range: Option<String>,
    /// Sheet to export when no range is given; the first sheet when absent
    pub sheet_name: Option<String>,
    pub folder_id: Option<String>,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(output_name: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            range: None,
            sheet_name: None,
            folder_id: None,
            format: ExportFormat::default(),
        }
    }

    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    pub fn folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }
}

/// Orchestrates a file store and a table store
pub struct Workflow<F = DriveClient, T = SheetsClient> {
    files: F,
    tables: T,
    options: WorkflowOptions,
}

impl Workflow {
    /// Connect to Google Drive and Sheets with one service account
    pub fn connect(source: &CredentialSource) -> WorkflowResult<Self> {
        Self::connect_with_options(source, WorkflowOptions::default())
    }

    pub fn connect_with_options(
        source: &CredentialSource,
        options: WorkflowOptions,
    ) -> WorkflowResult<Self> {
        let files = DriveClient::from_credentials(source)?;
        let tables = SheetsClient::from_credentials(source)?;
        Ok(Self::with_options(files, tables, options))
    }
}

impl<F: FileStore, T: TableStore> Workflow<F, T> {
    pub fn new(files: F, tables: T) -> Self {
        Self::with_options(files, tables, WorkflowOptions::default())
    }

    pub fn with_options(files: F, tables: T, options: WorkflowOptions) -> Self {
        Self {
            files,
            tables,
            options,
        }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn tables(&self) -> &T {
        &self.tables
    }

    pub fn options(&self) -> &WorkflowOptions {
        &self.options
    }

    /// Download a file, turn it into rows and write them at `range`
    ///
    /// Without a transform every line of the file becomes a single-cell row.
    /// The staged download is removed whether or not any step fails. A
    /// malformed `range` fails before anything is downloaded.
    pub fn file_to_table(
        &self,
        file_id: &str,
        spreadsheet_id: &str,
        range: &str,
        transform: Option<&dyn Transform>,
    ) -> WorkflowResult<UpdateSummary> {
        check_range(range)?;
        let staging = self.stage()?;
        let result = self.stage_file_to_table(&staging, file_id, spreadsheet_id, range, transform);
        staging.cleanup();

        if let Ok(summary) = &result {
            tracing::info!(
                "Wrote file {} to {} ({} cells)",
                file_id,
                range,
                summary.updated_cells
            );
        }
        result
    }

    fn stage_file_to_table(
        &self,
        staging: &StagingArea,
        file_id: &str,
        spreadsheet_id: &str,
        range: &str,
        transform: Option<&dyn Transform>,
    ) -> WorkflowResult<UpdateSummary> {
        let path = staging.file("download");
        self.files.download(file_id, &path).step(Step::Download)?;

        let rows = match transform {
            Some(transform) => transform.apply(&path)?,
            None => LinesTransform.apply(&path)?,
        };

        self.tables
            .write_range(spreadsheet_id, range, &rows, self.options.value_input)
            .step(Step::Write)
    }

    /// Export a range (or a whole sheet) as CSV/TSV and upload it
    ///
    /// Returns the ID of the uploaded file.
    pub fn table_to_file(&self, spreadsheet_id: &str, request: &ExportRequest) -> WorkflowResult<String> {
        let rows = self.read_table(
            spreadsheet_id,
            request.range.as_deref(),
            request.sheet_name.as_deref(),
        )?;

        let staging = self.stage()?;
        let result = self.stage_table_to_file(&staging, &rows, request);
        staging.cleanup();

        if let Ok(file_id) = &result {
            tracing::info!(
                "Exported {} rows to '{}' (ID: {})",
                rows.len(),
                request.output_name,
                file_id
            );
        }
        result
    }

    fn stage_table_to_file(
        &self,
        staging: &StagingArea,
        rows: &TableRows,
        request: &ExportRequest,
    ) -> WorkflowResult<String> {
        let path = staging.file(&format!("export.{}", request.format.name()));
        TableWriter::write_file(rows, &path, &ExportOptions::for_format(request.format))?;

        let options = UploadOptions {
            folder_id: request.folder_id.clone(),
            name: Some(request.output_name.clone()),
            mime_type: Some(request.format.mime_type().to_string()),
        };
        self.files.upload(&path, &options).step(Step::Upload)
    }

    /// Read `range`, or the named (or first) sheet when no range is given
    pub fn read_table(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        sheet_name: Option<&str>,
    ) -> WorkflowResult<TableRows> {
        match range {
            Some(range) => self.tables.read_range(spreadsheet_id, range),
            None => self.tables.read_sheet(spreadsheet_id, sheet_name),
        }
        .step(Step::Read)
    }

    /// Overwrite `range` with `rows`, or append them after the table there
    pub fn write_table(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        append: bool,
    ) -> WorkflowResult<UpdateSummary> {
        check_range(range)?;
        let mode = self.options.value_input;
        if append {
            self.tables.append_rows(spreadsheet_id, range, rows, mode)
        } else {
            self.tables.write_range(spreadsheet_id, range, rows, mode)
        }
        .step(Step::Write)
    }

    /// List files in a folder and/or matching a store query
    pub fn list_files(&self, folder_id: Option<&str>, query: Option<&str>) -> WorkflowResult<Vec<RemoteFile>> {
        self.files.list(folder_id, query).step(Step::Lookup)
    }

    /// The ID a target refers to
    ///
    /// A name that matches nothing is [`WorkflowError::FileNotFound`].
    pub fn resolve(&self, target: &FileTarget) -> WorkflowResult<String> {
        match target {
            FileTarget::Id(id) => Ok(id.clone()),
            FileTarget::Name { name, folder_id } => {
                match self
                    .files
                    .find_by_name(name, folder_id.as_deref())
                    .step(Step::Lookup)?
                {
                    Some(file) => Ok(file.id),
                    None => {
                        tracing::warn!("File '{}' not found", name);
                        Err(WorkflowError::FileNotFound(name.clone()))
                    }
                }
            }
        }
    }

    /// Download a file to `output`, returning the byte count
    pub fn read_file(&self, target: &FileTarget, output: &Path) -> WorkflowResult<u64> {
        let file_id = self.resolve(target)?;
        self.files.download(&file_id, output).step(Step::Download)
    }

    /// Upload a local file, returning the new file's ID
    pub fn write_file(
        &self,
        local_path: &Path,
        folder_id: Option<&str>,
        name: Option<&str>,
    ) -> WorkflowResult<String> {
        let options = UploadOptions {
            folder_id: folder_id.map(str::to_string),
            name: name.map(str::to_string),
            mime_type: None,
        };
        self.files.upload(local_path, &options).step(Step::Upload)
    }

    fn stage(&self) -> WorkflowResult<StagingArea> {
        StagingArea::create(self.options.staging_dir.as_deref()).map_err(WorkflowError::Staging)
    }
}

/// Reject a destination range that is not A1 notation
fn check_range(range: &str) -> WorkflowResult<()> {
    SheetRange::parse(range).step(Step::Write)?;
    Ok(())
}
