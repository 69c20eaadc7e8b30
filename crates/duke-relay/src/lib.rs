//! # duke-relay
//!
//! Move data between Google Drive files and Google Sheets ranges.
//!
//! duke-relay wraps a [`FileStore`] (Google Drive) and a [`TableStore`]
//! (Google Sheets) in a [`Workflow`] offering:
//!
//! - file -> table: download a file, transform it into rows, write a range
//! - table -> file: read a range or sheet, export it as CSV/TSV, upload it
//! - single-store passthroughs for reading and writing files and ranges
//!
//! Every operation returns an explicit [`WorkflowResult`]; failures name the
//! step that failed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use duke_relay::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = CredentialSource::resolve(None, None)?;
//!     let workflow = Workflow::connect(&source)?;
//!
//!     workflow.write_table("spreadsheet-id", "Sheet1!A1", &table![["Name", "Age"], ["Ana", 30]], false)?;
//!
//!     let file_id = workflow.table_to_file(
//!         "spreadsheet-id",
//!         &ExportRequest::new("people.csv").sheet("Sheet1"),
//!     )?;
//!     println!("Uploaded {file_id}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod prelude;
pub mod staging;
pub mod transform;
pub mod workflow;

pub use error::{Step, WorkflowError, WorkflowResult};
pub use staging::StagingArea;
pub use transform::{
    DelimitedTransform, LinesTransform, Transform, TransformError, TransformRegistry,
};
pub use workflow::{ExportRequest, FileTarget, Workflow, WorkflowOptions};

// Re-export the building blocks
pub use duke_relay_core::{
    table, CellValue, FileStore, RemoteFile, SheetMetadata, SheetRange, StoreError, StoreResult,
    TableRows, TableStore, UpdateSummary, UploadOptions, ValueInputMode,
};
pub use duke_relay_csv::{ExportFormat, ExportOptions, ImportOptions, TableReader, TableWriter};
pub use duke_relay_google::{AuthError, CredentialSource, DriveClient, SheetsClient};
