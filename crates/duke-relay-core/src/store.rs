//! Store traits implemented by the remote clients
//!
//! Every operation is one blocking request/response cycle (or a small,
//! bounded number of them for chunked downloads). Implementations log
//! failures where they happen and hand them back as [`StoreError`]s.

use std::path::Path;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::model::{RemoteFile, SheetMetadata, UpdateSummary, UploadOptions, ValueInputMode};
use crate::range::SheetRange;
use crate::value::TableRows;

/// Sheet title used when the first sheet of a spreadsheet cannot be looked up
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Maximum number of files returned by a single listing
pub const LIST_PAGE_SIZE: u32 = 100;

/// A remote hierarchical file store addressed by opaque IDs
pub trait FileStore {
    /// List files matching every given predicate
    ///
    /// `folder_id` restricts to direct children of a folder; `query` is a
    /// store-native filter expression. With neither, everything visible to
    /// the credential is listed. At most [`LIST_PAGE_SIZE`] results.
    fn list(&self, folder_id: Option<&str>, query: Option<&str>) -> StoreResult<Vec<RemoteFile>>;

    /// First file whose name matches `name` exactly
    fn find_by_name(&self, name: &str, folder_id: Option<&str>) -> StoreResult<Option<RemoteFile>>;

    /// Download a file's content to `output`, overwriting it
    ///
    /// Returns the number of bytes written. On failure `output` is left
    /// untouched.
    fn download(&self, file_id: &str, output: &Path) -> StoreResult<u64>;

    /// Upload a local file and return the new file's ID
    fn upload(&self, local_path: &Path, options: &UploadOptions) -> StoreResult<String>;

    /// Replace a file's content in place
    fn update(&self, file_id: &str, local_path: &Path, mime_type: Option<&str>) -> StoreResult<()>;

    fn delete(&self, file_id: &str) -> StoreResult<()>;

    /// Create a folder and return its ID
    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> StoreResult<String>;
}

/// A remote spreadsheet store addressed by spreadsheet ID and A1 range
pub trait TableStore {
    /// Read the rows present in `range`; short rows are returned as-is
    fn read_range(&self, spreadsheet_id: &str, range: &str) -> StoreResult<TableRows>;

    /// Overwrite exactly the cells addressed by `range` and `rows`
    fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary>;

    /// Append after the last row of the table `range` belongs to
    fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &TableRows,
        mode: ValueInputMode,
    ) -> StoreResult<UpdateSummary>;

    /// Clear values (not formatting) in `range`
    fn clear_range(&self, spreadsheet_id: &str, range: &str) -> StoreResult<()>;

    fn sheet_metadata(&self, spreadsheet_id: &str) -> StoreResult<Vec<SheetMetadata>>;

    /// Add a sheet and return the properties the store assigned to it
    fn create_sheet(&self, spreadsheet_id: &str, title: &str) -> StoreResult<SheetMetadata>;

    fn delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> StoreResult<()>;

    /// Forward store-native structural edit requests verbatim
    fn batch_update(&self, spreadsheet_id: &str, requests: &[Value]) -> StoreResult<Vec<Value>>;

    /// Read columns `A:Z` of a sheet
    ///
    /// Without a name the first sheet's title is looked up; if that lookup
    /// fails or finds no sheets, [`DEFAULT_SHEET_NAME`] is used.
    fn read_sheet(&self, spreadsheet_id: &str, sheet_name: Option<&str>) -> StoreResult<TableRows> {
        let title = match sheet_name {
            Some(name) => name.to_string(),
            None => first_sheet_title(self.sheet_metadata(spreadsheet_id)),
        };

        let range = SheetRange::sheet_read(title);
        self.read_range(spreadsheet_id, &range.to_a1_string())
    }
}

fn first_sheet_title(metadata: StoreResult<Vec<SheetMetadata>>) -> String {
    match metadata {
        Ok(sheets) => sheets
            .into_iter()
            .min_by_key(|sheet| sheet.index)
            .map(|sheet| sheet.title)
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
        Err(err) => {
            tracing::warn!("Sheet metadata lookup failed, using '{DEFAULT_SHEET_NAME}': {err}");
            DEFAULT_SHEET_NAME.to_string()
        }
    }
}

/// Log a failed store operation and pass the result through
pub fn log_failure<T>(operation: &str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(err) = &result {
        tracing::warn!("An error occurred while {operation}: {err}");
    }
    result
}

/// Fail with [`StoreError::LocalFileMissing`] unless `path` is an existing file
pub fn require_local_file(path: &Path) -> StoreResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StoreError::LocalFileMissing(path.to_path_buf()))
    }
}
