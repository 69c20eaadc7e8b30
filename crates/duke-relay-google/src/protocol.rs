//! Wire types for the Drive v3 and Sheets v4 JSON APIs
//!
//! Only the fields the clients read are modelled; everything else in a
//! response is ignored.

use chrono::{DateTime, Utc};
use duke_relay_core::{CellValue, RemoteFile, SheetMetadata, TableRows, UpdateSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field mask requested for every file listing
pub const FILE_LIST_FIELDS: &str =
    "nextPageToken, files(id, name, mimeType, size, modifiedTime, parents)";

/// A file resource as returned by Drive
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    /// Decimal string; absent for folders and native documents
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl From<DriveFile> for RemoteFile {
    fn from(file: DriveFile) -> Self {
        RemoteFile {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|size| size.parse().ok()),
            modified_time: file.modified_time,
            parents: file.parents,
        }
    }
}

/// One page of a file listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    /// Present when more results exist; never followed
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Metadata sent when creating a file or folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

/// Response carrying only a file ID (`fields=id`)
#[derive(Debug, Deserialize)]
pub struct FileId {
    pub id: String,
}

/// A block of cell values
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Missing when the range holds no values
    #[serde(default)]
    pub values: TableRows,
}

impl ValueRange {
    /// Request body for a write or append
    ///
    /// A `null` value tells the remote to leave a cell alone, so empty cells
    /// go out as empty strings and overwrite what was there.
    pub fn for_write(range: &str, rows: &TableRows) -> Self {
        let values = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        CellValue::Empty => CellValue::String(String::new()),
                        other => other.clone(),
                    })
                    .collect()
            })
            .collect();

        ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

/// Result of `values.update`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

impl From<UpdateValuesResponse> for UpdateSummary {
    fn from(response: UpdateValuesResponse) -> Self {
        UpdateSummary {
            updated_range: response.updated_range,
            updated_rows: response.updated_rows,
            updated_columns: response.updated_columns,
            updated_cells: response.updated_cells,
        }
    }
}

/// Result of `values.append`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: UpdateValuesResponse,
}

/// Sheet properties as reported by Sheets
///
/// Zero-valued fields may be omitted on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u32,
}

impl From<SheetProperties> for SheetMetadata {
    fn from(properties: SheetProperties) -> Self {
        SheetMetadata {
            sheet_id: properties.sheet_id,
            title: properties.title,
            index: properties.index,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

/// A spreadsheet fetched with `fields=sheets.properties`
#[derive(Debug, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

/// Result of `spreadsheets.batchUpdate`
#[derive(Debug, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetReply {
    pub add_sheet: AddSheetResult,
}

#[derive(Debug, Deserialize)]
pub struct AddSheetResult {
    pub properties: SheetProperties,
}
