//! Remote object metadata

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mime type the file store uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Metadata of a file or folder in the remote file store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Opaque, immutable identifier
    pub id: String,
    /// Display name; not unique within a folder
    pub name: String,
    pub mime_type: String,
    /// Size in bytes; absent for folders and native documents
    pub size: Option<u64>,
    pub modified_time: Option<DateTime<Utc>>,
    /// Parent folder IDs
    pub parents: Vec<String>,
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// Options for uploading a new file
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Folder to place the file in
    pub folder_id: Option<String>,
    /// Remote name (default: the local basename)
    pub name: Option<String>,
    /// Mime type (default: guessed from the extension)
    pub mime_type: Option<String>,
}

impl UploadOptions {
    pub fn folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A sheet within a spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    pub sheet_id: i64,
    pub title: String,
    /// Position among the spreadsheet's sheets
    pub index: u32,
}

/// What the table store reported after a write or append
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub updated_range: Option<String>,
    pub updated_rows: u32,
    pub updated_columns: u32,
    pub updated_cells: u32,
}

/// How the table store interprets written values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueInputMode {
    /// Values are stored literally
    #[default]
    Raw,
    /// Values are parsed as if typed into the UI (formulas, dates, numbers)
    UserEntered,
}

impl ValueInputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputMode::Raw => "RAW",
            ValueInputMode::UserEntered => "USER_ENTERED",
        }
    }
}

impl fmt::Display for ValueInputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueInputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RAW" => Ok(ValueInputMode::Raw),
            "USER_ENTERED" => Ok(ValueInputMode::UserEntered),
            other => Err(format!("unknown value input mode '{}'", other)),
        }
    }
}
