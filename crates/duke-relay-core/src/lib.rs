//! # duke-relay-core
//!
//! Core types shared by the duke-relay crates:
//! - [`FileStore`] and [`TableStore`] - the two remote stores, as traits
//! - [`RemoteFile`], [`SheetMetadata`], [`UpdateSummary`] - remote metadata
//! - [`CellValue`] and [`TableRows`] - tabular data
//! - [`SheetRange`] - A1-style range addressing
//!
//! ## Example
//!
//! ```rust
//! use duke_relay_core::{table, SheetRange};
//!
//! let rows = table![["Name", "Age"], ["Ana", "30"]];
//! let range = SheetRange::sheet_read("Sheet1");
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(range.to_string(), "Sheet1!A:Z");
//! ```

pub mod error;
pub mod model;
pub mod range;
pub mod store;
pub mod value;

pub use error::{StoreError, StoreResult};
pub use model::{
    RemoteFile, SheetMetadata, UpdateSummary, UploadOptions, ValueInputMode, FOLDER_MIME_TYPE,
};
pub use range::{column_to_letters, letters_to_column, CellRef, RangeArea, SheetRange, MAX_COLS};
pub use store::{FileStore, TableStore, DEFAULT_SHEET_NAME, LIST_PAGE_SIZE};
pub use value::{CellValue, TableRows};
