//! # duke-relay-csv
//!
//! Delimited text reader and writer for duke-relay tables.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{ExportFormat, ExportOptions, ImportOptions, LineTerminator};
pub use reader::TableReader;
pub use writer::TableWriter;
