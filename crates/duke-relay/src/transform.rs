//! File-to-table transforms
//!
//! A [`Transform`] turns a downloaded file into table rows. Transforms are
//! ordinary Rust values registered by name in a [`TransformRegistry`]; the
//! built-in set covers line-per-row text and delimited files.
//!
//! ```rust
//! use duke_relay::transform::{TransformError, TransformRegistry};
//! use duke_relay_core::{CellValue, TableRows};
//!
//! let mut registry = TransformRegistry::builtin();
//! registry.register("word_count", |path: &std::path::Path| -> Result<TableRows, TransformError> {
//!     let text = std::fs::read_to_string(path)?;
//!     Ok(vec![vec![CellValue::from(text.split_whitespace().count() as i64)]])
//! });
//!
//! assert!(registry.get("word_count").is_some());
//! assert!(registry.get("lines").is_some());
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use duke_relay_core::{CellValue, TableRows};
use duke_relay_csv::{CsvError, ExportFormat, ImportOptions, TableReader};
use thiserror::Error;

/// Errors raised by a transform
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Csv(#[from] CsvError),

    #[error("{0}")]
    Other(String),
}

/// Turns a local file into table rows
pub trait Transform {
    fn apply(&self, path: &Path) -> Result<TableRows, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&Path) -> Result<TableRows, TransformError>,
{
    fn apply(&self, path: &Path) -> Result<TableRows, TransformError> {
        self(path)
    }
}

/// One single-column row per line of UTF-8 text, each line trimmed
///
/// `\r\n`, `\n` and a bare `\r` all end a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinesTransform;

impl Transform for LinesTransform {
    fn apply(&self, path: &Path) -> Result<TableRows, TransformError> {
        let text = std::fs::read_to_string(path)?;
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        Ok(text
            .lines()
            .map(|line| vec![CellValue::from(line.trim())])
            .collect())
    }
}

/// Parses a CSV or TSV file, one row per record
#[derive(Debug, Clone)]
pub struct DelimitedTransform {
    pub options: ImportOptions,
}

impl DelimitedTransform {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            options: ImportOptions::for_format(format),
        }
    }
}

impl Transform for DelimitedTransform {
    fn apply(&self, path: &Path) -> Result<TableRows, TransformError> {
        Ok(TableReader::read_file(path, &self.options)?)
    }
}

/// Named transforms
#[derive(Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Box<dyn Transform>>,
}

impl TransformRegistry {
    /// Name of the transform used when none is chosen
    pub const DEFAULT: &'static str = "lines";

    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `lines`, `csv` and `tsv`
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Self::DEFAULT, LinesTransform);
        registry.register("csv", DelimitedTransform::new(ExportFormat::Csv));
        registry.register("tsv", DelimitedTransform::new(ExportFormat::Tsv));
        registry
    }

    /// Add a transform, replacing any with the same name
    pub fn register<T: Transform + 'static>(&mut self, name: &str, transform: T) {
        self.transforms.insert(name.to_string(), Box::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms.get(name).map(|transform| transform.as_ref())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }
}
