//! Table reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::ImportOptions;
use duke_relay_core::{CellValue, TableRows};

/// Reads delimited text into table rows
pub struct TableReader;

impl TableReader {
    /// Read a delimited file into rows
    pub fn read_file<P: AsRef<Path>>(path: P, options: &ImportOptions) -> CsvResult<TableRows> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read delimited text from a reader into rows
    ///
    /// Every record becomes one row, the first one included. Records of
    /// different lengths are kept as they are.
    pub fn read<R: Read>(reader: R, options: &ImportOptions) -> CsvResult<TableRows> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let row = record
                .iter()
                .map(|field| {
                    if options.auto_detect_types {
                        Self::detect_type(field)
                    } else {
                        CellValue::from(field)
                    }
                })
                .collect();

            rows.push(row);
        }

        Ok(rows)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }

        CellValue::from(field)
    }
}
