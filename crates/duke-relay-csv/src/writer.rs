//! Table writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{ExportFormat, ExportOptions, LineTerminator};
use duke_relay_core::CellValue;

/// Writes table rows as CSV or TSV
pub struct TableWriter;

impl TableWriter {
    /// Write rows to a file, replacing it
    pub fn write_file<P: AsRef<Path>>(
        rows: &[Vec<CellValue>],
        path: P,
        options: &ExportOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(rows, BufWriter::new(file), options)
    }

    /// Write rows to a writer
    ///
    /// Ragged rows are written as they are; nothing is padded.
    pub fn write<W: Write>(
        rows: &[Vec<CellValue>],
        writer: W,
        options: &ExportOptions,
    ) -> CsvResult<()> {
        match options.format {
            ExportFormat::Csv => Self::write_csv(rows, writer, options),
            ExportFormat::Tsv => Self::write_tsv(rows, writer),
        }
    }

    fn write_csv<W: Write>(
        rows: &[Vec<CellValue>],
        writer: W,
        options: &ExportOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(ExportFormat::Csv.delimiter())
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true);
        let mut csv_writer = builder.from_writer(writer);

        for row in rows {
            if row.is_empty() {
                // A zero-field record is a bare line break, not `""`
                let mut inner = csv_writer.into_inner().map_err(|e| e.into_error())?;
                inner.write_all(options.line_terminator.as_bytes())?;
                csv_writer = builder.from_writer(inner);
            } else {
                csv_writer.write_record(row.iter().map(|cell| cell.to_string()))?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn write_tsv<W: Write>(rows: &[Vec<CellValue>], mut writer: W) -> CsvResult<()> {
        for row in rows {
            let line = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\t");
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }

        writer.flush()?;
        Ok(())
    }
}
