//! CSV options

use std::fmt;
use std::str::FromStr;

/// File format of an exported table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma separated, quoted where needed
    #[default]
    Csv,
    /// Tab separated, one row per line, no quoting
    Tsv,
}

impl ExportFormat {
    /// Parse a format name; `txt` is an alias for TSV
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "tsv" | "txt" => Some(ExportFormat::Tsv),
            _ => None,
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Tsv => "text/tab-separated-values",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown export format '{}'", s))
    }
}

/// Options for reading delimited files
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Automatic number/boolean detection (default: off, every cell is a string)
    pub auto_detect_types: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            auto_detect_types: false,
        }
    }
}

impl ImportOptions {
    /// Defaults for a given format
    pub fn for_format(format: ExportFormat) -> Self {
        Self {
            delimiter: format.delimiter(),
            ..Self::default()
        }
    }
}

/// Options for writing delimited files
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Quote character for CSV (default: double quote)
    pub quote: u8,
    /// Line terminator for CSV; TSV always uses LF
    pub line_terminator: LineTerminator,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            quote: b'"',
            line_terminator: LineTerminator::CRLF,
        }
    }
}

impl ExportOptions {
    pub fn for_format(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}

impl LineTerminator {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineTerminator::LF => b"\n",
            LineTerminator::CRLF => b"\r\n",
        }
    }
}
