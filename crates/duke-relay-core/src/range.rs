//! A1-style range addressing
//!
//! Ranges are references, not entities: a [`SheetRange`] is only ever
//! formatted into the string a remote call expects, or parsed back by code
//! that needs to know where a write lands. Validity against the actual sheet
//! set is decided by the remote service.

use std::fmt;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

/// Highest column index addressable with three letters (`ZZZ`)
pub const MAX_COLS: u32 = 18_278;

/// Columns covered when a whole sheet is read (`A:Z`)
pub const SHEET_READ_COLUMNS: (u32, u32) = (0, 25);

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(col) + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
pub fn letters_to_column(letters: &str) -> StoreResult<u32> {
    if letters.is_empty() {
        return Err(StoreError::InvalidRange("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(StoreError::InvalidRange(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
            .ok_or_else(|| StoreError::InvalidRange(format!("column '{}' too large", letters)))?;
    }

    let col = col - 1;
    if col >= MAX_COLS {
        return Err(StoreError::InvalidRange(format!(
            "column '{}' out of bounds",
            letters
        )));
    }

    Ok(col)
}

/// One end of a range: a column, a row, or both
///
/// `A1` has both, `A` is a whole column and `1` a whole row.
/// Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub col: Option<u32>,
    pub row: Option<u32>,
}

impl CellRef {
    /// A single cell
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            col: Some(col),
            row: Some(row),
        }
    }

    /// A whole column
    pub fn column(col: u32) -> Self {
        Self {
            col: Some(col),
            row: None,
        }
    }

    /// A whole row
    pub fn row(row: u32) -> Self {
        Self {
            col: None,
            row: Some(row),
        }
    }

    /// Parse `A1`, `$A$1`, `A` or `1`
    pub fn parse(s: &str) -> StoreResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StoreError::InvalidRange("empty cell reference".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        let col = if pos > col_start {
            Some(letters_to_column(&s[col_start..pos])?)
        } else {
            None
        };

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        let row = if row_str.is_empty() {
            None
        } else {
            let row: u32 = row_str.parse().map_err(|_| {
                StoreError::InvalidRange(format!("invalid row number in '{}'", s))
            })?;
            if row == 0 {
                return Err(StoreError::InvalidRange(format!(
                    "row number must be >= 1 in '{}'",
                    s
                )));
            }
            Some(row - 1)
        };

        if col.is_none() && row.is_none() {
            return Err(StoreError::InvalidRange(format!("no column or row in '{}'", s)));
        }

        Ok(Self { col, row })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();
        if let Some(col) = self.col {
            result.push_str(&column_to_letters(col));
        }
        if let Some(row) = self.row {
            result.push_str(&(row + 1).to_string());
        }
        result
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

/// The cell part of a range (`A1`, `A1:C10`, `A:Z`, `A2:B`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeArea {
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl RangeArea {
    /// Whole columns `first..=last`
    pub fn columns(first: u32, last: u32) -> Self {
        Self {
            start: CellRef::column(first),
            end: Some(CellRef::column(last)),
        }
    }

    pub fn parse(s: &str) -> StoreResult<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => Ok(Self {
                start: CellRef::parse(start)?,
                end: Some(CellRef::parse(end)?),
            }),
            None => Ok(Self {
                start: CellRef::parse(s)?,
                end: None,
            }),
        }
    }

    pub fn to_a1_string(&self) -> String {
        match &self.end {
            Some(end) => format!("{}:{}", self.start, end),
            None => self.start.to_a1_string(),
        }
    }
}

impl fmt::Display for RangeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

/// A range reference such as `Sheet1!A1:C10` or `'My Sheet'!A:Z`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRange {
    /// Sheet title; `None` addresses the first visible sheet
    pub sheet: Option<String>,
    /// Cell area; `None` addresses the whole sheet
    pub area: Option<RangeArea>,
}

impl SheetRange {
    pub fn new(sheet: impl Into<String>, area: RangeArea) -> Self {
        Self {
            sheet: Some(sheet.into()),
            area: Some(area),
        }
    }

    /// The whole sheet
    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
            area: None,
        }
    }

    /// Whole columns of a sheet, e.g. `Sheet1!A:Z`
    pub fn column_span(sheet: impl Into<String>, first: u32, last: u32) -> Self {
        Self::new(sheet, RangeArea::columns(first, last))
    }

    /// The fixed super-range used when a whole sheet is read
    pub fn sheet_read(sheet: impl Into<String>) -> Self {
        let (first, last) = SHEET_READ_COLUMNS;
        Self::column_span(sheet, first, last)
    }

    /// Parse an A1 range
    ///
    /// # Examples
    /// ```
    /// use duke_relay_core::SheetRange;
    ///
    /// let range = SheetRange::parse("'Q1 Data'!B2:D9").unwrap();
    /// assert_eq!(range.sheet.as_deref(), Some("Q1 Data"));
    /// assert_eq!(range.area.unwrap().start.row, Some(1));
    /// ```
    pub fn parse(s: &str) -> StoreResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StoreError::InvalidRange("empty range".into()));
        }

        if let Some(rest) = s.strip_prefix('\'') {
            let (sheet, tail) = parse_quoted_sheet(rest)
                .ok_or_else(|| StoreError::InvalidRange(format!("unterminated quote in '{}'", s)))?;
            return match tail {
                "" => Ok(Self::whole_sheet(sheet)),
                tail => match tail.strip_prefix('!') {
                    Some(area) => Ok(Self::new(sheet, RangeArea::parse(area)?)),
                    None => Err(StoreError::InvalidRange(format!(
                        "expected '!' after sheet name in '{}'",
                        s
                    ))),
                },
            };
        }

        match s.split_once('!') {
            Some((sheet, area)) => {
                if sheet.is_empty() {
                    return Err(StoreError::InvalidRange(format!("empty sheet name in '{}'", s)));
                }
                Ok(Self::new(sheet, RangeArea::parse(area)?))
            }
            // A bare token is a cell area when it parses as one, a sheet title otherwise
            None => match RangeArea::parse(s) {
                Ok(area) => Ok(Self {
                    sheet: None,
                    area: Some(area),
                }),
                Err(_) => Ok(Self::whole_sheet(s)),
            },
        }
    }

    pub fn to_a1_string(&self) -> String {
        let sheet = self.sheet.as_deref().map(quote_sheet_name);
        match (sheet, &self.area) {
            (Some(sheet), Some(area)) => format!("{}!{}", sheet, area),
            (Some(sheet), None) => sheet,
            (None, Some(area)) => area.to_a1_string(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for SheetRange {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        Self::parse(s)
    }
}

/// Quote a sheet title for use in a range when it is not a plain identifier
fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && CellRef::parse(name).is_err();

    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Split `My ''quoted'' sheet'!A1` into the unescaped title and the remainder
fn parse_quoted_sheet(rest: &str) -> Option<(String, &str)> {
    let mut title = String::new();
    let mut chars = rest.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if let Some((_, '\'')) = chars.peek() {
                chars.next();
                title.push('\'');
            } else {
                return Some((title, &rest[i + 1..]));
            }
        } else {
            title.push(c);
        }
    }

    None
}
