//! Cell value and table types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rows of cell values; outer order is row order, inner order is column order.
///
/// Rows may be ragged: the remote drops trailing empty cells, and nothing in
/// this crate pads them back.
pub type TableRows = Vec<Vec<CellValue>>;

/// A scalar cell value as exchanged with the table store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Text form used for exports: integers print without a fraction,
/// booleans as `TRUE`/`FALSE`, empty cells as nothing.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// Build a [`TableRows`] from nested literals
///
/// ```
/// use duke_relay_core::{table, CellValue};
///
/// let rows = table![["Name", "Age"], ["Ana", 30]];
/// assert_eq!(rows[1][1], CellValue::Number(30.0));
/// ```
#[macro_export]
macro_rules! table {
    ($([$($cell:expr),* $(,)?]),* $(,)?) => {
        vec![$(vec![$($crate::CellValue::from($cell)),*]),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_untagged_json() {
        let rows: TableRows = serde_json::from_str(r#"[["Name", 30, true, null]]"#).unwrap();
        assert_eq!(
            rows,
            vec![vec![
                CellValue::from("Name"),
                CellValue::Number(30.0),
                CellValue::Bool(true),
                CellValue::Empty,
            ]]
        );

        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(json, r#"[["Name",30.0,true,null]]"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(30.0).to_string(), "30");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(false).to_string(), "FALSE");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_table_macro() {
        let rows = table![["a"], ["b", "", 1, true]];
        assert_eq!(
            rows,
            vec![
                vec![CellValue::from("a")],
                vec![
                    CellValue::from("b"),
                    CellValue::from(""),
                    CellValue::Number(1.0),
                    CellValue::Bool(true),
                ],
            ]
        );
        assert!(rows[1][1].is_empty());
    }
}
