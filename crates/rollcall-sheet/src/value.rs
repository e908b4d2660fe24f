//! Cell values and read grids

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar content of one cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Nothing stored
    #[default]
    Empty,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Text
    Text(String),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    /// Text value
    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Empty, or text that is only whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// What the cell shows, untrimmed (`""` for empty)
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// Numeric reading of the cell; text is parsed, accepting a decimal comma
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

/// Integral values print without a fractional part
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Row-major result of a range read
///
/// Stores may drop trailing blank cells and rows, so rows can be shorter
/// than the requested range. Anything missing reads as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Wrap raw rows
    #[inline]
    #[must_use]
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Single-row grid
    #[must_use]
    pub fn from_row(row: Vec<CellValue>) -> Self {
        Self { rows: vec![row] }
    }

    /// Cell at zero-based offsets from the range origin
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// First row, padded to `width` with empties
    #[must_use]
    pub fn first_row(&self, width: usize) -> Vec<&CellValue> {
        (0..width).map(|c| self.get(0, c)).collect()
    }

    /// First column, padded to `height` with empties
    #[must_use]
    pub fn first_column(&self, height: usize) -> Vec<&CellValue> {
        (0..height).map(|r| self.get(r, 0)).collect()
    }

    /// Rows actually returned
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// No rows returned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text(" x ").is_blank());
        assert!(!CellValue::number(0.0).is_blank());
        assert!(!CellValue::Bool(false).is_blank());
    }

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(CellValue::number(0.0).display_text(), "0");
        assert_eq!(CellValue::number(50.0).display_text(), "50");
        assert_eq!(CellValue::number(12.5).display_text(), "12.5");
    }

    #[test]
    fn as_number_parses_text() {
        assert_eq!(CellValue::text(" 50 ").as_number(), Some(50.0));
        assert_eq!(CellValue::text("12,5").as_number(), Some(12.5));
        assert_eq!(CellValue::text("fifty").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::number(f64::NAN).as_number(), None);
    }

    #[test]
    fn grid_pads_missing_cells() {
        let grid = Grid::from_row(vec![CellValue::text("Sep 7")]);
        let row = grid.first_row(3);
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], &CellValue::text("Sep 7"));
        assert!(row[2].is_blank());
        assert!(grid.get(5, 5).is_blank());
    }

    #[test]
    fn untagged_serde() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[null, 3, "x", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Empty,
                CellValue::number(3.0),
                CellValue::text("x"),
                CellValue::Bool(true)
            ]
        );
    }
}
