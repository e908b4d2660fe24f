//! Cell coordinates
//!
//! Columns are base-26 letters with 1-indexed digits: `A` = 1, `Z` = 26,
//! `AA` = 27. There is no zero digit, so the successor of `Z` is `AA` and the
//! successor of `AZ` is `BA`. Rows are 1-indexed.

use crate::error::CoordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnRef(u32);

impl ColumnRef {
    /// Column `A`
    pub const A: Self = Self(1);

    /// Create from a 1-based index
    ///
    /// # Errors
    /// `CoordError::ZeroColumn` for index 0
    #[inline]
    pub fn from_index(index: u32) -> Result<Self, CoordError> {
        if index == 0 {
            Err(CoordError::ZeroColumn)
        } else {
            Ok(Self(index))
        }
    }

    /// 1-based index
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }

    /// The column immediately to the right
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The column `n` places to the right
    #[inline]
    #[must_use]
    pub fn offset(self, n: u32) -> Self {
        Self(self.0.saturating_add(n))
    }

    /// Distance from `origin` if this column is at or right of it
    #[inline]
    #[must_use]
    pub fn distance_from(self, origin: Self) -> Option<u32> {
        self.0.checked_sub(origin.0)
    }

    /// Letter form (`A`, `Z`, `AA`, ...)
    #[must_use]
    pub fn letters(self) -> String {
        let mut n = self.0;
        let mut out = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            // rem < 26 so the cast cannot truncate
            out.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        out.iter().rev().collect()
    }
}

impl FromStr for ColumnRef {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoordError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(CoordError::InvalidColumn(s.to_string()));
        }

        let mut index: u32 = 0;
        for b in s.bytes() {
            let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
            index = index
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| CoordError::ColumnOverflow(s.to_string()))?;
        }
        Ok(Self(index))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = CoordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnRef> for String {
    fn from(value: ColumnRef) -> Self {
        value.letters()
    }
}

/// A single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    /// Column
    pub column: ColumnRef,
    /// 1-based row
    pub row: u32,
}

impl CellRef {
    /// Create a cell reference
    #[inline]
    #[must_use]
    pub fn new(column: ColumnRef, row: u32) -> Self {
        Self { column, row }
    }
}

impl FromStr for CellRef {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoordError::Empty);
        }
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| CoordError::InvalidCell(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoordError::InvalidCell(s.to_string()));
        }

        let column = letters.parse::<ColumnRef>()?;
        let row = digits
            .parse::<u32>()
            .map_err(|_| CoordError::InvalidCell(s.to_string()))?;
        if row == 0 {
            return Err(CoordError::ZeroRow(s.to_string()));
        }
        Ok(Self { column, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Rectangular block of cells, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    start: CellRef,
    end: CellRef,
}

impl CellRange {
    /// Create a range from two corners in any order
    #[must_use]
    pub fn new(a: CellRef, b: CellRef) -> Self {
        let start = CellRef::new(a.column.min(b.column), a.row.min(b.row));
        let end = CellRef::new(a.column.max(b.column), a.row.max(b.row));
        Self { start, end }
    }

    /// A single cell
    #[inline]
    #[must_use]
    pub fn cell(cell: CellRef) -> Self {
        Self::new(cell, cell)
    }

    /// `width` columns of one row, starting at `first`
    #[must_use]
    pub fn row_span(row: u32, first: ColumnRef, width: u32) -> Self {
        let last = first.offset(width.saturating_sub(1));
        Self::new(CellRef::new(first, row), CellRef::new(last, row))
    }

    /// Rows `first_row..=last_row` of one column
    #[must_use]
    pub fn column_span(column: ColumnRef, first_row: u32, last_row: u32) -> Self {
        Self::new(CellRef::new(column, first_row), CellRef::new(column, last_row))
    }

    /// Top-left corner
    #[inline]
    #[must_use]
    pub fn start(&self) -> CellRef {
        self.start
    }

    /// Bottom-right corner
    #[inline]
    #[must_use]
    pub fn end(&self) -> CellRef {
        self.end
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.end.column.index() - self.start.column.index() + 1
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of cells
    #[inline]
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Check whether `cell` lies inside the range
    #[must_use]
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.column..=self.end.column).contains(&cell.column)
            && (self.start.row..=self.end.row).contains(&cell.row)
    }

    /// Sheet-qualified A1 form, as used in log lines
    #[must_use]
    pub fn qualified(&self, sheet: &str) -> String {
        format!("{sheet}!{self}")
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
