//! Tabular store seam
//!
//! The conversation core only ever reads rectangular ranges and writes
//! batches of single cells. Remote spreadsheet clients implement
//! [`TabularStore`]; [`crate::InMemoryStore`] is the in-process version.

use crate::coord::{CellRange, CellRef};
use crate::error::StoreError;
use crate::value::{CellValue, Grid};
use async_trait::async_trait;

/// One cell assignment in a batch write
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    /// Target cell
    pub cell: CellRef,
    /// New content
    pub value: CellValue,
}

impl CellUpdate {
    /// Create an update
    #[inline]
    pub fn new(cell: CellRef, value: impl Into<CellValue>) -> Self {
        Self {
            cell,
            value: value.into(),
        }
    }
}

/// Range-oriented spreadsheet access
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Read a rectangular range of `sheet`
    ///
    /// # Errors
    /// `StoreError::Unavailable` when the backing call fails
    async fn read_range(&self, sheet: &str, range: CellRange) -> Result<Grid, StoreError>;

    /// Write every update in one call
    ///
    /// # Errors
    /// `StoreError::Unavailable` when the backing call fails
    async fn batch_write(&self, sheet: &str, updates: &[CellUpdate]) -> Result<(), StoreError>;
}
