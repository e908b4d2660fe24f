//! In-process tabular store
//!
//! Behaves like a hosted spreadsheet API where it matters to callers:
//! trailing blank cells and rows are dropped from read results, and every
//! batch write is applied as a unit.

use crate::coord::{CellRange, CellRef};
use crate::error::{CoordError, StoreError};
use crate::snapshot::SheetSnapshot;
use crate::store::{CellUpdate, TabularStore};
use crate::value::{CellValue, Grid};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

/// Largest range a single read may cover
pub const MAX_READ_CELLS: u64 = 1_000_000;

type Cells = BTreeMap<CellRef, CellValue>;

/// Map-backed [`TabularStore`] with failure injection
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sheets: RwLock<HashMap<String, Cells>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    batches: Mutex<Vec<Vec<CellUpdate>>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding one snapshot
    ///
    /// # Errors
    /// `CoordError` if a snapshot key is not an A1 reference
    pub fn from_snapshot(snapshot: &SheetSnapshot) -> Result<Self, CoordError> {
        let store = Self::new();
        store.load_snapshot(snapshot)?;
        Ok(store)
    }

    /// Merge a snapshot into the store
    ///
    /// # Errors
    /// `CoordError` if a snapshot key is not an A1 reference
    pub fn load_snapshot(&self, snapshot: &SheetSnapshot) -> Result<(), CoordError> {
        let parsed = snapshot
            .cells
            .iter()
            .map(|(key, value)| Ok((key.parse::<CellRef>()?, value.clone())))
            .collect::<Result<Vec<_>, CoordError>>()?;

        let mut sheets = self.sheets.write();
        let cells = sheets.entry(snapshot.sheet.clone()).or_default();
        for (cell, value) in parsed {
            if value.is_blank() {
                cells.remove(&cell);
            } else {
                cells.insert(cell, value);
            }
        }
        Ok(())
    }

    /// Current contents of `sheet`
    #[must_use]
    pub fn snapshot(&self, sheet: &str) -> SheetSnapshot {
        let sheets = self.sheets.read();
        let cells = sheets
            .get(sheet)
            .map(|cells| {
                cells
                    .iter()
                    .map(|(cell, value)| (cell.to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        SheetSnapshot {
            sheet: sheet.to_string(),
            cells,
        }
    }

    /// Set one cell directly
    pub fn set(&self, sheet: &str, cell: CellRef, value: impl Into<CellValue>) {
        let value = value.into();
        let mut sheets = self.sheets.write();
        let cells = sheets.entry(sheet.to_string()).or_default();
        if value.is_blank() {
            cells.remove(&cell);
        } else {
            cells.insert(cell, value);
        }
    }

    /// Set one cell by A1 reference
    ///
    /// # Errors
    /// `CoordError` if `a1` does not parse
    pub fn set_a1(&self, sheet: &str, a1: &str, value: impl Into<CellValue>) -> Result<(), CoordError> {
        let cell = a1.parse::<CellRef>()?;
        self.set(sheet, cell, value);
        Ok(())
    }

    /// Read one cell directly
    #[must_use]
    pub fn get(&self, sheet: &str, cell: CellRef) -> CellValue {
        self.sheets
            .read()
            .get(sheet)
            .and_then(|cells| cells.get(&cell).cloned())
            .unwrap_or_default()
    }

    /// Make subsequent reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every successful batch write so far, oldest first
    #[must_use]
    pub fn write_batches(&self) -> Vec<Vec<CellUpdate>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl TabularStore for InMemoryStore {
    async fn read_range(&self, sheet: &str, range: CellRange) -> Result<Grid, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!(
                "read of {} refused",
                range.qualified(sheet)
            )));
        }
        if range.area() > MAX_READ_CELLS {
            return Err(StoreError::InvalidRange {
                range: range.qualified(sheet),
                reason: format!("more than {MAX_READ_CELLS} cells"),
            });
        }

        let sheets = self.sheets.read();
        let Some(cells) = sheets.get(sheet) else {
            return Ok(Grid::default());
        };

        let start = range.start();
        let mut rows: Vec<Vec<CellValue>> = (0..range.height())
            .map(|r| {
                let mut row: Vec<CellValue> = (0..range.width())
                    .map(|c| {
                        let cell = CellRef::new(start.column.offset(c), start.row + r);
                        cells.get(&cell).cloned().unwrap_or_default()
                    })
                    .collect();
                while row.last().is_some_and(CellValue::is_blank) {
                    row.pop();
                }
                row
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        tracing::trace!(range = %range.qualified(sheet), rows = rows.len(), "range read");
        Ok(Grid::new(rows))
    }

    async fn batch_write(&self, sheet: &str, updates: &[CellUpdate]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!(
                "write of {} cells to {sheet} refused",
                updates.len()
            )));
        }

        {
            let mut sheets = self.sheets.write();
            let cells = sheets.entry(sheet.to_string()).or_default();
            for update in updates {
                if update.value.is_blank() {
                    cells.remove(&update.cell);
                } else {
                    cells.insert(update.cell, update.value.clone());
                }
            }
        }
        self.batches.lock().push(updates.to_vec());

        tracing::trace!(sheet, cells = updates.len(), "batch write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ColumnRef;

    fn cell(a1: &str) -> CellRef {
        a1.parse().unwrap()
    }

    #[tokio::test]
    async fn read_trims_trailing_blanks() {
        let store = InMemoryStore::new();
        store.set("S", cell("F1"), "Sep 7");
        store.set("S", cell("G1"), "Sep 14");

        let range = CellRange::row_span(1, "F".parse::<ColumnRef>().unwrap(), 10);
        let grid = store.read_range("S", range).await.unwrap();

        assert_eq!(grid.height(), 1);
        assert_eq!(grid.get(0, 1), &CellValue::text("Sep 14"));
        assert!(grid.get(0, 2).is_blank());
    }

    #[tokio::test]
    async fn read_unknown_sheet_is_empty() {
        let store = InMemoryStore::new();
        let grid = store
            .read_range("nope", CellRange::cell(cell("A1")))
            .await
            .unwrap();
        assert!(grid.is_empty());
    }

    #[tokio::test]
    async fn batch_write_applies_and_records() {
        let store = InMemoryStore::new();
        let updates = vec![
            CellUpdate::new(cell("F4"), 0.0),
            CellUpdate::new(cell("F5"), 0.0),
        ];
        store.batch_write("S", &updates).await.unwrap();

        assert_eq!(store.get("S", cell("F5")), CellValue::number(0.0));
        assert_eq!(store.write_batches(), vec![updates]);
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = InMemoryStore::new();
        store.fail_reads(true);
        let err = store
            .read_range("S", CellRange::cell(cell("A1")))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        store.fail_writes(true);
        assert!(store.batch_write("S", &[]).await.is_err());
        assert!(store.write_batches().is_empty());
    }

    #[tokio::test]
    async fn oversized_read_rejected() {
        let store = InMemoryStore::new();
        let range = CellRange::new(cell("A1"), cell("ZZ100000"));
        assert!(matches!(
            store.read_range("S", range).await,
            Err(StoreError::InvalidRange { .. })
        ));
    }
}
