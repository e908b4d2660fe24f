//! Header metadata of a target column

use crate::config::SheetLayout;
use crate::types::ColumnMetadata;
use rollcall_sheet::{CellRange, CellRef, CellUpdate, CellValue, ColumnRef, Grid, StoreError, TabularStore};
use std::sync::Arc;

/// Interpret the three header cells of one column
#[must_use]
pub fn interpret(label: &CellValue, cost: &CellValue, headcount: &CellValue) -> ColumnMetadata {
    let label = (!label.is_blank()).then(|| label.display_text().trim().to_string());
    let cost = cost.as_number().filter(|c| *c >= 0.0);
    let headcount = headcount
        .as_number()
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX))
        // range-checked above
        .map(|n| n as u32);
    ColumnMetadata { label, cost, headcount }
}

/// Reads and fills the label, cost and headcount rows
pub struct MetadataCollector {
    store: Arc<dyn TabularStore>,
    layout: SheetLayout,
}

impl MetadataCollector {
    /// Create a collector
    pub fn new(store: Arc<dyn TabularStore>, layout: SheetLayout) -> Self {
        Self { store, layout }
    }

    /// Read the header fields of `column` in a single range read
    ///
    /// # Errors
    /// `StoreError` if the read fails
    pub async fn read_metadata(&self, column: ColumnRef) -> Result<ColumnMetadata, StoreError> {
        let (top, bottom) = self.layout.header_rows();
        let range = CellRange::column_span(column, top, bottom);
        let grid = self.store.read_range(&self.layout.sheet_name, range).await?;

        let metadata = interpret(
            grid_cell(&grid, self.layout.label_row - top),
            grid_cell(&grid, self.layout.cost_row - top),
            grid_cell(&grid, self.layout.headcount_row - top),
        );
        tracing::debug!(column = %column, ?metadata, "metadata read");
        Ok(metadata)
    }

    /// Write the label cell
    ///
    /// # Errors
    /// `StoreError` if the write fails
    pub async fn write_label(&self, column: ColumnRef, label: &str) -> Result<(), StoreError> {
        self.write_one(column, self.layout.label_row, CellValue::text(label)).await
    }

    /// Write the cost cell
    ///
    /// # Errors
    /// `StoreError` if the write fails
    pub async fn write_cost(&self, column: ColumnRef, cost: f64) -> Result<(), StoreError> {
        self.write_one(column, self.layout.cost_row, CellValue::number(cost)).await
    }

    /// Write the headcount cell
    ///
    /// # Errors
    /// `StoreError` if the write fails
    pub async fn write_headcount(&self, column: ColumnRef, headcount: u32) -> Result<(), StoreError> {
        self.write_one(column, self.layout.headcount_row, CellValue::from(headcount))
            .await
    }

    async fn write_one(&self, column: ColumnRef, row: u32, value: CellValue) -> Result<(), StoreError> {
        let update = CellUpdate::new(CellRef::new(column, row), value);
        tracing::debug!(cell = %update.cell, value = %update.value, "header write");
        self.store
            .batch_write(&self.layout.sheet_name, std::slice::from_ref(&update))
            .await
    }
}

fn grid_cell(grid: &Grid, offset: u32) -> &CellValue {
    grid.get(offset as usize, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcall_sheet::InMemoryStore;

    #[test]
    fn blanks_and_garbage_are_absent() {
        let metadata = interpret(&CellValue::text("  "), &CellValue::text("free"), &CellValue::number(2.5));
        assert_eq!(metadata, ColumnMetadata::default());
    }

    #[test]
    fn numeric_text_is_parsed() {
        let metadata = interpret(
            &CellValue::text(" Sep 7 "),
            &CellValue::text("12,5"),
            &CellValue::text("14"),
        );
        assert_eq!(metadata.label.as_deref(), Some("Sep 7"));
        assert_eq!(metadata.cost, Some(12.5));
        assert_eq!(metadata.headcount, Some(14));
    }

    #[test]
    fn negative_cost_is_absent() {
        let metadata = interpret(&CellValue::Empty, &CellValue::number(-3.0), &CellValue::Empty);
        assert_eq!(metadata.cost, None);
    }

    #[tokio::test]
    async fn partial_writes_leave_other_fields() {
        let store = Arc::new(InMemoryStore::new());
        let collector = MetadataCollector::new(store.clone(), SheetLayout::default());
        let g: ColumnRef = "G".parse().unwrap();

        collector.write_label(g, "Sep 14").await.unwrap();
        let metadata = collector.read_metadata(g).await.unwrap();
        assert_eq!(metadata.label.as_deref(), Some("Sep 14"));
        assert_eq!(metadata.cost, None);
        assert_eq!(metadata.headcount, None);

        collector.write_cost(g, 50.0).await.unwrap();
        collector.write_headcount(g, 2).await.unwrap();
        let metadata = collector.read_metadata(g).await.unwrap();
        assert_eq!(metadata.cost, Some(50.0));
        assert_eq!(metadata.headcount, Some(2));
        assert_eq!(store.get("Sheet1", "G3".parse().unwrap()), CellValue::number(2.0));
        assert_eq!(store.write_batches().len(), 3);
    }

    #[tokio::test]
    async fn read_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_reads(true);
        let collector = MetadataCollector::new(store, SheetLayout::default());

        assert!(collector.read_metadata(ColumnRef::A).await.is_err());
    }
}
