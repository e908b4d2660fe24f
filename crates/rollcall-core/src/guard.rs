//! Overwrite protection
//!
//! Before any attendance write, the target cells of every matched row are
//! read back. A cell is occupied when its trimmed display text is
//! non-empty, which treats empty, blank and whitespace-only cells alike.

use crate::config::SheetLayout;
use crate::types::Conflict;
use indexmap::IndexMap;
use rollcall_sheet::{CellRange, ColumnRef, StoreError, TabularStore};
use std::sync::Arc;

/// Finds matched rows whose target cell already holds a value
pub struct OverrideGuard {
    store: Arc<dyn TabularStore>,
    layout: SheetLayout,
}

impl OverrideGuard {
    /// Create a guard
    pub fn new(store: Arc<dyn TabularStore>, layout: SheetLayout) -> Self {
        Self { store, layout }
    }

    /// Occupied target cells, in `matched_rows` order
    ///
    /// An empty map returns no conflicts without reading the store.
    ///
    /// # Errors
    /// `StoreError` if the read fails
    pub async fn find_conflicts(
        &self,
        matched_rows: &IndexMap<String, u32>,
        column: ColumnRef,
    ) -> Result<Vec<Conflict>, StoreError> {
        let (Some(top), Some(bottom)) = (
            matched_rows.values().copied().min(),
            matched_rows.values().copied().max(),
        ) else {
            return Ok(Vec::new());
        };

        let range = CellRange::column_span(column, top, bottom);
        let grid = self.store.read_range(&self.layout.sheet_name, range).await?;

        let conflicts: Vec<Conflict> = matched_rows
            .iter()
            .filter_map(|(identity, row)| {
                let value = grid.get((row - top) as usize, 0);
                (!value.display_text().trim().is_empty()).then(|| Conflict {
                    identity: identity.clone(),
                    existing_value: value.clone(),
                })
            })
            .collect();

        if !conflicts.is_empty() {
            tracing::info!(column = %column, conflicts = conflicts.len(), "occupied cells found");
        }
        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcall_sheet::{CellValue, InMemoryStore};

    fn rows(pairs: &[(&str, u32)]) -> IndexMap<String, u32> {
        pairs.iter().map(|(i, r)| ((*i).to_string(), *r)).collect()
    }

    #[tokio::test]
    async fn empty_input_skips_store() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_reads(true);
        let guard = OverrideGuard::new(store, SheetLayout::default());

        let conflicts = guard.find_conflicts(&IndexMap::new(), ColumnRef::A).await.unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn whitespace_is_not_a_conflict() {
        let store = Arc::new(InMemoryStore::new());
        store.set_a1("Sheet1", "F4", "   ").unwrap();
        store.set_a1("Sheet1", "F6", 0.0).unwrap();
        store.set_a1("Sheet1", "F9", "x").unwrap();
        let guard = OverrideGuard::new(store, SheetLayout::default());

        let conflicts = guard
            .find_conflicts(&rows(&[("@c", 9), ("@a", 4), ("@b", 6), ("@d", 5)]), "F".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(
            conflicts,
            vec![
                Conflict {
                    identity: "@c".into(),
                    existing_value: CellValue::text("x"),
                },
                Conflict {
                    identity: "@b".into(),
                    existing_value: CellValue::number(0.0),
                },
            ]
        );
    }

    #[tokio::test]
    async fn read_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_reads(true);
        let guard = OverrideGuard::new(store, SheetLayout::default());

        assert!(guard
            .find_conflicts(&rows(&[("@a", 4)]), ColumnRef::A)
            .await
            .is_err());
    }
}
