//! Final attendance write

use crate::config::SheetLayout;
use crate::types::WriteReport;
use indexmap::IndexMap;
use rollcall_sheet::{CellRef, CellUpdate, CellValue, ColumnRef, StoreError, TabularStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Inputs of one write
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    /// Target column
    pub column: ColumnRef,
    /// Every identity the operator asked for
    pub pending: &'a [String],
    /// Identities with a row
    pub matched: &'a IndexMap<String, u32>,
    /// Write occupied cells too
    pub overwrite: bool,
    /// Identities to leave untouched when not overwriting
    pub skip: &'a [String],
}

/// Performs the batched write and reports what happened
pub struct WriteCoordinator {
    store: Arc<dyn TabularStore>,
    layout: SheetLayout,
    mark: CellValue,
}

impl WriteCoordinator {
    /// Create a coordinator writing `mark` into each row
    pub fn new(store: Arc<dyn TabularStore>, layout: SheetLayout, mark: CellValue) -> Self {
        Self { store, layout, mark }
    }

    /// Write the mark for every matched identity not skipped
    ///
    /// Issues at most one batch write and none when nothing is left to write.
    ///
    /// # Errors
    /// `StoreError` if the write fails; nothing is reported as written then
    pub async fn write(&self, request: WriteRequest<'_>) -> Result<WriteReport, StoreError> {
        let skip: HashSet<&str> = if request.overwrite {
            HashSet::new()
        } else {
            request.skip.iter().map(String::as_str).collect()
        };

        let mut report = WriteReport {
            column: request.column,
            updated: Vec::new(),
            skipped: Vec::new(),
            unmatched: Vec::new(),
        };
        let mut updates = Vec::with_capacity(request.matched.len());
        for (identity, row) in request.matched {
            if skip.contains(identity.as_str()) {
                report.skipped.push(identity.clone());
            } else {
                updates.push(CellUpdate::new(CellRef::new(request.column, *row), self.mark.clone()));
                report.updated.push(identity.clone());
            }
        }
        report.unmatched = request
            .pending
            .iter()
            .filter(|identity| !request.matched.contains_key(identity.as_str()))
            .cloned()
            .collect();

        if !updates.is_empty() {
            self.store.batch_write(&self.layout.sheet_name, &updates).await?;
        }
        tracing::info!(
            column = %request.column,
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            unmatched = report.unmatched.len(),
            "attendance written"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcall_sheet::InMemoryStore;

    fn setup() -> (Arc<InMemoryStore>, WriteCoordinator) {
        let store = Arc::new(InMemoryStore::new());
        let writer = WriteCoordinator::new(store.clone(), SheetLayout::default(), CellValue::number(0.0));
        (store, writer)
    }

    fn matched() -> IndexMap<String, u32> {
        [("@a".to_string(), 4), ("@b".to_string(), 5)].into_iter().collect()
    }

    #[tokio::test]
    async fn skip_list_is_honoured() {
        let (store, writer) = setup();
        let pending = vec!["@a".to_string(), "@b".to_string(), "@c".to_string()];
        let matched = matched();
        let skip = vec!["@b".to_string()];

        let report = writer
            .write(WriteRequest {
                column: "F".parse().unwrap(),
                pending: &pending,
                matched: &matched,
                overwrite: false,
                skip: &skip,
            })
            .await
            .unwrap();

        assert_eq!(report.updated, vec!["@a"]);
        assert_eq!(report.skipped, vec!["@b"]);
        assert_eq!(report.unmatched, vec!["@c"]);
        assert_eq!(store.write_batches().len(), 1);
        assert_eq!(store.get("Sheet1", "F4".parse().unwrap()), CellValue::number(0.0));
        assert!(store.get("Sheet1", "F5".parse().unwrap()).is_blank());
    }

    #[tokio::test]
    async fn overwrite_ignores_skip_list() {
        let (_, writer) = setup();
        let pending = vec!["@a".to_string(), "@b".to_string()];
        let matched = matched();
        let skip = vec!["@b".to_string()];

        let report = writer
            .write(WriteRequest {
                column: "F".parse().unwrap(),
                pending: &pending,
                matched: &matched,
                overwrite: true,
                skip: &skip,
            })
            .await
            .unwrap();

        assert_eq!(report.updated, vec!["@a", "@b"]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn nothing_left_means_no_write() {
        let (store, writer) = setup();
        store.fail_writes(true);
        let pending = vec!["@a".to_string(), "@b".to_string()];
        let matched = matched();

        let report = writer
            .write(WriteRequest {
                column: "F".parse().unwrap(),
                pending: &pending,
                matched: &matched,
                overwrite: false,
                skip: &pending,
            })
            .await
            .unwrap();

        assert!(report.updated.is_empty());
        assert_eq!(report.skipped.len(), 2);
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let (store, writer) = setup();
        store.fail_writes(true);
        let pending = vec!["@a".to_string()];
        let matched = matched();

        let result = writer
            .write(WriteRequest {
                column: "F".parse().unwrap(),
                pending: &pending,
                matched: &matched,
                overwrite: true,
                skip: &[],
            })
            .await;
        assert!(result.is_err());
    }
}
