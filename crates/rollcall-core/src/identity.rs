//! Identity matching against the sheet's identity column

use crate::config::SheetLayout;
use indexmap::IndexMap;
use rollcall_sheet::{CellRange, CellValue, StoreError, TabularStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical form of an identity: markers stripped, trimmed, lowercased
#[must_use]
pub fn normalize_identity(raw: &str, markers: &[char]) -> String {
    raw.trim()
        .trim_start_matches(|c| markers.contains(&c))
        .trim()
        .to_lowercase()
}

/// Pair identities with rows given the identity column's cells
///
/// `cells[0]` sits on `first_row`. The result keeps the input order and
/// omits identities without a row. Later sheet duplicates never shadow the
/// first row holding an identity.
#[must_use]
pub fn match_against(
    identities: &[String],
    cells: &[&CellValue],
    first_row: u32,
    markers: &[char],
) -> IndexMap<String, u32> {
    let mut rows: HashMap<String, u32> = HashMap::new();
    for (row, cell) in (first_row..).zip(cells) {
        let key = normalize_identity(&cell.display_text(), markers);
        if !key.is_empty() {
            rows.entry(key).or_insert(row);
        }
    }

    identities
        .iter()
        .filter_map(|identity| {
            let row = rows.get(&normalize_identity(identity, markers))?;
            Some((identity.clone(), *row))
        })
        .collect()
}

/// Maps free-text identities to sheet rows
pub struct IdentityMatcher {
    store: Arc<dyn TabularStore>,
    layout: SheetLayout,
    markers: Vec<char>,
}

impl IdentityMatcher {
    /// Create a matcher
    pub fn new(store: Arc<dyn TabularStore>, layout: SheetLayout, markers: Vec<char>) -> Self {
        Self { store, layout, markers }
    }

    /// Read the identity column and match `identities` against it
    ///
    /// # Errors
    /// `StoreError` if the read fails
    pub async fn match_identities(
        &self,
        identities: &[String],
    ) -> Result<IndexMap<String, u32>, StoreError> {
        let range = CellRange::column_span(
            self.layout.identity_column,
            self.layout.first_data_row,
            self.layout.last_data_row,
        );
        let grid = self.store.read_range(&self.layout.sheet_name, range).await?;
        let cells = grid.first_column(range.height() as usize);

        let matched = match_against(identities, &cells, self.layout.first_data_row, &self.markers);
        tracing::debug!(requested = identities.len(), matched = matched.len(), "identities matched");
        Ok(matched)
    }
}
