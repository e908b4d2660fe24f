//! Target column resolution
//!
//! The label row is read once per operation over the configured scan
//! window. Detection walks it left to right and stops at the first blank
//! cell; label search looks at every non-blank header in the window.

use crate::config::SheetLayout;
use crate::types::{ColumnCandidate, ColumnSearch};
use rollcall_sheet::{CellRange, CellValue, ColumnRef, StoreError, TabularStore};
use std::sync::Arc;

/// Last occupied header before the first blank, given headers from `first`
#[must_use]
pub fn last_before_gap(headers: &[&CellValue], first: ColumnRef) -> Option<ColumnCandidate> {
    let occupied = headers.iter().take_while(|cell| !cell.is_blank()).count();
    let last = occupied.checked_sub(1)?;
    let offset = u32::try_from(last).ok()?;
    Some(ColumnCandidate::new(
        first.offset(offset),
        headers[last].display_text().trim(),
    ))
}

/// Match `query` against headers starting at `first`
///
/// Exact matches (trimmed, case-insensitive) take precedence; substring
/// matches are only considered when there is no exact one.
#[must_use]
pub fn search_headers(headers: &[&CellValue], first: ColumnRef, query: &str) -> ColumnSearch {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ColumnSearch::NotFound;
    }
    let labelled = labelled(headers, first);
    let exact = matching(&labelled, |label| label == needle);
    if exact.is_empty() {
        into_search(matching(&labelled, |label| label.contains(&needle)))
    } else {
        into_search(exact)
    }
}

/// Like [`search_headers`] but without substring matches
#[must_use]
pub fn search_headers_exact(headers: &[&CellValue], first: ColumnRef, query: &str) -> ColumnSearch {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ColumnSearch::NotFound;
    }
    into_search(matching(&labelled(headers, first), |label| label == needle))
}

fn labelled(headers: &[&CellValue], first: ColumnRef) -> Vec<ColumnCandidate> {
    (0u32..)
        .zip(headers)
        .filter(|(_, cell)| !cell.is_blank())
        .map(|(i, cell)| ColumnCandidate::new(first.offset(i), cell.display_text().trim()))
        .collect()
}

fn matching(labelled: &[ColumnCandidate], accept: impl Fn(&str) -> bool) -> Vec<ColumnCandidate> {
    labelled
        .iter()
        .filter(|candidate| accept(&candidate.label.to_lowercase()))
        .cloned()
        .collect()
}

fn into_search(mut candidates: Vec<ColumnCandidate>) -> ColumnSearch {
    match candidates.len() {
        0 => ColumnSearch::NotFound,
        1 => ColumnSearch::Found(candidates.remove(0)),
        _ => ColumnSearch::Ambiguous(candidates),
    }
}

/// Locates or allocates the column a cycle writes into
pub struct ColumnResolver {
    store: Arc<dyn TabularStore>,
    layout: SheetLayout,
}

impl ColumnResolver {
    /// Create a resolver
    pub fn new(store: Arc<dyn TabularStore>, layout: SheetLayout) -> Self {
        Self { store, layout }
    }

    /// Last occupied date column before the first gap
    ///
    /// # Errors
    /// `StoreError` if the header read fails
    pub async fn detect_last_column(&self) -> Result<Option<ColumnCandidate>, StoreError> {
        let headers = self.read_label_row().await?;
        let refs: Vec<&CellValue> = headers.iter().collect();
        let found = last_before_gap(&refs, self.layout.first_data_column);
        tracing::debug!(candidate = ?found, "last column detected");
        Ok(found)
    }

    /// Search the header labels for `text`
    ///
    /// # Errors
    /// `StoreError` if the header read fails
    pub async fn search_by_label_text(&self, text: &str) -> Result<ColumnSearch, StoreError> {
        let headers = self.read_label_row().await?;
        let refs: Vec<&CellValue> = headers.iter().collect();
        Ok(search_headers(&refs, self.layout.first_data_column, text))
    }

    /// Search the header labels for exactly `text`
    ///
    /// # Errors
    /// `StoreError` if the header read fails
    pub async fn search_exact_label(&self, text: &str) -> Result<ColumnSearch, StoreError> {
        let headers = self.read_label_row().await?;
        let refs: Vec<&CellValue> = headers.iter().collect();
        Ok(search_headers_exact(&refs, self.layout.first_data_column, text))
    }

    /// Whether `column` lies inside the scanned date columns
    #[must_use]
    pub fn in_scan_window(&self, column: ColumnRef) -> bool {
        column
            .distance_from(self.layout.first_data_column)
            .is_some_and(|distance| distance < self.layout.header_scan_width)
    }

    /// Last column of the scanned date columns
    #[must_use]
    pub fn last_scanned_column(&self) -> ColumnRef {
        self.layout
            .first_data_column
            .offset(self.layout.header_scan_width.saturating_sub(1))
    }

    /// Column after `current`
    #[inline]
    #[must_use]
    pub fn next_column(&self, current: ColumnRef) -> ColumnRef {
        current.next()
    }

    /// Column used when the sheet has no date columns yet
    #[inline]
    #[must_use]
    pub fn allocate_first_column(&self) -> ColumnRef {
        self.layout.first_data_column
    }

    async fn read_label_row(&self) -> Result<Vec<CellValue>, StoreError> {
        let range = CellRange::row_span(
            self.layout.label_row,
            self.layout.first_data_column,
            self.layout.header_scan_width,
        );
        let grid = self.store.read_range(&self.layout.sheet_name, range).await?;
        Ok(grid
            .first_row(range.width() as usize)
            .into_iter()
            .cloned()
            .collect())
    }
}
