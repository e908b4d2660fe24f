//! Seeding the in-memory sheet from a snapshot

use rollcall_sheet::{CoordError, InMemoryStore, SheetSnapshot};

/// Seed errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Snapshot belongs to a different sheet than the configured one
    #[error("snapshot is for sheet {found:?} but the configuration uses {expected:?}")]
    WrongSheet {
        /// Sheet named in the snapshot
        found: String,
        /// Configured sheet
        expected: String,
    },

    /// Snapshot key is not an A1 reference
    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Load `snapshot` into `store` if it describes `sheet`
///
/// Returns the number of cells loaded.
///
/// # Errors
/// `SeedError::WrongSheet` when the sheet names differ, `SeedError::Coord`
/// for a malformed cell key
pub fn seed_store(store: &InMemoryStore, snapshot: &SheetSnapshot, sheet: &str) -> Result<usize, SeedError> {
    if snapshot.sheet != sheet {
        return Err(SeedError::WrongSheet {
            found: snapshot.sheet.clone(),
            expected: sheet.to_string(),
        });
    }
    store.load_snapshot(snapshot)?;
    Ok(snapshot.cells.len())
}
