//! Error types for the sheet model
//!
//! - [`StoreError`]: a backing-store call failed
//! - [`CoordError`]: a column letter or A1 reference did not parse
//! - [`SnapshotError`]: a sheet snapshot could not be read or written

/// Tabular store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the call
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The requested range cannot be served
    #[error("invalid range {range}: {reason}")]
    InvalidRange {
        /// Range in A1 notation
        range: String,
        /// Why it was rejected
        reason: String,
    },
}

impl StoreError {
    /// Create an unavailable error
    #[inline]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Check if the call could succeed when repeated later
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Coordinate parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    /// Empty input
    #[error("empty coordinate")]
    Empty,

    /// Column contains something other than ASCII letters
    #[error("invalid column letters: {0:?}")]
    InvalidColumn(String),

    /// Column index zero has no letter form
    #[error("column index must be at least 1")]
    ZeroColumn,

    /// Column letters exceed the addressable range
    #[error("column out of range: {0:?}")]
    ColumnOverflow(String),

    /// Cell reference is not `<letters><row>`
    #[error("invalid cell reference: {0:?}")]
    InvalidCell(String),

    /// Rows are 1-indexed
    #[error("row must be at least 1 in {0:?}")]
    ZeroRow(String),
}

/// Snapshot load/save errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem failure
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("snapshot format: {0}")]
    Json(#[from] serde_json::Error),

    /// A cell key is not a valid A1 reference
    #[error("snapshot cell: {0}")]
    Coord(#[from] CoordError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::unavailable("quota exceeded");
        assert!(err.to_string().contains("store unavailable"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn store_error_is_retryable() {
        assert!(StoreError::unavailable("down").is_retryable());
        assert!(!StoreError::InvalidRange {
            range: "A1:B2".to_string(),
            reason: "too large".to_string(),
        }
        .is_retryable());
    }
}
