//! Rollcall Sheet Model
//!
//! The spreadsheet side of Rollcall: coordinates, cell values and the
//! [`TabularStore`] seam the conversation core talks through.
//!
//! # Overview
//!
//! - **ColumnRef / CellRef / CellRange**: base-26 column letters, 1-indexed rows
//! - **CellValue / Grid**: scalar cells and (possibly ragged) read results
//! - **TabularStore**: `read_range` + `batch_write`
//! - **InMemoryStore**: map-backed store with failure injection
//! - **SheetSnapshot**: JSON import/export of one sheet
//!
//! # Example
//!
//! ```rust
//! use rollcall_sheet::ColumnRef;
//!
//! let z: ColumnRef = "Z".parse().unwrap();
//! assert_eq!(z.next().to_string(), "AA");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod coord;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-exports
pub use coord::{CellRange, CellRef, ColumnRef};
pub use error::{CoordError, SnapshotError, StoreError};
pub use memory::InMemoryStore;
pub use snapshot::SheetSnapshot;
pub use store::{CellUpdate, TabularStore};
pub use value::{CellValue, Grid};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for sheet access
    pub use crate::{
        CellRange, CellRef, CellUpdate, CellValue, ColumnRef, Grid, InMemoryStore, StoreError,
        TabularStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
