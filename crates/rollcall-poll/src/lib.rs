//! Rollcall Polls
//!
//! Turns poll answers into identity lists.
//!
//! # Core Operations
//!
//! - **Issue**: a [`PollRecord`] is registered under the transport's [`PollId`]
//! - **Vote**: [`VoteAggregator::record`] re-derives the voter's placement
//! - **Query**: [`VoteAggregator::voters_for`] lists who picked an option
//!
//! # Example
//!
//! ```rust,ignore
//! use rollcall_poll::prelude::*;
//!
//! let registry = PollRegistry::default();
//! registry
//!     .register(PollId::new("p1"), PollRecord::new("Sunday?", vec!["Yes".into(), "No".into()])?)
//!     .await;
//!
//! let votes = VoteAggregator::new(registry);
//! votes.record(&VoteChange::new("p1", "@x", vec![0])).await;
//! assert!(votes.voters_for(&PollId::new("p1"), 0).await.contains("@x"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aggregator;
pub mod error;
pub mod record;
pub mod registry;

// Re-exports
pub use aggregator::{VoteAggregator, VoteChange, VoteOutcome};
pub use error::PollError;
pub use record::{PollId, PollRecord, Selection, MIN_OPTIONS};
pub use registry::{PollRegistry, RegistryStats, DEFAULT_CAPACITY};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for poll handling
    pub use crate::{PollError, PollId, PollRecord, PollRegistry, VoteAggregator, VoteChange, VoteOutcome};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
