//! Rollcall Core
//!
//! Conversation orchestration for recording attendance in a sheet.
//!
//! # Overview
//!
//! An operator (or a poll's voters) names who attended; the engine works out
//! which date column to fill, completes its header fields, matches the names
//! to sheet rows, and writes one batch, asking before it overwrites anything.
//!
//! # Components
//!
//! - [`ColumnResolver`]: finds, searches or allocates the target column
//! - [`MetadataCollector`]: label, cost and headcount header rows
//! - [`IdentityMatcher`]: free-text names to row numbers
//! - [`OverrideGuard`]: occupied target cells
//! - [`WriteCoordinator`]: the final batch write and its report
//! - [`ConversationEngine`]: the state machine sequencing all of the above
//! - [`BotRuntime`]: per-conversation workers over an inbound event stream
//!
//! # Example
//!
//! ```rust,ignore
//! use rollcall_core::prelude::*;
//!
//! let engine = ConversationEngine::new(
//!     EngineConfig::default(),
//!     Arc::new(InMemoryStore::new()),
//!     transport,
//!     PollRegistry::default(),
//! );
//! let reply = engine.handle_event(&InboundEvent::text("chat-1", "/start")).await;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod column;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod identity;
pub mod input;
pub mod messages;
pub mod metadata;
pub mod runtime;
pub mod session;
pub mod transport;
pub mod types;
pub mod writer;

// Re-exports
pub use column::ColumnResolver;
pub use config::{EngineConfig, PollTemplate, SheetLayout};
pub use engine::ConversationEngine;
pub use error::{EngineError, EngineResult, TransportError};
pub use guard::OverrideGuard;
pub use identity::{normalize_identity, IdentityMatcher};
pub use metadata::MetadataCollector;
pub use runtime::{BotRuntime, RuntimeStats};
pub use session::{ConversationSession, DialogState, SessionStore};
pub use transport::ChatTransport;
pub use types::{
    ColumnCandidate, ColumnMetadata, ColumnSearch, Conflict, ConversationId, InboundEvent, WriteReport,
};
pub use writer::{WriteCoordinator, WriteRequest};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::{
        BotRuntime, ChatTransport, ConversationEngine, ConversationId, DialogState, EngineConfig,
        EngineError, InboundEvent, TransportError,
    };
    pub use rollcall_poll::{PollId, PollRegistry, VoteChange};
    pub use rollcall_sheet::{InMemoryStore, TabularStore};
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
