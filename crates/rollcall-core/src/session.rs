//! Conversation sessions
//!
//! One [`ConversationSession`] per conversation, kept in a [`SessionStore`].
//! Each session sits behind its own async mutex: holding the guard for the
//! whole of one event serializes that conversation while leaving every
//! other conversation free to proceed.

use crate::types::{ColumnCandidate, ConversationId};
use dashmap::DashMap;
use indexmap::IndexMap;
use rollcall_poll::PollId;
use rollcall_sheet::{CellValue, ColumnRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dialog state of a conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    /// Nothing in progress
    #[default]
    Idle,
    /// A forwarded poll is loaded; view or update?
    AwaitingPollIntent,
    /// Which poll option holds the attendees?
    AwaitingPollOptionSelection,
    /// Use the detected column?
    AwaitingColumnConfirmation,
    /// Create a new column?
    AwaitingNewColumnChoice,
    /// Pick one of several matching columns
    AwaitingColumnSelection,
    /// Label for the column
    AwaitingDateName,
    /// Cost for the column
    AwaitingCost,
    /// Identities to mark
    AwaitingUsernames,
    /// Accept the matched count as headcount?
    AwaitingPlayerCountConfirmation,
    /// Headcount typed by the operator
    AwaitingPlayerCount,
    /// Overwrite occupied cells?
    AwaitingOverrideConfirmation,
}

impl DialogState {
    /// Wire name of the state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingPollIntent => "awaiting_poll_intent",
            Self::AwaitingPollOptionSelection => "awaiting_poll_option_selection",
            Self::AwaitingColumnConfirmation => "awaiting_column_confirmation",
            Self::AwaitingNewColumnChoice => "awaiting_new_column_choice",
            Self::AwaitingColumnSelection => "awaiting_column_selection",
            Self::AwaitingDateName => "awaiting_date_name",
            Self::AwaitingCost => "awaiting_cost",
            Self::AwaitingUsernames => "awaiting_usernames",
            Self::AwaitingPlayerCountConfirmation => "awaiting_player_count_confirmation",
            Self::AwaitingPlayerCount => "awaiting_player_count",
            Self::AwaitingOverrideConfirmation => "awaiting_override_confirmation",
        }
    }

    /// Check if nothing is in progress
    #[inline]
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything collected during one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Current state
    pub state: DialogState,
    /// Identities to mark, as typed or as voted
    pub pending_identities: Vec<String>,
    /// Column being filled
    pub target_column: Option<ColumnRef>,
    /// Whether the column was created in this cycle
    pub is_new_column: bool,
    /// Label, once known
    pub column_label: Option<String>,
    /// Cost, once known
    pub column_cost: Option<f64>,
    /// Headcount, once known
    pub column_headcount: Option<u32>,
    /// Identity to row, in input order
    pub matched_rows: IndexMap<String, u32>,
    /// Identity to occupied cell content
    pub existing_values: IndexMap<String, CellValue>,
    /// Columns offered for disambiguation
    pub candidate_columns: Vec<ColumnCandidate>,
    /// Poll the cycle was started from
    pub active_poll: Option<PollId>,
}

impl ConversationSession {
    /// Return to idle, clearing every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move to `next`, logging the transition
    pub(crate) fn transition(&mut self, next: DialogState) {
        tracing::debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    /// Check the invariant that conflicts only name matched identities
    #[must_use]
    pub fn conflicts_are_matched(&self) -> bool {
        self.existing_values
            .keys()
            .all(|identity| self.matched_rows.contains_key(identity))
    }
}

/// Sessions keyed by conversation, created lazily
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<ConversationId, Arc<Mutex<ConversationSession>>>,
}

impl SessionStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the session of `conversation`, creating it if absent
    #[must_use]
    pub fn handle(&self, conversation: &ConversationId) -> Arc<Mutex<ConversationSession>> {
        if let Some(existing) = self.sessions.get(conversation) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.sessions
                .entry(conversation.clone())
                .or_default()
                .value(),
        )
    }

    /// Copy of the session of `conversation`, if one exists
    pub async fn snapshot(&self, conversation: &ConversationId) -> Option<ConversationSession> {
        let handle = self.sessions.get(conversation).map(|entry| Arc::clone(entry.value()))?;
        let guard = handle.lock().await;
        Some(guard.clone())
    }

    /// Number of sessions created so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
