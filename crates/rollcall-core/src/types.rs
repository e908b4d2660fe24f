//! Core value types shared by the components and the engine

use rollcall_poll::{PollId, VoteChange};
use rollcall_sheet::{CellValue, ColumnRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one operator conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create an id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Event delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Operator message
    Text {
        /// Conversation
        conversation: ConversationId,
        /// Message text
        text: String,
    },
    /// A voter changed their selection on a poll
    PollVoteChanged {
        /// Conversation the poll was posted in
        conversation: ConversationId,
        /// Voter's full current selection
        change: VoteChange,
    },
    /// Operator forwarded a poll into the conversation
    ForwardedPoll {
        /// Conversation
        conversation: ConversationId,
        /// Forwarded poll
        poll: PollId,
    },
}

impl InboundEvent {
    /// Text message
    pub fn text(conversation: impl Into<ConversationId>, text: impl Into<String>) -> Self {
        Self::Text {
            conversation: conversation.into(),
            text: text.into(),
        }
    }

    /// Vote change
    pub fn vote(conversation: impl Into<ConversationId>, change: VoteChange) -> Self {
        Self::PollVoteChanged {
            conversation: conversation.into(),
            change,
        }
    }

    /// Forwarded poll
    pub fn forwarded(conversation: impl Into<ConversationId>, poll: impl Into<PollId>) -> Self {
        Self::ForwardedPoll {
            conversation: conversation.into(),
            poll: poll.into(),
        }
    }

    /// Conversation the event belongs to
    #[must_use]
    pub fn conversation(&self) -> &ConversationId {
        match self {
            Self::Text { conversation, .. }
            | Self::PollVoteChanged { conversation, .. }
            | Self::ForwardedPoll { conversation, .. } => conversation,
        }
    }
}

/// A header column and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCandidate {
    /// Column
    pub column: ColumnRef,
    /// Label-row text
    pub label: String,
}

impl ColumnCandidate {
    /// Create a candidate
    pub fn new(column: ColumnRef, label: impl Into<String>) -> Self {
        Self {
            column,
            label: label.into(),
        }
    }
}

/// Result of a label search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSearch {
    /// No header matched
    NotFound,
    /// Exactly one header matched
    Found(ColumnCandidate),
    /// Several headers matched, in column order
    Ambiguous(Vec<ColumnCandidate>),
}

/// Header fields of one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Label (date)
    pub label: Option<String>,
    /// Cost
    pub cost: Option<f64>,
    /// Headcount
    pub headcount: Option<u32>,
}

/// A matched row whose target cell is already occupied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Identity as the operator typed it
    pub identity: String,
    /// Value currently in the cell
    pub existing_value: CellValue,
}

/// Outcome of the final write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
    /// Column written
    pub column: ColumnRef,
    /// Identities whose cell was written
    pub updated: Vec<String>,
    /// Identities left untouched because their cell was occupied
    pub skipped: Vec<String>,
    /// Identities with no row in the sheet
    pub unmatched: Vec<String>,
}
