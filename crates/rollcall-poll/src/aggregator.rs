//! Vote aggregation
//!
//! Chat platforms report a voter's complete current selection on every
//! change, never a delta. [`VoteAggregator::record`] therefore replaces the
//! voter's previous placement instead of adding to it.

use crate::record::PollId;
use crate::registry::PollRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A voter's full current selection on one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteChange {
    /// Poll voted on
    pub poll: PollId,
    /// Voter handle as reported by the transport
    pub voter: String,
    /// Zero-based option indices, empty for a retraction
    pub selected: Vec<usize>,
}

impl VoteChange {
    /// Create a vote change
    pub fn new(poll: impl Into<PollId>, voter: impl Into<String>, selected: Vec<usize>) -> Self {
        Self {
            poll: poll.into(),
            voter: voter.into(),
            selected,
        }
    }
}

/// Result of recording a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The poll is not tracked; nothing changed
    Untracked,
    /// The voter now holds `option` (`None` after a retraction)
    Recorded {
        /// Option held after the change
        option: Option<usize>,
    },
}

/// Applies vote changes to the shared [`PollRegistry`]
#[derive(Debug, Clone)]
pub struct VoteAggregator {
    registry: PollRegistry,
}

impl VoteAggregator {
    /// Create aggregator over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: PollRegistry) -> Self {
        Self { registry }
    }

    /// Shared registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    /// Record one vote change
    pub async fn record(&self, change: &VoteChange) -> VoteOutcome {
        let Some(selection) = self
            .registry
            .apply_selection(&change.poll, &change.voter, &change.selected)
            .await
        else {
            tracing::debug!(poll = %change.poll, voter = %change.voter, "vote for untracked poll ignored");
            return VoteOutcome::Untracked;
        };

        if !selection.ignored.is_empty() {
            tracing::warn!(
                poll = %change.poll,
                voter = %change.voter,
                ignored = ?selection.ignored,
                "vote indices dropped"
            );
        }
        tracing::debug!(poll = %change.poll, voter = %change.voter, option = ?selection.option, "vote recorded");

        VoteOutcome::Recorded {
            option: selection.option,
        }
    }

    /// Voters currently holding `option`; empty for unknown polls or options
    pub async fn voters_for(&self, poll: &PollId, option: usize) -> BTreeSet<String> {
        self.registry
            .snapshot(poll)
            .await
            .and_then(|record| record.voters_for(option).cloned())
            .unwrap_or_default()
    }
}
