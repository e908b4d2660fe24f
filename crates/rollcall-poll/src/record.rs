//! Poll records
//!
//! A [`PollRecord`] keeps one voter set per option. A voter sits in at most
//! one set: every selection first removes the voter everywhere, then places
//! them again.

use crate::error::PollError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Minimum number of options in a poll
pub const MIN_OPTIONS: usize = 2;

/// Transport-assigned poll identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(String);

impl PollId {
    /// Wrap a transport id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PollId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PollId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What happened to one selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Option the voter now holds, if any
    pub option: Option<usize>,
    /// Indices that were dropped: out of range, or beyond the first valid one
    pub ignored: Vec<usize>,
}

/// One issued poll and its current ballot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRecord {
    question: String,
    options: Vec<String>,
    ballot: Vec<BTreeSet<String>>,
}

impl PollRecord {
    /// Create a poll with an empty ballot
    ///
    /// # Errors
    /// Blank question, blank option, or fewer than [`MIN_OPTIONS`] options
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Result<Self, PollError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(PollError::EmptyQuestion);
        }
        if options.len() < MIN_OPTIONS {
            return Err(PollError::TooFewOptions {
                given: options.len(),
                min: MIN_OPTIONS,
            });
        }
        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
        if let Some(idx) = options.iter().position(String::is_empty) {
            return Err(PollError::EmptyOption(idx));
        }

        let ballot = vec![BTreeSet::new(); options.len()];
        Ok(Self {
            question,
            options,
            ballot,
        })
    }

    /// Question text
    #[inline]
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Option labels, index-addressed
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Replace `voter`'s selection with `selected`
    ///
    /// The voter is removed from every option, then added to the first
    /// in-range index of `selected`. An empty selection is a retraction.
    pub fn apply_selection(&mut self, voter: &str, selected: &[usize]) -> Selection {
        for members in &mut self.ballot {
            members.remove(voter);
        }

        let mut outcome = Selection::default();
        for &idx in selected {
            match self.ballot.get_mut(idx) {
                Some(members) if outcome.option.is_none() => {
                    members.insert(voter.to_string());
                    outcome.option = Some(idx);
                }
                _ => outcome.ignored.push(idx),
            }
        }
        outcome
    }

    /// Voters currently holding `option`
    #[must_use]
    pub fn voters_for(&self, option: usize) -> Option<&BTreeSet<String>> {
        self.ballot.get(option)
    }

    /// Option currently held by `voter`
    #[must_use]
    pub fn option_of(&self, voter: &str) -> Option<usize> {
        self.ballot.iter().position(|members| members.contains(voter))
    }

    /// `(index, label, voters)` for every option, in order
    pub fn tallies(&self) -> impl Iterator<Item = (usize, &str, &BTreeSet<String>)> {
        self.options
            .iter()
            .zip(&self.ballot)
            .enumerate()
            .map(|(idx, (label, members))| (idx, label.as_str(), members))
    }

    /// Total voters across all options
    #[must_use]
    pub fn voter_count(&self) -> usize {
        self.ballot.iter().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn yes_no() -> PollRecord {
        PollRecord::new("Who is coming?", vec!["Yes".into(), "No".into()]).unwrap()
    }

    #[test]
    fn new_validates_input() {
        assert_eq!(
            PollRecord::new("  ", vec!["a".into(), "b".into()]),
            Err(PollError::EmptyQuestion)
        );
        assert_eq!(
            PollRecord::new("q", vec!["a".into()]),
            Err(PollError::TooFewOptions { given: 1, min: 2 })
        );
        assert_eq!(
            PollRecord::new("q", vec!["a".into(), " ".into()]),
            Err(PollError::EmptyOption(1))
        );
    }

    #[test]
    fn revote_moves_voter() {
        let mut poll = yes_no();
        poll.apply_selection("@x", &[0]);
        poll.apply_selection("@x", &[1]);

        assert!(!poll.voters_for(0).unwrap().contains("@x"));
        assert!(poll.voters_for(1).unwrap().contains("@x"));
        assert_eq!(poll.option_of("@x"), Some(1));
    }

    #[test]
    fn empty_selection_retracts() {
        let mut poll = yes_no();
        poll.apply_selection("@x", &[0]);
        let outcome = poll.apply_selection("@x", &[]);

        assert_eq!(outcome, Selection::default());
        assert_eq!(poll.voter_count(), 0);
    }

    #[test]
    fn out_of_range_indices_ignored() {
        let mut poll = yes_no();
        let outcome = poll.apply_selection("@x", &[7, 1, 0]);

        assert_eq!(outcome.option, Some(1));
        assert_eq!(outcome.ignored, vec![7, 0]);
        assert_eq!(poll.option_of("@x"), Some(1));
    }

    #[test]
    fn tallies_follow_option_order() {
        let mut poll = yes_no();
        poll.apply_selection("@b", &[0]);
        poll.apply_selection("@a", &[0]);

        let tallies: Vec<_> = poll.tallies().map(|(i, label, m)| (i, label, m.len())).collect();
        assert_eq!(tallies, vec![(0, "Yes", 2), (1, "No", 0)]);
    }

    fn events() -> impl Strategy<Value = Vec<(u8, Vec<usize>)>> {
        prop::collection::vec((0u8..5, prop::collection::vec(0usize..4, 0..3)), 0..40)
    }

    proptest! {
        #[test]
        fn prop_voter_in_at_most_one_option(events in events()) {
            let mut poll = PollRecord::new("q", vec!["a".into(), "b".into(), "c".into()]).unwrap();
            for (voter, selected) in &events {
                poll.apply_selection(&format!("@v{voter}"), selected);
            }
            for voter in 0u8..5 {
                let name = format!("@v{voter}");
                let holding = poll.tallies().filter(|(_, _, m)| m.contains(&name)).count();
                prop_assert!(holding <= 1);
            }
        }

        #[test]
        fn prop_replaying_event_is_idempotent(events in events()) {
            let mut once = PollRecord::new("q", vec!["a".into(), "b".into(), "c".into()]).unwrap();
            let mut twice = once.clone();
            for (voter, selected) in &events {
                let name = format!("@v{voter}");
                once.apply_selection(&name, selected);
                twice.apply_selection(&name, selected);
                twice.apply_selection(&name, selected);
            }
            prop_assert_eq!(once, twice);
        }
    }
}
