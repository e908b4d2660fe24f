//! Error types for polls

/// Poll construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// Question is blank
    #[error("poll question is empty")]
    EmptyQuestion,

    /// Fewer than two options
    #[error("a poll needs at least {min} options, got {given}")]
    TooFewOptions {
        /// Options supplied
        given: usize,
        /// Required minimum
        min: usize,
    },

    /// An option label is blank
    #[error("poll option {0} is empty")]
    EmptyOption(usize),
}
