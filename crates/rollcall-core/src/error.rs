//! Error types for Rollcall Core
//!
//! Covers the failure taxonomy of a conversation cycle:
//! - Backing-store failures (reply and reset)
//! - Input that does not fit the current question (re-prompt)
//! - Session invariants found broken (reply and forced reset)
//! - Chat transport and poll construction failures

use rollcall_poll::PollError;
use rollcall_sheet::StoreError;

/// Instruction appended to every failure that ends a cycle
pub const RESTART_HINT: &str = "Send /start to begin again.";

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Tabular store call failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Input does not parse for the current question; carries the re-prompt
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// A field required by the current state is missing
    #[error("session data lost: {0}")]
    SessionDataLost(&'static str),

    /// Chat transport failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Poll could not be built
    #[error("poll error: {0}")]
    Poll(#[from] PollError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Check if the conversation must return to idle
    #[inline]
    #[must_use]
    pub fn resets_session(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::SessionDataLost(_))
    }

    /// Check if the underlying call may succeed when repeated
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StoreUnavailable(e) => e.is_retryable(),
            Self::Transport(_) => true,
            _ => false,
        }
    }

    /// Text shown to the operator
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreUnavailable(e) => format!(
                "I couldn't reach the spreadsheet ({e}). Nothing further was written. {RESTART_HINT}"
            ),
            Self::ValidationFailed(prompt) => prompt.clone(),
            Self::SessionDataLost(what) => format!(
                "Internal inconsistency: {what} went missing, so the conversation was reset. {RESTART_HINT}"
            ),
            Self::Transport(e) => format!("The chat service refused the request ({e}). Try again in a moment."),
            Self::Poll(e) => format!("Can't create that poll: {e}. Usage: /poll Question | Option 1 | Option 2"),
            Self::Config(e) => format!("Configuration problem: {e}"),
        }
    }
}

/// Chat transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Message could not be delivered
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Poll could not be created
    #[error("poll creation failed: {0}")]
    PollCreation(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_display() {
        let err = EngineError::SessionDataLost("the target column");
        assert!(err.to_string().contains("session data lost"));
    }

    #[test]
    fn resets_session_classification() {
        assert!(EngineError::StoreUnavailable(StoreError::unavailable("down")).resets_session());
        assert!(EngineError::SessionDataLost("x").resets_session());
        assert!(!EngineError::ValidationFailed("again?".into()).resets_session());
        assert!(!EngineError::Transport(TransportError::PollCreation("x".into())).resets_session());
    }

    #[test]
    fn store_failure_message_has_restart_hint() {
        let err = EngineError::from(StoreError::unavailable("timeout"));
        let message = err.user_message();
        assert!(message.contains("timeout"));
        assert!(message.ends_with(RESTART_HINT));
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_message_is_the_prompt() {
        let err = EngineError::ValidationFailed("Please answer yes or no.".into());
        assert_eq!(err.user_message(), "Please answer yes or no.");
        assert!(!err.is_retryable());
    }
}
