//! Chat transport boundary

use crate::error::TransportError;
use crate::types::ConversationId;
use async_trait::async_trait;
use rollcall_poll::PollId;

/// Outbound side of the chat platform
///
/// Inbound events arrive separately as a stream of
/// [`InboundEvent`](crate::types::InboundEvent)s.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` to a conversation
    async fn deliver(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError>;

    /// Post a poll and return the platform's id for it
    async fn create_poll(
        &self,
        conversation: &ConversationId,
        question: &str,
        options: &[String],
    ) -> Result<PollId, TransportError>;
}
