//! Testing utilities for the Rollcall workspace
//!
//! Shared fixtures: a recording transport, seeded sheets and a small
//! conversation harness.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rollcall_core::{
    ChatTransport, ConversationEngine, ConversationId, ConversationSession, DialogState, EngineConfig,
    InboundEvent, TransportError,
};
use rollcall_poll::{PollId, PollRegistry, VoteChange};
use rollcall_sheet::{CellRef, CellValue, InMemoryStore};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub const SHEET: &str = "Sheet1";
pub const CONVERSATION: &str = "chat-1";

/// Poll posted through [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPoll {
    pub conversation: ConversationId,
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
}

/// Transport that records everything and assigns sequential poll ids
#[derive(Debug, Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<(ConversationId, String)>>,
    polls: Mutex<Vec<CreatedPoll>>,
    next_poll: AtomicU64,
    fail_delivery: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_delivery(&self, fail: bool) {
        self.fail_delivery.store(fail, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<(ConversationId, String)> {
        self.delivered.lock().clone()
    }

    pub fn delivered_to(&self, conversation: &str) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .filter(|(id, _)| id.as_str() == conversation)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn polls(&self) -> Vec<CreatedPoll> {
        self.polls.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn deliver(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError> {
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(TransportError::Delivery("recording transport set to fail".into()));
        }
        self.delivered.lock().push((conversation.clone(), text.to_string()));
        Ok(())
    }

    async fn create_poll(
        &self,
        conversation: &ConversationId,
        question: &str,
        options: &[String],
    ) -> Result<PollId, TransportError> {
        let id = PollId::new(format!("poll-{}", self.next_poll.fetch_add(1, Ordering::SeqCst) + 1));
        self.polls.lock().push(CreatedPoll {
            conversation: conversation.clone(),
            id: id.clone(),
            question: question.to_string(),
            options: options.to_vec(),
        });
        Ok(id)
    }
}

/// Store with `identities` in column A from row 4
pub fn seeded_store(identities: &[&str]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for (row, identity) in (4u32..).zip(identities) {
        store.set(SHEET, CellRef::new(rollcall_sheet::ColumnRef::A, row), *identity);
    }
    store
}

/// Set a header label, cost and headcount on `column` (any may be skipped)
pub fn seed_header(
    store: &InMemoryStore,
    column: &str,
    label: Option<&str>,
    cost: Option<f64>,
    headcount: Option<u32>,
) {
    let set = |row: u32, value: CellValue| {
        store
            .set_a1(SHEET, &format!("{column}{row}"), value)
            .unwrap();
    };
    if let Some(label) = label {
        set(1, CellValue::text(label));
    }
    if let Some(cost) = cost {
        set(2, CellValue::number(cost));
    }
    if let Some(headcount) = headcount {
        set(3, CellValue::from(headcount));
    }
}

pub fn text(content: &str) -> InboundEvent {
    InboundEvent::text(CONVERSATION, content)
}

pub fn vote(poll: &str, voter: &str, selected: Vec<usize>) -> InboundEvent {
    InboundEvent::vote(CONVERSATION, VoteChange::new(poll, voter, selected))
}

pub fn forwarded(poll: &str) -> InboundEvent {
    InboundEvent::forwarded(CONVERSATION, poll)
}

/// Engine plus the fixtures behind it, driven as one conversation
pub struct Harness {
    pub engine: Arc<ConversationEngine>,
    pub store: Arc<InMemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub registry: PollRegistry,
}

impl Harness {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<InMemoryStore>, config: EngineConfig) -> Self {
        let transport = RecordingTransport::new();
        let registry = PollRegistry::default();
        let engine = ConversationEngine::new(config, store.clone(), transport.clone(), registry.clone());
        Self {
            engine: Arc::new(engine),
            store,
            transport,
            registry,
        }
    }

    /// Send operator text and return the reply
    pub async fn say(&self, content: &str) -> String {
        self.send(text(content)).await.unwrap_or_default()
    }

    pub async fn send(&self, event: InboundEvent) -> Option<String> {
        self.engine.handle_event(&event).await
    }

    pub async fn session(&self) -> ConversationSession {
        self.engine
            .sessions()
            .snapshot(&ConversationId::new(CONVERSATION))
            .await
            .unwrap_or_default()
    }

    pub async fn state(&self) -> DialogState {
        self.session().await.state
    }

    pub fn cell(&self, a1: &str) -> CellValue {
        self.store.get(SHEET, a1.parse().unwrap())
    }
}
