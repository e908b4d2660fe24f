//! Event routing
//!
//! [`BotRuntime::run`] drains the transport's inbound stream. Vote changes
//! are applied straight away; every other event is queued to a worker task
//! owned by its conversation, so one conversation's events are handled in
//! arrival order while different conversations run concurrently.
//!
//! [`BotRuntime::progress`] counts events handled so far, replies included,
//! so a caller can wait for its own earlier events before reading the sheet.

use crate::engine::ConversationEngine;
use crate::transport::ChatTransport;
use crate::types::{ConversationId, InboundEvent};
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Counters collected over one [`BotRuntime::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events received
    pub events: u64,
    /// Vote changes applied
    pub votes: u64,
    /// Replies delivered
    pub replies: u64,
    /// Replies the transport refused
    pub delivery_failures: u64,
    /// Conversations that got a worker
    pub conversations: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct WorkerStats {
    replies: u64,
    delivery_failures: u64,
}

struct Worker {
    sender: mpsc::UnboundedSender<InboundEvent>,
    task: JoinHandle<WorkerStats>,
}

/// Routes inbound events to the engine and delivers replies
pub struct BotRuntime {
    engine: Arc<ConversationEngine>,
    transport: Arc<dyn ChatTransport>,
    workers: DashMap<ConversationId, Worker>,
    handled: Arc<watch::Sender<u64>>,
}

impl BotRuntime {
    /// Create a runtime
    pub fn new(engine: Arc<ConversationEngine>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            engine,
            transport,
            workers: DashMap::new(),
            handled: Arc::new(watch::channel(0).0),
        }
    }

    /// Number of events fully handled, updated as events complete
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<u64> {
        self.handled.subscribe()
    }

    /// Engine driven by this runtime
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Arc<ConversationEngine> {
        &self.engine
    }

    /// Process events until `inbound` closes, then wait for every worker
    pub async fn run(&self, mut inbound: mpsc::Receiver<InboundEvent>) -> RuntimeStats {
        let mut stats = RuntimeStats::default();

        while let Some(event) = inbound.recv().await {
            stats.events += 1;
            match event {
                InboundEvent::PollVoteChanged { change, .. } => {
                    self.engine.votes().record(&change).await;
                    stats.votes += 1;
                    self.handled.send_modify(|n| *n += 1);
                }
                other => self.dispatch(other),
            }
        }

        let workers: Vec<(ConversationId, Worker)> = {
            let keys: Vec<ConversationId> = self.workers.iter().map(|w| w.key().clone()).collect();
            keys.into_iter()
                .filter_map(|key| self.workers.remove(&key))
                .collect()
        };
        stats.conversations = workers.len();

        // dropping the senders lets each worker drain its queue and exit
        let tasks: Vec<JoinHandle<WorkerStats>> = workers.into_iter().map(|(_, w)| w.task).collect();
        for result in join_all(tasks).await {
            match result {
                Ok(worker) => {
                    stats.replies += worker.replies;
                    stats.delivery_failures += worker.delivery_failures;
                }
                Err(error) => tracing::error!(%error, "conversation worker panicked"),
            }
        }

        tracing::info!(
            events = stats.events,
            votes = stats.votes,
            replies = stats.replies,
            conversations = stats.conversations,
            "runtime stopped"
        );
        stats
    }

    fn dispatch(&self, event: InboundEvent) {
        let conversation = event.conversation().clone();
        let worker = self
            .workers
            .entry(conversation.clone())
            .or_insert_with(|| self.spawn_worker(conversation.clone()));

        if let Err(mpsc::error::SendError(event)) = worker.sender.send(event) {
            tracing::error!(conversation = %event.conversation(), "conversation worker is gone; event dropped");
            self.handled.send_modify(|n| *n += 1);
        }
    }

    fn spawn_worker(&self, conversation: ConversationId) -> Worker {
        let (sender, mut receiver) = mpsc::unbounded_channel::<InboundEvent>();
        let engine = Arc::clone(&self.engine);
        let transport = Arc::clone(&self.transport);
        let handled = Arc::clone(&self.handled);
        tracing::debug!(conversation = %conversation, "conversation worker started");

        let task = tokio::spawn(async move {
            let mut stats = WorkerStats::default();
            while let Some(event) = receiver.recv().await {
                if let Some(reply) = engine.handle_event(&event).await {
                    match transport.deliver(&conversation, &reply).await {
                        Ok(()) => stats.replies += 1,
                        Err(error) => {
                            stats.delivery_failures += 1;
                            tracing::warn!(conversation = %conversation, %error, "reply not delivered");
                        }
                    }
                }
                handled.send_modify(|n| *n += 1);
            }
            stats
        });
        Worker { sender, task }
    }
}
