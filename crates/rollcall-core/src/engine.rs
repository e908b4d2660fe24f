//! Conversation engine
//!
//! Sequences the components for each conversation. Every event is handled
//! under the conversation's session lock and produces at most one reply.
//!
//! # Dispatch
//!
//! Slash commands are handled first and mean the same thing in every state.
//! Any other text goes through a single `match` over [`DialogState`]; each
//! arm parses the answer it expects and either advances the cycle or fails
//! with [`EngineError::ValidationFailed`] carrying the re-prompt. Handlers
//! parse before they mutate, so a re-prompt never loses collected fields.
//!
//! # Failures
//!
//! [`ConversationEngine::handle_event`] never returns an error. A failure is
//! turned into a reply; failures that [reset the
//! session](EngineError::resets_session) also return it to idle.

use crate::column::ColumnResolver;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::guard::OverrideGuard;
use crate::identity::{normalize_identity, IdentityMatcher};
use crate::input::{self, Command};
use crate::messages;
use crate::metadata::MetadataCollector;
use crate::session::{ConversationSession, DialogState, SessionStore};
use crate::transport::ChatTransport;
use crate::types::{ColumnCandidate, ColumnSearch, ConversationId, InboundEvent};
use crate::writer::{WriteCoordinator, WriteRequest};
use rollcall_poll::{PollId, PollRecord, PollRegistry, VoteAggregator};
use rollcall_sheet::{ColumnRef, TabularStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Finite-state controller for every conversation
pub struct ConversationEngine {
    config: EngineConfig,
    sessions: SessionStore,
    votes: VoteAggregator,
    transport: Arc<dyn ChatTransport>,
    columns: ColumnResolver,
    metadata: MetadataCollector,
    matcher: IdentityMatcher,
    guard: OverrideGuard,
    writer: WriteCoordinator,
}

impl ConversationEngine {
    /// Create an engine over a store, a transport and a poll registry
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn TabularStore>,
        transport: Arc<dyn ChatTransport>,
        registry: PollRegistry,
    ) -> Self {
        let layout = config.layout.clone();
        Self {
            columns: ColumnResolver::new(Arc::clone(&store), layout.clone()),
            metadata: MetadataCollector::new(Arc::clone(&store), layout.clone()),
            matcher: IdentityMatcher::new(
                Arc::clone(&store),
                layout.clone(),
                config.identity_markers.clone(),
            ),
            guard: OverrideGuard::new(Arc::clone(&store), layout.clone()),
            writer: WriteCoordinator::new(store, layout, config.mark_value.clone()),
            votes: VoteAggregator::new(registry),
            sessions: SessionStore::new(),
            transport,
            config,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Session store
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Vote aggregator over the shared poll registry
    #[inline]
    #[must_use]
    pub fn votes(&self) -> &VoteAggregator {
        &self.votes
    }

    /// Handle one inbound event and return the reply, if any
    pub async fn handle_event(&self, event: &InboundEvent) -> Option<String> {
        if let InboundEvent::PollVoteChanged { change, .. } = event {
            self.votes.record(change).await;
            return None;
        }

        let conversation = event.conversation();
        let handle = self.sessions.handle(conversation);
        let mut session = handle.lock().await;

        let result = match event {
            InboundEvent::Text { text, .. } => self.on_text(conversation, &mut session, text).await,
            InboundEvent::ForwardedPoll { poll, .. } => self.on_forwarded_poll(&mut session, poll).await,
            InboundEvent::PollVoteChanged { .. } => Ok(None),
        };
        Self::settle(conversation, &mut session, result)
    }

    /// Turn a handler result into the reply, resetting on fatal errors
    fn settle(
        conversation: &ConversationId,
        session: &mut ConversationSession,
        result: EngineResult<Option<String>>,
    ) -> Option<String> {
        match result {
            Ok(reply) => reply,
            Err(EngineError::ValidationFailed(prompt)) => {
                tracing::debug!(conversation = %conversation, state = %session.state, "re-prompt");
                Some(prompt)
            }
            Err(error) => {
                if error.resets_session() {
                    tracing::warn!(
                        conversation = %conversation,
                        state = %session.state,
                        %error,
                        "cycle aborted"
                    );
                    session.reset();
                } else {
                    tracing::warn!(conversation = %conversation, %error, "request failed");
                }
                Some(error.user_message())
            }
        }
    }

    async fn on_text(
        &self,
        conversation: &ConversationId,
        session: &mut ConversationSession,
        text: &str,
    ) -> EngineResult<Option<String>> {
        let Some(command) = input::parse_command(text) else {
            return self.on_answer(session, text).await.map(Some);
        };

        let reply = match command {
            Command::Start => {
                if !session.state.is_idle() {
                    tracing::info!(conversation = %conversation, state = %session.state, "cycle restarted");
                    session.reset();
                }
                tracing::info!(conversation = %conversation, "cycle started");
                self.start_cycle(session).await?
            }
            Command::Cancel => {
                tracing::info!(conversation = %conversation, state = %session.state, "cycle cancelled");
                session.reset();
                messages::CANCELLED.to_string()
            }
            Command::Help => messages::HELP.to_string(),
            Command::Poll(args) => self.issue_poll(conversation, args.as_deref()).await?,
            Command::Unknown(name) => messages::unknown_command(&name),
        };
        Ok(Some(reply))
    }

    /// The transition table for plain-text answers
    async fn on_answer(&self, session: &mut ConversationSession, text: &str) -> EngineResult<String> {
        match session.state {
            DialogState::Idle => Ok(messages::IDLE_HINT.to_string()),
            DialogState::AwaitingPollIntent => self.on_poll_intent(session, text).await,
            DialogState::AwaitingPollOptionSelection => self.on_poll_option(session, text).await,
            DialogState::AwaitingColumnConfirmation => self.on_column_confirmation(session, text).await,
            DialogState::AwaitingNewColumnChoice => {
                if yes_no(text)? {
                    session.is_new_column = true;
                    session.column_label = None;
                    session.transition(DialogState::AwaitingDateName);
                    Ok(messages::ASK_LABEL.to_string())
                } else {
                    session.reset();
                    Ok(messages::CANCELLED.to_string())
                }
            }
            DialogState::AwaitingColumnSelection => self.on_column_selection(session, text).await,
            DialogState::AwaitingDateName => {
                let label = input::parse_label(text)
                    .ok_or_else(|| EngineError::ValidationFailed(messages::LABEL_EMPTY.into()))?;
                let column = target_column(session)?;
                self.metadata.write_label(column, &label).await?;
                session.column_label = Some(label);
                self.enter_metadata_phase(session).await
            }
            DialogState::AwaitingCost => {
                let cost = input::parse_cost(text)
                    .ok_or_else(|| EngineError::ValidationFailed(messages::COST_INVALID.into()))?;
                let column = target_column(session)?;
                self.metadata.write_cost(column, cost).await?;
                session.column_cost = Some(cost);
                self.enter_metadata_phase(session).await
            }
            DialogState::AwaitingUsernames => {
                let identities = input::parse_identities(text, &self.config.identity_markers);
                if identities.is_empty() {
                    return Err(EngineError::ValidationFailed(messages::USERNAMES_EMPTY.into()));
                }
                session.pending_identities = identities;
                self.enter_matching_phase(session).await
            }
            DialogState::AwaitingPlayerCountConfirmation => {
                if yes_no(text)? {
                    if session.matched_rows.is_empty() {
                        return Err(EngineError::SessionDataLost("the matched rows"));
                    }
                    let count = u32::try_from(session.matched_rows.len())
                        .map_err(|_| EngineError::ValidationFailed(messages::ASK_COUNT.into()))?;
                    self.set_headcount(session, count).await
                } else {
                    session.transition(DialogState::AwaitingPlayerCount);
                    Ok(messages::ASK_COUNT.to_string())
                }
            }
            DialogState::AwaitingPlayerCount => {
                let count = input::parse_count(text)
                    .ok_or_else(|| EngineError::ValidationFailed(messages::COUNT_INVALID.into()))?;
                self.set_headcount(session, count).await
            }
            DialogState::AwaitingOverrideConfirmation => {
                let overwrite = yes_no(text)?;
                self.finish_write(session, overwrite).await
            }
        }
    }

    async fn start_cycle(&self, session: &mut ConversationSession) -> EngineResult<String> {
        match self.columns.detect_last_column().await? {
            Some(candidate) => {
                session.target_column = Some(candidate.column);
                session.column_label = Some(candidate.label.clone());
                session.transition(DialogState::AwaitingColumnConfirmation);
                Ok(messages::confirm_column(&candidate))
            }
            None => {
                let column = self.columns.allocate_first_column();
                session.target_column = Some(column);
                session.transition(DialogState::AwaitingNewColumnChoice);
                Ok(messages::offer_new_column(column))
            }
        }
    }

    async fn on_column_confirmation(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> EngineResult<String> {
        if let Some(answer) = input::parse_yes_no(text) {
            let current = target_column(session)?;
            if answer {
                let label = session.column_label.clone();
                return self.adopt_column(session, current, label.as_deref()).await;
            }
            let next = self.columns.next_column(current);
            session.target_column = Some(next);
            session.column_label = None;
            session.transition(DialogState::AwaitingNewColumnChoice);
            return Ok(messages::offer_new_column(next));
        }

        let token = input::parse_column_token(text);
        if let Some(column) = token.filter(|column| self.columns.in_scan_window(*column)) {
            return self.adopt_column(session, column, None).await;
        }

        // A letter token outside the date columns only names a header spelled the same way
        let search = match token {
            Some(_) => self.columns.search_exact_label(text).await?,
            None => self.columns.search_by_label_text(text).await?,
        };
        match search {
            ColumnSearch::NotFound => Err(EngineError::ValidationFailed(match token {
                Some(column) => messages::column_out_of_range(
                    column,
                    self.columns.allocate_first_column(),
                    self.columns.last_scanned_column(),
                ),
                None => messages::no_column_matches(text),
            })),
            ColumnSearch::Found(candidate) => {
                self.adopt_column(session, candidate.column, Some(&candidate.label)).await
            }
            ColumnSearch::Ambiguous(candidates) => {
                let reply = messages::choose_column(&candidates);
                session.candidate_columns = candidates;
                session.transition(DialogState::AwaitingColumnSelection);
                Ok(reply)
            }
        }
    }

    async fn on_column_selection(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> EngineResult<String> {
        if session.candidate_columns.is_empty() {
            return Err(EngineError::SessionDataLost("the candidate columns"));
        }
        let chosen = pick_candidate(&session.candidate_columns, text)
            .cloned()
            .ok_or_else(|| {
                EngineError::ValidationFailed(messages::choose_column_again(session.candidate_columns.len()))
            })?;
        session.candidate_columns.clear();
        self.adopt_column(session, chosen.column, Some(&chosen.label)).await
    }

    async fn adopt_column(
        &self,
        session: &mut ConversationSession,
        column: ColumnRef,
        label: Option<&str>,
    ) -> EngineResult<String> {
        let prefix = messages::using_column(column, label);
        session.target_column = Some(column);
        session.is_new_column = false;
        let next = self.enter_metadata_phase(session).await?;
        Ok(format!("{prefix}\n{next}"))
    }

    /// Ask for the first missing header field, or move on to matching
    async fn enter_metadata_phase(&self, session: &mut ConversationSession) -> EngineResult<String> {
        let column = target_column(session)?;
        let metadata = self.metadata.read_metadata(column).await?;
        session.column_label = metadata.label;
        session.column_cost = metadata.cost;
        session.column_headcount = metadata.headcount;

        if session.column_label.is_none() {
            session.transition(DialogState::AwaitingDateName);
            Ok(messages::ASK_LABEL.to_string())
        } else if session.column_cost.is_none() {
            session.transition(DialogState::AwaitingCost);
            Ok(messages::ASK_COST.to_string())
        } else if !session.pending_identities.is_empty() {
            self.enter_matching_phase(session).await
        } else {
            session.transition(DialogState::AwaitingUsernames);
            Ok(messages::ASK_USERNAMES.to_string())
        }
    }

    async fn enter_matching_phase(&self, session: &mut ConversationSession) -> EngineResult<String> {
        let matched = self.matcher.match_identities(&session.pending_identities).await?;
        if matched.is_empty() {
            let reply = messages::nobody_matched(&session.pending_identities);
            session.reset();
            return Ok(reply);
        }

        let count = matched.len();
        session.matched_rows = matched;
        session.existing_values.clear();
        if session.column_headcount.is_some() {
            return self.enter_override_phase(session).await;
        }
        session.transition(DialogState::AwaitingPlayerCountConfirmation);
        Ok(messages::confirm_count(count, session.pending_identities.len()))
    }

    async fn set_headcount(&self, session: &mut ConversationSession, count: u32) -> EngineResult<String> {
        let column = target_column(session)?;
        self.metadata.write_headcount(column, count).await?;
        session.column_headcount = Some(count);
        self.enter_override_phase(session).await
    }

    async fn enter_override_phase(&self, session: &mut ConversationSession) -> EngineResult<String> {
        let column = target_column(session)?;
        let conflicts = self.guard.find_conflicts(&session.matched_rows, column).await?;
        if conflicts.is_empty() {
            return self.finish_write(session, true).await;
        }

        let reply = messages::confirm_override(column, &conflicts);
        session.existing_values = conflicts
            .into_iter()
            .map(|conflict| (conflict.identity, conflict.existing_value))
            .collect();
        session.transition(DialogState::AwaitingOverrideConfirmation);
        Ok(reply)
    }

    async fn finish_write(&self, session: &mut ConversationSession, overwrite: bool) -> EngineResult<String> {
        let column = target_column(session)?;
        if session.matched_rows.is_empty() {
            return Err(EngineError::SessionDataLost("the matched rows"));
        }
        if !session.conflicts_are_matched() {
            return Err(EngineError::SessionDataLost("the rows of the occupied cells"));
        }

        let skip: Vec<String> = session.existing_values.keys().cloned().collect();
        let report = self
            .writer
            .write(WriteRequest {
                column,
                pending: &session.pending_identities,
                matched: &session.matched_rows,
                overwrite,
                skip: &skip,
            })
            .await?;

        let reply = messages::report(&report);
        session.reset();
        Ok(reply)
    }

    async fn on_forwarded_poll(
        &self,
        session: &mut ConversationSession,
        poll: &PollId,
    ) -> EngineResult<Option<String>> {
        let Some(record) = self.votes.registry().snapshot(poll).await else {
            tracing::debug!(poll = %poll, "forwarded poll is not tracked");
            return Ok(Some(messages::UNKNOWN_POLL.to_string()));
        };

        if !session.state.is_idle() {
            tracing::info!(state = %session.state, poll = %poll, "cycle replaced by forwarded poll");
        }
        session.reset();
        session.active_poll = Some(poll.clone());
        session.transition(DialogState::AwaitingPollIntent);
        Ok(Some(messages::poll_loaded(&record)))
    }

    async fn active_poll(&self, session: &ConversationSession) -> EngineResult<PollRecord> {
        let poll = session
            .active_poll
            .as_ref()
            .ok_or(EngineError::SessionDataLost("the forwarded poll"))?;
        self.votes
            .registry()
            .snapshot(poll)
            .await
            .ok_or(EngineError::SessionDataLost("the forwarded poll"))
    }

    async fn on_poll_intent(&self, session: &mut ConversationSession, text: &str) -> EngineResult<String> {
        match text.trim().to_lowercase().as_str() {
            "view" => {
                let record = self.active_poll(session).await?;
                session.reset();
                Ok(messages::poll_view(&record))
            }
            "update" => {
                let record = self.active_poll(session).await?;
                session.transition(DialogState::AwaitingPollOptionSelection);
                Ok(messages::choose_poll_option(&record))
            }
            _ => Err(EngineError::ValidationFailed(messages::POLL_INTENT.into())),
        }
    }

    async fn on_poll_option(&self, session: &mut ConversationSession, text: &str) -> EngineResult<String> {
        let record = self.active_poll(session).await?;
        let option = input::parse_ordinal(text, record.options().len()).ok_or_else(|| {
            EngineError::ValidationFailed(messages::choose_poll_option_again(record.options().len()))
        })?;

        let voters = record.voters_for(option).cloned().unwrap_or_default();
        let markers = &self.config.identity_markers;
        let mut seen = HashSet::new();
        let identities: Vec<String> = voters
            .into_iter()
            .filter(|voter| {
                let key = normalize_identity(voter, markers);
                !key.is_empty() && seen.insert(key)
            })
            .collect();

        if identities.is_empty() {
            let reply = messages::poll_option_empty(&record.options()[option]);
            session.reset();
            return Ok(reply);
        }
        tracing::info!(voters = identities.len(), option, "cycle started from poll");
        session.pending_identities = identities;
        self.start_cycle(session).await
    }

    async fn issue_poll(&self, conversation: &ConversationId, args: Option<&str>) -> EngineResult<String> {
        let template = &self.config.default_poll;
        let (question, options) = match args.map(input::parse_poll_spec) {
            None => (template.question.clone(), template.options.clone()),
            Some(spec) if spec.options.is_empty() => (spec.question, template.options.clone()),
            Some(spec) => (spec.question, spec.options),
        };

        let record = PollRecord::new(question, options)?;
        let id = self
            .transport
            .create_poll(conversation, record.question(), record.options())
            .await?;
        let reply = messages::poll_created(record.question(), record.options().len());
        tracing::info!(conversation = %conversation, poll = %id, "poll issued");
        self.votes.registry().register(id, record).await;
        Ok(reply)
    }
}

fn target_column(session: &ConversationSession) -> EngineResult<ColumnRef> {
    session
        .target_column
        .ok_or(EngineError::SessionDataLost("the target column"))
}

fn yes_no(text: &str) -> EngineResult<bool> {
    input::parse_yes_no(text).ok_or_else(|| EngineError::ValidationFailed(messages::YES_NO.into()))
}

/// Candidate chosen by 1-based position or by column letters
fn pick_candidate<'a>(candidates: &'a [ColumnCandidate], text: &str) -> Option<&'a ColumnCandidate> {
    if let Some(index) = input::parse_ordinal(text, candidates.len()) {
        return candidates.get(index);
    }
    let column = input::parse_column_token(&text.trim().to_uppercase())?;
    candidates.iter().find(|candidate| candidate.column == column)
}
