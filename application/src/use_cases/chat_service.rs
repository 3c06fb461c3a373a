//! Chat service use case.
//!
//! Owns the conversation and runs one turn at a time:
//!
//! 1. Append the user's message and persist it
//! 2. Send system prompt + history to the [`CompletionGateway`]
//! 3. Accumulate the streamed (or typed-out) answer, reporting every update
//!    to a [`ChatProgressNotifier`]
//! 4. Append the assistant's answer (or an error message) and persist
//!
//! Only one turn may be in flight. A second [`ChatService::send`] while one
//! is pending is a no-op, and [`ChatService::clear`] cancels the pending turn
//! before wiping the history.

use crate::config::ChatParams;
use crate::ports::chat_progress::ChatProgressNotifier;
use crate::ports::completion_gateway::{
    Completion, CompletionGateway, CompletionRequest, GatewayError,
};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::use_cases::conversation_store::ConversationStore;
use balikci_domain::util::preview;
use balikci_domain::{Conversation, Message, StreamEvent, TutorPrompt};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shown when the model finished without producing any text.
pub const EMPTY_COMPLETION_FALLBACK: &str = "Sorry, I couldn't produce an answer.";

/// Prefix of assistant messages that report a failed turn.
pub const ERROR_PREFIX: &str = "❌ An error occurred: ";

/// Why a send did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty or whitespace.
    Empty,
    /// Another turn is still in flight.
    Busy,
}

/// Result of [`ChatService::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing was sent and the history is unchanged.
    Ignored(IgnoreReason),
    /// The assistant answered; the message has been appended.
    Completed(Message),
    /// The request failed; an error message has been appended.
    Failed(Message),
    /// The turn was cancelled; no assistant message was appended.
    Cancelled,
}

impl SendOutcome {
    /// The assistant message appended by this turn, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            SendOutcome::Completed(m) | SendOutcome::Failed(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
enum TurnError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("turn cancelled after {0} bytes")]
    Cancelled(usize),
}

struct PendingTurn {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct ChatState {
    conversation: Conversation,
    pending: Option<PendingTurn>,
    next_turn_id: u64,
}

/// Conversation owner and turn runner.
///
/// Shared as `Arc<ChatService>`; all methods take `&self`. The state lock is
/// never held across an `.await`.
pub struct ChatService {
    gateway: Arc<dyn CompletionGateway>,
    store: ConversationStore,
    params: ChatParams,
    conversation_logger: Arc<dyn ConversationLogger>,
    state: Mutex<ChatState>,
}

impl ChatService {
    /// Create the service, restoring any persisted history.
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        store: ConversationStore,
        params: ChatParams,
    ) -> Self {
        let conversation = store.load();
        info!(
            "Chat ready: model {}, {} saved messages",
            params.model,
            conversation.len()
        );
        Self {
            gateway,
            store,
            params,
            conversation_logger: Arc::new(NoConversationLogger),
            state: Mutex::new(ChatState {
                conversation,
                ..ChatState::default()
            }),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ChatParams {
        &self.params
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Snapshot of the history.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().conversation.messages().to_vec()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().conversation.is_empty()
    }

    /// Whether a turn is in flight.
    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Cancel the in-flight turn, if any. The history is left as is.
    pub fn cancel(&self) -> bool {
        match self.lock().pending.as_ref() {
            Some(turn) => {
                debug!("Cancelling turn {}", turn.id);
                turn.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel the in-flight turn and wipe the history, in memory and in the
    /// store. Returns the number of messages removed.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut state = self.lock();
            if let Some(turn) = state.pending.take() {
                debug!("Clearing: cancelling turn {}", turn.id);
                turn.token.cancel();
            }
            let removed = state.conversation.len();
            state.conversation.clear();
            removed
        };
        self.store.clear();
        self.conversation_logger
            .log(ConversationEvent::conversation_cleared(removed));
        info!("Conversation cleared ({} messages)", removed);
        removed
    }

    /// Run one turn.
    pub async fn send(&self, text: &str, progress: &dyn ChatProgressNotifier) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Empty);
        }

        let (turn_id, token, request, user_message) = {
            let mut state = self.lock();
            if state.pending.is_some() {
                debug!("Send ignored: a request is already pending");
                return SendOutcome::Ignored(IgnoreReason::Busy);
            }

            let request = self.build_request(state.conversation.messages(), content);
            let user_message = Message::user(content);
            state.conversation.push(user_message.clone());
            self.store.save(&state.conversation);

            state.next_turn_id += 1;
            let turn_id = state.next_turn_id;
            let token = CancellationToken::new();
            state.pending = Some(PendingTurn {
                id: turn_id,
                token: token.clone(),
            });
            (turn_id, token, request, user_message)
        };

        info!("Turn {}: {}", turn_id, preview(content, 80));
        self.conversation_logger
            .log(ConversationEvent::user_message(&user_message));
        progress.on_request_start();

        let result = if self.params.streaming {
            self.streamed_turn(&request, &token, progress).await
        } else {
            self.batched_turn(&request, &token, progress).await
        };

        let outcome = match result {
            Ok(completion) => self.commit_completion(completion, &token, progress),
            Err(TurnError::Cancelled(partial)) => self.cancelled(partial, progress),
            Err(TurnError::Gateway(e)) => self.commit_failure(e, &token, progress).await,
        };

        if matches!(outcome, SendOutcome::Cancelled) {
            info!("Turn {} cancelled", turn_id);
        }

        self.release(turn_id);
        outcome
    }

    fn build_request(&self, history: &[Message], content: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.params.model.clone(),
            messages: TutorPrompt::build_messages(&self.params.system_prompt, history, content),
            max_tokens: self.params.max_tokens,
            reasoning: self.params.reasoning,
            stream: self.params.streaming,
        }
    }

    async fn streamed_turn(
        &self,
        request: &CompletionRequest,
        token: &CancellationToken,
        progress: &dyn ChatProgressNotifier,
    ) -> Result<Completion, TurnError> {
        let mut handle = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(TurnError::Cancelled(0)),
            handle = self.gateway.stream(request) => handle?,
        };

        let mut completion = Completion::default();
        let mut started = false;

        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Err(TurnError::Cancelled(completion.text.len()));
                }
                event = handle.next() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    if !started {
                        progress.on_stream_start();
                        started = true;
                    }
                    completion.text.push_str(&chunk);
                    progress.on_stream_update(&completion.text);
                }
                Some(StreamEvent::Reasoning(details)) => {
                    completion.reasoning_details = Some(details);
                }
                Some(StreamEvent::Completed(full)) => {
                    // Adapters that cannot stream deliver everything here.
                    if completion.text.is_empty() && !full.is_empty() {
                        progress.on_stream_start();
                        started = true;
                        completion.text = full;
                        progress.on_stream_update(&completion.text);
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => {
                    return Err(TurnError::Gateway(GatewayError::Stream(e)));
                }
                None => break,
            }
        }

        if started {
            progress.on_stream_end();
        }
        Ok(completion)
    }

    async fn batched_turn(
        &self,
        request: &CompletionRequest,
        token: &CancellationToken,
        progress: &dyn ChatProgressNotifier,
    ) -> Result<Completion, TurnError> {
        let completion = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(TurnError::Cancelled(0)),
            completion = self.gateway.complete(request) => completion?,
        };

        if completion.text.is_empty() {
            return Ok(completion);
        }

        progress.on_stream_start();
        let typing = &self.params.typing;
        if typing.enabled {
            let mut shown = String::with_capacity(completion.text.len());
            for chunk in typing.chunks(&completion.text) {
                shown.push_str(chunk);
                progress.on_stream_update(&shown);
                let delay = typing.delay_at(rand::random::<f64>());
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(TurnError::Cancelled(shown.len())),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        } else {
            progress.on_stream_update(&completion.text);
        }
        progress.on_stream_end();

        Ok(completion)
    }

    fn commit_completion(
        &self,
        completion: Completion,
        token: &CancellationToken,
        progress: &dyn ChatProgressNotifier,
    ) -> SendOutcome {
        let text = if completion.text.trim().is_empty() {
            warn!("Model returned no text; using fallback answer");
            progress.on_stream_start();
            progress.on_stream_update(EMPTY_COMPLETION_FALLBACK);
            progress.on_stream_end();
            EMPTY_COMPLETION_FALLBACK.to_string()
        } else {
            completion.text
        };

        let message = Message::assistant(text).with_reasoning(completion.reasoning_details);
        if !self.append_unless_cancelled(&message, token) {
            return self.cancelled(message.content.len(), progress);
        }

        debug!("Assistant answered ({} bytes)", message.content.len());
        self.conversation_logger.log(ConversationEvent::assistant_message(
            self.params.model.as_str(),
            &message,
        ));
        SendOutcome::Completed(message)
    }

    async fn commit_failure(
        &self,
        error: GatewayError,
        token: &CancellationToken,
        progress: &dyn ChatProgressNotifier,
    ) -> SendOutcome {
        if error.is_cancelled() {
            return self.cancelled(0, progress);
        }

        warn!("Completion request failed: {}", error);
        let text = format!("{}{}", ERROR_PREFIX, error);
        progress.on_error(&text);

        let cancelled = tokio::select! {
            biased;
            _ = token.cancelled() => true,
            _ = tokio::time::sleep(self.params.error_display_delay) => false,
        };

        let message = Message::assistant(text);
        if cancelled || !self.append_unless_cancelled(&message, token) {
            return self.cancelled(0, progress);
        }

        self.conversation_logger.log(ConversationEvent::request_failed(
            self.params.model.as_str(),
            &error.to_string(),
        ));
        SendOutcome::Failed(message)
    }

    /// Report a cancelled turn. `partial` is the size of the text dropped.
    fn cancelled(&self, partial: usize, progress: &dyn ChatProgressNotifier) -> SendOutcome {
        progress.on_cancelled();
        self.conversation_logger
            .log(ConversationEvent::request_cancelled(partial));
        SendOutcome::Cancelled
    }

    /// Append under the lock, re-checking cancellation so a clear that
    /// raced with the end of the stream wins.
    fn append_unless_cancelled(&self, message: &Message, token: &CancellationToken) -> bool {
        let mut state = self.lock();
        if token.is_cancelled() {
            return false;
        }
        state.conversation.push(message.clone());
        self.store.save(&state.conversation);
        true
    }

    /// Free the pending slot if it still belongs to `turn_id`.
    fn release(&self, turn_id: u64) {
        let mut state = self.lock();
        if state.pending.as_ref().is_some_and(|t| t.id == turn_id) {
            state.pending = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
