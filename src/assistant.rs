use crate::api::client::{reply_text, ChatTransport, TransportError};
use crate::clock::Clock;
use crate::conversation::{Message, MessageStore, Sender};
use crate::markdown::strip_markup;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use thiserror::Error;

pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "How many datanodes are in the cluster?",
    "What is the current state of the cluster?",
    "Are there any unhealthy containers?",
    "What is the storage usage of each datanode?",
    "How many open keys are there?",
    "Show me the pipeline status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("a reply is still pending")]
    Busy,
}

/// Transient feedback the view shows as a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Cleared,
    Copied,
    CopyFailed,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::Cleared => "Conversation cleared",
            Notice::Copied => "Copied to clipboard",
            Notice::CopyFailed => "Failed to copy message",
        }
    }
}

/// Conversation state behind the assistant page.
///
/// A submission is split in two halves so the UI can run the network call
/// elsewhere: [`Assistant::begin`] records the user turn and enters
/// [`ViewState::AwaitingReply`]; [`Assistant::settle`] records the reply (or
/// the fallback text) and returns to [`ViewState::Idle`]. Only one
/// submission can be outstanding at a time.
pub struct Assistant {
    store: MessageStore,
    clock: Arc<dyn Clock>,
    state: ViewState,
}

impl Assistant {
    pub fn new(store: MessageStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == ViewState::AwaitingReply
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Suggested questions, offered only while the conversation is empty.
    pub fn suggestions(&self) -> Option<&'static [&'static str]> {
        self.store.is_empty().then_some(&SUGGESTED_QUESTIONS[..])
    }

    pub fn begin(&mut self, query: &str) -> Result<String, SubmitError> {
        if query.trim().is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        if self.is_busy() {
            log::debug!("Rejecting submit while a reply is pending");
            return Err(SubmitError::Busy);
        }
        self.store.append(Message::user(query, self.clock.now()));
        self.state = ViewState::AwaitingReply;
        Ok(query.to_string())
    }

    /// Records the bot turn for the outstanding submission. Returns `None`
    /// when nothing was outstanding.
    pub fn settle(&mut self, outcome: Result<String, TransportError>) -> Option<&Message> {
        if !self.is_busy() {
            log::warn!("Dropping reply that arrived with no pending query");
            return None;
        }
        let text = reply_text(outcome);
        self.store.append(Message::bot(text, self.clock.now()));
        self.state = ViewState::Idle;
        self.store.last()
    }

    pub async fn submit<T>(&mut self, transport: &T, query: &str) -> Result<&Message, SubmitError>
    where
        T: ChatTransport,
    {
        let query = self.begin(query)?;
        let outcome = transport.send(&query).await;
        // begin() put us in AwaitingReply, so settle always appends.
        self.settle(outcome).ok_or(SubmitError::Busy)
    }

    /// Clears the conversation. Refused while a reply is pending.
    pub fn clear(&mut self) -> Option<Notice> {
        if self.is_busy() {
            return None;
        }
        self.store.clear();
        Some(Notice::Cleared)
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    /// Moves the conversation to another storage backend without losing it.
    /// Refused while a reply is pending.
    pub fn replace_backend(
        &mut self,
        backend: Option<Box<dyn KeyValueStore>>,
    ) -> Result<(), SubmitError> {
        if self.is_busy() {
            return Err(SubmitError::Busy);
        }
        self.store.replace_backend(backend);
        Ok(())
    }

    /// Plain text of the bot message at `index`, for the clipboard.
    pub fn copy_text(&self, index: usize) -> Option<String> {
        self.store
            .messages()
            .get(index)
            .filter(|m| m.sender == Sender::Bot)
            .map(|m| strip_markup(&m.text))
    }
}
