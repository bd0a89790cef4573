use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key holding the whole serialized conversation.
pub const STORAGE_KEY: &str = "ai-assistant-messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp,
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp,
        }
    }
}

/// Append-only message log, optionally mirrored to a [`KeyValueStore`].
///
/// Every append rewrites the whole stored value. Persistence failures are
/// logged and never reach the caller.
pub struct MessageStore {
    messages: Vec<Message>,
    backend: Option<Box<dyn KeyValueStore>>,
}

impl MessageStore {
    pub fn in_memory() -> Self {
        Self {
            messages: Vec::new(),
            backend: None,
        }
    }

    /// Loads any saved conversation from `backend`. A missing or corrupt
    /// value yields an empty store.
    pub fn hydrate(backend: Box<dyn KeyValueStore>) -> Self {
        let messages = match backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Message>>(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    log::warn!("Discarding unreadable saved conversation: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read saved conversation: {e}");
                Vec::new()
            }
        };
        log::debug!("Hydrated {} saved messages", messages.len());
        Self {
            messages,
            backend: Some(backend),
        }
    }

    /// Moves the conversation onto another backend, or off persistence when
    /// `backend` is `None`. A non-empty conversation is written to the new
    /// backend; an empty one adopts whatever the new backend holds.
    pub fn replace_backend(&mut self, backend: Option<Box<dyn KeyValueStore>>) {
        match backend {
            Some(backend) if self.messages.is_empty() => *self = Self::hydrate(backend),
            backend => {
                self.backend = backend;
                self.persist();
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.remove(STORAGE_KEY) {
                log::warn!("Failed to remove saved conversation: {e}");
            }
        }
    }

    fn persist(&self) {
        let Some(backend) = &self.backend else { return };
        if self.messages.is_empty() {
            return;
        }
        let json = match serde_json::to_string(&self.messages) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize conversation: {e}");
                return;
            }
        };
        if let Err(e) = backend.set(STORAGE_KEY, &json) {
            log::warn!("Failed to save conversation: {e}");
        }
    }
}
