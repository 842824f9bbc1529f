//! The conversation store: an ordered, append-only message log with
//! per-message optional expiry, persisted across restarts.

pub mod repository;
pub mod sweeper;

pub use repository::MessageRepository;
pub use sweeper::Sweeper;

use crate::message::{INITIAL_MESSAGE_ID, Message, MessageIdGenerator, Sender};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Removes every expired message from `log`.
///
/// A message is retained when it has no `disappear_at`, when its
/// `disappear_at` is still in the future, or when it is the seeded
/// `"initial"` message. Pure function of `(log, now)`; applying it twice
/// with the same `now` yields the same result.
pub fn sweep_expired(log: &[Message], now: DateTime<Utc>) -> Vec<Message> {
    log.iter()
        .filter(|msg| {
            if msg.id == INITIAL_MESSAGE_ID {
                return true;
            }
            match msg.disappear_at {
                None => true,
                Some(at) => at > now,
            }
        })
        .cloned()
        .collect()
}

/// Owns the in-memory conversation log and mirrors it to storage.
///
/// The in-memory log is authoritative for the current session: persistence
/// failures are logged and swallowed, never surfaced to the caller.
pub struct ConversationStore {
    messages: Vec<Message>,
    repository: Arc<dyn MessageRepository>,
    ids: MessageIdGenerator,
}

impl ConversationStore {
    /// Creates an empty store (sign-up path).
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self {
            messages: Vec::new(),
            repository,
            ids: MessageIdGenerator::new(),
        }
    }

    /// Restores the previously persisted log verbatim (login path).
    ///
    /// Expired-but-not-yet-swept messages may reappear until the next sweep
    /// tick; that is expected behavior.
    pub async fn restore(repository: Arc<dyn MessageRepository>) -> Self {
        let messages = repository.load().await;
        Self {
            messages,
            repository,
            ids: MessageIdGenerator::new(),
        }
    }

    /// Seeds the permanent AI welcome message for a freshly created account.
    pub async fn seed_welcome(&mut self, username: &str) {
        self.append(Message::welcome(username)).await;
    }

    /// Read view of the log, in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Builds a message with the next creation-time-derived id.
    pub fn compose(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        now: DateTime<Utc>,
        disappear_at: Option<DateTime<Utc>>,
    ) -> Message {
        Message {
            id: self.ids.next_id(now),
            text: text.into(),
            sender,
            disappear_at,
        }
    }

    /// Appends to the tail of the log and persists the full snapshot.
    ///
    /// Never fails: a storage error leaves the in-memory log as the
    /// authority for the rest of the session.
    pub async fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.persist().await;
    }

    /// Applies [`sweep_expired`] at `now`; persists only when the log
    /// changed. Returns whether anything was evicted.
    pub async fn sweep(&mut self, now: DateTime<Utc>) -> bool {
        let swept = sweep_expired(&self.messages, now);
        if swept.len() == self.messages.len() {
            return false;
        }
        let evicted = self.messages.len() - swept.len();
        tracing::debug!(target: "sweeper", evicted, "evicted expired messages");
        self.messages = swept;
        self.persist().await;
        true
    }

    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.messages).await {
            tracing::warn!("failed to persist conversation log: {}", e);
        }
    }
}
