//! Conversation message types.
//!
//! A message is owned exclusively by the conversation store; the shell only
//! ever holds a read view. Messages may carry an optional expiry timestamp
//! (`disappear_at`) after which the sweep evicts them from the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// The id of the seeded welcome message. It is never evicted, regardless of
/// any `disappear_at` value.
pub const INITIAL_MESSAGE_ID: &str = "initial";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A single entry in the visible conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, creation-time-derived id (epoch millis as a decimal string),
    /// monotonically increasing within a session.
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Absent means the message is permanent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disappear_at: Option<DateTime<Utc>>,
}

impl Message {
    /// The permanent AI welcome message seeded at sign-up.
    pub fn welcome(username: &str) -> Self {
        Self {
            id: INITIAL_MESSAGE_ID.to_string(),
            text: format!(
                "Welcome to Phantom Chat, {username} \u{1f47b}\nMessages can be set to disappear. Toggle ephemeral mode to try it out!"
            ),
            sender: Sender::Ai,
            disappear_at: None,
        }
    }

    /// Whether this message is ephemeral.
    pub fn is_ephemeral(&self) -> bool {
        self.disappear_at.is_some()
    }
}

/// Issues creation-time-derived message ids.
///
/// Ids are the creation timestamp in epoch millis; when two messages are
/// created within the same millisecond the generator bumps past the last
/// issued value so ids stay strictly increasing within a session.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last_millis: i64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id for a message created at `now`.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().max(self.last_millis + 1);
        self.last_millis = millis;
        millis.to_string()
    }
}
