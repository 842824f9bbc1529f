//! The chat session bridge: owns the provider-native conversation handle
//! and round-trips user text through the external AI provider.
//!
//! The bridge is the only suspension point in the application. Provider
//! failures never escape it; callers always get a reply string back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

/// The fixed Phantom persona. The assistant stays concise, friendly and a
/// bit mysterious, and does not volunteer that it is an AI.
pub const PHANTOM_SYSTEM_PROMPT: &str = "You are Phantom, a conversational partner in a secure messaging app called Phantom Chat where messages can disappear. Your conversations are private and leave no trace. Be concise, friendly, and a bit mysterious. Use emojis where appropriate. \u{1f47b} Do not reveal you are an AI unless directly asked.";

/// Shown in place of a reply whenever the provider call fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Role of a turn in the provider-native transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of the provider-native transcript.
///
/// This transcript exists to keep the provider coherent across restarts.
/// It is persisted separately from the visible conversation log and the
/// two may diverge (ephemeral mode, failed turns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Errors from the external AI provider.
///
/// These never leave the bridge; they exist so providers can report what
/// went wrong for logging.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("provider request failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Http {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },
    #[error("provider returned no text in the response")]
    EmptyResponse,
    #[error("failed to parse provider response: {0}")]
    InvalidResponse(String),
}

/// The external conversational-AI collaborator.
///
/// A provider is stateless: the bridge passes the full transcript on every
/// call and owns the history.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generates the next model reply for the given transcript. The last
    /// turn of `history` is the pending user message.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> std::result::Result<String, ProviderError>;
}

/// An abstract repository for the provider-native transcript.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Loads the stored transcript. Absent or invalid data means "start
    /// fresh" and is reported as `None`, never as an error.
    async fn load(&self) -> Option<Vec<ChatTurn>>;

    /// Persists the full transcript, replacing any prior one.
    async fn save(&self, turns: &[ChatTurn]) -> Result<()>;
}

/// The opaque conversation handle: the provider-native transcript bound to
/// one authenticated session.
#[derive(Debug, Default, Clone)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    fn seeded(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }
}

/// Owns the live [`ChatSession`] and performs the provider round trips.
pub struct ChatBridge {
    provider: std::sync::Arc<dyn ChatProvider>,
    session: Option<ChatSession>,
}

impl ChatBridge {
    pub fn new(provider: std::sync::Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            session: None,
        }
    }

    /// Creates the session handle, replacing any existing one.
    ///
    /// `prior_history` re-seeds the provider transcript after a reload;
    /// `None` starts fresh.
    pub fn create_session(&mut self, prior_history: Option<Vec<ChatTurn>>) {
        let turns = prior_history.unwrap_or_default();
        tracing::debug!(seeded_turns = turns.len(), "chat session created");
        self.session = Some(ChatSession::seeded(turns));
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Discards the live handle. Called on every transition into Locked.
    pub fn discard_session(&mut self) {
        self.session = None;
    }

    /// The full turn-by-turn transcript, for persistence only.
    pub fn history(&self) -> &[ChatTurn] {
        self.session.as_ref().map(|s| s.turns.as_slice()).unwrap_or(&[])
    }

    /// Forwards `text` to the provider and returns its reply.
    ///
    /// Never fails: on any provider error the user turn is rolled back from
    /// the transcript and the fixed [`FALLBACK_REPLY`] is returned instead.
    pub async fn send(&mut self, text: &str) -> String {
        let session = self.session.get_or_insert_with(ChatSession::default);
        session.turns.push(ChatTurn::user(text));

        match self
            .provider
            .generate(PHANTOM_SYSTEM_PROMPT, &session.turns)
            .await
        {
            Ok(reply) => {
                session.turns.push(ChatTurn::model(reply.clone()));
                reply
            }
            Err(e) => {
                tracing::warn!("provider call failed: {}", e);
                // A failed call records nothing in the provider transcript.
                session.turns.pop();
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
