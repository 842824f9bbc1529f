//! Message repository trait.
//!
//! Defines the interface for persisting the conversation log snapshot.

use crate::error::Result;
use crate::message::Message;
use async_trait::async_trait;

/// An abstract repository for the conversation log.
///
/// The store persists the full log on every mutation; implementations only
/// need whole-snapshot save and load.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persists the full conversation log, replacing any prior snapshot.
    async fn save(&self, log: &[Message]) -> Result<()>;

    /// Loads the persisted log.
    ///
    /// A corrupt snapshot is treated as absence: implementations clear the
    /// underlying record and return an empty log rather than erroring.
    async fn load(&self) -> Vec<Message>;
}
