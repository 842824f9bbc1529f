//! Credential repository trait.
//!
//! Defines the interface for persisting the sole local account record.

use super::model::UserAccount;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the single local account.
///
/// This trait decouples the authentication logic from the storage mechanism
/// (JSON file in production, in-memory doubles in tests).
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Persists the sole account record, overwriting any prior one.
    async fn save(&self, account: &UserAccount) -> Result<()>;

    /// Returns the stored account, or `None` if absent.
    ///
    /// Corrupt data must be treated as absence: implementations clear the
    /// underlying record as a side effect and return `None` rather than
    /// surfacing an error to the caller.
    async fn load(&self) -> Option<UserAccount>;

    /// Erases all persisted state: the account, the conversation log, and
    /// the provider transcript. After a wipe the host restarts the
    /// application flow from a blank state.
    async fn wipe(&self) -> Result<()>;
}
