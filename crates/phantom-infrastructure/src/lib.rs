//! File-backed infrastructure for Phantom Chat: the JSON record
//! repositories, secret and config storage, and unified path management.

pub mod config_storage;
pub mod credential_store;
pub mod message_store;
pub mod paths;
pub mod secret_storage;
mod storage;
pub mod transcript_store;

pub use config_storage::load_config;
pub use credential_store::FileCredentialStore;
pub use message_store::FileMessageStore;
pub use paths::PhantomPaths;
pub use secret_storage::{GeminiConfig, SecretConfig, SecretStorage};
pub use transcript_store::FileTranscriptStore;
