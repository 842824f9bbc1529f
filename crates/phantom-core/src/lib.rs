//! Core domain of Phantom Chat: account and credential gating, the
//! lock-screen authenticator, the disappearing-message conversation store
//! and sweeper, the chat session bridge, and the unseen-reply signal.
//!
//! Storage and provider implementations live in `phantom-infrastructure`
//! and `phantom-interaction`; this crate only defines their contracts.

pub mod account;
pub mod auth;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod notify;

pub use error::{PhantomError, Result};
