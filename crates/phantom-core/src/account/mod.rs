//! Account domain: the sole local user record and its repository contract.

pub mod model;
pub mod repository;

pub use model::{SignUpError, UserAccount};
pub use repository::CredentialRepository;
