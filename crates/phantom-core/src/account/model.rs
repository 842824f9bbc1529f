//! UserAccount domain model.
//!
//! Exactly one account exists per installation. The record is created once
//! at sign-up, is immutable afterwards, and is destroyed only by the
//! destructive wipe.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static LOGIN_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("login code pattern is valid"));

/// Validation errors raised during sign-up.
///
/// These are local and recoverable; nothing is persisted until the
/// submitted fields pass validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignUpError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("The login code must be exactly 6 digits.")]
    InvalidLoginCode,
}

/// The sole local account record.
///
/// The password and login code gate access to the locally stored
/// conversation. This is deliberate local-only gating, not a cryptographic
/// security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    /// Exactly six ASCII digits.
    pub login_code: String,
}

impl UserAccount {
    /// Validates the sign-up fields and builds the account record.
    ///
    /// # Errors
    ///
    /// - [`SignUpError::MissingFields`] if any field is blank
    /// - [`SignUpError::InvalidLoginCode`] if the code is not exactly six digits
    pub fn sign_up(
        username: impl Into<String>,
        password: impl Into<String>,
        login_code: impl Into<String>,
    ) -> std::result::Result<Self, SignUpError> {
        let username = username.into();
        let password = password.into();
        let login_code = login_code.into();

        if username.trim().is_empty() || password.trim().is_empty() || login_code.trim().is_empty()
        {
            return Err(SignUpError::MissingFields);
        }
        if !LOGIN_CODE_PATTERN.is_match(&login_code) {
            return Err(SignUpError::InvalidLoginCode);
        }

        Ok(Self {
            username,
            password,
            login_code,
        })
    }
}
