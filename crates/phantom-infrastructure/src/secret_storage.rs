//! Secret configuration file storage (`secret.json`).
//!
//! Read-only holder of the Gemini API key. A template file is created on
//! first run so the user knows where the key goes.
//!
//! # Security Note
//!
//! This is plaintext JSON; the file is created with 600 permissions on
//! Unix. The key is never logged.

use phantom_core::{PhantomError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gemini provider credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Contents of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
}

/// Loader for the secret configuration file.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and parses the secret file.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable, or not valid JSON. The
    /// error message never contains the key material.
    pub fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Err(PhantomError::config(format!(
                "secret file not found at {}",
                self.path.display()
            )));
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Creates a template secret file if none exists, and returns whether a
    /// template was written.
    ///
    /// Sets 600 permissions on Unix.
    pub fn ensure_template(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some("gemini-2.5-flash".to_string()),
            }),
        };
        let json = serde_json::to_string_pretty(&template)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(true)
    }
}
