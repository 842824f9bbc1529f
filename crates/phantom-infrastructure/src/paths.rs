//! Unified path management for Phantom Chat's local records.
//!
//! All persisted state lives under one application directory so a wipe can
//! account for every record.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/phantom/           # Config directory (platform-specific)
//! ├── account.json             # The sole UserAccount record
//! ├── messages.json            # ConversationLog snapshot
//! ├── chat_history.json        # Provider-native transcript
//! ├── secret.json              # Gemini API key (template created on first run)
//! └── config.toml              # Optional app settings
//! ```

use phantom_core::{PhantomError, Result};
use std::path::{Path, PathBuf};

/// Resolves the on-disk location of every persisted record.
#[derive(Debug, Clone)]
pub struct PhantomPaths {
    root: PathBuf,
}

impl PhantomPaths {
    /// Uses the platform config directory (e.g. `~/.config/phantom/`).
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| PhantomError::config("cannot determine the config directory"))?;
        Ok(Self {
            root: base.join("phantom"),
        })
    }

    /// Uses a custom root directory (tests, `--data-dir`).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn account_file(&self) -> PathBuf {
        self.root.join("account.json")
    }

    pub fn messages_file(&self) -> PathBuf {
        self.root.join("messages.json")
    }

    pub fn transcript_file(&self) -> PathBuf {
        self.root.join("chat_history.json")
    }

    pub fn secret_file(&self) -> PathBuf {
        self.root.join("secret.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_live_under_the_root() {
        let paths = PhantomPaths::with_root("/tmp/phantom-test");
        for file in [
            paths.account_file(),
            paths.messages_file(),
            paths.transcript_file(),
            paths.secret_file(),
            paths.config_file(),
        ] {
            assert!(file.starts_with(paths.root()));
        }
    }

    #[test]
    fn test_default_root_ends_with_app_dir() {
        if let Ok(paths) = PhantomPaths::new() {
            assert!(paths.root().ends_with("phantom"));
        }
    }
}
