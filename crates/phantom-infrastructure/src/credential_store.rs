//! File-backed credential store.
//!
//! Persists the sole account record as `account.json` and implements the
//! destructive wipe across every local record.

use crate::paths::PhantomPaths;
use crate::storage::json_file::{load_json, remove_if_exists, save_json};
use async_trait::async_trait;
use phantom_core::Result;
use phantom_core::account::{CredentialRepository, UserAccount};

/// JSON-file implementation of [`CredentialRepository`].
pub struct FileCredentialStore {
    paths: PhantomPaths,
}

impl FileCredentialStore {
    pub fn new(paths: PhantomPaths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl CredentialRepository for FileCredentialStore {
    async fn save(&self, account: &UserAccount) -> Result<()> {
        save_json(&self.paths.account_file(), account).await
    }

    async fn load(&self) -> Option<UserAccount> {
        match load_json::<UserAccount>(&self.paths.account_file()).await {
            Ok(account) => account,
            Err(e) => {
                // Corrupt account data is treated as absence; clear the
                // record so the next start is a clean sign-up.
                tracing::warn!("account record unreadable ({}), clearing it", e);
                if let Err(e) = remove_if_exists(&self.paths.account_file()).await {
                    tracing::warn!("failed to clear corrupt account record: {}", e);
                }
                None
            }
        }
    }

    async fn wipe(&self) -> Result<()> {
        tracing::info!("wiping all local records");
        remove_if_exists(&self.paths.account_file()).await?;
        remove_if_exists(&self.paths.messages_file()).await?;
        remove_if_exists(&self.paths.transcript_file()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> (PhantomPaths, FileCredentialStore) {
        let paths = PhantomPaths::with_root(dir.path());
        (paths.clone(), FileCredentialStore::new(paths))
    }

    fn ada() -> UserAccount {
        UserAccount::sign_up("Ada", "p@ss", "123456").unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let (_, store) = store(&dir);

        assert!(store.load().await.is_none());
        store.save(&ada()).await.unwrap();
        assert_eq!(store.load().await, Some(ada()));
    }

    #[tokio::test]
    async fn test_save_overwrites_prior_account() {
        let dir = TempDir::new().unwrap();
        let (_, store) = store(&dir);

        store.save(&ada()).await.unwrap();
        let other = UserAccount::sign_up("Grace", "hopper", "654321").unwrap();
        store.save(&other).await.unwrap();
        assert_eq!(store.load().await, Some(other));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_absent_and_cleared() {
        let dir = TempDir::new().unwrap();
        let (paths, store) = store(&dir);

        tokio::fs::create_dir_all(paths.root()).await.unwrap();
        tokio::fs::write(paths.account_file(), "{not json")
            .await
            .unwrap();

        assert!(store.load().await.is_none());
        assert!(!paths.account_file().exists());
    }

    #[tokio::test]
    async fn test_wipe_erases_every_record() {
        let dir = TempDir::new().unwrap();
        let (paths, store) = store(&dir);

        store.save(&ada()).await.unwrap();
        tokio::fs::write(paths.messages_file(), "[]").await.unwrap();
        tokio::fs::write(paths.transcript_file(), "[]").await.unwrap();

        store.wipe().await.unwrap();
        assert!(!paths.account_file().exists());
        assert!(!paths.messages_file().exists());
        assert!(!paths.transcript_file().exists());
    }
}
