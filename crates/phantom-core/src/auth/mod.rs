//! Session authentication: the local lock screen state machine.
//!
//! States move `NoAccount -> Locked -> Unlocked`; `Unlocked -> Locked` on an
//! explicit lock, and `Locked -> NoAccount` only through the destructive
//! wipe. Two failed code attempts erase all local data. That self-destruct
//! is the product's central promise, not an error path.

use crate::account::{CredentialRepository, UserAccount};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;

/// Number of failed code attempts that triggers the wipe.
pub const MAX_CODE_ATTEMPTS: u32 = 2;

/// Which secret is being checked during an unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnlockMode {
    Code,
    Password,
}

impl UnlockMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Code => Self::Password,
            Self::Password => Self::Code,
        }
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No account exists (fresh install, or after a wipe).
    NoAccount,
    /// An account exists and the session is locked.
    Locked,
    Unlocked,
}

/// Result of a single unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The secret matched; the session is now unlocked.
    Unlocked,
    /// The secret did not match. For code mode, `attempts_remaining` counts
    /// down to the wipe; password mode never counts.
    Rejected { attempts_remaining: Option<u32> },
    /// The second code failure landed: all local data has been erased and
    /// the application must restart from a blank state.
    Wiped,
}

/// The stateful lock/unlock flow for the sole local account.
///
/// Holds the transient session state (failure counter, active unlock mode).
/// All of it resets on application start and on explicit lock; only the
/// account record itself is persistent.
pub struct Authenticator {
    credentials: Arc<dyn CredentialRepository>,
    account: UserAccount,
    phase: SessionPhase,
    mode: UnlockMode,
    failed_code_attempts: u32,
}

impl Authenticator {
    /// Starts a locked session for an existing account.
    pub fn new(credentials: Arc<dyn CredentialRepository>, account: UserAccount) -> Self {
        Self {
            credentials,
            account,
            phase: SessionPhase::Locked,
            mode: UnlockMode::Code,
            failed_code_attempts: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> UnlockMode {
        self.mode
    }

    pub fn failed_code_attempts(&self) -> u32 {
        self.failed_code_attempts
    }

    pub fn username(&self) -> &str {
        &self.account.username
    }

    /// Switches between code and password unlock. Resets the failure
    /// counter; the shell clears any pending input alongside.
    pub fn switch_mode(&mut self) -> UnlockMode {
        self.mode = self.mode.toggled();
        self.failed_code_attempts = 0;
        self.mode
    }

    /// Compares `value` against the stored secret for `mode` using exact
    /// string equality.
    ///
    /// A code-mode mismatch increments the failure counter; the counter
    /// reaching [`MAX_CODE_ATTEMPTS`] triggers exactly one wipe. Password
    /// mismatches are never counted.
    pub async fn attempt_unlock(&mut self, mode: UnlockMode, value: &str) -> Result<UnlockOutcome> {
        if self.phase != SessionPhase::Locked {
            return Ok(UnlockOutcome::Rejected {
                attempts_remaining: None,
            });
        }

        let expected = match mode {
            UnlockMode::Code => &self.account.login_code,
            UnlockMode::Password => &self.account.password,
        };

        if value == expected {
            self.phase = SessionPhase::Unlocked;
            self.failed_code_attempts = 0;
            tracing::info!("session unlocked via {} mode", mode);
            return Ok(UnlockOutcome::Unlocked);
        }

        if mode != UnlockMode::Code {
            return Ok(UnlockOutcome::Rejected {
                attempts_remaining: None,
            });
        }

        self.failed_code_attempts += 1;
        if self.failed_code_attempts >= MAX_CODE_ATTEMPTS {
            tracing::warn!("second failed code attempt, erasing all local data");
            self.credentials.wipe().await?;
            self.phase = SessionPhase::NoAccount;
            return Ok(UnlockOutcome::Wiped);
        }

        Ok(UnlockOutcome::Rejected {
            attempts_remaining: Some(MAX_CODE_ATTEMPTS - self.failed_code_attempts),
        })
    }

    /// Explicitly locks the session. The caller discards any live chat
    /// handle on this transition.
    pub fn lock(&mut self) {
        self.phase = SessionPhase::Locked;
        self.failed_code_attempts = 0;
        self.mode = UnlockMode::Code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InMemoryCredentials {
        account: Mutex<Option<UserAccount>>,
        wipes: AtomicUsize,
    }

    impl InMemoryCredentials {
        fn with_account(account: UserAccount) -> Arc<Self> {
            Arc::new(Self {
                account: Mutex::new(Some(account)),
                wipes: AtomicUsize::new(0),
            })
        }

        fn wipe_count(&self) -> usize {
            self.wipes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialRepository for InMemoryCredentials {
        async fn save(&self, account: &UserAccount) -> Result<()> {
            *self.account.lock().unwrap() = Some(account.clone());
            Ok(())
        }

        async fn load(&self) -> Option<UserAccount> {
            self.account.lock().unwrap().clone()
        }

        async fn wipe(&self) -> Result<()> {
            *self.account.lock().unwrap() = None;
            self.wipes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn ada() -> UserAccount {
        UserAccount::sign_up("Ada", "p@ss", "123456").unwrap()
    }

    fn locked_session() -> (Arc<InMemoryCredentials>, Authenticator) {
        let repo = InMemoryCredentials::with_account(ada());
        let auth = Authenticator::new(repo.clone(), ada());
        (repo, auth)
    }

    #[tokio::test]
    async fn test_correct_code_unlocks() {
        let (_, mut auth) = locked_session();
        let outcome = auth.attempt_unlock(UnlockMode::Code, "123456").await.unwrap();
        assert_eq!(outcome, UnlockOutcome::Unlocked);
        assert_eq!(auth.phase(), SessionPhase::Unlocked);
        assert_eq!(auth.failed_code_attempts(), 0);
    }

    #[tokio::test]
    async fn test_correct_password_unlocks() {
        let (_, mut auth) = locked_session();
        let outcome = auth
            .attempt_unlock(UnlockMode::Password, "p@ss")
            .await
            .unwrap();
        assert_eq!(outcome, UnlockOutcome::Unlocked);
    }

    #[tokio::test]
    async fn test_wrong_code_counts_down_to_wipe() {
        let (repo, mut auth) = locked_session();

        let first = auth.attempt_unlock(UnlockMode::Code, "111111").await.unwrap();
        assert_eq!(
            first,
            UnlockOutcome::Rejected {
                attempts_remaining: Some(1)
            }
        );
        assert_eq!(auth.failed_code_attempts(), 1);
        assert_eq!(repo.wipe_count(), 0);

        let second = auth.attempt_unlock(UnlockMode::Code, "222222").await.unwrap();
        assert_eq!(second, UnlockOutcome::Wiped);
        assert_eq!(auth.phase(), SessionPhase::NoAccount);
        assert_eq!(repo.wipe_count(), 1);
        assert!(repo.load().await.is_none());
    }

    #[tokio::test]
    async fn test_wipe_happens_exactly_once() {
        let (repo, mut auth) = locked_session();
        auth.attempt_unlock(UnlockMode::Code, "000000").await.unwrap();
        auth.attempt_unlock(UnlockMode::Code, "000000").await.unwrap();
        // The session left Locked; further attempts are inert.
        let after = auth.attempt_unlock(UnlockMode::Code, "000000").await.unwrap();
        assert_eq!(
            after,
            UnlockOutcome::Rejected {
                attempts_remaining: None
            }
        );
        assert_eq!(repo.wipe_count(), 1);
    }

    #[tokio::test]
    async fn test_password_failures_never_count() {
        let (repo, mut auth) = locked_session();
        for _ in 0..3 {
            let outcome = auth
                .attempt_unlock(UnlockMode::Password, "nope")
                .await
                .unwrap();
            assert_eq!(
                outcome,
                UnlockOutcome::Rejected {
                    attempts_remaining: None
                }
            );
        }
        assert_eq!(auth.failed_code_attempts(), 0);
        assert_eq!(repo.wipe_count(), 0);

        // One code failure after all that still leaves one attempt.
        let outcome = auth.attempt_unlock(UnlockMode::Code, "111111").await.unwrap();
        assert_eq!(
            outcome,
            UnlockOutcome::Rejected {
                attempts_remaining: Some(1)
            }
        );
    }

    #[tokio::test]
    async fn test_switching_mode_resets_the_counter() {
        let (_, mut auth) = locked_session();
        auth.attempt_unlock(UnlockMode::Code, "111111").await.unwrap();
        assert_eq!(auth.failed_code_attempts(), 1);

        assert_eq!(auth.switch_mode(), UnlockMode::Password);
        assert_eq!(auth.failed_code_attempts(), 0);
        assert_eq!(auth.switch_mode(), UnlockMode::Code);

        // The reset counter means two fresh failures are needed to wipe.
        let outcome = auth.attempt_unlock(UnlockMode::Code, "111111").await.unwrap();
        assert_eq!(
            outcome,
            UnlockOutcome::Rejected {
                attempts_remaining: Some(1)
            }
        );
    }

    #[tokio::test]
    async fn test_lock_resets_transient_state() {
        let (_, mut auth) = locked_session();
        auth.attempt_unlock(UnlockMode::Code, "123456").await.unwrap();
        auth.switch_mode();

        auth.lock();
        assert_eq!(auth.phase(), SessionPhase::Locked);
        assert_eq!(auth.mode(), UnlockMode::Code);
        assert_eq!(auth.failed_code_attempts(), 0);
    }
}
