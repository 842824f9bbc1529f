//! Application wiring and lifecycle.
//!
//! One process-wide [`App`] owns the repositories, the chat bridge, the
//! notification signal and the shell, and drives the
//! sign-up -> lock -> chat flow. All state mutations are serialized through
//! this single loop; only the provider round trip suspends.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::Colorize;
use phantom_core::account::{CredentialRepository, SignUpError, UserAccount};
use phantom_core::auth::{Authenticator, UnlockMode, UnlockOutcome};
use phantom_core::chat::{ChatBridge, TranscriptRepository};
use phantom_core::config::AppConfig;
use phantom_core::conversation::{ConversationStore, Sweeper};
use phantom_core::message::Sender;
use phantom_core::notify::{NotificationSignal, Visibility};
use phantom_infrastructure::{
    FileCredentialStore, FileMessageStore, FileTranscriptStore, PhantomPaths, SecretStorage,
    load_config,
};
use phantom_interaction::GeminiProvider;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::shell::{self, Shell};

/// Where the flow goes after leaving the chat screen.
enum AfterChat {
    /// Back to the lock screen for the same account.
    Relock,
    /// A manual wipe erased the account; restart from sign-up.
    Wiped,
    Quit,
}

/// Outcome of the lock screen.
enum AfterUnlock {
    Unlocked,
    Wiped,
    Quit,
}

/// Process-wide application state, built once at startup.
pub struct App {
    config: AppConfig,
    credentials: Arc<FileCredentialStore>,
    messages: Arc<FileMessageStore>,
    transcripts: Arc<FileTranscriptStore>,
    bridge: ChatBridge,
    signal: NotificationSignal,
    ephemeral_mode: bool,
    shell: Shell,
}

impl App {
    /// Loads configuration and secrets and wires every component.
    pub fn bootstrap(paths: PhantomPaths, model_override: Option<String>) -> Result<Self> {
        let config = load_config(&paths.config_file())
            .with_context(|| format!("reading {}", paths.config_file().display()))?;

        let secrets = SecretStorage::new(paths.secret_file());
        if secrets.ensure_template()? {
            bail!(
                "created {}; add your Gemini API key there and run again",
                secrets.path().display()
            );
        }
        let secret = secrets.load()?;
        let model = model_override.or_else(|| config.model.clone());
        let provider = GeminiProvider::from_secret(&secret, model.as_deref())?;
        tracing::info!(model = provider.model(), "provider ready");

        let credentials = Arc::new(FileCredentialStore::new(paths.clone()));
        let messages = Arc::new(FileMessageStore::new(paths.messages_file()));
        let transcripts = Arc::new(FileTranscriptStore::new(paths.transcript_file()));

        Ok(Self {
            config,
            credentials,
            messages,
            transcripts,
            bridge: ChatBridge::new(Arc::new(provider)),
            signal: NotificationSignal::new(),
            ephemeral_mode: false,
            shell: Shell::new()?,
        })
    }

    /// Runs the application until the user quits.
    pub async fn run(mut self) -> Result<()> {
        shell::banner();

        'account: loop {
            match self.credentials.load().await {
                None => {
                    if !self.sign_up_screen().await? {
                        break;
                    }
                }
                Some(account) => {
                    // Entering Locked discards the live handle. The
                    // authenticator lives for the whole account session so
                    // an explicit lock keeps its state machine.
                    self.bridge.discard_session();
                    let mut auth = Authenticator::new(self.credentials.clone(), account);

                    loop {
                        match self.lock_screen(&mut auth).await? {
                            AfterUnlock::Unlocked => {
                                match self.chat_screen(&mut auth).await? {
                                    AfterChat::Relock => continue,
                                    AfterChat::Wiped => continue 'account,
                                    AfterChat::Quit => break 'account,
                                }
                            }
                            AfterUnlock::Wiped => continue 'account,
                            AfterUnlock::Quit => break 'account,
                        }
                    }
                }
            }
        }

        shell::info("Goodbye!");
        Ok(())
    }

    /// Account creation. Returns `false` when the user leaves instead.
    async fn sign_up_screen(&mut self) -> Result<bool> {
        self.shell.set_commands(&[]);
        shell::info("Create a secure account to begin.");

        loop {
            let Some(username) = self.shell.read_line("Username: ")? else {
                return Ok(false);
            };
            let Some(password) = self.shell.read_line("Master password: ")? else {
                return Ok(false);
            };
            let Some(login_code) = self.shell.read_line("6-digit login code: ")? else {
                return Ok(false);
            };

            match UserAccount::sign_up(username.trim(), password.trim(), login_code.trim()) {
                Ok(account) => {
                    self.credentials.save(&account).await?;
                    let mut store = ConversationStore::new(self.messages.clone());
                    store.seed_welcome(&account.username).await;
                    shell::info("Account created. The app starts locked.");
                    return Ok(true);
                }
                Err(e @ (SignUpError::MissingFields | SignUpError::InvalidLoginCode)) => {
                    shell::warning(&e.to_string());
                }
            }
        }
    }

    /// The two-mode lock screen with the self-destruct policy.
    async fn lock_screen(&mut self, auth: &mut Authenticator) -> Result<AfterUnlock> {
        self.shell.set_commands(shell::UNLOCK_COMMANDS);
        println!(
            "{}",
            format!("Welcome back, {}", auth.username()).bold()
        );

        loop {
            let hint = match auth.mode() {
                UnlockMode::Code => "Enter your 6-digit code to unlock (/switch for password, /quit)",
                UnlockMode::Password => "Enter your master password (/switch for code, /quit)",
            };
            shell::info(hint);

            let Some(line) = self.shell.read_line("unlock> ")? else {
                return Ok(AfterUnlock::Quit);
            };
            let attempt = line.trim();

            match attempt {
                "" => continue,
                "/quit" => return Ok(AfterUnlock::Quit),
                "/switch" => {
                    // Switching modes drops the pending attempt and resets
                    // the failure counter.
                    auth.switch_mode();
                    continue;
                }
                _ => {}
            }

            match auth.attempt_unlock(auth.mode(), attempt).await? {
                UnlockOutcome::Unlocked => return Ok(AfterUnlock::Unlocked),
                UnlockOutcome::Rejected { attempts_remaining } => {
                    shell::warning("Incorrect, try again.");
                    if attempts_remaining == Some(1) {
                        shell::warning("Warning: 1 attempt remaining before data is erased.");
                    }
                }
                UnlockOutcome::Wiped => {
                    shell::warning(
                        "Too many incorrect attempts. For your security, all application data has been erased.",
                    );
                    return Ok(AfterUnlock::Wiped);
                }
            }
        }
    }

    /// The chat screen for one unlocked session.
    async fn chat_screen(&mut self, auth: &mut Authenticator) -> Result<AfterChat> {
        self.shell.set_commands(shell::CHAT_COMMANDS);

        // Restore the persisted log verbatim; anything stale is gone by the
        // first sweep tick.
        let store = Arc::new(Mutex::new(
            ConversationStore::restore(self.messages.clone()).await,
        ));

        // Seed the handle from the stored transcript when one exists.
        let prior = self.transcripts.load().await;
        self.bridge.create_session(prior);

        let sweeper = Sweeper::spawn(store.clone(), self.config.sweep_interval());

        println!();
        for msg in store.lock().await.messages() {
            shell::render_message(msg);
        }
        shell::info("Type a message, or /help for commands.");

        let outcome = loop {
            let prompt = if self.ephemeral_mode { "\u{2728} > " } else { "> " };
            let Some(line) = self.shell.read_line(prompt)? else {
                break AfterChat::Quit;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match input {
                "/help" => {
                    shell::info("/ephemeral  toggle disappearing messages");
                    shell::info("/away       toggle away status; replies sent while away wait unseen");
                    shell::info("/lock       lock the session");
                    shell::info("/wipe       erase the account and all data");
                    shell::info("/quit       exit");
                }
                "/ephemeral" => {
                    self.ephemeral_mode = !self.ephemeral_mode;
                    shell::info(if self.ephemeral_mode {
                        "Disappearing messages enabled \u{2728}"
                    } else {
                        "Disappearing messages disabled"
                    });
                }
                // The away toggle stands in for the tab visibility change:
                // while away the shell stays Hidden, so a reply landing in
                // that state latches the unseen flag. Toggling back is the
                // "tab became visible" moment that shows the recap.
                "/away" => match self.signal.visibility() {
                    Visibility::Visible => {
                        self.signal.visibility_changed(Visibility::Hidden);
                        shell::info("You are away; replies will wait for you. /away again to return.");
                    }
                    Visibility::Hidden => {
                        let unseen = self.signal.has_unseen_reply();
                        self.signal.visibility_changed(Visibility::Visible);
                        if unseen {
                            shell::info("While you were away, Phantom replied:");
                            if let Some(last) = store
                                .lock()
                                .await
                                .messages()
                                .iter()
                                .rev()
                                .find(|m| m.sender == Sender::Ai)
                            {
                                shell::render_message(last);
                            }
                        } else {
                            shell::info("Welcome back.");
                        }
                    }
                },
                "/lock" => {
                    auth.lock();
                    self.bridge.discard_session();
                    break AfterChat::Relock;
                }
                "/wipe" => {
                    self.wipe_all().await?;
                    shell::warning("All application data has been erased.");
                    break AfterChat::Wiped;
                }
                "/quit" => break AfterChat::Quit,
                text => self.exchange(&store, text).await,
            }
        };

        sweeper.stop();
        Ok(outcome)
    }

    /// Erases every record and drops the live chat handle.
    async fn wipe_all(&mut self) -> Result<()> {
        self.credentials.wipe().await?;
        self.bridge.discard_session();
        Ok(())
    }

    /// One round trip: append the user message, call the provider, append
    /// the reply.
    async fn exchange(&mut self, store: &Arc<Mutex<ConversationStore>>, text: &str) {
        let ttl = self.config.ephemeral_ttl();

        let sent_at = Utc::now();
        let disappear_at = self.ephemeral_mode.then(|| sent_at + ttl);
        {
            let mut store = store.lock().await;
            let msg = store.compose(Sender::User, text, sent_at, disappear_at);
            store.append(msg).await;
        }

        let reply = self.bridge.send(text).await;

        // The reply's expiry starts after the round trip completes, so the
        // two messages expire independently.
        let replied_at = Utc::now();
        let reply_disappear_at = self.ephemeral_mode.then(|| replied_at + ttl);
        let reply_msg = {
            let mut store = store.lock().await;
            let msg = store.compose(Sender::Ai, reply, replied_at, reply_disappear_at);
            store.append(msg.clone()).await;
            msg
        };

        self.signal.reply_appended();
        if let Err(e) = self.transcripts.save(self.bridge.history()).await {
            tracing::warn!("failed to persist chat transcript: {}", e);
        }

        if self.signal.visibility() == Visibility::Visible {
            shell::render_message(&reply_msg);
        } else {
            shell::info("(reply received)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use phantom_core::chat::{ChatProvider, ChatTurn, ProviderError};
    use tempfile::TempDir;

    struct EchoProvider;

    #[async_trait]
    impl ChatProvider for EchoProvider {
        async fn generate(
            &self,
            _system_prompt: &str,
            history: &[ChatTurn],
        ) -> std::result::Result<String, ProviderError> {
            let last = history.last().expect("bridge always sends the user turn");
            Ok(format!("echo: {}", last.text))
        }
    }

    fn test_app(dir: &TempDir) -> App {
        let paths = PhantomPaths::with_root(dir.path());
        App {
            config: AppConfig::default(),
            credentials: Arc::new(FileCredentialStore::new(paths.clone())),
            messages: Arc::new(FileMessageStore::new(paths.messages_file())),
            transcripts: Arc::new(FileTranscriptStore::new(paths.transcript_file())),
            bridge: ChatBridge::new(Arc::new(EchoProvider)),
            signal: NotificationSignal::new(),
            ephemeral_mode: false,
            shell: Shell::new().expect("shell"),
        }
    }

    #[tokio::test]
    async fn test_reply_exchanged_while_away_latches_unseen() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let store = Arc::new(Mutex::new(ConversationStore::new(app.messages.clone())));

        // A message sent while away completes the round trip in the Hidden
        // state, so the reply lands unseen.
        app.signal.visibility_changed(Visibility::Hidden);
        app.exchange(&store, "hi").await;

        assert!(app.signal.has_unseen_reply());
        assert_eq!(store.lock().await.len(), 2);
        assert_eq!(store.lock().await.messages()[1].text, "echo: hi");

        // Returning to visible clears the flag.
        app.signal.visibility_changed(Visibility::Visible);
        assert!(!app.signal.has_unseen_reply());
    }

    #[tokio::test]
    async fn test_reply_exchanged_while_visible_does_not_latch() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let store = Arc::new(Mutex::new(ConversationStore::new(app.messages.clone())));

        app.exchange(&store, "hi").await;
        assert!(!app.signal.has_unseen_reply());
    }

    #[tokio::test]
    async fn test_wipe_discards_the_chat_handle() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let account = UserAccount::sign_up("Ada", "p@ss", "123456").unwrap();
        app.credentials.save(&account).await.unwrap();
        app.bridge.create_session(Some(vec![ChatTurn::user("hi")]));

        app.wipe_all().await.unwrap();

        assert!(!app.bridge.has_session());
        assert!(app.credentials.load().await.is_none());
    }
}
