//! Terminal presentation: the rustyline prompt and message rendering.
//!
//! This is the UI shell; it renders core state and forwards input, nothing
//! more. Each screen installs its own slash-command set, so completion,
//! hints and highlighting follow the active screen.

use colored::Colorize;
use phantom_core::message::{Message, Sender};
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};

/// Slash commands available in the chat screen.
pub const CHAT_COMMANDS: &[&str] = &[
    "/ephemeral",
    "/away",
    "/lock",
    "/wipe",
    "/help",
    "/quit",
];

/// Slash commands available on the lock screen.
pub const UNLOCK_COMMANDS: &[&str] = &["/switch", "/quit"];

/// Prompt helper for the active screen's slash commands: completion and
/// hints for partial matches, cyan for commands this screen accepts, red
/// for slash input that cannot match anything here.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new(commands: &[&str]) -> Self {
        Self {
            commands: commands.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn matching(&self, prefix: &str) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    fn accepts(&self, line: &str) -> bool {
        let word = line.split_whitespace().next().unwrap_or(line);
        self.commands.iter().any(|cmd| cmd == word) || !self.matching(line).is_empty()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates = self
                .matching(line)
                .into_iter()
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        if self.accepts(line) {
            Owned(line.bright_cyan().to_string())
        } else {
            // Unmatchable on this screen.
            Owned(line.red().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.matching(line)
                .into_iter()
                .find(|cmd| cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// The interactive prompt.
pub struct Shell {
    rl: Editor<CliHelper, DefaultHistory>,
}

impl Shell {
    pub fn new() -> anyhow::Result<Self> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new(&[])));
        Ok(Self { rl })
    }

    /// Installs the slash-command set for the current screen.
    pub fn set_commands(&mut self, commands: &[&str]) {
        if let Some(helper) = self.rl.helper_mut() {
            helper.commands = commands.iter().map(|c| c.to_string()).collect();
        }
    }

    /// Reads one line. `None` means the user asked to leave (Ctrl-C or
    /// Ctrl-D).
    pub fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.rl.readline(prompt) {
            Ok(line) => {
                let _ = self.rl.add_history_entry(&line);
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn banner() {
    println!("{}", "=== Phantom Chat ===".bright_magenta().bold());
    println!("{}", "Your private, disappearing chat".bright_black());
    println!();
}

pub fn info(text: &str) {
    println!("{}", text.bright_black());
}

pub fn warning(text: &str) {
    println!("{}", text.red().bold());
}

/// Renders one conversation message.
pub fn render_message(msg: &Message) {
    let marker = if msg.is_ephemeral() {
        " \u{2728}".yellow().to_string()
    } else {
        String::new()
    };
    let author = match msg.sender {
        Sender::User => "You".green().bold(),
        Sender::Ai => "Phantom".bright_blue().bold(),
    };
    println!("{author}{marker}");
    for line in msg.text.lines() {
        match msg.sender {
            Sender::User => println!("  {}", line.green()),
            Sender::Ai => println!("  {}", line.bright_blue()),
        }
    }
    println!();
}
