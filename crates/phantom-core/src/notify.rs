//! Unseen-reply notification signal.
//!
//! Tracks whether an AI reply arrived while the shell was hidden. The
//! title/indicator swap driven by this flag is presentation; the boolean
//! transition rules here are the contract.

/// Whether the hosting surface is currently in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Latches when a reply lands while hidden, clears on return to visible.
#[derive(Debug)]
pub struct NotificationSignal {
    visibility: Visibility,
    has_unseen_reply: bool,
}

impl NotificationSignal {
    pub fn new() -> Self {
        Self {
            visibility: Visibility::Visible,
            has_unseen_reply: false,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn has_unseen_reply(&self) -> bool {
        self.has_unseen_reply
    }

    /// Records a visibility change. Becoming visible clears the flag.
    pub fn visibility_changed(&mut self, visibility: Visibility) {
        if visibility == Visibility::Visible {
            self.has_unseen_reply = false;
        }
        self.visibility = visibility;
    }

    /// Records that an AI reply was appended to the log.
    pub fn reply_appended(&mut self) {
        if self.visibility == Visibility::Hidden {
            self.has_unseen_reply = true;
        }
    }
}

impl Default for NotificationSignal {
    fn default() -> Self {
        Self::new()
    }
}
