use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// One side of an exchange, as remembered for later prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Renders as `<role>: <content>`, the form used in prompts.
impl fmt::Display for ConversationTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// The generated document waiting for the user to confirm a commit.
///
/// `awaiting_confirmation` is only ever true while `content` holds a
/// non-empty document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingArtifact {
    content: Option<String>,
    awaiting_confirmation: bool,
}

impl PendingArtifact {
    /// Replace whatever is pending with `content`. Empty content clears the
    /// artifact instead.
    pub fn replace(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content.trim().is_empty() {
            self.clear();
        } else {
            self.content = Some(content);
            self.awaiting_confirmation = true;
        }
    }

    pub fn clear(&mut self) {
        self.content = None;
        self.awaiting_confirmation = false;
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// The pending content, if it is waiting for confirmation.
    #[must_use]
    pub fn awaiting(&self) -> Option<&str> {
        self.awaiting_confirmation
            .then_some(self.content.as_deref())
            .flatten()
    }
}

/// Everything the service remembers between requests: the ordered transcript
/// and the single pending artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    history: Vec<ConversationTurn>,
    pending: PendingArtifact,
}

impl Conversation {
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    #[must_use]
    pub fn pending(&self) -> &PendingArtifact {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingArtifact {
        &mut self.pending
    }

    /// Append a completed request/response pair to the transcript.
    pub fn record_exchange(&mut self, message: impl Into<String>, reply: impl Into<String>) {
        self.history.push(ConversationTurn::user(message));
        self.history.push(ConversationTurn::assistant(reply));
    }
}
