//! UI-agnostic conversation types
//!
//! These are shared by the renderer, the transcript export, and tests, and
//! don't depend on any terminal framework.

use serde::{Deserialize, Serialize};

/// Marker substring the backend embeds in replies that require the user to
/// choose a question mode.
pub const SELECTION_MARKER: &str = "SELECTION REQUIRED";

/// Instruction line shown inside a selection prompt block.
pub const SELECTION_INSTRUCTION: &str = "Choose your question type:";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// One clickable choice inside a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOption {
    pub label: String,
    #[serde(default)]
    pub detail: String,
}

impl SelectionOption {
    pub fn new(label: &str, detail: &str) -> Self {
        Self {
            label: label.to_string(),
            detail: detail.to_string(),
        }
    }

    /// The text submitted when this option is activated. Activating an
    /// option is equivalent to typing this token and pressing Enter.
    pub fn token(&self) -> String {
        self.label.to_lowercase()
    }
}

/// The canonical pair of question modes the assistant offers.
pub fn default_options() -> Vec<SelectionOption> {
    vec![
        SelectionOption::new("Personalized", "Questions generated specifically for you"),
        SelectionOption::new("Authoritative", "Questions from our verified database"),
    ]
}

/// Message content, tagged at the boundary so rendering never sniffs text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    Plain(String),
    Selection { options: Vec<SelectionOption> },
}

/// A rendered conversation entry. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub body: MessageBody,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            body: MessageBody::Plain(text.into()),
        }
    }

    pub fn bot(body: MessageBody) -> Self {
        Self {
            sender: Sender::Bot,
            body,
        }
    }

    pub fn bot_text(text: impl Into<String>) -> Self {
        Self::bot(MessageBody::Plain(text.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_token_is_lowercase_label() {
        let opt = SelectionOption::new("Personalized", "whatever");
        assert_eq!(opt.token(), "personalized");
    }

    #[test]
    fn default_options_are_the_canonical_pair() {
        let opts = default_options();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].label, "Personalized");
        assert_eq!(opts[1].label, "Authoritative");
    }
}
