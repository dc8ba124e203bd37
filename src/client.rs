use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::state::{default_options, MessageBody, SelectionOption, SELECTION_MARKER};

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

/// Reply kind tag. Newer backends send this explicitly; older ones are
/// detected by the marker substring in `response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Plain,
    Selection,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub kind: Option<ReplyKind>,
    #[serde(default)]
    pub options: Vec<SelectionOption>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one user turn to the backend and return the typed reply body.
    ///
    /// Any transport error, non-success status, or malformed payload comes
    /// back as `Err`; the caller substitutes the local fallback reply.
    pub async fn send(&self, message: &str) -> Result<MessageBody> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "assistant request failed with status: {}",
                response.status()
            ));
        }

        let payload: ChatResponse = response.json().await?;
        Ok(parse_reply(payload))
    }
}

/// Convert a wire payload into a typed message body.
///
/// An explicit `kind` tag wins. Without one, the marker substring in the
/// reply text identifies a selection prompt; detection happens once, here,
/// so rendering never re-inspects text.
pub fn parse_reply(payload: ChatResponse) -> MessageBody {
    match payload.kind {
        Some(ReplyKind::Plain) => MessageBody::Plain(payload.response),
        Some(ReplyKind::Selection) => MessageBody::Selection {
            options: non_empty_or_default(payload.options),
        },
        None => body_from_text(&payload.response),
    }
}

/// Classify untagged reply text.
pub fn body_from_text(text: &str) -> MessageBody {
    if text.contains(SELECTION_MARKER) {
        MessageBody::Selection {
            options: non_empty_or_default(parse_option_lines(text)),
        }
    } else {
        MessageBody::Plain(text.to_string())
    }
}

fn non_empty_or_default(options: Vec<SelectionOption>) -> Vec<SelectionOption> {
    if options.is_empty() {
        default_options()
    } else {
        options
    }
}

/// Pull `**Label** - detail` lines out of marker-style prompt text, the
/// format the backend uses when listing choices inline.
fn parse_option_lines(text: &str) -> Vec<SelectionOption> {
    let re = Regex::new(r"(?m)^\s*\*\*(\w+)\*\*\s*-\s*(.+?)\s*$").expect("constant pattern");
    re.captures_iter(text)
        .map(|cap| SelectionOption::new(&cap[1], &cap[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ChatResponse {
        serde_json::from_str(json).expect("valid test payload")
    }

    #[test]
    fn plain_text_stays_plain() {
        let body = parse_reply(payload(r#"{"response": "Algebra is a branch of mathematics."}"#));
        assert_eq!(
            body,
            MessageBody::Plain("Algebra is a branch of mathematics.".to_string())
        );
    }

    #[test]
    fn marker_text_becomes_selection_with_default_options() {
        let body = body_from_text("SELECTION REQUIRED: pick a question mode");
        match body {
            MessageBody::Selection { options } => {
                assert_eq!(options, default_options());
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn marker_anywhere_in_text_is_detected() {
        let body = body_from_text("Great progress so far!\n\nSELECTION REQUIRED: choose");
        assert!(matches!(body, MessageBody::Selection { .. }));
    }

    #[test]
    fn inline_option_lines_are_parsed() {
        let text = "SELECTION REQUIRED:\n**Personalized** - Questions generated specifically for you\n**Authoritative** - Questions from our verified database\n\nType either 'personalized' or 'authoritative'";
        match body_from_text(text) {
            MessageBody::Selection { options } => {
                assert_eq!(options.len(), 2);
                assert_eq!(options[0].label, "Personalized");
                assert_eq!(options[1].detail, "Questions from our verified database");
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn explicit_kind_tag_wins_over_text() {
        // Tagged plain: marker text is rendered literally, no sniffing.
        let body = parse_reply(payload(
            r#"{"response": "the words SELECTION REQUIRED appear here", "kind": "plain"}"#,
        ));
        assert!(matches!(body, MessageBody::Plain(_)));

        let body = parse_reply(payload(
            r#"{"response": "choose", "kind": "selection", "options": [{"label": "Quick", "detail": "short drills"}]}"#,
        ));
        match body {
            MessageBody::Selection { options } => {
                assert_eq!(options.len(), 1);
                assert_eq!(options[0].label, "Quick");
            }
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn tagged_selection_without_options_gets_canonical_pair() {
        let body = parse_reply(payload(r#"{"response": "choose", "kind": "selection"}"#));
        match body {
            MessageBody::Selection { options } => assert_eq!(options, default_options()),
            other => panic!("expected selection, got {other:?}"),
        }
    }
}
