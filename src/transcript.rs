//! HTML transcript export.
//!
//! Renders the conversation the same way the assistant's web widget does:
//! sender-tagged message containers, escaped text with newlines as `<br>`,
//! and structured blocks for selection prompts.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::state::{Message, MessageBody, Sender, SELECTION_INSTRUCTION, SELECTION_MARKER};

/// Escape HTML special characters and convert newlines to `<br>`.
///
/// Single pass: already-escaped text gets escaped again, so reversing the
/// escaping once recovers the original text exactly.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one message as a sender-tagged container.
pub fn render_message(message: &Message) -> String {
    let sender_class = match message.sender {
        Sender::User => "user-message",
        Sender::Bot => "bot-message",
    };

    let bubble = match &message.body {
        MessageBody::Plain(text) => format!(
            r#"<div class="message-bubble">{}</div>"#,
            escape_html(text)
        ),
        MessageBody::Selection { options } => {
            let mut inner = String::new();
            inner.push_str(&format!("<strong>{SELECTION_MARKER}:</strong>"));
            inner.push_str(&format!(
                r#"<div class="selection-required">{SELECTION_INSTRUCTION}</div>"#
            ));
            for opt in options {
                inner.push_str(&format!(
                    r#"<div class="option"><strong>{}</strong> - {}</div>"#,
                    escape_html(&opt.label),
                    escape_html(&opt.detail)
                ));
            }
            let tokens: Vec<String> = options
                .iter()
                .map(|o| format!("<strong>\"{}\"</strong>", escape_html(&o.token())))
                .collect();
            inner.push_str(&format!(
                r#"<div class="selection-footer">Please respond with either {}.</div>"#,
                tokens.join(" or ")
            ));
            format!(r#"<div class="message-bubble selection-message-bubble">{inner}</div>"#)
        }
    };

    format!(r#"<div class="message {sender_class}">{bubble}</div>"#)
}

/// Render the whole conversation as a standalone HTML page.
pub fn render_page(messages: &[Message]) -> String {
    let mut body = String::new();
    for message in messages {
        body.push_str(&render_message(message));
        body.push('\n');
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Education Assistant transcript</title>
<style>
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#f5f5f5;margin:0;padding:20px}}
.message{{display:flex;margin:10px 0}}
.message.user-message{{justify-content:flex-end}}
.message-bubble{{max-width:70%;padding:10px 14px;border-radius:12px;background:#fff;border:1px solid #ddd;white-space:normal}}
.user-message .message-bubble{{background:#d7ecff}}
.selection-required{{margin:8px 0;font-weight:600}}
.option{{margin:4px 0;padding:6px 10px;border:1px solid #bbb;border-radius:8px;background:#fafafa}}
.selection-footer{{margin-top:10px}}
</style>
</head>
<body>
{body}</body>
</html>
"##
    )
}

/// Write the conversation to `path`, creating parent directories as needed.
pub fn save(messages: &[Message], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_page(messages))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::default_options;

    #[test]
    fn escapes_html_special_characters_and_newlines() {
        let escaped = escape_html("a < b & b > c\nnext \"line\"");
        assert_eq!(
            escaped,
            "a &lt; b &amp; b &gt; c<br>next &quot;line&quot;"
        );
    }

    #[test]
    fn escaping_is_single_pass() {
        // Re-escaping escaped text escapes the ampersands again.
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn unescaping_recovers_the_original_text() {
        let original = "1 < 2 && 3 > 2\n\"quoted\"";
        let unescaped = escape_html(original)
            .replace("<br>", "\n")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");
        assert_eq!(unescaped, original);
    }

    #[test]
    fn user_message_is_tagged_and_escaped() {
        let html = render_message(&Message::user("<script>alert(1)</script>"));
        assert!(html.contains("user-message"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn selection_prompt_renders_structured_block() {
        let html = render_message(&Message::bot(MessageBody::Selection {
            options: default_options(),
        }));
        assert!(html.contains("selection-message-bubble"));
        assert!(html.contains("SELECTION REQUIRED"));
        assert!(html.contains("Choose your question type:"));
        assert!(html.contains("<strong>Personalized</strong>"));
        assert!(html.contains("<strong>Authoritative</strong>"));
        assert!(html.contains("\"personalized\""));
    }

    #[test]
    fn save_writes_a_full_page() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("transcripts/chat.html");
        let messages = vec![Message::bot_text("Hello!"), Message::user("hi & bye")];
        save(&messages, &path).expect("save transcript");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("<!DOCTYPE html>"));
        assert!(written.contains("bot-message"));
        assert!(written.contains("hi &amp; bye"));
    }
}
