use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::state::{MessageBody, Sender, SELECTION_INSTRUCTION, SELECTION_MARKER};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // The input box auto-sizes with its content (plus borders), capped by
    // App::input_rows; the chat takes the rest.
    let input_rows = app.input_rows(area.width.saturating_sub(2));
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Education Assistant ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Conversation ");
    let inner = block.inner(area);
    app.chat_area = Some(inner);

    let width = inner.width.max(1) as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();
    // (line index, option token) pairs collected while building lines
    let mut option_rows: Vec<(usize, String)> = Vec::new();

    for message in &app.messages {
        push_message_lines(message.sender, &message.body, width, &mut lines, &mut option_rows);
    }

    if app.typing {
        lines.push(role_line(Sender::Bot));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::default());
    }

    let total = lines.len() as u16;
    let visible = inner.height;
    let max_scroll = total.saturating_sub(visible);
    if app.stick_to_bottom {
        app.chat_scroll = max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(max_scroll);
        if app.chat_scroll == max_scroll {
            app.stick_to_bottom = true;
        }
    }

    // Absolute screen rows for the clickable options currently on screen.
    app.option_areas.clear();
    for (idx, token) in option_rows {
        let idx = idx as u16;
        if idx >= app.chat_scroll && idx < app.chat_scroll + visible {
            let row = inner.y + (idx - app.chat_scroll);
            let rect = Rect::new(inner.x, row, inner.width, 1);
            app.option_areas.push((rect, token));
        }
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn role_line(sender: Sender) -> Line<'static> {
    match sender {
        Sender::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Sender::Bot => Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Green).bold(),
        )),
    }
}

fn push_message_lines(
    sender: Sender,
    body: &MessageBody,
    width: usize,
    lines: &mut Vec<Line<'static>>,
    option_rows: &mut Vec<(usize, String)>,
) {
    lines.push(role_line(sender));

    match body {
        MessageBody::Plain(text) => {
            for logical in text.split('\n') {
                let clean = sanitize(logical);
                for chunk in hard_wrap(&clean, width) {
                    if sender == Sender::Bot {
                        lines.push(parse_markdown_line(&chunk));
                    } else {
                        lines.push(Line::from(chunk));
                    }
                }
            }
        }
        MessageBody::Selection { options } => {
            lines.push(Line::from(Span::styled(
                format!("{SELECTION_MARKER}:"),
                Style::default().fg(Color::Yellow).bold(),
            )));
            lines.push(Line::from(SELECTION_INSTRUCTION.to_string()));
            for opt in options {
                option_rows.push((lines.len(), opt.token()));
                lines.push(Line::from(vec![
                    Span::raw("  ▸ "),
                    Span::styled(
                        opt.label.clone(),
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    ),
                    Span::raw(" - "),
                    Span::styled(opt.detail.clone(), Style::default().fg(Color::Gray)),
                ]));
            }
            let tokens: Vec<String> = options.iter().map(|o| format!("\"{}\"", o.token())).collect();
            for chunk in hard_wrap(
                &format!("Please respond with either {} (or click one).", tokens.join(" or ")),
                width,
            ) {
                lines.push(Line::from(chunk));
            }
        }
    }

    lines.push(Line::default());
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Message ");
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;

    let mut rows: Vec<Line> = Vec::new();
    for logical in app.input.split('\n') {
        for chunk in hard_wrap(logical, width) {
            rows.push(Line::from(chunk));
        }
    }

    // Keep the cursor row visible once content exceeds the box height.
    let (cursor_row, cursor_col) = cursor_position(&app.input, app.cursor, width);
    let input_scroll = cursor_row.saturating_sub(inner.height.saturating_sub(1));

    let input = Paragraph::new(Text::from(rows))
        .block(block)
        .scroll((input_scroll, 0));
    frame.render_widget(input, area);

    frame.set_cursor_position((
        inner.x + cursor_col.min(inner.width.saturating_sub(1)),
        inner.y + (cursor_row - input_scroll).min(inner.height.saturating_sub(1)),
    ));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(status) = &app.status {
        let notice = Paragraph::new(Line::from(Span::styled(
            format!(" {status} "),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )));
        frame.render_widget(notice, area);
        return;
    }

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Shift+Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Ctrl+T ", key_style),
        Span::styled(" transcript ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];
    if app.is_awaiting_reply() {
        hints.push(Span::styled(
            " awaiting reply ",
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Hard-wrap one logical line into `width`-column rows. A line whose length
/// is an exact multiple of the width gets a trailing empty row, matching the
/// row math in `App::input_rows` and `cursor_position`.
fn hard_wrap(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = line.chars().collect();
    (0..=(chars.len() / width))
        .map(|row| {
            let start = row * width;
            let end = (start + width).min(chars.len());
            chars[start..end].iter().collect()
        })
        .collect()
}

/// Strip terminal control characters so message text renders literally.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Row and column of the cursor within the wrapped input, in char cells.
fn cursor_position(input: &str, cursor: usize, width: usize) -> (u16, u16) {
    let width = width.max(1);
    let mut row: usize = 0;
    let mut remaining = cursor;

    for line in input.split('\n') {
        let count = line.chars().count();
        if remaining <= count {
            row += remaining / width;
            return (row as u16, (remaining % width) as u16);
        }
        row += count / width + 1;
        remaining -= count + 1; // consume the newline too
    }

    (row.saturating_sub(1) as u16, 0)
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some((_, c)) = chars.next() {
                if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_wrap_splits_at_width() {
        assert_eq!(hard_wrap("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(hard_wrap("", 4), vec![""]);
        // Exact multiple gets the trailing empty row.
        assert_eq!(hard_wrap("abcd", 4), vec!["abcd", ""]);
    }

    #[test]
    fn cursor_position_tracks_newlines_and_wrapping() {
        // "ab\ncd", cursor after 'd' (char index 5): second logical line,
        // column 2.
        assert_eq!(cursor_position("ab\ncd", 5, 10), (1, 2));
        // Cursor at start.
        assert_eq!(cursor_position("ab\ncd", 0, 10), (0, 0));
        // Wrapped line: cursor at index 6 of an 8-char line with width 4.
        assert_eq!(cursor_position("abcdefgh", 6, 4), (1, 2));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize("a\u{1b}[31mb"), "a[31mb");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn markdown_bold_becomes_styled_span() {
        let line = parse_markdown_line("a **bold** word");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
    }
}
