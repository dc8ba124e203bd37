use std::collections::VecDeque;

use ratatui::layout::Rect;

use crate::client::ChatClient;
use crate::config::Config;
use crate::fallback;
use crate::state::{Message, MessageBody};

/// First message shown on startup. No request is made for it.
pub const GREETING: &str = "Hello! I'm your Education Assistant. How can I help you today?";

/// The input box grows with its content up to this many text rows, then
/// scrolls internally instead of growing further.
pub const MAX_INPUT_ROWS: u16 = 5;

/// Monotonic identifier for one user turn. Completions carry the id of the
/// turn they answer; anything else is stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TurnId(u64);

#[derive(Debug, Clone)]
pub struct Turn {
    pub id: TurnId,
    pub text: String,
}

pub struct App {
    pub should_quit: bool,

    // Conversation. Messages are append-only; the typing indicator is a flag,
    // not a message, so at most one ever exists.
    pub messages: Vec<Message>,
    pub typing: bool,

    // Input control
    pub input: String,
    pub cursor: usize, // char index into input

    // Chat viewport
    pub chat_scroll: u16,
    pub stick_to_bottom: bool,
    pub animation_frame: u8,

    // Footer notice (transcript saved, etc.)
    pub status: Option<String>,

    // Turn sequencing: at most one request in flight, later submissions wait
    // their turn so replies appear in submission order.
    next_turn: u64,
    in_flight: Option<Turn>,
    queued: VecDeque<Turn>,

    // Areas recorded during render for mouse hit-testing
    pub chat_area: Option<Rect>,
    pub option_areas: Vec<(Rect, String)>,

    pub client: ChatClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            should_quit: false,
            messages: Vec::new(),
            typing: false,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            stick_to_bottom: true,
            animation_frame: 0,
            status: None,
            next_turn: 0,
            in_flight: None,
            queued: VecDeque::new(),
            chat_area: None,
            option_areas: Vec::new(),
            client: ChatClient::new(&config.endpoint()),
        };
        app.push_message(Message::bot_text(GREETING));
        app
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.stick_to_bottom = true;
    }

    /// Submit the current input as a user turn.
    ///
    /// Whitespace-only input is a no-op: nothing is appended, nothing is
    /// sent, and the input control is left untouched. Otherwise the user
    /// message is appended immediately; the returned `Turn`, if any, must be
    /// dispatched by the caller. `None` with a non-empty input means the turn
    /// was queued behind the one in flight.
    pub fn submit(&mut self) -> Option<Turn> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.status = None;
        self.push_message(Message::user(text.clone()));
        self.input.clear();
        self.cursor = 0;

        self.next_turn += 1;
        let turn = Turn {
            id: TurnId(self.next_turn),
            text,
        };

        if self.in_flight.is_none() {
            self.begin_turn(turn.clone());
            Some(turn)
        } else {
            self.queued.push_back(turn);
            None
        }
    }

    fn begin_turn(&mut self, turn: Turn) {
        tracing::debug!(turn = turn.id.0, "dispatching turn");
        self.in_flight = Some(turn);
        self.typing = true;
        self.stick_to_bottom = true;
    }

    /// Handle a completed request. The typing indicator is removed before the
    /// bot message is appended. Returns the next queued turn to dispatch, if
    /// any.
    pub fn complete_turn(
        &mut self,
        id: TurnId,
        outcome: anyhow::Result<MessageBody>,
    ) -> Option<Turn> {
        let turn = match self.in_flight.take() {
            Some(turn) if turn.id == id => turn,
            other => {
                self.in_flight = other;
                tracing::warn!(turn = id.0, "discarding stale reply");
                return None;
            }
        };

        self.typing = false;

        let body = match outcome {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(turn = turn.id.0, error = %err, "request failed, using fallback reply");
                MessageBody::Plain(fallback::reply(&turn.text).to_string())
            }
        };
        self.push_message(Message::bot(body));

        let next = self.queued.pop_front()?;
        self.begin_turn(next.clone());
        Some(next)
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Activate a selection option: identical to typing its token and
    /// submitting.
    pub fn activate_option(&mut self, token: &str) -> Option<Turn> {
        self.input = token.to_string();
        self.cursor = self.input.chars().count();
        self.submit()
    }

    // Input editing. Cursor positions are char indices; conversion to byte
    // offsets happens here so multi-byte input stays intact.

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        let char_count = self.input.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Rows the input box needs for its content at `width` columns, capped at
    /// [`MAX_INPUT_ROWS`].
    pub fn input_rows(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let mut rows: u16 = 0;
        for line in self.input.split('\n') {
            let chars = line.chars().count();
            rows += ((chars / width) + 1) as u16;
        }
        rows.clamp(1, MAX_INPUT_ROWS)
    }

    // Chat viewport

    pub fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        // Render clamps to the last page and re-sticks when the bottom is
        // reached.
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }

    /// Advance the typing-indicator animation (driven by Tick events).
    pub fn tick_animation(&mut self) {
        if self.typing {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// The option token under the given screen position, if any.
    pub fn option_at(&self, x: u16, y: u16) -> Option<String> {
        self.option_areas
            .iter()
            .find(|(area, _)| point_in_rect(x, y, *area))
            .map(|(_, token)| token.clone())
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
