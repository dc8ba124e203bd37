use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{point_in_rect, App, Turn};
use crate::tui::AppEvent;
use crate::{config, transcript};

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse, tx),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply { turn, outcome } => {
            if let Some(next) = app.complete_turn(turn, outcome) {
                dispatch_turn(app, next, tx);
            }
        }
    }
    Ok(())
}

/// Spawn the request task for one turn. The task never touches `App`; it
/// posts its outcome back as an event.
pub fn dispatch_turn(app: &App, turn: Turn, tx: &UnboundedSender<AppEvent>) {
    let client = app.client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = client.send(&turn.text).await;
        let _ = tx.send(AppEvent::Reply {
            turn: turn.id,
            outcome,
        });
    });
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Enter sends; Shift+Enter / Alt+Enter inserts a newline.
        KeyCode::Enter => {
            if key.modifiers.contains(KeyModifiers::SHIFT)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                app.insert_newline();
            } else if let Some(turn) = app.submit() {
                dispatch_turn(app, turn, tx);
            }
        }

        // Transcript export
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            save_transcript(app);
        }

        // Chat scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_to_bottom(),

        // Input editing
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete_forward(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.insert_char(c)
        }

        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, tx: &UnboundedSender<AppEvent>) {
    let x = mouse.column;
    let y = mouse.row;
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(x, y, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::Down(MouseButton::Left) => {
            // Clicking a selection option submits its token as a turn.
            if let Some(token) = app.option_at(x, y) {
                if let Some(turn) = app.activate_option(&token) {
                    dispatch_turn(app, turn, tx);
                }
            }
        }
        _ => {}
    }
}

fn save_transcript(app: &mut App) {
    let saved = config::transcript_path()
        .and_then(|path| transcript::save(&app.messages, &path).map(|()| path));
    match saved {
        Ok(path) => {
            tracing::info!(path = %path.display(), "transcript saved");
            app.status = Some(format!("Transcript saved to {}", path.display()));
        }
        Err(err) => {
            tracing::error!(error = %err, "transcript export failed");
            app.status = Some(format!("Could not save transcript: {err}"));
        }
    }
}
