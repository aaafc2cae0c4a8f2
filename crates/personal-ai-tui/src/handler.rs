use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use personal_ai_core::chat::MAX_INPUT_CHARS;
use personal_ai_core::FieldName;

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line editing shared by the form fields and the chat input.
/// Returns true if the text changed.
fn edit_line(
    text: &mut String,
    cursor: &mut usize,
    key: KeyEvent,
    max_chars: Option<usize>,
) -> bool {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
                return true;
            }
        }
        KeyCode::Delete => {
            let char_count = text.chars().count();
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
                return true;
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = text.chars().count();
            *cursor = (*cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = text.chars().count();
        }
        KeyCode::Char(c) => {
            if max_chars.is_some_and(|max| text.chars().count() >= max) {
                return false;
            }
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
            return true;
        }
        _ => {}
    }
    false
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Validate(field) => app.recheck_field(field),
        AppEvent::ReplyReady => app.deliver_reply(),
        AppEvent::Welcome => app.deliver_welcome(),
        AppEvent::SubmitReady => app.finish_submission(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (app.screen, app.input_mode) {
        (Screen::Train, InputMode::Normal) => handle_train_normal(app, key),
        (Screen::Train, InputMode::Editing) => handle_train_editing(app, key),
        (Screen::Chat, InputMode::Normal) => handle_chat_normal(app, key),
        (Screen::Chat, InputMode::Editing) => handle_chat_editing(app, key),
    }
}

fn handle_train_normal(app: &mut App, key: KeyEvent) {
    if app.train_view.success {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') | KeyCode::Enter => app.screen = Screen::Chat,
            KeyCode::Char('r') => app.restart_training(),
            _ => {}
        }
        return;
    }

    // Form is locked while "Processing..."
    if app.train_view.submitting {
        if key.code == KeyCode::Char('q') {
            app.should_quit = true;
        }
        return;
    }

    let on_style_step = app.current_field() == Some(FieldName::Style);

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Screen switching
        KeyCode::Char('c') => {
            app.screen = Screen::Chat;
            app.refresh_send_control();
        }

        // Step navigation
        KeyCode::Char('n') | KeyCode::Tab | KeyCode::Right => app.form_forward(),
        KeyCode::Char('p') | KeyCode::BackTab | KeyCode::Left => app.form_previous(),

        // Style picker
        KeyCode::Char('j') | KeyCode::Down if on_style_step => app.style_nav_down(),
        KeyCode::Char('k') | KeyCode::Up if on_style_step => app.style_nav_up(),
        KeyCode::Enter if on_style_step => app.form_forward(),

        // Edit the current field
        KeyCode::Char('i') | KeyCode::Enter => app.start_editing(),

        _ => {}
    }
}

fn handle_train_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.finish_editing(),
        KeyCode::Enter => {
            app.finish_editing();
            app.form_forward();
        }
        KeyCode::Tab => {
            app.finish_editing();
            app.form_forward();
        }
        KeyCode::BackTab => {
            app.finish_editing();
            app.form_previous();
        }
        _ => {
            let mut value = app.current_value().to_string();
            let mut cursor = app.field_cursor;
            let changed = edit_line(&mut value, &mut cursor, key, None);
            app.field_cursor = cursor;
            if changed {
                app.set_current_value(value);
            }
        }
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('t') => {
            app.screen = Screen::Train;
        }

        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }

        // Suggestion prompts
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.send_suggestion(index);
        }

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Shift+Enter would be a newline in a browser; single-line here
            if app.chat_view.send_enabled {
                app.send_message();
            }
        }
        _ => {
            edit_line(&mut app.chat_input, &mut app.chat_cursor, key, Some(MAX_INPUT_CHARS));
        }
    }
    app.refresh_send_control();
}
