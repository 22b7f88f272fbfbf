use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::Task(outcome) => app.apply(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_model_picker {
        handle_model_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => match app.focus {
            FocusPane::Search => handle_search_editing(app, key),
            _ => handle_message_editing(app, key),
        },
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => app.select_model(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Any key other than a repeated `d` disarms a pending delete
    if key.code != KeyCode::Char('d') {
        app.cancel_pending_delete();
    }

    let in_sidebar = matches!(app.focus, FocusPane::Conversations | FocusPane::Search);

    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            if in_sidebar {
                app.conversation_nav_down();
            } else {
                app.scroll_chat_down(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if in_sidebar {
                app.conversation_nav_up();
            } else {
                app.scroll_chat_up(1);
            }
        }
        KeyCode::Char('g') => {
            if in_sidebar {
                app.conversation_nav_first();
            } else {
                app.scroll_chat_top();
            }
        }
        KeyCode::Char('G') => {
            if in_sidebar {
                app.conversation_nav_last();
            } else {
                app.scroll_chat_to_bottom();
            }
        }

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up((app.chat_height / 2).max(1));
        }
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1)),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1)),

        KeyCode::Enter => {
            if in_sidebar {
                app.switch_to_highlighted();
            } else {
                start_editing(app);
            }
        }
        KeyCode::Char('i') => start_editing(app),

        KeyCode::Tab => app.cycle_focus(),

        // Conversation management
        KeyCode::Char('n') => app.new_conversation(),
        KeyCode::Char('r') => {
            app.reload_history();
            app.refresh_conversations();
        }
        KeyCode::Char('d') => {
            if in_sidebar && !app.sidebar_collapsed {
                app.delete_highlighted();
            }
        }
        KeyCode::Char('[') => app.prev_page(),
        KeyCode::Char(']') => app.next_page(),
        KeyCode::Char('/') => {
            if app.sidebar_collapsed {
                app.toggle_sidebar();
            }
            app.focus = FocusPane::Search;
            app.input_mode = InputMode::Editing;
        }

        // View
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('b') => app.toggle_sidebar(),
        KeyCode::Char('m') => app.open_model_picker(),
        KeyCode::Char('x') => app.dismiss_banner(),
        KeyCode::Esc => {
            if !app.search_filter.is_empty() {
                app.clear_search();
            } else {
                app.dismiss_banner();
            }
        }

        _ => {}
    }
}

fn start_editing(app: &mut App) {
    app.focus = FocusPane::Input;
    app.input_mode = InputMode::Editing;
    app.input_cursor = app.input.chars().count();
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.apply_search_now();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                app.search_changed(Instant::now());
            }
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.search_changed(Instant::now());
        }
        _ => {}
    }
}

fn handle_message_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send_message();
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Position-based scrolling
    let in_list = app.list_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else if in_list {
                app.conversation_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else if in_list {
                app.conversation_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("hello", 2), 2);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
        assert_eq!(char_to_byte_index("", 0), 0);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
