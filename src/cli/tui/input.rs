//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::Action;

/// Convert a key event to an Action while browsing pages.
pub fn handle_key_event(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Tab => Some(Action::NextPage),
        KeyCode::Char('1') => Some(Action::Goto("#/home")),
        KeyCode::Char('2') => Some(Action::Goto("#/jobs")),
        KeyCode::Char('3') => Some(Action::Goto("#/profiles")),
        KeyCode::Char('n') => Some(Action::New),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char('a') => Some(Action::Archive),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        _ => None,
    }
}

/// Convert a key event to an Action while a creation form is open.
pub fn handle_form_key_event(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
        KeyCode::Backspace => Some(Action::Erase),
        KeyCode::Char(c) => Some(Action::Input(c)),
        _ => None,
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, form_open: bool) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if form_open {
                handle_form_key_event(key)
            } else {
                handle_key_event(key)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn digits_navigate_by_fragment() {
        assert_eq!(handle_event(key(KeyCode::Char('2')), false), Some(Action::Goto("#/jobs")));
    }

    #[test]
    fn forms_capture_printable_keys() {
        assert_eq!(handle_event(key(KeyCode::Char('q')), true), Some(Action::Input('q')));
        assert_eq!(handle_event(key(KeyCode::Char('q')), false), Some(Action::Quit));
        assert_eq!(handle_event(key(KeyCode::Enter), true), Some(Action::Submit));
    }
}
