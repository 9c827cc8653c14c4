//! Key routing for `tui_input` text fields.
//!
//! Maps crossterm key events onto `InputRequest`s directly, so the
//! text fields work regardless of which crossterm version tui-input's
//! own backend bridge was built against.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_input::{Input, InputRequest};

/// Apply a key press to a text input. Returns `true` if the key was
/// consumed as text editing.
pub fn apply_key(input: &mut Input, key: KeyEvent) -> bool {
    let request = match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputRequest::InsertChar(c))
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputRequest::DeletePrevWord)
        }
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    };

    match request {
        Some(request) => {
            input.handle(request);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = Input::default();
        apply_key(&mut input, key(KeyCode::Char('h')));
        apply_key(&mut input, key(KeyCode::Char('i')));
        assert_eq!(input.value(), "hi");

        apply_key(&mut input, key(KeyCode::Backspace));
        assert_eq!(input.value(), "h");
    }

    #[test]
    fn unhandled_keys_are_reported() {
        let mut input = Input::default();
        assert!(!apply_key(&mut input, key(KeyCode::F(1))));
        assert!(!apply_key(
            &mut input,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
    }
}
