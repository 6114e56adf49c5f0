//! Keystroke input handling using crossterm
//!
//! Features:
//! - Polling keystroke capture
//! - Unicode character support (accented answers)
//! - Key bindings for check, skip, table toggle, restart and exit

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::Duration;

/// What a keystroke asks the session to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Append a character to the answer
    Char(char),
    Backspace,
    /// Enter: check the answer, or advance once checked
    Submit,
    /// Tab: move on without answering
    Skip,
    /// Ctrl+L: show or hide the performance table
    ToggleTable,
    /// Ctrl+R: reload catalog and ledger from disk
    Restart,
    /// Esc or Ctrl+C
    Exit,
    Ignore,
}

/// Handles user input from terminal
pub struct InputHandler {
    /// Timeout for poll operations (milliseconds)
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create new input handler with default timeout (50ms for responsive input)
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    /// Enable raw mode for terminal input
    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    /// Poll for a key press with timeout.
    /// Returns None on timeout or for non-key and key-release events.
    pub fn read_key(&self) -> IoResult<Option<KeyEvent>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                event::Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key)),
                _ => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    /// Map a key event to a session action
    pub fn classify(key: &KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => KeyAction::Exit,
            KeyCode::Char('l') if ctrl => KeyAction::ToggleTable,
            KeyCode::Char('r') if ctrl => KeyAction::Restart,
            KeyCode::Esc => KeyAction::Exit,
            KeyCode::Enter => KeyAction::Submit,
            KeyCode::Tab => KeyAction::Skip,
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                KeyAction::Char(c)
            }
            _ => KeyAction::Ignore,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
