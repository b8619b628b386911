//! Keyboard input handling for the player.
//!
//! Maps key presses to transport events. The bindings follow the classic
//! WASD-style layout: `a`/`d` step through the playlist, `w`/`s` zoom,
//! `c` skips forward, `p` toggles speed and `q` quits. Ctrl-C interrupts
//! the whole run.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::player::state::TransportEvent;

/// Translate a key event into a transport event.
///
/// Returns `None` for unbound keys and for key releases/repeats reported by
/// terminals with enhanced keyboard support.
pub fn handle_key_event(key: KeyEvent) -> Option<TransportEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        // === Quit ===
        KeyCode::Char('q') | KeyCode::Esc => Some(TransportEvent::Quit),
        // Raw mode delivers Ctrl-C as a key instead of SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TransportEvent::Interrupt)
        }

        // === Playlist navigation ===
        KeyCode::Char('a') => Some(TransportEvent::Previous),
        KeyCode::Char('d') => Some(TransportEvent::Next),

        // === Zoom ===
        KeyCode::Char('w') => Some(TransportEvent::ZoomIn),
        KeyCode::Char('s') => Some(TransportEvent::ZoomOut),

        // === Seeking and speed ===
        KeyCode::Char('c') => Some(TransportEvent::FastForward),
        KeyCode::Char('p') => Some(TransportEvent::ToggleSpeed),

        _ => None,
    }
}
