//! Input handling for the player.
//!
//! Turns key presses polled from the display into transport events for the
//! controller in [`crate::player::state::TransportState`].

mod keyboard;

pub use keyboard::handle_key_event;
