//! syncplay - terminal video playlist player with synchronized audio
//!
//! Plays a playlist of videos in the terminal while a separate thread
//! streams each video's audio track, with keyboard control over playlist
//! position, zoom, fast-forward and speed.

pub mod config;
pub mod error;
pub mod media;
pub mod player;

pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
