//! Playback helpers for the video loop.
//!
//! This module handles frame pacing and the zoom transform.

mod pacing;
mod zoom;

pub use pacing::{frame_interval, FramePacer};
pub use zoom::apply_zoom;
