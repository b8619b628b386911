//! Rendering components for the player.
//!
//! [`FrameDisplay`] is the display service the video loop draws to. The
//! terminal implementation draws frames as half-block cells with a status
//! bar underneath.

mod frame;
mod status;
mod terminal;

use std::time::Duration;

use crossterm::event::KeyEvent;
use image::RgbImage;

use crate::error::Result;

pub use frame::{build_frame, fit_within, render_frame};
pub use status::{build_status_line, format_duration, render_status_bar};
pub use terminal::TerminalDisplay;

/// What the status bar shows for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    /// Name of the playing item
    pub title: String,
    /// Playlist index of the playing item
    pub index: usize,
    /// Playlist length
    pub total: usize,
    pub current_time: f64,
    pub speed_factor: f64,
    pub zoom_factor: f64,
}

/// A window frames are shown in and keys are read from.
///
/// Creating the implementation creates the window; dropping it destroys it.
pub trait FrameDisplay {
    /// Show one display-sized frame.
    fn show(&mut self, frame: &RgbImage, status: &StatusInfo) -> Result<()>;

    /// Wait up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>>;
}
