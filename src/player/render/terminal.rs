//! Terminal display window.
//!
//! The "window" is the terminal's alternate screen in raw mode. Opening it
//! sets the terminal title to the window name; dropping it restores the
//! terminal on every exit path.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEvent},
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use image::RgbImage;
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::player::render::frame::render_frame;
use crate::player::render::status::render_status_bar;
use crate::player::render::{FrameDisplay, StatusInfo};

/// Terminal-backed display.
pub struct TerminalDisplay {
    stdout: io::Stdout,
    show_status: bool,
    /// True when the screen must be cleared before the next frame
    needs_clear: bool,
}

fn display_error(e: impl std::fmt::Display) -> PlayerError {
    PlayerError::Display(e.to_string())
}

impl TerminalDisplay {
    /// Create the display window.
    pub fn open(window_name: &str, show_status: bool) -> Result<Self> {
        if !atty::is(atty::Stream::Stdout) {
            return Err(PlayerError::Display(
                "stdout is not a terminal".to_string(),
            ));
        }

        let mut stdout = io::stdout();
        enable_raw_mode().map_err(display_error)?;
        if let Err(e) = execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            SetTitle(window_name),
            Clear(ClearType::All)
        ) {
            let _ = disable_raw_mode();
            return Err(display_error(e));
        }
        debug!("Opened terminal display '{}'", window_name);

        Ok(Self {
            stdout,
            show_status,
            needs_clear: false,
        })
    }
}

impl FrameDisplay for TerminalDisplay {
    fn show(&mut self, frame: &RgbImage, status: &StatusInfo) -> Result<()> {
        let (cols, rows) = terminal::size().map_err(display_error)?;
        if self.needs_clear {
            execute!(self.stdout, Clear(ClearType::All)).map_err(display_error)?;
            self.needs_clear = false;
        }

        let picture_rows = if self.show_status {
            rows.saturating_sub(1)
        } else {
            rows
        };
        render_frame(&mut self.stdout, frame, cols, picture_rows)
            .map_err(|e| PlayerError::Display(format!("{:#}", e)))?;
        if self.show_status && rows > 0 {
            render_status_bar(&mut self.stdout, cols, rows - 1, status)
                .map_err(|e| PlayerError::Display(format!("{:#}", e)))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if !event::poll(timeout).map_err(display_error)? {
            return Ok(None);
        }
        match event::read().map_err(display_error)? {
            Event::Key(key) => Ok(Some(key)),
            Event::Resize(_, _) => {
                self.needs_clear = true;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        debug!("Closed terminal display");
    }
}
