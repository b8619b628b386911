//! Status bar rendering for the player.
//!
//! Displays playback state, position, speed, zoom, playlist item and the
//! key bindings on the last terminal row.

use std::io::{self, Write};

use anyhow::Result;

use crate::player::render::StatusInfo;

/// Format a duration in seconds to MM:SS format.
///
/// # Arguments
/// * `seconds` - Duration in seconds
///
/// # Returns
/// A string in MM:SS format
pub fn format_duration(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Build the status bar line, styled with ANSI codes and padded or
/// truncated to `width` visible columns.
///
/// Segments are dropped from the right when the terminal is too narrow.
pub fn build_status_line(info: &StatusInfo, width: u16) -> String {
    // ANSI color codes
    const WHITE: &str = "\x1b[97m";
    const DARK_GREY: &str = "\x1b[90m";
    const YELLOW: &str = "\x1b[33m";
    const CYAN: &str = "\x1b[36m";
    const RESET: &str = "\x1b[0m";

    let segments: [(&str, String); 6] = [
        (WHITE, format!(" ▶ {} ", format_duration(info.current_time))),
        (DARK_GREY, "spd:".to_string()),
        (WHITE, format!("{:.1}x ", info.speed_factor)),
        (DARK_GREY, "zoom:".to_string()),
        (YELLOW, format!("{:.0}x ", info.zoom_factor)),
        (
            CYAN,
            format!("[{}/{}] {} ", info.index + 1, info.total, info.title),
        ),
    ];
    let hints = (
        DARK_GREY,
        " q:quit a/d:prev/next w/s:zoom c:+10s p:speed".to_string(),
    );

    let width = width as usize;
    let mut output = String::with_capacity(256);
    let mut visible_len: usize = 0; // Track visible width manually

    for (color, text) in segments.iter().chain(std::iter::once(&hints)) {
        let len = text.chars().count();
        if visible_len + len > width {
            // Truncate the segment that does not fit, drop the rest
            let room = width - visible_len;
            output.push_str(color);
            output.extend(text.chars().take(room));
            visible_len += room;
            break;
        }
        output.push_str(color);
        output.push_str(text);
        visible_len += len;
    }

    while visible_len < width {
        output.push(' ');
        visible_len += 1;
    }
    output.push_str(RESET);
    output
}

/// Render the status bar.
///
/// # Arguments
/// * `stdout` - The stdout handle to write to
/// * `width` - Terminal width
/// * `row` - Row to render at (0-indexed)
/// * `info` - Playback state to show
pub fn render_status_bar(
    stdout: &mut io::Stdout,
    width: u16,
    row: u16,
    info: &StatusInfo,
) -> Result<()> {
    write!(
        stdout,
        "\x1b[{};1H{}",
        row + 1,
        build_status_line(info, width)
    )?;
    Ok(())
}
