//! Frame rendering for the terminal display.
//!
//! Each terminal cell shows two vertically stacked pixels using the upper
//! half block character: foreground is the top pixel, background the bottom.

use std::io::{self, Write};

use anyhow::Result;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Largest size with the aspect ratio of `src` that fits in `max`.
pub fn fit_within(src: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = src;
    let (mw, mh) = max;
    if sw == 0 || sh == 0 || mw == 0 || mh == 0 {
        return (0, 0);
    }
    let scale = (mw as f64 / sw as f64).min(mh as f64 / sh as f64);
    let w = ((sw as f64 * scale).round() as u32).clamp(1, mw);
    let h = ((sh as f64 * scale).round() as u32).clamp(1, mh);
    (w, h)
}

fn push_fg(output: &mut String, c: &Rgb<u8>) {
    output.push_str(&format!("\x1b[38;2;{};{};{}m", c[0], c[1], c[2]));
}

fn push_bg(output: &mut String, c: &Rgb<u8>) {
    output.push_str(&format!("\x1b[48;2;{};{};{}m", c[0], c[1], c[2]));
}

/// Build the escape sequence drawing `frame` centered in a `cols`x`rows`
/// cell area, starting at the top-left of the screen.
///
/// Cells outside the picture are cleared to black.
pub fn build_frame(frame: &RgbImage, cols: u16, rows: u16) -> String {
    let (w, h) = fit_within(frame.dimensions(), (cols as u32, rows as u32 * 2));
    let mut output = String::with_capacity(cols as usize * rows as usize * 24);
    if w == 0 || h == 0 {
        return output;
    }

    let scaled = imageops::resize(frame, w, h, FilterType::Nearest);
    let col_offset = (cols as u32 - w) / 2;
    // Keep the picture aligned to whole cells
    let row_offset = (rows as u32 - (h + 1) / 2) / 2;
    let black = Rgb([0, 0, 0]);

    for row in 0..rows as u32 {
        output.push_str(&format!("\x1b[{};1H", row + 1));
        let mut current: Option<(Rgb<u8>, Rgb<u8>)> = None;

        for col in 0..cols as u32 {
            let inside_x = col >= col_offset && col < col_offset + w;
            let inside_y = row >= row_offset && (row - row_offset) * 2 < h;

            let (top, bottom) = if inside_x && inside_y {
                let x = col - col_offset;
                let y = (row - row_offset) * 2;
                let top = *scaled.get_pixel(x, y);
                let bottom = if y + 1 < h {
                    *scaled.get_pixel(x, y + 1)
                } else {
                    black
                };
                (top, bottom)
            } else {
                (black, black)
            };

            if current != Some((top, bottom)) {
                push_fg(&mut output, &top);
                push_bg(&mut output, &bottom);
                current = Some((top, bottom));
            }
            output.push('▀');
        }
        output.push_str("\x1b[0m");
    }
    output
}

/// Render a frame to stdout.
///
/// # Arguments
/// * `stdout` - The stdout handle to write to
/// * `frame` - The display-sized frame
/// * `cols` - Columns available for the picture
/// * `rows` - Rows available for the picture
pub fn render_frame(stdout: &mut io::Stdout, frame: &RgbImage, cols: u16, rows: u16) -> Result<()> {
    let output = build_frame(frame, cols, rows);
    write!(stdout, "{}", output)?;
    Ok(())
}
