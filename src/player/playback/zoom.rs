//! Center-crop zoom.
//!
//! A zoom factor of `z` keeps the central `1/z` of each dimension and scales
//! it back up to the display size.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::player::state::MIN_ZOOM;

/// Region of a frame kept by the zoom transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the centered crop for a `width`x`height` frame at `zoom_factor`.
///
/// Zoom below 1.0 is treated as 1.0, which yields the whole frame.
pub fn crop_region(width: u32, height: u32, zoom_factor: f64) -> CropRegion {
    let zoom = zoom_factor.max(MIN_ZOOM);
    let crop_width = ((width as f64 / zoom) as u32).clamp(1, width.max(1));
    let crop_height = ((height as f64 / zoom) as u32).clamp(1, height.max(1));

    CropRegion {
        x: (width - crop_width.min(width)) / 2,
        y: (height - crop_height.min(height)) / 2,
        width: crop_width,
        height: crop_height,
    }
}

/// Crop `frame` by `zoom_factor` and scale the result to `size`.
pub fn apply_zoom(frame: &RgbImage, zoom_factor: f64, size: (u32, u32)) -> RgbImage {
    let region = crop_region(frame.width(), frame.height(), zoom_factor);
    let (target_w, target_h) = size;

    let full_frame = region.width == frame.width() && region.height == frame.height();
    if full_frame && frame.dimensions() == size {
        return frame.clone();
    }

    if full_frame {
        return imageops::resize(frame, target_w, target_h, FilterType::Triangle);
    }

    let cropped =
        imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image();
    imageops::resize(&cropped, target_w, target_h, FilterType::Triangle)
}
