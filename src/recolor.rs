//! Per-pixel recolor: brightness shift, ordered-dither offset, palette quantization.
//!
//! Every pixel is recolored from its own position and value plus the
//! read-only options and threshold map, so rows are processed in parallel.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::EngineError;
use crate::frame::FrameBuffer;
use crate::options::Options;
use crate::palette::Rgb;
use crate::quantize::nearest;
use crate::threshold::ThresholdMap;

/// Clamp an adjusted channel value to `[0, 255]`.
///
/// Out-of-range values saturate. Fractional values round half to even,
/// matching how clamped 8-bit image storage rounds.
///
/// Brightness and the dither offset are summed before this single clamp.
/// Clamping after brightness and again after dither would differ near the
/// ends of the range: 250 + 50 - 40 is 255 here, not 215.
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Achromatic dither offset for frame coordinate (x, y):
/// `intensity * (map[x mod side][y mod side] / side² - 0.5)`.
#[inline]
pub fn dither_offset(x: usize, y: usize, intensity: u8, map: &ThresholdMap) -> f32 {
    intensity as f32 * (map.threshold_at(x, y) - 0.5)
}

/// Recolor a single pixel at (x, y).
pub fn recolor_pixel(
    x: usize,
    y: usize,
    color: Rgb,
    options: &Options,
    map: &ThresholdMap,
) -> Result<Rgb, EngineError> {
    let mut shift = options.brightness as f32;
    if options.dither {
        shift += dither_offset(x, y, options.dither_intensity, map);
    }

    let adjusted = Rgb::new(
        clamp_channel(color.r as f32 + shift),
        clamp_channel(color.g as f32 + shift),
        clamp_channel(color.b as f32 + shift),
    );
    nearest(adjusted, options.palette.colors())
}

/// Recolor every pixel of `reduced` in place. Alpha is left untouched.
pub fn recolor(
    reduced: &mut FrameBuffer,
    options: &Options,
    map: &ThresholdMap,
) -> Result<(), EngineError> {
    recolor_cancellable(reduced, options, map, &AtomicBool::new(false))
}

/// Like [`recolor`], but gives up with `EngineError::Cancelled` once
/// `cancel` is set. The flag is checked before each row.
pub fn recolor_cancellable(
    reduced: &mut FrameBuffer,
    options: &Options,
    map: &ThresholdMap,
    cancel: &AtomicBool,
) -> Result<(), EngineError> {
    reduced.validate()?;
    if options.palette.is_empty() {
        return Err(EngineError::InvalidPalette);
    }

    let bpp = reduced.bytes_per_pixel();
    let stride = reduced.stride();

    reduced
        .data
        .par_chunks_mut(stride)
        .enumerate()
        .try_for_each(|(y, row)| {
            if cancel.load(Ordering::Relaxed) {
                return Err(EngineError::Cancelled);
            }
            for (x, px) in row.chunks_exact_mut(bpp).enumerate() {
                let color = recolor_pixel(x, y, Rgb::new(px[0], px[1], px[2]), options, map)?;
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
            }
            Ok(())
        })
}
