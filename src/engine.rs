//! Frame processing entry points.
//!
//! A frame goes through three steps:
//!
//! 1. **Downsample** to `floor(w / pixel_size) x floor(h / pixel_size)`
//! 2. **Recolor** every reduced pixel (brightness, dither, quantize)
//! 3. **Upsample** back over the original frame with the same point sampling
//!
//! Recoloring at the reduced resolution keeps the per-pixel palette search
//! cheap enough for video frame rates.

use std::sync::atomic::AtomicBool;

use crate::error::EngineError;
use crate::frame::FrameBuffer;
use crate::options::Options;
use crate::pixelate::{downsample_into, upsample_into};
use crate::recolor::recolor_cancellable;
use crate::threshold::ThresholdMap;

/// Build the threshold map for `order`. Callers should cache the result
/// (see [`crate::threshold::ThresholdCache`]) and only call this again
/// when the order changes.
pub fn generate_threshold_map(order: u32) -> Result<ThresholdMap, EngineError> {
    ThresholdMap::generate(order)
}

/// Pixelate and recolor `frame` in place.
///
/// # Errors
/// * `EngineError::DimensionMismatch` - If the buffer length disagrees with its dimensions
/// * `EngineError::InvalidOption` / `EngineError::InvalidOrder` - If `options` fail validation
/// * `EngineError::InvalidPalette` - If the palette is empty
pub fn process_frame(
    frame: &mut FrameBuffer,
    options: &Options,
    map: &ThresholdMap,
) -> Result<(), EngineError> {
    FrameProcessor::new().process(frame, options, map)
}

/// Reusable frame processor.
///
/// Holds the reduced-resolution scratch buffer between frames so the hot
/// path does not allocate once the frame size settles.
#[derive(Debug)]
pub struct FrameProcessor {
    reduced: FrameBuffer,
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameProcessor {
    pub fn new() -> Self {
        Self {
            reduced: FrameBuffer::blank(0, 0, Default::default()),
        }
    }

    /// Pixelate and recolor `frame` in place. See [`process_frame`].
    pub fn process(
        &mut self,
        frame: &mut FrameBuffer,
        options: &Options,
        map: &ThresholdMap,
    ) -> Result<(), EngineError> {
        self.process_cancellable(frame, options, map, &AtomicBool::new(false))
    }

    /// Like [`FrameProcessor::process`], but stops with
    /// `EngineError::Cancelled` once `cancel` is set. `frame` is only
    /// written after recoloring finishes, so a cancelled call leaves it
    /// untouched.
    pub fn process_cancellable(
        &mut self,
        frame: &mut FrameBuffer,
        options: &Options,
        map: &ThresholdMap,
        cancel: &AtomicBool,
    ) -> Result<(), EngineError> {
        frame.validate()?;
        options.validate()?;
        if map.order() != options.threshold_order {
            log::debug!(
                "Threshold map order {} differs from options order {}",
                map.order(),
                options.threshold_order
            );
        }

        downsample_into(frame, options.pixel_size, &mut self.reduced)?;
        recolor_cancellable(&mut self.reduced, options, map, cancel)?;
        upsample_into(&self.reduced, frame)
    }
}
