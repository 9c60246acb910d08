//! Per-frame render options.

use crate::error::EngineError;
use crate::palette::Palette;
use crate::threshold::MAX_THRESHOLD_ORDER;

pub const DEFAULT_PIXEL_SIZE: u32 = 2;
pub const DEFAULT_BRIGHTNESS: i32 = 0;
pub const DEFAULT_DITHER: bool = true;
pub const DEFAULT_DITHER_INTENSITY: u8 = 50;
pub const DEFAULT_THRESHOLD_ORDER: u32 = 3;

/// Largest brightness shift in either direction.
pub const MAX_BRIGHTNESS: i32 = 255;

/// Immutable snapshot of everything the engine needs to recolor one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Edge length in pixels of one output block (>= 1)
    pub pixel_size: u32,
    /// Added to every channel before quantizing (-255..=255)
    pub brightness: i32,
    /// Apply the ordered-dither offset
    pub dither: bool,
    /// Peak-to-peak strength of the dither offset (0..=255)
    pub dither_intensity: u8,
    /// Threshold map order (0..=10)
    pub threshold_order: u32,
    pub palette: Palette,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            brightness: DEFAULT_BRIGHTNESS,
            dither: DEFAULT_DITHER,
            dither_intensity: DEFAULT_DITHER_INTENSITY,
            threshold_order: DEFAULT_THRESHOLD_ORDER,
            palette: Palette::default(),
        }
    }
}

impl Options {
    /// Check every field against its allowed range.
    ///
    /// # Errors
    /// * `EngineError::InvalidOption` - If pixel size or brightness is out of range
    /// * `EngineError::InvalidOrder` - If the threshold order is out of range
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.pixel_size == 0 {
            return Err(EngineError::InvalidOption(
                "pixel size must be at least 1".to_string(),
            ));
        }
        if !(-MAX_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&self.brightness) {
            return Err(EngineError::InvalidOption(format!(
                "brightness must be between -{} and {}, got {}",
                MAX_BRIGHTNESS, MAX_BRIGHTNESS, self.brightness
            )));
        }
        if self.threshold_order > MAX_THRESHOLD_ORDER {
            return Err(EngineError::InvalidOrder(self.threshold_order));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PalettePreset;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.pixel_size, 2);
        assert_eq!(options.brightness, 0);
        assert!(options.dither);
        assert_eq!(options.dither_intensity, 50);
        assert_eq!(options.threshold_order, 3);
        assert_eq!(options.palette, PalettePreset::Gameboy.palette());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_pixel_size() {
        let options = Options {
            pixel_size: 0,
            ..Options::default()
        };
        assert!(matches!(
            options.validate(),
            Err(EngineError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_validate_brightness_bounds() {
        for (brightness, ok) in [(-255, true), (255, true), (-256, false), (256, false)] {
            let options = Options {
                brightness,
                ..Options::default()
            };
            assert_eq!(options.validate().is_ok(), ok, "brightness {}", brightness);
        }
    }

    #[test]
    fn test_validate_rejects_large_order() {
        let options = Options {
            threshold_order: 11,
            ..Options::default()
        };
        assert_eq!(options.validate(), Err(EngineError::InvalidOrder(11)));
    }
}
