//! Live render controls shared between an options UI and the frame renderer.
//!
//! Every edit builds a new validated [`Options`] value and swaps it in
//! whole, so a frame that is already running keeps reading the snapshot it
//! started with. Changing the threshold order regenerates the map before
//! the swap.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::EngineError;
use crate::options::Options;
use crate::palette::{Palette, PalettePreset, Rgb};
use crate::threshold::{ThresholdCache, ThresholdMap, MAX_THRESHOLD_ORDER};

/// Options and the threshold map generated for their order.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub options: Arc<Options>,
    pub threshold_map: Arc<ThresholdMap>,
}

struct State {
    snapshot: Snapshot,
    cache: ThresholdCache,
}

/// Thread-safe holder of the current render snapshot.
pub struct Controls {
    state: Mutex<State>,
}

impl std::fmt::Debug for Controls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controls")
            .field("options", &self.snapshot().options)
            .finish_non_exhaustive()
    }
}

impl Controls {
    /// Create controls starting from `options`.
    pub fn new(options: Options) -> Result<Self, EngineError> {
        options.validate()?;
        let mut cache = ThresholdCache::new();
        let threshold_map = cache.get(options.threshold_order)?;

        Ok(Self {
            state: Mutex::new(State {
                snapshot: Snapshot {
                    options: Arc::new(options),
                    threshold_map,
                },
                cache,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Snapshots are replaced whole, so a poisoned lock still holds a consistent one
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current options together with their threshold map.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// The current options.
    pub fn options(&self) -> Arc<Options> {
        Arc::clone(&self.lock().snapshot.options)
    }

    /// Apply `edit` to a copy of the current options and swap the result in.
    ///
    /// Nothing changes if `edit` or validation fails.
    pub fn update<T>(
        &self,
        edit: impl FnOnce(&mut Options) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut state = self.lock();
        let mut next = Options::clone(&state.snapshot.options);
        let out = edit(&mut next)?;
        next.validate()?;

        let threshold_map = if next.threshold_order != state.snapshot.options.threshold_order {
            state.cache.get(next.threshold_order)?
        } else {
            Arc::clone(&state.snapshot.threshold_map)
        };

        state.snapshot = Snapshot {
            options: Arc::new(next),
            threshold_map,
        };
        Ok(out)
    }

    pub fn set_pixel_size(&self, pixel_size: u32) -> Result<(), EngineError> {
        self.update(|o| {
            o.pixel_size = pixel_size;
            Ok(())
        })
    }

    pub fn set_brightness(&self, brightness: i32) -> Result<(), EngineError> {
        self.update(|o| {
            o.brightness = brightness;
            Ok(())
        })
    }

    pub fn set_dither(&self, dither: bool) -> Result<(), EngineError> {
        self.update(|o| {
            o.dither = dither;
            Ok(())
        })
    }

    pub fn set_dither_intensity(&self, intensity: u8) -> Result<(), EngineError> {
        self.update(|o| {
            o.dither_intensity = intensity;
            Ok(())
        })
    }

    pub fn set_threshold_order(&self, order: u32) -> Result<(), EngineError> {
        self.update(|o| {
            o.threshold_order = order;
            Ok(())
        })
    }

    /// Move the threshold order up or down by `delta`, staying within
    /// `0..=MAX_THRESHOLD_ORDER`. Returns the new order.
    pub fn step_threshold_order(&self, delta: i32) -> Result<u32, EngineError> {
        self.update(|o| {
            let order = (o.threshold_order as i64 + delta as i64).clamp(0, MAX_THRESHOLD_ORDER as i64);
            o.threshold_order = order as u32;
            Ok(o.threshold_order)
        })
    }

    /// Recolor the palette entry at `index`.
    pub fn set_palette_color(&self, index: usize, color: Rgb) -> Result<(), EngineError> {
        self.update(|o| o.palette.set(index, color))?;
        log::debug!("Palette color {} set to {}", index, color);
        Ok(())
    }

    /// Append a color to the palette.
    pub fn push_palette_color(&self, color: Rgb) -> Result<(), EngineError> {
        self.update(|o| {
            o.palette.push(color);
            Ok(())
        })?;
        log::debug!("Palette color {} added", color);
        Ok(())
    }

    /// Append a random color to the palette and return it.
    pub fn push_random_palette_color(&self) -> Result<Rgb, EngineError> {
        let color = self.update(|o| Ok(o.palette.push_random(&mut rand::thread_rng())))?;
        log::debug!("Random palette color {} added", color);
        Ok(color)
    }

    /// Remove the last palette color. Fails when only two remain.
    pub fn pop_palette_color(&self) -> Result<Rgb, EngineError> {
        let color = self.update(|o| o.palette.pop())?;
        log::debug!("Palette color {} removed", color);
        Ok(color)
    }

    /// Replace the whole palette.
    pub fn set_palette(&self, palette: Palette) -> Result<(), EngineError> {
        self.update(|o| {
            o.palette = palette;
            Ok(())
        })
    }

    /// Replace the palette with a built-in preset.
    pub fn apply_preset(&self, preset: PalettePreset) -> Result<(), EngineError> {
        log::info!("Switching palette to {}", preset);
        self.set_palette(preset.palette())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> Controls {
        Controls::new(Options::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let options = Options {
            pixel_size: 0,
            ..Options::default()
        };
        assert!(Controls::new(options).is_err());
    }

    #[test]
    fn test_snapshot_map_matches_order() {
        let controls = controls();
        let snapshot = controls.snapshot();
        assert_eq!(snapshot.threshold_map.order(), snapshot.options.threshold_order);
    }

    #[test]
    fn test_edit_swaps_new_snapshot() {
        let controls = controls();
        let before = controls.snapshot();
        controls.set_brightness(-20).unwrap();
        let after = controls.snapshot();

        assert_eq!(before.options.brightness, 0);
        assert_eq!(after.options.brightness, -20);
        // Unchanged order keeps the same map
        assert!(Arc::ptr_eq(&before.threshold_map, &after.threshold_map));
    }

    #[test]
    fn test_order_change_regenerates_map() {
        let controls = controls();
        controls.set_threshold_order(1).unwrap();
        let snapshot = controls.snapshot();
        assert_eq!(snapshot.threshold_map.order(), 1);
        assert_eq!(snapshot.threshold_map.side(), 4);
    }

    #[test]
    fn test_step_order_clamps() {
        let controls = controls();
        assert_eq!(controls.step_threshold_order(-1).unwrap(), 2);
        assert_eq!(controls.step_threshold_order(-5).unwrap(), 0);
        assert_eq!(controls.step_threshold_order(100).unwrap(), MAX_THRESHOLD_ORDER);
    }

    #[test]
    fn test_failed_edit_leaves_snapshot() {
        let controls = controls();
        assert!(controls.set_brightness(300).is_err());
        assert!(controls.set_pixel_size(0).is_err());
        assert!(controls.set_palette_color(99, Rgb::WHITE).is_err());
        assert_eq!(*controls.options(), Options::default());
    }

    #[test]
    fn test_palette_edits() {
        let controls = controls();
        controls.apply_preset(PalettePreset::BlackAndWhite).unwrap();
        assert!(controls.pop_palette_color().is_err());

        controls.push_palette_color(Rgb::new(1, 2, 3)).unwrap();
        let random = controls.push_random_palette_color().unwrap();
        assert_eq!(controls.options().palette.len(), 4);
        assert_eq!(controls.options().palette.colors()[3], random);

        controls.set_palette_color(0, Rgb::new(9, 9, 9)).unwrap();
        assert_eq!(controls.pop_palette_color().unwrap(), random);
        assert_eq!(controls.options().palette.colors()[0], Rgb::new(9, 9, 9));
    }
}
