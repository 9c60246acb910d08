//! retro-cam library crate.
//!
//! The recoloring engine behind the retro camera filter: threshold map
//! generation, block pixelation, and per-pixel brightness, ordered-dither
//! and palette quantization. Frame acquisition and display are left to the
//! caller; the engine only sees a [`frame::FrameBuffer`] and an
//! [`options::Options`] snapshot per frame.

pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod frame;
pub mod options;
pub mod palette;
pub mod pixelate;
pub mod quantize;
pub mod recolor;
pub mod renderer;
pub mod threshold;

pub use engine::{generate_threshold_map, process_frame, FrameProcessor};
pub use error::EngineError;
pub use frame::{FrameBuffer, PixelFormat};
pub use options::Options;
pub use palette::{Palette, PalettePreset, Rgb};
pub use threshold::ThresholdMap;
