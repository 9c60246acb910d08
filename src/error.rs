//! Error types for the recoloring engine.

/// Errors that can occur while building threshold maps, editing palettes,
/// or processing frames.
///
/// None of these are expected under validated input; they signal a caller
/// bug and abort the call that raised them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Palette is empty")]
    InvalidPalette,

    #[error("Threshold map order {0} is out of range (0-{max})", max = crate::threshold::MAX_THRESHOLD_ORDER)]
    InvalidOrder(u32),

    #[error("Frame buffer has {actual} bytes, expected {expected}")]
    DimensionMismatch {
        /// Byte length implied by width, height and pixel format
        expected: usize,
        /// Byte length actually supplied
        actual: usize,
    },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Palette needs at least {min} colors")]
    PaletteTooSmall { min: usize },

    #[error("Palette index {index} out of range (palette has {len} colors)")]
    PaletteIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("Frame superseded by a newer one")]
    Cancelled,
}
