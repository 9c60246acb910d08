//! Colors, palettes and the built-in palette presets.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Deserialize;

use crate::error::EngineError;

/// Fewest colors a palette may hold.
pub const MIN_PALETTE_SIZE: usize = 2;

/// An 8-bit RGB color.
///
/// Deserialized from a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// A uniformly random color.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = EngineError;

    /// Parse `#rrggbb` or `rrggbb`, hex digits in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Ordered list of at least [`MIN_PALETTE_SIZE`] colors.
///
/// Order only matters for tie-breaking in nearest-color search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build a palette from colors.
    ///
    /// # Errors
    /// * `EngineError::PaletteTooSmall` - If fewer than two colors are given
    pub fn new(colors: Vec<Rgb>) -> Result<Self, EngineError> {
        if colors.len() < MIN_PALETTE_SIZE {
            return Err(EngineError::PaletteTooSmall {
                min: MIN_PALETTE_SIZE,
            });
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Never true for a palette built through [`Palette::new`].
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Replace the color at `index`.
    pub fn set(&mut self, index: usize, color: Rgb) -> Result<(), EngineError> {
        let len = self.colors.len();
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(EngineError::PaletteIndexOutOfRange { index, len })?;
        *slot = color;
        Ok(())
    }

    /// Append a color.
    pub fn push(&mut self, color: Rgb) {
        self.colors.push(color);
    }

    /// Append a random color and return it.
    pub fn push_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Rgb {
        let color = Rgb::random(rng);
        self.colors.push(color);
        color
    }

    /// Remove and return the last color.
    ///
    /// # Errors
    /// * `EngineError::PaletteTooSmall` - If the palette is already at the minimum size
    pub fn pop(&mut self) -> Result<Rgb, EngineError> {
        if self.colors.len() <= MIN_PALETTE_SIZE {
            return Err(EngineError::PaletteTooSmall {
                min: MIN_PALETTE_SIZE,
            });
        }
        self.colors.pop().ok_or(EngineError::InvalidPalette)
    }
}

impl Default for Palette {
    fn default() -> Self {
        PalettePreset::default().palette()
    }
}

const BLACK_AND_WHITE: [Rgb; 2] = [Rgb::BLACK, Rgb::WHITE];

const GRAYSCALE: [Rgb; 7] = [
    Rgb::new(0, 0, 0),
    Rgb::new(42, 42, 42),
    Rgb::new(85, 85, 85),
    Rgb::new(128, 128, 128),
    Rgb::new(171, 171, 171),
    Rgb::new(213, 213, 213),
    Rgb::new(255, 255, 255),
];

const GAMEBOY: [Rgb; 4] = [
    Rgb::new(6, 53, 6),
    Rgb::new(44, 98, 44),
    Rgb::new(140, 174, 6),
    Rgb::new(156, 189, 7),
];

const RED_GREEN_BLUE: [Rgb; 5] = [
    Rgb::new(0, 0, 0),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 255),
];

const RGB_3BIT: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(255, 255, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 255),
];

/// Built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PalettePreset {
    BlackAndWhite,
    /// 7 evenly spaced grays
    Grayscale,
    /// The four greens of the original Game Boy screen
    #[default]
    Gameboy,
    RedGreenBlue,
    /// All eight corners of the RGB cube
    #[serde(rename = "rgb-3bit")]
    Rgb3Bit,
}

impl PalettePreset {
    pub const ALL: [PalettePreset; 5] = [
        PalettePreset::BlackAndWhite,
        PalettePreset::Grayscale,
        PalettePreset::Gameboy,
        PalettePreset::RedGreenBlue,
        PalettePreset::Rgb3Bit,
    ];

    pub fn colors(self) -> &'static [Rgb] {
        match self {
            Self::BlackAndWhite => &BLACK_AND_WHITE,
            Self::Grayscale => &GRAYSCALE,
            Self::Gameboy => &GAMEBOY,
            Self::RedGreenBlue => &RED_GREEN_BLUE,
            Self::Rgb3Bit => &RGB_3BIT,
        }
    }

    pub fn palette(self) -> Palette {
        Palette {
            colors: self.colors().to_vec(),
        }
    }
}

impl fmt::Display for PalettePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BlackAndWhite => "black-and-white",
            Self::Grayscale => "grayscale",
            Self::Gameboy => "gameboy",
            Self::RedGreenBlue => "red-green-blue",
            Self::Rgb3Bit => "rgb-3bit",
        };
        write!(f, "{}", name)
    }
}
