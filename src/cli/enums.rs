//! CLI enum types.

use clap::ValueEnum;

use retro_cam::palette::PalettePreset;

/// Built-in palette name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteName {
    BlackAndWhite,
    Grayscale,
    Gameboy,
    RedGreenBlue,
    #[value(name = "rgb-3bit")]
    Rgb3Bit,
}

impl From<PaletteName> for PalettePreset {
    fn from(p: PaletteName) -> Self {
        match p {
            PaletteName::BlackAndWhite => PalettePreset::BlackAndWhite,
            PaletteName::Grayscale => PalettePreset::Grayscale,
            PaletteName::Gameboy => PalettePreset::Gameboy,
            PaletteName::RedGreenBlue => PalettePreset::RedGreenBlue,
            PaletteName::Rgb3Bit => PalettePreset::Rgb3Bit,
        }
    }
}
