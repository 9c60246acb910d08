//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use retro_cam::palette::Rgb;
use retro_cam::threshold::MAX_THRESHOLD_ORDER;

use super::enums::PaletteName;

/// Retro pixel-art filter: pixelate, ordered-dither and quantize to a small palette
#[derive(Parser, Debug)]
#[command(name = "retro-cam")]
#[command(version, about = "Retro pixel-art filter for camera frames", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter an image file
    Render(RenderArgs),
    /// List built-in palettes
    Palettes,
    /// Print the threshold map for an order
    ThresholdMap {
        /// Map order n (side length 2^(n+1))
        #[arg(value_parser = clap::value_parser!(u32).range(0..=MAX_THRESHOLD_ORDER as i64))]
        order: u32,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Settings for `render`. Anything given here overrides the config file.
#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Input image (PNG, JPEG or BMP)
    pub input: PathBuf,

    /// Output image; format follows the extension
    pub output: PathBuf,

    /// Block size in pixels
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
    pub pixel_size: Option<u32>,

    /// Brightness shift (-255 to 255)
    #[arg(long, short, allow_negative_numbers = true, value_parser = clap::value_parser!(i32).range(-255..=255))]
    pub brightness: Option<i32>,

    /// Disable ordered dithering
    #[arg(long)]
    pub no_dither: bool,

    /// Dither strength (0 to 255)
    #[arg(long, short)]
    pub intensity: Option<u8>,

    /// Threshold map order (0 to 10)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(0..=MAX_THRESHOLD_ORDER as i64))]
    pub order: Option<u32>,

    /// Built-in palette
    #[arg(long)]
    pub preset: Option<PaletteName>,

    /// Palette color as #rrggbb; repeat for each color (overrides --preset)
    #[arg(long = "color", value_name = "HEX")]
    pub colors: Vec<Rgb>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
