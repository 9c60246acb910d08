//! Configuration file handling for retro-cam.
//!
//! Loads configuration from `~/.config/retro-cam/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::options::{
    Options, DEFAULT_BRIGHTNESS, DEFAULT_DITHER, DEFAULT_DITHER_INTENSITY, DEFAULT_PIXEL_SIZE,
    DEFAULT_THRESHOLD_ORDER,
};
use crate::palette::{Palette, PalettePreset, Rgb};

/// Configuration file structure for retro-cam.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
}

/// The `[render]` table.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "default_pixel_size")]
    pub pixel_size: u32,
    #[serde(default)]
    pub brightness: i32,
    #[serde(default = "default_true")]
    pub dither: bool,
    #[serde(default = "default_dither_intensity")]
    pub dither_intensity: u8,
    #[serde(default = "default_threshold_order")]
    pub threshold_order: u32,
    /// Built-in palette, used when `palette` is not given
    #[serde(default)]
    pub preset: Option<PalettePreset>,
    /// Explicit palette as `#rrggbb` strings
    #[serde(default)]
    pub palette: Option<Vec<Rgb>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            brightness: DEFAULT_BRIGHTNESS,
            dither: DEFAULT_DITHER,
            dither_intensity: DEFAULT_DITHER_INTENSITY,
            threshold_order: DEFAULT_THRESHOLD_ORDER,
            preset: None,
            palette: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pixel_size() -> u32 {
    DEFAULT_PIXEL_SIZE
}

fn default_dither_intensity() -> u8 {
    DEFAULT_DITHER_INTENSITY
}

fn default_threshold_order() -> u32 {
    DEFAULT_THRESHOLD_ORDER
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            log::info!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            Self::parse(&content).map_err(|e| match e {
                ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
                other => other,
            })
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// Build validated render options from the `[render]` table.
    ///
    /// An explicit `palette` wins over `preset`; with neither, the default
    /// preset is used.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let render = &self.render;
        let palette = match (&render.palette, render.preset) {
            (Some(colors), _) => Palette::new(colors.clone())?,
            (None, Some(preset)) => preset.palette(),
            (None, None) => Palette::default(),
        };

        let options = Options {
            pixel_size: render.pixel_size,
            brightness: render.brightness,
            dither: render.dither,
            dither_intensity: render.dither_intensity,
            threshold_order: render.threshold_order,
            palette,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid render settings: {0}")]
    Invalid(#[from] EngineError),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("retro-cam").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/retro-cam/config.toml")
        })
}

/// Commented default config written by `config init`.
pub const DEFAULT_CONFIG: &str = r##"# retro-cam configuration

[render]
# Edge length of one output block in pixels (1 = no pixelation)
pixel_size = 2
# Brightness shift applied to every channel (-255 to 255)
brightness = 0
# Ordered dithering
dither = true
# Dither strength (0 to 255)
dither_intensity = 50
# Threshold map order n, giving a 2^(n+1) square pattern (0 to 10)
threshold_order = 3
# Built-in palette: black-and-white, grayscale, gameboy, red-green-blue, rgb-3bit
preset = "gameboy"
# Or an explicit palette (at least two colors), which overrides the preset
# palette = ["#000000", "#ffffff"]
"##;
