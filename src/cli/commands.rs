//! Subcommand handlers.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};

use retro_cam::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG};
use retro_cam::engine::{generate_threshold_map, process_frame};
use retro_cam::error::EngineError;
use retro_cam::frame::FrameBuffer;
use retro_cam::options::Options;
use retro_cam::palette::{Palette, PalettePreset};

use super::args::{ConfigAction, RenderArgs};

/// Errors surfaced by subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Config file already exists: {0}")]
    ConfigExists(String),
}

/// Options from the config file with command-line overrides applied.
pub fn render_options(args: &RenderArgs, config: &Config) -> Result<Options, CliError> {
    let mut options = config.options()?;

    if let Some(pixel_size) = args.pixel_size {
        options.pixel_size = pixel_size;
    }
    if let Some(brightness) = args.brightness {
        options.brightness = brightness;
    }
    if args.no_dither {
        options.dither = false;
    }
    if let Some(intensity) = args.intensity {
        options.dither_intensity = intensity;
    }
    if let Some(order) = args.order {
        options.threshold_order = order;
    }
    if !args.colors.is_empty() {
        options.palette = Palette::new(args.colors.clone())?;
    } else if let Some(preset) = args.preset {
        options.palette = PalettePreset::from(preset).palette();
    }

    options.validate()?;
    Ok(options)
}

/// Filter one image file.
pub fn render(args: &RenderArgs, config: &Config) -> Result<(), CliError> {
    let options = render_options(args, config)?;
    let map = generate_threshold_map(options.threshold_order)?;

    let image = image::open(&args.input)?;
    let mut frame = if image.color().has_alpha() {
        FrameBuffer::from_rgba_image(image.to_rgba8())
    } else {
        FrameBuffer::from_rgb_image(image.to_rgb8())
    };
    log::info!(
        "Rendering {} ({}x{}) with {} colors",
        args.input.display(),
        frame.width,
        frame.height,
        options.palette.len()
    );

    let started = Instant::now();
    process_frame(&mut frame, &options, &map)?;
    log::debug!("Processed frame in {:?}", started.elapsed());

    save(frame, &args.output)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn save(frame: FrameBuffer, path: &Path) -> Result<(), CliError> {
    let image = frame.into_dynamic_image()?;
    // JPEG has no alpha channel
    let image = match ImageFormat::from_path(path) {
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };
    image.save(path)?;
    Ok(())
}

/// Print the built-in palettes.
pub fn list_palettes() {
    println!("Built-in palettes:");
    for preset in PalettePreset::ALL {
        let colors: Vec<String> = preset.colors().iter().map(|c| c.to_hex()).collect();
        println!("  {:<16} {}", preset.to_string(), colors.join(" "));
    }
    println!();
    println!("Use --preset <name> to select one.");
}

/// Print the threshold map for `order`, one row per line.
pub fn print_threshold_map(order: u32) -> Result<(), CliError> {
    let map = generate_threshold_map(order)?;
    let width = ((map.side() * map.side()) - 1).to_string().len();
    for row in map.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>width$}", v)).collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&path))?;
            let options = config.options()?;
            let colors: Vec<String> = options.palette.colors().iter().map(|c| c.to_hex()).collect();

            println!("Current configuration:");
            println!("  Pixel size: {}", options.pixel_size);
            println!("  Brightness: {:+}", options.brightness);
            println!("  Dithering: {}", if options.dither { "on" } else { "off" });
            println!("  Dither intensity: {}", options.dither_intensity);
            println!("  Threshold order: {}", options.threshold_order);
            println!("  Palette: {}", colors.join(" "));
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(CliError::ConfigExists(path.display().to_string()));
            }

            // Create parent directories if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG)?;

            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
