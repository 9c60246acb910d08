mod cli;

use clap::Parser;
use cli::{Args, Command};
use retro_cam::config::Config;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<(), cli::CliError> {
    match args.command {
        Command::Render(render_args) => {
            let config = Config::load(args.config.as_deref())?;
            cli::render(&render_args, &config)
        }
        Command::Palettes => {
            cli::list_palettes();
            Ok(())
        }
        Command::ThresholdMap { order } => cli::print_threshold_map(order),
        Command::Config { action } => cli::handle_config_action(action, args.config.as_deref()),
    }
}
