use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use backdrop::config::{default_config_path, ConfigOverrides};
use backdrop::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

mod window;

use crate::window::WindowOptions;

/// Wallpaper slideshow with a cross-fade between images.
#[derive(Parser, Debug)]
#[command(name = "backdrop", version, about)]
struct Cli {
    /// Config file [default: $XDG_CONFIG_HOME/backdrop/config.toml]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory or image to show, or `none`
    #[arg(short, long)]
    image: Option<String>,

    /// Seconds between two images
    #[arg(long, value_name = "SECS")]
    cycle_timeout: Option<u64>,

    /// Seconds a cross-fade takes
    #[arg(long, value_name = "SECS")]
    fade_duration: Option<f32>,

    /// Show the images in random order
    #[arg(long)]
    shuffle: bool,

    /// Initial window width
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    width: i32,

    /// Initial window height
    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    height: i32,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            image: self.image.clone(),
            cycle_timeout: self.cycle_timeout,
            fade_duration: self.fade_duration,
            shuffle: self.shuffle.then_some(true),
        }
    }
}

fn init_logging() {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    match &config_path {
        Some(path) => info!("Using config {}", path.display()),
        None => info!("No config directory, using defaults"),
    }

    window::run(WindowOptions {
        width: cli.width,
        height: cli.height,
        config_path,
        overrides: cli.overrides(),
    })
    .context("background window failed")
}
