//! Photopick CLI - desktop host for the single-photo picker pipeline.
//!
//! Runs the same request lifecycle a mobile app gets from `openGallery` /
//! `openCamera`, with a file on disk standing in for the user's pick or the
//! camera shot and the terminal standing in for the crop widget.
//!
//! # Usage
//!
//! ```bash
//! # Pick from the "gallery", crop and shape to 400x400 WebP
//! photopick gallery photo.jpg --width 400 --height 400
//!
//! # "Capture" with the rear camera, no crop, JPEG at 80%
//! photopick camera shot.jpg --rear --no-crop --jpeg --quality 0.8
//!
//! # Exercise the permission gate
//! photopick gallery photo.jpg --deny storage
//!
//! # View configuration
//! photopick config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use photopick_core::{Config, Rejection, SourceKind};

mod cli;
mod logging;

/// Photopick - pick one photo and get back an upright, cropped, compressed file.
#[derive(Parser, Debug)]
#[command(name = "photopick")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PHOTOPICK_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick an image as if chosen in the gallery
    Gallery(cli::pick::PickArgs),

    /// Pick an image as if taken with the camera
    Camera(cli::pick::PickArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Logging isn't initialized yet, so config warnings go straight to stderr
    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `photopick config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Photopick v{}", photopick_core::VERSION);

    let result = match cli.command {
        Commands::Gallery(args) => cli::pick::execute(SourceKind::Gallery, args, config).await,
        Commands::Camera(args) => cli::pick::execute(SourceKind::Camera, args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    };

    // Rejections are printed as `CODE: message`, nothing else
    if let Err(e) = &result {
        if let Some(rejection) = e.downcast_ref::<Rejection>() {
            eprintln!("{}", rejection);
            std::process::exit(1);
        }
    }
    result
}
