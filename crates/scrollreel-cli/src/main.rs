use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrollreel_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "scrollreel")]
#[command(author, version, about = "Scroll-scrubbed frame sequences in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ~/.config/scrollreel/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the long-scroll page in the terminal
    Run,
    /// Render one sequence at a scroll progress to a PNG
    Render {
        /// Sequence name
        name: String,
        /// Scroll progress through the pin, 0.0 to 1.0
        #[arg(short = 'p', long, default_value_t = 0.0)]
        progress: f64,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        /// Output file
        #[arg(short = 'o', long, default_value = "frame.png")]
        output: PathBuf,
    },
    /// Check every sequence directory against its declared frame count
    Verify,
    /// List the configured page sections
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Warm the frame cache with the first frames of every sequence
    Preload {
        /// Frames per sequence
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
    },
    /// Extract frame sequences from videos with ffmpeg
    Extract {
        /// Directory containing <name>.mp4 files
        #[arg(long, default_value = "public/videos")]
        videos: PathBuf,
        #[arg(long, default_value_t = 24)]
        fps: u32,
        /// Output width in pixels; height keeps the aspect ratio
        #[arg(long, default_value_t = 1080)]
        width: u32,
        /// Seconds of video to extract
        #[arg(long, default_value_t = 5.0)]
        duration: f64,
        /// WebP quality
        #[arg(long, default_value_t = 80)]
        quality: u8,
        /// Re-extract sequences whose directory already has files
        #[arg(long)]
        force: bool,
    },
}

/// Install the global subscriber
///
/// The terminal UI owns stdout, so `run` logs to a file under the data directory.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    let config = Arc::new(config);

    let interactive = matches!(cli.command, None | Some(Commands::Run));
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Render {
            name,
            progress,
            width,
            height,
            output,
        }) => commands::render::run(&config, &name, progress, width, height, &output).await,
        Some(Commands::Verify) => commands::verify::run(&config).await,
        Some(Commands::List { json }) => commands::list::run(&config, json).await,
        Some(Commands::Preload { count }) => commands::preload::run(&config, count).await,
        Some(Commands::Extract {
            videos,
            fps,
            width,
            duration,
            quality,
            force,
        }) => {
            let options = commands::extract::ExtractOptions {
                fps,
                width,
                duration,
                quality,
                force,
            };
            commands::extract::run(&config, &videos, &options).await
        }
    }
}
