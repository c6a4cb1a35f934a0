//! Retake CLI: render screen recordings with an automatic camera.
//!
//! Usage:
//!   retake render <DIR>       Render a recording to video
//!   retake scenes <DIR>       Show the detected scene list
//!   retake plan <DIR>         Show the zoom keyframe plan
//!   retake info <DIR>         Show recording information
//!   retake thumbnail <DIR>    Generate a thumbnail

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "retake",
    about = "Automated post-production for screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a recording directory to a video file
    Render {
        /// Path to the recording directory
        dir: PathBuf,

        /// Output file path (defaults to <id>.<ext> next to the recording)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4|webm|gif
        #[arg(long, default_value = "mp4")]
        format: String,

        /// Quality preset: social|high|light
        #[arg(long, default_value = "social")]
        quality: String,

        /// Disable the automatic camera for this render
        #[arg(long)]
        no_auto_zoom: bool,
    },

    /// Print the detected scenes for a recording
    Scenes {
        /// Path to the recording directory
        dir: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the zoom keyframe plan for a recording
    Plan {
        /// Path to the recording directory
        dir: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recording information
    Info {
        /// Path to the recording directory
        dir: PathBuf,
    },

    /// Generate thumbnail.png inside the recording directory
    Thumbnail {
        /// Path to the recording directory
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    retake_common::logging::init_logging(&retake_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Render {
            dir,
            output,
            format,
            quality,
            no_auto_zoom,
        } => commands::render::run(dir, output, &format, &quality, no_auto_zoom).await,
        Commands::Scenes { dir, json } => commands::scenes::run(dir, json),
        Commands::Plan { dir, json } => commands::plan::run(dir, json),
        Commands::Info { dir } => commands::info::run(dir),
        Commands::Thumbnail { dir } => commands::thumbnail::run(dir),
    }
}
