use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ffmpeg_showcase::{
    config::Config,
    engine::ProcessEngine,
    hooks::Feature,
    pipeline::Orchestrator,
};

#[derive(Parser)]
#[command(
    name = "ffmpeg-showcase",
    version,
    about = "Run ffmpeg through a set of showcase features",
    long_about = "ffmpeg-showcase stages a sample video into a private ffmpeg workspace, then prints help, version and license text and exports a thumbnail, the audio track, an animated GIF and a resized video."
)]
struct Cli {
    /// Sample video (required unless the config file provides one)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the produced media is exported to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scale expression for thumbnail, GIF and resize (e.g. 320:-2)
    #[arg(long)]
    scale: Option<String>,

    /// ffmpeg binary to drive
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Run only these features (help, version, license, thumbnail, audio, gif, resize)
    #[arg(long, value_delimiter = ',')]
    only: Vec<Feature>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Print the complete help text instead of a summary
    #[arg(long)]
    full_help: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.demo.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.demo.output_dir = output.clone();
        }
        if let Some(scale) = &self.scale {
            config.demo.scale = scale.clone();
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.engine.ffmpeg_path = ffmpeg.clone();
        }
        if !self.only.is_empty() {
            config.demo.features = Feature::canonical(&self.only);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting ffmpeg-showcase v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    cli.apply(&mut config);
    config.validate()?;

    if let Some(path) = &cli.write_config {
        config.save_to_file(path)?;
        info!("Configuration written to {:?}", path);
        return Ok(());
    }

    info!("ffmpeg: {:?}", config.engine.ffmpeg_path);
    info!("Input: {:?}", config.demo.input);
    info!("Output: {:?}", config.demo.output_dir);

    let engine = Arc::new(ProcessEngine::from_config(&config.engine));
    let orchestrator = Orchestrator::new(engine, config.demo.clone());
    let board = orchestrator.board();

    let report = match orchestrator.run(&board).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e.user_message());
            println!("{}", board.render(cli.full_help));
            return Err(e.into());
        }
    };

    println!("{}", board.render(cli.full_help));

    for failure in report.failures() {
        warn!("{} did not finish: {:?}", failure.step, failure.status);
    }

    info!("Showcase complete! Media exported to: {:?}", config.demo.output_dir);
    Ok(())
}
