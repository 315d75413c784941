// One-off ffmpeg invocation through the showcase invoker

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ffmpeg_showcase::{
    config::Config,
    engine::ProcessEngine,
    runner::{RunInvoker, RunOptions},
};

#[derive(Parser)]
#[command(
    name = "probe",
    version,
    about = "Run a single ffmpeg invocation and print its classified output"
)]
struct Cli {
    /// ffmpeg binary to drive
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print progress lines as they arrive
    #[arg(short, long)]
    verbose: bool,

    /// Arguments forwarded to ffmpeg
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.engine.ffmpeg_path = ffmpeg.clone();
    }

    let invoker = RunInvoker::new(Arc::new(ProcessEngine::from_config(&config.engine)));
    if invoker.ensure_loaded().await? {
        info!("Loaded {:?}", config.engine.ffmpeg_path);
    }

    let verbose = cli.verbose;
    let options = RunOptions::default().on_progress(move |record| {
        if verbose {
            eprintln!("   … {}", record.message);
        }
    });
    let result = invoker.invoke(cli.args.clone(), options).await?;

    println!("── stdout ({} lines)", result.out_lines.len());
    for line in &result.out_lines {
        println!("{}", line);
    }
    println!("── stderr ({} lines)", result.err_lines.len());
    for line in &result.err_lines {
        println!("{}", line);
    }

    Ok(())
}
