use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use posecam::{present, PosecamConfig, SourceSelector, SubmissionClient, UploadedFile};
use tokio::fs;
use tracing::{info, warn};

/// Submit a video file to a posecam relay and print the pose angles.
#[derive(Parser, Debug)]
#[command(name = "posecam-submit")]
#[command(about = "Upload a video to the posecam relay and print the pose analysis")]
struct Args {
    /// Video file to analyze
    file: PathBuf,

    /// Path to posecam configuration file (for client settings)
    #[arg(short = 'c', long, default_value = "posecam.toml")]
    config: PathBuf,

    /// Relay base URL (overrides client.relay_url)
    #[arg(short, long)]
    relay_url: Option<String>,

    /// Give up after this many seconds (overrides client.timeout_seconds)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Write the annotated video returned by the engine to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the raw JSON result instead of the summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("posecam=warn")),
        )
        .init();

    let args = Args::parse();

    let mut config = PosecamConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(relay_url) = args.relay_url {
        config.client.relay_url = relay_url;
    }
    if args.timeout.is_some() {
        config.client.timeout_seconds = args.timeout;
    }

    let upload = UploadedFile::from_path(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    if upload.data.is_empty() {
        warn!("{} is empty; submitting anyway", args.file.display());
    }

    let mut sources = SourceSelector::new();
    sources.handle_upload(upload);
    let source = sources
        .active_source()
        .ok_or_else(|| anyhow!("No video selected"))?;

    let client = SubmissionClient::new(&config.client)?;
    info!("Submitting {} to {}", args.file.display(), client.endpoint());

    let result = client
        .submit(source)
        .await
        .context("Failed to analyze pose")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    let presentation = present(&result)?;

    if !args.json {
        for line in presentation.summary_lines() {
            println!("{}", line);
        }
    }

    if let Some(output) = args.output {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&output, presentation.video.bytes()).await?;
        println!(
            "Processed video ({} bytes) written to {}",
            presentation.video.bytes().len(),
            output.display()
        );
    }

    Ok(())
}
