use anyhow::Context;
use clap::Parser;
use clarity_client::config::Config;
use clarity_client::options::{
    CleanupOptions, HighPassOptions, NoiseReduceOptions, NormalizeOptions, OutputFormat,
    TrimSilenceOptions, UploadOptions,
};
use clarity_client::view::ConsoleView;
use clarity_client::{CleanupClient, JobState, UploadController, UploadFile};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload an audio file to the Audio Clarity service and wait for the
/// cleaned result.
#[derive(Debug, Parser)]
#[command(name = "clarity-client", version)]
struct Cli {
    /// Audio file to clean up
    file: PathBuf,

    /// Output container format
    #[arg(long, value_enum, default_value_t = OutputFormat::Wav)]
    format: OutputFormat,

    /// Base URL of the cleanup service (overrides CLARITY_SERVER_URL)
    #[arg(long)]
    server: Option<String>,

    /// Normalize loudness
    #[arg(long)]
    normalize: bool,

    /// Normalization target in dBFS
    #[arg(long, default_value_t = -16.0, allow_hyphen_values = true)]
    target_dbfs: f64,

    /// Reduce broadband noise
    #[arg(long)]
    noise_reduce: bool,

    /// Noise reduction strength (0.0 - 1.0)
    #[arg(long, default_value_t = 0.8)]
    strength: f64,

    /// Apply a high-pass filter
    #[arg(long)]
    high_pass: bool,

    /// High-pass cutoff frequency in Hz
    #[arg(long, default_value_t = 80)]
    cutoff_hz: u32,

    /// Trim long silences
    #[arg(long)]
    trim_silence: bool,

    /// Minimum silence length to trim, in milliseconds
    #[arg(long, default_value_t = 500)]
    min_silence_ms: u32,

    /// Silence to re-insert at trim points, in milliseconds
    #[arg(long, default_value_t = 250)]
    insert_ms: u32,
}

impl Cli {
    fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            output_format: self.format,
            cleanup: CleanupOptions {
                normalize: self.normalize.then(|| NormalizeOptions {
                    enabled: true,
                    target_dbfs: self.target_dbfs,
                }),
                noise_reduce: self.noise_reduce.then(|| NoiseReduceOptions {
                    enabled: true,
                    strength: self.strength,
                }),
                high_pass: self.high_pass.then(|| HighPassOptions {
                    enabled: true,
                    cutoff_hz: self.cutoff_hz,
                }),
                trim_silence: self.trim_silence.then(|| TrimSilenceOptions {
                    enabled: true,
                    min_silence_ms: self.min_silence_ms,
                    insert_ms: self.insert_ms,
                }),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clarity_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let server_url = cli.server.clone().unwrap_or_else(|| config.server_url.clone());
    info!(server = %server_url, "Configuration loaded");

    let file_name = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .with_context(|| format!("invalid file path: {}", cli.file.display()))?;
    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let client = CleanupClient::new(&server_url, config.request_timeout)?;
    let mut controller =
        UploadController::new(client, ConsoleView::default(), config.poll_interval);

    let options = cli.upload_options();
    let started = controller
        .submit(Some(UploadFile { name: file_name, bytes }), &options)
        .await;
    if !started {
        anyhow::bail!("upload was not accepted");
    }

    match controller.run_to_completion().await {
        Some(snapshot) if snapshot.state == JobState::Success => Ok(()),
        Some(_) => anyhow::bail!("audio cleanup failed"),
        None => anyhow::bail!("polling ended without a result"),
    }
}
