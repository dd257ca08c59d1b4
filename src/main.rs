use clap::Parser;
use miette::{IntoDiagnostic, Result};
use otpmatch::application::engine::{JoinConfig, JoinEngine};
use otpmatch::interfaces::csv::event_reader::ReplaySource;
use otpmatch::interfaces::csv::status_writer::CsvStatusSink;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment request events CSV file
    requests: PathBuf,

    /// Payment confirmation events CSV file
    confirmations: PathBuf,

    /// Join window in seconds, applied symmetrically in event time
    #[arg(long, default_value_t = 300)]
    window_secs: u64,

    /// Retention horizon in seconds (defaults to twice the window)
    #[arg(long)]
    retention_secs: Option<u64>,

    /// Number of shard workers
    #[arg(long, default_value_t = 1)]
    shards: usize,

    /// Capacity of each shard's routing channel
    #[arg(long, default_value_t = 1024)]
    channel_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the status CSV.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = JoinConfig::default()
        .with_window(Duration::from_secs(cli.window_secs))
        .with_shards(cli.shards)
        .with_channel_capacity(cli.channel_capacity);
    if let Some(retention_secs) = cli.retention_secs {
        config = config.with_retention(Duration::from_secs(retention_secs));
    }

    let sink = Arc::new(CsvStatusSink::new(io::stdout()));
    let engine = JoinEngine::new(config, sink);

    let source = ReplaySource::from_paths(&cli.requests, &cli.confirmations).into_diagnostic()?;
    let submitted = engine.consume(Box::new(source)).await.into_diagnostic()?;

    let stats = engine.shutdown().await.into_diagnostic()?;
    info!(
        submitted,
        matches = stats.matches_emitted,
        expired = stats.events_expired,
        requests_buffered = stats.requests_buffered,
        confirmations_buffered = stats.confirmations_buffered,
        "replay complete"
    );

    Ok(())
}
