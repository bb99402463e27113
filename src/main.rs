use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use printwatch::settings::{Overrides, Settings, SAMPLE_CONFIG};
use printwatch::{logging, Gatherer};
use printwatch_sdk::{Output, Poller};

#[derive(Parser, Debug)]
#[command(name = "printwatch")]
#[command(about = "Collect OctoPrint printer and FilamentManager spool metrics")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OctoPrint URL (overrides octoprint.url)
    #[arg(short, long)]
    url: Option<String>,

    /// OctoPrint API key (overrides octoprint.apikey)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Gather interval (e.g., "10s", "500ms", "1m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,

    /// Log filter (e.g., "debug", "printwatch=trace"); defaults to RUST_LOG or info
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.sample_config {
        print!("{}", SAMPLE_CONFIG);
        return Ok(());
    }

    logging::init(args.log_level.as_deref(), args.log_json)?;

    let overrides = Overrides {
        url: args.url.clone(),
        api_key: args.api_key.clone(),
        interval: args.interval.clone(),
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(run(settings, args.once))
}

async fn run(settings: Settings, once: bool) -> Result<()> {
    let gatherer = Gatherer::from_settings(&settings).await?;
    let poller = build_poller(&settings);

    if once {
        let batch = poller.poll_once(&gatherer).await;
        tracing::info!(records = batch.len(), "single cycle complete");
        return Ok(());
    }

    tracing::info!(
        interval = %printwatch::duration::format_duration(poller.interval()),
        "starting printwatch"
    );
    let handle = poller.start(Arc::new(gatherer));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("shutting down");
    handle.shutdown().await;
    Ok(())
}

/// Build the poller with every output enabled in the settings
fn build_poller(settings: &Settings) -> Poller {
    let mut builder = Poller::builder()
        .interval(settings.interval)
        .timeout(settings.timeout);

    if settings.output.stdout {
        builder = builder.output(Output::stdout());
    }
    if let Some(path) = settings.output.file_path() {
        builder = builder.output(Output::file(path));
    }
    if let Some(addr) = settings.output.tcp_addr() {
        builder = builder.output(Output::tcp(addr));
    }

    builder.build()
}
