//! airlog - environmental sensor logging daemon.
//!
//! Run with: `cargo run -p airlog-daemon -- --simulate`

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use airlog_core::Registry;
use airlog_daemon::{Collector, Config, SimBackend};
use airlog_store::{DailyLog, HttpObjectStore, Sink};

/// Environmental sensor logging daemon.
#[derive(Parser, Debug)]
#[command(name = "airlog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for the daily CSV logs (overrides config).
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Seconds between cycles (overrides config).
    #[arg(short, long)]
    interval: Option<u64>,

    /// Disable object-store mirroring.
    #[arg(long)]
    no_upload: bool,

    /// Run against the simulated sensor rig instead of hardware.
    #[arg(long)]
    simulate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airlog_daemon=info".parse()?)
                .add_directive("airlog_core=info".parse()?)
                .add_directive("airlog_store=info".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Override config with CLI args
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(interval) = args.interval {
        config.collector.interval_secs = interval;
    }
    if args.no_upload {
        config.upload.enabled = false;
    }
    config.validate()?;

    info!(
        "airlog starting: data dir {}, cycle every {}s, upload {}",
        config.storage.data_dir.display(),
        config.collector.interval_secs,
        if config.upload.enabled { "on" } else { "off" },
    );

    // Bring up the sensor rig
    if !args.simulate {
        anyhow::bail!(
            "no hardware backend is linked into this binary; \
             run with --simulate, or build a binary that wires a hardware Backend in"
        );
    }
    let mut backend = SimBackend::new();
    info!("using simulated sensor rig");
    let registry = Registry::initialize(&mut backend, &config.collector.init_options()).await;

    // Build the sink
    let log = DailyLog::open(&config.storage.data_dir)?;
    let mut sink = Sink::new(log);
    if config.upload.enabled {
        let mut store = HttpObjectStore::new(&config.upload.endpoint, &config.upload.bucket)?;
        if let Some(token) = &config.upload.token {
            store = store.with_token(token);
        }
        info!(
            "mirroring daily logs to {} (bucket {})",
            config.upload.endpoint, config.upload.bucket
        );
        sink = sink.with_store(Box::new(store));
    }

    // Stop on interrupt
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    Collector::new(
        registry,
        sink,
        config.collector.compensation_defaults(),
        config.collector.interval(),
        config.collector.error_backoff(),
        shutdown,
    )
    .run()
    .await;

    info!("airlog stopped");
    Ok(())
}
