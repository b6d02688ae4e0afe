use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use confetch::utils::file_io::open_file_for_append;
use confetch::{
    ControllerConfig, DedupQueue, MemoryStore, MonitoringConfig, PollingEventSource, Reconciler,
    ReqwestFetcher,
};
use confetch::{Controller, Error, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "confetch", version, about = "Annotation-driven config-record reconciliation controller")]
struct Cli {
    /// Path to the controller configuration file
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match ControllerConfig::load(Some(cli.config.as_path())) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to build controller config from: {}", cli.config.display());
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Initializing Logs
    let _guard = init_observability(&settings.monitoring)?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    // Wire the controller. The in-memory store stands in for a real backend;
    // swap in any ConfigStore implementation here.
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(DedupQueue::new());
    let fetcher = Arc::new(ReqwestFetcher::new(&settings.http)?);
    let source = Arc::new(PollingEventSource::new(
        store.clone(),
        queue.clone(),
        Duration::from_millis(settings.source.poll_interval_ms),
    ));
    let reconciler = Arc::new(Reconciler::new(store, fetcher, &settings.reconcile));
    let mut controller = Controller::new(queue, source, reconciler);

    if settings.monitoring.prometheus_enabled {
        let port = settings.monitoring.prometheus_port;
        let metrics_rx = graceful_rx.clone();
        tokio::spawn(async move {
            confetch::start_server(port, metrics_rx).await;
        });
    }

    info!("Application started. Waiting for CTRL+C signal...");
    // Listen on Shutdown Signal
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    // Start the controller loop
    if let Err(e) = controller.run(graceful_rx).await {
        error!("controller stops: {:?}", e);
    }

    println!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    info!("Shutdown server..");
    let mut sigint = signal(SignalKind::interrupt()).unwrap();
    let mut sigterm = signal(SignalKind::terminate()).unwrap();
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::Fatal(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

pub fn init_observability(config: &MonitoringConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::InvalidConfig(format!("bad log_level '{}': {}", config.log_level, e)))?;

    match &config.log_dir {
        Some(dir) => {
            let log_file = open_file_for_append(dir.join("confetch.log"))
                .map_err(|e| Error::Fatal(format!("failed to open log file: {e}")))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
            let base_subscriber = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_filter(filter);
            tracing_subscriber::registry().with(base_subscriber).init();

            Ok(Some(guard))
        }
        None => {
            let base_subscriber = tracing_subscriber::fmt::layer().with_filter(filter);
            tracing_subscriber::registry().with(base_subscriber).init();

            Ok(None)
        }
    }
}
