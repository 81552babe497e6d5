#![doc = include_str!("../README.md")]

mod demo;

use clap::Parser;
use demo::{
    config::{CliArgs, DemoConfig},
    job::SimulatedJob,
    script::run_script,
    telemetry::init_telemetry,
};
use flexpool::WorkerPool;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DemoConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let pool = WorkerPool::new(config.queue_capacity, SimulatedJob::new(config.job_delay));

    tokio::select! {
        res = run_script(&pool, &config) => res?,
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received, skipping the rest of the script");
        }
    }

    tracing::info!("Shutting down worker pool");
    pool.shutdown_timeout(config.shutdown_timeout).await?;
    tracing::info!("All tasks handled, pool has stopped");

    Ok(())
}

fn log_startup_info(config: &DemoConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting worker pool demo with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting worker pool demo with {} initial workers",
            config.initial_workers
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
