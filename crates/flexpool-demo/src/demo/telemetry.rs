//! Log output for the demo.
//!
//! Everything the pool reports goes through `tracing`. This installs a
//! `tracing_subscriber::fmt` layer that prints those events to the console,
//! filtered by `RUST_LOG` (default `info`). Set `RUST_LOG=debug` to also see
//! worker start/stop events and backpressure waits.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
