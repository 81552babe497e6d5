use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `flexpool-demo` binary.
///
/// These settings control the size of the pool, the shape of the scripted
/// workload and how long the demo pauses between steps. All values are parsed
/// from CLI arguments or environment variables (a `.env` file is loaded
/// first), with defaults that reproduce the reference walkthrough.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flexpool-demo",
    version,
    about = "Walks a dynamically resized worker pool through adds, removes and shutdown"
)]
pub struct CliArgs {
    /// Number of items the shared queue buffers before senders wait.
    ///
    /// 0 is accepted and behaves as a single-slot handoff.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 5)]
    pub queue_capacity: usize,

    /// Workers started before the first batch is sent.
    ///
    /// The script later removes worker #2 (or #1 when it is the only one).
    /// With a single initial worker and no extra workers, a final batch larger
    /// than the queue waits until the demo is interrupted.
    ///
    /// Environment variable: `INITIAL_WORKERS`
    #[arg(long, env = "INITIAL_WORKERS", default_value_t = 3)]
    pub initial_workers: usize,

    /// Workers added after the first batch.
    ///
    /// Environment variable: `EXTRA_WORKERS`
    #[arg(long, env = "EXTRA_WORKERS", default_value_t = 2)]
    pub extra_workers: usize,

    /// Items in each of the first two batches.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = 10)]
    pub batch_size: usize,

    /// Items in the last batch, sent after a worker was removed.
    ///
    /// Environment variable: `FINAL_BATCH_SIZE`
    #[arg(long, env = "FINAL_BATCH_SIZE", default_value_t = 5)]
    pub final_batch_size: usize,

    /// Simulated processing time per item, in milliseconds.
    ///
    /// Environment variable: `JOB_DELAY_MS`
    #[arg(long, env = "JOB_DELAY_MS", default_value_t = 100)]
    pub job_delay_ms: u64,

    /// Pause after each batch so workers can catch up, in milliseconds.
    /// Removals wait half of this.
    ///
    /// Environment variable: `SETTLE_MS`
    #[arg(long, env = "SETTLE_MS", default_value_t = 1000)]
    pub settle_ms: u64,

    /// Upper bound on how long shutdown may wait for workers, in seconds.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT_SECS`
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub queue_capacity: usize,
    pub initial_workers: usize,
    pub extra_workers: usize,
    pub batch_size: usize,
    pub final_batch_size: usize,
    pub job_delay: Duration,
    pub settle: Duration,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for DemoConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.initial_workers == 0 {
            bail!("INITIAL_WORKERS must be greater than 0");
        }

        if args.batch_size == 0 {
            bail!("BATCH_SIZE must be greater than 0");
        }

        if args.shutdown_timeout_secs == 0 {
            bail!("SHUTDOWN_TIMEOUT_SECS must be greater than 0");
        }

        let shutdown_floor = args.job_delay_ms.div_ceil(1000);
        if args.shutdown_timeout_secs < shutdown_floor {
            bail!(
                "SHUTDOWN_TIMEOUT_SECS ({}) is shorter than a single job ({} ms)",
                args.shutdown_timeout_secs,
                args.job_delay_ms
            );
        }

        Ok(Self {
            queue_capacity: args.queue_capacity,
            initial_workers: args.initial_workers,
            extra_workers: args.extra_workers,
            batch_size: args.batch_size,
            final_batch_size: args.final_batch_size,
            job_delay: Duration::from_millis(args.job_delay_ms),
            settle: Duration::from_millis(args.settle_ms),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout_secs),
        })
    }
}
