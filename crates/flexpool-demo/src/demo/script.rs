use super::{config::DemoConfig, job::SimulatedJob};
use flexpool::{WorkerId, WorkerPool};
use tokio::time::sleep;

type DemoPool = WorkerPool<String, SimulatedJob>;

/// Walks the pool through a fixed sequence of membership changes while work is
/// flowing.
///
/// 1. Start the initial workers and send the first batch.
/// 2. Add the extra workers and send the second batch.
/// 3. Remove worker #2, then send the final batch to the survivors.
/// 4. Try to remove worker #2 again, which reports that it is gone.
/// 5. Remove the first extra worker.
///
/// Shutdown is left to the caller so it also runs when the script is
/// interrupted.
pub async fn run_script(pool: &DemoPool, config: &DemoConfig) -> anyhow::Result<()> {
    let half_settle = config.settle / 2;

    tracing::info!("--- Adding {} initial workers ---", config.initial_workers);
    let initial = add_workers(pool, config.initial_workers);

    tracing::info!("--- Sending the first {} tasks ---", config.batch_size);
    send_batch(pool, 1, config.batch_size).await;
    sleep(config.settle).await;

    tracing::info!("--- Adding {} more workers ---", config.extra_workers);
    let extra = add_workers(pool, config.extra_workers);

    tracing::info!("--- Sending {} more tasks ---", config.batch_size);
    send_batch(pool, config.batch_size + 1, config.batch_size).await;
    sleep(config.settle).await;

    // Worker #2 when there is one, the first worker otherwise.
    let victim = initial
        .get(1)
        .or_else(|| initial.first())
        .copied()
        .ok_or_else(|| anyhow::anyhow!("no initial workers were started"))?;
    tracing::info!("--- Removing worker {victim} ---");
    report_removal(victim, pool.remove_worker(victim));
    sleep(half_settle).await;

    tracing::info!("--- Sending the last {} tasks ---", config.final_batch_size);
    send_batch(pool, 2 * config.batch_size + 1, config.final_batch_size).await;
    sleep(config.settle).await;

    tracing::info!("--- Removing worker {victim} again (already removed) ---");
    report_removal(victim, pool.remove_worker(victim));

    if let Some(&second_victim) = extra.first() {
        tracing::info!("--- Removing worker {second_victim} ---");
        report_removal(second_victim, pool.remove_worker(second_victim));
        sleep(half_settle).await;
    }

    tracing::info!(
        "Script finished with {} registered workers ({:?}) and {} queued tasks",
        pool.worker_count(),
        pool.worker_ids(),
        pool.queued()
    );

    Ok(())
}

fn add_workers(pool: &DemoPool, count: usize) -> Vec<WorkerId> {
    (0..count)
        .map(|_| {
            let worker_id = pool.add_worker();
            tracing::info!("Worker #{worker_id} added");
            worker_id
        })
        .collect()
}

/// Sends `count` tasks numbered from `first`. Refused sends are logged by the
/// pool and not retried.
async fn send_batch(pool: &DemoPool, first: usize, count: usize) {
    for n in first..first + count {
        if let Err(e) = pool.send(format!("task #{n}")).await {
            tracing::warn!("Task #{n} was not queued: {e}");
        }
    }
}

fn report_removal(worker_id: WorkerId, removed: bool) {
    if removed {
        tracing::info!("Worker #{worker_id} removed");
    } else {
        tracing::info!("Worker #{worker_id} was not registered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn quick_config() -> DemoConfig {
        DemoConfig {
            queue_capacity: 5,
            initial_workers: 3,
            extra_workers: 2,
            batch_size: 10,
            final_batch_size: 5,
            job_delay: Duration::from_millis(1),
            settle: Duration::from_millis(20),
            shutdown_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn script_removes_second_and_fourth_worker() {
        let config = quick_config();
        let pool = WorkerPool::new(config.queue_capacity, SimulatedJob::new(config.job_delay));

        run_script(&pool, &config).await.unwrap();

        let remaining: Vec<u64> = pool.worker_ids().into_iter().map(u64::from).collect();
        assert_eq!(remaining, vec![1, 3, 5]);
        assert_eq!(pool.queued(), 0);

        pool.shutdown_timeout(config.shutdown_timeout).await.unwrap();
        assert_eq!(pool.active_workers(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn script_with_single_worker_removes_it() {
        let config = DemoConfig {
            initial_workers: 1,
            extra_workers: 0,
            ..quick_config()
        };
        let pool = WorkerPool::new(config.queue_capacity, SimulatedJob::new(config.job_delay));

        run_script(&pool, &config).await.unwrap();

        assert_eq!(pool.worker_count(), 0);
        pool.shutdown_timeout(config.shutdown_timeout).await.unwrap();
    }
}
