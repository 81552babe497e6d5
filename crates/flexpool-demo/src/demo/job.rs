use core::{future::Future, time::Duration};
use flexpool::{Job, WorkerId};

/// Stand-in for real work: logs the item, then sleeps for a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedJob {
    delay: Duration,
}

impl SimulatedJob {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Job<String> for SimulatedJob {
    fn run(&self, worker: WorkerId, item: String) -> impl Future<Output = ()> + Send {
        let delay = self.delay;
        async move {
            tracing::info!("Worker {worker}: processing {item}");
            tokio::time::sleep(delay).await;
        }
    }
}
