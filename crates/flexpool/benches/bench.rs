use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flexpool::{WorkerId, WorkerPool};
use tokio::{runtime::Builder, sync::mpsc};

const ITEMS: u64 = 4096;
const CAPACITY: usize = 64;

/// Measures end-to-end throughput: items sent through the pool until every one
/// of them has been processed, for several worker counts.
fn bench_pool_throughput(c: &mut Criterion) {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let mut group = c.benchmark_group("pool");
    group.throughput(Throughput::Elements(ITEMS));

    for workers in [1_usize, 2, 4, 8] {
        group.bench_function(format!("send_{ITEMS}/workers_{workers}"), |b| {
            b.to_async(&runtime).iter(|| async move {
                let (done_tx, mut done_rx) = mpsc::unbounded_channel();
                let pool = WorkerPool::new(CAPACITY, move |_worker: WorkerId, item: u64| {
                    let done_tx = done_tx.clone();
                    async move {
                        let _ = done_tx.send(black_box(item));
                    }
                });

                for _ in 0..workers {
                    pool.add_worker();
                }
                for item in 0..ITEMS {
                    let _ = pool.send(item).await;
                }
                for _ in 0..ITEMS {
                    done_rx.recv().await;
                }

                pool.shutdown().await;
            });
        });
    }

    group.finish();
}

/// Measures the cost of growing and shrinking membership on a live pool.
fn bench_membership_churn(c: &mut Criterion) {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let pool = runtime.block_on(async {
        WorkerPool::new(CAPACITY, |_worker: WorkerId, item: u64| async move {
            black_box(item);
        })
    });

    c.bench_function("pool/add_remove_worker", |b| {
        b.iter(|| {
            let _guard = runtime.enter();
            let id = pool.add_worker();
            black_box(pool.remove_worker(id))
        });
    });

    runtime.block_on(pool.shutdown());
}

criterion_group!(benches, bench_pool_throughput, bench_membership_churn);
criterion_main!(benches);
