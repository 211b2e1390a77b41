use std::sync::Arc;

use anyhow::Context;
use cfg::Cfg;
use clap::Parser;
use heap::ConcurrentBinaryMinHeap;
use naive::NaiveQueue;
use queue::{
    PriorityQueue,
    test::stress::{Job, StressTestConfig, run_stress_test},
};
use tracing_subscriber::EnvFilter;

pub mod cfg;

const LATENCY_PERCENTILES: [f64; 4] = [50.0, 90.0, 99.0, 99.9];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = cfg::Cfg::parse();
    tracing::info!("running configuration:\n{cfg:#?}");

    let res = match cfg.implementation {
        cfg::Implementation::Naive => run_naive(&cfg),
        cfg::Implementation::Heap => run_heap(&cfg),
    };
    if let Err(e) = res {
        tracing::error!("{e:?}");
        std::process::exit(1);
    }
}

fn run_naive(cfg: &Cfg) -> anyhow::Result<()> {
    let capacity = usize::try_from(cfg.initial_capacity)
        .context("the naive queue needs a non-negative initial capacity")?;
    run(Arc::new(NaiveQueue::new(capacity)), cfg)
}

fn run_heap(cfg: &Cfg) -> anyhow::Result<()> {
    let heap = ConcurrentBinaryMinHeap::try_with_capacity(cfg.initial_capacity)
        .context("could not create the heap")?;
    let heap = Arc::new(heap);

    run(Arc::clone(&heap), cfg)?;
    tracing::info!(capacity = heap.capacity(), "final heap capacity");
    Ok(())
}

fn run<Q: PriorityQueue<Job>>(queue: Arc<Q>, cfg: &Cfg) -> anyhow::Result<()> {
    let config = StressTestConfig {
        num_producers: cfg.producer_num,
        num_elements: cfg.element_num,
        num_consumers: cfg.consumer_num,
        payload_size_range: (256, 1_024),
        drain_interval_ms: cfg.drain_interval_ms,
        drain_batch_size: cfg.drain_batch_size,
        priority_range: (0.0, 1_000.0),
        run_duration_seconds: cfg.run_duration_seconds,
    };
    let results = run_stress_test(queue, config);
    results.print_summary(&LATENCY_PERCENTILES);

    anyhow::ensure!(
        results.is_consistent(),
        "the queue lost elements or drained them out of order"
    );
    Ok(())
}
