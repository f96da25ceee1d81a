//! lrubench - cache-aside workload driver for lrucache

mod workload;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::workload::WorkloadParams;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key space sizes to run, one workload per size
    #[arg(short, long, value_delimiter = ',', default_value = "10,100,1000,10000")]
    workload_sizes: Vec<u64>,

    /// Cache capacity as a fraction of the key space
    #[arg(long, default_value_t = 0.5)]
    cache_ratio: f64,

    /// Worker threads sharing the cache
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Passes over the key space per thread
    #[arg(short, long, default_value_t = 100)]
    rounds: usize,

    /// CPU work performed on every miss
    #[arg(long, default_value_t = 1000)]
    work_units: u64,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let params = WorkloadParams {
        cache_ratio: args.cache_ratio,
        threads: args.threads,
        rounds: args.rounds,
        work_units: args.work_units,
    };

    info!("Starting lrubench v{}", env!("CARGO_PKG_VERSION"));
    info!("Threads: {}, rounds: {}", params.threads, params.rounds);

    for &size in &args.workload_sizes {
        let report = workload::run(size, &params)?;
        info!(
            workload = report.workload_size,
            capacity = report.capacity,
            baseline_ms = report.baseline.as_secs_f64() * 1e3,
            cached_ms = report.cached.as_secs_f64() * 1e3,
            hits = report.stats.hits,
            misses = report.stats.misses,
            hit_ratio = report.stats.hit_ratio(),
            final_size = report.final_size,
            "workload finished"
        );
    }

    Ok(())
}
