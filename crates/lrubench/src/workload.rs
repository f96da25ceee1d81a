//! Synthetic cache-aside workload
//!
//! Every thread walks keys `0..n` repeatedly. A hit returns the cached value;
//! a miss pays for `work_units` rounds of CPU work and caches the result.

use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use lrucache::{CacheStats, LruCache};
use tracing::debug;

/// Value stored for every pre-populated key
const PREPOPULATED_VALUE: u64 = 42;

/// Parameters shared by all workload sizes
#[derive(Debug, Clone, Copy)]
pub struct WorkloadParams {
    /// Fraction of the key space the cache can hold
    pub cache_ratio: f64,
    /// Worker threads sharing one cache
    pub threads: usize,
    /// Passes over the key space per thread
    pub rounds: usize,
    /// Cost of a miss
    pub work_units: u64,
}

/// Outcome of one workload size
#[derive(Debug)]
pub struct WorkloadReport {
    pub workload_size: u64,
    pub capacity: usize,
    pub baseline: Duration,
    pub cached: Duration,
    pub stats: CacheStats,
    pub final_size: usize,
}

impl WorkloadParams {
    /// Cache capacity for a key space of `workload_size`
    pub fn capacity_for(&self, workload_size: u64) -> Result<usize> {
        if !self.cache_ratio.is_finite() || self.cache_ratio <= 0.0 {
            bail!("cache ratio must be a positive number, got {}", self.cache_ratio);
        }
        let capacity = (workload_size as f64 * self.cache_ratio).ceil() as usize;
        Ok(capacity.max(1))
    }
}

/// Deterministic CPU burn standing in for an expensive computation
pub fn expensive_work(seed: u64, units: u64) -> u64 {
    (0..units).fold(seed, |acc, i| acc.rotate_left(5).wrapping_add(i) ^ 0x9e37_79b9)
}

/// Run the uncached and cached passes for one key space size
pub fn run(workload_size: u64, params: &WorkloadParams) -> Result<WorkloadReport> {
    if params.threads == 0 {
        bail!("at least one worker thread is required");
    }

    let capacity = params.capacity_for(workload_size)?;
    let cache = LruCache::with_max_size(capacity)
        .with_context(|| format!("creating cache for workload {}", workload_size))?;

    for key in (0..workload_size).step_by(2) {
        cache.add(key, PREPOPULATED_VALUE);
    }
    debug!(
        workload_size,
        capacity,
        prepopulated = cache.size(),
        "cache warmed"
    );

    let baseline = timed(params.threads, || {
        for _ in 0..params.rounds {
            for key in 0..workload_size {
                black_box(expensive_work(key, params.work_units));
            }
        }
    });

    let cached = timed(params.threads, || {
        for _ in 0..params.rounds {
            for key in 0..workload_size {
                let value = match cache.get(&key) {
                    Some(value) => value,
                    None => {
                        let value = expensive_work(key, params.work_units);
                        cache.add(key, value);
                        value
                    }
                };
                black_box(value);
            }
        }
    });

    Ok(WorkloadReport {
        workload_size,
        capacity,
        baseline,
        cached,
        stats: cache.stats(),
        final_size: cache.size(),
    })
}

/// Run `body` on `threads` scoped threads and time the whole batch
fn timed<F>(threads: usize, body: F) -> Duration
where
    F: Fn() + Sync,
{
    let start = Instant::now();
    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(&body);
        }
    });
    start.elapsed()
}
