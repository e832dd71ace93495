//! lrustress - multi-threaded stress driver for lrucache

use anyhow::{bail, Result};
use clap::Parser;
use lrucache::Cache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of entries)
    #[arg(short, long, default_value_t = 100)]
    capacity: usize,

    /// Worker threads
    #[arg(short, long, default_value_t = 8)]
    threads: usize,

    /// Operations per thread
    #[arg(short, long, default_value_t = 100_000)]
    ops: usize,

    /// Distinct keys in the workload
    #[arg(short, long, default_value_t = 1000)]
    keys: usize,

    /// Fraction of operations that are reads
    #[arg(short, long, default_value_t = 0.8)]
    read_ratio: f64,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            bail!("--threads must be at least 1");
        }
        if self.keys == 0 {
            bail!("--keys must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.read_ratio) {
            bail!("--read-ratio must be within [0, 1], got {}", self.read_ratio);
        }
        Ok(())
    }
}

fn run_worker(cache: &Cache<String, Arc<String>>, args: &Args, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..args.ops {
        let n = rng.gen_range(0..args.keys);
        let key = format!("key{}", n);

        if rng.gen_bool(args.read_ratio) {
            if let Some(value) = cache.get(key.as_str()) {
                debug_assert_eq!(*value, format!("value{}", n));
            }
        } else {
            cache.put(key, Arc::new(format!("value{}", n)));
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Arc::new(Args::parse());
    args.validate()?;

    info!("Starting lrustress v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", args.capacity);
    info!(
        "Workload: {} threads x {} ops, {} keys, read ratio {}",
        args.threads, args.ops, args.keys, args.read_ratio
    );

    let cache = Arc::new(Cache::new(args.capacity));
    let start = Instant::now();

    let handles: Vec<_> = (0..args.threads)
        .map(|t| {
            let cache = cache.clone();
            let args = args.clone();
            thread::spawn(move || run_worker(&cache, &args, t as u64))
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            bail!("worker thread panicked");
        }
    }

    let elapsed = start.elapsed();
    let total_ops = args.threads * args.ops;
    let ops_per_sec = total_ops as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    if cache.len() > cache.capacity() {
        bail!(
            "cache holds {} entries, capacity {}",
            cache.len(),
            cache.capacity()
        );
    }
    cache.check_invariants()?;

    let stats = cache.stats();
    if stats.total() == 0 {
        warn!("No reads issued; hit ratio is meaningless");
    }

    info!("Elapsed: {:.3?}", elapsed);
    info!("Throughput: {:.0} ops/sec", ops_per_sec);
    info!("Entries: {}/{}", cache.len(), cache.capacity());
    info!(
        "Hits: {}, misses: {}, hit ratio: {:.2}%",
        stats.hits,
        stats.misses,
        stats.hit_ratio() * 100.0
    );

    Ok(())
}
