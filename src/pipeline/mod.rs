pub mod parallel;
pub mod partition;
pub mod sequential;
pub mod stats;

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

pub use parallel::{ChunkOutput, ChunkWorker, ParallelProcessor};
pub use sequential::SequentialProcessor;
pub use stats::{Mode, ParallelStats, ProcessingStats};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::record::{CleanedRecord, RawRecord};

const BENCHMARK_SAMPLE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Sequential below `partition::SEQUENTIAL_BELOW` records, parallel above.
    #[default]
    Auto,
    Sequential,
    Parallel,
}

/// Clean, score and filter `records` with the requested execution mode.
pub fn run(
    records: &[RawRecord],
    config: &PipelineConfig,
    mode: ExecutionMode,
    show_progress: bool,
) -> Result<(Vec<CleanedRecord>, ProcessingStats)> {
    let parallel = match mode {
        ExecutionMode::Sequential => false,
        ExecutionMode::Parallel => true,
        ExecutionMode::Auto => records.len() >= partition::SEQUENTIAL_BELOW,
    };
    if parallel {
        ParallelProcessor::new(config)
            .show_progress(show_progress)
            .process_parallel(records)
    } else {
        Ok(SequentialProcessor::new(config).process_batch(records))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub records: usize,
    pub kept: usize,
    #[serde(skip)]
    pub elapsed: Duration,
    pub records_per_second: f64,
}

/// Time the sequential path on the first few records of `sample`.
pub fn benchmark(sample: &[RawRecord], config: &PipelineConfig) -> BenchmarkResult {
    let sample = &sample[..sample.len().min(BENCHMARK_SAMPLE)];
    let start = Instant::now();
    let (kept, _) = SequentialProcessor::new(config).process_batch(sample);
    let elapsed = start.elapsed();
    let result = BenchmarkResult {
        records: sample.len(),
        kept: kept.len(),
        elapsed,
        records_per_second: stats::records_per_second(sample.len(), elapsed),
    };
    info!(
        records = result.records,
        per_sec = result.records_per_second,
        "benchmark done"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                RawRecord::new(
                    "Rüyada Fare Görmek",
                    "<p>Rüyada fare görmek, tabire göre bereket ve rızk işaretidir.</p>",
                    format!("u{i}"),
                )
            })
            .collect()
    }

    #[test]
    fn auto_mode_switches_on_size() {
        let cfg = PipelineConfig::default();
        let (_, small) = run(&records(49), &cfg, ExecutionMode::Auto, false).unwrap();
        assert_eq!(small.mode, Mode::Sequential);
        let (_, large) = run(&records(50), &cfg, ExecutionMode::Auto, false).unwrap();
        assert_eq!(large.mode, Mode::Parallel);
    }

    #[test]
    fn forced_modes_agree() {
        let cfg = PipelineConfig::default();
        let input = records(12);
        let (a, _) = run(&input, &cfg, ExecutionMode::Sequential, false).unwrap();
        let (b, stats) = run(&input, &cfg, ExecutionMode::Parallel, false).unwrap();
        assert_eq!(a, b);
        assert_eq!(stats.mode, Mode::Parallel);
    }

    #[test]
    fn benchmark_caps_sample() {
        let cfg = PipelineConfig::default();
        let r = benchmark(&records(25), &cfg);
        assert_eq!(r.records, 10);
        assert_eq!(r.kept, 10);
        assert_eq!(benchmark(&[], &cfg).records, 0);
    }
}
