use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::utils::{format_duration, percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Sequential,
    Parallel,
}

/// Outcome counters for one run. Built once when the run finishes.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStats {
    pub input: usize,
    pub output: usize,
    pub rejected: usize,
    /// Records whose processing failed outright (also counted in `rejected`).
    pub record_errors: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<ParallelStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParallelStats {
    pub workers: usize,
    pub chunk_size: usize,
    pub chunk_count: usize,
    /// Records handed to each pool thread, indexed by thread.
    pub per_worker_records: Vec<usize>,
    pub failed_chunks: Vec<usize>,
    pub records_per_second: f64,
}

impl ProcessingStats {
    pub fn empty(mode: Mode) -> Self {
        ProcessingStats {
            input: 0,
            output: 0,
            rejected: 0,
            record_errors: 0,
            elapsed: Duration::ZERO,
            mode,
            parallel: (mode == Mode::Parallel).then(ParallelStats::default),
        }
    }

    pub fn retention_rate(&self) -> f64 {
        percent(self.output, self.input)
    }

    pub fn print(&self) {
        println!(
            "Processed {} records: {} kept, {} rejected ({} errors), {:.1}% retained in {}.",
            self.input,
            self.output,
            self.rejected,
            self.record_errors,
            self.retention_rate(),
            format_duration(self.elapsed),
        );
        if let Some(p) = &self.parallel {
            println!(
                "  {} workers, {} chunks of ~{} records, {:.1} records/s",
                p.workers, p.chunk_count, p.chunk_size, p.records_per_second
            );
            if !p.failed_chunks.is_empty() {
                println!("  failed chunks: {:?}", p.failed_chunks);
            }
        }
    }
}

pub fn records_per_second(records: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        records as f64 / secs
    } else {
        0.0
    }
}

fn as_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_degenerate() {
        let s = ProcessingStats::empty(Mode::Parallel);
        assert_eq!(s.retention_rate(), 0.0);
        assert!(s.parallel.is_some());
        assert!(ProcessingStats::empty(Mode::Sequential).parallel.is_none());
    }

    #[test]
    fn serializes_elapsed_as_seconds() {
        let s = ProcessingStats {
            input: 4,
            output: 3,
            rejected: 1,
            record_errors: 0,
            elapsed: Duration::from_millis(1500),
            mode: Mode::Sequential,
            parallel: None,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["elapsed_secs"], 1.5);
        assert_eq!(v["mode"], "sequential");
        assert!(v.get("parallel").is_none());
    }

    #[test]
    fn throughput() {
        assert_eq!(records_per_second(10, Duration::from_secs(2)), 5.0);
        assert_eq!(records_per_second(10, Duration::ZERO), 0.0);
    }
}
