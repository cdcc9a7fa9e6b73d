//! Chunked processing on a bounded rayon pool.
//!
//! The input is split into contiguous ranges, each range is handed to a
//! `ChunkWorker`, and results are merged by chunk index so the output keeps
//! input order. A chunk that errors or panics is contained: its records count
//! as rejected and the rest of the run goes on.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{error, info};

use super::partition;
use super::sequential::SequentialProcessor;
use super::stats::{records_per_second, Mode, ParallelStats, ProcessingStats};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::record::{CleanedRecord, RawRecord};
use crate::utils::panic_message;

/// What a worker produced for one chunk.
#[derive(Debug, Default)]
pub struct ChunkOutput {
    pub records: Vec<CleanedRecord>,
    pub rejected: usize,
    pub record_errors: usize,
}

/// Processes one contiguous chunk. `offset` is the input index of
/// `records[0]`.
pub trait ChunkWorker: Sync {
    fn process_chunk(&self, records: &[RawRecord], offset: usize) -> Result<ChunkOutput>;
}

struct ChunkResult {
    index: usize,
    thread: usize,
    len: usize,
    outcome: Result<ChunkOutput>,
}

pub struct ParallelProcessor<'a, W = SequentialProcessor> {
    config: &'a PipelineConfig,
    worker: W,
    show_progress: bool,
}

impl<'a> ParallelProcessor<'a, SequentialProcessor> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self::with_worker(config, SequentialProcessor::new(config))
    }
}

impl<'a, W: ChunkWorker> ParallelProcessor<'a, W> {
    pub fn with_worker(config: &'a PipelineConfig, worker: W) -> Self {
        ParallelProcessor {
            config,
            worker,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn process_parallel(
        &self,
        records: &[RawRecord],
    ) -> Result<(Vec<CleanedRecord>, ProcessingStats)> {
        let start = Instant::now();
        let total = records.len();
        if total == 0 {
            return Ok((Vec::new(), ProcessingStats::empty(Mode::Parallel)));
        }

        let available = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = self
            .config
            .max_workers
            .unwrap_or_else(|| partition::worker_budget_for(total, available))
            .max(1);
        let chunk_size = partition::chunk_size_for(total, workers, self.config.chunk_size);
        let ranges = partition::partition(total, workers, self.config.chunk_size);
        info!(
            records = total,
            workers,
            chunk_size,
            chunks = ranges.len(),
            "starting parallel run"
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dream-sft-{i}"))
            .build()?;
        let pb = progress_bar(ranges.len(), self.show_progress);

        let results: Vec<ChunkResult> = pool.install(|| {
            ranges
                .par_iter()
                .enumerate()
                .map(|(index, range)| {
                    let chunk = &records[range.clone()];
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.worker.process_chunk(chunk, range.start)
                    }))
                    .unwrap_or_else(|payload| {
                        Err(PipelineError::Worker(panic_message(payload.as_ref())))
                    });
                    pb.inc(1);
                    ChunkResult {
                        index,
                        thread: rayon::current_thread_index().unwrap_or(0),
                        len: chunk.len(),
                        outcome,
                    }
                })
                .collect()
        });
        pb.finish_and_clear();

        let mut kept = Vec::new();
        let mut rejected = 0;
        let mut record_errors = 0;
        let mut per_worker_records = vec![0; workers];
        let mut failed_chunks = Vec::new();

        for result in results {
            if let Some(n) = per_worker_records.get_mut(result.thread) {
                *n += result.len;
            }
            match result.outcome {
                Ok(out) => {
                    kept.extend(out.records);
                    rejected += out.rejected;
                    record_errors += out.record_errors;
                }
                Err(e) => {
                    error!(chunk = result.index, records = result.len, %e, "chunk failed");
                    failed_chunks.push(result.index);
                    rejected += result.len;
                }
            }
        }

        if failed_chunks.len() == ranges.len() {
            return Err(PipelineError::AllChunksFailed {
                chunks: ranges.len(),
            });
        }

        let elapsed = start.elapsed();
        let stats = ProcessingStats {
            input: total,
            output: kept.len(),
            rejected,
            record_errors,
            elapsed,
            mode: Mode::Parallel,
            parallel: Some(ParallelStats {
                workers,
                chunk_size,
                chunk_count: ranges.len(),
                per_worker_records,
                failed_chunks,
                records_per_second: records_per_second(total, elapsed),
            }),
        };
        info!(
            kept = stats.output,
            rejected = stats.rejected,
            elapsed_ms = elapsed.as_millis() as u64,
            "parallel run done"
        );
        Ok((kept, stats))
    }
}

fn progress_bar(chunks: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(chunks as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
