//! Turns a scraped Turkish dream-interpretation export into a filtered,
//! fine-tuning-ready dataset.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod formatters;
pub mod io;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod scoring;
pub mod utils;

pub use crate::config::{PipelineConfig, QualityThreshold};
pub use error::{PipelineError, RecordError, Result};
pub use pipeline::{benchmark, run, ExecutionMode, ProcessingStats};
pub use record::{CleanedRecord, RawRecord};
pub use report::{analyze_batch, summarize, Report};
