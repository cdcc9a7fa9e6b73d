use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dream_sft::formatters::{CohereFormatter, OpenAiFormatter, SftFormatter};
use dream_sft::pipeline::{self, ExecutionMode};
use dream_sft::record::ValidationPolicy;
use dream_sft::report::{self, OutputFormats, QualityReport};
use dream_sft::utils::{format_duration, truncate};
use dream_sft::{io, PipelineConfig, QualityThreshold};

#[derive(Parser)]
#[command(
    name = "dream_sft",
    about = "Clean, score and export Turkish dream interpretations for fine-tuning"
)]
struct Cli {
    /// Input JSON file (array of records)
    #[arg(short, long)]
    input: PathBuf,
    /// Output directory (default: OUTPUT_DIR or ./output)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Minimum cleaned content length in chars
    #[arg(long)]
    min_content_length: Option<usize>,
    /// Minimum quality score, as points (70) or a fraction (0.7)
    #[arg(long, value_parser = QualityThreshold::parse)]
    min_quality_score: Option<QualityThreshold>,
    /// Force the parallel path even for small inputs
    #[arg(long)]
    parallel: bool,
    /// Worker threads for the parallel path (default: auto)
    #[arg(long)]
    max_workers: Option<usize>,
    /// Records per chunk for the parallel path (default: auto)
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Time a small sample before the full run
    #[arg(long)]
    benchmark: bool,
    /// Abort when too many input records are invalid
    #[arg(long)]
    strict: bool,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(n) = self.min_content_length {
            config.min_content_length = n;
        }
        if let Some(t) = self.min_quality_score {
            config.min_quality_score = t;
        }
        if let Some(n) = self.max_workers.filter(|n| *n > 0) {
            config.max_workers = Some(n);
        }
        if let Some(n) = self.chunk_size.filter(|n| *n > 0) {
            config.chunk_size = Some(n);
        }
        if self.strict {
            config.strict_validation = true;
        }
    }
}

fn init_tracing(config: &PipelineConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("loading configuration")?;
    cli.apply(&mut config);
    config.validate()?;
    init_tracing(&config)?;

    let t0 = Instant::now();
    info!(
        input = %cli.input.display(),
        output = %config.output.dir.display(),
        threshold = config.min_quality_score.get(),
        "starting dream SFT run"
    );

    let policy = ValidationPolicy {
        strict: config.strict_validation,
        max_errors: config.max_validation_errors,
    };
    let input = io::load_records(&cli.input, &policy)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    println!(
        "Loaded {} records ({} invalid, skipped)",
        input.records.len(),
        input.errors.len()
    );
    for e in input.errors.iter().take(5) {
        println!("  {}", truncate(&e.to_string(), 100));
    }
    if input.records.is_empty() {
        warn!("no valid records in input");
    }

    if cli.benchmark {
        let b = pipeline::benchmark(&input.records, &config);
        println!(
            "Benchmark: {} records in {} ({:.1} records/s)",
            b.records,
            format_duration(b.elapsed),
            b.records_per_second
        );
    }

    let mode = if cli.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Auto
    };
    let (records, stats) = pipeline::run(&input.records, &config, mode, !cli.no_progress)?;
    stats.print();

    let openai = OpenAiFormatter.format_batch(&records);
    let cohere = CohereFormatter.format_batch(&records);

    let out = &config.output;
    if out.save_processed_data {
        io::save_json(&records, &out.dir.join("processed_data.json"))?;
    }
    if out.save_openai_format {
        io::save_jsonl(&openai, &out.dir.join("openai_format.jsonl"))?;
    }
    if out.save_cohere_format {
        io::save_jsonl(&cohere, &out.dir.join("cohere_format.jsonl"))?;
    }

    let summary = report::summarize(input.total, &records, &stats);
    summary.print();
    if out.save_quality_report {
        let quality = QualityReport::new(
            summary,
            OutputFormats::new(openai.len(), cohere.len()),
            report::analyze_batch(&records),
        );
        println!(
            "Dataset grade: {} ({:.1})",
            quality.analysis.quality_grade, quality.analysis.overall_quality_score
        );
        io::save_json(&quality, &out.dir.join("quality_report.json"))?;
    }

    println!(
        "{} OpenAI / {} Cohere examples written to {}",
        openai.len(),
        cohere.len(),
        out.dir.display()
    );
    println!("\nDone in {}", format_duration(t0.elapsed()));
    Ok(())
}
