//! Run summary and dataset quality analysis.
//!
//! `summarize` is the short before/after view printed at the end of a run.
//! `analyze_batch` is the longer dataset analysis that goes into
//! `quality_report.json` next to it.

use std::fmt;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::pipeline::ProcessingStats;
use crate::record::CleanedRecord;
use crate::scoring::cultural;
use crate::utils::{percent, round2};

const EXCELLENT_AVG: f64 = 85.0;
const GOOD_AVG: f64 = 70.0;
const READY_SCORE: u8 = 70;
const READY_MIN_CHARS: usize = 100;
const WELL_REPRESENTED: usize = 5;
const TOP_SYMBOLS: usize = 10;
const TARGET_DATASET_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Readiness {
    pub fn from_average(avg: f64) -> Self {
        if avg >= EXCELLENT_AVG {
            Readiness::Excellent
        } else if avg >= GOOD_AVG {
            Readiness::Good
        } else {
            Readiness::NeedsImprovement
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Readiness::Excellent => "excellent",
            Readiness::Good => "good",
            Readiness::NeedsImprovement => "needs_improvement",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub original_count: usize,
    pub cleaned_count: usize,
    /// `cleaned_count / original_count`, 0 for an empty input.
    pub retention_rate: f64,
    pub average_content_length: f64,
    pub average_quality_score: f64,
    /// Share of kept records with at least one tag.
    pub tag_coverage: f64,
    pub training_readiness: Readiness,
    pub processing: ProcessingStats,
}

impl Report {
    pub fn print(&self) {
        println!(
            "Kept {}/{} records ({:.1}%), avg length {:.0} chars, avg score {:.1}, {:.0}% tagged",
            self.cleaned_count,
            self.original_count,
            self.retention_rate * 100.0,
            self.average_content_length,
            self.average_quality_score,
            self.tag_coverage * 100.0,
        );
        println!("Training readiness: {}", self.training_readiness);
    }
}

pub fn summarize(original_count: usize, records: &[CleanedRecord], stats: &ProcessingStats) -> Report {
    let n = records.len();
    let mean = |total: f64| if n == 0 { 0.0 } else { total / n as f64 };

    let average_quality_score = mean(records.iter().map(|r| r.quality_score as f64).sum());
    Report {
        original_count,
        cleaned_count: n,
        retention_rate: if original_count == 0 {
            0.0
        } else {
            n as f64 / original_count as f64
        },
        average_content_length: mean(records.iter().map(|r| r.cleaned_length as f64).sum()),
        average_quality_score,
        tag_coverage: mean(records.iter().filter(|r| !r.tags.is_empty()).count() as f64),
        training_readiness: Readiness::from_average(average_quality_score),
        processing: stats.clone(),
    }
}

// ── Extended dataset analysis ──

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolCoverage {
    pub total_symbol_instances: usize,
    pub unique_symbols: usize,
    /// 100 minus the share of the most common symbol.
    pub distribution_balance_score: f64,
    /// Share of symbols with at least five records.
    pub coverage_quality_score: f64,
    pub most_common_symbols: Vec<SymbolCount>,
    pub singleton_symbols: usize,
    pub avg_instances_per_symbol: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldCompleteness {
    pub total_records: usize,
    pub has_title: f64,
    pub has_content: f64,
    pub has_dream_symbol: f64,
    pub has_tags: f64,
    pub has_description: f64,
    pub has_seo_title: f64,
    pub has_url: f64,
    /// Mean of the title, content and dream-symbol percentages.
    pub overall_completeness: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct QualityDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReadiness {
    pub training_ready_count: usize,
    pub training_readiness_percentage: f64,
    pub average_quality_score: f64,
    pub quality_distribution: QualityDistribution,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AuthenticityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CulturalAuthenticity {
    pub average_cultural_authenticity: f64,
    pub records_with_traditional_context: usize,
    pub records_with_islamic_context: usize,
    pub traditional_context_percentage: f64,
    pub islamic_context_percentage: f64,
    pub distribution: AuthenticityDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Grade {
    fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::Excellent
        } else if score >= 75.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::Fair
        } else {
            Grade::NeedsImprovement
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grade::Excellent => "EXCELLENT",
            Grade::Good => "GOOD",
            Grade::Fair => "FAIR",
            Grade::NeedsImprovement => "NEEDS_IMPROVEMENT",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalysis {
    pub overall_quality_score: f64,
    pub quality_grade: Grade,
    pub total_records_analyzed: usize,
    pub symbol_coverage: SymbolCoverage,
    pub completeness: FieldCompleteness,
    pub training_readiness: TrainingReadiness,
    pub cultural_authenticity: CulturalAuthenticity,
    pub recommendations: Vec<String>,
}

pub fn analyze_batch(records: &[CleanedRecord]) -> BatchAnalysis {
    info!(records = records.len(), "analyzing dataset quality");
    let symbol_coverage = symbol_coverage(records);
    let completeness = field_completeness(records);
    let training_readiness = training_readiness(records);
    let cultural_authenticity = cultural_authenticity(records);

    let overall = (completeness.overall_completeness
        + training_readiness.training_readiness_percentage
        + cultural_authenticity.average_cultural_authenticity
        + symbol_coverage.distribution_balance_score)
        / 4.0;
    let recommendations = recommendations(
        records.len(),
        overall,
        &training_readiness,
        &cultural_authenticity,
    );

    BatchAnalysis {
        overall_quality_score: round2(overall),
        quality_grade: Grade::from_score(overall),
        total_records_analyzed: records.len(),
        symbol_coverage,
        completeness,
        training_readiness,
        cultural_authenticity,
        recommendations,
    }
}

fn symbol_coverage(records: &[CleanedRecord]) -> SymbolCoverage {
    let counts = records
        .iter()
        .map(|r| r.dream_symbol.as_str())
        .filter(|s| !s.is_empty())
        .counts();
    let total: usize = counts.values().sum();
    let unique = counts.len();

    let most_common: Vec<SymbolCount> = counts
        .iter()
        .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
        .take(TOP_SYMBOLS)
        .map(|(s, &count)| SymbolCount {
            symbol: s.to_string(),
            count,
        })
        .collect();

    let (balance, coverage) = match most_common.first() {
        Some(top) => {
            let well_represented = counts.values().filter(|&&c| c >= WELL_REPRESENTED).count();
            (
                (100.0 - percent(top.count, total)).max(0.0),
                percent(well_represented, unique),
            )
        }
        None => (0.0, 0.0),
    };

    SymbolCoverage {
        total_symbol_instances: total,
        unique_symbols: unique,
        distribution_balance_score: round2(balance),
        coverage_quality_score: round2(coverage),
        most_common_symbols: most_common,
        singleton_symbols: counts.values().filter(|&&c| c == 1).count(),
        avg_instances_per_symbol: round2(total as f64 / unique.max(1) as f64),
    }
}

fn field_completeness(records: &[CleanedRecord]) -> FieldCompleteness {
    let total = records.len();
    let share = |pred: fn(&CleanedRecord) -> bool| percent(records.iter().filter(|r| pred(r)).count(), total);

    let has_title = share(|r| !r.title.is_empty());
    let has_content = share(|r| !r.cleaned_content.is_empty());
    let has_dream_symbol = share(|r| !r.dream_symbol.is_empty());
    FieldCompleteness {
        total_records: total,
        has_title,
        has_content,
        has_dream_symbol,
        has_tags: share(|r| !r.tags.is_empty()),
        has_description: share(|r| !r.description.is_empty()),
        has_seo_title: share(|r| !r.seo_title.is_empty()),
        has_url: share(|r| !r.url.is_empty()),
        overall_completeness: (has_title + has_content + has_dream_symbol) / 3.0,
    }
}

fn training_readiness(records: &[CleanedRecord]) -> TrainingReadiness {
    let mut distribution = QualityDistribution::default();
    for r in records {
        let score = r.quality_score;
        if score >= 90 {
            distribution.excellent += 1;
        } else if score >= 70 {
            distribution.good += 1;
        } else if score >= 50 {
            distribution.fair += 1;
        } else {
            distribution.poor += 1;
        }
    }
    let ready = records
        .iter()
        .filter(|r| {
            r.quality_score >= READY_SCORE
                && !r.dream_symbol.is_empty()
                && r.cleaned_length >= READY_MIN_CHARS
        })
        .count();
    let average = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.quality_score as f64).sum::<f64>() / records.len() as f64
    };

    TrainingReadiness {
        training_ready_count: ready,
        training_readiness_percentage: round2(percent(ready, records.len())),
        average_quality_score: round2(average),
        quality_distribution: distribution,
    }
}

fn cultural_authenticity(records: &[CleanedRecord]) -> CulturalAuthenticity {
    let mut distribution = AuthenticityDistribution::default();
    let mut traditional_records = 0;
    let mut islamic_records = 0;
    let mut total_score = 0;

    for r in records {
        let (traditional, islamic) = cultural::context_counts(&r.cleaned_content);
        let score = (traditional * 10 + islamic * 5).min(100);
        total_score += score;
        if score >= 50 {
            distribution.high += 1;
        } else if score >= 20 {
            distribution.medium += 1;
        } else {
            distribution.low += 1;
        }
        if traditional > 0 {
            traditional_records += 1;
        }
        if islamic > 0 {
            islamic_records += 1;
        }
    }

    CulturalAuthenticity {
        average_cultural_authenticity: if records.is_empty() {
            0.0
        } else {
            round2(total_score as f64 / records.len() as f64)
        },
        records_with_traditional_context: traditional_records,
        records_with_islamic_context: islamic_records,
        traditional_context_percentage: round2(percent(traditional_records, records.len())),
        islamic_context_percentage: round2(percent(islamic_records, records.len())),
        distribution,
    }
}

fn recommendations(
    total: usize,
    overall: f64,
    readiness: &TrainingReadiness,
    authenticity: &CulturalAuthenticity,
) -> Vec<String> {
    if total == 0 {
        return vec!["No records to analyze".to_string()];
    }
    let mut out = Vec::new();
    if overall < 70.0 {
        out.push("Overall data quality needs significant improvement");
    }
    if readiness.training_readiness_percentage < 80.0 {
        out.push("Consider additional data cleaning and filtering");
    }
    if authenticity.average_cultural_authenticity < 30.0 {
        out.push("Enhance cultural context preservation in content cleaning");
    }
    if readiness.average_quality_score < 70.0 {
        out.push("Improve HTML cleaning and content extraction");
    }
    if total < TARGET_DATASET_SIZE {
        out.push("Consider data augmentation to increase dataset size");
    }
    if overall >= 80.0 {
        out.push("Data quality is excellent, ready for SFT training");
    }
    if readiness.training_readiness_percentage >= 90.0 {
        out.push("High training readiness, consider advanced data augmentation");
    }
    out.into_iter().map(String::from).collect()
}

// ── Report file ──

#[derive(Debug, Clone, Serialize)]
pub struct OutputFormats {
    pub openai_records: usize,
    pub cohere_records: usize,
    pub format_consistency: bool,
}

impl OutputFormats {
    pub fn new(openai_records: usize, cohere_records: usize) -> Self {
        OutputFormats {
            openai_records,
            cohere_records,
            format_consistency: openai_records == cohere_records,
        }
    }
}

/// Everything written to `quality_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub summary: Report,
    pub output_formats: OutputFormats,
    pub analysis: BatchAnalysis,
}

impl QualityReport {
    pub fn new(summary: Report, output_formats: OutputFormats, analysis: BatchAnalysis) -> Self {
        QualityReport {
            generated_at: Utc::now(),
            summary,
            output_formats,
            analysis,
        }
    }
}
