//! Record quality scoring.
//!
//! Starts from 100 and applies length, cultural-context, readability,
//! repetition and noise adjustments. The result is clamped to 0–100 and
//! compared against the configured threshold.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::cultural;
use crate::config::{PipelineConfig, QualityThreshold};
use crate::record::CleanedFields;
use crate::utils::lowercase_tr;

const BASE_SCORE: i32 = 100;
const LENGTH_PENALTY_MAX: usize = 50;
const READABILITY_PENALTY: i32 = 10;
const MIN_AVG_SENTENCE_WORDS: f64 = 5.0;
const REPETITION_PENALTY: i32 = 15;
const REPETITION_MIN_WORDS: usize = 10;
const REPETITION_MAX_SHARE: f64 = 0.15;
const NOISE_PENALTY: i32 = 15;

const SENTENCE_END: &[char] = &['.', '!', '?', '…'];

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(netcore|seo|amp|milliyet|pembenar|anlamsız|çok fazla tekrar)\b").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityIssue {
    EmptyContent,
    TooShort { chars: usize, min: usize },
    TooLong { chars: usize, max: usize },
    WeakCulturalContext { matches: usize },
    NoCulturalContext,
    ShortSentences,
    NoTerminalPunctuation,
    Repetitive { word: String },
    Noise { marker: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: u8,
    pub accepted: bool,
    pub cultural_indicators: usize,
    pub issues: Vec<QualityIssue>,
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    min_length: usize,
    max_length: usize,
    min_cultural_indicators: usize,
    threshold: QualityThreshold,
}

impl Evaluator {
    pub fn new(config: &PipelineConfig) -> Self {
        Evaluator {
            min_length: config.min_content_length,
            max_length: config.max_content_length,
            min_cultural_indicators: config.min_cultural_indicators,
            threshold: config.min_quality_score,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold.get()
    }

    pub fn evaluate(&self, fields: &CleanedFields) -> Evaluation {
        self.evaluate_text(&fields.cleaned_content)
    }

    pub fn evaluate_text(&self, content: &str) -> Evaluation {
        let content = content.trim();
        if content.is_empty() {
            return Evaluation {
                score: 0,
                accepted: self.threshold.get() == 0,
                cultural_indicators: 0,
                issues: vec![QualityIssue::EmptyContent],
            };
        }

        let mut issues = Vec::new();
        let mut score = BASE_SCORE;

        let chars = content.chars().count();
        score -= self.length_penalty(chars, &mut issues);

        let matches = cultural::score(content);
        let adjustment = cultural::bonus(matches, self.min_cultural_indicators);
        if adjustment < 0 {
            issues.push(QualityIssue::NoCulturalContext);
        } else if adjustment == 0 {
            issues.push(QualityIssue::WeakCulturalContext { matches });
        }
        score += adjustment;

        score -= readability_penalty(content, &mut issues);
        score -= repetition_penalty(content, &mut issues);
        score -= noise_penalty(content, &mut issues);

        let score = score.clamp(0, 100) as u8;
        Evaluation {
            score,
            accepted: score >= self.threshold.get(),
            cultural_indicators: matches,
            issues,
        }
    }

    /// `ceil(ratio * 50)`, capped at 50, where ratio is the shortfall or
    /// excess relative to the violated bound.
    fn length_penalty(&self, chars: usize, issues: &mut Vec<QualityIssue>) -> i32 {
        let (distance, bound) = if chars < self.min_length {
            issues.push(QualityIssue::TooShort {
                chars,
                min: self.min_length,
            });
            (self.min_length - chars, self.min_length)
        } else if chars > self.max_length {
            issues.push(QualityIssue::TooLong {
                chars,
                max: self.max_length,
            });
            (chars - self.max_length, self.max_length.max(1))
        } else {
            return 0;
        };
        let penalty = (distance * LENGTH_PENALTY_MAX).div_ceil(bound);
        penalty.min(LENGTH_PENALTY_MAX) as i32
    }
}

fn readability_penalty(content: &str, issues: &mut Vec<QualityIssue>) -> i32 {
    let mut penalty = 0;

    let sentences: Vec<usize> = content
        .split(SENTENCE_END)
        .map(|s| s.split_whitespace().count())
        .filter(|&n| n > 0)
        .collect();
    if !sentences.is_empty() {
        let avg = sentences.iter().sum::<usize>() as f64 / sentences.len() as f64;
        if avg < MIN_AVG_SENTENCE_WORDS {
            issues.push(QualityIssue::ShortSentences);
            penalty += READABILITY_PENALTY;
        }
    }

    if !content.contains(SENTENCE_END) {
        issues.push(QualityIssue::NoTerminalPunctuation);
        penalty += READABILITY_PENALTY;
    }
    penalty
}

fn repetition_penalty(content: &str, issues: &mut Vec<QualityIssue>) -> i32 {
    let words: Vec<String> = content
        .split_whitespace()
        .map(|w| lowercase_tr(w.trim_matches(|c: char| !c.is_alphanumeric())))
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < REPETITION_MIN_WORDS {
        return 0;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for w in words.iter().filter(|w| w.chars().count() > 3) {
        *counts.entry(w.as_str()).or_default() += 1;
    }
    // Ties resolve alphabetically so the reported word is stable.
    let top = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)));
    match top {
        Some((word, n)) if n as f64 / words.len() as f64 > REPETITION_MAX_SHARE => {
            issues.push(QualityIssue::Repetitive {
                word: word.to_string(),
            });
            REPETITION_PENALTY
        }
        _ => 0,
    }
}

fn noise_penalty(content: &str, issues: &mut Vec<QualityIssue>) -> i32 {
    let mut seen: Vec<String> = Vec::new();
    for m in NOISE_RE.find_iter(content) {
        let marker = m.as_str().to_lowercase();
        if !seen.contains(&marker) {
            seen.push(marker);
        }
    }
    let penalty = NOISE_PENALTY * seen.len() as i32;
    issues.extend(seen.into_iter().map(|marker| QualityIssue::Noise { marker }));
    penalty
}
