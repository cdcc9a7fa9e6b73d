//! Pipeline configuration.
//!
//! Built once at start-up from the environment (optionally seeded by a `.env`
//! file), adjusted by command-line overrides, then passed by reference to every
//! component. Nothing below `main` reads the environment.

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment};
use tracing::debug;

use crate::error::{PipelineError, Result};

const KEYS: &[&str] = &[
    "MIN_CONTENT_LENGTH",
    "MAX_CONTENT_LENGTH",
    "MIN_CULTURAL_INDICATORS",
    "MAX_WORKERS",
    "CHUNK_SIZE",
    "MIN_QUALITY_SCORE",
    "ENABLE_STRICT_VALIDATION",
    "MAX_VALIDATION_ERRORS",
    "OUTPUT_DIR",
    "SAVE_PROCESSED_DATA",
    "SAVE_OPENAI_FORMAT",
    "SAVE_COHERE_FORMAT",
    "SAVE_QUALITY_REPORT",
    "LOG_LEVEL",
    "LOG_FILE",
];

/// Minimum accepted quality score on the 0–100 scale.
///
/// Settings may express it either as points (`70`) or as a fraction (`0.7`);
/// both normalize to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QualityThreshold(u8);

impl QualityThreshold {
    pub fn points(points: u8) -> Self {
        QualityThreshold(points.min(100))
    }

    /// A literal with a decimal point and a value of at most 1.0 is a fraction;
    /// anything else is read as points.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let raw = raw.trim();
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("`{raw}` is not a number"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("`{raw}` must be a non-negative number"));
        }
        let points = if raw.contains('.') && value <= 1.0 {
            value * 100.0
        } else {
            value
        };
        if points > 100.0 {
            return Err(format!("`{raw}` is above 100"));
        }
        Ok(QualityThreshold(points.round() as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for QualityThreshold {
    fn default() -> Self {
        QualityThreshold(70)
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub save_processed_data: bool,
    pub save_openai_format: bool,
    pub save_cohere_format: bool,
    pub save_quality_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("output"),
            save_processed_data: true,
            save_openai_format: true,
            save_cohere_format: true,
            save_quality_report: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_content_length: usize,
    pub max_content_length: usize,
    pub min_cultural_indicators: usize,
    /// `None` = pick from record count and available cores.
    pub max_workers: Option<usize>,
    /// `None` = derive from record count and worker budget.
    pub chunk_size: Option<usize>,
    pub min_quality_score: QualityThreshold,
    pub strict_validation: bool,
    pub max_validation_errors: usize,
    pub output: OutputConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_content_length: 100,
            max_content_length: 5000,
            min_cultural_indicators: 3,
            max_workers: None,
            chunk_size: None,
            min_quality_score: QualityThreshold::default(),
            strict_validation: false,
            max_validation_errors: 10,
            output: OutputConfig::default(),
            log_level: "INFO".to_string(),
            log_file: None,
        }
    }
}

impl PipelineConfig {
    /// Load `.env` (if any) and read the known keys from the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| KEYS.contains(&k.as_str()))
            .collect();
        Self::from_vars(vars)
    }

    /// Build from an explicit key/value map (upper-case keys, as in the environment).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Environment::default().source(Some(vars)))
            .build()?;
        debug!(settings = ?settings, "settings collected");
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Config) -> Result<Self> {
        let defaults = PipelineConfig::default();
        let lookup = |key: &str| -> Option<String> {
            settings
                .get_string(&key.to_lowercase())
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = PipelineConfig {
            min_content_length: parse_usize(lookup("MIN_CONTENT_LENGTH"), "MIN_CONTENT_LENGTH")?
                .unwrap_or(defaults.min_content_length),
            max_content_length: parse_usize(lookup("MAX_CONTENT_LENGTH"), "MAX_CONTENT_LENGTH")?
                .unwrap_or(defaults.max_content_length),
            min_cultural_indicators: parse_usize(
                lookup("MIN_CULTURAL_INDICATORS"),
                "MIN_CULTURAL_INDICATORS",
            )?
            .unwrap_or(defaults.min_cultural_indicators),
            max_workers: parse_usize(lookup("MAX_WORKERS"), "MAX_WORKERS")?.filter(|n| *n > 0),
            chunk_size: parse_usize(lookup("CHUNK_SIZE"), "CHUNK_SIZE")?.filter(|n| *n > 0),
            min_quality_score: match lookup("MIN_QUALITY_SCORE") {
                Some(raw) => QualityThreshold::parse(&raw).map_err(|reason| PipelineError::Config {
                    key: "MIN_QUALITY_SCORE",
                    reason,
                })?,
                None => defaults.min_quality_score,
            },
            strict_validation: parse_bool(lookup("ENABLE_STRICT_VALIDATION"))
                .unwrap_or(defaults.strict_validation),
            max_validation_errors: parse_usize(
                lookup("MAX_VALIDATION_ERRORS"),
                "MAX_VALIDATION_ERRORS",
            )?
            .unwrap_or(defaults.max_validation_errors),
            output: OutputConfig {
                dir: lookup("OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.output.dir),
                save_processed_data: parse_bool(lookup("SAVE_PROCESSED_DATA"))
                    .unwrap_or(defaults.output.save_processed_data),
                save_openai_format: parse_bool(lookup("SAVE_OPENAI_FORMAT"))
                    .unwrap_or(defaults.output.save_openai_format),
                save_cohere_format: parse_bool(lookup("SAVE_COHERE_FORMAT"))
                    .unwrap_or(defaults.output.save_cohere_format),
                save_quality_report: parse_bool(lookup("SAVE_QUALITY_REPORT"))
                    .unwrap_or(defaults.output.save_quality_report),
            },
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_file: lookup("LOG_FILE").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_content_length > self.max_content_length {
            return Err(PipelineError::Config {
                key: "MIN_CONTENT_LENGTH",
                reason: format!(
                    "{} is greater than MAX_CONTENT_LENGTH {}",
                    self.min_content_length, self.max_content_length
                ),
            });
        }
        Ok(())
    }
}

fn parse_usize(raw: Option<String>, key: &'static str) -> Result<Option<usize>> {
    raw.map(|v| {
        v.parse::<usize>().map_err(|_| PipelineError::Config {
            key,
            reason: format!("`{v}` is not a non-negative integer"),
        })
    })
    .transpose()
}

fn parse_bool(raw: Option<String>) -> Option<bool> {
    raw.map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_empty() {
        let c = PipelineConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(c.min_content_length, 100);
        assert_eq!(c.max_content_length, 5000);
        assert_eq!(c.min_cultural_indicators, 3);
        assert_eq!(c.max_workers, None);
        assert_eq!(c.chunk_size, None);
        assert_eq!(c.min_quality_score.get(), 70);
        assert!(!c.strict_validation);
        assert_eq!(c.max_validation_errors, 10);
        assert!(c.output.save_openai_format);
    }

    #[test]
    fn empty_values_mean_auto() {
        let c = PipelineConfig::from_vars(vars(&[("MAX_WORKERS", ""), ("CHUNK_SIZE", "  ")])).unwrap();
        assert_eq!(c.max_workers, None);
        assert_eq!(c.chunk_size, None);
    }

    #[test]
    fn reads_values() {
        let c = PipelineConfig::from_vars(vars(&[
            ("MIN_CONTENT_LENGTH", "150"),
            ("MAX_WORKERS", "6"),
            ("CHUNK_SIZE", "25"),
            ("ENABLE_STRICT_VALIDATION", "yes"),
            ("SAVE_COHERE_FORMAT", "false"),
            ("OUTPUT_DIR", "out/run1"),
        ]))
        .unwrap();
        assert_eq!(c.min_content_length, 150);
        assert_eq!(c.max_workers, Some(6));
        assert_eq!(c.chunk_size, Some(25));
        assert!(c.strict_validation);
        assert!(!c.output.save_cohere_format);
        assert_eq!(c.output.dir, PathBuf::from("out/run1"));
    }

    #[test]
    fn bad_number_is_config_error() {
        let err = PipelineConfig::from_vars(vars(&[("MAX_WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, PipelineError::Config { key: "MAX_WORKERS", .. }));
    }

    #[test]
    fn min_above_max_rejected() {
        let err = PipelineConfig::from_vars(vars(&[
            ("MIN_CONTENT_LENGTH", "6000"),
            ("MAX_CONTENT_LENGTH", "5000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn threshold_fraction_and_points_agree() {
        assert_eq!(QualityThreshold::parse("0.7").unwrap(), QualityThreshold::parse("70").unwrap());
        assert_eq!(QualityThreshold::parse("0.85").unwrap().get(), 85);
        assert_eq!(QualityThreshold::parse("1.0").unwrap().get(), 100);
        assert_eq!(QualityThreshold::parse("1").unwrap().get(), 1);
        assert!(QualityThreshold::parse("120").is_err());
        assert!(QualityThreshold::parse("-3").is_err());
    }

    #[test]
    fn threshold_from_env_fraction() {
        let c = PipelineConfig::from_vars(vars(&[("MIN_QUALITY_SCORE", "0.8")])).unwrap();
        assert_eq!(c.min_quality_score.get(), 80);
    }
}
