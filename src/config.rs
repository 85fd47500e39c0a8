//! Configuration management for the risk scoring engine

use crate::engine::rules::RuleTable;
use crate::error::ConfigError;
use crate::types::assessment::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// What the batch reader does with a row whose fields cannot be coerced
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Drop the row and report it
    #[default]
    Skip,
    /// Replace bad fields with their defaults, keep the row and report it
    Default,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ordered rule table; replaces the built-in table when present
    #[serde(default)]
    pub rules: RuleTable,
}

/// Scoring constants
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score before any rule fires
    pub baseline: f64,
    /// Upper clamp; the engine never reports more than this
    pub ceiling: f64,
    /// Scores strictly above this are classified as fraud
    pub fraud_threshold: f64,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.baseline.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "scoring.baseline",
                expected: "finite",
                value: self.baseline,
            });
        }
        if !(self.ceiling > 0.0 && self.ceiling <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "scoring.ceiling",
                expected: "in (0, 1]",
                value: self.ceiling,
            });
        }
        if !(0.0..=1.0).contains(&self.fraud_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "scoring.fraud_threshold",
                expected: "in [0, 1]",
                value: self.fraud_threshold,
            });
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: 0.1,
            ceiling: 0.99,
            fraud_threshold: 0.5,
        }
    }
}

/// Batch mode configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BatchConfig {
    pub on_invalid_row: InvalidRowPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app.validate().context("Invalid configuration")?;
        Ok(app)
    }

    /// Load from `path` if given, else from the default location if it
    /// exists, else fall back to built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.rules.validate()?;

        let levels = &self.risk_levels;
        if !(0.0..=1.0).contains(&levels.medium) || !(0.0..=1.0).contains(&levels.high) {
            return Err(ConfigError::OutOfRange {
                field: "risk_levels",
                expected: "in [0, 1]",
                value: levels.medium.max(levels.high),
            });
        }
        if levels.medium > levels.high {
            return Err(ConfigError::OutOfRange {
                field: "risk_levels.medium",
                expected: "at most risk_levels.high",
                value: levels.medium,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::TransactionRecord;
    use std::io::Write;

    fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fraud_sentinel_{}_{}.toml",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.baseline, 0.1);
        assert_eq!(config.scoring.ceiling, 0.99);
        assert_eq!(config.scoring.fraud_threshold, 0.5);
        assert_eq!(config.risk_levels, RiskLevelThresholds::default());
        assert_eq!(config.batch.on_invalid_row, InvalidRowPolicy::Skip);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.rules.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = write_config(
            "partial",
            "[scoring]\nfraud_threshold = 0.7\n\n[batch]\non_invalid_row = \"default\"\n",
        );
        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.scoring.fraud_threshold, 0.7);
        assert_eq!(config.scoring.baseline, 0.1);
        assert_eq!(config.batch.on_invalid_row, InvalidRowPolicy::Default);
        assert_eq!(config.rules.len(), 4);
    }

    #[test]
    fn test_rules_from_file() {
        let path = write_config(
            "rules",
            r#"
[[rules]]
label = "Very high amount"
score_weight = 0.7
reason_weight = 0.6
kind = "amount_above"
threshold = 3000

[[rules]]
label = "Web device"
score_weight = 0.05
reason_weight = 0.05
kind = "device_is"
device = "Web"
"#,
        );
        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.rules.labels(), vec!["Very high amount", "Web device"]);
        let rule = config.rules.get("Very high amount").unwrap();
        assert!(rule.fires(&TransactionRecord::default().with_amount(3500.0)));
        assert!(!rule.fires(&TransactionRecord::default().with_amount(2500.0)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let path = write_config("invalid", "[scoring]\nceiling = 1.2\n");
        let result = AppConfig::load_from_path(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());

        let mut config = AppConfig::default();
        config.risk_levels.medium = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format() {
        let path = write_config("log_json", "[logging]\nformat = \"json\"\n");
        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");

        let path = write_config("log_unknown", "[logging]\nformat = \"xml\"\n");
        let result = AppConfig::load_from_path(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load_from_path("/nonexistent/fraud_sentinel.toml");
        assert!(result.is_err());
    }
}
