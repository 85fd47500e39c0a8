//! Rule-based risk scoring engine

use crate::config::{AppConfig, ScoringConfig};
use crate::engine::rules::RuleTable;
use crate::error::ConfigError;
use crate::types::assessment::{Reason, RiskAssessment};
use crate::types::transaction::TransactionRecord;
use tracing::info;

/// Additive rule scorer.
///
/// Holds only its rule table and scoring constants; `score` reads nothing
/// else and writes nothing, so an engine can be shared freely across
/// threads.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    rules: RuleTable,
    scoring: ScoringConfig,
}

impl RiskEngine {
    /// Create a new engine from configuration
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let engine = Self::with_rules(config.rules.clone(), config.scoring.clone())?;

        info!(
            rules = engine.rules.len(),
            baseline = engine.scoring.baseline,
            ceiling = engine.scoring.ceiling,
            fraud_threshold = engine.scoring.fraud_threshold,
            "Risk engine initialized"
        );

        Ok(engine)
    }

    /// Create an engine with a custom rule table
    pub fn with_rules(rules: RuleTable, scoring: ScoringConfig) -> Result<Self, ConfigError> {
        scoring.validate()?;
        rules.validate()?;
        Ok(Self { rules, scoring })
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Score a single record.
    ///
    /// Starts at the baseline, adds the score weight of every rule whose
    /// predicate holds, clamps to `[0, ceiling]` and classifies with a
    /// strict `>` against the fraud threshold. Reasons keep table order and
    /// leave out zero-weight entries.
    pub fn score(&self, record: &TransactionRecord) -> RiskAssessment {
        let mut risk_score = self.scoring.baseline;
        let mut reasons = Vec::new();

        for rule in &self.rules {
            if !rule.fires(record) {
                continue;
            }

            risk_score += rule.score_weight;

            if rule.reason_weight > 0.0 {
                reasons.push(Reason::new(rule.label.clone(), rule.reason_weight));
            }
        }

        let score = risk_score.clamp(0.0, self.scoring.ceiling);

        RiskAssessment {
            score,
            is_fraud: score > self.scoring.fraud_threshold,
            reasons,
        }
    }

    /// Score every record independently; `out[i]` belongs to `records[i]`
    pub fn score_batch(&self, records: &[TransactionRecord]) -> Vec<RiskAssessment> {
        records.iter().map(|r| self.score(r)).collect()
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            rules: RuleTable::default(),
            scoring: ScoringConfig::default(),
        }
    }
}
