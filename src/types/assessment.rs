//! Risk assessment data structures

use serde::{Deserialize, Serialize};

/// A triggered factor and its display weight.
///
/// The weight is a severity indicator for presentation; it is not the
/// factor's contribution to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub label: String,
    pub weight: f64,
}

impl Reason {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

/// Result of scoring one transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped risk score (0.0 - ceiling)
    pub score: f64,

    /// True iff the score is strictly above the fraud threshold
    pub is_fraud: bool,

    /// Triggered factors in rule-table order
    pub reasons: Vec<Reason>,
}

impl RiskAssessment {
    /// Labels of the triggered factors, in order
    pub fn reason_labels(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.label.as_str()).collect()
    }

    /// Whether a factor with this label fired
    pub fn has_reason(&self, label: &str) -> bool {
        self.reasons.iter().any(|r| r.label == label)
    }
}

/// Display band for a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Determine risk level from score and thresholds
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Configurable risk level thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 0.4,
            high: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(0.1, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.39, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.4, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.7, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.99, &thresholds), RiskLevel::High);
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = RiskAssessment {
            score: 0.6,
            is_fraud: true,
            reasons: vec![Reason::new("Amount high", 0.4)],
        };

        let json = serde_json::to_string(&assessment).unwrap();
        assert_eq!(
            json,
            r#"{"score":0.6,"is_fraud":true,"reasons":[{"label":"Amount high","weight":0.4}]}"#
        );
    }

    #[test]
    fn test_reason_lookup() {
        let assessment = RiskAssessment {
            score: 0.3,
            is_fraud: false,
            reasons: vec![Reason::new("Odd hour", 0.3)],
        };

        assert!(assessment.has_reason("Odd hour"));
        assert!(!assessment.has_reason("Amount high"));
        assert_eq!(assessment.reason_labels(), vec!["Odd hour"]);
    }
}
