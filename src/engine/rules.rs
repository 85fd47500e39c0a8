//! Declarative rule table
//!
//! Each rule pairs a predicate over a transaction with two numbers: the
//! amount it adds to the risk score, and the severity shown next to its
//! label when it fires. The two are independent.

use crate::error::ConfigError;
use crate::types::transaction::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Arbitrary predicate for rules defined in code
pub type PredicateFn = fn(&TransactionRecord) -> bool;

/// Predicate a rule evaluates against a record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// `amount > threshold`
    AmountAbove { threshold: f64 },
    /// `hour < start || hour > end`
    HourOutside { start: i64, end: i64 },
    /// Merchant category is one of `categories` (exact match)
    MerchantIn { categories: Vec<String> },
    /// Device type equals `device` (exact match)
    DeviceIs { device: String },
    /// Code-only predicate; cannot come from a config file
    #[serde(skip)]
    Custom(PredicateFn),
}

impl Condition {
    /// Evaluate the predicate
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        match self {
            Condition::AmountAbove { threshold } => record.amount > *threshold,
            Condition::HourOutside { start, end } => {
                record.transaction_time < *start || record.transaction_time > *end
            }
            Condition::MerchantIn { categories } => categories
                .iter()
                .any(|c| *c == record.merchant_category),
            Condition::DeviceIs { device } => *device == record.device_type,
            Condition::Custom(predicate) => predicate(record),
        }
    }
}

/// One row of the rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Reason label reported when the rule fires
    pub label: String,
    /// Added to the risk score when the rule fires
    pub score_weight: f64,
    /// Display weight of the reason; 0 suppresses the reason
    pub reason_weight: f64,
    #[serde(flatten)]
    pub condition: Condition,
}

impl RuleDescriptor {
    pub fn new(
        label: impl Into<String>,
        score_weight: f64,
        reason_weight: f64,
        condition: Condition,
    ) -> Self {
        Self {
            label: label.into(),
            score_weight,
            reason_weight,
            condition,
        }
    }

    /// Rule backed by a predicate function
    pub fn custom(
        label: impl Into<String>,
        score_weight: f64,
        reason_weight: f64,
        predicate: PredicateFn,
    ) -> Self {
        Self::new(label, score_weight, reason_weight, Condition::Custom(predicate))
    }

    pub fn fires(&self, record: &TransactionRecord) -> bool {
        self.condition.matches(record)
    }
}

/// Ordered rule table; order fixes the order of reported reasons
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<RuleDescriptor>,
}

impl RuleTable {
    /// Empty table; every record scores the baseline
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_rules(rules: Vec<RuleDescriptor>) -> Self {
        Self { rules }
    }

    /// Append a rule at the end of the table
    pub fn push(&mut self, rule: RuleDescriptor) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: RuleDescriptor) -> Self {
        self.push(rule);
        self
    }

    /// Remove a rule by label, returning it if present
    pub fn remove(&mut self, label: &str) -> Option<RuleDescriptor> {
        let index = self.rules.iter().position(|r| r.label == label)?;
        Some(self.rules.remove(index))
    }

    pub fn get(&self, label: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule labels in evaluation order
    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label.as_str()).collect()
    }

    /// Check weights and labels.
    ///
    /// Weights must be finite and reason weights non-negative; labels must
    /// be non-empty and unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for rule in &self.rules {
            let invalid = |reason: &str| ConfigError::InvalidRule {
                label: rule.label.clone(),
                reason: reason.to_string(),
            };

            if rule.label.trim().is_empty() {
                return Err(invalid("label must not be empty"));
            }
            if !seen.insert(rule.label.as_str()) {
                return Err(invalid("duplicate label"));
            }
            if !rule.score_weight.is_finite() {
                return Err(invalid("score_weight must be finite"));
            }
            if !rule.reason_weight.is_finite() || rule.reason_weight < 0.0 {
                return Err(invalid("reason_weight must be finite and non-negative"));
            }
        }

        Ok(())
    }
}

impl Default for RuleTable {
    /// Amount, hour, merchant, device, in that order
    fn default() -> Self {
        Self::from_rules(vec![
            RuleDescriptor::new(
                "Amount high",
                0.5,
                0.4,
                Condition::AmountAbove { threshold: 1000.0 },
            ),
            RuleDescriptor::new(
                "Odd hour",
                0.2,
                0.3,
                Condition::HourOutside { start: 6, end: 22 },
            ),
            RuleDescriptor::new(
                "Merchant type risky",
                0.15,
                0.25,
                Condition::MerchantIn {
                    categories: vec!["Electronics".to_string(), "Luxury".to_string()],
                },
            ),
            RuleDescriptor::new(
                "Device type POS",
                0.1,
                0.1,
                Condition::DeviceIs {
                    device: "POS".to_string(),
                },
            ),
        ])
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a RuleDescriptor;
    type IntoIter = std::slice::Iter<'a, RuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
