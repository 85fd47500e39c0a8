//! Fraud Sentinel Library
//!
//! Deterministic, rule-based fraud risk scoring for payment transactions,
//! with explainable reason codes and a CSV batch mode.

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod source;
pub mod summary;
pub mod types;

pub use config::{AppConfig, InvalidRowPolicy, ScoringConfig};
pub use engine::{Condition, RiskEngine, RuleDescriptor, RuleTable};
pub use error::{ConfigError, InputError, SourceReadError};
pub use source::{read_transactions, read_transactions_from_path, SourceBatch};
pub use summary::BatchSummary;
pub use types::{Reason, RiskAssessment, RiskLevel, TransactionRecord};
