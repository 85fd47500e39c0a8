//! Type definitions for the risk scoring engine

pub mod assessment;
pub mod transaction;

pub use assessment::{Reason, RiskAssessment, RiskLevel, RiskLevelThresholds};
pub use transaction::TransactionRecord;
