//! Rule-based risk scoring

pub mod rules;
pub mod scorer;

pub use rules::{Condition, RuleDescriptor, RuleTable};
pub use scorer::RiskEngine;
