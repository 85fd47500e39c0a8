//! Aggregate statistics over a scored batch

use crate::types::assessment::RiskAssessment;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Number of equal-width score buckets over [0, 1]
pub const SCORE_BUCKETS: usize = 10;

/// Reductions over a batch of assessments.
///
/// Computed once from the engine's output; holds no reference to the
/// engine or the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Assessments in the batch
    pub total: u64,
    /// Assessments classified as fraud
    pub flagged: u64,
    /// Mean score (0 for an empty batch)
    pub mean_score: f64,
    /// Raw scores in input order
    pub scores: Vec<f64>,
    /// Score distribution buckets
    pub distribution: [u64; SCORE_BUCKETS],
    /// How many assessments carried each reason
    pub reason_counts: BTreeMap<String, u64>,
}

impl BatchSummary {
    pub fn from_assessments(assessments: &[RiskAssessment]) -> Self {
        let mut distribution = [0u64; SCORE_BUCKETS];
        let mut reason_counts = BTreeMap::new();
        let mut flagged = 0;

        for assessment in assessments {
            if assessment.is_fraud {
                flagged += 1;
            }

            distribution[bucket_index(assessment.score)] += 1;

            for reason in &assessment.reasons {
                *reason_counts.entry(reason.label.clone()).or_insert(0) += 1;
            }
        }

        let scores: Vec<f64> = assessments.iter().map(|a| a.score).collect();
        let mean_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        Self {
            total: assessments.len() as u64,
            flagged,
            mean_score,
            scores,
            distribution,
            reason_counts,
        }
    }

    /// Fraction of the batch classified as fraud (0 for an empty batch)
    pub fn fraud_rate(&self) -> f64 {
        if self.total > 0 {
            self.flagged as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn log_summary(&self) {
        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD SENTINEL - BATCH SUMMARY                  ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Scored: {:>8}  │  Mean Score: {:>6.1}%        ║",
            self.total,
            self.mean_score * 100.0
        );
        info!(
            "║ Flagged as Fraud:    {:>8}  │  Fraud Rate: {:>6.1}%        ║",
            self.flagged,
            self.fraud_rate() * 100.0
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Triggered Factors:                                           ║");
        for (label, count) in &self.reason_counts {
            let pct = if self.total > 0 {
                (*count as f64 / self.total as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:22}: {:>6} ({:>5.1}%)", label, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:                                     ║");
        for (i, &count) in self.distribution.iter().enumerate() {
            let pct = if self.total > 0 {
                (count as f64 / self.total as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

/// Bucket for a score; out-of-range scores land in the edge buckets
fn bucket_index(score: f64) -> usize {
    let bucket = (score * SCORE_BUCKETS as f64).floor();
    if bucket.is_nan() || bucket < 0.0 {
        0
    } else {
        (bucket as usize).min(SCORE_BUCKETS - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::assessment::Reason;

    fn assessment(score: f64, is_fraud: bool, labels: &[&str]) -> RiskAssessment {
        RiskAssessment {
            score,
            is_fraud,
            reasons: labels.iter().map(|l| Reason::new(*l, 0.1)).collect(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let assessments = vec![
            assessment(0.1, false, &[]),
            assessment(0.6, true, &["Amount high"]),
            assessment(0.99, true, &["Amount high", "Odd hour"]),
            assessment(0.3, false, &["Odd hour"]),
        ];

        let summary = BatchSummary::from_assessments(&assessments);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.flagged, 2);
        assert!((summary.fraud_rate() - 0.5).abs() < 1e-9);
        assert!((summary.mean_score - 0.4975).abs() < 1e-9);
        assert_eq!(summary.scores, vec![0.1, 0.6, 0.99, 0.3]);
        assert_eq!(summary.reason_counts.get("Amount high"), Some(&2));
        assert_eq!(summary.reason_counts.get("Odd hour"), Some(&2));
    }

    #[test]
    fn test_distribution_buckets() {
        let assessments = vec![
            assessment(0.0, false, &[]),
            assessment(0.1, false, &[]),
            assessment(0.55, true, &[]),
            assessment(0.99, true, &[]),
            assessment(1.0, true, &[]),
        ];

        let summary = BatchSummary::from_assessments(&assessments);

        assert_eq!(summary.distribution[0], 1);
        assert_eq!(summary.distribution[1], 1);
        assert_eq!(summary.distribution[5], 1);
        assert_eq!(summary.distribution[9], 2);
        assert_eq!(summary.distribution.iter().sum::<u64>(), 5);
    }

    #[test]
    fn test_empty_batch() {
        let summary = BatchSummary::from_assessments(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.flagged, 0);
        assert_eq!(summary.fraud_rate(), 0.0);
        assert_eq!(summary.mean_score, 0.0);
        assert!(summary.reason_counts.is_empty());
        summary.log_summary();
    }
}
