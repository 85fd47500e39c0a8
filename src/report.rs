//! Rendering of assessments for people and downstream tools

use crate::error::InputError;
use crate::source::SourceBatch;
use crate::summary::BatchSummary;
use crate::types::assessment::{Reason, RiskAssessment, RiskLevel, RiskLevelThresholds};
use crate::types::transaction::TransactionRecord;
use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use tracing::debug;
use uuid::Uuid;

/// One record with its assessment, for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub transaction: TransactionRecord,
    pub score: f64,
    pub is_fraud: bool,
    pub risk_level: RiskLevel,
    pub reasons: Vec<Reason>,
}

impl AssessmentView {
    pub fn new(
        record: &TransactionRecord,
        assessment: &RiskAssessment,
        levels: &RiskLevelThresholds,
    ) -> Self {
        Self {
            transaction: record.clone(),
            score: assessment.score,
            is_fraud: assessment.is_fraud,
            risk_level: RiskLevel::from_score(assessment.score, levels),
            reasons: assessment.reasons.clone(),
        }
    }
}

/// A scored source row
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRow {
    /// Data line in the source
    pub line: u64,
    #[serde(flatten)]
    pub view: AssessmentView,
}

/// A row the source reader could not coerce
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl From<&InputError> for RejectedRow {
    fn from(error: &InputError) -> Self {
        Self {
            line: error.line,
            field: error.field,
            value: error.value.clone(),
            reason: error.reason.clone(),
        }
    }
}

/// Result of scoring one bulk source
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub summary: BatchSummary,
    pub rows: Vec<ScoredRow>,
    pub rejected: Vec<RejectedRow>,
}

impl BatchReport {
    /// Pair source rows with their assessments (same order, same length)
    pub fn new(
        source: impl Into<String>,
        batch: &SourceBatch,
        assessments: &[RiskAssessment],
        levels: &RiskLevelThresholds,
    ) -> Result<Self> {
        ensure!(
            batch.rows.len() == assessments.len(),
            "{} rows but {} assessments",
            batch.rows.len(),
            assessments.len()
        );

        let rows = batch
            .rows
            .iter()
            .zip(assessments)
            .map(|(row, assessment)| ScoredRow {
                line: row.line,
                view: AssessmentView::new(&row.record, assessment, levels),
            })
            .collect();

        Ok(Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: source.into(),
            summary: BatchSummary::from_assessments(assessments),
            rows,
            rejected: batch.rejected.iter().map(RejectedRow::from).collect(),
        })
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        debug!(report_id = %self.report_id, rows = self.rows.len(), "Batch report written");
        Ok(())
    }
}

/// Human-readable rendering of a single assessment
pub fn render_assessment_text(
    record: &TransactionRecord,
    assessment: &RiskAssessment,
    levels: &RiskLevelThresholds,
) -> String {
    let mut out = String::new();
    let banner = if assessment.is_fraud {
        "FRAUD DETECTED"
    } else {
        "SAFE TRANSACTION"
    };
    let level = RiskLevel::from_score(assessment.score, levels);

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(
        out,
        "Transaction: amount={:.2} hour={} merchant={} device={}",
        record.amount, record.transaction_time, record.merchant_category, record.device_type
    );
    let _ = writeln!(out, "Fraud Likelihood: {:.1}%", assessment.score * 100.0);
    let _ = writeln!(out, "Risk Level: {}", level.as_str());

    if assessment.reasons.is_empty() {
        let _ = writeln!(out, "Low risk detected; no significant risk factors.");
    } else {
        let _ = writeln!(out, "Top Fraud Risk Factors:");
        for reason in &assessment.reasons {
            let _ = writeln!(out, "- {} ({:.0}%)", reason.label, reason.weight * 100.0);
        }
    }

    out
}

/// Write the source rows back out with `fraud_score` and `is_fraud`
/// columns appended
pub fn write_scored_csv<W: Write>(
    writer: W,
    batch: &SourceBatch,
    assessments: &[RiskAssessment],
) -> Result<()> {
    ensure!(
        batch.rows.len() == assessments.len(),
        "{} rows but {} assessments",
        batch.rows.len(),
        assessments.len()
    );

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut headers = batch.headers.clone();
    headers.push("fraud_score".to_string());
    headers.push("is_fraud".to_string());
    csv_writer.write_record(&headers)?;

    for (row, assessment) in batch.rows.iter().zip(assessments) {
        let mut fields = row.fields.clone();
        fields.push(assessment.score.to_string());
        fields.push(assessment.is_fraud.to_string());
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush()?;
    Ok(())
}
