//! One summary record per analysis, emitted on the `audit` tracing target.
//!
//! Records carry counts and decisions only; indicator evidence stays in the
//! result handed to the caller.

use serde::Serialize;

use crate::models::{FraudAnalysisResult, MatchConfidence, MatchResult, MatchStatus, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAuditRecord {
    pub invoice_id: i64,
    pub status: MatchStatus,
    pub confidence: MatchConfidence,
    pub confidence_score: f64,
    pub po_number: Option<String>,
    pub receipt_number: Option<String>,
    pub line_count: usize,
    pub mismatch_count: usize,
    pub warning_count: usize,
    pub variance_amount: String,
}

impl From<&MatchResult> for MatchAuditRecord {
    fn from(result: &MatchResult) -> Self {
        Self {
            invoice_id: result.invoice_id,
            status: result.status,
            confidence: result.confidence,
            confidence_score: result.confidence_score,
            po_number: result.po_number.clone(),
            receipt_number: result.receipt_number.clone(),
            line_count: result.line_count(),
            mismatch_count: result.mismatches.len(),
            warning_count: result.warnings.len(),
            variance_amount: result.variance_amount.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudAuditRecord {
    pub invoice_id: i64,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub indicator_count: usize,
    pub indicator_kinds: Vec<&'static str>,
    pub requires_manual_review: bool,
    pub auto_approve: bool,
    pub auto_reject: bool,
    pub investigation_priority: u8,
}

impl From<&FraudAnalysisResult> for FraudAuditRecord {
    fn from(result: &FraudAnalysisResult) -> Self {
        Self {
            invoice_id: result.invoice_id,
            risk_level: result.risk_level,
            risk_score: result.risk_score,
            indicator_count: result.indicator_count(),
            indicator_kinds: result.indicators.iter().map(|i| i.kind.as_str()).collect(),
            requires_manual_review: result.requires_manual_review,
            auto_approve: result.auto_approve,
            auto_reject: result.auto_reject,
            investigation_priority: result.investigation_priority,
        }
    }
}

pub fn record_match(result: &MatchResult) -> MatchAuditRecord {
    let record = MatchAuditRecord::from(result);
    tracing::info!(
        target: "audit",
        invoice_id = record.invoice_id,
        status = ?record.status,
        confidence = ?record.confidence,
        lines = record.line_count,
        mismatches = record.mismatch_count,
        warnings = record.warning_count,
        variance = %record.variance_amount,
        "three_way_match"
    );
    record
}

pub fn record_fraud(result: &FraudAnalysisResult) -> FraudAuditRecord {
    let record = FraudAuditRecord::from(result);
    tracing::info!(
        target: "audit",
        invoice_id = record.invoice_id,
        risk_level = ?record.risk_level,
        risk_score = record.risk_score,
        indicators = record.indicator_count,
        manual_review = record.requires_manual_review,
        auto_approve = record.auto_approve,
        auto_reject = record.auto_reject,
        priority = record.investigation_priority,
        "fraud_analysis"
    );
    record
}
