//! Risk aggregation and reviewer guidance

use std::collections::BTreeSet;

use crate::config::ScoringRules;
use crate::models::{FraudAnalysisResult, FraudIndicator, FraudIndicatorKind, RiskLevel};
use crate::service::similarity::round_score;

/// Confidence-weighted mean severity; 0 with no indicators
pub fn risk_score(indicators: &[FraudIndicator]) -> f64 {
    let weight: f64 = indicators.iter().map(|i| i.confidence).sum();
    if weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = indicators.iter().map(|i| i.severity * i.confidence).sum();
    round_score(weighted / weight)
}

/// Mean indicator confidence; fully confident when nothing fired
pub fn analysis_confidence(indicators: &[FraudIndicator]) -> f64 {
    if indicators.is_empty() {
        return 1.0;
    }
    round_score(indicators.iter().map(|i| i.confidence).sum::<f64>() / indicators.len() as f64)
}

/// `low_threshold` is deliberately not consulted: everything under the
/// medium cut-off is LOW.
pub fn classify_risk(score: f64, rules: &ScoringRules) -> RiskLevel {
    if score >= rules.critical_threshold {
        RiskLevel::Critical
    } else if score >= rules.high_threshold {
        RiskLevel::High
    } else if score >= rules.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// 1 - 10 triage rank
pub fn investigation_priority(score: f64, indicators: &[FraudIndicator], rules: &ScoringRules) -> u8 {
    let severe = indicators
        .iter()
        .filter(|i| i.severity > rules.priority_severity)
        .count() as i64;
    let raw = (score * 10.0).floor() as i64 + 2 * severe;
    raw.clamp(1, 10) as u8
}

/// Combine indicators into the final verdict
pub fn aggregate(
    invoice_id: i64,
    indicators: Vec<FraudIndicator>,
    rules: &ScoringRules,
) -> FraudAnalysisResult {
    let score = risk_score(&indicators);
    let level = classify_risk(score, rules);
    let count = indicators.len();

    let requires_manual_review =
        score > rules.manual_review_score || count > rules.manual_review_indicator_count;
    let auto_approve = score < rules.auto_approve_score && count == 0;
    let auto_reject = score > rules.auto_reject_score
        || indicators.iter().any(|i| i.severity > rules.auto_reject_severity);

    FraudAnalysisResult {
        invoice_id,
        risk_level: level,
        risk_score: score,
        confidence: analysis_confidence(&indicators),
        recommendations: recommendations(level, &indicators),
        requires_manual_review,
        auto_approve,
        auto_reject,
        investigation_priority: investigation_priority(score, &indicators, rules),
        indicators,
    }
}

/// Base guidance for the risk level, then one line per indicator kind present
pub fn recommendations(level: RiskLevel, indicators: &[FraudIndicator]) -> Vec<String> {
    let base: &[&str] = match level {
        RiskLevel::Critical => &[
            "Block payment and escalate to the fraud investigation team",
            "Contact the supplier through an independently verified channel",
            "Preserve all related documents for audit",
        ],
        RiskLevel::High => &[
            "Hold payment pending senior finance review",
            "Verify supplier identity and bank details independently",
        ],
        RiskLevel::Medium => &[
            "Route to manual review before approval",
            "Cross-check invoice details against the purchase order",
        ],
        RiskLevel::Low => &["Proceed with the standard approval workflow"],
    };

    let kinds: BTreeSet<FraudIndicatorKind> = indicators.iter().map(|i| i.kind).collect();
    let addons = kinds.into_iter().map(|kind| match kind {
        FraudIndicatorKind::AmountAnomaly => "Verify invoice amount with supplier",
        FraudIndicatorKind::SupplierAnomaly => "Confirm supplier onboarding and vendor master data",
        FraudIndicatorKind::TimingAnomaly => "Review why the invoice was issued outside business hours",
        FraudIndicatorKind::PatternAnomaly => "Check whether the invoice number was already paid",
        FraudIndicatorKind::DuplicateSuspect => {
            "Compare with recent invoices from this supplier for duplicate billing"
        }
        FraudIndicatorKind::VendorRisk => "Validate that the supplier is a registered vendor",
        FraudIndicatorKind::BehavioralAnomaly => "Review recent invoice activity of the submitting user",
    });

    base.iter().copied().chain(addons).map(str::to_string).collect()
}
