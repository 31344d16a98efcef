use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of heuristic that raised an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudIndicatorKind {
    AmountAnomaly,
    SupplierAnomaly,
    TimingAnomaly,
    PatternAnomaly,
    DuplicateSuspect,
    VendorRisk,
    BehavioralAnomaly,
}

impl FraudIndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudIndicatorKind::AmountAnomaly => "amount_anomaly",
            FraudIndicatorKind::SupplierAnomaly => "supplier_anomaly",
            FraudIndicatorKind::TimingAnomaly => "timing_anomaly",
            FraudIndicatorKind::PatternAnomaly => "pattern_anomaly",
            FraudIndicatorKind::DuplicateSuspect => "duplicate_suspect",
            FraudIndicatorKind::VendorRisk => "vendor_risk",
            FraudIndicatorKind::BehavioralAnomaly => "behavioral_anomaly",
        }
    }
}

/// One heuristic signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudIndicator {
    pub kind: FraudIndicatorKind,
    pub severity: f64,   // 0.0 - 1.0
    pub description: String,
    pub evidence: Value, // structured payload for audit
    pub confidence: f64, // 0.0 - 1.0
}

/// Aggregated risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Fraud risk verdict for one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAnalysisResult {
    pub invoice_id: i64,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub confidence: f64,
    pub indicators: Vec<FraudIndicator>,
    pub recommendations: Vec<String>,
    pub requires_manual_review: bool,
    pub auto_approve: bool,
    pub auto_reject: bool,
    pub investigation_priority: u8, // 1 - 10
}

impl FraudAnalysisResult {
    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }
}
