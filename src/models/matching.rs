use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{InvoiceLine, PoLine, ReceiptLine};

/// Outcome of a three-way match, per line and per invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    PerfectMatch,
    PartialMatch,
    PriceMismatch,
    QuantityMismatch,
    NoMatch,
    PoNotFound,
    ReceiptNotFound,
}

impl MatchStatus {
    pub fn is_perfect(&self) -> bool {
        matches!(self, MatchStatus::PerfectMatch)
    }

    /// Statuses decided before any line was compared
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchStatus::NoMatch | MatchStatus::PoNotFound | MatchStatus::ReceiptNotFound
        )
    }
}

/// Bucketed overall confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
    VeryLow,
}

impl MatchConfidence {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.90 {
            MatchConfidence::High
        } else if score >= 0.70 {
            MatchConfidence::Medium
        } else if score >= 0.50 {
            MatchConfidence::Low
        } else {
            MatchConfidence::VeryLow
        }
    }
}

/// Match of one invoice line against the PO and the receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemMatch {
    pub line_index: usize,
    pub invoice_line: InvoiceLine,
    pub po_line: Option<PoLine>,
    pub receipt_line: Option<ReceiptLine>,
    pub status: MatchStatus,
    pub confidence: f64,
    pub price_variance: BigDecimal,    // invoice - PO unit price
    pub quantity_variance: BigDecimal, // invoice - PO quantity
    pub description_similarity: f64,
    pub description_match: bool,
    pub price_match: bool,
    pub quantity_match: bool,
    pub total_match: bool,
}

/// Invoice-level three-way match verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub invoice_id: i64,
    pub po_number: Option<String>,
    pub receipt_number: Option<String>,
    pub status: MatchStatus,
    pub confidence: MatchConfidence,
    pub confidence_score: f64,
    pub matches: Vec<LineItemMatch>,
    pub mismatches: Vec<LineItemMatch>,
    pub warnings: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub invoice_total: BigDecimal,
    pub po_total: BigDecimal,
    pub receipt_total: BigDecimal,
    pub variance_amount: BigDecimal,
    pub variance_percentage: f64,
}

impl MatchResult {
    /// Result for a match that stopped before comparing lines
    pub fn terminal(
        invoice_id: i64,
        status: MatchStatus,
        po_number: Option<String>,
        receipt_number: Option<String>,
        warnings: Vec<String>,
        suggested_actions: Vec<String>,
    ) -> Self {
        Self {
            invoice_id,
            po_number,
            receipt_number,
            status,
            confidence: MatchConfidence::VeryLow,
            confidence_score: 0.0,
            matches: Vec::new(),
            mismatches: Vec::new(),
            warnings,
            suggested_actions,
            invoice_total: BigDecimal::from(0),
            po_total: BigDecimal::from(0),
            receipt_total: BigDecimal::from(0),
            variance_amount: BigDecimal::from(0),
            variance_percentage: 0.0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.matches.len() + self.mismatches.len()
    }
}
