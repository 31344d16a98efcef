use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::InvoiceLine;

/// Purchase order lifecycle as stored by procurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoStatus {
    Open,
    PartiallyReceived,
    Received,
    Closed,
    Cancelled,
}

impl PoStatus {
    /// Statuses eligible for supplier-based PO resolution
    pub const MATCHABLE: [PoStatus; 2] = [PoStatus::Open, PoStatus::PartiallyReceived];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Open => "open",
            PoStatus::PartiallyReceived => "partially_received",
            PoStatus::Received => "received",
            PoStatus::Closed => "closed",
            PoStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(PoStatus::Open),
            "partially_received" => Some(PoStatus::PartiallyReceived),
            "received" => Some(PoStatus::Received),
            "closed" => Some(PoStatus::Closed),
            "cancelled" => Some(PoStatus::Cancelled),
            _ => None,
        }
    }
}

/// Goods receipt lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Pending,
    Received,
    Rejected,
}

impl ReceiptStatus {
    pub const MATCHABLE: [ReceiptStatus; 1] = [ReceiptStatus::Received];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Received => "received",
            ReceiptStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReceiptStatus::Pending),
            "received" => Some(ReceiptStatus::Received),
            "rejected" => Some(ReceiptStatus::Rejected),
            _ => None,
        }
    }
}

/// Line of a PO or goods receipt; same shape as an invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub line_id: i64,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
    pub item_code: Option<String>,
}

pub type PoLine = DocumentLine;
pub type ReceiptLine = DocumentLine;

/// Purchase order (read-only here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub company_id: i64,
    pub po_number: String,
    pub supplier_name: String,
    pub status: PoStatus,
    pub lines: Vec<PoLine>,
}

/// Goods receipt (read-only here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub company_id: i64,
    pub receipt_number: String,
    pub supplier_name: String,
    pub status: ReceiptStatus,
    pub lines: Vec<ReceiptLine>,
}

/// Common view over the fields the line matcher compares
pub trait LineFields {
    fn description(&self) -> &str;
    fn quantity(&self) -> &BigDecimal;
    fn unit_price(&self) -> &BigDecimal;
    fn total(&self) -> &BigDecimal;
    fn item_code(&self) -> Option<&str>;
}

impl LineFields for InvoiceLine {
    fn description(&self) -> &str {
        &self.description
    }
    fn quantity(&self) -> &BigDecimal {
        &self.quantity
    }
    fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }
    fn total(&self) -> &BigDecimal {
        &self.total
    }
    fn item_code(&self) -> Option<&str> {
        self.item_code.as_deref()
    }
}

impl LineFields for DocumentLine {
    fn description(&self) -> &str {
        &self.description
    }
    fn quantity(&self) -> &BigDecimal {
        &self.quantity
    }
    fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }
    fn total(&self) -> &BigDecimal {
        &self.total
    }
    fn item_code(&self) -> Option<&str> {
        self.item_code.as_deref()
    }
}

/// Sum of line totals for any document
pub fn sum_totals<L: LineFields>(lines: &[L]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.total())
}
