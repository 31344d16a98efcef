use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extracted invoice header plus its ordered lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub company_id: i64,
    pub invoice_number: String,
    pub supplier_name: String,
    pub total_amount: BigDecimal, // advisory, not guaranteed to equal the line sum
    pub currency: String,
    pub invoice_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub po_number: Option<String>,      // OCR hint
    pub receipt_number: Option<String>, // OCR hint
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Sum of line totals
    pub fn lines_total(&self) -> BigDecimal {
        super::procurement::sum_totals(&self.lines)
    }
}

/// Invoice line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
    pub item_code: Option<String>,
    pub gl_account: Option<String>,
}
