//! Shared fixtures for the engine integration tests
//!
//! Timestamps default to Wednesday 2024-03-06 10:00 UTC so the timing
//! heuristics stay quiet unless a test moves them.

#![allow(dead_code)]

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use std::str::FromStr;
use std::sync::Arc;

use invoice_verify::config::{FraudRules, MatchingRules};
use invoice_verify::models::{
    DocumentLine, Invoice, InvoiceLine, PoStatus, PurchaseOrder, Receipt, ReceiptStatus,
};
use invoice_verify::{FraudDetector, InMemoryRepository, ThreeWayMatcher, VerificationRepository};

pub const COMPANY: i64 = 1;
pub const SUPPLIER: &str = "Northwind Industrial";

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn weekday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap()
}

pub fn invoice_line(description: &str, quantity: &str, unit_price: &str) -> InvoiceLine {
    let total = dec(quantity) * dec(unit_price);
    InvoiceLine {
        description: description.to_string(),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        total,
        item_code: Some("SKU-100".to_string()),
        gl_account: None,
    }
}

pub fn document_line(line_id: i64, description: &str, quantity: &str, unit_price: &str) -> DocumentLine {
    let total = dec(quantity) * dec(unit_price);
    DocumentLine {
        line_id,
        description: description.to_string(),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        total,
        item_code: Some("SKU-100".to_string()),
    }
}

pub struct InvoiceBuilder {
    invoice: Invoice,
}

impl InvoiceBuilder {
    pub fn new(id: i64) -> Self {
        let at = weekday_morning();
        Self {
            invoice: Invoice {
                id,
                company_id: COMPANY,
                invoice_number: format!("INV-{}", id),
                supplier_name: SUPPLIER.to_string(),
                total_amount: dec("250.00"),
                currency: "USD".to_string(),
                invoice_date: at,
                created_at: at,
                created_by: None,
                po_number: None,
                receipt_number: None,
                lines: Vec::new(),
            },
        }
    }

    pub fn amount(mut self, amount: &str) -> Self {
        self.invoice.total_amount = dec(amount);
        self
    }

    pub fn number(mut self, number: &str) -> Self {
        self.invoice.invoice_number = number.to_string();
        self
    }

    pub fn supplier(mut self, supplier: &str) -> Self {
        self.invoice.supplier_name = supplier.to_string();
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.invoice.invoice_date = at;
        self.invoice.created_at = at;
        self
    }

    pub fn created_by(mut self, user_id: i64) -> Self {
        self.invoice.created_by = Some(user_id);
        self
    }

    pub fn line(mut self, line: InvoiceLine) -> Self {
        self.invoice.lines.push(line);
        self
    }

    pub fn build(self) -> Invoice {
        self.invoice
    }
}

pub fn purchase_order(id: i64, number: &str, lines: Vec<DocumentLine>) -> PurchaseOrder {
    PurchaseOrder {
        id,
        company_id: COMPANY,
        po_number: number.to_string(),
        supplier_name: SUPPLIER.to_string(),
        status: PoStatus::Open,
        lines,
    }
}

pub fn receipt(id: i64, number: &str, lines: Vec<DocumentLine>) -> Receipt {
    Receipt {
        id,
        company_id: COMPANY,
        receipt_number: number.to_string(),
        supplier_name: SUPPLIER.to_string(),
        status: ReceiptStatus::Received,
        lines,
    }
}

pub fn matcher(repo: &Arc<InMemoryRepository>) -> ThreeWayMatcher {
    let repo: Arc<dyn VerificationRepository> = repo.clone();
    ThreeWayMatcher::new(repo, MatchingRules::default())
}

pub fn detector(repo: &Arc<InMemoryRepository>) -> FraudDetector {
    let repo: Arc<dyn VerificationRepository> = repo.clone();
    FraudDetector::new(repo, FraudRules::default())
}
