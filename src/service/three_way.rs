use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use rayon::prelude::*;
use std::sync::Arc;

use crate::config::MatchingRules;
use crate::db::VerificationRepository;
use crate::error::VerificationError;
use crate::models::{
    sum_totals, DocumentLine, Invoice, InvoiceLine, LineItemMatch, MatchConfidence, MatchResult,
    MatchStatus, PoStatus, PurchaseOrder, Receipt, ReceiptStatus,
};
use crate::service::line_matcher::best_match;
use crate::service::similarity::round_score;

/// Three-way match service: invoice vs purchase order vs goods receipt
pub struct ThreeWayMatcher {
    repo: Arc<dyn VerificationRepository>,
    rules: MatchingRules,
}

/// A looked-up document plus any note about how it was chosen
struct Resolved<T> {
    document: Option<T>,
    note: Option<String>,
}

impl ThreeWayMatcher {
    pub fn new(repo: Arc<dyn VerificationRepository>, rules: MatchingRules) -> Self {
        Self { repo, rules }
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// Load the invoice and match it. Only a missing invoice is an error.
    pub async fn verify(
        &self,
        invoice_id: i64,
        po_number: Option<&str>,
        receipt_number: Option<&str>,
    ) -> Result<MatchResult, VerificationError> {
        let invoice = self
            .repo
            .get_invoice(invoice_id)
            .await?
            .ok_or(VerificationError::InvoiceNotFound(invoice_id))?;

        self.verify_invoice(&invoice, po_number, receipt_number).await
    }

    /// Match an already-loaded invoice. Explicit numbers win over the
    /// invoice's own OCR hints.
    pub async fn verify_invoice(
        &self,
        invoice: &Invoice,
        po_number: Option<&str>,
        receipt_number: Option<&str>,
    ) -> Result<MatchResult, VerificationError> {
        let po_number = po_number.or(invoice.po_number.as_deref());
        let receipt_number = receipt_number.or(invoice.receipt_number.as_deref());

        let (po, receipt) = futures::try_join!(
            self.resolve_purchase_order(invoice, po_number),
            self.resolve_receipt(invoice, receipt_number),
        )?;

        let mut result = evaluate(invoice, po.document.as_ref(), receipt.document.as_ref(), &self.rules);

        let mut warnings: Vec<String> = po.note.into_iter().chain(receipt.note).collect();
        warnings.append(&mut result.warnings);
        result.warnings = warnings;

        crate::audit::record_match(&result);

        Ok(result)
    }

    async fn resolve_purchase_order(
        &self,
        invoice: &Invoice,
        po_number: Option<&str>,
    ) -> Result<Resolved<PurchaseOrder>, VerificationError> {
        if let Some(number) = po_number {
            let document = self.repo.find_purchase_order(invoice.company_id, number).await?;
            let note = document
                .is_none()
                .then(|| format!("Purchase order {} not found", number));
            return Ok(Resolved { document, note });
        }

        let candidates = self
            .repo
            .list_purchase_orders(invoice.company_id, &invoice.supplier_name, &PoStatus::MATCHABLE)
            .await?;
        Ok(first_candidate(candidates, "purchase order", |po| po.po_number.clone()))
    }

    async fn resolve_receipt(
        &self,
        invoice: &Invoice,
        receipt_number: Option<&str>,
    ) -> Result<Resolved<Receipt>, VerificationError> {
        if let Some(number) = receipt_number {
            let document = self.repo.find_receipt(invoice.company_id, number).await?;
            let note = document
                .is_none()
                .then(|| format!("Goods receipt {} not found", number));
            return Ok(Resolved { document, note });
        }

        let candidates = self
            .repo
            .list_receipts(
                invoice.company_id,
                &invoice.supplier_name,
                &ReceiptStatus::MATCHABLE,
            )
            .await?;
        Ok(first_candidate(candidates, "goods receipt", |r| r.receipt_number.clone()))
    }
}

/// First-match policy: no tie-break, but say so when the choice was ambiguous.
fn first_candidate<T>(
    candidates: Vec<T>,
    kind: &str,
    number: impl Fn(&T) -> String,
) -> Resolved<T> {
    let count = candidates.len();
    let document = candidates.into_iter().next();
    let note = match &document {
        Some(doc) if count > 1 => {
            let chosen = number(doc);
            tracing::warn!(candidates = count, chosen = %chosen, "Ambiguous {} resolution", kind);
            Some(format!(
                "{} candidate {}s matched the supplier; using {}",
                count, kind, chosen
            ))
        }
        _ => None,
    };
    Resolved { document, note }
}

/// Pure three-way match over already-resolved documents
pub fn evaluate(
    invoice: &Invoice,
    po: Option<&PurchaseOrder>,
    receipt: Option<&Receipt>,
    rules: &MatchingRules,
) -> MatchResult {
    let (po, receipt) = match (po, receipt) {
        (Some(po), Some(receipt)) => (po, receipt),
        (None, None) => {
            return MatchResult::terminal(
                invoice.id,
                MatchStatus::NoMatch,
                None,
                None,
                vec![format!(
                    "No purchase order or goods receipt found for supplier '{}'",
                    invoice.supplier_name
                )],
                suggested_actions(MatchStatus::NoMatch),
            );
        }
        (None, Some(receipt)) => {
            return MatchResult::terminal(
                invoice.id,
                MatchStatus::PoNotFound,
                None,
                Some(receipt.receipt_number.clone()),
                vec![format!(
                    "No purchase order found for supplier '{}'",
                    invoice.supplier_name
                )],
                suggested_actions(MatchStatus::PoNotFound),
            );
        }
        (Some(po), None) => {
            return MatchResult::terminal(
                invoice.id,
                MatchStatus::ReceiptNotFound,
                Some(po.po_number.clone()),
                None,
                vec![format!(
                    "No goods receipt found for purchase order {}",
                    po.po_number
                )],
                suggested_actions(MatchStatus::ReceiptNotFound),
            );
        }
    };

    let line_matches: Vec<LineItemMatch> = invoice
        .lines
        .par_iter()
        .enumerate()
        .map(|(index, line)| match_line(index, line, &po.lines, &receipt.lines, rules))
        .collect();

    let status = aggregate_status(&line_matches, rules);
    let confidence_score = if line_matches.is_empty() {
        0.0
    } else {
        round_score(line_matches.iter().map(|m| m.confidence).sum::<f64>() / line_matches.len() as f64)
    };

    let invoice_total = invoice.lines_total();
    let po_total = sum_totals(&po.lines);
    let receipt_total = sum_totals(&receipt.lines);
    let variance_amount = &invoice_total - &po_total;
    let variance_percentage = if po_total.is_zero() {
        0.0
    } else {
        (&variance_amount * BigDecimal::from(100) / &po_total)
            .to_f64()
            .unwrap_or(0.0)
    };

    let mut warnings = Vec::new();
    if variance_percentage.abs() > rules.variance_warning_percentage {
        warnings.push(format!(
            "Invoice total {} differs from PO total {} by {:.2}%",
            invoice_total, po_total, variance_percentage
        ));
    }
    for m in &line_matches {
        warnings.extend(line_warnings(m));
    }

    let (matches, mismatches): (Vec<_>, Vec<_>) =
        line_matches.into_iter().partition(|m| m.status.is_perfect());

    MatchResult {
        invoice_id: invoice.id,
        po_number: Some(po.po_number.clone()),
        receipt_number: Some(receipt.receipt_number.clone()),
        status,
        confidence: MatchConfidence::from_score(confidence_score),
        confidence_score,
        matches,
        mismatches,
        warnings,
        suggested_actions: suggested_actions(status),
        invoice_total,
        po_total,
        receipt_total,
        variance_amount,
        variance_percentage,
    }
}

/// Match one invoice line against both sides
pub fn match_line(
    line_index: usize,
    line: &InvoiceLine,
    po_lines: &[DocumentLine],
    receipt_lines: &[DocumentLine],
    rules: &MatchingRules,
) -> LineItemMatch {
    let po_best = best_match(line, po_lines, rules);
    let receipt_best = best_match(line, receipt_lines, rules);

    let po_score = po_best.as_ref().map(|c| c.score).unwrap_or(0.0);
    let receipt_score = receipt_best.as_ref().map(|c| c.score).unwrap_or(0.0);
    let confidence = round_score((po_score + receipt_score) / 2.0);

    let (status, price_variance, quantity_variance, description_similarity, total_match) =
        match &po_best {
            Some(best) => {
                let price_variance = &line.unit_price - &best.line.unit_price;
                let quantity_variance = &line.quantity - &best.line.quantity;
                let total_match = (&line.total - &best.line.total).abs() <= rules.price_tolerance;
                (
                    classify_line(&price_variance, &quantity_variance, rules),
                    price_variance,
                    quantity_variance,
                    best.description_similarity,
                    total_match,
                )
            }
            None => (
                MatchStatus::NoMatch,
                BigDecimal::zero(),
                BigDecimal::zero(),
                0.0,
                false,
            ),
        };

    let matched = po_best.is_some();
    let price_match = matched && price_variance.abs() <= rules.price_tolerance;
    let quantity_match = matched && quantity_variance.abs() <= rules.quantity_tolerance;

    tracing::debug!(
        line = line_index + 1,
        status = ?status,
        confidence,
        price_variance = %price_variance,
        quantity_variance = %quantity_variance,
        "Line matched"
    );

    LineItemMatch {
        line_index,
        invoice_line: line.clone(),
        po_line: po_best.map(|c| c.line.clone()),
        receipt_line: receipt_best.map(|c| c.line.clone()),
        status,
        confidence,
        price_variance,
        quantity_variance,
        description_similarity,
        description_match: description_similarity >= rules.description_match_threshold,
        price_match,
        quantity_match,
        total_match,
    }
}

/// Per-line verdict from the absolute tolerances
pub fn classify_line(
    price_variance: &BigDecimal,
    quantity_variance: &BigDecimal,
    rules: &MatchingRules,
) -> MatchStatus {
    let price_ok = price_variance.abs() <= rules.price_tolerance;
    let quantity_ok = quantity_variance.abs() <= rules.quantity_tolerance;

    if price_ok && quantity_ok {
        MatchStatus::PerfectMatch
    } else if !price_ok {
        MatchStatus::PriceMismatch
    } else {
        MatchStatus::QuantityMismatch
    }
}

/// Invoice-level verdict; price problems outrank quantity problems
pub fn aggregate_status(lines: &[LineItemMatch], rules: &MatchingRules) -> MatchStatus {
    if lines.is_empty() {
        return MatchStatus::PartialMatch;
    }

    let perfect = lines.iter().filter(|m| m.status.is_perfect()).count();
    let ratio = perfect as f64 / lines.len() as f64;

    if perfect == lines.len() {
        MatchStatus::PerfectMatch
    } else if ratio >= rules.partial_match_ratio {
        MatchStatus::PartialMatch
    } else if lines.iter().any(|m| m.status == MatchStatus::PriceMismatch) {
        MatchStatus::PriceMismatch
    } else if lines.iter().any(|m| m.status == MatchStatus::QuantityMismatch) {
        MatchStatus::QuantityMismatch
    } else {
        MatchStatus::PartialMatch
    }
}

fn line_warnings(m: &LineItemMatch) -> Vec<String> {
    let n = m.line_index + 1;
    let mut warnings = Vec::new();

    match (m.status, &m.po_line) {
        (MatchStatus::PriceMismatch, Some(po)) => warnings.push(format!(
            "Price mismatch on line {}: invoiced {} vs PO {} (variance {})",
            n, m.invoice_line.unit_price, po.unit_price, m.price_variance
        )),
        (MatchStatus::QuantityMismatch, Some(po)) => warnings.push(format!(
            "Quantity mismatch on line {}: invoiced {} vs PO {} (variance {})",
            n, m.invoice_line.quantity, po.quantity, m.quantity_variance
        )),
        (MatchStatus::NoMatch, _) => warnings.push(format!(
            "No purchase order line found for line {} ('{}')",
            n, m.invoice_line.description
        )),
        _ => {}
    }

    if m.po_line.is_some() && !m.description_match {
        warnings.push(format!(
            "Description mismatch on line {}: '{}' (similarity {:.2})",
            n, m.invoice_line.description, m.description_similarity
        ));
    }

    warnings
}

fn suggested_actions(status: MatchStatus) -> Vec<String> {
    let actions: &[&str] = match status {
        MatchStatus::PerfectMatch => &["Approve invoice for payment"],
        MatchStatus::PartialMatch => &[
            "Route invoice for manual review",
            "Confirm unmatched lines with the requester",
        ],
        MatchStatus::PriceMismatch => &[
            "Investigate pricing discrepancies with the supplier",
            "Check for approved price changes on the purchase order",
        ],
        MatchStatus::QuantityMismatch => &[
            "Verify received quantities against the goods receipt",
            "Confirm whether a partial delivery was invoiced",
        ],
        MatchStatus::NoMatch | MatchStatus::PoNotFound | MatchStatus::ReceiptNotFound => &[
            "Verify purchase order and receipt numbers",
            "Route invoice for manual review",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn inv_line(desc: &str, qty: &str, price: &str) -> InvoiceLine {
        InvoiceLine {
            description: desc.to_string(),
            quantity: dec(qty),
            unit_price: dec(price),
            total: dec(qty) * dec(price),
            item_code: None,
            gl_account: None,
        }
    }

    fn doc_line(id: i64, desc: &str, qty: &str, price: &str) -> DocumentLine {
        DocumentLine {
            line_id: id,
            description: desc.to_string(),
            quantity: dec(qty),
            unit_price: dec(price),
            total: dec(qty) * dec(price),
            item_code: None,
        }
    }

    fn invoice(lines: Vec<InvoiceLine>) -> Invoice {
        let ts = Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap();
        Invoice {
            id: 1,
            company_id: 10,
            invoice_number: "INV-1".to_string(),
            supplier_name: "Acme Supplies".to_string(),
            total_amount: BigDecimal::zero(),
            currency: "USD".to_string(),
            invoice_date: ts,
            created_at: ts,
            created_by: None,
            po_number: None,
            receipt_number: None,
            lines,
        }
    }

    fn po(lines: Vec<DocumentLine>) -> PurchaseOrder {
        PurchaseOrder {
            id: 1,
            company_id: 10,
            po_number: "PO-1".to_string(),
            supplier_name: "Acme Supplies".to_string(),
            status: PoStatus::Open,
            lines,
        }
    }

    fn receipt(lines: Vec<DocumentLine>) -> Receipt {
        Receipt {
            id: 1,
            company_id: 10,
            receipt_number: "GR-1".to_string(),
            supplier_name: "Acme Supplies".to_string(),
            status: ReceiptStatus::Received,
            lines,
        }
    }

    #[test]
    fn one_cent_price_variance_is_still_perfect() {
        let rules = MatchingRules::default();
        assert_eq!(
            classify_line(&dec("0.01"), &dec("0"), &rules),
            MatchStatus::PerfectMatch
        );
        assert_eq!(
            classify_line(&dec("-0.01"), &dec("0"), &rules),
            MatchStatus::PerfectMatch
        );
        assert_eq!(
            classify_line(&dec("0.011"), &dec("0"), &rules),
            MatchStatus::PriceMismatch
        );
    }

    #[test]
    fn price_outranks_quantity_per_line() {
        let rules = MatchingRules::default();
        assert_eq!(
            classify_line(&dec("5"), &dec("2"), &rules),
            MatchStatus::PriceMismatch
        );
        assert_eq!(
            classify_line(&dec("0"), &dec("2"), &rules),
            MatchStatus::QuantityMismatch
        );
    }

    #[test]
    fn identical_documents_are_perfect_and_high() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Copy paper", "10", "4.50")]);
        let po = po(vec![doc_line(1, "Copy paper", "10", "4.50")]);
        let gr = receipt(vec![doc_line(1, "Copy paper", "10", "4.50")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.status, MatchStatus::PerfectMatch);
        assert_eq!(result.confidence, MatchConfidence::High);
        assert_eq!(result.matches.len(), 1);
        assert!(result.mismatches.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.variance_amount, BigDecimal::zero());
    }

    #[test]
    fn four_of_five_perfect_lines_is_partial() {
        let rules = MatchingRules::default();
        let mut inv_lines = Vec::new();
        let mut po_lines = Vec::new();
        for i in 0..4 {
            let desc = format!("Part number {}", i);
            inv_lines.push(inv_line(&desc, "1", "10"));
            po_lines.push(doc_line(i, &desc, "1", "10"));
        }
        inv_lines.push(inv_line("Bracket steel", "1", "12"));
        po_lines.push(doc_line(9, "Bracket steel", "1", "10"));

        let inv = invoice(inv_lines);
        let gr = receipt(po_lines.clone());
        let po = po(po_lines);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.status, MatchStatus::PartialMatch);
        assert_eq!(result.matches.len(), 4);
        assert_eq!(result.mismatches.len(), 1);
        assert!(result.warnings.iter().any(|w| w.contains("Price mismatch on line 5")));
    }

    #[test]
    fn quantity_only_problems_aggregate_to_quantity_mismatch() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Cable ties", "12", "2")]);
        let po = po(vec![doc_line(1, "Cable ties", "10", "2")]);
        let gr = receipt(vec![doc_line(1, "Cable ties", "10", "2")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.status, MatchStatus::QuantityMismatch);
        assert!(result.warnings.iter().any(|w| w.starts_with("Quantity mismatch")));
        assert!(result
            .suggested_actions
            .iter()
            .any(|a| a.contains("received quantities")));
    }

    #[test]
    fn large_total_variance_warns() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Consulting hours", "10", "120")]);
        let po = po(vec![doc_line(1, "Consulting hours", "10", "100")]);
        let gr = receipt(vec![doc_line(1, "Consulting hours", "10", "100")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.variance_amount, dec("200"));
        assert!((result.variance_percentage - 20.0).abs() < 1e-9);
        assert!(result.warnings.iter().any(|w| w.contains("differs from PO total")));
    }

    #[test]
    fn zero_po_total_gives_zero_percentage() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Free sample kit", "1", "5")]);
        let po = po(vec![doc_line(1, "Free sample kit", "1", "0")]);
        let gr = receipt(vec![doc_line(1, "Free sample kit", "1", "0")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.variance_percentage, 0.0);
        assert_eq!(result.variance_amount, dec("5"));
    }

    #[test]
    fn unrelated_description_warns() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Premium ergonomic chair", "1", "300")]);
        let po = po(vec![doc_line(1, "Desk lamp", "1", "300")]);
        let gr = receipt(vec![doc_line(1, "Desk lamp", "1", "300")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.status, MatchStatus::PerfectMatch);
        assert!(result.warnings.iter().any(|w| w.starts_with("Description mismatch")));
        assert!(!result.matches[0].description_match);
    }

    #[test]
    fn empty_po_lines_leave_line_unmatched() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Widget", "1", "10")]);
        let po = po(Vec::new());
        let gr = receipt(vec![doc_line(1, "Widget", "1", "10")]);

        let result = evaluate(&inv, Some(&po), Some(&gr), &rules);
        assert_eq!(result.mismatches[0].status, MatchStatus::NoMatch);
        assert_eq!(result.status, MatchStatus::PartialMatch);
        assert!(!result.mismatches[0].price_match);
    }

    #[test]
    fn invoice_without_lines_is_not_perfect() {
        let rules = MatchingRules::default();
        let inv = invoice(Vec::new());
        let result = evaluate(&inv, Some(&po(Vec::new())), Some(&receipt(Vec::new())), &rules);
        assert_eq!(result.status, MatchStatus::PartialMatch);
        assert_eq!(result.confidence, MatchConfidence::VeryLow);
    }

    #[test]
    fn missing_one_side_is_terminal() {
        let rules = MatchingRules::default();
        let inv = invoice(vec![inv_line("Widget", "1", "10")]);
        let po = po(vec![doc_line(1, "Widget", "1", "10")]);
        let gr = receipt(vec![doc_line(1, "Widget", "1", "10")]);

        let no_receipt = evaluate(&inv, Some(&po), None, &rules);
        assert_eq!(no_receipt.status, MatchStatus::ReceiptNotFound);
        assert_eq!(no_receipt.po_number.as_deref(), Some("PO-1"));

        let no_po = evaluate(&inv, None, Some(&gr), &rules);
        assert_eq!(no_po.status, MatchStatus::PoNotFound);
        assert!(no_po.status.is_terminal());
    }

    #[test]
    fn confidence_buckets() {
        assert_eq!(MatchConfidence::from_score(0.95), MatchConfidence::High);
        assert_eq!(MatchConfidence::from_score(0.90), MatchConfidence::High);
        assert_eq!(MatchConfidence::from_score(0.75), MatchConfidence::Medium);
        assert_eq!(MatchConfidence::from_score(0.50), MatchConfidence::Low);
        assert_eq!(MatchConfidence::from_score(0.49), MatchConfidence::VeryLow);
    }
}
