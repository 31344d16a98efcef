//! Fraud risk scoring
//!
//! `FraudDetector` fetches the supplier history once, runs every heuristic in
//! its own error boundary and aggregates whatever indicators survived.

pub mod checks;
pub mod scoring;

use chrono::Duration;
use std::sync::Arc;

use crate::config::FraudRules;
use crate::db::VerificationRepository;
use crate::error::VerificationError;
use crate::models::{FraudAnalysisResult, FraudIndicator, Invoice};

pub use checks::{Check, CheckResult, CHECKS};
pub use scoring::aggregate;

/// Data the heuristics look at besides the invoice itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FraudContext {
    /// Same company and supplier, trailing window, excluding the invoice under test
    pub history: Vec<Invoice>,
    /// Invoices created by the submitting user in the trailing creator window
    pub creator_recent_invoices: Option<i64>,
}

pub struct FraudDetector {
    repo: Arc<dyn VerificationRepository>,
    rules: FraudRules,
}

impl FraudDetector {
    pub fn new(repo: Arc<dyn VerificationRepository>, rules: FraudRules) -> Self {
        Self { repo, rules }
    }

    pub fn rules(&self) -> &FraudRules {
        &self.rules
    }

    /// Load the invoice and score it
    pub async fn analyze(&self, invoice_id: i64) -> Result<FraudAnalysisResult, VerificationError> {
        let invoice = self
            .repo
            .get_invoice(invoice_id)
            .await?
            .ok_or(VerificationError::InvoiceNotFound(invoice_id))?;

        self.analyze_invoice(&invoice).await
    }

    pub async fn analyze_invoice(
        &self,
        invoice: &Invoice,
    ) -> Result<FraudAnalysisResult, VerificationError> {
        let context = self.load_context(invoice).await?;
        let result = score_snapshot(invoice, &context, &self.rules);

        tracing::debug!(invoice_id = invoice.id, history = context.history.len(), "Fraud context loaded");
        crate::audit::record_fraud(&result);

        Ok(result)
    }

    /// Windows end at the invoice's `created_at`: invoices created later are
    /// never its history, so re-running an analysis sees the same snapshot.
    pub async fn load_context(&self, invoice: &Invoice) -> Result<FraudContext, VerificationError> {
        let history_since = invoice.created_at - Duration::days(self.rules.history_window_days);
        let creator_since = invoice.created_at - Duration::days(self.rules.creator_window_days);

        let history = self.repo.supplier_history(
            invoice.company_id,
            &invoice.supplier_name,
            history_since,
            invoice.created_at,
            invoice.id,
        );
        let creator = async {
            match invoice.created_by {
                Some(user_id) => self
                    .repo
                    .count_invoices_by_creator(
                        invoice.company_id,
                        user_id,
                        creator_since,
                        invoice.created_at,
                    )
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let (history, creator_recent_invoices) = futures::try_join!(history, creator)?;

        Ok(FraudContext {
            history,
            creator_recent_invoices,
        })
    }
}

/// Pure scoring pass over a fixed snapshot; deterministic for equal inputs
pub fn score_snapshot(
    invoice: &Invoice,
    context: &FraudContext,
    rules: &FraudRules,
) -> FraudAnalysisResult {
    aggregate(invoice.id, run_checks(invoice, context, rules, &CHECKS), &rules.scoring)
}

/// Run each check in isolation. A failing check is logged and contributes nothing.
pub fn run_checks(
    invoice: &Invoice,
    context: &FraudContext,
    rules: &FraudRules,
    checks: &[(&str, Check)],
) -> Vec<FraudIndicator> {
    let mut indicators = Vec::new();

    for (name, check) in checks {
        match check(invoice, context, rules) {
            Ok(found) => {
                tracing::debug!(invoice_id = invoice.id, check = name, raised = found.len(), "Fraud check ran");
                indicators.extend(found);
            }
            Err(e) => {
                tracing::warn!(invoice_id = invoice.id, check = name, error = %e, "Fraud check failed, skipping");
            }
        }
    }

    indicators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::models::FraudIndicatorKind;
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    fn invoice() -> Invoice {
        let ts = Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap();
        Invoice {
            id: 1,
            company_id: 1,
            invoice_number: "A-1".to_string(),
            supplier_name: "Fake Parts Co".to_string(),
            total_amount: BigDecimal::from(250),
            currency: "USD".to_string(),
            invoice_date: ts,
            created_at: ts,
            created_by: None,
            po_number: None,
            receipt_number: None,
            lines: Vec::new(),
        }
    }

    fn failing(_: &Invoice, _: &FraudContext, _: &FraudRules) -> CheckResult {
        Err(CheckError::NonFinite("test statistic"))
    }

    #[test]
    fn failing_check_does_not_abort_the_pass() {
        let rules = FraudRules::default();
        let inv = invoice();
        let checks: [(&str, Check); 3] = [
            ("broken", failing as Check),
            ("vendor", checks::check_vendor_name as Check),
            ("supplier", checks::check_supplier as Check),
        ];

        let found = run_checks(&inv, &FraudContext::default(), &rules, &checks);
        let kinds: Vec<_> = found.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![FraudIndicatorKind::VendorRisk, FraudIndicatorKind::SupplierAnomaly]
        );
    }

    #[test]
    fn snapshot_scoring_is_deterministic() {
        let rules = FraudRules::default();
        let inv = invoice();
        let ctx = FraudContext::default();
        assert_eq!(score_snapshot(&inv, &ctx, &rules), score_snapshot(&inv, &ctx, &rules));
    }
}
