//! Data access seam for the verification engines

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RepositoryError;
use crate::models::{Invoice, PoStatus, PurchaseOrder, Receipt, ReceiptStatus};

/// Everything the engines read from the outside world.
///
/// List methods return documents in the repository's natural order; the
/// engines take the first one and never re-sort.
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn get_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, RepositoryError>;

    async fn find_purchase_order(
        &self,
        company_id: i64,
        po_number: &str,
    ) -> Result<Option<PurchaseOrder>, RepositoryError>;

    async fn list_purchase_orders(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[PoStatus],
    ) -> Result<Vec<PurchaseOrder>, RepositoryError>;

    async fn find_receipt(
        &self,
        company_id: i64,
        receipt_number: &str,
    ) -> Result<Option<Receipt>, RepositoryError>;

    async fn list_receipts(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[ReceiptStatus],
    ) -> Result<Vec<Receipt>, RepositoryError>;

    /// Same company and supplier, `since <= created_at <= until`, excluding one invoice
    async fn supplier_history(
        &self,
        company_id: i64,
        supplier_name: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        exclude_invoice_id: i64,
    ) -> Result<Vec<Invoice>, RepositoryError>;

    /// Invoices created by the user with `since <= created_at <= until`
    async fn count_invoices_by_creator(
        &self,
        company_id: i64,
        user_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;
}
