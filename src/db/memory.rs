//! In-process repository, for tests and for embedding the engines without a database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::VerificationRepository;
use crate::error::RepositoryError;
use crate::models::{Invoice, PoStatus, PurchaseOrder, Receipt, ReceiptStatus};

/// Documents keyed by id; listings come back in id order
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    invoices: DashMap<i64, Invoice>,
    purchase_orders: DashMap<i64, PurchaseOrder>,
    receipts: DashMap<i64, Receipt>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_invoice(&self, invoice: Invoice) {
        self.invoices.insert(invoice.id, invoice);
    }

    pub fn insert_purchase_order(&self, po: PurchaseOrder) {
        self.purchase_orders.insert(po.id, po);
    }

    pub fn insert_receipt(&self, receipt: Receipt) {
        self.receipts.insert(receipt.id, receipt);
    }
}

fn sorted_by_id<T: Clone>(items: impl Iterator<Item = (i64, T)>) -> Vec<T> {
    let mut items: Vec<(i64, T)> = items.collect();
    items.sort_by_key(|(id, _)| *id);
    items.into_iter().map(|(_, item)| item).collect()
}

#[async_trait]
impl VerificationRepository for InMemoryRepository {
    async fn get_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, RepositoryError> {
        Ok(self.invoices.get(&invoice_id).map(|e| e.value().clone()))
    }

    async fn find_purchase_order(
        &self,
        company_id: i64,
        po_number: &str,
    ) -> Result<Option<PurchaseOrder>, RepositoryError> {
        let found = self
            .purchase_orders
            .iter()
            .filter(|e| e.company_id == company_id && e.po_number == po_number)
            .map(|e| (*e.key(), e.value().clone()));
        Ok(sorted_by_id(found).into_iter().next())
    }

    async fn list_purchase_orders(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[PoStatus],
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        let found = self
            .purchase_orders
            .iter()
            .filter(|e| {
                e.company_id == company_id
                    && e.supplier_name == supplier_name
                    && statuses.contains(&e.status)
            })
            .map(|e| (*e.key(), e.value().clone()));
        Ok(sorted_by_id(found))
    }

    async fn find_receipt(
        &self,
        company_id: i64,
        receipt_number: &str,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let found = self
            .receipts
            .iter()
            .filter(|e| e.company_id == company_id && e.receipt_number == receipt_number)
            .map(|e| (*e.key(), e.value().clone()));
        Ok(sorted_by_id(found).into_iter().next())
    }

    async fn list_receipts(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[ReceiptStatus],
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let found = self
            .receipts
            .iter()
            .filter(|e| {
                e.company_id == company_id
                    && e.supplier_name == supplier_name
                    && statuses.contains(&e.status)
            })
            .map(|e| (*e.key(), e.value().clone()));
        Ok(sorted_by_id(found))
    }

    async fn supplier_history(
        &self,
        company_id: i64,
        supplier_name: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        exclude_invoice_id: i64,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let mut history: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|e| {
                e.id != exclude_invoice_id
                    && e.company_id == company_id
                    && e.supplier_name == supplier_name
                    && e.created_at >= since
                    && e.created_at <= until
            })
            .map(|e| e.value().clone())
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(history)
    }

    async fn count_invoices_by_creator(
        &self,
        company_id: i64,
        user_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = self
            .invoices
            .iter()
            .filter(|e| {
                e.company_id == company_id
                    && e.created_by == Some(user_id)
                    && e.created_at >= since
                    && e.created_at <= until
            })
            .count();
        Ok(count as i64)
    }
}
