//! PostgreSQL-backed repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use super::queries::{self, DocumentLineRow, DocumentRow, InvoiceLineRow, InvoiceRow};
use super::VerificationRepository;
use crate::error::RepositoryError;
use crate::models::{
    DocumentLine, Invoice, InvoiceLine, PoStatus, PurchaseOrder, Receipt, ReceiptStatus,
};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn purchase_orders_with_lines(
        &self,
        rows: Vec<DocumentRow>,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut lines = group_lines(queries::list_purchase_order_lines(&self.pool, &ids).await?);

        rows.into_iter()
            .map(|row| {
                let status = PoStatus::parse(&row.status).ok_or_else(|| RepositoryError::Decode {
                    entity: "purchase order status",
                    reason: row.status.clone(),
                })?;
                Ok(PurchaseOrder {
                    id: row.id,
                    company_id: row.company_id,
                    lines: lines.remove(&row.id).unwrap_or_default(),
                    po_number: row.number,
                    supplier_name: row.supplier_name,
                    status,
                })
            })
            .collect()
    }

    async fn receipts_with_lines(
        &self,
        rows: Vec<DocumentRow>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut lines = group_lines(queries::list_receipt_lines(&self.pool, &ids).await?);

        rows.into_iter()
            .map(|row| {
                let status =
                    ReceiptStatus::parse(&row.status).ok_or_else(|| RepositoryError::Decode {
                        entity: "receipt status",
                        reason: row.status.clone(),
                    })?;
                Ok(Receipt {
                    id: row.id,
                    company_id: row.company_id,
                    lines: lines.remove(&row.id).unwrap_or_default(),
                    receipt_number: row.number,
                    supplier_name: row.supplier_name,
                    status,
                })
            })
            .collect()
    }
}

fn group_lines(rows: Vec<DocumentLineRow>) -> HashMap<i64, Vec<DocumentLine>> {
    let mut grouped: HashMap<i64, Vec<DocumentLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.document_id).or_default().push(DocumentLine {
            line_id: row.line_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total: row.total,
            item_code: row.item_code,
        });
    }
    grouped
}

fn to_invoice(row: InvoiceRow, lines: Vec<InvoiceLineRow>) -> Invoice {
    Invoice {
        id: row.id,
        company_id: row.company_id,
        invoice_number: row.invoice_number,
        supplier_name: row.supplier_name,
        total_amount: row.total_amount,
        currency: row.currency,
        invoice_date: row.invoice_date,
        created_at: row.created_at,
        created_by: row.created_by,
        po_number: row.po_number,
        receipt_number: row.receipt_number,
        lines: lines
            .into_iter()
            .map(|l| InvoiceLine {
                description: l.description,
                quantity: l.quantity,
                unit_price: l.unit_price,
                total: l.total,
                item_code: l.item_code,
                gl_account: l.gl_account,
            })
            .collect(),
    }
}

fn status_strings<S: Copy>(statuses: &[S], as_str: fn(&S) -> &'static str) -> Vec<String> {
    statuses.iter().map(|s| as_str(s).to_string()).collect()
}

#[async_trait]
impl VerificationRepository for PgRepository {
    async fn get_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, RepositoryError> {
        let Some(row) = queries::get_invoice(&self.pool, invoice_id).await? else {
            return Ok(None);
        };
        let lines = queries::list_invoice_lines(&self.pool, invoice_id).await?;
        Ok(Some(to_invoice(row, lines)))
    }

    async fn find_purchase_order(
        &self,
        company_id: i64,
        po_number: &str,
    ) -> Result<Option<PurchaseOrder>, RepositoryError> {
        let rows: Vec<DocumentRow> = queries::get_purchase_order(&self.pool, company_id, po_number)
            .await?
            .into_iter()
            .collect();
        Ok(self.purchase_orders_with_lines(rows).await?.into_iter().next())
    }

    async fn list_purchase_orders(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[PoStatus],
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        let statuses = status_strings(statuses, PoStatus::as_str);
        let rows =
            queries::list_purchase_orders(&self.pool, company_id, supplier_name, &statuses).await?;
        self.purchase_orders_with_lines(rows).await
    }

    async fn find_receipt(
        &self,
        company_id: i64,
        receipt_number: &str,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let rows: Vec<DocumentRow> = queries::get_receipt(&self.pool, company_id, receipt_number)
            .await?
            .into_iter()
            .collect();
        Ok(self.receipts_with_lines(rows).await?.into_iter().next())
    }

    async fn list_receipts(
        &self,
        company_id: i64,
        supplier_name: &str,
        statuses: &[ReceiptStatus],
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let statuses = status_strings(statuses, ReceiptStatus::as_str);
        let rows = queries::list_receipts(&self.pool, company_id, supplier_name, &statuses).await?;
        self.receipts_with_lines(rows).await
    }

    // History invoices come back without lines; no heuristic reads them.
    async fn supplier_history(
        &self,
        company_id: i64,
        supplier_name: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        exclude_invoice_id: i64,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = queries::list_supplier_invoices(
            &self.pool,
            company_id,
            supplier_name,
            since,
            until,
            exclude_invoice_id,
        )
        .await?;
        tracing::debug!(company_id, supplier = supplier_name, count = rows.len(), "Loaded supplier history");
        Ok(rows.into_iter().map(|row| to_invoice(row, Vec::new())).collect())
    }

    async fn count_invoices_by_creator(
        &self,
        company_id: i64,
        user_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        Ok(queries::count_invoices_by_creator(&self.pool, company_id, user_id, since, until).await?)
    }
}
