use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// Invoice header row
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub company_id: i64,
    pub invoice_number: String,
    pub supplier_name: String,
    pub total_amount: BigDecimal,
    pub currency: String,
    pub invoice_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub po_number: Option<String>,
    pub receipt_number: Option<String>,
}

/// Invoice line row
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceLineRow {
    pub invoice_id: i64,
    pub line_no: i32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
    pub item_code: Option<String>,
    pub gl_account: Option<String>,
}

/// PO / receipt header row
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub company_id: i64,
    pub number: String,
    pub supplier_name: String,
    pub status: String,
}

/// PO / receipt line row
#[derive(Debug, Clone, FromRow)]
pub struct DocumentLineRow {
    pub document_id: i64,
    pub line_id: i64,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub total: BigDecimal,
    pub item_code: Option<String>,
}

const INVOICE_COLUMNS: &str = "id, company_id, invoice_number, supplier_name, total_amount, currency, \
     invoice_date, created_at, created_by, po_number, receipt_number";

/// Fetch one invoice header
pub async fn get_invoice(pool: &PgPool, invoice_id: i64) -> Result<Option<InvoiceRow>, sqlx::Error> {
    let sql = format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS);
    sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(invoice_id)
        .fetch_optional(pool)
        .await
}

/// Lines of one invoice in document order
pub async fn list_invoice_lines(
    pool: &PgPool,
    invoice_id: i64,
) -> Result<Vec<InvoiceLineRow>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceLineRow>(
        r#"
        SELECT invoice_id, line_no, description, quantity, unit_price, total, item_code, gl_account
        FROM invoice_lines
        WHERE invoice_id = $1
        ORDER BY line_no ASC
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await
}

/// Same company and supplier inside `[since, until]`, newest first
pub async fn list_supplier_invoices(
    pool: &PgPool,
    company_id: i64,
    supplier_name: &str,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
    exclude_invoice_id: i64,
) -> Result<Vec<InvoiceRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {}
        FROM invoices
        WHERE company_id = $1
          AND supplier_name = $2
          AND created_at >= $3
          AND created_at <= $4
          AND id <> $5
        ORDER BY created_at DESC, id DESC
        "#,
        INVOICE_COLUMNS
    );
    sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(company_id)
        .bind(supplier_name)
        .bind(since)
        .bind(until)
        .bind(exclude_invoice_id)
        .fetch_all(pool)
        .await
}

/// Invoices created by one user inside `[since, until]`
pub async fn count_invoices_by_creator(
    pool: &PgPool,
    company_id: i64,
    user_id: i64,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT count(*)
        FROM invoices
        WHERE company_id = $1
          AND created_by = $2
          AND created_at >= $3
          AND created_at <= $4
        "#,
    )
    .bind(company_id)
    .bind(user_id)
    .bind(since)
    .bind(until)
    .fetch_one(pool)
    .await
}

/// Purchase order by number
pub async fn get_purchase_order(
    pool: &PgPool,
    company_id: i64,
    po_number: &str,
) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, company_id, po_number AS number, supplier_name, status
        FROM purchase_orders
        WHERE company_id = $1 AND po_number = $2
        "#,
    )
    .bind(company_id)
    .bind(po_number)
    .fetch_optional(pool)
    .await
}

/// Purchase orders for a supplier in the given statuses, storage order
pub async fn list_purchase_orders(
    pool: &PgPool,
    company_id: i64,
    supplier_name: &str,
    statuses: &[String],
) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, company_id, po_number AS number, supplier_name, status
        FROM purchase_orders
        WHERE company_id = $1
          AND supplier_name = $2
          AND status = ANY($3)
        ORDER BY id ASC
        "#,
    )
    .bind(company_id)
    .bind(supplier_name)
    .bind(statuses)
    .fetch_all(pool)
    .await
}

/// Lines of several purchase orders
pub async fn list_purchase_order_lines(
    pool: &PgPool,
    po_ids: &[i64],
) -> Result<Vec<DocumentLineRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentLineRow>(
        r#"
        SELECT po_id AS document_id, id AS line_id, description, quantity, unit_price, total, item_code
        FROM purchase_order_lines
        WHERE po_id = ANY($1)
        ORDER BY po_id ASC, id ASC
        "#,
    )
    .bind(po_ids)
    .fetch_all(pool)
    .await
}

/// Goods receipt by number
pub async fn get_receipt(
    pool: &PgPool,
    company_id: i64,
    receipt_number: &str,
) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, company_id, receipt_number AS number, supplier_name, status
        FROM receipts
        WHERE company_id = $1 AND receipt_number = $2
        "#,
    )
    .bind(company_id)
    .bind(receipt_number)
    .fetch_optional(pool)
    .await
}

/// Goods receipts for a supplier in the given statuses, storage order
pub async fn list_receipts(
    pool: &PgPool,
    company_id: i64,
    supplier_name: &str,
    statuses: &[String],
) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, company_id, receipt_number AS number, supplier_name, status
        FROM receipts
        WHERE company_id = $1
          AND supplier_name = $2
          AND status = ANY($3)
        ORDER BY id ASC
        "#,
    )
    .bind(company_id)
    .bind(supplier_name)
    .bind(statuses)
    .fetch_all(pool)
    .await
}

/// Lines of several goods receipts
pub async fn list_receipt_lines(
    pool: &PgPool,
    receipt_ids: &[i64],
) -> Result<Vec<DocumentLineRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentLineRow>(
        r#"
        SELECT receipt_id AS document_id, id AS line_id, description, quantity, unit_price, total, item_code
        FROM receipt_lines
        WHERE receipt_id = ANY($1)
        ORDER BY receipt_id ASC, id ASC
        "#,
    )
    .bind(receipt_ids)
    .fetch_all(pool)
    .await
}
