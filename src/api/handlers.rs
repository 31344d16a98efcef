use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::VerificationError;
use crate::models::{FraudAnalysisResult, MatchResult};

/// Request body: one invoice, optional explicit document numbers
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub invoice_id: i64,
    pub po_number: Option<String>,
    pub receipt_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FraudRequest {
    pub invoice_id: i64,
}

/// Request body: list of invoice ids
#[derive(Debug, Deserialize)]
pub struct BatchVerifyRequest {
    pub invoice_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse<T> {
    pub success: bool,
    pub message: String,
    pub result: Option<T>,
}

/// Outcome for one invoice of a batch; a failure does not fail the batch
#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub invoice_id: i64,
    pub match_result: Option<MatchResult>,
    pub fraud_result: Option<FraudAnalysisResult>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchVerifyResponse {
    pub success: bool,
    pub message: String,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

/// Engine error rendered as `{success: false, message}`
#[derive(Debug)]
pub struct ApiError(pub VerificationError);

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VerificationError::InvoiceNotFound(_) => StatusCode::NOT_FOUND,
            VerificationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Verification request failed");
        }
        let body = ErrorBody {
            success: false,
            message: format!("Error: {}", self.0),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Three-way match for one invoice
pub async fn verify_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<VerifyResponse<MatchResult>>, ApiError> {
    let result = state
        .matcher
        .verify(req.invoice_id, req.po_number.as_deref(), req.receipt_number.as_deref())
        .await?;

    Ok(Json(VerifyResponse {
        success: true,
        message: format!("Invoice {} matched: {:?}", req.invoice_id, result.status),
        result: Some(result),
    }))
}

/// Fraud risk analysis for one invoice
pub async fn verify_fraud(
    State(state): State<AppState>,
    Json(req): Json<FraudRequest>,
) -> Result<Json<VerifyResponse<FraudAnalysisResult>>, ApiError> {
    let result = state.detector.analyze(req.invoice_id).await?;

    Ok(Json(VerifyResponse {
        success: true,
        message: format!("Invoice {} risk: {:?}", req.invoice_id, result.risk_level),
        result: Some(result),
    }))
}

/// Match and score every invoice in the list, in request order
pub async fn verify_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchVerifyRequest>,
) -> Response {
    let response = run_batch(&state, &req.invoice_ids).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Run both engines per invoice; a failing invoice is reported on its item
pub async fn run_batch(state: &AppState, invoice_ids: &[i64]) -> BatchVerifyResponse {
    let mut items = Vec::with_capacity(invoice_ids.len());

    for &invoice_id in invoice_ids {
        let outcome = futures::try_join!(
            state.matcher.verify(invoice_id, None, None),
            state.detector.analyze(invoice_id),
        );
        let item = match outcome {
            Ok((matched, fraud)) => BatchItem {
                invoice_id,
                match_result: Some(matched),
                fraud_result: Some(fraud),
                error: None,
            },
            Err(e) => {
                tracing::warn!(invoice_id, error = %e, "Batch item failed");
                BatchItem {
                    invoice_id,
                    match_result: None,
                    fraud_result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        items.push(item);
    }

    let failed = items.iter().filter(|i| i.error.is_some()).count();
    BatchVerifyResponse {
        success: failed == 0,
        message: format!(
            "Verified {} invoices, {} failed",
            items.len() - failed,
            failed
        ),
        items,
    }
}
