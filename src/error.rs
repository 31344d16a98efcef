//! Error types for the verification engines

use thiserror::Error;

/// Failure to load data from the repository collaborator
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode {entity}: {reason}")]
    Decode {
        entity: &'static str,
        reason: String,
    },
}

/// Error returned by the verification engines
///
/// Missing purchase orders, receipts or supplier history are not errors;
/// they are represented in the results.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invoice {0} not found")]
    InvoiceNotFound(i64),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failure inside a single fraud heuristic; isolated by the detector
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{field} is not representable as a number: {value}")]
    NonNumeric { field: &'static str, value: String },

    #[error("non-finite statistic while computing {0}")]
    NonFinite(&'static str),
}
