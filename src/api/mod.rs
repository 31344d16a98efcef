pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::service::{FraudDetector, ThreeWayMatcher};

pub use handlers::*;

/// Shared state: both engines over the same repository
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<ThreeWayMatcher>,
    pub detector: Arc<FraudDetector>,
}

impl AppState {
    pub fn new(matcher: ThreeWayMatcher, detector: FraudDetector) -> Self {
        Self {
            matcher: Arc::new(matcher),
            detector: Arc::new(detector),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/verify/match", post(verify_match))
        .route("/api/verify/fraud", post(verify_fraud))
        .route("/api/verify/batch", post(verify_batch))
        .with_state(state)
}
