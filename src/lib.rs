pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, InMemoryRepository, PgRepository, VerificationRepository};
pub use error::VerificationError;
pub use service::{FraudDetector, ThreeWayMatcher};
