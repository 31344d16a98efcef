use std::sync::Arc;

use invoice_verify::{
    api::{self, AppState},
    create_pool, AppConfig, FraudDetector, PgRepository, ThreeWayMatcher, VerificationRepository,
};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log lines; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let repo: Arc<dyn VerificationRepository> = Arc::new(PgRepository::new(pool));
    let matcher = ThreeWayMatcher::new(repo.clone(), config.rules.matching.clone());
    let detector = FraudDetector::new(repo, config.rules.fraud.clone());

    let app = api::router(AppState::new(matcher, detector)).layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/verify/match  - three-way match");
    info!("  POST /api/verify/fraud  - fraud risk analysis");
    info!("  POST /api/verify/batch  - match and score a list of invoices");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
