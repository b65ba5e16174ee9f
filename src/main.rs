use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod model;
mod service;

use db::repository::{AnalysisRepository, ReportRepository, StatementRepository};
use model::Config;
use service::{
    AnalysisService, DiscrepancyAnalyzer, DiscrepancyClient, IntakeService, PgEvidenceStore,
    PhotoAnalyzer, VisionClient,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    // Initialize PostgreSQL database
    let db_pool = db::create_pool()
        .await
        .expect("Failed to create database pool");

    // Initialize database schema
    db::init_schema(&db_pool)
        .await
        .expect("Failed to initialize database schema");

    // Create repositories
    let reports = ReportRepository::new(db_pool.clone());
    let statements = StatementRepository::new(db_pool.clone());
    let analyses = AnalysisRepository::new(db_pool.clone());

    // Intake service backs the CRUD surface
    let intake_service = web::Data::new(IntakeService::new(reports.clone(), statements.clone()));

    // Model clients degrade to synthesized results when no endpoint is
    // configured, so construction never fails
    let vision_client: Arc<dyn PhotoAnalyzer> =
        Arc::new(VisionClient::new(config.vision.clone()));
    let discrepancy_client: Arc<dyn DiscrepancyAnalyzer> =
        Arc::new(DiscrepancyClient::new(config.discrepancy.clone()));

    let store = Arc::new(PgEvidenceStore::new(reports, statements, analyses));
    let analysis_service = web::Data::new(AnalysisService::new(
        store,
        vision_client,
        discrepancy_client,
    ));

    let db_pool_data = web::Data::new(db_pool);
    let config_data = web::Data::new(config);

    tracing::info!("Starting accident-claim-intel server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(intake_service.clone())
            .app_data(analysis_service.clone())
            .app_data(db_pool_data.clone())
            .app_data(config_data.clone())
            .configure(api::report::configure)
            .configure(api::statement::configure)
            .configure(api::analysis::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
