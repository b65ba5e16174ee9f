//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::api;
use crate::model;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::report::create_report,
        api::report::list_reports,
        api::report::get_report,
        api::report::list_photos,
        api::report::register_photos,
        api::statement::create_statement,
        api::statement::update_statement,
        api::analysis::run_analysis,
        api::analysis::create_analysis,
        api::analysis::get_analysis,
        api::health::liveness,
        api::health::readiness,
    ),
    components(schemas(
        model::AccidentReport,
        model::NewAccidentReport,
        model::AccidentPhoto,
        model::NewAccidentPhoto,
        model::ReportStatus,
        model::OfficerStatement,
        model::NewOfficerStatement,
        model::StatementUpdate,
        model::StatementStatus,
        model::VisionResult,
        model::DiscrepancyResult,
        model::Recommendation,
        model::CompleteAnalysis,
        model::AnalysisRecord,
        model::NewAnalysisRecord,
        model::ClaimStatus,
        api::health::HealthStatus,
        api::health::ReadinessStatus,
        api::health::DependencyHealth,
    )),
    info(
        title = "Accident Claim Intel",
        description = "Accident-claim intake and discrepancy-analysis backend"
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
