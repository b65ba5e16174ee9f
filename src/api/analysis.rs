//! REST API endpoints for the analysis pipeline and decision records

use actix_web::{get, post, web, HttpResponse};

use crate::api::error::ApiError;
use crate::model::NewAnalysisRecord;
use crate::service::AnalysisService;

/// Run the complete analysis pipeline for a report
///
/// Vision analysis first, then discrepancy analysis consuming its output.
/// Requires an officer statement and at least one registered photo; neither
/// precondition is masked by fallback behavior.
#[utoipa::path(
    post,
    path = "/v1/reports/{id}/analysis/run",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Analysis completed", body = crate::model::CompleteAnalysis),
        (status = 400, description = "Officer statement or photos missing"),
        (status = 404, description = "Report not found")
    ),
    tag = "analysis"
)]
#[post("/v1/reports/{id}/analysis/run")]
pub async fn run_analysis(
    service: web::Data<AnalysisService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let analysis = service.analyze_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

/// Persist the final claim decision for a report
///
/// Append-only: a second record for the same report is a conflict.
#[utoipa::path(
    post,
    path = "/v1/analyses",
    request_body = NewAnalysisRecord,
    responses(
        (status = 201, description = "Analysis record created", body = crate::model::AnalysisRecord),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Analysis already exists for this report")
    ),
    tag = "analysis"
)]
#[post("/v1/analyses")]
pub async fn create_analysis(
    service: web::Data<AnalysisService>,
    body: web::Json<NewAnalysisRecord>,
) -> Result<HttpResponse, ApiError> {
    let record = service.record_decision(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Get the persisted analysis record for a report
#[utoipa::path(
    get,
    path = "/v1/reports/{id}/analysis",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Analysis record retrieved", body = crate::model::AnalysisRecord),
        (status = 404, description = "Report or analysis not found")
    ),
    tag = "analysis"
)]
#[get("/v1/reports/{id}/analysis")]
pub async fn get_analysis(
    service: web::Data<AnalysisService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let record = service.analysis_for_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(run_analysis)
        .service(create_analysis)
        .service(get_analysis);
}
