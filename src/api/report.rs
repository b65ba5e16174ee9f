//! REST API endpoints for accident reports and photos

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::ApiError;
use crate::db::models::report_status_from_string;
use crate::model::{NewAccidentPhoto, NewAccidentReport};
use crate::service::IntakeService;

/// Query parameters for listing reports
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReportsParams {
    /// Filter by report status (submitted, under_review, completed)
    pub status: Option<String>,
}

/// Create a new accident report
#[utoipa::path(
    post,
    path = "/v1/reports",
    request_body = NewAccidentReport,
    responses(
        (status = 201, description = "Report created", body = crate::model::AccidentReport),
        (status = 500, description = "Internal server error")
    ),
    tag = "reports"
)]
#[post("/v1/reports")]
pub async fn create_report(
    service: web::Data<IntakeService>,
    body: web::Json<NewAccidentReport>,
) -> Result<HttpResponse, ApiError> {
    let report = service.create_report(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(report))
}

/// List accident reports
#[utoipa::path(
    get,
    path = "/v1/reports",
    params(ListReportsParams),
    responses(
        (status = 200, description = "Reports retrieved", body = [crate::model::AccidentReport]),
        (status = 400, description = "Invalid status filter")
    ),
    tag = "reports"
)]
#[get("/v1/reports")]
pub async fn list_reports(
    service: web::Data<IntakeService>,
    query: web::Query<ListReportsParams>,
) -> Result<HttpResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(report_status_from_string)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let reports = service.list_reports(status).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Get an accident report by ID
#[utoipa::path(
    get,
    path = "/v1/reports/{id}",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report retrieved", body = crate::model::AccidentReport),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
#[get("/v1/reports/{id}")]
pub async fn get_report(
    service: web::Data<IntakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let report = service.get_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// List photos registered against a report
#[utoipa::path(
    get,
    path = "/v1/reports/{id}/photos",
    params(("id" = i64, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Photos retrieved", body = [crate::model::AccidentPhoto]),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
#[get("/v1/reports/{id}/photos")]
pub async fn list_photos(
    service: web::Data<IntakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let photos = service.photos_for_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(photos))
}

/// Register already-stored photo files against a report
#[utoipa::path(
    post,
    path = "/v1/reports/{id}/photos",
    params(("id" = i64, Path, description = "Report ID")),
    request_body = [NewAccidentPhoto],
    responses(
        (status = 201, description = "Photos registered", body = [crate::model::AccidentPhoto]),
        (status = 400, description = "Photo limit exceeded"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
#[post("/v1/reports/{id}/photos")]
pub async fn register_photos(
    service: web::Data<IntakeService>,
    path: web::Path<i64>,
    body: web::Json<Vec<NewAccidentPhoto>>,
) -> Result<HttpResponse, ApiError> {
    let photos = service
        .register_photos(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(photos))
}

/// Configure report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_report)
        .service(list_reports)
        .service(get_report)
        .service(list_photos)
        .service(register_photos);
}
