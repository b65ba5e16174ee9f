//! REST API endpoints for officer statements

use actix_web::{post, put, web, HttpResponse};

use crate::api::error::ApiError;
use crate::model::{NewOfficerStatement, StatementUpdate};
use crate::service::IntakeService;

/// Create an officer statement for a report
///
/// Moves the report to `under_review`. At most one statement may exist per
/// report.
#[utoipa::path(
    post,
    path = "/v1/statements",
    request_body = NewOfficerStatement,
    responses(
        (status = 201, description = "Statement created", body = crate::model::OfficerStatement),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Statement already exists for this report")
    ),
    tag = "statements"
)]
#[post("/v1/statements")]
pub async fn create_statement(
    service: web::Data<IntakeService>,
    body: web::Json<NewOfficerStatement>,
) -> Result<HttpResponse, ApiError> {
    let statement = service.create_statement(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(statement))
}

/// Update an officer statement
#[utoipa::path(
    put,
    path = "/v1/statements/{id}",
    params(("id" = i64, Path, description = "Statement ID")),
    request_body = StatementUpdate,
    responses(
        (status = 200, description = "Statement updated", body = crate::model::OfficerStatement),
        (status = 404, description = "Statement not found")
    ),
    tag = "statements"
)]
#[put("/v1/statements/{id}")]
pub async fn update_statement(
    service: web::Data<IntakeService>,
    path: web::Path<i64>,
    body: web::Json<StatementUpdate>,
) -> Result<HttpResponse, ApiError> {
    let statement = service
        .update_statement(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(statement))
}

/// Configure statement routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_statement).service(update_statement);
}
