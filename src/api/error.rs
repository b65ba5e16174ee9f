//! Unified API error handling
//!
//! This module provides a consistent error response format across all API
//! endpoints.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

use crate::service::{AnalysisError, IntakeError};

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints return `Result<T, ApiError>` for consistent error
/// handling. Precondition failures are distinct from not-found and from
/// conflicts so callers can tell "workflow not ready" apart from "gone" and
/// "already done".
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Officer statement precondition not met (400)
    #[error("Officer statement required: {0}")]
    StatementMissing(String),

    /// Photo precondition not met (400)
    #[error("Photos required: {0}")]
    PhotosMissing(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StatementMissing(_) | ApiError::PhotosMissing(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::StatementMissing(_) => "statement_missing",
            ApiError::PhotosMissing(_) => "photos_missing",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
            ApiError::Database(_) => "database_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::ReportNotFound(id) => {
                ApiError::NotFound(format!("accident report {}", id))
            }
            AnalysisError::AnalysisNotFound(id) => {
                ApiError::NotFound(format!("analysis for report {}", id))
            }
            AnalysisError::StatementMissing(id) => ApiError::StatementMissing(format!(
                "no officer statement recorded for report {}",
                id
            )),
            AnalysisError::PhotosMissing(id) => {
                ApiError::PhotosMissing(format!("no photos registered for report {}", id))
            }
            AnalysisError::AlreadyAnalyzed(id) => {
                ApiError::Conflict(format!("analysis already exists for report {}", id))
            }
            AnalysisError::Db(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::ReportNotFound(id) => {
                ApiError::NotFound(format!("accident report {}", id))
            }
            IntakeError::StatementNotFound(id) => {
                ApiError::NotFound(format!("officer statement {}", id))
            }
            IntakeError::StatementExists(id) => {
                ApiError::Conflict(format!("statement already exists for report {}", id))
            }
            IntakeError::TooManyPhotos(_) => ApiError::BadRequest(err.to_string()),
            IntakeError::Db(e) => ApiError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_errors_map_to_distinct_bad_requests() {
        let statement: ApiError = AnalysisError::StatementMissing(7).into();
        assert_eq!(statement.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(statement, ApiError::StatementMissing(_)));

        let photos: ApiError = AnalysisError::PhotosMissing(7).into();
        assert_eq!(photos.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(photos, ApiError::PhotosMissing(_)));
    }

    #[test]
    fn duplicate_analysis_maps_to_conflict() {
        let err: ApiError = AnalysisError::AlreadyAnalyzed(42).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
