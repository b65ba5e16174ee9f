//! Report, photo, and statement intake
//!
//! Conventional CRUD consumed by the HTTP layer; the analysis pipeline only
//! ever reads what this service writes.

use crate::db::repository::{ReportRepository, StatementRepository};
use crate::db::DbError;
use crate::model::{
    AccidentPhoto, AccidentReport, NewAccidentPhoto, NewAccidentReport, NewOfficerStatement,
    OfficerStatement, ReportStatus, StatementUpdate,
};

const MAX_PHOTOS_PER_REPORT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Accident report not found: {0}")]
    ReportNotFound(i64),

    #[error("Officer statement not found: {0}")]
    StatementNotFound(i64),

    #[error("Statement already exists for report {0}")]
    StatementExists(i64),

    #[error("Report {0} would exceed the maximum of {MAX_PHOTOS_PER_REPORT} photos")]
    TooManyPhotos(i64),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Service for report and statement intake
pub struct IntakeService {
    reports: ReportRepository,
    statements: StatementRepository,
}

impl IntakeService {
    pub fn new(reports: ReportRepository, statements: StatementRepository) -> Self {
        Self {
            reports,
            statements,
        }
    }

    /// Create a new accident report with status `submitted`
    pub async fn create_report(
        &self,
        report: NewAccidentReport,
    ) -> Result<AccidentReport, IntakeError> {
        let report = self.reports.insert(&report).await?;
        tracing::info!(report = %report.id, reporter = %report.reporter_id, "Accident report created");
        Ok(report)
    }

    pub async fn get_report(&self, report_id: i64) -> Result<AccidentReport, IntakeError> {
        self.reports
            .find_by_id(report_id)
            .await?
            .ok_or(IntakeError::ReportNotFound(report_id))
    }

    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<AccidentReport>, IntakeError> {
        Ok(self.reports.list(status).await?)
    }

    pub async fn photos_for_report(
        &self,
        report_id: i64,
    ) -> Result<Vec<AccidentPhoto>, IntakeError> {
        self.get_report(report_id).await?;
        Ok(self.reports.photos_for_report(report_id).await?)
    }

    /// Register already-stored photo files against a report
    pub async fn register_photos(
        &self,
        report_id: i64,
        photos: Vec<NewAccidentPhoto>,
    ) -> Result<Vec<AccidentPhoto>, IntakeError> {
        self.get_report(report_id).await?;

        let existing = self.reports.photos_for_report(report_id).await?.len();
        if existing + photos.len() > MAX_PHOTOS_PER_REPORT {
            return Err(IntakeError::TooManyPhotos(report_id));
        }

        let mut registered = Vec::with_capacity(photos.len());
        for photo in &photos {
            registered.push(self.reports.add_photo(report_id, photo).await?);
        }

        tracing::info!(report = %report_id, photos = registered.len(), "Photos registered");
        Ok(registered)
    }

    /// Create an officer statement and move the report under review
    pub async fn create_statement(
        &self,
        statement: NewOfficerStatement,
    ) -> Result<OfficerStatement, IntakeError> {
        let report_id = statement.accident_report_id;
        self.get_report(report_id).await?;

        if self.statements.find_by_report(report_id).await?.is_some() {
            return Err(IntakeError::StatementExists(report_id));
        }

        let statement = self.statements.insert(&statement).await.map_err(|e| match e {
            DbError::Conflict(_) => IntakeError::StatementExists(report_id),
            other => IntakeError::Db(other),
        })?;

        self.reports
            .update_status(report_id, ReportStatus::UnderReview)
            .await?;

        tracing::info!(
            report = %report_id,
            case_number = %statement.case_number,
            "Officer statement created, report under review"
        );
        Ok(statement)
    }

    pub async fn update_statement(
        &self,
        statement_id: i64,
        update: StatementUpdate,
    ) -> Result<OfficerStatement, IntakeError> {
        let statement = self.statements.update(statement_id, &update).await.map_err(|e| match e {
            DbError::NotFound(_) => IntakeError::StatementNotFound(statement_id),
            other => IntakeError::Db(other),
        })?;

        tracing::debug!(statement = %statement_id, "Officer statement updated");
        Ok(statement)
    }
}
