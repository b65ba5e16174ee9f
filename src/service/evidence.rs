//! Storage collaborator seam for the analysis pipeline
//!
//! The orchestrator talks to storage through this trait so it can be
//! exercised against an in-memory store in tests.

use async_trait::async_trait;

use crate::db::repository::{AnalysisRepository, ReportRepository, StatementRepository};
use crate::db::DbError;
use crate::model::{
    AccidentPhoto, AccidentReport, AnalysisRecord, NewAnalysisRecord, OfficerStatement,
    ReportStatus,
};

/// Evidence and persistence operations consumed by the orchestrator
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn fetch_report(&self, report_id: i64) -> Result<Option<AccidentReport>, DbError>;

    async fn fetch_statement(&self, report_id: i64) -> Result<Option<OfficerStatement>, DbError>;

    async fn fetch_photos(&self, report_id: i64) -> Result<Vec<AccidentPhoto>, DbError>;

    async fn fetch_analysis(&self, report_id: i64) -> Result<Option<AnalysisRecord>, DbError>;

    /// Insert an analysis record; a duplicate for the same report is
    /// `DbError::Conflict`
    async fn insert_analysis(&self, record: &NewAnalysisRecord) -> Result<AnalysisRecord, DbError>;

    async fn update_report_status(
        &self,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<(), DbError>;
}

/// PostgreSQL-backed evidence store composed from the entity repositories
pub struct PgEvidenceStore {
    reports: ReportRepository,
    statements: StatementRepository,
    analyses: AnalysisRepository,
}

impl PgEvidenceStore {
    pub fn new(
        reports: ReportRepository,
        statements: StatementRepository,
        analyses: AnalysisRepository,
    ) -> Self {
        Self {
            reports,
            statements,
            analyses,
        }
    }
}

#[async_trait]
impl EvidenceStore for PgEvidenceStore {
    async fn fetch_report(&self, report_id: i64) -> Result<Option<AccidentReport>, DbError> {
        self.reports.find_by_id(report_id).await
    }

    async fn fetch_statement(&self, report_id: i64) -> Result<Option<OfficerStatement>, DbError> {
        self.statements.find_by_report(report_id).await
    }

    async fn fetch_photos(&self, report_id: i64) -> Result<Vec<AccidentPhoto>, DbError> {
        self.reports.photos_for_report(report_id).await
    }

    async fn fetch_analysis(&self, report_id: i64) -> Result<Option<AnalysisRecord>, DbError> {
        self.analyses.find_by_report(report_id).await
    }

    async fn insert_analysis(&self, record: &NewAnalysisRecord) -> Result<AnalysisRecord, DbError> {
        self.analyses.insert(record).await
    }

    async fn update_report_status(
        &self,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<(), DbError> {
        self.reports.update_status(report_id, status).await
    }
}
