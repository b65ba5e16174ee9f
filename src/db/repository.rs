//! Repositories for report, statement, and analysis persistence

use sqlx::PgPool;

use super::models::{
    claim_status_to_string, recommendation_to_string, report_status_to_string,
    statement_status_to_string, AccidentPhotoRow, AccidentReportRow, AnalysisRecordRow,
    OfficerStatementRow,
};
use super::DbError;
use crate::model::{
    AccidentPhoto, AccidentReport, AnalysisRecord, NewAccidentPhoto, NewAccidentReport,
    NewAnalysisRecord, NewOfficerStatement, OfficerStatement, ReportStatus, StatementUpdate,
};

/// Repository for accident report and photo operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new accident report with status `submitted`
    pub async fn insert(&self, report: &NewAccidentReport) -> Result<AccidentReport, DbError> {
        let row: AccidentReportRow = sqlx::query_as(
            r#"
            INSERT INTO accident_reports (
                reporter_id, accident_date, accident_location,
                weather_condition, road_condition, traffic_condition,
                vehicle_make, vehicle_model, vehicle_year, vehicle_plate, vehicle_color,
                incident_description, damage_description, injuries_description,
                other_party_name, other_party_ic, other_party_phone, other_party_vehicle
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(report.reporter_id)
        .bind(report.accident_date)
        .bind(&report.accident_location)
        .bind(&report.weather_condition)
        .bind(&report.road_condition)
        .bind(&report.traffic_condition)
        .bind(&report.vehicle_make)
        .bind(&report.vehicle_model)
        .bind(report.vehicle_year)
        .bind(&report.vehicle_plate)
        .bind(&report.vehicle_color)
        .bind(&report.incident_description)
        .bind(&report.damage_description)
        .bind(&report.injuries_description)
        .bind(&report.other_party_name)
        .bind(&report.other_party_ic)
        .bind(&report.other_party_phone)
        .bind(&report.other_party_vehicle)
        .fetch_one(&self.pool)
        .await?;

        let report = row.into_domain().map_err(DbError::Serialization)?;
        tracing::debug!(report = %report.id, "Inserted accident report");
        Ok(report)
    }

    /// Get an accident report by ID
    pub async fn get_by_id(&self, id: i64) -> Result<AccidentReport, DbError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("accident report {}", id)))
    }

    /// Find an accident report by ID, returning None when absent
    pub async fn find_by_id(&self, id: i64) -> Result<Option<AccidentReport>, DbError> {
        let row: Option<AccidentReportRow> =
            sqlx::query_as("SELECT * FROM accident_reports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }

    /// List accident reports, optionally filtered by status, newest first
    pub async fn list(&self, status: Option<ReportStatus>) -> Result<Vec<AccidentReport>, DbError> {
        let rows: Vec<AccidentReportRow> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT * FROM accident_reports WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(report_status_to_string(&status))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM accident_reports ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter()
            .map(|r| r.into_domain().map_err(DbError::Serialization))
            .collect()
    }

    /// Update the status of an accident report
    pub async fn update_status(&self, id: i64, status: ReportStatus) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE accident_reports SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(report_status_to_string(&status))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("accident report {}", id)));
        }

        tracing::debug!(report = %id, status = report_status_to_string(&status), "Updated report status");
        Ok(())
    }

    /// Register a photo against a report
    pub async fn add_photo(
        &self,
        report_id: i64,
        photo: &NewAccidentPhoto,
    ) -> Result<AccidentPhoto, DbError> {
        let row: AccidentPhotoRow = sqlx::query_as(
            r#"
            INSERT INTO accident_photos (report_id, filename, file_path, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(&photo.filename)
        .bind(&photo.file_path)
        .bind(&photo.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    /// List photos registered against a report
    pub async fn photos_for_report(&self, report_id: i64) -> Result<Vec<AccidentPhoto>, DbError> {
        let rows: Vec<AccidentPhotoRow> = sqlx::query_as(
            "SELECT * FROM accident_photos WHERE report_id = $1 ORDER BY uploaded_at",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

/// Repository for officer statement operations
#[derive(Clone)]
pub struct StatementRepository {
    pool: PgPool,
}

impl StatementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new officer statement
    ///
    /// The UNIQUE constraint on `accident_report_id` turns a duplicate into
    /// `DbError::Conflict`.
    pub async fn insert(
        &self,
        statement: &NewOfficerStatement,
    ) -> Result<OfficerStatement, DbError> {
        let row: OfficerStatementRow = sqlx::query_as(
            r#"
            INSERT INTO officer_statements (
                accident_report_id, officer_id, officer_findings,
                fault_determination, recommended_action, case_number
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(statement.accident_report_id)
        .bind(statement.officer_id)
        .bind(&statement.officer_findings)
        .bind(&statement.fault_determination)
        .bind(&statement.recommended_action)
        .bind(&statement.case_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_insert(
                e,
                &format!("statement for report {}", statement.accident_report_id),
            )
        })?;

        let statement = row.into_domain().map_err(DbError::Serialization)?;
        tracing::debug!(
            report = %statement.accident_report_id,
            case_number = %statement.case_number,
            "Inserted officer statement"
        );
        Ok(statement)
    }

    /// Find the statement for a report, returning None when absent
    pub async fn find_by_report(
        &self,
        report_id: i64,
    ) -> Result<Option<OfficerStatement>, DbError> {
        let row: Option<OfficerStatementRow> =
            sqlx::query_as("SELECT * FROM officer_statements WHERE accident_report_id = $1")
                .bind(report_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }

    /// Apply a partial update to a statement
    pub async fn update(
        &self,
        id: i64,
        update: &StatementUpdate,
    ) -> Result<OfficerStatement, DbError> {
        let status = update.status.as_ref().map(statement_status_to_string);

        let row: Option<OfficerStatementRow> = sqlx::query_as(
            r#"
            UPDATE officer_statements SET
                officer_findings = COALESCE($2, officer_findings),
                fault_determination = COALESCE($3, fault_determination),
                recommended_action = COALESCE($4, recommended_action),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.officer_findings)
        .bind(&update.fault_determination)
        .bind(&update.recommended_action)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DbError::NotFound(format!("officer statement {}", id)))?;
        row.into_domain().map_err(DbError::Serialization)
    }
}

/// Repository for persisted analysis records
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new analysis record
    ///
    /// The UNIQUE constraint on `accident_report_id` makes creation
    /// append-only; a second insert for the same report yields
    /// `DbError::Conflict`.
    pub async fn insert(&self, record: &NewAnalysisRecord) -> Result<AnalysisRecord, DbError> {
        let key_discrepancies = serde_json::to_value(&record.key_discrepancies)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let risk_factors = serde_json::to_value(&record.risk_factors)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let supporting_evidence = serde_json::to_value(&record.supporting_evidence)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        let row: AnalysisRecordRow = sqlx::query_as(
            r#"
            INSERT INTO claim_analyses (
                accident_report_id, photo_analysis, damage_assessment, consistency_score,
                confidence_score, discrepancy_analysis, key_discrepancies,
                consistency_assessment, recommendation, risk_factors, supporting_evidence,
                claim_status, claim_amount, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(record.accident_report_id)
        .bind(&record.photo_analysis)
        .bind(&record.damage_assessment)
        .bind(record.consistency_score)
        .bind(record.confidence_score)
        .bind(&record.discrepancy_analysis)
        .bind(&key_discrepancies)
        .bind(&record.consistency_assessment)
        .bind(recommendation_to_string(&record.recommendation))
        .bind(&risk_factors)
        .bind(&supporting_evidence)
        .bind(claim_status_to_string(&record.claim_status))
        .bind(record.claim_amount)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_insert(
                e,
                &format!("analysis for report {}", record.accident_report_id),
            )
        })?;

        let record = row.into_domain().map_err(DbError::Serialization)?;
        tracing::debug!(report = %record.accident_report_id, "Inserted analysis record");
        Ok(record)
    }

    /// Find the analysis record for a report, returning None when absent
    pub async fn find_by_report(&self, report_id: i64) -> Result<Option<AnalysisRecord>, DbError> {
        let row: Option<AnalysisRecordRow> =
            sqlx::query_as("SELECT * FROM claim_analyses WHERE accident_report_id = $1")
                .bind(report_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }
}
