//! Database models for reports, statements, and analysis records

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::model::{
    AccidentPhoto, AccidentReport, AnalysisRecord, ClaimStatus, OfficerStatement, Recommendation,
    ReportStatus, StatementStatus,
};

/// Database representation of an accident report
#[derive(Debug, Clone, FromRow)]
pub struct AccidentReportRow {
    pub id: i64,
    pub reporter_id: i64,
    pub accident_date: DateTime<Utc>,
    pub accident_location: String,
    pub weather_condition: String,
    pub road_condition: String,
    pub traffic_condition: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: i32,
    pub vehicle_plate: String,
    pub vehicle_color: String,
    pub incident_description: String,
    pub damage_description: String,
    pub injuries_description: Option<String>,
    pub other_party_name: Option<String>,
    pub other_party_ic: Option<String>,
    pub other_party_phone: Option<String>,
    pub other_party_vehicle: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccidentReportRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<AccidentReport, String> {
        let status = report_status_from_string(&self.status)?;

        Ok(AccidentReport {
            id: self.id,
            reporter_id: self.reporter_id,
            accident_date: self.accident_date,
            accident_location: self.accident_location,
            weather_condition: self.weather_condition,
            road_condition: self.road_condition,
            traffic_condition: self.traffic_condition,
            vehicle_make: self.vehicle_make,
            vehicle_model: self.vehicle_model,
            vehicle_year: self.vehicle_year,
            vehicle_plate: self.vehicle_plate,
            vehicle_color: self.vehicle_color,
            incident_description: self.incident_description,
            damage_description: self.damage_description,
            injuries_description: self.injuries_description,
            other_party_name: self.other_party_name,
            other_party_ic: self.other_party_ic,
            other_party_phone: self.other_party_phone,
            other_party_vehicle: self.other_party_vehicle,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database representation of an accident photo
#[derive(Debug, Clone, FromRow)]
pub struct AccidentPhotoRow {
    pub id: i64,
    pub report_id: i64,
    pub filename: String,
    pub file_path: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl AccidentPhotoRow {
    pub fn into_domain(self) -> AccidentPhoto {
        AccidentPhoto {
            id: self.id,
            report_id: self.report_id,
            filename: self.filename,
            file_path: self.file_path,
            description: self.description,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Database representation of an officer statement
#[derive(Debug, Clone, FromRow)]
pub struct OfficerStatementRow {
    pub id: i64,
    pub accident_report_id: i64,
    pub officer_id: i64,
    pub officer_findings: String,
    pub fault_determination: String,
    pub recommended_action: String,
    pub case_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfficerStatementRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<OfficerStatement, String> {
        let status = match self.status.as_str() {
            "draft" => StatementStatus::Draft,
            "submitted" => StatementStatus::Submitted,
            "finalized" => StatementStatus::Finalized,
            other => return Err(format!("Unknown statement status: {}", other)),
        };

        Ok(OfficerStatement {
            id: self.id,
            accident_report_id: self.accident_report_id,
            officer_id: self.officer_id,
            officer_findings: self.officer_findings,
            fault_determination: self.fault_determination,
            recommended_action: self.recommended_action,
            case_number: self.case_number,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database representation of a persisted analysis record
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRecordRow {
    pub id: i64,
    pub accident_report_id: i64,
    pub photo_analysis: String,
    pub damage_assessment: String,
    pub consistency_score: f64,
    pub confidence_score: f64,
    pub discrepancy_analysis: String,
    pub key_discrepancies: serde_json::Value,
    pub consistency_assessment: String,
    pub recommendation: String,
    pub risk_factors: serde_json::Value,
    pub supporting_evidence: serde_json::Value,
    pub claim_status: String,
    pub claim_amount: Option<f64>,
    pub notes: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecordRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<AnalysisRecord, String> {
        let recommendation = match self.recommendation.as_str() {
            "approve" => Recommendation::Approve,
            "investigate" => Recommendation::Investigate,
            "deny" => Recommendation::Deny,
            other => return Err(format!("Unknown recommendation: {}", other)),
        };

        let claim_status = match self.claim_status.as_str() {
            "approved" => ClaimStatus::Approved,
            "denied" => ClaimStatus::Denied,
            "pending_investigation" => ClaimStatus::PendingInvestigation,
            other => return Err(format!("Unknown claim status: {}", other)),
        };

        Ok(AnalysisRecord {
            id: self.id,
            accident_report_id: self.accident_report_id,
            photo_analysis: self.photo_analysis,
            damage_assessment: self.damage_assessment,
            consistency_score: self.consistency_score,
            confidence_score: self.confidence_score,
            discrepancy_analysis: self.discrepancy_analysis,
            key_discrepancies: string_list_from_json(self.key_discrepancies),
            consistency_assessment: self.consistency_assessment,
            recommendation,
            risk_factors: string_list_from_json(self.risk_factors),
            supporting_evidence: string_list_from_json(self.supporting_evidence),
            claim_status,
            claim_amount: self.claim_amount,
            notes: self.notes,
            analyzed_at: self.analyzed_at,
        })
    }
}

pub fn report_status_to_string(status: &ReportStatus) -> &'static str {
    match status {
        ReportStatus::Submitted => "submitted",
        ReportStatus::UnderReview => "under_review",
        ReportStatus::Completed => "completed",
    }
}

pub fn report_status_from_string(status: &str) -> Result<ReportStatus, String> {
    match status {
        "submitted" => Ok(ReportStatus::Submitted),
        "under_review" => Ok(ReportStatus::UnderReview),
        "completed" => Ok(ReportStatus::Completed),
        other => Err(format!("Unknown report status: {}", other)),
    }
}

pub fn statement_status_to_string(status: &StatementStatus) -> &'static str {
    match status {
        StatementStatus::Draft => "draft",
        StatementStatus::Submitted => "submitted",
        StatementStatus::Finalized => "finalized",
    }
}

pub fn recommendation_to_string(recommendation: &Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Approve => "approve",
        Recommendation::Investigate => "investigate",
        Recommendation::Deny => "deny",
    }
}

pub fn claim_status_to_string(status: &ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Approved => "approved",
        ClaimStatus::Denied => "denied",
        ClaimStatus::PendingInvestigation => "pending_investigation",
    }
}

/// Decode a JSONB array of strings, dropping anything that is not a string
fn string_list_from_json(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}
