use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    Draft,
    Submitted,
    Finalized,
}

/// Findings attached to a report by the investigating officer
///
/// Discrepancy analysis requires one of these to exist; the orchestrator
/// refuses to run without it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfficerStatement {
    pub id: i64,
    pub accident_report_id: i64,
    /// Opaque reference to the authoring officer (user management is external)
    pub officer_id: i64,
    pub officer_findings: String,
    pub fault_determination: String,
    pub recommended_action: String,
    pub case_number: String,
    pub status: StatementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an officer statement
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewOfficerStatement {
    pub accident_report_id: i64,
    pub officer_id: i64,
    pub officer_findings: String,
    pub fault_determination: String,
    pub recommended_action: String,
    pub case_number: String,
}

/// Partial update of an officer statement
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatementUpdate {
    pub officer_findings: Option<String>,
    pub fault_determination: Option<String>,
    pub recommended_action: Option<String>,
    pub status: Option<StatementStatus>,
}
