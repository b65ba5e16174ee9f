use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an accident report as it moves through review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    UnderReview,
    Completed,
}

/// A citizen-submitted accident report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccidentReport {
    pub id: i64,
    /// Opaque reference to the reporting citizen (user management is external)
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
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new accident report
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAccidentReport {
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
}

/// A photo attached to an accident report
///
/// The bytes live on disk outside this system; only the path and a caption
/// are tracked here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccidentPhoto {
    pub id: i64,
    pub report_id: i64,
    pub filename: String,
    pub file_path: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Payload for registering a photo against a report
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAccidentPhoto {
    pub filename: String,
    pub file_path: String,
    pub description: Option<String>,
}

/// The citizen-report projection fed into discrepancy analysis
///
/// Assembled per analysis request and owned by the orchestration call; never
/// persisted on its own.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    pub incident_description: String,
    pub damage_description: String,
    pub vehicle_year: i32,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub accident_location: String,
    pub weather_condition: String,
    pub road_condition: String,
    pub other_party_name: Option<String>,
}

impl EvidenceBundle {
    pub fn from_report(report: &AccidentReport) -> Self {
        Self {
            incident_description: report.incident_description.clone(),
            damage_description: report.damage_description.clone(),
            vehicle_year: report.vehicle_year,
            vehicle_make: report.vehicle_make.clone(),
            vehicle_model: report.vehicle_model.clone(),
            accident_location: report.accident_location.clone(),
            weather_condition: report.weather_condition.clone(),
            road_condition: report.road_condition.clone(),
            other_party_name: report.other_party_name.clone(),
        }
    }
}
