use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Result of the photo-vision analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisionResult {
    /// Full analysis text as returned by the model (or synthesized)
    pub analysis: String,
    /// Consistency between photos and written descriptions, always in [0, 1]
    pub consistency_score: f64,
    pub damage_assessment: String,
}

/// Claim-processing recommendation derived from the confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Approve,
    Investigate,
    Deny,
}

impl Recommendation {
    /// Derive the recommendation from a confidence score.
    ///
    /// The thresholds are fixed: above 0.8 approve, above 0.5 investigate,
    /// otherwise deny.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            Recommendation::Approve
        } else if confidence > 0.5 {
            Recommendation::Investigate
        } else {
            Recommendation::Deny
        }
    }

    /// Parse a model-provided recommendation tag.
    ///
    /// Anything unrecognized maps to `Investigate` so unexpected output
    /// always lands in front of a human reviewer.
    pub fn parse_or_investigate(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "approve" => Recommendation::Approve,
            "deny" => Recommendation::Deny,
            "investigate" => Recommendation::Investigate,
            _ => Recommendation::Investigate,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Approve => "approve",
            Recommendation::Investigate => "investigate",
            Recommendation::Deny => "deny",
        };
        f.write_str(s)
    }
}

/// Result of the three-source discrepancy analysis step
///
/// Every instance is schema-valid: lists are present (possibly empty) and
/// strings are placeholder sentinels rather than absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscrepancyResult {
    /// Claim-consistency confidence, always in [0, 1]
    pub confidence_score: f64,
    pub discrepancy_analysis: String,
    pub key_discrepancies: Vec<String>,
    pub consistency_assessment: String,
    pub recommendation: Recommendation,
    pub risk_factors: Vec<String>,
    pub supporting_evidence: Vec<String>,
}

/// Combined pipeline output returned to the caller of the orchestration call
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompleteAnalysis {
    pub vision: VisionResult,
    pub discrepancy: DiscrepancyResult,
}

/// Final claim decision rendered by the reviewing agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Approved,
    Denied,
    PendingInvestigation,
}

/// Persisted analysis record, one per accident report
///
/// Creation is append-only: an existing record for the same report blocks
/// re-creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRecord {
    pub id: i64,
    pub accident_report_id: i64,
    pub photo_analysis: String,
    pub damage_assessment: String,
    pub consistency_score: f64,
    pub confidence_score: f64,
    pub discrepancy_analysis: String,
    pub key_discrepancies: Vec<String>,
    pub consistency_assessment: String,
    pub recommendation: Recommendation,
    pub risk_factors: Vec<String>,
    pub supporting_evidence: Vec<String>,
    pub claim_status: ClaimStatus,
    pub claim_amount: Option<f64>,
    pub notes: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Payload for persisting an analysis record
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAnalysisRecord {
    pub accident_report_id: i64,
    pub photo_analysis: String,
    pub damage_assessment: String,
    pub consistency_score: f64,
    pub confidence_score: f64,
    pub discrepancy_analysis: String,
    pub key_discrepancies: Vec<String>,
    pub consistency_assessment: String,
    pub recommendation: Recommendation,
    pub risk_factors: Vec<String>,
    pub supporting_evidence: Vec<String>,
    pub claim_status: ClaimStatus,
    pub claim_amount: Option<f64>,
    pub notes: Option<String>,
}
