//! Prompt template for three-source discrepancy analysis

use crate::model::{EvidenceBundle, OfficerStatement, VisionResult};

/// System instruction sent with every discrepancy request
pub const DISCREPANCY_SYSTEM_PROMPT: &str = "You are an expert insurance investigator specializing in accident claim analysis. Provide accurate, detailed assessments in the requested JSON format.";

/// Scoring-band guidance embedded verbatim in every request
pub const SCORING_BANDS: &str = r#"- 0.9-1.0: Very consistent, very low risk
- 0.7-0.8: Generally consistent, minor discrepancies
- 0.5-0.6: Some inconsistencies, investigation required
- 0.3-0.4: Notable discrepancies, high risk
- 0.0-0.2: Major inconsistencies, likely fraud"#;

const NOT_AVAILABLE: &str = "N/A";
const NO_OTHER_PARTY: &str = "None reported";

/// Build the full analysis prompt embedding all three evidence sources
pub fn build_discrepancy_prompt(
    bundle: &EvidenceBundle,
    statement: &OfficerStatement,
    vision: &VisionResult,
) -> String {
    let other_party = bundle
        .other_party_name
        .as_deref()
        .unwrap_or(NO_OTHER_PARTY);

    format!(
        r#"You are an expert insurance investigator analyzing an accident report for discrepancies and consistency.
Analyze the following three information sources and provide a detailed assessment:

=== CITIZEN REPORT ===
Incident description: {incident}
Damage description: {damage}
Vehicle: {year} {make} {model}
Location: {location}
Weather: {weather}
Road condition: {road}
Other party: {other_party}

=== OFFICER STATEMENT ===
Officer findings: {findings}
Fault determination: {fault}
Recommended action: {action}
Case number: {case_number}

=== PHOTO ANALYSIS ===
Analysis: {photo_analysis}
Damage assessment: {damage_assessment}
Consistency score: {consistency_score}

=== ANALYSIS REQUIREMENTS ===
Provide a comprehensive analysis in the following JSON format:

{{
    "confidence_score": <float between 0.0 and 1.0>,
    "discrepancy_analysis": "<detailed analysis of any discrepancies found>",
    "key_discrepancies": [
        "<list of specific discrepancies or inconsistencies>",
        "<each item must be a specific concern>"
    ],
    "consistency_assessment": "<overall assessment of consistency across the three sources>",
    "recommendation": "<recommendation for claim processing: approve, investigate, or deny>",
    "risk_factors": [
        "<list of risk factors that may indicate fraud or inaccuracy>",
        "<each item must be a specific risk>"
    ],
    "supporting_evidence": [
        "<list of evidence supporting the validity of the claim>",
        "<each item must be specific supporting evidence>"
    ]
}}

Focus on:
1. Consistency between the citizen description and the officer findings
2. Alignment between the reported damage and the photo analysis
3. Logical consistency of the incident narrative
4. Any red flags that may indicate fraud or exaggeration
5. Technical accuracy of the damage description versus the visual evidence
6. Overall credibility of the claim

Provide a confidence score where:
{bands}

IMPORTANT: Return only the JSON response, no additional text."#,
        incident = non_empty(&bundle.incident_description),
        damage = non_empty(&bundle.damage_description),
        year = bundle.vehicle_year,
        make = non_empty(&bundle.vehicle_make),
        model = non_empty(&bundle.vehicle_model),
        location = non_empty(&bundle.accident_location),
        weather = non_empty(&bundle.weather_condition),
        road = non_empty(&bundle.road_condition),
        other_party = other_party,
        findings = non_empty(&statement.officer_findings),
        fault = non_empty(&statement.fault_determination),
        action = non_empty(&statement.recommended_action),
        case_number = non_empty(&statement.case_number),
        photo_analysis = non_empty(&vision.analysis),
        damage_assessment = non_empty(&vision.damage_assessment),
        consistency_score = vision.consistency_score,
        bands = SCORING_BANDS,
    )
}

fn non_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}
