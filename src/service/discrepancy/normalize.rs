//! Validation and repair of model output into the fixed result schema
//!
//! Every discrepancy result, whether structured or reconstructed from free
//! text, passes through this gate. It never fails: missing fields default,
//! numbers clamp, and malformed lists coerce to empty.

use regex::Regex;
use serde_json::Value;

use crate::model::{DiscrepancyResult, Recommendation};

/// Confidence assumed when the model supplied none
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const DEFAULT_ANALYSIS: &str = "Analysis completed";
const DEFAULT_ASSESSMENT: &str = "Assessment completed";

const TEXT_FALLBACK_MAX_CHARS: usize = 500;

/// Normalize an arbitrary decoded JSON object into a `DiscrepancyResult`
pub fn normalize_response(value: &Value) -> DiscrepancyResult {
    let confidence_score = value
        .get("confidence_score")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let recommendation = value
        .get("recommendation")
        .and_then(Value::as_str)
        .map(Recommendation::parse_or_investigate)
        .unwrap_or(Recommendation::Investigate);

    DiscrepancyResult {
        confidence_score,
        discrepancy_analysis: string_or_default(value.get("discrepancy_analysis"), DEFAULT_ANALYSIS),
        key_discrepancies: string_list(value.get("key_discrepancies")),
        consistency_assessment: string_or_default(
            value.get("consistency_assessment"),
            DEFAULT_ASSESSMENT,
        ),
        recommendation,
        risk_factors: string_list(value.get("risk_factors")),
        supporting_evidence: string_list(value.get("supporting_evidence")),
    }
}

/// Manual fallback when the response body is not JSON at all
///
/// Recovers a confidence score by regex and keeps a bounded excerpt of the
/// raw text as the analysis.
pub fn parse_text_response(text: &str) -> DiscrepancyResult {
    let re = Regex::new(r#"(?i)confidence[_\s]*score["\s:]*(\d+(?:\.\d+)?)"#).unwrap();
    let confidence_score = re
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let discrepancy_analysis = if text.chars().count() > TEXT_FALLBACK_MAX_CHARS {
        let truncated: String = text.chars().take(TEXT_FALLBACK_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    };

    DiscrepancyResult {
        confidence_score,
        discrepancy_analysis,
        key_discrepancies: vec![
            "Unable to parse structured discrepancies from response".to_string()
        ],
        consistency_assessment: "Analysis completed but response format was not structured"
            .to_string(),
        recommendation: Recommendation::Investigate,
        risk_factors: Vec::new(),
        supporting_evidence: Vec::new(),
    }
}

/// Extract a JSON object from text that may wrap it in markdown fences or prose
pub fn extract_json_block(text: &str) -> Option<String> {
    let text = text.trim();

    for fence in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            if let Some(end) = rest.rfind("```") {
                return Some(rest[..end].trim().to_string());
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        return Some(text[start..=end].to_string());
    }

    None
}

fn string_or_default(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Coerce a field into a list of strings; non-lists become empty lists
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_response_passes_through() {
        let value = json!({
            "confidence_score": 0.85,
            "discrepancy_analysis": "No discrepancies",
            "key_discrepancies": ["a"],
            "consistency_assessment": "Consistent",
            "recommendation": "approve",
            "risk_factors": [],
            "supporting_evidence": ["photos match"]
        });
        let result = normalize_response(&value);
        assert!((result.confidence_score - 0.85).abs() < f64::EPSILON);
        assert_eq!(result.recommendation, Recommendation::Approve);
        assert_eq!(result.key_discrepancies, vec!["a"]);
        assert_eq!(result.supporting_evidence, vec!["photos match"]);
    }

    #[test]
    fn missing_fields_default() {
        let result = normalize_response(&json!({}));
        assert!((result.confidence_score - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(result.discrepancy_analysis, "Analysis completed");
        assert_eq!(result.consistency_assessment, "Assessment completed");
        assert_eq!(result.recommendation, Recommendation::Investigate);
        assert!(result.key_discrepancies.is_empty());
        assert!(result.risk_factors.is_empty());
        assert!(result.supporting_evidence.is_empty());
    }

    #[test]
    fn confidence_is_clamped() {
        let result = normalize_response(&json!({"confidence_score": 3.5}));
        assert!((result.confidence_score - 1.0).abs() < f64::EPSILON);

        let result = normalize_response(&json!({"confidence_score": -0.5}));
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn non_list_values_coerce_to_empty_lists() {
        for bad in [json!("a string"), json!(null), json!(42), json!({"k": "v"})] {
            let value = json!({
                "key_discrepancies": bad.clone(),
                "risk_factors": bad.clone(),
                "supporting_evidence": bad,
            });
            let result = normalize_response(&value);
            assert!(result.key_discrepancies.is_empty());
            assert!(result.risk_factors.is_empty());
            assert!(result.supporting_evidence.is_empty());
        }
    }

    #[test]
    fn non_string_list_entries_are_dropped() {
        let value = json!({"risk_factors": ["real", 7, null, "also real"]});
        let result = normalize_response(&value);
        assert_eq!(result.risk_factors, vec!["real", "also real"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let value = json!({
            "confidence_score": 0.42,
            "discrepancy_analysis": "text",
            "key_discrepancies": ["x", "y"],
            "consistency_assessment": "mixed",
            "recommendation": "deny",
            "risk_factors": ["r"],
            "supporting_evidence": []
        });
        let once = normalize_response(&value);
        let reencoded = serde_json::to_value(&once).unwrap();
        let twice = normalize_response(&reencoded);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_recommendation_normalizes_to_investigate() {
        let result = normalize_response(&json!({"recommendation": "escalate to legal"}));
        assert_eq!(result.recommendation, Recommendation::Investigate);
    }

    #[test]
    fn text_fallback_extracts_confidence() {
        let result = parse_text_response("the confidence_score: 0.35 given the mismatch");
        assert!((result.confidence_score - 0.35).abs() < f64::EPSILON);
        assert_eq!(result.recommendation, Recommendation::Investigate);
        assert_eq!(
            result.key_discrepancies,
            vec!["Unable to parse structured discrepancies from response"]
        );
    }

    #[test]
    fn text_fallback_defaults_and_truncates() {
        let long_text = "x".repeat(800);
        let result = parse_text_response(&long_text);
        assert!((result.confidence_score - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(result.discrepancy_analysis.chars().count(), 503);
        assert!(result.discrepancy_analysis.ends_with("..."));
    }

    #[test]
    fn json_block_recovery_handles_fences_and_prose() {
        assert_eq!(
            extract_json_block("```json\n{\"a\": 1}\n```").as_deref(),
            Some("{\"a\": 1}")
        );
        assert_eq!(
            extract_json_block("Here you go: {\"a\": 1} hope it helps").as_deref(),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_block("no json here"), None);
    }
}
