//! Three-source discrepancy analysis client
//!
//! Compares the citizen report, officer statement, and photo analysis by way
//! of a chat-completions text model. The component never propagates a raw
//! failure past its boundary: unparsable bodies fall back to manual text
//! extraction, and transport failures degrade to a synthesized result
//! carrying a manual-review marker.

pub mod mock;
pub mod normalize;
mod prompts;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{DiscrepancyConfig, DiscrepancyResult, EvidenceBundle, OfficerStatement, VisionResult};

pub use prompts::{build_discrepancy_prompt, DISCREPANCY_SYSTEM_PROMPT, SCORING_BANDS};

const USER_AGENT: &str = concat!("accident-claim-intel/", env!("CARGO_PKG_VERSION"));
const MAX_TOKENS: u32 = 2000;
// Low temperature for consistent analysis
const TEMPERATURE: f64 = 0.1;

#[derive(Debug, thiserror::Error)]
pub enum DiscrepancyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discrepancy endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Seam between the orchestrator and the discrepancy backend
#[async_trait]
pub trait DiscrepancyAnalyzer: Send + Sync {
    /// Compare the three evidence sources and produce a `DiscrepancyResult`.
    ///
    /// Infallible by contract; failures surface only as low-confidence
    /// synthesized content.
    async fn analyze(
        &self,
        bundle: &EvidenceBundle,
        statement: &OfficerStatement,
        vision: &VisionResult,
    ) -> DiscrepancyResult;
}

/// Client for a chat-completions-compatible text model endpoint
pub struct DiscrepancyClient {
    client: Client,
    config: DiscrepancyConfig,
}

// Response models - only the fields we need
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl DiscrepancyClient {
    pub fn new(config: DiscrepancyConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    async fn call_chat_completions(&self, url: &str, prompt: &str) -> Result<String, DiscrepancyError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": DISCREPANCY_SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "response_format": {"type": "json_object"},
        });

        let mut request = self.client.post(url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(DiscrepancyError::Status(response.status()));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DiscrepancyError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DiscrepancyError::Parse("response contained no choices".to_string()))
    }

    /// Normalize response content: direct JSON, then an embedded JSON block,
    /// then manual text extraction
    fn normalize_content(content: &str) -> DiscrepancyResult {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(content) {
            if value.is_object() {
                return normalize::normalize_response(&value);
            }
        }

        if let Some(block) = normalize::extract_json_block(content) {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&block) {
                if value.is_object() {
                    tracing::debug!("Recovered JSON block from unstructured response");
                    return normalize::normalize_response(&value);
                }
            }
        }

        tracing::warn!("Response was not structured JSON, using manual text extraction");
        normalize::parse_text_response(content)
    }

    fn synthesize_fallback(&self, vision: &VisionResult) -> DiscrepancyResult {
        let jitter = rand::thread_rng().gen_range(-mock::MAX_JITTER..=mock::MAX_JITTER);
        // The statement precondition was already enforced by the orchestrator,
        // so the synthesized score reflects evidence that is actually present
        mock::synthesize(true, Some(vision), jitter)
    }

    fn chat_completions_url(&self) -> Option<String> {
        self.config
            .base_url
            .as_ref()
            .map(|base| format!("{}/chat/completions", base.as_str().trim_end_matches('/')))
    }
}

#[async_trait]
impl DiscrepancyAnalyzer for DiscrepancyClient {
    async fn analyze(
        &self,
        bundle: &EvidenceBundle,
        statement: &OfficerStatement,
        vision: &VisionResult,
    ) -> DiscrepancyResult {
        let url = match self.chat_completions_url() {
            Some(url) => url,
            None => {
                tracing::debug!("No discrepancy endpoint configured, synthesizing analysis");
                return self.synthesize_fallback(vision);
            }
        };

        let prompt = build_discrepancy_prompt(bundle, statement, vision);

        match self.call_chat_completions(&url, &prompt).await {
            Ok(content) => {
                let result = Self::normalize_content(&content);
                tracing::info!(
                    report = %statement.accident_report_id,
                    confidence_score = result.confidence_score,
                    recommendation = %result.recommendation,
                    "Discrepancy analysis completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    report = %statement.accident_report_id,
                    error = %e,
                    "Discrepancy call failed, falling back to synthesized analysis"
                );
                self.synthesize_fallback(vision)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recommendation;

    #[test]
    fn structured_content_goes_through_the_normalizer() {
        let content = r#"{"confidence_score": 0.9, "recommendation": "approve"}"#;
        let result = DiscrepancyClient::normalize_content(content);
        assert!((result.confidence_score - 0.9).abs() < f64::EPSILON);
        assert_eq!(result.recommendation, Recommendation::Approve);
    }

    #[test]
    fn fenced_json_is_recovered() {
        let content = "```json\n{\"confidence_score\": 0.4}\n```";
        let result = DiscrepancyClient::normalize_content(content);
        assert!((result.confidence_score - 0.4).abs() < f64::EPSILON);
        // The recovered object still went through schema defaults
        assert_eq!(result.discrepancy_analysis, "Analysis completed");
    }

    #[test]
    fn plain_text_uses_manual_extraction() {
        let content = "I could not produce JSON but confidence score: 0.3 seems right";
        let result = DiscrepancyClient::normalize_content(content);
        assert!((result.confidence_score - 0.3).abs() < f64::EPSILON);
        assert_eq!(
            result.key_discrepancies,
            vec!["Unable to parse structured discrepancies from response"]
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_synthesized_result() {
        use chrono::Utc;
        use crate::model::StatementStatus;

        // Nothing listens on the discard port; the connection is refused
        // immediately and the client must fall back rather than error
        let config = DiscrepancyConfig {
            base_url: Some(url::Url::parse("http://127.0.0.1:9/v1").unwrap()),
            timeout: std::time::Duration::from_secs(2),
            ..DiscrepancyConfig::default()
        };
        let client = DiscrepancyClient::new(config);

        let bundle = EvidenceBundle {
            incident_description: "Collision at traffic lights".to_string(),
            damage_description: "Front panel dented".to_string(),
            vehicle_year: 2020,
            vehicle_make: "Honda".to_string(),
            vehicle_model: "City".to_string(),
            accident_location: "Jalan Ipoh".to_string(),
            weather_condition: "Clear".to_string(),
            road_condition: "Dry".to_string(),
            other_party_name: Some("A. Rahman".to_string()),
        };
        let statement = OfficerStatement {
            id: 1,
            accident_report_id: 3,
            officer_id: 2,
            officer_findings: "Rear vehicle failed to brake".to_string(),
            fault_determination: "Other party at fault".to_string(),
            recommended_action: "Process claim".to_string(),
            case_number: "CASE-77".to_string(),
            status: StatementStatus::Submitted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let vision = VisionResult {
            analysis: "Front panel deformation".to_string(),
            consistency_score: 0.8,
            damage_assessment: "Moderate damage".to_string(),
        };

        let result = client.analyze(&bundle, &statement, &vision).await;

        // Statement present and vision 0.8:
        // ((0.6 + 0.15 + 0.10) + 0.8) / 2 = 0.825, plus jitter within 0.05
        assert!(
            result.confidence_score >= 0.77 && result.confidence_score <= 0.88,
            "confidence -> {}",
            result.confidence_score
        );
        assert!(result
            .discrepancy_analysis
            .contains("manual review is advised"));
    }

    #[test]
    fn chat_completions_url_is_built_from_base() {
        let config = DiscrepancyConfig {
            base_url: Some(url::Url::parse("http://192.168.50.125:5501/v1/").unwrap()),
            ..DiscrepancyConfig::default()
        };
        let client = DiscrepancyClient::new(config);
        assert_eq!(
            client.chat_completions_url().as_deref(),
            Some("http://192.168.50.125:5501/v1/chat/completions")
        );
    }
}
