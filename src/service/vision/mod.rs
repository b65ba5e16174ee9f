//! Photo-vision analysis client
//!
//! Sends encoded accident photos plus the written descriptions to a vision
//! model endpoint and produces a `VisionResult`. The operation never fails
//! outright: missing images, encoding failures, and unreachable endpoints
//! all degrade to sentinel or synthesized results.

mod encode;
pub mod mock;
pub mod normalize;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use crate::model::{VisionConfig, VisionEndpoint, VisionResult};

pub use encode::{encode_image_base64, EncodeError, MAX_IMAGE_DIM};
pub use normalize::parse_vision_text;

const USER_AGENT: &str = concat!("accident-claim-intel/", env!("CARGO_PKG_VERSION"));
const CHAT_MAX_TOKENS: u32 = 1000;

const NO_IMAGES_ANALYSIS: &str = "No valid images found for analysis";
const NO_IMAGES_DAMAGE: &str = "Unable to assess damage without images";
const ENCODE_FAILURE_DAMAGE: &str = "Analysis failed due to technical error";

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Seam between the orchestrator and the vision backend
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    /// Analyze accident photos against the written descriptions.
    ///
    /// Infallible by contract; the worst case is a low-information sentinel
    /// result.
    async fn analyze_photos(
        &self,
        photo_paths: &[String],
        damage_description: &str,
        incident_description: &str,
    ) -> VisionResult;
}

/// Client for vision model endpoints
pub struct VisionClient {
    client: Client,
    config: VisionConfig,
}

// Response models - only the fields we need
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

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

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Fixed result for requests with no usable images
    pub fn no_images_result() -> VisionResult {
        VisionResult {
            analysis: NO_IMAGES_ANALYSIS.to_string(),
            consistency_score: 0.0,
            damage_assessment: NO_IMAGES_DAMAGE.to_string(),
        }
    }

    fn encode_failure_result(error: &EncodeError) -> VisionResult {
        VisionResult {
            analysis: format!("Error during photo analysis: {}", error),
            consistency_score: 0.0,
            damage_assessment: ENCODE_FAILURE_DAMAGE.to_string(),
        }
    }

    /// Ollama-style generate call with inline images
    async fn call_generate(
        &self,
        url: &url::Url,
        prompt: &str,
        images: &[String],
    ) -> Result<String, VisionError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "images": images,
            "stream": false,
        });

        let response = self.client.post(url.clone()).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(VisionError::Status(response.status()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(e.to_string()))?;

        Ok(body.response)
    }

    /// Chat-completions call with base64 data-URI image attachments
    async fn call_chat(
        &self,
        url: &url::Url,
        prompt: &str,
        images: &[String],
    ) -> Result<String, VisionError> {
        let mut content = vec![serde_json::json!({"type": "text", "text": prompt})];
        for image in images {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {"url": format!("data:image/jpeg;base64,{}", image)},
            }));
        }

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": CHAT_MAX_TOKENS,
        });

        let mut request = self.client.post(url.clone()).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(VisionError::Status(response.status()));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VisionError::Parse("response contained no choices".to_string()))
    }

    /// Encode every readable photo; missing files are skipped
    fn encode_photos(photo_paths: &[String]) -> Result<Vec<String>, EncodeError> {
        let mut encoded = Vec::new();
        for photo_path in photo_paths {
            let path = Path::new(photo_path);
            if !path.exists() {
                tracing::warn!(path = %photo_path, "Photo file missing, skipping");
                continue;
            }
            encoded.push(encode_image_base64(path)?);
        }
        Ok(encoded)
    }
}

#[async_trait]
impl PhotoAnalyzer for VisionClient {
    async fn analyze_photos(
        &self,
        photo_paths: &[String],
        damage_description: &str,
        incident_description: &str,
    ) -> VisionResult {
        let encoded = match Self::encode_photos(photo_paths) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Photo encoding failed");
                return Self::encode_failure_result(&e);
            }
        };

        if encoded.is_empty() {
            tracing::debug!("No usable images, returning sentinel result");
            return Self::no_images_result();
        }

        let endpoint = match self.config.endpoint() {
            Some(endpoint) => endpoint,
            None => {
                tracing::debug!(
                    images = encoded.len(),
                    "No vision endpoint configured, synthesizing analysis"
                );
                return mock::synthesize(encoded.len(), damage_description, incident_description);
            }
        };

        let prompt = prompts::build_vision_prompt(damage_description, incident_description);

        let raw = match &endpoint {
            VisionEndpoint::Generate(url) => self.call_generate(url, &prompt, &encoded).await,
            VisionEndpoint::Chat(url) => self.call_chat(url, &prompt, &encoded).await,
        };

        match raw {
            Ok(text) => {
                let result = parse_vision_text(&text);
                tracing::info!(
                    images = encoded.len(),
                    consistency_score = result.consistency_score,
                    "Vision analysis completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Vision call failed, falling back to synthesized analysis"
                );
                mock::synthesize(encoded.len(), "", "")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VisionConfig;

    #[test]
    fn no_images_sentinel_is_exact() {
        let result = VisionClient::no_images_result();
        assert_eq!(result.analysis, "No valid images found for analysis");
        assert_eq!(result.consistency_score, 0.0);
        assert_eq!(result.damage_assessment, "Unable to assess damage without images");
    }

    #[tokio::test]
    async fn missing_files_produce_sentinel_without_network() {
        // No endpoint configured and no readable photos: the sentinel comes
        // back before any call could be attempted
        let client = VisionClient::new(VisionConfig::default());
        let paths = vec!["/nonexistent/a.jpg".to_string(), "/nonexistent/b.jpg".to_string()];
        let result = client.analyze_photos(&paths, "damage", "incident").await;
        assert_eq!(result, VisionClient::no_images_result());
    }

    #[tokio::test]
    async fn unconfigured_endpoint_synthesizes_from_real_photos() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbImage::new(64, 64).save(&path).unwrap();

        let client = VisionClient::new(VisionConfig::default());
        let paths = vec![path.to_string_lossy().to_string()];
        let damage = "d".repeat(200);
        let result = client.analyze_photos(&paths, &damage, "").await;

        // 200/500 + 1*0.1 = 0.5
        assert!((result.consistency_score - 0.5).abs() < 1e-9);
        assert!(result.analysis.contains("1 photos"));
    }

    #[tokio::test]
    async fn undecodable_photo_yields_error_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let client = VisionClient::new(VisionConfig::default());
        let paths = vec![path.to_string_lossy().to_string()];
        let result = client.analyze_photos(&paths, "", "").await;

        assert!(result.analysis.starts_with("Error during photo analysis"));
        assert_eq!(result.consistency_score, 0.0);
        assert_eq!(result.damage_assessment, "Analysis failed due to technical error");
    }
}
