use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const ENV_CONFIG_PATH: &str = "CLAIM_INTEL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_VISION_GENERATE_URL: &str = "CLAIM_INTEL_VISION_GENERATE_URL";
const ENV_VISION_CHAT_URL: &str = "CLAIM_INTEL_VISION_CHAT_URL";
const ENV_VISION_API_KEY: &str = "CLAIM_INTEL_VISION_API_KEY";
const ENV_VISION_MODEL: &str = "CLAIM_INTEL_VISION_MODEL";
const ENV_DISCREPANCY_BASE_URL: &str = "CLAIM_INTEL_DISCREPANCY_BASE_URL";
const ENV_DISCREPANCY_API_KEY: &str = "CLAIM_INTEL_DISCREPANCY_API_KEY";
const ENV_DISCREPANCY_MODEL: &str = "CLAIM_INTEL_DISCREPANCY_MODEL";
const ENV_HTTP_TIMEOUT_SECS: &str = "CLAIM_INTEL_HTTP_TIMEOUT_SECS";

const DEFAULT_VISION_MODEL: &str = "qwen2.5vl:7b";
const DEFAULT_DISCREPANCY_MODEL: &str = "Qwen3-14B";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Vision endpoint settings
///
/// Two wire shapes are supported; the one that is configured decides which
/// is used, with the generate endpoint taking precedence.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Ollama-style "generate with inline images" endpoint
    pub generate_url: Option<Url>,
    /// Chat-completions endpoint accepting data-URI image attachments
    pub chat_url: Option<Url>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// The wire shape selected by the vision configuration
#[derive(Debug, Clone)]
pub enum VisionEndpoint {
    Generate(Url),
    Chat(Url),
}

impl VisionConfig {
    /// Endpoint to call, or `None` when neither is configured (mock mode)
    pub fn endpoint(&self) -> Option<VisionEndpoint> {
        if let Some(url) = &self.generate_url {
            return Some(VisionEndpoint::Generate(url.clone()));
        }
        self.chat_url.clone().map(VisionEndpoint::Chat)
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            generate_url: None,
            chat_url: None,
            api_key: None,
            model: DEFAULT_VISION_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Discrepancy endpoint settings (chat-completions compatible)
#[derive(Debug, Clone)]
pub struct DiscrepancyConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended
    pub base_url: Option<Url>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for DiscrepancyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: DEFAULT_DISCREPANCY_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    vision: VisionSection,
    #[serde(default)]
    discrepancy: DiscrepancySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VisionSection {
    generate_url: Option<Url>,
    chat_url: Option<Url>,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DiscrepancySection {
    base_url: Option<Url>,
    api_key: Option<String>,
    model: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub vision: VisionConfig,
    pub discrepancy: DiscrepancyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            vision: VisionConfig::default(),
            discrepancy: DiscrepancyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    ///
    /// Environment variables override values from the YAML file.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let timeout = Duration::from_secs(
            std::env::var(ENV_HTTP_TIMEOUT_SECS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let vision = VisionConfig {
            generate_url: env_url(ENV_VISION_GENERATE_URL).or(file.vision.generate_url),
            chat_url: env_url(ENV_VISION_CHAT_URL).or(file.vision.chat_url),
            api_key: std::env::var(ENV_VISION_API_KEY).ok().or(file.vision.api_key),
            model: std::env::var(ENV_VISION_MODEL)
                .ok()
                .or(file.vision.model)
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            timeout,
        };

        let discrepancy = DiscrepancyConfig {
            base_url: env_url(ENV_DISCREPANCY_BASE_URL).or(file.discrepancy.base_url),
            api_key: std::env::var(ENV_DISCREPANCY_API_KEY)
                .ok()
                .or(file.discrepancy.api_key),
            model: std::env::var(ENV_DISCREPANCY_MODEL)
                .ok()
                .or(file.discrepancy.model)
                .unwrap_or_else(|| DEFAULT_DISCREPANCY_MODEL.to_string()),
            timeout,
        };

        Self {
            host,
            port,
            vision,
            discrepancy,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_url(var: &str) -> Option<Url> {
    let raw = std::env::var(var).ok()?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(var = %var, error = %e, "Ignoring unparsable URL in environment");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_endpoint_takes_precedence() {
        let config = VisionConfig {
            generate_url: Some(Url::parse("http://localhost:11434/api/generate").unwrap()),
            chat_url: Some(Url::parse("http://localhost:9000/v1/chat/completions").unwrap()),
            ..VisionConfig::default()
        };
        match config.endpoint() {
            Some(VisionEndpoint::Generate(url)) => {
                assert_eq!(url.port(), Some(11434));
            }
            other => panic!("expected generate endpoint, got {:?}", other),
        }
    }

    #[test]
    fn no_endpoints_means_mock_mode() {
        assert!(VisionConfig::default().endpoint().is_none());
    }
}
