//! Google Gemini provider over the `generateContent` REST endpoint.

use super::{LlmError, LlmProvider};
use crate::config::{AiConfig, AUTO_MODEL, DEFAULT_MODEL};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

pub struct GeminiProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    /// Configured model; may be `auto`.
    model: String,
    resolved_model: OnceCell<String>,
    timeout_secs: u64,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &AiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cookmatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NotConfigured(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            resolved_model: OnceCell::new(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::RequestFailed(e.without_url().to_string())
        }
    }

    fn map_api_error(status: u16, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorResponse>(body)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| body.to_string());
        if status == 429 {
            LlmError::RateLimited(message)
        } else {
            LlmError::ApiError { status, message }
        }
    }

    /// First listed model that supports `generateContent`.
    async fn discover_model(&self) -> Result<String, LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;
        if status != 200 {
            return Err(Self::map_api_error(status, &body));
        }

        let list: ModelList = serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;
        list.models
            .into_iter()
            .find(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
            .map(|m| m.name.rsplit('/').next().unwrap_or(&m.name).to_string())
            .ok_or_else(|| LlmError::ParseError("No model supports generateContent".to_string()))
    }

    async fn model(&self) -> &str {
        if self.model != AUTO_MODEL {
            return &self.model;
        }
        self.resolved_model
            .get_or_init(|| async {
                match self.discover_model().await {
                    Ok(model) => {
                        info!("🤖 Using discovered Gemini model {}", model);
                        model
                    }
                    Err(e) => {
                        warn!("Model discovery failed ({}), using {}", e, DEFAULT_MODEL);
                        DEFAULT_MODEL.to_string()
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, max_output_tokens: u32) -> Result<String, LlmError> {
        let model = self.model().await;
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens,
                temperature: 0.2,
                candidate_count: 1,
            },
        };

        debug!("Gemini request: model={} prompt_chars={}", model, prompt.len());

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if status != 200 {
            return Err(Self::map_api_error(status, &body));
        }

        let response: GeminiResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::ParseError("No text content in response".to_string()));
        }

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        self.resolved_model.get().map(String::as_str).unwrap_or(self.model.as_str())
    }
}
