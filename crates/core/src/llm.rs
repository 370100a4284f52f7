//! LLM client abstraction and implementations.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured")]
    NotConfigured,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
    /// Override the client's default model (e.g. a cheaper research model)
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.0, // Deterministic by default for classification tasks
            model: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Token usage
    pub usage: LlmUsage,
    /// Model used
    pub model: String,
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "openai", "ollama")
    fn provider(&self) -> &str;

    /// Model name (e.g., "gpt-4o")
    fn model(&self) -> &str;

    /// Send a completion request and get a text response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Send a completion request and parse the response as JSON.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        request: CompletionRequest,
    ) -> Result<(T, LlmUsage), LlmError>
    where
        Self: Sized,
    {
        let response = self.complete(request).await?;
        let parsed: T = serde_json::from_str(&response.text)
            .map_err(|e| LlmError::Json(format!("{}: {}", e, response.text)))?;
        Ok((parsed, response.usage))
    }
}

// ============================================================================
// OpenAI Implementation
// ============================================================================

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: "https://api.openai.com".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages = Vec::new();
        if let Some(system) = request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: request.prompt,
        });

        let openai_request = OpenAiRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages,
            max_tokens: request.max_tokens,
            temperature: if request.temperature == 0.0 {
                None // OpenAI defaults to deterministic enough sampling, omit
            } else {
                Some(request.temperature)
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api { status, message });
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;

        let text = openai_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        let usage = openai_response.usage.map(|u| LlmUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(CompletionResponse {
            text,
            usage: usage.unwrap_or_default(),
            model: openai_response.model,
        })
    }
}

// ============================================================================
// Ollama Implementation
// ============================================================================

/// Client for a local Ollama server's `/api/generate` endpoint. Keyless;
/// this is the degraded/offline provider option.
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    api_base: String,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            api_base: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    // Sent unconditionally: Ollama needs an explicit 0.0 for determinism
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = OllamaGenerateRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            prompt: request.prompt,
            system: request.system,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.api_base))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorBody>(&error_text)
                .map(|b| b.error)
                .unwrap_or(error_text);
            return Err(LlmError::Api { status, message });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;

        Ok(CompletionResponse {
            text: parsed.response,
            usage: LlmUsage {
                input_tokens: parsed.prompt_eval_count,
                output_tokens: parsed.eval_count,
            },
            model: parsed.model,
        })
    }
}
