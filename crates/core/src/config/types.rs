use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Available LLM providers
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

/// LLM service configuration.
///
/// When this section is absent the application runs in classification-only
/// mode: the classifier degrades every company to `Other` (cache hits still
/// resolve) and no emails are generated.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// API key (required for the openai provider)
    #[serde(default)]
    pub api_key: String,
    /// Model used for classification and email generation
    #[serde(default = "default_model")]
    pub model: String,
    /// Cheaper model used for the company research step
    #[serde(default = "default_research_model")]
    pub research_model: String,
    /// Override the provider's API base URL
    #[serde(default)]
    pub api_base: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_research_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Classification cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("company_classifications.json")
}

/// Outreach sender identity, interpolated into prompts and fallback emails
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SenderConfig {
    #[serde(default = "default_sender_name")]
    pub name: String,
    #[serde(default = "default_sender_title")]
    pub title: String,
    /// The company sending the outreach; classification categories are
    /// defined relative to this company's business.
    #[serde(default = "default_sender_company")]
    pub company: String,
    /// Booth number referenced in the email call to action
    #[serde(default = "default_booth")]
    pub booth: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            name: default_sender_name(),
            title: default_sender_title(),
            company: default_sender_company(),
            booth: default_booth(),
        }
    }
}

fn default_sender_name() -> String {
    "Outreach Team".to_string()
}

fn default_sender_title() -> String {
    "Field Marketing".to_string()
}

fn default_sender_company() -> String {
    "Skylens Mapping".to_string()
}

fn default_booth() -> String {
    "42".to_string()
}

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// Speakers classified/generated concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches, throttling against rate limits
    #[serde(default = "default_batch_pause")]
    pub batch_pause_secs: u64,
    /// Default processing limit when a request doesn't specify one
    #[serde(default = "default_max_speakers")]
    pub max_speakers: usize,
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_secs: default_batch_pause(),
            max_speakers: default_max_speakers(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_pause() -> u64 {
    1
}

fn default_max_speakers() -> usize {
    10
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("in")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
    pub cache: CacheConfig,
    pub sender: SenderConfig,
    pub processing: ProcessingConfig,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub api_key_configured: bool,
    pub model: String,
    pub research_model: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            llm: config.llm.as_ref().map(|l| SanitizedLlmConfig {
                provider: match l.provider {
                    LlmProvider::OpenAi => "openai".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                api_key_configured: !l.api_key.is_empty(),
                model: l.model.clone(),
                research_model: l.research_model.clone(),
                timeout_secs: l.timeout_secs,
            }),
            cache: config.cache.clone(),
            sender: config.sender.clone(),
            processing: config.processing.clone(),
        }
    }
}
