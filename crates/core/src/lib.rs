pub mod classifier;
pub mod config;
pub mod email;
pub mod llm;
pub mod pipeline;
pub mod scrape;
pub mod speaker;
pub mod testing;

pub use classifier::{
    ClassificationCache, ClassifierConfig, ClassifierVerdict, CompanyCategory, CompanyClassifier,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LlmConfig,
    LlmProvider, ProcessingConfig, SanitizedConfig, SenderConfig,
};
pub use email::{EmailContent, EmailError, EmailGenerator, EmailRequest};
pub use llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage, OllamaClient,
    OpenAiClient,
};
pub use pipeline::{
    read_speakers, write_speakers, PipelineError, RunSummary, SpeakerOutcome, SpeakerPipeline,
};
pub use scrape::{ScrapeError, SpeakerScraper};
pub use speaker::Speaker;
