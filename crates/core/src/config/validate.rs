use super::{
    types::{Config, LlmProvider},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Processing batch size and speaker limit are at least 1
/// - The openai provider has an API key (generation paths require it)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Processing validation
    if config.processing.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "processing.batch_size must be at least 1".to_string(),
        ));
    }
    if config.processing.max_speakers == 0 {
        return Err(ConfigError::ValidationError(
            "processing.max_speakers must be at least 1".to_string(),
        ));
    }

    // LLM validation: a configured openai provider without a key would fail
    // on every call, so reject it at startup instead.
    if let Some(llm) = &config.llm {
        if llm.provider == LlmProvider::OpenAi && llm.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.api_key is required when llm.provider is \"openai\"".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, LlmConfig, ServerConfig};

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse().unwrap(),
                port: 0,
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_batch_size_zero_fails() {
        let config = load_config_from_str(
            r#"
[processing]
batch_size = 0
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_openai_without_key_fails() {
        let config = Config {
            llm: Some(LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: String::new(),
                model: "gpt-4o".to_string(),
                research_model: "gpt-4o-mini".to_string(),
                api_base: None,
                timeout_secs: 30,
            }),
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("api_key"));
    }

    #[test]
    fn test_validate_ollama_without_key_is_ok() {
        let config = Config {
            llm: Some(LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: String::new(),
                model: "llama3".to_string(),
                research_model: "llama3".to_string(),
                api_base: None,
                timeout_secs: 30,
            }),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
