mod api;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outreach_core::{
    load_config, validate_config, ClassificationCache, ClassifierConfig, CompanyClassifier,
    EmailGenerator, LlmClient, LlmConfig, LlmProvider, OllamaClient, OpenAiClient, SpeakerPipeline,
    SpeakerScraper,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("OUTREACH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Cache path: {:?}", config.cache.path);
    info!("Sender company: {}", config.sender.company);

    // Create LLM client if configured
    let llm_client: Option<Arc<dyn LlmClient>> = match &config.llm {
        Some(llm_config) => {
            info!(
                "Initializing {:?} LLM client (model: {})",
                llm_config.provider, llm_config.model
            );
            Some(build_llm_client(llm_config))
        }
        None => {
            info!("No LLM configured, running in classification-only degraded mode");
            None
        }
    };

    // Load durable classification cache
    let cache = ClassificationCache::load(&config.cache.path);
    info!("Classification cache loaded ({} entries)", cache.len());

    // Create classifier
    let classifier_config = ClassifierConfig {
        sender_company: config.sender.company.clone(),
        research_model: config.llm.as_ref().map(|l| l.research_model.clone()),
        ..ClassifierConfig::default()
    };
    let classifier = Arc::new(CompanyClassifier::new(
        llm_client.clone(),
        cache,
        classifier_config,
    ));

    // Create email generator
    let generator = Arc::new(EmailGenerator::new(llm_client, config.sender.clone()));
    if !generator.is_configured() {
        info!("Email generation disabled (no LLM client)");
    }

    // Create batch pipeline
    let pipeline = Arc::new(SpeakerPipeline::new(
        Arc::clone(&classifier),
        Arc::clone(&generator),
        config.processing.clone(),
    ));

    // Create scraper
    let scraper = Arc::new(SpeakerScraper::new());

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        classifier,
        generator,
        pipeline,
        scraper,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

fn build_llm_client(config: &LlmConfig) -> Arc<dyn LlmClient> {
    let timeout = Duration::from_secs(config.timeout_secs as u64);
    match config.provider {
        LlmProvider::OpenAi => {
            let mut client =
                OpenAiClient::new(&config.api_key, &config.model).with_timeout(timeout);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Arc::new(client)
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Arc::new(client)
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
