use std::sync::Arc;

use outreach_core::{
    CompanyClassifier, Config, EmailGenerator, SanitizedConfig, SpeakerPipeline, SpeakerScraper,
};

/// Shared application state
pub struct AppState {
    config: Config,
    classifier: Arc<CompanyClassifier>,
    generator: Arc<EmailGenerator>,
    pipeline: Arc<SpeakerPipeline>,
    scraper: Arc<SpeakerScraper>,
}

impl AppState {
    pub fn new(
        config: Config,
        classifier: Arc<CompanyClassifier>,
        generator: Arc<EmailGenerator>,
        pipeline: Arc<SpeakerPipeline>,
        scraper: Arc<SpeakerScraper>,
    ) -> Self {
        Self {
            config,
            classifier,
            generator,
            pipeline,
            scraper,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn classifier(&self) -> &CompanyClassifier {
        self.classifier.as_ref()
    }

    pub fn generator(&self) -> &EmailGenerator {
        self.generator.as_ref()
    }

    pub fn pipeline(&self) -> &SpeakerPipeline {
        self.pipeline.as_ref()
    }

    pub fn scraper(&self) -> &SpeakerScraper {
        self.scraper.as_ref()
    }
}
