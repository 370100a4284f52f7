//! Company classification engine.
//!
//! Resolution order: cache hit, then a remote research step feeding a remote
//! structured-classification step. Every failure path degrades to `Other`;
//! `classify` never returns an error because an unclassifiable company must
//! not abort the batch.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::llm::{CompletionRequest, LlmClient};

use super::cache::ClassificationCache;
use super::types::{ClassifierVerdict, CompanyCategory};

/// Configuration for the classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Company the categories are defined relative to
    pub sender_company: String,
    /// Optional cheaper model for the research step
    pub research_model: Option<String>,
    /// Maximum tokens for the research response
    pub research_max_tokens: u32,
    /// Maximum tokens for the classification response
    pub classify_max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sender_company: "Skylens Mapping".to_string(),
            research_model: None,
            research_max_tokens: 1024,
            classify_max_tokens: 512,
        }
    }
}

/// Classifies companies into the five-member taxonomy.
///
/// The cache sits behind a mutex because speaker tasks within a batch run
/// concurrently on a multithreaded runtime; the lock is never held across an
/// await, remote calls happen between the lookup and the store.
pub struct CompanyClassifier {
    client: Option<Arc<dyn LlmClient>>,
    cache: Mutex<ClassificationCache>,
    config: ClassifierConfig,
}

impl CompanyClassifier {
    pub fn new(
        client: Option<Arc<dyn LlmClient>>,
        cache: ClassificationCache,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            client,
            cache: Mutex::new(cache),
            config,
        }
    }

    /// Number of cached classifications.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().expect("cache lock poisoned").len()
    }

    /// Classify a company, consulting the cache first. Infallible.
    pub async fn classify(&self, company_name: &str) -> CompanyCategory {
        self.classify_with_verdict(company_name)
            .await
            .resolved_category()
    }

    /// Classify a company and return the full verdict (confidence and
    /// reasoning included) for callers that surface the detail.
    pub async fn classify_with_verdict(&self, company_name: &str) -> ClassifierVerdict {
        // Cache hit short-circuits: no remote calls.
        {
            let cache = self.cache.lock().expect("cache lock poisoned");
            if let Some(category) = cache.lookup(company_name) {
                info!(company = %company_name, category = %category, "Using cached classification");
                return ClassifierVerdict {
                    category: category.label().to_string(),
                    confidence: 1.0,
                    reasoning: "Cached classification".to_string(),
                };
            }
        }

        let Some(client) = &self.client else {
            warn!(
                company = %company_name,
                "No LLM client configured, classifying as Other"
            );
            // An unconfigured verdict is not cached: it would poison the
            // cache for runs that do have a client.
            return ClassifierVerdict {
                category: CompanyCategory::Other.label().to_string(),
                confidence: 0.0,
                reasoning: "LLM client not configured".to_string(),
            };
        };

        let company_info = self.research_company(client.as_ref(), company_name).await;
        let verdict = self
            .classify_with_research(client.as_ref(), company_name, &company_info)
            .await;

        let category = verdict.resolved_category();
        {
            let mut cache = self.cache.lock().expect("cache lock poisoned");
            // Keyed by the original company name; the cache normalizes it.
            cache.store(company_name, category);
        }

        verdict
    }

    /// Research step: free-text context about the company. Failure degrades
    /// to a minimal context string and classification proceeds.
    async fn research_company(&self, client: &dyn LlmClient, company_name: &str) -> String {
        let prompt = format!(
            "Research the company: {company}\n\n\
             Provide details about:\n\
             - What industry they operate in\n\
             - What products or services they offer\n\
             - Their main business activities\n\
             - Their target market or customers\n\
             - Any recent news or developments\n\n\
             Focus on information that would help classify them in relation to \
             {sender} (construction, real estate, technology, aerial mapping).",
            company = company_name,
            sender = self.config.sender_company,
        );

        let mut request =
            CompletionRequest::new(prompt).with_max_tokens(self.config.research_max_tokens);
        if let Some(model) = &self.config.research_model {
            request = request.with_model(model.clone());
        }

        match client.complete(request).await {
            Ok(response) => {
                debug!(company = %company_name, "Research step complete");
                response.text.trim().to_string()
            }
            Err(e) => {
                error!(company = %company_name, error = %e, "Research step failed");
                format!("Limited information available for {}", company_name)
            }
        }
    }

    /// Structured classification step: resolve the company to one of the
    /// five category tokens. Any failure here yields an `Other` verdict.
    async fn classify_with_research(
        &self,
        client: &dyn LlmClient,
        company_name: &str,
        company_info: &str,
    ) -> ClassifierVerdict {
        let system = "You are an expert at classifying companies. Respond with a valid \
                      JSON object containing the category, confidence, and reasoning."
            .to_string();

        let prompt = format!(
            "Classify this company into one of these categories in relation to {sender}:\n\n\
             Company: {company}\n\
             Research Information: {info}\n\n\
             Categories:\n\
             - BUILDER: Construction, engineering, architecture, building services, \
             contractors, project management, BIM, surveying, infrastructure\n\
             - OWNER: Real estate, property management, property developers, asset \
             managers, facility management, landlords, REITs\n\
             - PARTNER: Technology companies, software, SaaS, consulting, services, \
             platforms, APIs, integrations, digital solutions\n\
             - COMPETITOR: Drone companies, aerial mapping, photogrammetry, surveying \
             software, reality capture, 3D scanning, point cloud, lidar\n\
             - OTHER: Everything else that doesn't fit the above categories\n\n\
             Return a JSON object with the following structure:\n\
             {{\n\
               \"category\": \"BUILDER|OWNER|PARTNER|COMPETITOR|OTHER\",\n\
               \"confidence\": 0.95,\n\
               \"reasoning\": \"Brief explanation for the classification\"\n\
             }}",
            sender = self.config.sender_company,
            company = company_name,
            info = company_info,
        );

        let request = CompletionRequest::new(prompt)
            .with_system(system)
            .with_max_tokens(self.config.classify_max_tokens);

        let response = match client.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(company = %company_name, error = %e, "Classification step failed");
                return other_verdict("Classification call failed");
            }
        };

        match parse_verdict(&response.text) {
            Ok(verdict) => {
                info!(
                    company = %company_name,
                    category = %verdict.resolved_category(),
                    confidence = verdict.confidence,
                    "Classified company"
                );
                debug!(reasoning = %verdict.reasoning, "Classification reasoning");
                verdict
            }
            Err(e) => {
                error!(company = %company_name, error = %e, "Unparseable classification response");
                other_verdict("Unparseable classification response")
            }
        }
    }
}

fn other_verdict(reasoning: &str) -> ClassifierVerdict {
    ClassifierVerdict {
        category: CompanyCategory::Other.label().to_string(),
        confidence: 0.0,
        reasoning: reasoning.to_string(),
    }
}

/// Extract the JSON object between the first `{` and last `}`; models often
/// wrap the payload in prose or code fences.
fn parse_verdict(text: &str) -> Result<ClassifierVerdict, String> {
    let json_str = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    };

    serde_json::from_str(json_str).map_err(|e| format!("{}: {}", e, text))
}
