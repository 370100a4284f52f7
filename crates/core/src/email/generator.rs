//! Email generation against the configured LLM, with deterministic
//! fallbacks so a transient provider failure never aborts a speaker.

use std::sync::Arc;

use tracing::{debug, error};

use crate::classifier::CompanyCategory;
use crate::config::SenderConfig;
use crate::llm::{CompletionRequest, LlmClient};

use super::types::{EmailContent, EmailError, EmailRequest};

const SUBJECT_MAX_TOKENS: u32 = 50;
const BODY_MAX_TOKENS: u32 = 300;
const GENERATION_TEMPERATURE: f32 = 0.7;

/// Generates a subject line and body for a speaker outreach email.
///
/// The two completions are independent and issued concurrently; either
/// call's failure degrades to a templated fallback for that part only.
pub struct EmailGenerator {
    client: Option<Arc<dyn LlmClient>>,
    sender: SenderConfig,
}

impl EmailGenerator {
    pub fn new(client: Option<Arc<dyn LlmClient>>, sender: SenderConfig) -> Self {
        Self { client, sender }
    }

    /// Whether a generation capability is available. The pipeline uses this
    /// to decide between full processing and classification-only mode.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generate email content for a speaker.
    ///
    /// Returns [`EmailError::NotConfigured`] when no LLM client is present;
    /// all other failures degrade to the deterministic fallback.
    pub async fn generate(&self, request: &EmailRequest) -> Result<EmailContent, EmailError> {
        let client = self.client.as_ref().ok_or(EmailError::NotConfigured)?;

        let subject_prompt = self.build_subject_prompt(request);
        let body_prompt = self.build_body_prompt(request);

        // Independent calls, overlapped latencies.
        let (subject, body) = tokio::join!(
            self.generate_subject(client.as_ref(), request, subject_prompt),
            self.generate_body(client.as_ref(), request, body_prompt),
        );

        Ok(EmailContent { subject, body })
    }

    async fn generate_subject(
        &self,
        client: &dyn LlmClient,
        request: &EmailRequest,
        prompt: String,
    ) -> String {
        let completion = CompletionRequest::new(prompt)
            .with_system(
                "You are an expert at writing engaging email subject lines for B2B \
                 outreach. Keep subjects under 60 characters and make them compelling.",
            )
            .with_max_tokens(SUBJECT_MAX_TOKENS)
            .with_temperature(GENERATION_TEMPERATURE);

        match client.complete(completion).await {
            Ok(response) => {
                debug!(speaker = %request.speaker_name, "Generated email subject");
                response.text.trim().trim_matches('"').to_string()
            }
            Err(e) => {
                error!(speaker = %request.speaker_name, error = %e, "Subject generation failed, using fallback");
                self.fallback_email(request).subject
            }
        }
    }

    async fn generate_body(
        &self,
        client: &dyn LlmClient,
        request: &EmailRequest,
        prompt: String,
    ) -> String {
        let system = format!(
            "You are a professional B2B sales representative for {}. Write concise, \
             personalized emails that are relevant to the recipient's role and company type.",
            self.sender.company
        );

        let completion = CompletionRequest::new(prompt)
            .with_system(system)
            .with_max_tokens(BODY_MAX_TOKENS)
            .with_temperature(GENERATION_TEMPERATURE);

        match client.complete(completion).await {
            Ok(response) => {
                debug!(speaker = %request.speaker_name, "Generated email body");
                response.text.trim().to_string()
            }
            Err(e) => {
                error!(speaker = %request.speaker_name, error = %e, "Body generation failed, using fallback");
                self.fallback_email(request).body
            }
        }
    }

    fn build_subject_prompt(&self, request: &EmailRequest) -> String {
        let mut prompt = format!(
            "Generate an engaging email subject line for a conference speaker outreach email.\n\n\
             Speaker: {name}\n\
             Title: {title}\n\
             Company: {company}\n\
             Company Category: {category}\n\n\
             Context: {context}\n\n\
             The email is inviting them to visit {sender}'s booth #{booth} at the \
             conference for a demo and free gift.\n\n\
             Requirements:\n\
             - Keep under 60 characters\n\
             - Be specific to their role/company type\n\
             - Include a compelling hook\n\
             - Professional but friendly tone",
            name = request.speaker_name,
            title = request.speaker_title,
            company = request.company_name,
            category = request.category,
            context = self.category_context(request.category),
            sender = self.sender.company,
            booth = self.sender.booth,
        );
        self.append_extra_instructions(&mut prompt, request);
        prompt
    }

    fn build_body_prompt(&self, request: &EmailRequest) -> String {
        let mut prompt = format!(
            "Write a personalized email body for a conference speaker outreach.\n\n\
             Speaker: {name}\n\
             Title: {title}\n\
             Company: {company}\n\
             Company Category: {category}\n\n\
             Context: {context}\n\n\
             Email Purpose: Invite them to visit {sender}'s booth #{booth} for a demo \
             and free gift.\n\n\
             Requirements:\n\
             - 3-4 sentences maximum\n\
             - DO NOT include a subject line in the body\n\
             - Reference their specific role/title\n\
             - IMPORTANT: Explain {sender}'s relevance to their business\n\
             - Professional but conversational tone\n\
             - Include booth number (#{booth}) and mention free gift\n\
             - End with a clear call to action\n\
             - Use the sender name: {sender_name}\n\
             - Use the sender title: {sender_title}\n\
             - Format as a proper email with greeting, body, and signature",
            name = request.speaker_name,
            title = request.speaker_title,
            company = request.company_name,
            category = request.category,
            context = self.category_context(request.category),
            sender = self.sender.company,
            booth = self.sender.booth,
            sender_name = self.sender.name,
            sender_title = self.sender.title,
        );
        self.append_extra_instructions(&mut prompt, request);
        prompt
    }

    fn append_extra_instructions(&self, prompt: &mut String, request: &EmailRequest) {
        if let Some(instructions) = &request.extra_instructions {
            prompt.push_str("\n\nADDITIONAL INSTRUCTIONS:\n");
            prompt.push_str(instructions);
        }
    }

    /// Category-specific framing biasing tone/content toward the
    /// recipient's business relationship to the sender.
    fn category_context(&self, category: CompanyCategory) -> String {
        let sender = &self.sender.company;
        match category {
            CompanyCategory::Builder => format!(
                "This company is in construction, engineering, or building services. They \
                 build things and would benefit from {sender}'s construction progress \
                 tracking, site surveying, and project management capabilities."
            ),
            CompanyCategory::Owner => format!(
                "This company owns or manages properties/real estate. They get things built \
                 for them and would benefit from {sender}'s project oversight, progress \
                 monitoring, and asset management features."
            ),
            CompanyCategory::Partner => format!(
                "This company could be a potential technology partner or service provider. \
                 They might benefit from {sender}'s API, integration capabilities, or \
                 partnership opportunities."
            ),
            CompanyCategory::Competitor => format!(
                "This company is in the drone, mapping, or surveying space. They are \
                 competitors of {sender} and should not receive outreach emails."
            ),
            CompanyCategory::Other => format!(
                "This company doesn't clearly fit into the main categories. Focus on \
                 general business benefits of {sender}."
            ),
        }
    }

    /// Deterministic fallback content templated from the request fields.
    fn fallback_email(&self, request: &EmailRequest) -> EmailContent {
        if request.category == CompanyCategory::Competitor {
            return EmailContent {
                subject: "Conference Connection".to_string(),
                body: format!(
                    "Hi {}, looking forward to connecting at the conference!",
                    request.speaker_name
                ),
            };
        }

        EmailContent {
            subject: format!("{} Demo at Booth #{}", self.sender.company, self.sender.booth),
            body: format!(
                "Hi {name},\n\n\
                 I'd love to show you how {sender} can help {company} with aerial mapping \
                 and site documentation. Stop by booth #{booth} for a demo and free gift!\n\n\
                 Best regards,\n\
                 {sender_name}\n\
                 {sender_title}\n\
                 {sender}",
                name = request.speaker_name,
                sender = self.sender.company,
                company = request.company_name,
                booth = self.sender.booth,
                sender_name = self.sender.name,
                sender_title = self.sender.title,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::testing::MockLlmClient;

    fn sender() -> SenderConfig {
        SenderConfig {
            name: "Jordan".to_string(),
            title: "Outreach Lead".to_string(),
            company: "Skylens Mapping".to_string(),
            booth: "42".to_string(),
        }
    }

    fn request(category: CompanyCategory) -> EmailRequest {
        EmailRequest {
            speaker_name: "Ada Lovelace".to_string(),
            speaker_title: "Head of Digital".to_string(),
            company_name: "Acme Construction".to_string(),
            category,
            extra_instructions: None,
        }
    }

    #[tokio::test]
    async fn test_generate_uses_both_completions() {
        let client = Arc::new(MockLlmClient::new());
        client
            .set_handler(|req| {
                if req.prompt.contains("engaging email subject line") {
                    Ok("\"See Acme's sites from above\"".to_string())
                } else {
                    Ok("Hi Ada, stop by booth #42!".to_string())
                }
            })
            .await;

        let generator =
            EmailGenerator::new(Some(Arc::clone(&client) as Arc<dyn LlmClient>), sender());
        let content = generator
            .generate(&request(CompanyCategory::Builder))
            .await
            .unwrap();

        // Surrounding quotes stripped from the subject
        assert_eq!(content.subject, "See Acme's sites from above");
        assert_eq!(content.body, "Hi Ada, stop by booth #42!");
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_not_configured_is_a_hard_error() {
        let generator = EmailGenerator::new(None, sender());
        let result = generator.generate(&request(CompanyCategory::Builder)).await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_subject_failure_falls_back_body_survives() {
        let client = Arc::new(MockLlmClient::new());
        client
            .set_handler(|req| {
                if req.prompt.contains("engaging email subject line") {
                    Err(LlmError::Http("timeout".to_string()))
                } else {
                    Ok("Generated body".to_string())
                }
            })
            .await;

        let generator = EmailGenerator::new(Some(client as Arc<dyn LlmClient>), sender());
        let content = generator
            .generate(&request(CompanyCategory::Owner))
            .await
            .unwrap();

        assert_eq!(content.subject, "Skylens Mapping Demo at Booth #42");
        assert_eq!(content.body, "Generated body");
    }

    #[tokio::test]
    async fn test_both_failures_fall_back_deterministically() {
        let client = Arc::new(MockLlmClient::new());
        client
            .set_handler(|_| Err(LlmError::Http("down".to_string())))
            .await;

        let generator = EmailGenerator::new(Some(client as Arc<dyn LlmClient>), sender());
        let content = generator
            .generate(&request(CompanyCategory::Partner))
            .await
            .unwrap();

        assert!(content.subject.contains("Booth #42"));
        assert!(content.body.contains("Acme Construction"));
        assert!(content.body.contains("Jordan"));
    }

    #[tokio::test]
    async fn test_prompts_carry_category_framing_and_sender() {
        let client = Arc::new(MockLlmClient::new());
        client.set_handler(|_| Ok("x".to_string())).await;

        let generator =
            EmailGenerator::new(Some(Arc::clone(&client) as Arc<dyn LlmClient>), sender());
        generator
            .generate(&request(CompanyCategory::Owner))
            .await
            .unwrap();

        let requests = client.recorded_requests().await;
        assert_eq!(requests.len(), 2);
        for req in &requests {
            assert!(req.prompt.contains("owns or manages properties"));
            assert!(req.prompt.contains("Skylens Mapping"));
            assert!(req.prompt.contains("booth #42") || req.prompt.contains("#42"));
        }
    }

    #[tokio::test]
    async fn test_extra_instructions_appended_to_both_prompts() {
        let client = Arc::new(MockLlmClient::new());
        client.set_handler(|_| Ok("x".to_string())).await;

        let generator =
            EmailGenerator::new(Some(Arc::clone(&client) as Arc<dyn LlmClient>), sender());
        let mut req = request(CompanyCategory::Builder);
        req.extra_instructions = Some("Mention the rooftop reception".to_string());
        generator.generate(&req).await.unwrap();

        for recorded in client.recorded_requests().await {
            assert!(recorded.prompt.contains("ADDITIONAL INSTRUCTIONS"));
            assert!(recorded.prompt.contains("rooftop reception"));
        }
    }

    #[test]
    fn test_fallback_competitor_has_neutral_content() {
        let generator = EmailGenerator::new(None, sender());
        let content = generator.fallback_email(&request(CompanyCategory::Competitor));
        assert_eq!(content.subject, "Conference Connection");
        assert!(!content.body.contains("booth"));
    }
}
