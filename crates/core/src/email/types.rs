use serde::{Deserialize, Serialize};

use crate::classifier::CompanyCategory;

/// Error type for email generation.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// No generation capability configured (missing credential). This is a
    /// hard failure for the caller: the orchestrator decides at a higher
    /// level whether to run in classification-only mode.
    #[error("Email generation not configured (no LLM client)")]
    NotConfigured,
}

/// Request for email generation. Pure value, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub speaker_name: String,
    pub speaker_title: String,
    pub company_name: String,
    pub category: CompanyCategory,
    /// Optional free-text steering instructions appended to both prompts
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

/// Generated email content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}
