use serde::{Deserialize, Serialize};

/// Business-relationship category of a company relative to the sender.
///
/// The enumeration is closed: every company resolves to exactly one member,
/// with `Other` as the default for anything unclassifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyCategory {
    Builder,
    Owner,
    Partner,
    Competitor,
    Other,
}

impl CompanyCategory {
    pub const ALL: [CompanyCategory; 5] = [
        CompanyCategory::Builder,
        CompanyCategory::Owner,
        CompanyCategory::Partner,
        CompanyCategory::Competitor,
        CompanyCategory::Other,
    ];

    /// Human-readable label used in output tables and the cache file.
    pub fn label(&self) -> &'static str {
        match self {
            CompanyCategory::Builder => "Builder",
            CompanyCategory::Owner => "Owner",
            CompanyCategory::Partner => "Partner",
            CompanyCategory::Competitor => "Competitor",
            CompanyCategory::Other => "Other",
        }
    }

    /// Parse a category token case-insensitively ("BUILDER", "builder" and
    /// "Builder" are all accepted). Unrecognized tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "BUILDER" => Some(CompanyCategory::Builder),
            "OWNER" => Some(CompanyCategory::Owner),
            "PARTNER" => Some(CompanyCategory::Partner),
            "COMPETITOR" => Some(CompanyCategory::Competitor),
            "OTHER" => Some(CompanyCategory::Other),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompanyCategory::Builder => {
                "Construction, engineering, or building services companies that build things"
            }
            CompanyCategory::Owner => {
                "Property owners, real estate companies, or asset managers that get things built"
            }
            CompanyCategory::Partner => "Potential technology partners or service providers",
            CompanyCategory::Competitor => {
                "Companies in the drone, mapping, or surveying space (competitors)"
            }
            CompanyCategory::Other => "Companies that don't clearly fit into the main categories",
        }
    }
}

impl std::fmt::Display for CompanyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured verdict returned by the classification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    /// One of the five category tokens
    pub category: String,
    /// Model confidence in [0, 1]
    #[serde(default)]
    pub confidence: f32,
    /// Brief explanation for the classification
    #[serde(default)]
    pub reasoning: String,
}

impl ClassifierVerdict {
    /// Resolve the token to a category, defaulting to `Other` for anything
    /// the model invented outside the taxonomy.
    pub fn resolved_category(&self) -> CompanyCategory {
        CompanyCategory::from_token(&self.category).unwrap_or(CompanyCategory::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_case_insensitive() {
        assert_eq!(
            CompanyCategory::from_token("BUILDER"),
            Some(CompanyCategory::Builder)
        );
        assert_eq!(
            CompanyCategory::from_token("builder"),
            Some(CompanyCategory::Builder)
        );
        assert_eq!(
            CompanyCategory::from_token(" Competitor "),
            Some(CompanyCategory::Competitor)
        );
    }

    #[test]
    fn test_from_token_unknown() {
        assert_eq!(CompanyCategory::from_token("VENDOR"), None);
        assert_eq!(CompanyCategory::from_token(""), None);
    }

    #[test]
    fn test_label_round_trips() {
        for category in CompanyCategory::ALL {
            assert_eq!(CompanyCategory::from_token(category.label()), Some(category));
        }
    }

    #[test]
    fn test_verdict_resolves_unknown_to_other() {
        let verdict = ClassifierVerdict {
            category: "UNICORN".to_string(),
            confidence: 0.9,
            reasoning: String::new(),
        };
        assert_eq!(verdict.resolved_category(), CompanyCategory::Other);
    }

    #[test]
    fn test_verdict_deserializes_with_missing_fields() {
        let verdict: ClassifierVerdict =
            serde_json::from_str(r#"{"category": "PARTNER"}"#).unwrap();
        assert_eq!(verdict.resolved_category(), CompanyCategory::Partner);
        assert_eq!(verdict.confidence, 0.0);
    }
}
