//! The speaker record flowing through the pipeline.

use serde::{Deserialize, Serialize};

use crate::classifier::CompanyCategory;

/// A conference speaker to be classified and possibly emailed.
///
/// Constructed by the table reader or the scraper; the classifier sets
/// `company_category` exactly once, the generator sets subject/body at most
/// once (or the pipeline fills in sentinel values for excluded categories).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Speaker {
    pub name: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub company_category: Option<CompanyCategory>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
}

impl Speaker {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            company: company.into(),
            company_category: None,
            email_subject: None,
            email_body: None,
        }
    }

    /// Identity tuple for deduplication: (name, title, company), trimmed and
    /// case-folded. Two rows differing only in case or surrounding whitespace
    /// are the same speaker.
    pub fn identity_key(&self) -> (String, String, String) {
        (
            self.name.trim().to_lowercase(),
            self.title.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
        )
    }
}

/// Drop duplicate speakers by identity tuple, keeping the first occurrence.
/// Returns the deduplicated list and the number of rows removed.
pub fn deduplicate_speakers(speakers: Vec<Speaker>) -> (Vec<Speaker>, usize) {
    let mut seen = std::collections::HashSet::new();
    let total = speakers.len();
    let unique: Vec<Speaker> = speakers
        .into_iter()
        .filter(|s| seen.insert(s.identity_key()))
        .collect();
    let removed = total - unique.len();
    (unique, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_normalizes() {
        let a = Speaker::new("Ada Lovelace", "Engineer", "Analytical Engines");
        let b = Speaker::new(" ada lovelace ", "ENGINEER", "analytical engines ");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let speakers = vec![
            Speaker::new("A", "T", "C"),
            Speaker::new("a", " t ", "c"),
            Speaker::new("B", "T2", "C2"),
        ];
        let (unique, removed) = deduplicate_speakers(speakers);
        assert_eq!(unique.len(), 2);
        assert_eq!(removed, 1);
        // First spelling wins
        assert_eq!(unique[0].name, "A");
        assert_eq!(unique[1].name, "B");
    }

    #[test]
    fn test_dedup_empty_input() {
        let (unique, removed) = deduplicate_speakers(Vec::new());
        assert!(unique.is_empty());
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_dedup_distinct_titles_are_distinct_speakers() {
        let speakers = vec![
            Speaker::new("A", "CTO", "C"),
            Speaker::new("A", "CEO", "C"),
        ];
        let (unique, removed) = deduplicate_speakers(speakers);
        assert_eq!(unique.len(), 2);
        assert_eq!(removed, 0);
    }
}
