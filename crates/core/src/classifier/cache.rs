//! Disk-backed classification cache.
//!
//! Maps normalized company names to category labels so a company is only
//! ever classified remotely once. The backing file is a flat JSON object and
//! is rewritten in full after every new entry (write-through), so a crash
//! loses at most the in-flight entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::types::CompanyCategory;

/// In-memory map plus optional durable backing file.
///
/// Normalization (trim + lowercase) is applied on both lookup and store, so
/// "Acme Corp", "acme corp " and "ACME CORP" share one entry.
#[derive(Debug)]
pub struct ClassificationCache {
    entries: HashMap<String, String>,
    path: Option<PathBuf>,
}

impl ClassificationCache {
    /// Load the cache from `path`. A missing file yields an empty cache; a
    /// malformed file yields an empty cache plus a warning, never an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(entries) => {
                    info!(
                        count = entries.len(),
                        path = %path.display(),
                        "Loaded cached company classifications"
                    );
                    entries
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Malformed classification cache, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "No classification cache file, starting empty");
                HashMap::new()
            }
        };

        Self {
            entries,
            path: Some(path),
        }
    }

    /// Memory-only cache, used by tests and injected setups.
    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            path: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Look up a cached category. A stored label that no longer parses to a
    /// category member is treated as a miss (the cache format may drift from
    /// the code).
    pub fn lookup(&self, company_name: &str) -> Option<CompanyCategory> {
        let key = Self::normalize(company_name);
        let label = self.entries.get(&key)?;
        match CompanyCategory::from_token(label) {
            Some(category) => Some(category),
            None => {
                warn!(
                    company = %company_name,
                    label = %label,
                    "Invalid cached category label, treating as miss"
                );
                None
            }
        }
    }

    /// Insert an entry (last write wins) and rewrite the backing file.
    pub fn store(&mut self, company_name: &str, category: CompanyCategory) {
        self.entries
            .insert(Self::normalize(company_name), category.label().to_string());
        self.persist();
    }

    /// Rewrite the whole backing file. The write goes to a temp file in the
    /// same directory first and is renamed into place, so a concurrent
    /// reader of the cache file never observes a partial state.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = self.write_atomic(path) {
            warn!(path = %path.display(), error = %e, "Failed to persist classification cache");
        } else {
            debug!(
                count = self.entries.len(),
                path = %path.display(),
                "Persisted classification cache"
            );
        }
    }

    fn write_atomic(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lookup_miss_on_empty_cache() {
        let cache = ClassificationCache::in_memory();
        assert!(cache.lookup("Acme").is_none());
    }

    #[test]
    fn test_store_and_lookup() {
        let mut cache = ClassificationCache::in_memory();
        cache.store("Acme Corp", CompanyCategory::Builder);
        assert_eq!(cache.lookup("Acme Corp"), Some(CompanyCategory::Builder));
    }

    #[test]
    fn test_lookup_normalizes_case_and_whitespace() {
        let mut cache = ClassificationCache::in_memory();
        cache.store("Acme Corp", CompanyCategory::Partner);
        assert_eq!(cache.lookup("acme corp "), Some(CompanyCategory::Partner));
        assert_eq!(cache.lookup("ACME CORP"), Some(CompanyCategory::Partner));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_last_write_wins() {
        let mut cache = ClassificationCache::in_memory();
        cache.store("Acme", CompanyCategory::Builder);
        cache.store(" ACME ", CompanyCategory::Owner);
        assert_eq!(cache.lookup("acme"), Some(CompanyCategory::Owner));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let cache = ClassificationCache::load(dir.path().join("nope.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_malformed_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not valid json").unwrap();
        let cache = ClassificationCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_persists_across_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = ClassificationCache::load(&path);
        cache.store("Acme", CompanyCategory::Competitor);

        let reloaded = ClassificationCache::load(&path);
        assert_eq!(reloaded.lookup("acme"), Some(CompanyCategory::Competitor));
    }

    #[test]
    fn test_store_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("cache.json");

        let mut cache = ClassificationCache::load(&path);
        cache.store("Acme", CompanyCategory::Other);
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_stored_label_is_a_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"acme": "Unicorn"}"#).unwrap();

        let cache = ClassificationCache::load(&path);
        assert!(cache.lookup("Acme").is_none());
    }

    #[test]
    fn test_persisted_file_is_valid_json_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = ClassificationCache::load(&path);
        cache.store("Acme", CompanyCategory::Builder);
        cache.store("Globex", CompanyCategory::Partner);

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.get("acme").map(String::as_str), Some("Builder"));
        assert_eq!(parsed.get("globex").map(String::as_str), Some("Partner"));
    }
}
