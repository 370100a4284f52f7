//! Speaker extraction from conference websites.
//!
//! Fetches a speaker listing page and extracts name/title/company triples
//! from the speaker grid markup, with company names pulled out of combined
//! "Title at Company" job strings.

use std::path::Path;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::speaker::{deduplicate_speakers, Speaker};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Selectors are compile-time constants with valid CSS; parse cannot fail.
static GRID_ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.speaker-grid-item").unwrap());
static NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static JOB_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p.speaker-job").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
// Tried in priority order so "Head of Digital at Acme" yields "Acme", not
// "Digital at Acme".
static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["at", "with", "from", "of"]
        .iter()
        .map(|word| Regex::new(&format!(r"(?i)\b{word}\s+(.+)$")).unwrap())
        .collect()
});
static CORPORATE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:Ltd|LLC|Inc|Corp|Limited|Corporation|Company|Co)\.?$").unwrap()
});

/// Error type for scraping operations.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Scraper for conference speaker listing pages.
pub struct SpeakerScraper {
    client: reqwest::Client,
}

impl SpeakerScraper {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Fetch a speaker listing page and extract speakers from it.
    pub async fn scrape_url(&self, url: &str) -> Result<Vec<Speaker>, ScrapeError> {
        info!(url = %url, "Fetching speaker listing");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "Fetch failed");
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        Ok(self.extract_speakers(&html))
    }

    /// Extract speakers from a local HTML file.
    pub fn scrape_html_file(&self, path: &Path) -> Result<Vec<Speaker>, ScrapeError> {
        info!(path = %path.display(), "Reading HTML file");
        let html = std::fs::read_to_string(path)?;
        Ok(self.extract_speakers(&html))
    }

    /// Extract speaker triples from raw HTML.
    pub fn extract_speakers(&self, html: &str) -> Vec<Speaker> {
        let document = Html::parse_document(html);
        let items: Vec<_> = document.select(&GRID_ITEM_SELECTOR).collect();
        info!(count = items.len(), "Found speaker grid items");

        let mut speakers = Vec::new();
        for item in items {
            let Some(name_elem) = item.select(&NAME_SELECTOR).next() else {
                continue;
            };
            let name = clean_text(&name_elem.text().collect::<String>());

            let Some(job_elem) = item.select(&JOB_SELECTOR).next() else {
                continue;
            };
            let job_title = clean_text(&job_elem.text().collect::<String>());

            if name.is_empty() || job_title.is_empty() {
                warn!(name = %name, "Skipping speaker with empty name or job");
                continue;
            }

            let company = extract_company_from_title(&job_title);
            speakers.push(Speaker::new(name, job_title, company));
        }

        let (unique, removed) = deduplicate_speakers(speakers);
        if removed > 0 {
            info!(removed = removed, "Removed duplicate speakers");
        }
        info!(count = unique.len(), "Extracted unique speakers");
        unique
    }

    /// Encode speakers as a `name,title,company` CSV for later upload into
    /// the pipeline. All fields are quoted.
    pub fn to_csv(&self, speakers: &[Speaker]) -> Result<Vec<u8>, ScrapeError> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new());
        writer.write_record(["name", "title", "company"])?;
        for speaker in speakers {
            writer.write_record([&speaker.name, &speaker.title, &speaker.company])?;
        }
        writer
            .into_inner()
            .map_err(|e| ScrapeError::Io(e.into_error()))
    }

    /// Write the speaker CSV to disk.
    pub fn save_csv(&self, speakers: &[Speaker], path: &Path) -> Result<(), ScrapeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_csv(speakers)?)?;
        info!(count = speakers.len(), path = %path.display(), "Saved speakers CSV");
        Ok(())
    }
}

impl Default for SpeakerScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the company name out of a combined job string such as
/// "Digital Lead at Laing O'Rourke". Falls back to separator splitting,
/// then to the whole cleaned title.
fn extract_company_from_title(job_title: &str) -> String {
    for pattern in COMPANY_PATTERNS.iter() {
        if let Some(company) = pattern.captures(job_title).and_then(|c| c.get(1)) {
            return clean_company_name(company.as_str());
        }
    }

    for separator in [" at ", " with ", " from ", " of ", " - ", " | "] {
        if let Some((_, company)) = job_title.split_once(separator) {
            return clean_company_name(company);
        }
    }

    clean_company_name(job_title)
}

/// Collapse whitespace and decode the entities that survive extraction.
fn clean_text(text: &str) -> String {
    let text = text.replace("&amp;", "&").replace("&nbsp;", " ");
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Trim corporate suffixes (Ltd, Inc, ...) off a company name.
fn clean_company_name(company: &str) -> String {
    let cleaned = clean_text(company);
    CORPORATE_SUFFIX_RE
        .replace(&cleaned, "")
        .trim()
        .to_string()
}
