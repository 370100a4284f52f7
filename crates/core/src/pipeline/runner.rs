//! The per-speaker workflow with batched concurrency.
//!
//! Speakers are processed in fixed-size batches: within a batch the
//! classification + generation futures run concurrently, batches run
//! strictly sequentially with a pause in between to stay under provider
//! rate limits. Per-speaker failures become an `Errored` outcome and never
//! abort siblings.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::classifier::{CompanyCategory, CompanyClassifier};
use crate::config::ProcessingConfig;
use crate::email::{EmailGenerator, EmailRequest};
use crate::speaker::Speaker;

use super::table::{read_speakers, write_speakers};
use super::types::{PipelineError, RunSummary, SpeakerOutcome};

/// Sentinel content for speakers excluded as competitors.
const NOT_APPLICABLE_COMPETITOR: &str = "N/A - Competitor";
/// Sentinel content for speakers whose processing failed.
const ERROR_SUBJECT: &str = "Error generating email";
const ERROR_BODY: &str = "Error generating email content";

/// Orchestrates the full classify-and-generate run over a speaker list.
pub struct SpeakerPipeline {
    classifier: Arc<CompanyClassifier>,
    generator: Arc<EmailGenerator>,
    config: ProcessingConfig,
}

impl SpeakerPipeline {
    pub fn new(
        classifier: Arc<CompanyClassifier>,
        generator: Arc<EmailGenerator>,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            classifier,
            generator,
            config,
        }
    }

    /// Read a speaker CSV, process it, and write the result table.
    ///
    /// Raises only on unrecoverable input errors (missing file, missing
    /// required columns); per-speaker failures are isolated.
    pub async fn process_file(
        &self,
        input: &Path,
        output: &Path,
        limit: Option<usize>,
    ) -> Result<RunSummary, PipelineError> {
        let speakers = read_speakers(input)?;
        let (processed, summary) = self.process(speakers, limit).await;
        write_speakers(output, &processed)?;
        Ok(summary)
    }

    /// Process a speaker list: limit, batch, classify, generate, summarize.
    ///
    /// Output order preserves input order: `join_all` yields results in
    /// future order and batches run sequentially, so ordering is
    /// deterministic.
    pub async fn process(
        &self,
        mut speakers: Vec<Speaker>,
        limit: Option<usize>,
    ) -> (Vec<Speaker>, RunSummary) {
        let limit = limit.unwrap_or(self.config.max_speakers);
        if speakers.len() > limit {
            warn!(
                limit = limit,
                total = speakers.len(),
                dropped = speakers.len() - limit,
                "Limiting processing to configured maximum"
            );
            speakers.truncate(limit);
        }

        let email_enabled = self.generator.is_configured();
        if !email_enabled {
            warn!("No generation capability configured, running classification only");
        }

        let batch_size = self.config.batch_size.max(1);
        let batch_count = speakers.len().div_ceil(batch_size);
        let mut processed: Vec<(Speaker, SpeakerOutcome)> = Vec::with_capacity(speakers.len());

        let batches: Vec<Vec<Speaker>> = speakers
            .chunks(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        for (index, batch) in batches.into_iter().enumerate() {
            info!(
                batch = index + 1,
                of = batch_count,
                size = batch.len(),
                "Processing batch"
            );

            let futures: Vec<_> = batch
                .into_iter()
                .map(|speaker| self.process_single(speaker, email_enabled))
                .collect();
            processed.extend(join_all(futures).await);

            // Throttle between batches, not after the last one
            if index + 1 < batch_count {
                tokio::time::sleep(Duration::from_secs(self.config.batch_pause_secs)).await;
            }
        }

        let summary = summarize(&processed);
        log_summary(&summary);

        let speakers = processed.into_iter().map(|(s, _)| s).collect();
        (speakers, summary)
    }

    /// Process one speaker to a terminal state. Never fails: any error is
    /// converted into the `Errored` outcome with sentinel content.
    async fn process_single(
        &self,
        mut speaker: Speaker,
        email_enabled: bool,
    ) -> (Speaker, SpeakerOutcome) {
        let category = self.classifier.classify(&speaker.company).await;
        speaker.company_category = Some(category);

        // Competitors never receive outreach; the generator is not invoked.
        if category == CompanyCategory::Competitor {
            speaker.email_subject = Some(NOT_APPLICABLE_COMPETITOR.to_string());
            speaker.email_body = Some(NOT_APPLICABLE_COMPETITOR.to_string());
            return (speaker, SpeakerOutcome::SkippedCompetitor);
        }

        if !email_enabled {
            return (speaker, SpeakerOutcome::ClassifiedOnly);
        }

        let request = EmailRequest {
            speaker_name: speaker.name.clone(),
            speaker_title: speaker.title.clone(),
            company_name: speaker.company.clone(),
            category,
            extra_instructions: None,
        };

        match self.generator.generate(&request).await {
            Ok(content) => {
                speaker.email_subject = Some(content.subject);
                speaker.email_body = Some(content.body);
                (speaker, SpeakerOutcome::EmailGenerated)
            }
            Err(e) => {
                error!(speaker = %speaker.name, error = %e, "Speaker processing failed");
                speaker.email_subject = Some(ERROR_SUBJECT.to_string());
                speaker.email_body = Some(ERROR_BODY.to_string());
                (speaker, SpeakerOutcome::Errored)
            }
        }
    }
}

fn summarize(processed: &[(Speaker, SpeakerOutcome)]) -> RunSummary {
    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut emails_generated = 0;
    let mut competitors_excluded = 0;
    let mut errored = 0;

    for (speaker, outcome) in processed {
        let label = speaker
            .company_category
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        *category_counts.entry(label).or_insert(0) += 1;

        match outcome {
            SpeakerOutcome::EmailGenerated => emails_generated += 1,
            SpeakerOutcome::SkippedCompetitor => competitors_excluded += 1,
            SpeakerOutcome::Errored => errored += 1,
            SpeakerOutcome::ClassifiedOnly => {}
        }
    }

    RunSummary {
        total: processed.len(),
        category_counts,
        emails_generated,
        competitors_excluded,
        errored,
    }
}

fn log_summary(summary: &RunSummary) {
    info!(total = summary.total, "Processing summary");
    for (category, count) in &summary.category_counts {
        info!(category = %category, count = count, "Category breakdown");
    }
    info!(
        emails_generated = summary.emails_generated,
        competitors_excluded = summary.competitors_excluded,
        errored = summary.errored,
        "Run complete"
    );
}
