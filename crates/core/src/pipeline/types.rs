use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// Error type for pipeline operations.
///
/// Per-speaker failures never surface here; they are converted into the
/// `Errored` outcome so one speaker cannot abort the batch. These errors
/// cover unrecoverable input problems only.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Terminal state of a single speaker's processing. States are mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeakerOutcome {
    /// Classified and an email was generated
    EmailGenerated,
    /// Classified as Competitor; the generator was never invoked
    SkippedCompetitor,
    /// Classified without generation (no generation capability configured)
    ClassifiedOnly,
    /// Processing failed; sentinel content recorded
    Errored,
}

/// Aggregate statistics for a pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    /// Count per category label ("Unknown" for unclassified)
    pub category_counts: HashMap<String, usize>,
    pub emails_generated: usize,
    pub competitors_excluded: usize,
    pub errored: usize,
}
