//! The batch orchestrator: table input/output and the per-speaker
//! classification + generation workflow with bounded concurrency.

mod runner;
mod table;
mod types;

pub use runner::SpeakerPipeline;
pub use table::{read_speakers, write_speakers};
pub use types::{PipelineError, RunSummary, SpeakerOutcome};
