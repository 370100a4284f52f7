//! Company classification: category taxonomy, durable cache, and the
//! research + structured-classification engine.

mod cache;
mod engine;
mod types;

pub use cache::ClassificationCache;
pub use engine::{ClassifierConfig, CompanyClassifier};
pub use types::{ClassifierVerdict, CompanyCategory};
