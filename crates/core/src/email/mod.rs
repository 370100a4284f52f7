//! Personalized outreach email generation.

mod generator;
mod types;

pub use generator::EmailGenerator;
pub use types::{EmailContent, EmailError, EmailRequest};
