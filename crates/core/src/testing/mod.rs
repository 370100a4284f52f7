//! Testing utilities and mock implementations.
//!
//! Provides a mock LLM client so the classifier, generator and pipeline can
//! be exercised end-to-end without a real provider.

mod mock_llm;

pub use mock_llm::MockLlmClient;
