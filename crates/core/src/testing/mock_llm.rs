//! Mock LLM client for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// A handler that produces a response dynamically based on the request.
type RequestHandler = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// Mock implementation of the [`LlmClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Queue canned responses or errors, consumed in FIFO order
/// - Install a handler for request-dependent responses
/// - Record every request for assertions
///
/// When both a handler and queued responses exist, the queue wins; when
/// neither is configured a call fails with [`LlmError::NotConfigured`].
pub struct MockLlmClient {
    queue: Arc<RwLock<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
    handler: Arc<RwLock<Option<RequestHandler>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(RwLock::new(VecDeque::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a successful response.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.queue.write().await.push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: LlmError) {
        self.queue.write().await.push_back(Err(error));
    }

    /// Install a handler producing responses from the request contents.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// All requests seen so far, in call order.
    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().await.clone()
    }

    /// Number of completion calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.write().await.push(request.clone());

        let queued = self.queue.write().await.pop_front();
        let result = match queued {
            Some(result) => result,
            None => {
                let handler = self.handler.read().await;
                match handler.as_ref() {
                    Some(h) => h(&request),
                    None => Err(LlmError::NotConfigured),
                }
            }
        };

        result.map(|text| CompletionResponse {
            text,
            usage: LlmUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
        })
    }
}
