//! Shared test helpers for agent and orchestrator tests.

use minion_core::error::ProviderError;
use minion_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted results.
///
/// Each call to `complete` returns the next result in the queue and
/// records the request. Panics if more calls are made than results provided.
pub struct SequentialMockProvider {
    results: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    /// Script successes and failures in call order.
    pub fn scripted(results: Vec<Result<CompletionResponse, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("SequentialMockProvider: no more responses (call #{call})"))
    }
}

/// Create a simple text response with 10 + 5 tokens of usage.
pub fn make_text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        output_text: text.into(),
        usage: Some(Usage::new(10, 5)),
        model: "mock-model".into(),
    }
}
