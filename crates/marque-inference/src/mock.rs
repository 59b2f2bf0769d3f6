//! Mock generation backend for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use marque_core::{Error, GenerationBackend, Result};

/// Scripted [`GenerationBackend`] that replays canned responses and records
/// every prompt it receives.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next generation call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    /// Queue a failure for the next generation call.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Inference(message.into())));
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Inference("mock backend has no scripted response".into())))
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate(&format!("{system}\n{prompt}")).await
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
