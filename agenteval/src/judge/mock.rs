//! Test double for [`super::client::JudgeClient`], the direct analogue of
//! the teacher's `MockLlm`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::JudgeError;
use crate::retry::RetrySink;
use super::client::{JudgeClient, JudgeCompletion};

/// Returns a fixed response (or cycles through a scripted list), recording
/// every `(system_prompt, user_prompt)` pair it was called with so tests
/// can assert on what the grading code actually sent.
pub struct MockJudge {
    responses: Vec<String>,
    call_count: AtomicUsize,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockJudge {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            responses: vec![response.into()],
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JudgeClient for MockJudge {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, _retry_sink: &RetrySink) -> Result<JudgeCompletion, JudgeError> {
        self.calls.lock().unwrap().push((system_prompt.to_string(), user_prompt.to_string()));
        let i = self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.get(i).or_else(|| self.responses.last()).cloned().unwrap_or_default();
        Ok(JudgeCompletion {
            content: response,
            tokens_in: 12,
            tokens_out: 8,
        })
    }

    fn model_label(&self) -> &str {
        "mock-judge"
    }
}
