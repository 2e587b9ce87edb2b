//! Test double for [`super::AgentClient`].

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{AgentClient, AgentResponse};
use crate::error::DispatchError;
use crate::retry::{RetrySink, RetrySource};

pub struct MockAgent {
    response: String,
    tool_calls: serde_json::Value,
    fail_with: Option<DispatchErrorKind>,
    rate_limited_retries: u32,
}

#[derive(Clone, Copy)]
enum DispatchErrorKind {
    RateLimited,
    Timeout,
}

impl MockAgent {
    pub fn with_response(response: impl Into<String>, tool_calls: serde_json::Value) -> Self {
        Self {
            response: response.into(),
            tool_calls,
            fail_with: None,
            rate_limited_retries: 0,
        }
    }

    pub fn rate_limited() -> Self {
        Self {
            response: String::new(),
            tool_calls: serde_json::Value::Array(vec![]),
            fail_with: Some(DispatchErrorKind::RateLimited),
            rate_limited_retries: 0,
        }
    }

    pub fn timing_out() -> Self {
        Self {
            response: String::new(),
            tool_calls: serde_json::Value::Array(vec![]),
            fail_with: Some(DispatchErrorKind::Timeout),
            rate_limited_retries: 0,
        }
    }

    /// Simulates `retries` 429 responses before succeeding with
    /// `response`, recording a retry event for each one — the fixture
    /// behind testable scenario S3 ("agent returns 429 twice then 200").
    pub fn rate_limited_then_success(retries: u32, response: impl Into<String>, tool_calls: serde_json::Value) -> Self {
        Self {
            response: response.into(),
            tool_calls,
            fail_with: None,
            rate_limited_retries: retries,
        }
    }
}

#[async_trait]
impl AgentClient for MockAgent {
    async fn dispatch(
        &self,
        _endpoint_url: &str,
        _input: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        retry_sink: &RetrySink,
    ) -> Result<AgentResponse, DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        if self.rate_limited_retries > 0 {
            for attempt in 1..=self.rate_limited_retries {
                retry_sink.record(attempt, 0.01, RetrySource::Agent);
            }
        }
        match self.fail_with {
            Some(DispatchErrorKind::RateLimited) => Err(DispatchError::RateLimited),
            Some(DispatchErrorKind::Timeout) => Err(DispatchError::Timeout(timeout)),
            None => Ok(AgentResponse {
                response: self.response.clone(),
                tool_calls: self.tool_calls.clone(),
                call_duration: Duration::from_millis(1),
                tokens_in: 0,
                tokens_out: 0,
                cost_usd: 0.0,
                model: None,
            }),
        }
    }
}
