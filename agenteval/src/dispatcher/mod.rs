//! Dispatches a test case's input to the agent under test over HTTP
//! (spec §4.2 "AgentDispatcher").
//!
//! 429 responses are retried with backoff via [`crate::retry::RetryPolicy`];
//! every other transport failure (timeout, connection refused, non-2xx,
//! undecodable body) is single-shot — it is recorded on the test case
//! result, not retried, matching the teacher's tool-call HTTP helpers
//! (`tools::exa::exa_search_request`) which surface a typed error rather
//! than looping.

mod mock;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::retry::{RetryPolicy, RetrySink, RetrySource};

pub use mock::MockAgent;

/// What the agent returned for one test case: its free-text response plus
/// whatever tool calls it reports making, passed through to the judge and
/// to tool-level assertion checking untouched. `tokens_in`/`tokens_out`/
/// `cost_usd`/`model` mirror the optional `metadata` block of spec §4.2's
/// wire format and feed a `CostRecord` when the agent reports them.
#[derive(Clone, Debug)]
pub struct AgentResponse {
    pub response: String,
    pub tool_calls: serde_json::Value,
    pub call_duration: Duration,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub cost_usd: f64,
    pub model: Option<String>,
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn dispatch(
        &self,
        endpoint_url: &str,
        input: &str,
        timeout: Duration,
        cancel: &tokio_util::sync::CancellationToken,
        retry_sink: &RetrySink,
    ) -> Result<AgentResponse, DispatchError>;
}

pub struct HttpAgentClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpAgentClient {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }

    async fn post_once(&self, endpoint_url: &str, input: &str, timeout: Duration) -> Result<AgentResponse, DispatchError> {
        let started = Instant::now();
        let response = self
            .client
            .post(endpoint_url)
            .timeout(timeout)
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await
            .map_err(|e| if e.is_timeout() { DispatchError::Timeout(timeout) } else { DispatchError::Transport(e) })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DispatchError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Decode(format!("agent returned {status}: {body}")));
        }

        let body: serde_json::Value = response.json().await.map_err(DispatchError::Transport)?;
        let text = body
            .get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| DispatchError::Decode("agent response missing `response` field".to_string()))?;
        let tool_calls = body.get("tool_calls").cloned().unwrap_or(serde_json::Value::Array(vec![]));
        let metadata = body.get("metadata");
        let tokens_in = metadata.and_then(|m| m.get("tokens_in")).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let tokens_out = metadata.and_then(|m| m.get("tokens_out")).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let cost_usd = metadata.and_then(|m| m.get("cost_usd")).and_then(|v| v.as_f64()).unwrap_or(0.0);
        let model = metadata.and_then(|m| m.get("model")).and_then(|v| v.as_str()).map(str::to_string);

        Ok(AgentResponse {
            response: text,
            tool_calls,
            call_duration: started.elapsed(),
            tokens_in,
            tokens_out,
            cost_usd,
            model,
        })
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn dispatch(
        &self,
        endpoint_url: &str,
        input: &str,
        timeout: Duration,
        cancel: &tokio_util::sync::CancellationToken,
        retry_sink: &RetrySink,
    ) -> Result<AgentResponse, DispatchError> {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }
            debug!(endpoint_url, attempt, "dispatching test case to agent");
            match self.post_once(endpoint_url, input, timeout).await {
                Ok(resp) => return Ok(resp),
                Err(DispatchError::RateLimited) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay(attempt);
                    warn!(attempt, delay_secs = delay.as_secs_f64(), "agent rate limited, retrying");
                    retry_sink.record(attempt + 1, delay.as_secs_f64(), RetrySource::Agent);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
                    }
                    attempt += 1;
                }
                Err(DispatchError::RateLimited) => return Err(DispatchError::RateLimited),
                Err(other) => return Err(other),
            }
        }
    }
}
