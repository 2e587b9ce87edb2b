//! LLM transport for the judge (spec §4.3). Mirrors the teacher's
//! `ChatOpenAI`: a thin wrapper around `async_openai::Client` with retry on
//! rate limiting, behind a small trait so [`super::mock::MockJudge`] can
//! stand in for tests.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::error::JudgeError;
use crate::retry::{RetryPolicy, RetrySink, RetrySource};

/// A judge chat-completion's assistant text plus the token usage the
/// provider reported, so the caller can emit a `CostRecord`
/// (`call_type=judge_llm`, spec §4.3) without re-parsing the transport
/// response.
#[derive(Clone, Debug)]
pub struct JudgeCompletion {
    pub content: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// A chat-completion call that returns raw assistant text. Separate from
/// [`crate::dispatcher::AgentClient`] because the judge always talks
/// OpenAI-compatible chat completions, while the agent under test may
/// expose any HTTP contract.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, retry_sink: &RetrySink) -> Result<JudgeCompletion, JudgeError>;

    /// Model label attached to the `CostRecord`s this client produces.
    fn model_label(&self) -> &str {
        "judge"
    }
}

pub struct LlmJudge {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl LlmJudge {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        let config = OpenAIConfig::new().with_api_base(base_url.into()).with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
            retry,
        }
    }

    fn is_rate_limited(err: &async_openai::error::OpenAIError) -> bool {
        let text = err.to_string().to_lowercase();
        text.contains("rate limit") || text.contains("429") || text.contains("too many requests")
    }
}

#[async_trait]
impl JudgeClient for LlmJudge {
    async fn complete(&self, system_prompt: &str, user_prompt: &str, retry_sink: &RetrySink) -> Result<JudgeCompletion, JudgeError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(system_prompt)),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(user_prompt)),
        ];

        let mut attempt = 0u32;
        loop {
            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(self.model.clone());
            args.messages(messages.clone());
            let request = args.build()?;

            debug!(model = %self.model, attempt, "judge chat completion request");
            match self.client.chat().create(request).await {
                Ok(response) => {
                    let usage = response.usage.clone();
                    let content = response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .unwrap_or_default();
                    trace!(content = %content, "judge chat completion response");
                    return Ok(JudgeCompletion {
                        content,
                        tokens_in: usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
                        tokens_out: usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0),
                    });
                }
                Err(err) if Self::is_rate_limited(&err) && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay(attempt);
                    warn!(attempt, delay_secs = delay.as_secs_f64(), "judge rate limited, retrying");
                    retry_sink.record(attempt + 1, delay.as_secs_f64(), RetrySource::Judge);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if Self::is_rate_limited(&err) => return Err(JudgeError::RateLimited),
                Err(err) => return Err(JudgeError::Transport(err)),
            }
        }
    }

    fn model_label(&self) -> &str {
        &self.model
    }
}
