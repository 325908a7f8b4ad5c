//! Chat-completion client and the insight service built on top of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::prompt::{self, ReportKind};
use crate::snapshot::{ProductSnapshot, UsageSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Insight adapter errors — all of them terminal for the current action.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("language-model service unreachable: {0}")]
    Unavailable(String),

    #[error("language-model service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed language-model response: {0}")]
    MalformedResponse(String),
}

/// A fully-formatted prompt: one system message, one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

/// Seam for the language model so insight flows can be driven without the
/// network.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, InsightError>;
}

#[async_trait]
impl<M> ChatModel for Arc<M>
where
    M: ChatModel + ?Sized,
{
    async fn complete(&self, request: ChatRequest) -> Result<String, InsightError> {
        (**self).complete(request).await
    }
}

/// Prompt building + model invocation for the two insight flows.
///
/// The model's text comes back unmodified.
pub struct InsightService<M> {
    model: M,
}

impl<M: ChatModel> InsightService<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn ask(
        &self,
        question: &str,
        snapshot: &[ProductSnapshot],
    ) -> Result<String, InsightError> {
        self.model
            .complete(prompt::question_request(question, snapshot))
            .await
    }

    pub async fn report(
        &self,
        kind: ReportKind,
        snapshot: &[ProductSnapshot],
        history: &[UsageSnapshot],
    ) -> Result<String, InsightError> {
        self.model
            .complete(prompt::report_request(kind, snapshot, history))
            .await
    }
}

// ---- wire schema -----------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn first_choice(response: CompletionResponse) -> Result<String, InsightError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| InsightError::MalformedResponse("response carried no choices".to_string()))
}

// ---- HTTP client -----------------------------------------------------------

/// Chat-completion client authenticated with a bearer API key.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, InsightError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| InsightError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, InsightError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(model = %self.model, "requesting chat completion");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InsightError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;

        first_choice(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_extracts_message_content() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "two widgets left"}}]}"#,
        )
        .unwrap();

        assert_eq!(first_choice(response).unwrap(), "two widgets left");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            first_choice(response),
            Err(InsightError::MalformedResponse(_))
        ));
    }

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, request: ChatRequest) -> Result<String, InsightError> {
            Ok(request.user)
        }
    }

    #[tokio::test]
    async fn service_threads_snapshot_into_prompt() {
        let service = InsightService::new(EchoModel);
        let snapshot = vec![ProductSnapshot {
            name: "Widget".to_string(),
            category: "grocery".to_string(),
            quantity: 5,
            unit_cost_cents: 0,
        }];

        let answer = service.ask("how many widgets?", &snapshot).await.unwrap();
        assert!(answer.contains("- Widget: 5 units"));
        assert!(answer.contains("how many widgets?"));
    }
}
