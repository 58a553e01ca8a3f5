//! Chat-completion client module
//! Issues the single POST request that generates learning content for a topic
//! and hands the response text to the parser.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::models::LearningContent;
use crate::services::parser;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// System prompt dictating the three-marker response template.
const SYSTEM_PROMPT: &str = "\
Format response EXACTLY like this:

[SUMMARY]
{Concise 200-word summary}

[QUIZ]
1. {Question 1}?
Correct Answer: {Correct answer}
Wrong Answers: {Wrong 1} | {Wrong 2} | {Wrong 3}

2. {Question 2}?
Correct Answer: {Correct answer}
Wrong Answers: {Wrong 1} | {Wrong 2} | {Wrong 3}

3. {Question 3}?
Correct Answer: {Correct answer}
Wrong Answers: {Wrong 1} | {Wrong 2} | {Wrong 3}

[PREDICTED]
1. {Predicted question 1}
2. {Predicted question 2}
3. {Predicted question 3}";

/// Client configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl OpenAiConfig {
    /// Build a configuration with the API key taken from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Chat-completion response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Explicitly constructed chat-completion client.
///
/// Callers build one and pass it around; there is no process-wide instance,
/// so tests can substitute a client pointed at a local endpoint.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Fetch and parse learning content for a topic.
    ///
    /// One POST, no retries. Transport failures, non-success statuses and
    /// responses without choices surface as errors; the parse itself never
    /// fails.
    pub async fn fetch_learning_content(&self, topic: &str) -> Result<LearningContent> {
        let raw = self.fetch_raw(topic).await?;
        Ok(parser::parse(&raw))
    }

    /// Same as [`fetch_learning_content`](Self::fetch_learning_content), but
    /// abandoned as soon as the cancel token fires.
    pub async fn fetch_learning_content_with_cancel(
        &self,
        topic: &str,
        mut cancel: oneshot::Receiver<()>,
    ) -> Result<LearningContent> {
        tokio::select! {
            result = self.fetch_learning_content(topic) => result,
            _ = &mut cancel => bail!("learning content request cancelled"),
        }
    }

    /// Fetch the raw response text for a topic.
    pub async fn fetch_raw(&self, topic: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(topic),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        log::debug!("requesting learning content for topic: {}", topic);

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("chat completion endpoint returned {}", status);
            bail!("chat completion endpoint returned {}: {}", status, body);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to decode chat completion response")?;

        extract_content(completion)
    }
}

/// Build the system/user message pair for a topic.
fn build_messages(topic: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: format!("Topic: {}", topic),
        },
    ]
}

/// Take the first choice's message content.
fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .context("chat completion response contained no choices")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages() {
        let messages = build_messages("Graphs");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("[SUMMARY]"));
        assert!(messages[0].content.contains("[QUIZ]"));
        assert!(messages[0].content.contains("[PREDICTED]"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Topic: Graphs");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: DEFAULT_MODEL,
            messages: build_messages("Graphs"),
            temperature: 0.7,
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][1]["content"], "Topic: Graphs");
    }

    #[test]
    fn test_extract_content_takes_first_choice() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_content(completion).unwrap(), "first");
    }

    #[test]
    fn test_extract_content_fails_without_choices() {
        let completion: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();

        assert!(extract_content(completion).is_err());
    }

    #[tokio::test]
    async fn test_cancel_token_abandons_in_flight_request() {
        // A listener that accepts but never responds keeps the request
        // permanently in flight.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut sockets = Vec::new();
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    sockets.push(socket);
                }
            }
        });

        let config = OpenAiConfig {
            api_key: "test-key".to_string(),
            endpoint: format!("http://{}/v1/chat/completions", addr),
            ..OpenAiConfig::default()
        };
        let client = OpenAiClient::new(config).unwrap();

        let (cancel_tx, cancel_rx) = oneshot::channel();
        cancel_tx.send(()).unwrap();

        let err = client
            .fetch_learning_content_with_cancel("Graphs", cancel_rx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_default_config() {
        let config = OpenAiConfig::default();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1000);
    }
}
