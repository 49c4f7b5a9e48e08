//! Groq API client for chat completions
//!
//! Provides the LLM collaborator boundary for query handling and
//! profile generation. Uses a long-lived reqwest::Client for
//! connection pooling.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::error::AgentError;
use crate::models::{ConversationTurn, Role};

const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// One message in provider wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self::new(turn.role, turn.content.clone())
    }
}

/// External LLM collaborator boundary.
///
/// `messages` carries the full ordered request (single-shot callers pass
/// just a system + user pair, chat callers include history). A per-request
/// credential override is a call parameter, never a reason to rebuild the
/// client.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        api_key_override: Option<&str>,
    ) -> crate::Result<String>;
}

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
            base_url: GROQ_CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        api_key_override: Option<&str>,
    ) -> crate::Result<String> {
        let api_key = api_key_override.unwrap_or(&self.api_key);

        if api_key.is_empty() {
            return Err(AgentError::ProviderAuth(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
        };

        info!("Calling Groq API ({} messages)", messages.len());

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                AgentError::ProviderTransport(format!("Groq API error: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API auth failure ({}): {}", status, error_text);
            return Err(AgentError::ProviderAuth(format!(
                "Groq API rejected credentials ({}): {}",
                status, error_text
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API error response ({}): {}", status, error_text);
            return Err(AgentError::ProviderTransport(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            AgentError::MalformedResponse(format!("Groq parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AgentError::MalformedResponse("No choices in Groq response".to_string())
            })?;

        info!("Groq response received ({} chars)", answer.len());

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::AgentError;
    use std::sync::Mutex;

    /// Scripted provider for tests: returns canned answers or failures in
    /// order, and records the message lists it was called with.
    pub(crate) struct MockProvider {
        replies: Mutex<Vec<crate::Result<String>>>,
        pub(crate) calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockProvider {
        pub(crate) fn new(replies: Vec<crate::Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn answering(answer: &str) -> Self {
            Self::new(vec![Ok(answer.to_string())])
        }

        pub(crate) fn failing() -> Self {
            Self::new(vec![Err(AgentError::ProviderTransport(
                "connection refused".to_string(),
            ))])
        }
    }

    #[async_trait]
    impl ChatProvider for MockProvider {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _api_key_override: Option<&str>,
        ) -> crate::Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Ok("ok".to_string())
            } else {
                replies.remove(0)
            }
        }
    }
}
