//! Synthetic customer profile generation
//!
//! Asks the LLM for a plausible customer record as JSON and seeds it
//! into the user's conversation history as leading system context.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::llm::{ChatMessage, ChatProvider};
use crate::memory::ConversationStore;
use crate::models::{ConversationTurn, Role};

const GENERATOR_PROMPT: &str = "You are a data generation tool. Return ONLY the JSON object.";

/// Generates customer records via the LLM and seeds them as prior
/// conversation context.
pub struct ProfileGenerator {
    store: Arc<ConversationStore>,
    provider: Arc<dyn ChatProvider>,
}

impl ProfileGenerator {
    pub fn new(store: Arc<ConversationStore>, provider: Arc<dyn ChatProvider>) -> Self {
        Self { store, provider }
    }

    /// Synthesize a customer record for a user.
    ///
    /// On success the record is prepended to the user's history as a
    /// system note and returned. A response that is not valid JSON after
    /// fence stripping yields `MalformedResponse`; provider failures pass
    /// through. Nothing is written to the store on any failure.
    pub async fn generate_profile(
        &self,
        user_id: &str,
        api_key_override: Option<&str>,
    ) -> crate::Result<serde_json::Value> {
        info!("Generating synthetic profile for user {}", user_id);

        let today = Utc::now();
        let order_date = (today - Duration::days(10)).format("%B %d, %Y").to_string();
        let expected_delivery = (today + Duration::days(2)).format("%B %d, %Y").to_string();

        let prompt = format!(
            "Generate a detailed JSON customer profile for ID {}. Include:\n\
             - Basic Info (Name, Email)\n\
             - Recent high-end electronics order (Placed: {}, Delivery: {})\n\
             - 2 past orders and 2 previous support interactions.\n\
             Return ONLY valid JSON.",
            user_id, order_date, expected_delivery
        );

        // Single-shot request, no conversation context.
        let messages = vec![
            ChatMessage::new(Role::System, GENERATOR_PROMPT),
            ChatMessage::new(Role::User, prompt),
        ];

        let content = self.provider.complete(&messages, api_key_override).await?;

        let profile: serde_json::Value = serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| {
                warn!("Profile generation returned invalid JSON for user {}: {}", user_id, e);
                AgentError::MalformedResponse(format!("profile is not valid JSON: {}", e))
            })?;

        let note = format!("Customer Profile: {}", profile);
        self.store
            .prepend_system_note(user_id, ConversationTurn::system(note))
            .await;

        Ok(profile)
    }
}

/// Strip optional surrounding markdown code-fence markers.
///
/// Tolerates a leading ```` ```json ```` or bare ```` ``` ```` fence and a
/// trailing ```` ``` ````; input without fences passes through unchanged.
pub fn strip_code_fence(content: &str) -> &str {
    let mut inner = content.trim();

    if let Some(rest) = inner.strip_prefix("```") {
        // Drop an optional language tag up to the first newline.
        inner = match rest.split_once('\n') {
            Some((_tag, body)) => body,
            None => rest.strip_prefix("json").unwrap_or(rest),
        };
        if let Some(body) = inner.trim_end().strip_suffix("```") {
            inner = body;
        }
    }

    inner.trim()
}
