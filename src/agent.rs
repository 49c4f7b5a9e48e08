//! Support agent orchestration
//!
//! Answers a single user query with conversation context via the LLM
//! collaborator, recording the completed exchange back into the store.
//! Provider failures never escape this layer: the caller gets a fixed
//! fallback reply and the store is left untouched.

use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{ChatMessage, ChatProvider};
use crate::memory::{coalesce_for_strict_alternation, ConversationStore, CONTEXT_WINDOW};
use crate::models::{ConversationTurn, Role};

/// Returned to the caller whenever the provider call fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble processing your request. Please try again later.";

/// Fixed persona instruction sent with every query.
const PERSONA_PROMPT: &str = "\
You are an expert customer support AI for TechGadgets.com, a premium online electronics retailer.

Your personality:
- Professional yet warm and friendly
- Patient and empathetic
- Solution-oriented
- Knowledgeable about tech products

Your capabilities:
- Help with order tracking, returns, and product recommendations
- Troubleshoot technical issues
- Answer questions about warranties and shipping
- Remember conversation context to provide personalized help

Guidelines:
- Keep responses concise but complete (2-3 sentences ideal)
- Use a conversational, natural tone
- If you don't have specific information, acknowledge it honestly and offer to help in other ways
- Always end with a helpful follow-up question or offer when appropriate";

/// Orchestrates query handling against the conversation store and the
/// LLM collaborator. Constructed once at startup and shared across
/// request tasks.
pub struct SupportAgent {
    store: Arc<ConversationStore>,
    provider: Arc<dyn ChatProvider>,
    /// Reshape context for providers that reject consecutive same-role
    /// turns. Off for Groq.
    strict_alternation: bool,
}

impl SupportAgent {
    pub fn new(store: Arc<ConversationStore>, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            store,
            provider,
            strict_alternation: false,
        }
    }

    pub fn with_strict_alternation(mut self, strict: bool) -> Self {
        self.strict_alternation = strict;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    /// Answer one query for a user.
    ///
    /// On success the query and answer are appended to the user's history
    /// as one atomic exchange and the answer text is returned. On any
    /// provider failure nothing is appended and [`FALLBACK_REPLY`] is
    /// returned instead.
    pub async fn handle_query(
        &self,
        query: &str,
        user_id: &str,
        api_key_override: Option<&str>,
    ) -> String {
        info!(
            "Handling query for user {}: {:.50}...",
            user_id, query
        );

        let context = self.store.recent_context(user_id, CONTEXT_WINDOW).await;

        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::new(Role::System, PERSONA_PROMPT));
        if self.strict_alternation {
            messages.extend(coalesce_for_strict_alternation(&context));
        } else {
            messages.extend(context.iter().map(ChatMessage::from));
        }
        messages.push(ChatMessage::new(Role::User, query));

        // The provider call is the latency hot spot; no store lock is held
        // while it is in flight.
        match self.provider.complete(&messages, api_key_override).await {
            Ok(answer) => {
                self.store
                    .append_exchange(
                        user_id,
                        ConversationTurn::user(query),
                        ConversationTurn::assistant(answer.clone()),
                    )
                    .await;
                answer
            }
            Err(e) => {
                warn!("Provider call failed for user {}: {}", user_id, e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Full conversation history for a user as "role: content" lines.
    pub async fn user_memories(&self, user_id: &str) -> Vec<String> {
        self.store
            .all_turns(user_id)
            .await
            .iter()
            .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockProvider;

    fn agent_with(provider: MockProvider) -> (SupportAgent, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let store = Arc::new(ConversationStore::new());
        (
            SupportAgent::new(store, provider.clone()),
            provider,
        )
    }

    #[tokio::test]
    async fn test_successful_query_appends_exchange() {
        let (agent, _provider) = agent_with(MockProvider::answering("Your order ships today."));

        let answer = agent.handle_query("Where is my order?", "user-1", None).await;
        assert_eq!(answer, "Your order ships today.");

        let turns = agent.store().all_turns("user-1").await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], ConversationTurn::user("Where is my order?"));
        assert_eq!(
            turns[1],
            ConversationTurn::assistant("Your order ships today.")
        );
    }

    #[tokio::test]
    async fn test_failed_query_leaves_store_unchanged() {
        let (agent, _provider) = agent_with(MockProvider::failing());

        let answer = agent.handle_query("Where is my order?", "user-1", None).await;
        assert_eq!(answer, FALLBACK_REPLY);
        assert!(agent.store().all_turns("user-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_request_shape_persona_context_query() {
        let (agent, provider) = agent_with(MockProvider::new(vec![
            Ok("a1".to_string()),
            Ok("a2".to_string()),
        ]));

        agent.handle_query("q1", "user-1", None).await;
        agent.handle_query("q2", "user-1", None).await;

        let calls = provider.calls.lock().unwrap();
        // Second call: persona + 2 context turns + new query.
        let second = &calls[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].role, "system");
        assert_eq!(second[1].content, "q1");
        assert_eq!(second[2].content, "a1");
        assert_eq!(second[3].content, "q2");
    }

    #[tokio::test]
    async fn test_context_window_caps_request_size() {
        let replies = (0..15).map(|i| Ok(format!("a{}", i))).collect();
        let (agent, provider) = agent_with(MockProvider::new(replies));

        for i in 0..15 {
            agent.handle_query(&format!("q{}", i), "user-1", None).await;
        }

        assert_eq!(agent.store().all_turns("user-1").await.len(), 30);

        let calls = provider.calls.lock().unwrap();
        // Persona + at most CONTEXT_WINDOW turns + current query.
        let last = calls.last().unwrap();
        assert_eq!(last.len(), 1 + CONTEXT_WINDOW + 1);
    }

    #[tokio::test]
    async fn test_strict_alternation_reshapes_context() {
        let provider = Arc::new(MockProvider::answering("merged"));
        let store = Arc::new(ConversationStore::new());
        store
            .prepend_system_note("user-1", ConversationTurn::system("Customer Profile: {}"))
            .await;
        store.append("user-1", ConversationTurn::user("q1")).await;
        store.append("user-1", ConversationTurn::user("q1b")).await;
        store.append("user-1", ConversationTurn::assistant("a1")).await;

        let agent = SupportAgent::new(store, provider.clone()).with_strict_alternation(true);
        agent.handle_query("q2", "user-1", None).await;

        let calls = provider.calls.lock().unwrap();
        let request = &calls[0];
        // Persona, then user (q1 + q1b merged), assistant, new user query.
        assert_eq!(request.len(), 4);
        assert_eq!(request[1].content, "q1\n\nq1b");
        assert_eq!(request[2].content, "a1");
        assert_eq!(request[3].content, "q2");
    }

    #[tokio::test]
    async fn test_user_memories_formatting() {
        let (agent, _provider) = agent_with(MockProvider::answering("hello!"));

        agent.handle_query("hi", "user-1", None).await;

        let memories = agent.user_memories("user-1").await;
        assert_eq!(memories, vec!["user: hi", "assistant: hello!"]);
        assert!(agent.user_memories("nobody").await.is_empty());
    }
}
