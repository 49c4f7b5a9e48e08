//! Conversation history storage
//!
//! Owns the per-user ordered turn logs. Storage is unbounded for the
//! process lifetime; only the read-time context window bounds what is
//! fed to the model. Eviction is a deliberate non-feature here.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::ConversationTurn;

/// Number of trailing turns supplied as model context.
pub const CONTEXT_WINDOW: usize = 10;

/// In-memory store of per-user conversation histories.
///
/// One logical instance is shared across all request tasks. All methods
/// take the internal lock only for the duration of the map access; callers
/// never hold it across a provider call. A completed exchange is appended
/// via [`ConversationStore::append_exchange`] under a single write-lock
/// acquisition so concurrent requests for the same user cannot interleave
/// a query/answer pair.
pub struct ConversationStore {
    histories: Arc<RwLock<HashMap<String, Vec<ConversationTurn>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            histories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append one turn to a user's history, creating it if absent.
    pub async fn append(&self, user_id: &str, turn: ConversationTurn) {
        let mut histories = self.histories.write().await;
        histories.entry(user_id.to_string()).or_default().push(turn);
    }

    /// Append a completed query/answer pair atomically.
    pub async fn append_exchange(
        &self,
        user_id: &str,
        user_turn: ConversationTurn,
        assistant_turn: ConversationTurn,
    ) {
        let mut histories = self.histories.write().await;
        let history = histories.entry(user_id.to_string()).or_default();
        history.push(user_turn);
        history.push(assistant_turn);
    }

    /// Insert a turn at the front of a user's history, ahead of any prior
    /// messages. Used to seed synthesized profile context.
    pub async fn prepend_system_note(&self, user_id: &str, turn: ConversationTurn) {
        let mut histories = self.histories.write().await;
        histories
            .entry(user_id.to_string())
            .or_default()
            .insert(0, turn);
    }

    /// Last `window` turns for a user, in original order. Empty for an
    /// unknown user.
    pub async fn recent_context(&self, user_id: &str, window: usize) -> Vec<ConversationTurn> {
        let histories = self.histories.read().await;
        match histories.get(user_id) {
            Some(history) => {
                let start = history.len().saturating_sub(window);
                history[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Complete history for a user, oldest first. Empty for an unknown user.
    pub async fn all_turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        let histories = self.histories.read().await;
        histories.get(user_id).cloned().unwrap_or_default()
    }

    /// Number of users with at least one stored turn.
    pub async fn user_count(&self) -> usize {
        self.histories.read().await.len()
    }

    /// Number of stored turns for a user (0 if unknown).
    pub async fn turn_count(&self, user_id: &str) -> usize {
        let histories = self.histories.read().await;
        histories.get(user_id).map(Vec::len).unwrap_or(0)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
