//! Core domain types for conversations and analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a conversation turn's speaker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a user's conversation history.
///
/// Immutable once created; histories only ever grow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One completed query/response exchange, logged for analytics.
///
/// Appended to a global ordered log; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub interaction_id: Uuid,
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub response_time_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub query_length: usize,
    pub response_length: usize,
}

impl InteractionRecord {
    pub fn new(
        user_id: impl Into<String>,
        query: impl Into<String>,
        response: impl Into<String>,
        response_time_secs: f64,
    ) -> Self {
        let query = query.into();
        let response = response.into();

        Self {
            interaction_id: Uuid::new_v4(),
            user_id: user_id.into(),
            query_length: query.len(),
            response_length: response.len(),
            query,
            response,
            response_time_secs,
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate view over the full interaction log.
///
/// All-zero when no interactions have been logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub total_interactions: usize,
    pub unique_users: usize,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub avg_query_length: f64,
    pub avg_response_length: f64,
}

/// Per-user analytics view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStatsView {
    pub user_id: String,
    pub total_queries: u64,
    pub avg_response_time: f64,
    /// Last 5 query texts, oldest first.
    pub recent_queries: Vec<String>,
}

/// Entry in the most-active-users ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopUser {
    pub user_id: String,
    pub total_queries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn test_interaction_record_lengths() {
        let record = InteractionRecord::new("user-1", "where is my order?", "On its way.", 0.42);
        assert_eq!(record.query_length, 18);
        assert_eq!(record.response_length, 11);
        assert_eq!(record.user_id, "user-1");
    }
}
