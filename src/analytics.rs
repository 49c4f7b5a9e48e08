//! Interaction analytics
//!
//! Records every completed query/response exchange and serves aggregate,
//! per-user, recent and top-N views. All state is in-memory behind a
//! single RwLock so log appends and stat reads stay consistent under
//! concurrent request tasks.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{InteractionRecord, SummaryStats, TopUser, UserStatsView};

/// How many of a user's query texts the per-user view returns.
const RECENT_QUERIES_WINDOW: usize = 5;

/// Per-user running totals. Counts only ever increase; the full query
/// list is retained and sliced at read time.
#[derive(Debug, Default)]
struct UserActivity {
    total_queries: u64,
    total_response_time: f64,
    queries: Vec<String>,
}

#[derive(Default)]
struct TrackerState {
    interactions: Vec<InteractionRecord>,
    users: HashMap<String, UserActivity>,
    /// user_ids in order of first appearance; keeps top-user ties stable.
    user_order: Vec<String>,
}

/// Tracks and analyzes agent interactions.
pub struct AnalyticsTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl AnalyticsTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TrackerState::default())),
        }
    }

    /// Log a single completed interaction.
    pub async fn log_interaction(
        &self,
        user_id: &str,
        query: &str,
        response: &str,
        response_time_secs: f64,
    ) {
        let record = InteractionRecord::new(user_id, query, response, response_time_secs);

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if !state.users.contains_key(user_id) {
            state.user_order.push(user_id.to_string());
        }
        let activity = state.users.entry(user_id.to_string()).or_default();
        activity.total_queries += 1;
        activity.total_response_time += response_time_secs;
        activity.queries.push(query.to_string());

        state.interactions.push(record);

        debug!(
            "Logged interaction for user {} ({} total)",
            user_id,
            state.interactions.len()
        );
    }

    /// Aggregate statistics over the full interaction log. All-zero when
    /// nothing has been logged.
    pub async fn summary_stats(&self) -> SummaryStats {
        let state = self.state.read().await;

        if state.interactions.is_empty() {
            return SummaryStats::default();
        }

        let count = state.interactions.len();
        let times: Vec<f64> = state
            .interactions
            .iter()
            .map(|i| i.response_time_secs)
            .collect();
        let total_query_len: usize = state.interactions.iter().map(|i| i.query_length).sum();
        let total_response_len: usize =
            state.interactions.iter().map(|i| i.response_length).sum();

        SummaryStats {
            total_interactions: count,
            unique_users: state.users.len(),
            avg_response_time: round3(times.iter().sum::<f64>() / count as f64),
            min_response_time: round3(times.iter().cloned().fold(f64::INFINITY, f64::min)),
            max_response_time: round3(times.iter().cloned().fold(f64::NEG_INFINITY, f64::max)),
            avg_query_length: round1(total_query_len as f64 / count as f64),
            avg_response_length: round1(total_response_len as f64 / count as f64),
        }
    }

    /// Statistics for one user; `None` when the user has no recorded
    /// interactions (distinct from a zero-valued view).
    pub async fn user_stats(&self, user_id: &str) -> Option<UserStatsView> {
        let state = self.state.read().await;
        let activity = state.users.get(user_id)?;

        let recent_start = activity.queries.len().saturating_sub(RECENT_QUERIES_WINDOW);

        Some(UserStatsView {
            user_id: user_id.to_string(),
            total_queries: activity.total_queries,
            avg_response_time: round3(
                activity.total_response_time / activity.total_queries as f64,
            ),
            recent_queries: activity.queries[recent_start..].to_vec(),
        })
    }

    /// Last `limit` interaction records, most-recent-last (log order).
    pub async fn recent_interactions(&self, limit: usize) -> Vec<InteractionRecord> {
        let state = self.state.read().await;
        let start = state.interactions.len().saturating_sub(limit);
        state.interactions[start..].to_vec()
    }

    /// Users ranked by total queries descending; ties keep first-seen
    /// order.
    pub async fn top_users(&self, limit: usize) -> Vec<TopUser> {
        let state = self.state.read().await;

        let mut ranked: Vec<TopUser> = state
            .user_order
            .iter()
            .filter_map(|user_id| {
                state.users.get(user_id).map(|activity| TopUser {
                    user_id: user_id.clone(),
                    total_queries: activity.total_queries,
                })
            })
            .collect();

        // Stable sort: equal counts stay in first-appearance order.
        ranked.sort_by(|a, b| b.total_queries.cmp(&a.total_queries));
        ranked.truncate(limit);
        ranked
    }
}

impl Default for AnalyticsTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
