//! Customer Support Agent Backend
//!
//! A support chat backend that:
//! - Forwards user queries to the Groq chat-completions API
//! - Maintains bounded per-user conversation context in memory
//! - Seeds synthesized customer profiles as prior context
//! - Tracks interaction analytics (volume, latency, activity)
//!
//! Exposed over HTTP via axum; all shared components are constructed
//! once at startup and injected explicitly.

pub mod agent;
pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod models;
pub mod profile;

pub use error::Result;

// Re-export common types
pub use agent::{SupportAgent, FALLBACK_REPLY};
pub use analytics::AnalyticsTracker;
pub use llm::{ChatMessage, ChatProvider, GroqClient};
pub use memory::{ConversationStore, CONTEXT_WINDOW};
pub use models::*;
pub use profile::ProfileGenerator;
