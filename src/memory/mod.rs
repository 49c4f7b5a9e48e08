//! Conversation memory: per-user history storage and context transforms

pub mod context;
pub mod store;

pub use context::coalesce_for_strict_alternation;
pub use store::{ConversationStore, CONTEXT_WINDOW};
