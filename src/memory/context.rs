//! Context-window shaping for strict-alternation providers
//!
//! Some chat backends reject requests with two consecutive turns of the
//! same role, or with a leading non-user turn. This transform reshapes a
//! context window to satisfy both rules. It is a pure function over the
//! turn sequence so it can be tested without any network calls.

use crate::llm::ChatMessage;
use crate::models::{ConversationTurn, Role};

/// Separator inserted between merged same-role turns.
const COALESCE_SEPARATOR: &str = "\n\n";

/// Reshape a turn window for providers that require strict role
/// alternation starting with a user turn.
///
/// Leading non-user turns are dropped; consecutive same-role turns are
/// merged into one message with their texts joined. The relative order of
/// surviving content is preserved.
pub fn coalesce_for_strict_alternation(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::with_capacity(turns.len());
    let mut started = false;

    for turn in turns {
        if !started {
            if turn.role != Role::User {
                continue;
            }
            started = true;
        }

        match messages.last_mut() {
            Some(last) if last.role == turn.role.as_str() => {
                last.content.push_str(COALESCE_SEPARATOR);
                last.content.push_str(&turn.content);
            }
            _ => messages.push(ChatMessage::from(turn)),
        }
    }

    messages
}
