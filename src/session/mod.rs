mod filesystem;
mod storage;

pub use filesystem::{FilesystemConversationStore, CONVERSATION_EXPIRY_MINUTES};
pub use storage::ConversationStore;

use crate::error::Result;
use crate::models::{Conversation, Message};
use chrono::Local;
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Keep only the last `limit` user/assistant turns, oldest first.
pub fn trim_history(messages: &[Message], limit: usize) -> Vec<Message> {
    let conversational: Vec<&Message> = messages.iter().filter(|m| m.is_conversational()).collect();
    let skip = conversational.len().saturating_sub(limit);
    conversational.into_iter().skip(skip).cloned().collect()
}

/// Create a new, empty conversation
pub fn create_new_conversation() -> Conversation {
    Conversation {
        conversation_id: Uuid::new_v4().to_string(),
        last_updated: Local::now(),
        messages: vec![],
    }
}

/// Capped prior history for a conversation; unknown ids have none.
pub fn load_history(
    store: &dyn ConversationStore,
    conversation_id: &str,
    limit: usize,
) -> Result<Vec<Message>> {
    Ok(store
        .load(conversation_id)?
        .map(|c| trim_history(&c.messages, limit))
        .unwrap_or_default())
}

/// Persist the finished exchange. Tool traffic is never stored.
pub fn append_exchange(
    store: &dyn ConversationStore,
    conversation_id: &str,
    user_message: &str,
    assistant_message: &str,
) -> Result<()> {
    let mut conversation = store.load(conversation_id)?.unwrap_or_else(|| Conversation {
        conversation_id: conversation_id.to_string(),
        last_updated: Local::now(),
        messages: vec![],
    });

    conversation.messages.push(Message::user(user_message));
    conversation.messages.push(Message::assistant(assistant_message));
    conversation.last_updated = Local::now();

    store.save(&conversation)
}
