use crate::error::Result;
use crate::models::Conversation;

/// Trait for conversation storage backends
pub trait ConversationStore: Send + Sync {
    /// Load a conversation by id, if it exists
    fn load(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    /// Find the most recent conversation that has not expired
    fn find_recent(&self) -> Option<Conversation>;

    /// Save a conversation, replacing any previous copy
    fn save(&self, conversation: &Conversation) -> Result<()>;

    /// Clear all conversations
    fn clear_all(&self) -> Result<()>;
}
