use super::storage::ConversationStore;
use crate::error::{GatewayError, Result};
use crate::models::Conversation;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONVERSATION_EXPIRY_MINUTES: i64 = 30;

const FILE_PREFIX: &str = "conversation-";

/// One JSON file per conversation under a cache directory.
pub struct FilesystemConversationStore {
    root: PathBuf,
}

impl FilesystemConversationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.cache/sqlgate`
    pub fn in_home_cache() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| GatewayError::StoreError("Could not determine home directory".into()))?;
        Ok(Self::new(home.join(".cache").join("sqlgate")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<&Path> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(&self.root)
    }

    fn path_for(&self, conversation_id: &str) -> Result<PathBuf> {
        if conversation_id.is_empty()
            || !conversation_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(GatewayError::StoreError(format!(
                "Invalid conversation id: {}",
                conversation_id
            )));
        }
        Ok(self
            .root
            .join(format!("{}{}.json", FILE_PREFIX, conversation_id)))
    }

    fn is_conversation_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX))
                .unwrap_or(false)
    }
}

impl ConversationStore for FilesystemConversationStore {
    fn load(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let path = self.path_for(conversation_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let conversation: Conversation = serde_json::from_str(&content)?;
        Ok(Some(conversation))
    }

    fn find_recent(&self) -> Option<Conversation> {
        let now = Local::now();
        let entries = fs::read_dir(&self.root).ok()?;

        let mut conversations: Vec<(PathBuf, Conversation)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_conversation_file(path))
            .filter_map(|path| {
                let content = fs::read_to_string(&path).ok()?;
                let conversation: Conversation = serde_json::from_str(&content).ok()?;
                Some((path, conversation))
            })
            .collect();

        // Most recent first
        conversations.sort_by(|a, b| b.1.last_updated.cmp(&a.1.last_updated));

        let (path, conversation) = conversations.into_iter().next()?;
        let age_minutes = now
            .signed_duration_since(conversation.last_updated)
            .num_minutes();
        if age_minutes.abs() < CONVERSATION_EXPIRY_MINUTES {
            Some(conversation)
        } else {
            // Clean up expired conversation
            let _ = fs::remove_file(path);
            None
        }
    }

    fn save(&self, conversation: &Conversation) -> Result<()> {
        self.ensure_root()?;
        let path = self.path_for(&conversation.conversation_id)?;
        let content = serde_json::to_string_pretty(conversation)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Ok(());
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if Self::is_conversation_file(&path) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
