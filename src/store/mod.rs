//! Persistent tool store
//!
//! Flat-file storage behind the agent tools. Every store owns its path and
//! an internal lock; all reads and read-modify-writes go through it, so
//! concurrent tool calls against the same file are serialized in-process.
//!
//! ```text
//! {data_dir}/
//!   notes/{timestamp}_{slug}.md
//!   todos.json
//!   briefings/{date}_{slug}_briefing.md
//!   support/tickets/TKT-{timestamp}.json
//!   support/conversation_log.json
//! ```

mod briefings;
mod conversation;
mod knowledge;
mod notes;
mod orders;
mod tickets;
mod todos;

pub use briefings::BriefingStore;
pub use conversation::{ConversationLog, ConversationLogEntry};
pub use knowledge::{KbMatch, KnowledgeBase, NO_KB_MATCH_REPLY};
pub use notes::{NoteHit, NoteStore};
pub use orders::{Order, OrderBook};
pub use tickets::{NewTicket, SupportTicket, TicketStore};
pub use todos::{TodoItem, TodoStore};

use crate::config::StorageConfig;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Maximum slug length taken from a title or company name
const SLUG_MAX_CHARS: usize = 50;

/// All stores used by the built-in tool sets
#[derive(Clone)]
pub struct ToolStore {
    pub notes: Arc<NoteStore>,
    pub todos: Arc<TodoStore>,
    pub tickets: Arc<TicketStore>,
    pub conversations: Arc<ConversationLog>,
    pub briefings: Arc<BriefingStore>,
    pub knowledge: Arc<KnowledgeBase>,
    pub orders: Arc<OrderBook>,
}

impl ToolStore {
    /// Open every store, creating directories as needed
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let store = Self {
            notes: Arc::new(NoteStore::open(config.notes_dir()).await?),
            todos: Arc::new(TodoStore::open(config.todos_file()).await?),
            tickets: Arc::new(TicketStore::open(config.tickets_dir()).await?),
            conversations: Arc::new(ConversationLog::open(config.conversation_log()).await?),
            briefings: Arc::new(BriefingStore::open(config.briefings_dir()).await?),
            knowledge: Arc::new(KnowledgeBase::new(&config.knowledge_base_dir)),
            orders: Arc::new(OrderBook::sample()),
        };

        tracing::debug!(data_dir = %config.data_dir.display(), "Tool store opened");
        Ok(store)
    }
}

/// File-name slug: spaces to underscores, lowercased, truncated
pub(crate) fn slugify(name: &str) -> String {
    name.replace(' ', "_")
        .to_lowercase()
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect::<String>()
        .replace(['/', '\\'], "_")
}

/// Write a file atomically via a temp file and rename
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Read a JSON array file; a missing file is an empty array
pub(crate) async fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Pretty-print `value` as JSON and write it atomically
pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Team Sync Notes"), "team_sync_notes");
        assert_eq!(slugify("a/b\\c"), "a_b_c");
        assert_eq!(slugify(&"x".repeat(80)).len(), 50);
    }

    #[test]
    fn test_slugify_counts_chars_not_bytes() {
        let slug = slugify(&"é".repeat(60));
        assert_eq!(slug.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_read_missing_array_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<serde_json::Value> =
            read_json_array(&dir.path().join("absent.json")).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("list.json");
        write_json(&path, &vec![1, 2, 3]).await.unwrap();

        let items: Vec<u32> = read_json_array(&path).await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_open_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::rooted_at(dir.path());
        ToolStore::open(&config).await.unwrap();

        assert!(config.notes_dir().is_dir());
        assert!(config.tickets_dir().is_dir());
        assert!(config.briefings_dir().is_dir());
    }
}
