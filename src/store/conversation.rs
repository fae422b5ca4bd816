//! Append-only conversation log kept as one JSON array

use super::{read_json_array, write_json};
use crate::error::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLogEntry {
    pub timestamp: NaiveDateTime,
    pub summary: String,
    pub resolved: String,
    pub category: String,
}

pub struct ConversationLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ConversationLog {
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Append one entry; `resolved` defaults to `"yes"`, `category` to `"general"`
    pub async fn append(
        &self,
        summary: &str,
        resolved: Option<&str>,
        category: Option<&str>,
    ) -> Result<ConversationLogEntry> {
        let _guard = self.lock.lock().await;
        let mut entries: Vec<ConversationLogEntry> = read_json_array(&self.path).await?;
        let entry = ConversationLogEntry {
            timestamp: chrono::Local::now().naive_local(),
            summary: summary.to_string(),
            resolved: resolved.unwrap_or("yes").to_string(),
            category: category.unwrap_or("general").to_string(),
        };
        entries.push(entry.clone());
        write_json(&self.path, &entries).await?;
        Ok(entry)
    }

    pub async fn entries(&self) -> Result<Vec<ConversationLogEntry>> {
        let _guard = self.lock.lock().await;
        read_json_array(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_preserves_order_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::open(dir.path().join("support").join("log.json"))
            .await
            .unwrap();

        log.append("asked about returns", None, None).await.unwrap();
        log.append("billing dispute", Some("no"), Some("billing"))
            .await
            .unwrap();

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].resolved, "yes");
        assert_eq!(entries[0].category, "general");
        assert_eq!(entries[1].summary, "billing dispute");
        assert_eq!(entries[1].resolved, "no");
    }
}
