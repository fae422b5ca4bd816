//! Support tickets, one JSON file per ticket

use crate::error::{BridgeError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// A support ticket as written to disk
///
/// Status starts at `"open"`; later transitions belong to whoever works the
/// ticket, not to this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub ticket_id: String,
    pub customer_name: String,
    pub issue_summary: String,
    pub priority: String,
    pub category: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Fields supplied when opening a ticket
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub customer_name: String,
    pub issue_summary: String,
    pub priority: Option<String>,
    pub category: Option<String>,
}

/// Ticket directory store
pub struct TicketStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl TicketStore {
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn ticket_path(&self, ticket_id: &str) -> PathBuf {
        let safe_id = ticket_id.replace(['/', '\\'], "_").replace("..", "_");
        self.dir.join(format!("{}.json", safe_id))
    }

    /// Create and persist a ticket with id `TKT-YYYYMMDDHHMMSS`
    ///
    /// If a ticket already holds this second's id, the timestamp is advanced
    /// until a free id is found.
    pub async fn create(&self, new: NewTicket) -> Result<SupportTicket> {
        let _guard = self.lock.lock().await;
        let created_at = chrono::Local::now().naive_local();

        let mut stamp = created_at;
        let mut ticket_id = ticket_id_for(stamp);
        while fs::try_exists(self.ticket_path(&ticket_id)).await? {
            stamp += Duration::seconds(1);
            ticket_id = ticket_id_for(stamp);
        }

        let ticket = SupportTicket {
            ticket_id,
            customer_name: new.customer_name,
            issue_summary: new.issue_summary,
            priority: non_empty_or(new.priority, "medium"),
            category: non_empty_or(new.category, "general"),
            status: "open".to_string(),
            created_at,
        };
        let json = serde_json::to_string_pretty(&ticket)?;
        fs::write(self.ticket_path(&ticket.ticket_id), json).await?;

        tracing::info!(
            ticket_id = %ticket.ticket_id,
            priority = %ticket.priority,
            category = %ticket.category,
            "Support ticket created"
        );
        Ok(ticket)
    }

    /// Load a ticket by id
    pub async fn get(&self, ticket_id: &str) -> Result<SupportTicket> {
        let _guard = self.lock.lock().await;
        match fs::read_to_string(self.ticket_path(ticket_id)).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BridgeError::NotFound(
                format!("Ticket {} not found.", ticket_id),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

fn ticket_id_for(stamp: NaiveDateTime) -> String {
    format!("TKT-{}", stamp.format("%Y%m%d%H%M%S"))
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ticket_id(id: &str) -> bool {
        id.len() == 18
            && id.starts_with("TKT-")
            && id[4..].chars().all(|c| c.is_ascii_digit())
    }

    async fn store() -> (tempfile::TempDir, TicketStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TicketStore::open(dir.path().join("tickets")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (_dir, store) = store().await;
        let ticket = store
            .create(NewTicket {
                customer_name: "Ana".into(),
                issue_summary: "Refund over limit".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(is_ticket_id(&ticket.ticket_id), "{}", ticket.ticket_id);
        assert_eq!(ticket.status, "open");
        assert_eq!(ticket.priority, "medium");
        assert_eq!(ticket.category, "general");

        let loaded = store.get(&ticket.ticket_id).await.unwrap();
        assert_eq!(loaded, ticket);
    }

    #[tokio::test]
    async fn test_same_second_ids_do_not_collide() {
        let (dir, store) = store().await;
        let mut ids = Vec::new();
        for _ in 0..3 {
            let t = store
                .create(NewTicket {
                    customer_name: "Ben".into(),
                    issue_summary: "Login".into(),
                    priority: Some("high".into()),
                    category: Some("account".into()),
                })
                .await
                .unwrap();
            assert!(is_ticket_id(&t.ticket_id));
            ids.push(t.ticket_id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(std::fs::read_dir(dir.path().join("tickets")).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_dir, store) = store().await;
        let err = store.get("TKT-20260101000000").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }
}
