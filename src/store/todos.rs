//! To-do list persisted as one ordered JSON array

use super::{read_json_array, write_json};
use crate::error::{BridgeError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// One to-do entry
///
/// Items get a stable `id` at creation. Items in files written before ids
/// existed are given one the first time the file is loaded, and the
/// upgraded file is written back immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(default)]
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub done: bool,
    pub created: NaiveDateTime,
}

fn new_todo_id() -> String {
    format!("todo-{}", uuid::Uuid::new_v4())
}

/// `None` when `reference` is not an integer; `Some(None)` for integers
/// that cannot be a display index (negative or too large)
fn parse_index(reference: &str) -> Option<Option<usize>> {
    let (negative, digits) = match reference.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, reference.strip_prefix('+').unwrap_or(reference)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(None);
    }
    Some(digits.parse::<usize>().ok())
}

impl TodoItem {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: new_todo_id(),
            task: task.into(),
            done: false,
            created: chrono::Local::now().naive_local(),
        }
    }
}

/// To-do file store
pub struct TodoStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TodoStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Append a new unchecked item
    pub async fn add(&self, task: &str) -> Result<TodoItem> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let item = TodoItem::new(task);
        todos.push(item.clone());
        write_json(&self.path, &todos).await?;

        tracing::debug!(id = %item.id, count = todos.len(), "Todo added");
        Ok(item)
    }

    /// All items in insertion order
    pub async fn list(&self) -> Result<Vec<TodoItem>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Read the file, assigning and persisting ids for legacy items
    ///
    /// Callers hold the lock.
    async fn load(&self) -> Result<Vec<TodoItem>> {
        let mut todos: Vec<TodoItem> = read_json_array(&self.path).await?;
        let mut upgraded = 0;
        for todo in todos.iter_mut().filter(|t| t.id.is_empty()) {
            todo.id = new_todo_id();
            upgraded += 1;
        }
        if upgraded > 0 {
            write_json(&self.path, &todos).await?;
            tracing::info!(path = %self.path.display(), upgraded, "Assigned ids to legacy todos");
        }
        Ok(todos)
    }

    /// Mark an item done
    ///
    /// `reference` is either a 1-based display index or an item id. Storage is
    /// left untouched when the reference does not resolve. Any integer,
    /// however large, is read as an index.
    pub async fn complete(&self, reference: &str) -> Result<TodoItem> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let reference = reference.trim();

        let position = match parse_index(reference) {
            Some(Some(n)) if n >= 1 && n <= todos.len() => n - 1,
            Some(_) => return Err(BridgeError::NotFound("Invalid item number.".to_string())),
            None => todos
                .iter()
                .position(|t| t.id == reference)
                .ok_or_else(|| BridgeError::InvalidInput("Please provide a number.".to_string()))?,
        };

        todos[position].done = true;
        let item = todos[position].clone();
        write_json(&self.path, &todos).await?;

        tracing::debug!(id = %item.id, index = position + 1, "Todo completed");
        Ok(item)
    }
}
