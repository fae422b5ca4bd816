//! Personal-assistant tools: notes and a to-do list

use super::types::{ArgSpec, Tool, ToolCallArgs, ToolResult};
use super::ToolRegistry;
use crate::error::Result;
use crate::store::{NoteStore, TodoStore, ToolStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Server name for the assistant tool set
pub const ASSISTANT_SERVER: &str = "assistant";

/// `assistant` registry: save_note, search_notes, manage_todos
pub fn assistant_tools(store: &ToolStore) -> ToolRegistry {
    ToolRegistry::new(ASSISTANT_SERVER)
        .with_tool(Arc::new(SaveNoteTool::new(store.notes.clone())))
        .with_tool(Arc::new(SearchNotesTool::new(store.notes.clone())))
        .with_tool(Arc::new(ManageTodosTool::new(store.todos.clone())))
}

pub struct SaveNoteTool {
    notes: Arc<NoteStore>,
}

impl SaveNoteTool {
    pub fn new(notes: Arc<NoteStore>) -> Self {
        Self { notes }
    }
}

#[async_trait]
impl Tool for SaveNoteTool {
    fn name(&self) -> &str {
        "save_note"
    }

    fn description(&self) -> &str {
        "Save a note with a title and content to local storage"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("title", "Note title"),
            ArgSpec::required("content", "Note body in markdown"),
            ArgSpec::optional("tags", "Comma-separated tags"),
        ]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let path = self
            .notes
            .save(args.require("title")?, args.require("content")?, args.get("tags"))
            .await?;
        Ok(ToolResult::text(format!("Note saved: {}", path.display())))
    }
}

pub struct SearchNotesTool {
    notes: Arc<NoteStore>,
}

impl SearchNotesTool {
    pub fn new(notes: Arc<NoteStore>) -> Self {
        Self { notes }
    }
}

#[async_trait]
impl Tool for SearchNotesTool {
    fn name(&self) -> &str {
        "search_notes"
    }

    fn description(&self) -> &str {
        "Search saved notes by keyword or tag"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![ArgSpec::required("query", "Keyword or tag to look for")]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let hits = self.notes.search(args.require("query")?).await?;
        if hits.is_empty() {
            return Ok(ToolResult::text("No notes found matching your query."));
        }
        let text = hits
            .iter()
            .map(|hit| format!("📄 {}\n   {}...", hit.file_name, hit.preview))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolResult::text(text))
    }
}

pub struct ManageTodosTool {
    todos: Arc<TodoStore>,
}

impl ManageTodosTool {
    pub fn new(todos: Arc<TodoStore>) -> Self {
        Self { todos }
    }
}

#[async_trait]
impl Tool for ManageTodosTool {
    fn name(&self) -> &str {
        "manage_todos"
    }

    fn description(&self) -> &str {
        "Add, complete, or list to-do items"
    }

    fn args(&self) -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("action", "One of: add, complete, list"),
            ArgSpec::optional(
                "item",
                "Task text for add; item number or id for complete",
            ),
        ]
    }

    async fn call(&self, args: &ToolCallArgs) -> Result<ToolResult> {
        let action = args.require("action")?.trim().to_lowercase();

        match action.as_str() {
            "add" => {
                let item = self.todos.add(args.require("item")?).await?;
                Ok(ToolResult::text(format!("Added: {}", item.task)))
            }
            "complete" => {
                let reference = args.get("item").unwrap_or_default();
                let item = self.todos.complete(reference).await?;
                Ok(ToolResult::text(format!("Completed: {}", item.task)))
            }
            "list" => {
                let todos = self.todos.list().await?;
                if todos.is_empty() {
                    return Ok(ToolResult::text("No to-do items yet!"));
                }
                let lines = todos
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let glyph = if t.done { "✅" } else { "⬜" };
                        format!("  {} {}. {}", glyph, i + 1, t.task)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(ToolResult::text(lines))
            }
            other => Ok(ToolResult::text(format!("Unknown action: {}", other))),
        }
    }
}
