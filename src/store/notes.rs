//! Markdown notes, one file per note

use super::slugify;
use crate::error::Result;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// Characters of note text shown in a search preview
const PREVIEW_CHARS: usize = 200;

/// A search hit over saved notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHit {
    pub file_name: String,
    /// First characters of the note with newlines flattened
    pub preview: String,
}

/// Note directory store
pub struct NoteStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl NoteStore {
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Write a new note and return its path
    ///
    /// Notes are never overwritten: a second note with the same title in the
    /// same second gets a numeric suffix.
    pub async fn save(&self, title: &str, content: &str, tags: Option<&str>) -> Result<PathBuf> {
        let _guard = self.lock.lock().await;
        let now = chrono::Local::now();
        let stem = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), slugify(title));

        let mut path = self.dir.join(format!("{}.md", stem));
        let mut n = 1;
        while fs::try_exists(&path).await? {
            n += 1;
            path = self.dir.join(format!("{}_{}.md", stem, n));
        }

        let tags = tags.filter(|t| !t.trim().is_empty()).unwrap_or("none");
        let body = format!(
            "# {}\n**Date:** {}\n**Tags:** {}\n\n---\n\n{}\n",
            title,
            now.format("%Y-%m-%d %H:%M"),
            tags,
            content
        );
        fs::write(&path, body).await?;

        tracing::debug!(path = %path.display(), "Note saved");
        Ok(path)
    }

    /// Case-insensitive substring search over every note's full text
    pub async fn search(&self, query: &str) -> Result<Vec<NoteHit>> {
        let _guard = self.lock.lock().await;
        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "md") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            if !content.to_lowercase().contains(&needle) {
                continue;
            }
            let preview: String = content
                .chars()
                .take(PREVIEW_CHARS)
                .collect::<String>()
                .replace('\n', " ");
            hits.push(NoteHit {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                preview,
            });
        }

        hits.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::open(dir.path().join("notes")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_layout() {
        let (_dir, store) = store().await;
        let path = store
            .save("Quarterly Plan", "Ship the bridge.", Some("work,q3"))
            .await
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_quarterly_plan.md"));
        // YYYYMMDD_HHMMSS_
        assert_eq!(name.as_bytes()[8], b'_');
        assert_eq!(name.as_bytes()[15], b'_');

        let body = fs::read_to_string(&path).await.unwrap();
        assert!(body.starts_with("# Quarterly Plan\n**Date:** "));
        assert!(body.contains("**Tags:** work,q3\n\n---\n\nShip the bridge.\n"));
    }

    #[tokio::test]
    async fn test_missing_tags_render_none() {
        let (_dir, store) = store().await;
        let path = store.save("Untagged", "body", None).await.unwrap();
        let body = fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("**Tags:** none"));
    }

    #[tokio::test]
    async fn test_same_title_same_second_is_not_overwritten() {
        let (_dir, store) = store().await;
        let a = store.save("Dup", "first", None).await.unwrap();
        let b = store.save("Dup", "second", None).await.unwrap();
        assert_ne!(a, b);
        assert!(fs::read_to_string(&a).await.unwrap().contains("first"));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (_dir, store) = store().await;
        store.save("Groceries", "Buy OAT milk", None).await.unwrap();
        store.save("Standup", "Discuss roadmap", None).await.unwrap();

        let hits = store.search("oat").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].file_name.ends_with("_groceries.md"));
        assert!(!hits[0].preview.contains('\n'));

        assert!(store.search("nothing-like-this").await.unwrap().is_empty());
    }
}
