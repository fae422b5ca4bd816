//! Read-only markdown knowledge base with keyword search

use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Lines kept before the first matching line
const WINDOW_BEFORE: usize = 5;
/// Lines kept from the first matching line onward
const WINDOW_AFTER: usize = 10;
/// Lines returned when a document matches but no single line does
const FALLBACK_LINES: usize = 20;

/// Separator between matched documents in a rendered reply
pub const MATCH_SEPARATOR: &str = "\n\n---\n\n";

/// Reply used when no document matches
pub const NO_KB_MATCH_REPLY: &str =
    "No relevant information found in knowledge base. This may need to be escalated to a human agent.";

/// One matched document and the excerpt around its first hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbMatch {
    /// File stem, e.g. `shipping_policy`
    pub stem: String,
    pub excerpt: String,
}

impl KbMatch {
    pub fn render(&self) -> String {
        format!("**{}**\n{}", self.stem, self.excerpt)
    }
}

/// Knowledge base rooted at a directory of `*.md` files
///
/// The documents are curated outside this system and never written here.
pub struct KnowledgeBase {
    dir: PathBuf,
}

impl KnowledgeBase {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Keyword search with OR semantics over lowercase query words
    ///
    /// Documents are visited in file-name order. A missing directory yields
    /// no matches.
    pub async fn search(&self, query: &str) -> Result<Vec<KbMatch>> {
        let query = query.to_lowercase();
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.dir.display(), "Knowledge base directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                docs.push(path);
            }
        }
        docs.sort();

        let mut matches = Vec::new();
        for path in docs {
            let content = fs::read_to_string(&path).await?;
            if let Some(excerpt) = excerpt_for(&content, &words) {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                matches.push(KbMatch { stem, excerpt });
            }
        }

        tracing::debug!(query = %query, matched = matches.len(), "Knowledge base searched");
        Ok(matches)
    }

    /// Search and render as a single reply text
    pub async fn answer(&self, query: &str) -> Result<String> {
        let matches = self.search(query).await?;
        if matches.is_empty() {
            return Ok(NO_KB_MATCH_REPLY.to_string());
        }
        Ok(matches
            .iter()
            .map(KbMatch::render)
            .collect::<Vec<_>>()
            .join(MATCH_SEPARATOR))
    }
}

/// Excerpt around the first line containing any word, if the document matches at all
pub fn excerpt_for(content: &str, words: &[&str]) -> Option<String> {
    let lowered = content.to_lowercase();
    if !words.iter().any(|w| lowered.contains(w)) {
        return None;
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let window = lines
        .iter()
        .position(|line| {
            let line = line.to_lowercase();
            words.iter().any(|w| line.contains(w))
        })
        .map(|i| {
            let start = i.saturating_sub(WINDOW_BEFORE);
            let end = (i + WINDOW_AFTER).min(lines.len());
            &lines[start..end]
        })
        .unwrap_or_else(|| &lines[..FALLBACK_LINES.min(lines.len())]);

    Some(window.join("\n"))
}
