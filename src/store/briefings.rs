//! Meeting briefings, one markdown file per company and date

use super::slugify;
use crate::error::Result;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

pub struct BriefingStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl BriefingStore {
    pub async fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Write `{date}_{slug}_briefing.md` and return the file name
    ///
    /// `date` defaults to today. Same company and date overwrites.
    pub async fn save(&self, company: &str, content: &str, date: Option<&str>) -> Result<String> {
        let _guard = self.lock.lock().await;
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => d.replace(['/', '\\'], "-"),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };
        let file_name = format!("{}_{}_briefing.md", date, slugify(company));
        fs::write(self.dir.join(&file_name), content).await?;

        tracing::debug!(file = %file_name, "Briefing saved");
        Ok(file_name)
    }

    /// Briefing file names, newest first, optionally filtered by substring
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".md") {
                continue;
            }
            if let Some(ref needle) = needle {
                if !name.to_lowercase().contains(needle) {
                    continue;
                }
            }
            names.push(name);
        }

        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = BriefingStore::open(dir.path().to_path_buf()).await.unwrap();

        let name = store
            .save("Acme Corp", "# Acme", Some("2026-03-01"))
            .await
            .unwrap();
        assert_eq!(name, "2026-03-01_acme_corp_briefing.md");
        store.save("Globex", "# Globex", Some("2026-03-05")).await.unwrap();

        assert_eq!(
            store.list(None).await.unwrap(),
            vec![
                "2026-03-05_globex_briefing.md".to_string(),
                "2026-03-01_acme_corp_briefing.md".to_string(),
            ]
        );
        assert_eq!(store.list(Some("ACME")).await.unwrap().len(), 1);
        assert!(store.list(Some("initech")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = BriefingStore::open(dir.path().to_path_buf()).await.unwrap();

        store.save("Acme", "v1", Some("2026-03-01")).await.unwrap();
        let name = store.save("Acme", "v2", Some("2026-03-01")).await.unwrap();

        let body = fs::read_to_string(dir.path().join(name)).await.unwrap();
        assert_eq!(body, "v2");
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_default_date_is_today() {
        let dir = tempfile::tempdir().unwrap();
        let store = BriefingStore::open(dir.path().to_path_buf()).await.unwrap();
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();

        let name = store.save("Initech", "x", None).await.unwrap();
        assert_eq!(name, format!("{}_initech_briefing.md", today));
    }
}
