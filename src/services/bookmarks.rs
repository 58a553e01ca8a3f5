// Bookmark storage module
// Persists the saved learning-content list as one JSON blob in SQLite,
// keyed under a fixed name.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::models::LearningContent;

const BOOKMARKS_KEY: &str = "savedSummaries";

/// Key/value store holding the bookmark list.
pub struct BookmarkStore {
    conn: Connection,
}

impl BookmarkStore {
    /// Open (and initialize) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Load the saved bookmark list.
    ///
    /// A missing row or an undecodable blob degrades to an empty list; the
    /// store never fails a read over stale content.
    pub fn load(&self) -> Result<Vec<LearningContent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM bookmarks WHERE key = ?")?;
        let mut rows = stmt.query(rusqlite::params![BOOKMARKS_KEY])?;

        let Some(row) = rows.next()? else {
            return Ok(Vec::new());
        };
        let blob: String = row.get(0)?;

        match serde_json::from_str(&blob) {
            Ok(items) => Ok(items),
            Err(err) => {
                log::warn!("discarding undecodable bookmark blob: {}", err);
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored list with the given one.
    pub fn save(&self, items: &[LearningContent]) -> Result<()> {
        let blob = serde_json::to_string(items).context("failed to serialize bookmarks")?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO bookmarks (key, value, updated_at) VALUES (?, ?, ?)",
            rusqlite::params![BOOKMARKS_KEY, blob, now],
        )?;
        Ok(())
    }

    /// Append one item to the stored list.
    pub fn append(&self, item: LearningContent) -> Result<()> {
        let mut items = self.load()?;
        items.push(item);
        self.save(&items)
    }

    /// Remove the bookmark with the given id. Returns whether one was removed.
    pub fn remove(&self, id: Uuid) -> Result<bool> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            return Ok(false);
        }
        self.save(&items)?;
        Ok(true)
    }

    /// Delete all bookmarks (stores an empty list).
    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }

    /// Byte length of the serialized bookmark list, as shown on the
    /// settings screen.
    pub fn cache_size_bytes(&self) -> Result<usize> {
        let items = self.load()?;
        Ok(serde_json::to_vec(&items)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser;

    fn sample() -> LearningContent {
        parser::parse(
            "[SUMMARY]\nTopic is X.\n[QUIZ]\n1. What is X?\nCorrect Answer: A\nWrong Answers: B | C\n\n[PREDICTED]\n1. How does X work?\n",
        )
    }

    #[test]
    fn test_load_empty_store() {
        let store = BookmarkStore::open_in_memory().unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_roundtrip() {
        let store = BookmarkStore::open_in_memory().unwrap();
        let item = sample();
        let id = item.id;
        store.append(item).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].summary, "Topic is X.");
        assert_eq!(loaded[0].quiz_questions.len(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let store = BookmarkStore::open_in_memory().unwrap();
        let first = sample();
        let second = sample();
        let first_id = first.id;
        store.append(first).unwrap();
        store.append(second).unwrap();

        assert!(store.remove(first_id).unwrap());
        assert!(!store.remove(first_id).unwrap());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_ne!(loaded[0].id, first_id);
    }

    #[test]
    fn test_clear() {
        let store = BookmarkStore::open_in_memory().unwrap();
        store.append(sample()).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_cache_size_tracks_content() {
        let store = BookmarkStore::open_in_memory().unwrap();
        let empty_size = store.cache_size_bytes().unwrap();
        store.append(sample()).unwrap();

        assert!(store.cache_size_bytes().unwrap() > empty_size);
    }

    #[test]
    fn test_undecodable_blob_degrades_to_empty() {
        let store = BookmarkStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO bookmarks (key, value, updated_at) VALUES (?, ?, ?)",
                rusqlite::params![BOOKMARKS_KEY, "not json", "now"],
            )
            .unwrap();

        assert!(store.load().unwrap().is_empty());
    }
}
