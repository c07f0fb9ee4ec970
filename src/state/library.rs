use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::{Story, StoredRecord};

/// Fixed key the story record is stored under
pub const STORAGE_KEY: &str = "stories-storage";

/// Errors raised while loading or saving the story record
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt story record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Side-effecting persistence collaborator injected into the store.
///
/// `save` receives the whole collection after each committed mutation;
/// transient viewing state never reaches it.
pub trait StoryPersistence {
    fn load(&self) -> Result<Vec<Story>, LibraryError>;
    fn save(&self, stories: &[Story]) -> Result<(), LibraryError>;
}

/// The Library keeps the story record in a small SQLite key/value table.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the database at `db_path` and initialize the schema.
    pub fn open(db_path: &Path) -> Result<Self, LibraryError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!(path = %db_path.display(), "story database opened");

        let library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// Default database location in the user's data directory:
    /// - Linux: ~/.local/share/story-reel/story_reel.db
    /// - macOS: ~/Library/Application Support/story-reel/story_reel.db
    /// - Windows: %APPDATA%\story-reel\story_reel.db
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("story-reel");
        path.push("story_reel.db");
        path
    }

    fn init_schema(&self) -> Result<(), LibraryError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl StoryPersistence for Library {
    fn load(&self) -> Result<Vec<Story>, LibraryError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => {
                let record: StoredRecord = serde_json::from_str(&json)?;
                Ok(record.stories)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, stories: &[Story]) -> Result<(), LibraryError> {
        let record = StoredRecord {
            stories: stories.to_vec(),
        };
        let json = serde_json::to_string(&record)?;

        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![STORAGE_KEY, json],
        )?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-process persistence, used in tests and when the database is unavailable
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    record: RefCell<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the record, as if written by an earlier session
    #[cfg(test)]
    pub fn with_stories(stories: &[Story]) -> Self {
        let persistence = Self::new();
        // Serializing plain data into a String cannot fail
        if let Ok(json) = serde_json::to_string(&StoredRecord { stories: stories.to_vec() }) {
            *persistence.record.borrow_mut() = Some(json);
        }
        persistence
    }

    /// The raw serialized record, if anything was saved
    #[cfg(test)]
    pub fn raw(&self) -> Option<String> {
        self.record.borrow().clone()
    }
}

impl StoryPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Story>, LibraryError> {
        match self.record.borrow().as_deref() {
            Some(json) => Ok(serde_json::from_str::<StoredRecord>(json)?.stories),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, stories: &[Story]) -> Result<(), LibraryError> {
        let json = serde_json::to_string(&StoredRecord { stories: stories.to_vec() })?;
        *self.record.borrow_mut() = Some(json);
        Ok(())
    }
}
