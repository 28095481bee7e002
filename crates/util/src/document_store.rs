//! Key/value document persistence for palette settings and history.
//!
//! Documents are opaque JSON values stored under well-known keys. The JSON
//! backed store keeps every document in a single file (tilde expansion and a
//! config directory fallback, like the other stores in this workspace), while
//! the in-memory store backs tests and ephemeral sessions.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::expand_tilde;

/// Environment variable controlling the store file location.
pub const STORE_PATH_ENV: &str = "NOTEPAL_STORE_PATH";

/// Default filename for the persisted document store.
pub const STORE_FILE_NAME: &str = "store.json";

/// Errors surfaced by document store writes.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// I/O failure while reading or writing the store file.
    #[error("document store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("document store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Generic key/value document persistence.
pub trait DocumentStore: Send + Sync {
    /// Fetch the JSON document stored under `key`.
    fn get_data(&self, key: &str) -> Option<Value>;

    /// Store or replace the JSON document under `key`.
    fn set_data(&self, key: &str, value: Value) -> Result<(), DocumentStoreError>;

    /// Remove the document under `key`. Missing keys are not an error.
    fn delete_item(&self, key: &str) -> Result<(), DocumentStoreError>;

    /// Text form of the document: strings verbatim, anything else as JSON.
    fn get_text(&self, key: &str) -> Option<String> {
        self.get_data(key).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    documents: IndexMap<String, Value>,
}

/// JSON-backed document store persisted on disk.
#[derive(Debug)]
pub struct JsonDocumentStore {
    path: PathBuf,
    file: Mutex<StoreFile>,
}

impl JsonDocumentStore {
    /// Open the store at `path`, or at the default location when `None`.
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, DocumentStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde(&path.to_string_lossy()),
            None => default_store_path(),
        };
        let file = load_store_file(&resolved_path)?;
        debug!(path = %resolved_path.display(), documents = file.documents.len(), "Opened document store");
        Ok(Self {
            path: resolved_path,
            file: Mutex::new(file),
        })
    }

    /// Access the underlying store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, file: &StoreFile) -> Result<(), DocumentStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl DocumentStore for JsonDocumentStore {
    fn get_data(&self, key: &str) -> Option<Value> {
        let file = self.file.lock().expect("document store lock poisoned");
        file.documents.get(key).cloned()
    }

    fn set_data(&self, key: &str, value: Value) -> Result<(), DocumentStoreError> {
        let mut file = self.file.lock().expect("document store lock poisoned");
        file.documents.insert(key.to_string(), value);
        self.save_locked(&file)
    }

    fn delete_item(&self, key: &str) -> Result<(), DocumentStoreError> {
        let mut file = self.file.lock().expect("document store lock poisoned");
        if file.documents.shift_remove(key).is_none() {
            return Ok(());
        }
        self.save_locked(&file)
    }
}

/// In-memory document store used by tests and sessions without a config directory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<IndexMap<String, Value>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with documents, mainly for fixtures.
    pub fn with_documents<I, K>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            documents: Mutex::new(documents.into_iter().map(|(key, value)| (key.into(), value)).collect()),
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get_data(&self, key: &str) -> Option<Value> {
        self.documents.lock().expect("document store lock poisoned").get(key).cloned()
    }

    fn set_data(&self, key: &str, value: Value) -> Result<(), DocumentStoreError> {
        self.documents
            .lock()
            .expect("document store lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    fn delete_item(&self, key: &str) -> Result<(), DocumentStoreError> {
        self.documents.lock().expect("document store lock poisoned").shift_remove(key);
        Ok(())
    }
}

/// Resolve the default store location, honouring [`STORE_PATH_ENV`].
pub fn default_store_path() -> PathBuf {
    if let Ok(path) = env::var(STORE_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notepal")
        .join(STORE_FILE_NAME)
}

fn load_store_file(path: &Path) -> Result<StoreFile, DocumentStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse document store; starting empty"
                );
                Ok(StoreFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
        Err(error) => Err(DocumentStoreError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get_data("settings").is_none());

        store.set_data("settings", json!({"maxResults": 20})).unwrap();
        assert_eq!(store.get_data("settings"), Some(json!({"maxResults": 20})));

        store.delete_item("settings").unwrap();
        assert!(store.get_data("settings").is_none());
    }

    #[test]
    fn get_text_returns_strings_verbatim() {
        let store = InMemoryDocumentStore::with_documents([("note", json!("plain text")), ("data", json!([1, 2]))]);
        assert_eq!(store.get_text("note").as_deref(), Some("plain text"));
        assert_eq!(store.get_text("data").as_deref(), Some("[1,2]"));
        assert!(store.get_text("missing").is_none());
    }

    #[test]
    fn json_store_persists_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = JsonDocumentStore::new(Some(path.clone())).unwrap();
        store.set_data("history", json!({"history": ["Explorer"]})).unwrap();
        drop(store);

        let reloaded = JsonDocumentStore::new(Some(path)).unwrap();
        assert_eq!(reloaded.get_data("history"), Some(json!({"history": ["Explorer"]})));
    }

    #[test]
    fn json_store_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonDocumentStore::new(Some(path.clone())).unwrap();
        store.set_data("a", json!(1)).unwrap();
        store.set_data("b", json!(2)).unwrap();
        store.delete_item("a").unwrap();
        store.delete_item("never-stored").unwrap();
        drop(store);

        let reloaded = JsonDocumentStore::new(Some(path)).unwrap();
        assert!(reloaded.get_data("a").is_none());
        assert_eq!(reloaded.get_data("b"), Some(json!(2)));
    }

    #[test]
    fn invalid_json_returns_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonDocumentStore::new(Some(path)).unwrap();
        assert!(store.get_data("settings").is_none());
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/store.json";
        temp_env::with_var(STORE_PATH_ENV, Some(override_path), || {
            assert_eq!(default_store_path(), expand_tilde(override_path));
        });
    }

    #[test]
    fn concurrent_writes_keep_the_file_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = Arc::new(JsonDocumentStore::new(Some(path.clone())).unwrap());
        let handles: Vec<_> = (0..5)
            .map(|index| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.set_data("counter", json!(index)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reloaded = JsonDocumentStore::new(Some(path)).unwrap();
        assert!(reloaded.get_data("counter").unwrap().is_number());
    }
}
