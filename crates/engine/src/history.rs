//! Command history and navigation history.
//!
//! The command history is a de-duplicated list of command names, most recent
//! first, persisted as `{ "history": [...] }`. Navigation history is read from
//! the store (`$:/HistoryList`, oldest first) and combined with the open
//! story.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use notepal_types::Repository;
use notepal_util::{DocumentStore, DocumentStoreError};

use crate::keys::{COMMAND_HISTORY_KEY, NAVIGATION_HISTORY_KEY, STORY_FILTER};

/// Maximum number of command names retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    history: Vec<String>,
}

/// Recently run commands, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    names: Vec<String>,
    limit: usize,
}

impl CommandHistory {
    pub fn new(names: Vec<String>) -> Self {
        let mut history = Self {
            names: Vec::new(),
            limit: DEFAULT_HISTORY_LIMIT,
        };
        for name in names {
            if !history.names.contains(&name) {
                history.names.push(name);
            }
        }
        history.names.truncate(history.limit);
        history
    }

    /// Load the persisted history; unreadable documents start empty.
    pub fn load(store: &dyn DocumentStore) -> Self {
        let Some(document) = store.get_data(COMMAND_HISTORY_KEY) else {
            return Self::new(Vec::new());
        };
        match serde_json::from_value::<HistoryDocument>(document) {
            Ok(document) => Self::new(document.history),
            Err(error) => {
                warn!(error = %error, "Failed to parse command history; starting empty");
                Self::new(Vec::new())
            }
        }
    }

    pub fn save(&self, store: &dyn DocumentStore) -> Result<(), DocumentStoreError> {
        let document = HistoryDocument {
            history: self.names.clone(),
        };
        store.set_data(COMMAND_HISTORY_KEY, serde_json::to_value(document)?)
    }

    /// Move `name` to the front, inserting it when new.
    pub fn record(&mut self, name: &str) {
        self.names.retain(|existing| existing != name);
        self.names.insert(0, name.to_string());
        self.names.truncate(self.limit);
    }

    /// Drop names for which `known` returns false.
    pub fn prune(&mut self, known: impl Fn(&str) -> bool) {
        self.names.retain(|name| known(name));
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Recently visited items followed by the open story, existing items only.
pub fn navigation_history(repository: &dyn Repository, store: &dyn DocumentStore) -> Vec<String> {
    let mut titles: Vec<String> = match store.get_data(NAVIGATION_HISTORY_KEY) {
        Some(Value::Array(entries)) => entries
            .iter()
            .rev()
            .filter_map(|entry| entry.get("title").and_then(Value::as_str).map(str::to_string))
            .collect(),
        Some(other) => {
            warn!(document = %other, "Navigation history is not a list; ignoring");
            Vec::new()
        }
        None => Vec::new(),
    };

    match repository.filter_query(STORY_FILTER) {
        Ok(story) => titles.extend(story),
        Err(error) => debug!(error = %error, "Story list query failed"),
    }

    let mut unique: Vec<String> = Vec::with_capacity(titles.len());
    for title in titles {
        if !unique.contains(&title) && repository.item_or_shadow_exists(&title) {
            unique.push(title);
        }
    }
    unique
}

/// Append a visit to the persisted navigation history.
pub fn record_navigation(store: &dyn DocumentStore, title: &str) -> Result<(), DocumentStoreError> {
    let mut entries = match store.get_data(NAVIGATION_HISTORY_KEY) {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };
    entries.push(serde_json::json!({ "title": title }));
    store.set_data(NAVIGATION_HISTORY_KEY, Value::Array(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepal_registry::{ItemRegistry, RegistryFixture};
    use notepal_types::Item;
    use notepal_util::InMemoryDocumentStore;
    use serde_json::json;

    #[test]
    fn record_moves_existing_name_to_front() {
        let mut history = CommandHistory::new(vec!["Explorer".into(), "See History".into()]);
        history.record("See History");
        assert_eq!(history.names(), ["See History", "Explorer"]);
        history.record("Refresh Command Palette");
        history.record("Explorer");
        assert_eq!(history.names(), ["Explorer", "Refresh Command Palette", "See History"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn load_and_save_round_trip() {
        let store = InMemoryDocumentStore::new();
        let mut history = CommandHistory::load(&store);
        assert!(history.is_empty());
        history.record("Explorer");
        history.save(&store).unwrap();
        assert_eq!(store.get_data(COMMAND_HISTORY_KEY), Some(json!({ "history": ["Explorer"] })));
        assert_eq!(CommandHistory::load(&store).names(), ["Explorer"]);
    }

    #[test]
    fn corrupt_history_starts_empty() {
        let store = InMemoryDocumentStore::with_documents([(COMMAND_HISTORY_KEY, json!({ "history": 4 }))]);
        assert!(CommandHistory::load(&store).is_empty());
    }

    #[test]
    fn navigation_history_reverses_visits_then_appends_story() {
        let registry = ItemRegistry::from_fixture(RegistryFixture {
            items: vec![
                Item::new("A"),
                Item::new("B"),
                Item::new("C"),
                Item::new("$:/StoryList").with_field("list", "C A"),
            ],
            shadows: vec![],
        });
        let store = InMemoryDocumentStore::with_documents([(
            NAVIGATION_HISTORY_KEY,
            json!([{ "title": "A" }, { "title": "Gone" }, { "title": "B" }]),
        )]);
        assert_eq!(navigation_history(&registry, &store), vec!["B", "A", "C"]);

        record_navigation(&store, "C").unwrap();
        assert_eq!(navigation_history(&registry, &store), vec!["C", "B", "A"]);
    }
}
