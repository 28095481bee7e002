use std::sync::Mutex;

use indexmap::IndexMap;
use notepal_types::{Item, LIST_FIELD, QueryError, Repository, parse_string_list, stringify_string_list};
use tracing::{debug, warn};

use crate::{RegistryFixture, filter};

/// Title of the item listing the currently open story, top first.
pub const STORY_LIST_TITLE: &str = "$:/StoryList";

/// Prefix marking system items.
pub const SYSTEM_PREFIX: &str = "$:/";

/// Snapshot of stored and shadow items used by the filter evaluator.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Items created or modified by the user, in insertion order.
    pub items: IndexMap<String, Item>,
    /// Built-in items that exist without being stored.
    pub shadows: IndexMap<String, Item>,
}

impl Catalog {
    /// Stored item, falling back to the shadow with the same title.
    pub fn get(&self, title: &str) -> Option<&Item> {
        self.items.get(title).or_else(|| self.shadows.get(title))
    }

    pub fn is_stored(&self, title: &str) -> bool {
        self.items.contains_key(title)
    }

    pub fn is_shadow(&self, title: &str) -> bool {
        self.shadows.contains_key(title)
    }

    pub fn exists(&self, title: &str) -> bool {
        self.is_stored(title) || self.is_shadow(title)
    }

    pub fn stored_titles(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn shadow_titles(&self) -> Vec<String> {
        self.shadows.keys().cloned().collect()
    }

    /// Every visible item: stored items plus shadows that are not overridden.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.items
            .values()
            .chain(self.shadows.values().filter(|shadow| !self.items.contains_key(&shadow.title)))
    }

    /// Titles tagged with `tag`, ordered by the tag item's `list` field and then by title.
    pub fn tagged(&self, tag: &str) -> Vec<String> {
        let mut titles: Vec<String> = self
            .visible_items()
            .filter(|item| item.has_tag(tag))
            .map(|item| item.title.clone())
            .collect();
        titles.sort_by_key(|title| title.to_lowercase());

        let Some(order) = self.get(tag).and_then(|item| item.field(LIST_FIELD)).map(parse_string_list) else {
            return titles;
        };
        let mut ordered: Vec<String> = order.into_iter().filter(|title| titles.contains(title)).collect();
        for title in titles {
            if !ordered.contains(&title) {
                ordered.push(title);
            }
        }
        ordered
    }

    /// Every tag used by any visible item, in first-seen order.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for item in self.visible_items() {
            for tag in item.tags() {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        tags
    }
}

/// In-memory repository of wiki items.
///
/// The registry owns its synchronization so it can be shared between the
/// palette engine and the host that applies effects.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    catalog: Mutex<Catalog>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed fixture. Later duplicates replace earlier ones.
    pub fn from_fixture(fixture: RegistryFixture) -> Self {
        let mut catalog = Catalog::default();
        for item in fixture.items {
            catalog.items.insert(item.title.clone(), item);
        }
        for shadow in fixture.shadows {
            catalog.shadows.insert(shadow.title.clone(), shadow);
        }
        debug!(items = catalog.items.len(), shadows = catalog.shadows.len(), "Built item registry");
        Self {
            catalog: Mutex::new(catalog),
        }
    }

    /// A copy of the current catalog.
    pub fn snapshot(&self) -> Catalog {
        self.catalog.lock().expect("item registry lock poisoned").clone()
    }

    /// Insert or replace a stored item.
    pub fn insert(&self, item: Item) {
        let mut catalog = self.catalog.lock().expect("item registry lock poisoned");
        catalog.items.insert(item.title.clone(), item);
    }

    /// Add `tag` to the item. Modifying a shadow stores an overriding copy.
    ///
    /// Returns `false` when the item does not exist or already carries the tag.
    pub fn add_tag(&self, title: &str, tag: &str) -> bool {
        self.update_tags(title, |tags| {
            if tags.iter().any(|existing| existing == tag) {
                return false;
            }
            tags.push(tag.to_string());
            true
        })
    }

    /// Remove `tag` from the item. Returns `false` when nothing changed.
    pub fn remove_tag(&self, title: &str, tag: &str) -> bool {
        self.update_tags(title, |tags| {
            let before = tags.len();
            tags.retain(|existing| existing != tag);
            tags.len() != before
        })
    }

    fn update_tags(&self, title: &str, update: impl FnOnce(&mut Vec<String>) -> bool) -> bool {
        let mut catalog = self.catalog.lock().expect("item registry lock poisoned");
        let Some(mut item) = catalog.get(title).cloned() else {
            warn!(title, "Cannot change tags of a missing item");
            return false;
        };
        let mut tags = item.tags();
        if !update(&mut tags) {
            return false;
        }
        item.set_tags(&tags);
        catalog.items.insert(title.to_string(), item);
        true
    }

    /// Move `title` to the top of the story list.
    pub fn open_in_story(&self, title: &str) {
        let mut catalog = self.catalog.lock().expect("item registry lock poisoned");
        let mut story = catalog.get(STORY_LIST_TITLE).cloned().unwrap_or_else(|| Item::new(STORY_LIST_TITLE));
        let mut list = story.field(LIST_FIELD).map(parse_string_list).unwrap_or_default();
        list.retain(|entry| entry != title);
        list.insert(0, title.to_string());
        story.fields.insert(LIST_FIELD.to_string(), stringify_string_list(&list));
        catalog.items.insert(STORY_LIST_TITLE.to_string(), story);
    }
}

impl Repository for ItemRegistry {
    fn filter_query(&self, expression: &str) -> Result<Vec<String>, QueryError> {
        let catalog = self.catalog.lock().expect("item registry lock poisoned");
        filter::evaluate(&catalog, expression)
    }

    fn items_by_tag(&self, tag: &str) -> Vec<String> {
        self.catalog.lock().expect("item registry lock poisoned").tagged(tag)
    }

    fn get_item(&self, title: &str) -> Option<Item> {
        self.catalog.lock().expect("item registry lock poisoned").get(title).cloned()
    }

    fn item_or_shadow_exists(&self, title: &str) -> bool {
        self.catalog.lock().expect("item registry lock poisoned").exists(title)
    }

    fn list_fields(&self) -> Vec<String> {
        let catalog = self.catalog.lock().expect("item registry lock poisoned");
        let mut fields: Vec<String> = Vec::new();
        for item in catalog.visible_items() {
            for name in item.field_names() {
                if !fields.iter().any(|existing| existing == name) {
                    fields.push(name.to_string());
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ItemRegistry {
        ItemRegistry::from_fixture(RegistryFixture {
            items: vec![
                Item::new("Alpha").with_field("tags", "work"),
                Item::new("beta").with_field("tags", "work home"),
                Item::new("work").with_field("list", "beta"),
            ],
            shadows: vec![Item::new("$:/theme").with_field("tags", "$:/tags/Theme")],
        })
    }

    #[test]
    fn tagged_respects_tag_list_order() {
        assert_eq!(registry().items_by_tag("work"), vec!["beta", "Alpha"]);
    }

    #[test]
    fn add_tag_to_shadow_stores_override() {
        let registry = registry();
        assert!(registry.add_tag("$:/theme", "$:/tags/Stylesheet"));
        assert!(!registry.add_tag("$:/theme", "$:/tags/Stylesheet"));
        let catalog = registry.snapshot();
        assert!(catalog.is_stored("$:/theme"));
        assert!(catalog.get("$:/theme").unwrap().has_tag("$:/tags/Stylesheet"));
    }

    #[test]
    fn remove_tag_reports_changes() {
        let registry = registry();
        assert!(registry.remove_tag("beta", "home"));
        assert!(!registry.remove_tag("beta", "home"));
        assert!(!registry.remove_tag("missing", "home"));
        assert_eq!(registry.get_item("beta").unwrap().tags(), vec!["work"]);
    }

    #[test]
    fn open_in_story_moves_title_to_top() {
        let registry = registry();
        registry.open_in_story("Alpha");
        registry.open_in_story("beta");
        registry.open_in_story("Alpha");
        let story = registry.get_item(STORY_LIST_TITLE).unwrap();
        assert_eq!(story.field(LIST_FIELD), Some("Alpha beta"));
    }

    #[test]
    fn list_fields_is_deduplicated() {
        let fields = registry().list_fields();
        assert_eq!(fields, vec!["title", "tags", "list"]);
    }
}
