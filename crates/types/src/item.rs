//! Repository items and the bracketed string-list format used by list fields.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field holding an item's body text.
pub const TEXT_FIELD: &str = "text";
/// Field holding an item's tags as a string list.
pub const TAGS_FIELD: &str = "tags";
/// Field holding an ordered list of titles (story list, tag ordering).
pub const LIST_FIELD: &str = "list";

/// A single stored item (a note) with its string fields.
///
/// The title is kept separately from the remaining fields; every other field,
/// including `text` and `tags`, lives in `fields` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Canonical identifier of the item.
    pub title: String,
    /// All other fields keyed by name.
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style helper for assigning a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a field, treating `title` as a field as well.
    pub fn field(&self, name: &str) -> Option<&str> {
        if name == "title" {
            return Some(self.title.as_str());
        }
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the body text, or an empty string when the item has none.
    pub fn text(&self) -> &str {
        self.field(TEXT_FIELD).unwrap_or_default()
    }

    /// Parsed tags of the item.
    pub fn tags(&self) -> Vec<String> {
        self.field(TAGS_FIELD).map(parse_string_list).unwrap_or_default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|candidate| candidate == tag)
    }

    /// Replace the tag list with the provided tags.
    pub fn set_tags(&mut self, tags: &[String]) {
        self.fields.insert(TAGS_FIELD.to_string(), stringify_string_list(tags));
    }

    /// Names of all fields present on the item, `title` first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once("title").chain(self.fields.keys().map(String::as_str))
    }
}

/// Parse a space separated list where entries containing spaces are wrapped in `[[...]]`.
///
/// ```rust
/// use notepal_types::parse_string_list;
///
/// assert_eq!(parse_string_list("one [[two words]] three"), vec!["one", "two words", "three"]);
/// ```
pub fn parse_string_list(value: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut rest = value.trim_start();
    while !rest.is_empty() {
        if let Some(bracketed) = rest.strip_prefix("[[") {
            match bracketed.find("]]") {
                Some(end) => {
                    push_unique(&mut entries, &bracketed[..end]);
                    rest = bracketed[end + 2..].trim_start();
                }
                None => {
                    push_unique(&mut entries, bracketed);
                    break;
                }
            }
            continue;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        push_unique(&mut entries, &rest[..end]);
        rest = rest[end..].trim_start();
    }
    entries
}

/// Inverse of [`parse_string_list`].
pub fn stringify_string_list<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            if entry.contains(char::is_whitespace) {
                format!("[[{entry}]]")
            } else {
                entry.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_unique(entries: &mut Vec<String>, entry: &str) {
    if entry.is_empty() || entries.iter().any(|existing| existing == entry) {
        return;
    }
    entries.push(entry.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_entries_and_drops_duplicates() {
        let parsed = parse_string_list("  alpha [[beta gamma]] alpha [[delta]]");
        assert_eq!(parsed, vec!["alpha", "beta gamma", "delta"]);
    }

    #[test]
    fn unterminated_bracket_takes_the_remainder() {
        assert_eq!(parse_string_list("a [[b c"), vec!["a", "b c"]);
    }

    #[test]
    fn stringify_wraps_entries_with_spaces() {
        let value = stringify_string_list(&["work", "to do"]);
        assert_eq!(value, "work [[to do]]");
        assert_eq!(parse_string_list(&value), vec!["work", "to do"]);
    }

    #[test]
    fn item_deserializes_flattened_fields() {
        let item: Item = serde_json::from_str(r#"{"title":"Note","tags":"work [[side project]]","text":"body"}"#).unwrap();
        assert_eq!(item.title, "Note");
        assert_eq!(item.text(), "body");
        assert_eq!(item.tags(), vec!["work", "side project"]);
        assert!(item.has_tag("work"));
        assert_eq!(item.field("title"), Some("Note"));
    }

    #[test]
    fn item_deserializes_from_yaml() {
        let item: Item = serde_yaml::from_str("title: Journal\ntags: daily\ncreated: '20240102030405006'\n").unwrap();
        assert_eq!(item.field("created"), Some("20240102030405006"));
        assert_eq!(item.field_names().collect::<Vec<_>>(), vec!["title", "tags", "created"]);
    }
}
