//! Typed palette settings.
//!
//! Settings are persisted as a flat JSON object under [`SETTINGS_KEY`] using
//! camelCase keys. Decoding happens once at load: missing keys are
//! backfilled from the defaults, `"true"`/`"false"` strings (any case) become
//! booleans, numeric strings become numbers and anything else falls back to
//! the default with a warning.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::warn;

use notepal_util::{DocumentStore, DocumentStoreError};

use crate::keys::{DEFAULT_THEME, SETTINGS_KEY};

static NUMERIC_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]*$").expect("valid numeric pattern"));
static BOOLEAN_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(true|false)$").expect("valid boolean pattern"));

/// Validation failures for typed setting input. The messages double as result rows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingError {
    #[error("Error: value must be a positive integer")]
    NotANumber { key: SettingKey, value: String },
    #[error("Error: value must be 'true' or 'false'")]
    NotABoolean { key: SettingKey, value: String },
}

/// Value type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Number,
    Boolean,
    Text,
}

/// A decoded setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Number(usize),
    Boolean(bool),
    Text(String),
}

/// Identifies one palette setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Theme,
    MaxResults,
    ShowHistoryOnOpen,
    EscapeGoesBack,
    AlwaysPassSelection,
    NeverBasic,
    MaxResultHintSize,
}

impl SettingKey {
    /// Every setting, in persisted order.
    pub const ALL: [SettingKey; 7] = [
        SettingKey::MaxResults,
        SettingKey::MaxResultHintSize,
        SettingKey::NeverBasic,
        SettingKey::ShowHistoryOnOpen,
        SettingKey::EscapeGoesBack,
        SettingKey::AlwaysPassSelection,
        SettingKey::Theme,
    ];

    /// Settings edited through the text editor, in the order the settings list shows them.
    pub const EDITABLE: [SettingKey; 6] = [
        SettingKey::MaxResults,
        SettingKey::ShowHistoryOnOpen,
        SettingKey::EscapeGoesBack,
        SettingKey::AlwaysPassSelection,
        SettingKey::NeverBasic,
        SettingKey::MaxResultHintSize,
    ];

    pub fn json_key(self) -> &'static str {
        match self {
            SettingKey::Theme => "theme",
            SettingKey::MaxResults => "maxResults",
            SettingKey::ShowHistoryOnOpen => "showHistoryOnOpen",
            SettingKey::EscapeGoesBack => "escapeGoesBack",
            SettingKey::AlwaysPassSelection => "alwaysPassSelection",
            SettingKey::NeverBasic => "neverBasic",
            SettingKey::MaxResultHintSize => "maxResultHintSize",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::Theme => "Theme",
            SettingKey::MaxResults => "Max results",
            SettingKey::ShowHistoryOnOpen => "Show history on open",
            SettingKey::EscapeGoesBack => "Escape to go back",
            SettingKey::AlwaysPassSelection => "Use selection as search query",
            SettingKey::NeverBasic => "Never Basic",
            SettingKey::MaxResultHintSize => "Field preview max size",
        }
    }

    /// Hint shown while the setting is being edited.
    pub fn prompt_hint(self) -> &'static str {
        match self {
            SettingKey::Theme => "Choose a theme",
            SettingKey::MaxResults => "Choose the maximum number of results",
            SettingKey::ShowHistoryOnOpen => "Chose whether to show the history when you open the palette",
            SettingKey::EscapeGoesBack => "Chose whether ESC should go back when possible",
            SettingKey::AlwaysPassSelection => "Chose your current selection is passed to the command palette",
            SettingKey::NeverBasic => "Chose whether to override basic prompts to show filter operation",
            SettingKey::MaxResultHintSize => "Choose the maximum hint length for field preview",
        }
    }

    pub fn kind(self) -> SettingKind {
        match self {
            SettingKey::Theme => SettingKind::Text,
            SettingKey::MaxResults | SettingKey::MaxResultHintSize => SettingKind::Number,
            _ => SettingKind::Boolean,
        }
    }

    /// Validate typed input for this setting and coerce it to a value.
    pub fn validate(self, input: &str) -> Result<SettingValue, SettingError> {
        match self.kind() {
            SettingKind::Number => {
                let parsed = NUMERIC_VALUE
                    .is_match(input)
                    .then(|| input.parse::<usize>().ok())
                    .flatten();
                parsed.map(SettingValue::Number).ok_or_else(|| SettingError::NotANumber {
                    key: self,
                    value: input.to_string(),
                })
            }
            SettingKind::Boolean => {
                if BOOLEAN_VALUE.is_match(input) {
                    Ok(SettingValue::Boolean(input.eq_ignore_ascii_case("true")))
                } else {
                    Err(SettingError::NotABoolean {
                        key: self,
                        value: input.to_string(),
                    })
                }
            }
            SettingKind::Text => Ok(SettingValue::Text(input.to_string())),
        }
    }
}

/// Palette settings with their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_results: usize,
    pub max_result_hint_size: usize,
    pub never_basic: bool,
    pub show_history_on_open: bool,
    pub escape_goes_back: bool,
    pub always_pass_selection: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: 15,
            max_result_hint_size: 45,
            never_basic: false,
            show_history_on_open: true,
            escape_goes_back: true,
            always_pass_selection: true,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl Settings {
    /// Decode a persisted settings document, backfilling and coercing values.
    pub fn decode(document: Option<&Value>) -> Self {
        let mut settings = Settings::default();
        let Some(object) = document.and_then(Value::as_object) else {
            if let Some(other) = document {
                warn!(document = %other, "Settings document is not an object; using defaults");
            }
            return settings;
        };

        for key in SettingKey::ALL {
            let Some(raw) = object.get(key.json_key()) else {
                continue;
            };
            match decode_value(key, raw) {
                Some(value) => settings.apply(key, value),
                None => warn!(setting = key.json_key(), value = %raw, "Invalid setting value; using default"),
            }
        }
        settings
    }

    /// Encode every setting for persistence.
    pub fn to_document(&self) -> Value {
        let mut object = Map::new();
        for key in SettingKey::ALL {
            let value = match self.value(key) {
                SettingValue::Number(number) => json!(number),
                SettingValue::Boolean(flag) => json!(flag),
                SettingValue::Text(text) => json!(text),
            };
            object.insert(key.json_key().to_string(), value);
        }
        Value::Object(object)
    }

    pub fn load(store: &dyn DocumentStore) -> Self {
        Self::decode(store.get_data(SETTINGS_KEY).as_ref())
    }

    pub fn save(&self, store: &dyn DocumentStore) -> Result<(), DocumentStoreError> {
        store.set_data(SETTINGS_KEY, self.to_document())
    }

    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::Theme => SettingValue::Text(self.theme.clone()),
            SettingKey::MaxResults => SettingValue::Number(self.max_results),
            SettingKey::MaxResultHintSize => SettingValue::Number(self.max_result_hint_size),
            SettingKey::NeverBasic => SettingValue::Boolean(self.never_basic),
            SettingKey::ShowHistoryOnOpen => SettingValue::Boolean(self.show_history_on_open),
            SettingKey::EscapeGoesBack => SettingValue::Boolean(self.escape_goes_back),
            SettingKey::AlwaysPassSelection => SettingValue::Boolean(self.always_pass_selection),
        }
    }

    /// Store a value. Values of the wrong kind are ignored.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) {
        match (key, value) {
            (SettingKey::Theme, SettingValue::Text(text)) => self.theme = text,
            (SettingKey::MaxResults, SettingValue::Number(number)) => self.max_results = number,
            (SettingKey::MaxResultHintSize, SettingValue::Number(number)) => self.max_result_hint_size = number,
            (SettingKey::NeverBasic, SettingValue::Boolean(flag)) => self.never_basic = flag,
            (SettingKey::ShowHistoryOnOpen, SettingValue::Boolean(flag)) => self.show_history_on_open = flag,
            (SettingKey::EscapeGoesBack, SettingValue::Boolean(flag)) => self.escape_goes_back = flag,
            (SettingKey::AlwaysPassSelection, SettingValue::Boolean(flag)) => self.always_pass_selection = flag,
            (key, value) => warn!(setting = key.json_key(), ?value, "Mismatched setting value ignored"),
        }
    }

    /// Validate and store typed input.
    pub fn set_from_input(&mut self, key: SettingKey, input: &str) -> Result<(), SettingError> {
        let value = key.validate(input)?;
        self.apply(key, value);
        Ok(())
    }

    /// Restore the default value of `key`.
    pub fn revert(&mut self, key: SettingKey) {
        self.apply(key, Settings::default().value(key));
    }

    /// Text form of the current value, as shown in the settings list and editor.
    pub fn display(&self, key: SettingKey) -> String {
        display_value(&self.value(key))
    }

    /// Text form of the default value.
    pub fn default_display(key: SettingKey) -> String {
        display_value(&Settings::default().value(key))
    }
}

fn display_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Number(number) => number.to_string(),
        SettingValue::Boolean(flag) => flag.to_string(),
        SettingValue::Text(text) => text.clone(),
    }
}

fn decode_value(key: SettingKey, raw: &Value) -> Option<SettingValue> {
    match (key.kind(), raw) {
        (SettingKind::Number, Value::Number(number)) => number
            .as_u64()
            .and_then(|number| usize::try_from(number).ok())
            .filter(|number| *number > 0)
            .map(SettingValue::Number),
        (SettingKind::Boolean, Value::Bool(flag)) => Some(SettingValue::Boolean(*flag)),
        (SettingKind::Text, Value::String(text)) => Some(SettingValue::Text(text.clone())),
        (SettingKind::Number | SettingKind::Boolean, Value::String(text)) => key.validate(text.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepal_util::InMemoryDocumentStore;

    #[test]
    fn missing_document_yields_defaults() {
        assert_eq!(Settings::decode(None), Settings::default());
    }

    #[test]
    fn string_values_are_coerced() {
        let document = json!({
            "maxResults": "20",
            "neverBasic": "TRUE",
            "showHistoryOnOpen": "False",
            "theme": "$:/themes/Dark.css"
        });
        let settings = Settings::decode(Some(&document));
        assert_eq!(settings.max_results, 20);
        assert!(settings.never_basic);
        assert!(!settings.show_history_on_open);
        assert_eq!(settings.theme, "$:/themes/Dark.css");
        assert_eq!(settings.max_result_hint_size, 45);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let document = json!({ "maxResults": "many", "escapeGoesBack": 3, "theme": false, "unknown": 1 });
        assert_eq!(Settings::decode(Some(&document)), Settings::default());
    }

    #[test]
    fn backfill_is_idempotent_across_save_and_reload() {
        let store = InMemoryDocumentStore::with_documents([(SETTINGS_KEY, json!({ "maxResults": 7 }))]);
        let first = Settings::load(&store);
        first.save(&store).unwrap();
        let second = Settings::load(&store);
        assert_eq!(first, second);
        assert_eq!(second.max_results, 7);
        assert_eq!(second.escape_goes_back, Settings::default().escape_goes_back);
        assert_eq!(store.get_data(SETTINGS_KEY).unwrap()["neverBasic"], json!(false));
    }

    #[test]
    fn persisted_zero_falls_back_to_default() {
        let document = json!({ "maxResults": 0, "maxResultHintSize": "0" });
        let settings = Settings::decode(Some(&document));
        assert_eq!(settings.max_results, 15);
        assert_eq!(settings.max_result_hint_size, 45);
    }

    #[test]
    fn validators_are_strict() {
        assert!(SettingKey::MaxResults.validate("12").is_ok());
        assert!(SettingKey::MaxResults.validate("").is_err());
        assert!(SettingKey::MaxResults.validate("-1").is_err());
        assert!(SettingKey::MaxResults.validate("1.5").is_err());
        assert!(SettingKey::MaxResults.validate("0").is_err());
        assert!(SettingKey::MaxResults.validate("007").is_err());
        assert_eq!(SettingKey::MaxResults.validate("1"), Ok(SettingValue::Number(1)));
        assert_eq!(SettingKey::NeverBasic.validate("True"), Ok(SettingValue::Boolean(true)));
        assert!(SettingKey::NeverBasic.validate("not true").is_err());
        assert!(SettingKey::NeverBasic.validate("").is_err());
    }

    #[test]
    fn error_messages_match_rows() {
        let number = SettingKey::MaxResults.validate("x").unwrap_err();
        assert_eq!(number.to_string(), "Error: value must be a positive integer");
        let boolean = SettingKey::EscapeGoesBack.validate("x").unwrap_err();
        assert_eq!(boolean.to_string(), "Error: value must be 'true' or 'false'");
    }

    #[test]
    fn revert_restores_default() {
        let mut settings = Settings::default();
        settings.set_from_input(SettingKey::MaxResults, "3").unwrap();
        assert_eq!(settings.display(SettingKey::MaxResults), "3");
        settings.revert(SettingKey::MaxResults);
        assert_eq!(settings.max_results, 15);
        assert_eq!(Settings::default_display(SettingKey::NeverBasic), "false");
    }
}
