//! Search steps used by the default provider.
//!
//! Each step is a filter template with a caret offset at which the typed
//! terms are inserted. Steps run in order and their results are concatenated.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use notepal_types::Repository;
use notepal_util::{DocumentStore, splice_at_char};

use crate::keys::SEARCH_STEPS_KEY;

/// One filter template of the default search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStep {
    pub filter: String,
    /// Character offset in `filter` where the terms are inserted.
    #[serde(deserialize_with = "caret_from_number_or_string")]
    pub caret: usize,
    #[serde(default)]
    pub hint: String,
}

#[derive(Debug, Deserialize)]
struct StepsDocument {
    steps: Vec<SearchStep>,
}

impl SearchStep {
    pub fn new(filter: impl Into<String>, caret: usize, hint: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            caret,
            hint: hint.into(),
        }
    }

    /// The filter with `terms` spliced in at the caret.
    pub fn expression(&self, terms: &str) -> String {
        splice_at_char(&self.filter, self.caret, terms)
    }

    /// Run the step, swallowing query errors.
    pub fn run(&self, repository: &dyn Repository, terms: &str) -> Vec<String> {
        let expression = self.expression(terms);
        match repository.filter_query(&expression) {
            Ok(titles) => titles,
            Err(error) => {
                debug!(filter = %expression, error = %error, "Search step failed");
                Vec::new()
            }
        }
    }
}

/// Steps used when the store holds none: title matches, then full-text matches.
pub fn default_search_steps() -> Vec<SearchStep> {
    vec![
        SearchStep::new("[!is[system]search:title[]]", 25, "Title"),
        SearchStep::new("[!is[system]search[]]", 19, "Search"),
    ]
}

/// Load the configured steps, falling back to [`default_search_steps`].
pub fn load_search_steps(store: &dyn DocumentStore) -> Vec<SearchStep> {
    let Some(document) = store.get_data(SEARCH_STEPS_KEY) else {
        return default_search_steps();
    };
    match serde_json::from_value::<StepsDocument>(document) {
        Ok(document) => document.steps,
        Err(error) => {
            warn!(error = %error, "Failed to parse search steps; using defaults");
            default_search_steps()
        }
    }
}

fn caret_from_number_or_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let caret = match &value {
        Value::Number(number) => number.as_u64().and_then(|number| usize::try_from(number).ok()),
        Value::String(text) => text.trim().parse::<usize>().ok(),
        _ => None,
    };
    caret.ok_or_else(|| serde::de::Error::custom(format!("invalid caret: {value}")))
}
