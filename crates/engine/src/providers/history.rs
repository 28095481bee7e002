use indexmap::IndexMap;

use crate::commands::HistoryMode;
use crate::engine::PaletteEngine;
use crate::history::navigation_history;
use crate::keys::{DRAFTS_FILTER, STORY_FILTER};
use crate::results::{ResultRow, RowAction};

impl PaletteEngine {
    pub(crate) fn history_titles(&self, mode: HistoryMode) -> Vec<String> {
        match mode {
            HistoryMode::Drafts => self.query(DRAFTS_FILTER),
            HistoryMode::Story => self.query(STORY_FILTER),
            HistoryMode::Navigation => navigation_history(self.repository.as_ref(), self.store.as_ref()),
        }
    }

    pub(crate) fn history_provider(&mut self, hint: &str, mode: HistoryMode) {
        self.set_hint(hint);
        let rows = self.history_titles(mode).into_iter().map(ResultRow::new).collect();
        self.show(rows);
    }

    /// Navigation history narrowed by a case-sensitive substring.
    pub(crate) fn see_history_provider(&mut self, terms: &str) {
        self.set_hint("History");
        let rows = self
            .history_titles(HistoryMode::Navigation)
            .into_iter()
            .filter(|title| title.contains(terms))
            .map(|title| {
                ResultRow::new(title.clone()).with_action(RowAction::Navigate {
                    title,
                    shift_keeps_open: false,
                })
            })
            .collect();
        self.show(rows);
    }

    /// Send `message` carrying the selected item, then close.
    pub(crate) fn history_message_resolver(&mut self, message: &str) {
        let Some(title) = self.results.selected().map(|row| row.name.clone()) else {
            return;
        };
        let mut params = IndexMap::new();
        params.insert("tiddlerTitle".to_string(), title.clone());
        self.send_message(message, Some(title), params);
        self.close();
    }
}
