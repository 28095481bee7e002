use indexmap::IndexSet;

use notepal_types::NewItem;

use crate::engine::PaletteEngine;
use crate::history::navigation_history;
use crate::providers::parse_tags;
use crate::results::ResultRow;

impl PaletteEngine {
    /// Item search through the search steps; history when nothing is typed.
    pub(crate) fn default_provider(&mut self, terms: &str) {
        self.set_hint("Search tiddlers (⇧⏎ to create)");
        let terms = terms.strip_prefix('\\').unwrap_or(terms);

        let rows = if terms.is_empty() {
            if self.settings.show_history_on_open {
                navigation_history(self.repository.as_ref(), self.store.as_ref())
                    .into_iter()
                    .map(|title| ResultRow::new(title).with_hint("history"))
                    .collect()
            } else {
                Vec::new()
            }
        } else {
            let mut seen = IndexSet::new();
            let mut rows = Vec::new();
            for step in &self.search_steps {
                for title in step.run(self.repository.as_ref(), terms) {
                    if seen.insert(title.clone()) {
                        rows.push(ResultRow::new(title).with_hint(step.hint.clone()));
                    }
                }
            }
            rows
        };
        self.show(rows);
    }

    /// Navigate to the selection; Shift creates an item from the input instead.
    pub(crate) fn default_resolver(&mut self, shift: bool) {
        if shift {
            self.input = format!("+{}", self.input);
            self.create_item_resolver();
            return;
        }
        let Some(title) = self.results.selected().map(|row| row.name.clone()) else {
            return;
        };
        self.close();
        self.navigate(&title);
    }

    /// Create an item from `+title @tag...`.
    pub(crate) fn create_item_resolver(&mut self) {
        let typed: String = self.input.chars().skip(1).collect();
        let query = parse_tags(&typed);
        self.create_item(NewItem {
            title: query.search_terms.join(" "),
            tags: query.tags.join(" "),
            fields: Default::default(),
        });
        self.close();
    }
}
