use tracing::debug;

use crate::engine::PaletteEngine;
use crate::results::ResultRow;

/// `@tag` tokens and free search terms split out of a palette input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    pub tags: Vec<String>,
    pub search_terms: Vec<String>,
    /// `[all[tiddlers+system+shadows]tag[a]tag[b]search[s t]]`
    pub filter: String,
}

/// Split `input` on spaces into `@tag` tokens and search terms.
pub fn parse_tags(input: &str) -> TagQuery {
    let mut tags = Vec::new();
    let mut search_terms = Vec::new();
    for token in input.split(' ').filter(|token| !token.is_empty()) {
        match token.strip_prefix('@') {
            Some(tag) => tags.push(tag.to_string()),
            None => search_terms.push(token.to_string()),
        }
    }

    let mut filter = String::from("[all[tiddlers+system+shadows]");
    for tag in &tags {
        filter.push_str(&format!("tag[{tag}]"));
    }
    if !search_terms.is_empty() {
        filter.push_str(&format!("search[{}]", search_terms.join(" ")));
    }
    filter.push(']');

    TagQuery {
        tags,
        search_terms,
        filter,
    }
}

impl PaletteEngine {
    pub(crate) fn tag_list_provider(&mut self, terms: &str) {
        self.set_hint("Search tags");
        let filter = if terms.is_empty() {
            "[!is[system]tags[]][is[system]tags[]][all[shadows]tags[]]".to_string()
        } else {
            format!(
                "[all[]tags[]!is[system]search[{terms}]][all[]tags[]is[system]search[{terms}]][all[shadows]tags[]search[{terms}]]"
            )
        };
        let rows = self.query(&filter).into_iter().map(ResultRow::new).collect();
        self.show(rows);
    }

    /// Open the selected tag, or the typed tag when it tags anything.
    pub(crate) fn tag_list_resolver(&mut self) {
        if let Some(row) = self.results.selected() {
            let input = format!("@{}", row.display());
            self.prompt(&input, None);
            return;
        }

        let typed: String = self.input.chars().skip(1).collect();
        if self.query(&format!("[tag[{typed}]]")).is_empty() {
            debug!(tag = %typed, "Typed tag tags nothing");
            return;
        }
        self.prompt(&format!("@{typed}"), None);
    }

    pub(crate) fn tag_provider(&mut self, terms: &str) {
        self.set_hint("Search tiddlers with @tag(s)");
        let mut titles = Vec::new();
        if !terms.is_empty() {
            let query = parse_tags(&format!("@{terms}"));
            let tagged = self.query(&query.filter);
            if !tagged.is_empty() {
                if let [tag] = query.tags.as_slice()
                    && self.repository.item_or_shadow_exists(tag)
                    && query.search_terms.iter().any(|term| tag.contains(term.as_str()))
                {
                    titles.push(tag.clone());
                }
                titles.extend(tagged);
            }
        }
        let rows = titles.into_iter().map(ResultRow::new).collect();
        self.show(rows);
    }

    /// Run a filter, treating failures as no results.
    pub(crate) fn query(&self, filter: &str) -> Vec<String> {
        match self.repository.filter_query(filter) {
            Ok(titles) => titles,
            Err(error) => {
                debug!(filter, error = %error, "Filter query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_terms_are_separated() {
        let query = parse_tags("@work  road @side map");
        assert_eq!(query.tags, vec!["work", "side"]);
        assert_eq!(query.search_terms, vec!["road", "map"]);
        assert_eq!(query.filter, "[all[tiddlers+system+shadows]tag[work]tag[side]search[road map]]");
    }

    #[test]
    fn no_terms_means_no_search_operator() {
        assert_eq!(parse_tags("@work").filter, "[all[tiddlers+system+shadows]tag[work]]");
        assert_eq!(parse_tags("").filter, "[all[tiddlers+system+shadows]]");
    }
}
