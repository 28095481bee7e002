use tracing::debug;

use notepal_util::{parse_filter, truncate_hint, wiki_date_hint};

use crate::engine::PaletteEngine;
use crate::results::{ResultRow, RowAction};

impl PaletteEngine {
    /// Raw filter results, one row per classification each result matches.
    ///
    /// A result can be a date, a tag, an item and a field name at once; it is
    /// then listed once per classification, in that order.
    pub(crate) fn filter_provider(&mut self, terms: &str, hint: Option<&str>) {
        self.set_hint(hint.unwrap_or("Filter operation"));
        let expression = format!("[{terms}");
        let fields = self.repository.list_fields();
        let field_source = single_fields_title(&expression);

        let mut rows = Vec::new();
        for name in self.query(&expression) {
            let before = rows.len();

            if let Some(date) = wiki_date_hint(&name) {
                rows.push(ResultRow::new(name.clone()).with_hint(date));
            }
            if !self.repository.items_by_tag(&name).is_empty() {
                rows.push(
                    ResultRow::new(name.clone())
                        .with_hint("Tag")
                        .with_action(RowAction::Prompt(format!("@{name}"))),
                );
            }
            if self.repository.item_or_shadow_exists(&name) {
                rows.push(ResultRow::new(name.clone()).with_hint("Tiddler").with_action(RowAction::Navigate {
                    title: name.clone(),
                    shift_keeps_open: false,
                }));
            }
            if fields.contains(&name) {
                let hint = field_source
                    .as_deref()
                    .and_then(|title| self.repository.get_item(title))
                    .and_then(|item| item.field(&name).map(|value| truncate_hint(value, self.settings.max_result_hint_size)))
                    .unwrap_or_else(|| "Field".to_string());
                rows.push(ResultRow::new(name.clone()).with_hint(hint));
            }

            if rows.len() == before {
                rows.push(ResultRow::new(name));
            }
        }
        self.show(rows);
    }
}

/// The title `X` when the expression has exactly one `[title[X]fields[]]` run.
fn single_fields_title(expression: &str) -> Option<String> {
    let runs = match parse_filter(expression) {
        Ok(runs) => runs,
        Err(error) => {
            debug!(error = %error, "Filter did not parse; no field previews");
            return None;
        }
    };
    let mut titles = runs.iter().filter_map(|run| match run.operators.as_slice() {
        [title, fields] if title.name == "title" && fields.name == "fields" => Some(title.operand.text().to_string()),
        _ => None,
    });
    let first = titles.next()?;
    titles.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_title_requires_exactly_one_run() {
        assert_eq!(single_fields_title("[[Home]fields[]]").as_deref(), Some("Home"));
        assert_eq!(single_fields_title("[title[Home]fields[]]").as_deref(), Some("Home"));
        assert_eq!(single_fields_title("[[Home]fields[]] [[Plan]fields[]]"), None);
        assert_eq!(single_fields_title("[[Home]fields[]sort[]]"), None);
        assert_eq!(single_fields_title("[[Home]fields["), None);
    }
}
