//! Evaluation of filter expressions against a [`Catalog`].
//!
//! Supports the subset of the filter language the palette relies on plus a
//! handful of common list operators. Operator names that are not recognised
//! are treated as field comparisons (`[type[text/css]]`), except names
//! containing a `.`, which are rejected as unknown operators.

use notepal_types::{LIST_FIELD, QueryError, parse_string_list};
use notepal_util::{FilterOperator, FilterRun, Operand, RunPrefix, parse_filter};
use regex::RegexBuilder;

use crate::{Catalog, SYSTEM_PREFIX};

/// Evaluate `expression` and return the matching titles in order.
pub fn evaluate(catalog: &Catalog, expression: &str) -> Result<Vec<String>, QueryError> {
    let runs = parse_filter(expression).map_err(|error| QueryError::Parse(error.to_string()))?;
    let mut results: Vec<String> = Vec::new();

    for run in &runs {
        let prefix = match &run.prefix {
            RunPrefix::Named(name) => named_prefix(name)?,
            other => other.clone(),
        };
        match prefix {
            RunPrefix::And => {
                let output = evaluate_run(catalog, run, results)?;
                results = dedupe(output);
            }
            RunPrefix::Except => {
                let output = evaluate_run(catalog, run, catalog.stored_titles())?;
                results.retain(|title| !output.contains(title));
            }
            RunPrefix::Else => {
                if results.is_empty() {
                    results = dedupe(evaluate_run(catalog, run, catalog.stored_titles())?);
                }
            }
            RunPrefix::All => results.extend(evaluate_run(catalog, run, catalog.stored_titles())?),
            RunPrefix::Named(_) => {
                let output = evaluate_run(catalog, run, catalog.stored_titles())?;
                results.retain(|title| output.contains(title));
            }
            RunPrefix::Or => {
                for title in evaluate_run(catalog, run, catalog.stored_titles())? {
                    results.retain(|existing| existing != &title);
                    results.push(title);
                }
            }
        }
    }

    Ok(results)
}

/// Map named prefixes onto their symbolic equivalents. `:intersection` stays named.
fn named_prefix(name: &str) -> Result<RunPrefix, QueryError> {
    let base = name.split(':').next().unwrap_or_default();
    match base {
        "or" => Ok(RunPrefix::Or),
        "and" => Ok(RunPrefix::And),
        "except" => Ok(RunPrefix::Except),
        "else" => Ok(RunPrefix::Else),
        "all" => Ok(RunPrefix::All),
        "intersection" => Ok(RunPrefix::Named(base.to_string())),
        _ => Err(QueryError::UnknownOperator(format!(":{name}"))),
    }
}

fn evaluate_run(catalog: &Catalog, run: &FilterRun, source: Vec<String>) -> Result<Vec<String>, QueryError> {
    run.operators
        .iter()
        .try_fold(source, |input, operator| apply_operator(catalog, operator, input))
}

fn apply_operator(catalog: &Catalog, operator: &FilterOperator, input: Vec<String>) -> Result<Vec<String>, QueryError> {
    let operand = resolve_operand(catalog, &operator.operand);
    let negated = operator.negated;
    let suffix = operator.suffix.as_deref().unwrap_or_default();

    let output = match operator.name.as_str() {
        "title" => {
            if negated {
                input.into_iter().filter(|title| *title != operand).collect()
            } else {
                vec![operand]
            }
        }
        "all" => all_categories(catalog, &operand, input),
        "is" => {
            let predicate = is_predicate(&operand)?;
            input
                .into_iter()
                .filter(|title| predicate(catalog, title) != negated)
                .collect()
        }
        "tags" => dedupe(
            input
                .iter()
                .flat_map(|title| catalog.get(title).map(|item| item.tags()).unwrap_or_default())
                .collect(),
        ),
        "tag" => input
            .into_iter()
            .filter(|title| catalog.get(title).is_some_and(|item| item.has_tag(&operand)) != negated)
            .collect(),
        "tagging" => dedupe(input.iter().flat_map(|title| catalog.tagged(title)).collect()),
        "search" => input
            .into_iter()
            .filter(|title| search_matches(catalog, title, &operand, suffix) != negated)
            .collect(),
        "has" => input
            .into_iter()
            .filter(|title| {
                let value = catalog.get(title).and_then(|item| item.field(&operand));
                let present = if suffix == "field" {
                    value.is_some()
                } else {
                    value.is_some_and(|value| !value.is_empty())
                };
                present != negated
            })
            .collect(),
        "list" => {
            let list = catalog
                .get(&operand)
                .and_then(|item| item.field(LIST_FIELD))
                .map(parse_string_list)
                .unwrap_or_default();
            if negated {
                input.into_iter().filter(|title| !list.contains(title)).collect()
            } else {
                list
            }
        }
        "prefix" => input
            .into_iter()
            .filter(|title| title.starts_with(&operand) != negated)
            .collect(),
        "suffix" => input
            .into_iter()
            .filter(|title| title.ends_with(&operand) != negated)
            .collect(),
        "removeprefix" => input
            .iter()
            .filter_map(|title| title.strip_prefix(operand.as_str()).map(str::to_string))
            .collect(),
        "removesuffix" => input
            .iter()
            .filter_map(|title| title.strip_suffix(operand.as_str()).map(str::to_string))
            .collect(),
        "splitbefore" => dedupe(
            input
                .iter()
                .map(|title| match title.find(operand.as_str()) {
                    Some(index) if !operand.is_empty() => title[..index + operand.len()].to_string(),
                    _ => title.clone(),
                })
                .collect(),
        ),
        "sort" => {
            let field = if operand.is_empty() { "title" } else { operand.as_str() };
            let mut sorted = input;
            sorted.sort_by_cached_key(|title| {
                catalog
                    .get(title)
                    .and_then(|item| item.field(field))
                    .map(str::to_string)
                    .unwrap_or_else(|| if field == "title" { title.clone() } else { String::new() })
                    .to_lowercase()
            });
            if negated {
                sorted.reverse();
            }
            sorted
        }
        "fields" => dedupe(
            input
                .iter()
                .filter_map(|title| catalog.get(title))
                .flat_map(|item| item.field_names().map(str::to_string).collect::<Vec<_>>())
                .collect(),
        ),
        "get" => input
            .iter()
            .filter_map(|title| catalog.get(title).and_then(|item| item.field(&operand)).map(str::to_string))
            .collect(),
        "limit" | "first" | "last" => {
            let default_count = if operator.name == "limit" { usize::MAX } else { 1 };
            let count = operand.trim().parse::<usize>().unwrap_or(default_count);
            let from_end = (operator.name == "last") != negated;
            if from_end {
                let skip = input.len().saturating_sub(count);
                input.into_iter().skip(skip).collect()
            } else {
                input.into_iter().take(count).collect()
            }
        }
        "reverse" => input.into_iter().rev().collect(),
        "count" => vec![input.len().to_string()],
        "regexp" => {
            let field = if suffix.is_empty() { "title" } else { suffix };
            let pattern = RegexBuilder::new(&operand)
                .build()
                .map_err(|error| QueryError::Parse(error.to_string()))?;
            input
                .into_iter()
                .filter(|title| field_value(catalog, title, field).is_some_and(|value| pattern.is_match(&value)) != negated)
                .collect()
        }
        "field" => field_equals(catalog, input, suffix, &operand, negated),
        name if name.contains('.') => return Err(QueryError::UnknownOperator(name.to_string())),
        name => field_equals(catalog, input, name, &operand, negated),
    };
    Ok(output)
}

fn resolve_operand(catalog: &Catalog, operand: &Operand) -> String {
    match operand {
        Operand::Literal(text) | Operand::Regex(text) => text.clone(),
        Operand::Indirect(reference) => {
            let (title, field) = reference.split_once("!!").unwrap_or((reference.as_str(), "text"));
            catalog
                .get(title)
                .and_then(|item| item.field(field))
                .unwrap_or_default()
                .to_string()
        }
        // No variable scope exists outside of a rendering context.
        Operand::Variable(_) => String::new(),
    }
}

fn all_categories(catalog: &Catalog, categories: &str, input: Vec<String>) -> Vec<String> {
    if categories.is_empty() {
        return input;
    }
    let mut output = Vec::new();
    for category in categories.split('+') {
        match category {
            "tiddlers" => output.extend(catalog.stored_titles()),
            "shadows" => output.extend(catalog.shadow_titles()),
            "tags" => output.extend(catalog.all_tags()),
            "current" => output.extend(input.iter().cloned()),
            _ => {}
        }
    }
    dedupe(output)
}

type Predicate = fn(&Catalog, &str) -> bool;

fn is_predicate(kind: &str) -> Result<Predicate, QueryError> {
    let predicate: Predicate = match kind {
        "system" => |_, title| title.starts_with(SYSTEM_PREFIX),
        "shadow" => |catalog, title| catalog.is_shadow(title),
        "tiddler" => |catalog, title| catalog.is_stored(title),
        "missing" => |catalog, title| !catalog.exists(title),
        "tag" => |catalog, title| !catalog.tagged(title).is_empty(),
        "draft" => |catalog, title| catalog.get(title).is_some_and(|item| item.field("draft.of").is_some()),
        other => return Err(QueryError::UnknownOperator(format!("is[{other}]"))),
    };
    Ok(predicate)
}

/// Case-insensitive word search. Every term must occur in at least one searched field.
fn search_matches(catalog: &Catalog, title: &str, terms: &str, suffix: &str) -> bool {
    let mut parts = suffix.split(':');
    let field_list = parts.next().unwrap_or_default();
    let literal = parts.any(|flag| flag.split(',').any(|flag| flag == "literal"));

    let fields: Vec<&str> = if field_list.is_empty() {
        vec!["title", "text", "tags"]
    } else {
        field_list.split(',').collect()
    };
    let haystacks: Vec<String> = fields
        .iter()
        .filter_map(|field| field_value(catalog, title, field))
        .map(|value| value.to_lowercase())
        .collect();

    let lowered = terms.to_lowercase();
    let needles: Vec<&str> = if literal {
        vec![lowered.as_str()]
    } else {
        lowered.split_whitespace().collect()
    };
    needles
        .iter()
        .all(|needle| haystacks.iter().any(|haystack| haystack.contains(needle)))
}

fn field_value(catalog: &Catalog, title: &str, field: &str) -> Option<String> {
    match catalog.get(title) {
        Some(item) => item.field(field).map(str::to_string),
        None if field == "title" => Some(title.to_string()),
        None => None,
    }
}

fn field_equals(catalog: &Catalog, input: Vec<String>, field: &str, value: &str, negated: bool) -> Vec<String> {
    input
        .into_iter()
        .filter(|title| (field_value(catalog, title, field).unwrap_or_default() == value) != negated)
        .collect()
}

fn dedupe(titles: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(titles.len());
    for title in titles {
        if !unique.contains(&title) {
            unique.push(title);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemRegistry, RegistryFixture};
    use notepal_types::{Item, Repository};

    fn registry() -> ItemRegistry {
        ItemRegistry::from_fixture(RegistryFixture {
            items: vec![
                Item::new("Home").with_field("tags", "welcome").with_field("text", "Start here"),
                Item::new("Plan").with_field("tags", "work [[side project]]").with_field("text", "Roadmap"),
                Item::new("Notes").with_field("tags", "work").with_field("draft.of", ""),
                Item::new("$:/config/Thing").with_field("tags", "$:/tags/Config"),
                Item::new("$:/StoryList").with_field("list", "Plan Home"),
            ],
            shadows: vec![
                Item::new("$:/core/ui/A").with_field("tags", "$:/tags/Shadowed"),
                Item::new("$:/core/ui/B/C"),
            ],
        })
    }

    fn query(expression: &str) -> Vec<String> {
        registry().filter_query(expression).expect("query succeeds")
    }

    #[test]
    fn tag_listing_queries() {
        assert_eq!(
            query("[!is[system]tags[]][is[system]tags[]][all[shadows]tags[]]"),
            vec!["welcome", "work", "side project", "$:/tags/Config", "$:/tags/Shadowed"]
        );
        assert_eq!(query("[all[]tags[]!is[system]search[pro]]"), vec!["side project"]);
    }

    #[test]
    fn tag_and_search_combined() {
        assert_eq!(query("[all[tiddlers+system+shadows]tag[work]search[road]]"), vec!["Plan"]);
        assert_eq!(query("[all[tiddlers+system+shadows]tag[work]]"), vec!["Plan", "Notes"]);
        assert_eq!(query("[search:title[ho]]"), vec!["Home"]);
    }

    #[test]
    fn title_and_fields() {
        assert_eq!(query("[[Plan]fields[]]"), vec!["title", "tags", "text"]);
        assert_eq!(query("[[Missing]fields[]]"), Vec::<String>::new());
    }

    #[test]
    fn prefixed_runs() {
        assert_eq!(
            query("[!is[system]tags[]] [is[system]tags[]] -[[Plan]tags[]] +[search[]]"),
            vec!["welcome", "$:/tags/Config"]
        );
        assert_eq!(query("[[a]] ~[[b]]"), vec!["a"]);
        assert_eq!(query("[tag[nothing]] ~[[b]]"), vec!["b"]);
        assert_eq!(query("[[a]] =[[a]]"), vec!["a", "a"]);
        assert_eq!(query("[[a]] [[b]] [[a]]"), vec!["b", "a"]);
    }

    #[test]
    fn explorer_query_splits_namespaces() {
        assert_eq!(
            query("[all[tiddlers+shadows]removeprefix[$:/]splitbefore[/]sort[]search[]]"),
            vec!["config/", "core/", "StoryList"]
        );
        assert_eq!(query("[all[shadows]removeprefix[$:/core/ui/]splitbefore[/]sort[]]"), vec!["A", "B/"]);
    }

    #[test]
    fn list_and_has_operators() {
        assert_eq!(query("[list[$:/StoryList]]"), vec!["Plan", "Home"]);
        assert_eq!(query("[has:field[draft.of]]"), vec!["Notes"]);
        assert_eq!(query("[has[draft.of]]"), Vec::<String>::new());
    }

    #[test]
    fn limit_sort_and_field_fallback() {
        assert_eq!(query("[!is[system]sort[]limit[2]]"), vec!["Home", "Notes"]);
        assert_eq!(query("[!is[system]!sort[]first[]]"), vec!["Plan"]);
        assert_eq!(query("[text[Roadmap]]"), vec!["Plan"]);
    }

    #[test]
    fn errors_surface_as_query_errors() {
        let registry = registry();
        assert!(matches!(registry.filter_query("[tag[work]"), Err(QueryError::Parse(_))));
        assert!(matches!(registry.filter_query("[is[bogus]]"), Err(QueryError::UnknownOperator(_))));
        assert!(matches!(registry.filter_query("[draft.of[x]]"), Err(QueryError::UnknownOperator(_))));
    }
}
