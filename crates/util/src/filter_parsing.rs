//! # Filter Expression Parsing
//!
//! Parses the bracketed filter language used to query the repository:
//!
//! ```text
//! [tag[work]!is[system]search[draft]] -[[Archive]] +[sort[]]
//! ```
//!
//! A filter is a sequence of runs. Each run has an optional prefix (`+`, `-`,
//! `~`, `=` or a named `:prefix`) followed by either a bracketed step made of
//! operators, a quoted title, or a bare title. Operators carry an optional `!`
//! negation, an optional `:suffix`, and one operand delimited by `[]`
//! (literal), `{}` (indirect), `<>` (variable) or `//` (regular expression).
//! An operator with an empty name is the `title` operator, so `[[Some Title]]`
//! is a step selecting a single title.

use thiserror::Error;

/// Errors raised for malformed filter expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    /// An operator name was not followed by an operand bracket.
    #[error("missing [ in filter expression at {position}")]
    MissingOperand { position: usize },
    /// An operand was never closed.
    #[error("missing closing bracket in filter expression at {position}")]
    UnclosedOperand { position: usize },
    /// A bracketed step was never closed.
    #[error("missing ] in filter expression at {position}")]
    UnclosedStep { position: usize },
    /// A quoted title was never closed.
    #[error("unterminated quote in filter expression at {position}")]
    UnterminatedQuote { position: usize },
    /// A run prefix was not followed by a step or title.
    #[error("expected a filter step after prefix at {position}")]
    DanglingPrefix { position: usize },
}

/// How a run combines with the results accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPrefix {
    /// No prefix: union, de-duplicated.
    Or,
    /// `+`: the run receives the accumulated results as input and replaces them.
    And,
    /// `-`: remove the run's results from the accumulated results.
    Except,
    /// `~`: only evaluated when nothing has been accumulated.
    Else,
    /// `=`: append without de-duplication.
    All,
    /// `:name` style prefixes.
    Named(String),
}

/// An operator operand together with its delimiter kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(String),
    Indirect(String),
    Variable(String),
    Regex(String),
}

impl Operand {
    /// Raw operand text, whatever its delimiter.
    pub fn text(&self) -> &str {
        match self {
            Operand::Literal(text) | Operand::Indirect(text) | Operand::Variable(text) | Operand::Regex(text) => text,
        }
    }
}

/// A single operator inside a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOperator {
    pub name: String,
    pub suffix: Option<String>,
    pub negated: bool,
    pub operand: Operand,
}

impl FilterOperator {
    fn title(title: impl Into<String>) -> Self {
        Self {
            name: "title".to_string(),
            suffix: None,
            negated: false,
            operand: Operand::Literal(title.into()),
        }
    }
}

/// One run of a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRun {
    pub prefix: RunPrefix,
    pub operators: Vec<FilterOperator>,
}

/// Parse a filter expression into runs.
///
/// # Example
/// ```rust
/// use notepal_util::filter_parsing::{parse_filter, RunPrefix};
///
/// let runs = parse_filter("[[Home]fields[]] -[tag[draft]]").unwrap();
/// assert_eq!(runs.len(), 2);
/// assert_eq!(runs[0].operators[0].name, "title");
/// assert_eq!(runs[0].operators[1].name, "fields");
/// assert_eq!(runs[1].prefix, RunPrefix::Except);
/// ```
pub fn parse_filter(input: &str) -> Result<Vec<FilterRun>, FilterParseError> {
    let bytes = input.as_bytes();
    let mut runs = Vec::new();
    let mut position = 0usize;

    loop {
        position = skip_whitespace(bytes, position);
        if position >= bytes.len() {
            break;
        }

        let prefix_start = position;
        let (prefix, after_prefix) = parse_prefix(input, position);
        position = after_prefix;
        if position >= bytes.len() || bytes[position].is_ascii_whitespace() {
            return Err(FilterParseError::DanglingPrefix { position: prefix_start });
        }

        let (operators, next) = match bytes[position] {
            b'[' => parse_step(input, position + 1)?,
            quote @ (b'"' | b'\'') => {
                let start = position + 1;
                let end = find_byte(bytes, quote, start).ok_or(FilterParseError::UnterminatedQuote { position })?;
                (vec![FilterOperator::title(&input[start..end])], end + 1)
            }
            _ => {
                let start = position;
                let mut end = start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'[' && bytes[end] != b']' {
                    end += 1;
                }
                if end == start {
                    return Err(FilterParseError::UnclosedStep { position });
                }
                (vec![FilterOperator::title(&input[start..end])], end)
            }
        };
        runs.push(FilterRun { prefix, operators });
        position = next;
    }

    Ok(runs)
}

fn parse_prefix(input: &str, position: usize) -> (RunPrefix, usize) {
    let bytes = input.as_bytes();
    match bytes.get(position) {
        Some(b'+') => (RunPrefix::And, position + 1),
        Some(b'-') => (RunPrefix::Except, position + 1),
        Some(b'~') => (RunPrefix::Else, position + 1),
        Some(b'=') => (RunPrefix::All, position + 1),
        Some(b':') => {
            let start = position + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'_' | b':' | b',')) {
                end += 1;
            }
            (RunPrefix::Named(input[start..end].to_string()), end)
        }
        _ => (RunPrefix::Or, position),
    }
}

/// Parse operators of a step starting just after its opening `[`.
fn parse_step(input: &str, mut position: usize) -> Result<(Vec<FilterOperator>, usize), FilterParseError> {
    let bytes = input.as_bytes();
    let mut operators = Vec::new();

    loop {
        let mut negated = false;
        if bytes.get(position) == Some(&b'!') {
            negated = true;
            position += 1;
        }

        let bracket_position = bytes[position.min(bytes.len())..]
            .iter()
            .position(|byte| matches!(byte, b'[' | b'{' | b'<' | b'/'))
            .map(|offset| position + offset)
            .ok_or(FilterParseError::MissingOperand { position })?;

        let full_name = &input[position..bracket_position];
        let (name, suffix) = match full_name.split_once(':') {
            Some((name, suffix)) => (name, Some(suffix.to_string())),
            None => (full_name, None),
        };
        let name = if name.is_empty() { "title" } else { name };

        let closing = match bytes[bracket_position] {
            b'[' => b']',
            b'{' => b'}',
            b'<' => b'>',
            _ => b'/',
        };
        let operand_start = bracket_position + 1;
        let operand_end = find_byte(bytes, closing, operand_start).ok_or(FilterParseError::UnclosedOperand {
            position: bracket_position,
        })?;
        let text = input[operand_start..operand_end].to_string();
        let operand = match bytes[bracket_position] {
            b'[' => Operand::Literal(text),
            b'{' => Operand::Indirect(text),
            b'<' => Operand::Variable(text),
            _ => Operand::Regex(text),
        };
        operators.push(FilterOperator {
            name: name.to_string(),
            suffix,
            negated,
            operand,
        });

        position = operand_end + 1;
        if matches!(closing, b'/') && bytes.get(position) == Some(&b'(') {
            // regular expression flags, e.g. /abc/(i)
            position = find_byte(bytes, b')', position).map(|end| end + 1).unwrap_or(bytes.len());
        }
        match bytes.get(position) {
            Some(b']') => return Ok((operators, position + 1)),
            Some(_) => continue,
            None => return Err(FilterParseError::UnclosedStep { position }),
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut position: usize) -> usize {
    while position < bytes.len() && bytes[position].is_ascii_whitespace() {
        position += 1;
    }
    position
}

fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes.get(from..)?.iter().position(|byte| *byte == needle).map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(run: &FilterRun) -> Vec<&str> {
        run.operators.iter().map(|operator| operator.name.as_str()).collect()
    }

    #[test]
    fn parses_title_and_fields_run() {
        let runs = parse_filter("[[My Note]fields[]]").unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(names(&runs[0]), vec!["title", "fields"]);
        assert_eq!(runs[0].operators[0].operand.text(), "My Note");
    }

    #[test]
    fn parses_prefixes_negation_and_suffixes() {
        let runs = parse_filter("[!is[system]search:title[abc]] +[sort[]] -[[x]] ~[tag[y]] =z :filter[a[b]]").unwrap();
        let prefixes: Vec<_> = runs.iter().map(|run| run.prefix.clone()).collect();
        assert_eq!(
            prefixes,
            vec![
                RunPrefix::Or,
                RunPrefix::And,
                RunPrefix::Except,
                RunPrefix::Else,
                RunPrefix::All,
                RunPrefix::Named("filter".into())
            ]
        );
        let first = &runs[0].operators;
        assert!(first[0].negated);
        assert_eq!(first[0].operand.text(), "system");
        assert_eq!(first[1].name, "search");
        assert_eq!(first[1].suffix.as_deref(), Some("title"));
        assert_eq!(runs[4].operators[0].operand.text(), "z");
    }

    #[test]
    fn parses_quoted_and_bare_titles() {
        let runs = parse_filter(r#""two words" 'single' bare"#).unwrap();
        let titles: Vec<_> = runs.iter().map(|run| run.operators[0].operand.text().to_string()).collect();
        assert_eq!(titles, vec!["two words", "single", "bare"]);
    }

    #[test]
    fn parses_other_operand_kinds() {
        let runs = parse_filter("[tag{Current}get<field>regexp/^a.*/(i)]").unwrap();
        let operators = &runs[0].operators;
        assert_eq!(operators[0].operand, Operand::Indirect("Current".into()));
        assert_eq!(operators[1].operand, Operand::Variable("field".into()));
        assert_eq!(operators[2].operand, Operand::Regex("^a.*".into()));
    }

    #[test]
    fn reports_unclosed_steps() {
        assert!(matches!(parse_filter("[tag[work]"), Err(FilterParseError::UnclosedStep { .. })));
        assert!(matches!(parse_filter("[tag[work"), Err(FilterParseError::UnclosedOperand { .. })));
        assert!(matches!(parse_filter("[tag"), Err(FilterParseError::MissingOperand { .. })));
        assert!(matches!(parse_filter("\"open"), Err(FilterParseError::UnterminatedQuote { .. })));
        assert!(matches!(parse_filter("+ [x]"), Err(FilterParseError::DanglingPrefix { .. })));
    }

    #[test]
    fn empty_input_has_no_runs() {
        assert!(parse_filter("   ").unwrap().is_empty());
    }
}
