//! # Text Processing Utilities
//!
//! Small string helpers shared by the palette providers: command text
//! extraction, hint previews and caret-safe splicing.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthChar;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\n|\r").expect("valid line break pattern"));

/// Suffix appended to truncated hints.
pub const ELLIPSIS: &str = "...";

/// Returns the first line of `text` (everything before the first line break).
///
/// # Example
/// ```rust
/// use notepal_util::text_processing::first_line;
///
/// assert_eq!(first_line("[tag[work]]\nsecond line"), "[tag[work]]");
/// assert_eq!(first_line(""), "");
/// ```
pub fn first_line(text: &str) -> &str {
    text.split(['\n', '\r']).next().unwrap_or_default()
}

/// Removes every line break from `text`.
pub fn strip_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, "").into_owned()
}

/// Shortens a field preview so that it never exceeds `max_size` characters.
///
/// When the preview is longer, it is cut to `max_size - 3` characters and
/// [`ELLIPSIS`] is appended. Line breaks are removed first.
///
/// # Arguments
/// * `text` - The raw field value
/// * `max_size` - The configured maximum hint size
///
/// # Example
/// ```rust
/// use notepal_util::text_processing::truncate_hint;
///
/// assert_eq!(truncate_hint("short", 45), "short");
/// assert_eq!(truncate_hint("abcdefghij", 8), "abcde...");
/// assert_eq!(truncate_hint("line one\nline two", 45), "line oneline two");
/// ```
pub fn truncate_hint(text: &str, max_size: usize) -> String {
    let flattened = strip_line_breaks(text);
    let keep = max_size.saturating_sub(ELLIPSIS.len());
    if flattened.chars().count() <= keep {
        return flattened;
    }
    let mut truncated: String = flattened.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Returns the portion of `path` after its last `/`.
///
/// # Example
/// ```rust
/// use notepal_util::text_processing::last_path_segment;
///
/// assert_eq!(last_path_segment("$:/plugins/notepal/Compact.css"), "Compact.css");
/// assert_eq!(last_path_segment("plain"), "plain");
/// ```
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Byte offset of the `caret`-th character, clamped to the end of `text`.
pub fn char_to_byte(text: &str, caret: usize) -> usize {
    text.char_indices().nth(caret).map(|(index, _)| index).unwrap_or(text.len())
}

/// Inserts `insert` into `text` at character position `caret`.
///
/// A caret past the end appends.
///
/// # Example
/// ```rust
/// use notepal_util::text_processing::splice_at_char;
///
/// assert_eq!(splice_at_char("[tag[]]", 5, "work"), "[tag[work]]");
/// assert_eq!(splice_at_char("héllo", 2, "-"), "hé-llo");
/// assert_eq!(splice_at_char("abc", 99, "!"), "abc!");
/// ```
pub fn splice_at_char(text: &str, caret: usize, insert: &str) -> String {
    let split = char_to_byte(text, caret);
    let mut result = String::with_capacity(text.len() + insert.len());
    result.push_str(&text[..split]);
    result.push_str(insert);
    result.push_str(&text[split..]);
    result
}

/// Truncates `text` to fit in `max_width` terminal columns, appending `…` when cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0usize;
    let mut result = String::new();
    for character in text.chars() {
        let character_width = character.width().unwrap_or(0);
        if width + character_width > max_width {
            while width + 1 > max_width {
                match result.pop() {
                    Some(last) => width -= last.width().unwrap_or(0),
                    None => break,
                }
            }
            result.push('…');
            return result;
        }
        width += character_width;
        result.push(character);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_handles_carriage_returns() {
        assert_eq!(first_line("alpha\r\nbeta"), "alpha");
    }

    #[test]
    fn strip_line_breaks_removes_all_variants() {
        assert_eq!(strip_line_breaks("a\r\nb\nc\rd"), "abcd");
    }

    #[test]
    fn truncate_hint_counts_characters_not_bytes() {
        assert_eq!(truncate_hint("ééééé", 5), "éé...");
        assert_eq!(truncate_hint("éé", 5), "éé");
    }

    #[test]
    fn truncate_hint_with_tiny_limit_keeps_ellipsis_only() {
        assert_eq!(truncate_hint("abcdef", 2), "...");
    }

    #[test]
    fn char_to_byte_clamps() {
        assert_eq!(char_to_byte("héllo", 2), 3);
        assert_eq!(char_to_byte("abc", 10), 3);
    }

    #[test]
    fn truncate_to_width_respects_columns() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 5), "hell…");
    }
}
