//! Whitespace normalization.
//!
//! Runs after filtering so that gaps left by removed characters collapse too.

use crate::classify::is_space_separator;
use std::collections::BTreeSet;

/// Normalizes whitespace:
///
/// - CRLF and CR become LF
/// - Unicode space separators (NBSP, ideographic space, ...) become ASCII space
/// - runs of spaces and tabs collapse to one space
/// - trailing spaces are trimmed on every line
/// - three or more newlines collapse to a blank line
/// - the text is trimmed
///
/// # Example
///
/// ```
/// use unisweep::whitespace::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("a    b"), "a b");
/// assert_eq!(normalize_whitespace("line1\n\n\n\nline2"), "line1\n\nline2");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    normalize_whitespace_keeping(text, &BTreeSet::new())
}

/// Like [`normalize_whitespace`], but scalars in `keep` are treated as
/// content: they are never converted, merged into a run, or trimmed.
pub fn normalize_whitespace_keeping(text: &str, keep: &BTreeSet<char>) -> String {
    let kept = |c: char| keep.contains(&c);
    let mut result = String::with_capacity(text.len());
    // Spaces/tabs and line breaks seen since the last content scalar
    let mut run = String::new();
    let mut newlines = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !kept(c) {
            match c {
                '\r' | '\n' => {
                    if c == '\r' && !kept('\n') {
                        chars.next_if_eq(&'\n');
                    }
                    // Trailing spaces on the finished line are dropped
                    run.clear();
                    newlines += 1;
                    continue;
                }
                ' ' | '\t' => {
                    run.push(c);
                    continue;
                }
                c if is_space_separator(c) => {
                    run.push(' ');
                    continue;
                }
                c if c.is_whitespace() && result.is_empty() => continue,
                _ => {}
            }
        }

        if !result.is_empty() {
            for _ in 0..newlines.min(2) {
                result.push('\n');
            }
            match run.chars().count() {
                0 => {}
                1 => result.push_str(&run),
                _ => result.push(' '),
            }
        }
        run.clear();
        newlines = 0;
        result.push(c);
    }

    while result
        .chars()
        .next_back()
        .is_some_and(|c| c.is_whitespace() && !kept(c))
    {
        result.pop();
    }

    result
}
