//! # Markup Stripping
//!
//! Removes HTML/XML and Markdown syntax before character-level filtering.
//!
//! 1. **HTML/XML** - `<script>`/`<style>` blocks with their contents, comments,
//!    remaining tags
//! 2. **Code fences** - triple-backtick blocks, opening line through closing line
//! 3. **Markdown** - headings, blockquote markers, images, links, emphasis
//! 4. **Entities** - a single decoding pass, when HTML/XML stripping is on
//!
//! All patterns run on the `regex` crate, which guarantees linear-time
//! matching, so adversarial input cannot trigger catastrophic backtracking.
//!
//! Malformed input degrades to literal text: an unterminated fence keeps its
//! marker and contents, and an unterminated tag (`<div` with no `>`) is kept.

use crate::profile::MarkupFlags;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// HTML / XML
// ============================================================================

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());

static RE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

// `<` must be followed by a letter, `/`, `!` or `?` so that `a < b > c` survives.
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^<>]*>").unwrap());

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:amp|lt|gt|quot|apos|#39|#[xX]27);").unwrap());

/// Removes script/style blocks, comments and tags, leaving entities encoded.
fn remove_tags(text: &str) -> String {
    let without_scripts = RE_SCRIPT.replace_all(text, "");
    let without_styles = RE_STYLE.replace_all(&without_scripts, "");
    let without_comments = RE_COMMENT.replace_all(&without_styles, "");
    RE_TAG.replace_all(&without_comments, "").into_owned()
}

/// Removes script/style blocks, comments and tags, then decodes entities.
pub fn strip_html(text: &str) -> String {
    decode_entities(&remove_tags(text))
}

/// Decodes the five standard HTML entities exactly once.
///
/// The scan is a single left-to-right pass, so text produced by decoding is
/// never examined again: `&amp;lt;` becomes `&lt;`, not `<`.
///
/// # Example
///
/// ```
/// use unisweep::markup::decode_entities;
///
/// assert_eq!(decode_entities("&lt;b&gt; &amp; &#39;"), "<b> & '");
/// assert_eq!(decode_entities("&amp;lt;x&amp;gt;"), "&lt;x&gt;");
/// ```
pub fn decode_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "&amp;" => "&",
            "&lt;" => "<",
            "&gt;" => ">",
            "&quot;" => "\"",
            _ => "'",
        })
        .into_owned()
}

// ============================================================================
// Code fences
// ============================================================================

/// A slice of the input, either inside a fenced code block or outside it.
struct Segment<'a> {
    text: &'a str,
    fenced: bool,
}

fn is_fence_open(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_fence_close(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("```") && trimmed.trim_start_matches('`').is_empty()
}

/// Splits text into prose and fenced segments that concatenate back to the input.
fn split_fences(text: &str) -> Vec<Segment<'_>> {
    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut segments = Vec::new();
    let mut prose_start = 0;
    let mut i = 0;

    while i < lines.len() {
        let (start, line) = lines[i];
        if !is_fence_open(line) {
            i += 1;
            continue;
        }

        let close = (i + 1..lines.len()).find(|&j| is_fence_close(lines[j].1));
        let Some(close) = close else {
            log::debug!(
                "unterminated code fence at line {}, keeping as literal text",
                i + 1
            );
            break;
        };

        let (close_start, close_line) = lines[close];
        let end = close_start + close_line.len();
        if prose_start < start {
            segments.push(Segment {
                text: &text[prose_start..start],
                fenced: false,
            });
        }
        segments.push(Segment {
            text: &text[start..end],
            fenced: true,
        });
        prose_start = end;
        i = close + 1;
    }

    if prose_start < text.len() {
        segments.push(Segment {
            text: &text[prose_start..],
            fenced: false,
        });
    }

    segments
}

/// Removes fenced code blocks. Unterminated fences are left as literal text.
pub fn strip_code_fences(text: &str) -> String {
    split_fences(text)
        .into_iter()
        .filter(|segment| !segment.fenced)
        .map(|segment| segment.text)
        .collect()
}

// ============================================================================
// Markdown
// ============================================================================

static RE_MD_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap()
});

static RE_MD_BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]{0,3}(?:>[ \t]?)+").unwrap());

static RE_MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").unwrap());

static RE_MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\n]*\)").unwrap());

static RE_MD_STRONG_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap());

static RE_MD_STRONG_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^\s_](?:[^\n]*?[^\s_])?)__").unwrap());

static RE_MD_STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^\s~](?:[^\n]*?[^\s~])?)~~").unwrap());

static RE_MD_EM_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*").unwrap());

static RE_MD_EM_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^\s_](?:[^_\n]*?[^\s_])?)_").unwrap());

/// Strips Markdown syntax from prose (text outside code fences).
fn strip_markdown_prose(text: &str) -> String {
    let result = RE_MD_HEADING.replace_all(text, "${1}");
    let result = RE_MD_BLOCKQUOTE.replace_all(&result, "");
    let result = RE_MD_IMAGE.replace_all(&result, "");
    let result = RE_MD_LINK.replace_all(&result, "${1}");
    let result = RE_MD_STRONG_STAR.replace_all(&result, "${1}");
    let result = RE_MD_STRONG_UNDERSCORE.replace_all(&result, "${1}");
    let result = RE_MD_STRIKETHROUGH.replace_all(&result, "${1}");
    let result = RE_MD_EM_STAR.replace_all(&result, "${1}");
    strip_underscore_emphasis(&result)
}

/// `_x_` is emphasis only at word boundaries; `snake_case_name` is left alone.
fn strip_underscore_emphasis(text: &str) -> String {
    RE_MD_EM_UNDERSCORE
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let before = text[..whole.start].chars().next_back();
            let after = text[whole.end..].chars().next();
            let intraword = before.is_some_and(char::is_alphanumeric)
                || after.is_some_and(char::is_alphanumeric);
            if intraword {
                caps[0].to_string()
            } else {
                caps[1].to_string()
            }
        })
        .into_owned()
}

/// Strips Markdown syntax, leaving fenced code blocks verbatim.
pub fn strip_markdown(text: &str) -> String {
    split_fences(text)
        .into_iter()
        .map(|segment| {
            if segment.fenced {
                segment.text.to_string()
            } else {
                strip_markdown_prose(segment.text)
            }
        })
        .collect()
}

// ============================================================================
// Entry point
// ============================================================================

/// Applies the enabled stripping stages in order: HTML/XML tags, code fences,
/// Markdown, and finally entity decoding.
///
/// Entities are decoded last so that decoded text is never read as markup:
/// `&gt; quoted` becomes `> quoted`, not `quoted`.
pub fn strip_markup(text: &str, flags: &MarkupFlags) -> String {
    let untagged;
    let text = if flags.html_xml {
        untagged = remove_tags(text);
        untagged.as_str()
    } else {
        text
    };

    let mut result = String::with_capacity(text.len());
    if flags.code_fences || flags.markdown {
        for segment in split_fences(text) {
            match (segment.fenced, flags.code_fences, flags.markdown) {
                (true, true, _) => {}
                (true, false, _) | (false, _, false) => result.push_str(segment.text),
                (false, _, true) => result.push_str(&strip_markdown_prose(segment.text)),
            }
        }
    } else {
        result.push_str(text);
    }

    if flags.html_xml {
        decode_entities(&result)
    } else {
        result
    }
}
