//! Sanitization pipeline.
//!
//! Stages, in order:
//!
//! 1. Markup stripping (HTML/XML, Markdown, code fences) per profile
//! 2. Normalization into the effective form
//! 3. Emoji-sequence guard
//! 4. Character filter pass
//! 5. Guard restoration
//! 6. Isolated combining-mark pruning
//! 7. Late directionality-control strip
//! 8. Whitespace normalization
//! 9. Final normalization, then a last sweep of hard-blocked scalars
//!
//! Every stage is total: malformed markup or unexpected codepoints degrade
//! to best-effort output, never to an error.

use crate::detect::{detect, DetectionResult};
use crate::emoji::{self, Shielded};
use crate::filter::{filter_shielded, prune_isolated_marks, strip_directionality_controls};
use crate::markup::strip_markup;
use crate::profile::Profile;
use crate::whitespace::normalize_whitespace_keeping;
use serde::Serialize;

/// Sanitized text together with detection statistics for the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sanitized {
    pub text: String,
    pub stats: DetectionResult,
}

fn trace_stage(stage: &str, text: &str) {
    log::trace!("sanitize: {} chars after {}", text.chars().count(), stage);
}

/// Sanitizes `text` according to `profile`.
///
/// `lang` selects a language allowance (`"fa"`, `"th-TH"`, ...); `None` applies
/// no language exceptions.
///
/// # Example
///
/// ```
/// use unisweep::{sanitize, Profile};
///
/// let input = "# Hello\n\n**World** has\u{200B}an invisible space.";
/// let clean = sanitize(input, &Profile::default(), None);
/// assert_eq!(clean, "Hello\n\nWorld has an invisible space.");
/// ```
pub fn sanitize(text: &str, profile: &Profile, lang: Option<&str>) -> String {
    if text.is_empty() {
        return String::new();
    }
    trace_stage("input", text);

    let stripped = if profile.markup.any() {
        let stripped = strip_markup(text, &profile.markup);
        trace_stage("markup", &stripped);
        stripped
    } else {
        text.to_string()
    };

    let form = profile.effective_form();
    let normalized = form.apply(&stripped);
    drop(stripped);

    let shielded = if profile.preserve_emoji_sequences {
        emoji::protect(&normalized)
    } else {
        Shielded::passthrough(normalized)
    };
    if shielded.protected() > 0 {
        log::trace!("sanitize: {} emoji joiners protected", shielded.protected());
    }

    let filtered = filter_shielded(shielded.text(), profile, lang, shielded.sentinel());
    trace_stage("filter", &filtered);
    let mut result = shielded.restore(filtered);

    if profile.remove_isolated_combining_marks {
        result = prune_isolated_marks(&result, profile);
        trace_stage("mark pruning", &result);
    }

    if profile.strip_directionality_controls {
        result = strip_directionality_controls(&result, profile);
    }

    if profile.collapse_whitespace {
        result = normalize_whitespace_keeping(&result, &profile.hard_allow);
        trace_stage("whitespace", &result);
    }

    let mut result = form.apply(&result);

    // Normalization can compose kept pieces into a blocked scalar
    // (`e` + U+0301 into `é`).
    if result.chars().any(|c| swept(c, profile)) {
        result.retain(|c| !swept(c, profile));
        if profile.collapse_whitespace {
            result = normalize_whitespace_keeping(&result, &profile.hard_allow);
        }
    }

    result
}

fn swept(c: char, profile: &Profile) -> bool {
    profile.is_hard_blocked(c) && !profile.is_hard_allowed(c)
}

/// Sanitizes `text` and reports what the original contained.
pub fn sanitize_with_stats(text: &str, profile: &Profile, lang: Option<&str>) -> Sanitized {
    Sanitized {
        stats: detect(text),
        text: sanitize(text, profile, lang),
    }
}

/// Sanitizes UTF-16 input.
///
/// Unpaired surrogates are dropped when `categories.surrogates` is enabled and
/// replaced with U+FFFD otherwise; the decoded text then goes through
/// [`sanitize`].
pub fn sanitize_utf16(units: &[u16], profile: &Profile, lang: Option<&str>) -> String {
    let drop_lone = profile.categories.surrogates;
    let decoded: String = char::decode_utf16(units.iter().copied())
        .filter_map(|unit| match unit {
            Ok(c) => Some(c),
            Err(_) if drop_lone => None,
            Err(_) => Some(char::REPLACEMENT_CHARACTER),
        })
        .collect();
    sanitize(&decoded, profile, lang)
}
