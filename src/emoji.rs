//! Emoji-sequence guard.
//!
//! Before filtering, every ZWJ that joins two pictographic codepoints is
//! swapped for a sentinel scalar so that zero-width removal cannot break
//! sequences like 👨‍💻 or 👨‍👩‍👧. After filtering, sentinels are turned back
//! into ZWJ.
//!
//! The sentinel is drawn from the noncharacter block U+FDD0..U+FDEF: the first
//! value that does not already occur in the text is used, so pre-existing
//! scalars are never mistaken for protected joiners.
//!
//! Pictographic detection prefers the regex engine's
//! `\p{Extended_Pictographic}` table. The capability is probed once, on
//! first use; if the property is unavailable the guard falls back to
//! treating any supplementary-plane scalar as pictographic.

use crate::classify::{self, VS16, ZWJ};
use regex::Regex;
use std::sync::LazyLock;

const SENTINEL_FIRST: u32 = 0xFDD0;
const SENTINEL_LAST: u32 = 0xFDEF;

/// How pictographic codepoints are recognised.
#[derive(Debug)]
pub enum PictographicStrategy {
    /// Unicode `Extended_Pictographic` property via the regex engine.
    Property(Regex),
    /// Heuristic: any scalar outside the Basic Multilingual Plane.
    SupplementaryPlane,
}

impl PictographicStrategy {
    /// Probes the regex engine for `\p{Extended_Pictographic}` support.
    pub fn probe() -> Self {
        match Regex::new(r"^\p{Extended_Pictographic}$") {
            Ok(re) => {
                log::debug!("emoji guard: using Extended_Pictographic property");
                Self::Property(re)
            }
            Err(err) => {
                log::debug!(
                    "emoji guard: Extended_Pictographic unavailable ({}), using supplementary-plane heuristic",
                    err
                );
                Self::SupplementaryPlane
            }
        }
    }

    pub fn is_pictographic(&self, c: char) -> bool {
        match self {
            Self::Property(re) => {
                let mut buf = [0u8; 4];
                re.is_match(c.encode_utf8(&mut buf))
            }
            Self::SupplementaryPlane => c as u32 > 0xFFFF,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Property(_) => "extended_pictographic",
            Self::SupplementaryPlane => "supplementary_plane",
        }
    }
}

static STRATEGY: LazyLock<PictographicStrategy> = LazyLock::new(PictographicStrategy::probe);

/// The process-wide strategy, selected on first use.
pub fn strategy() -> &'static PictographicStrategy {
    &STRATEGY
}

/// Text with protected joiners replaced by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shielded {
    text: String,
    sentinel: Option<char>,
    protected: usize,
}

impl Shielded {
    /// Wraps text without protecting anything.
    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sentinel: None,
            protected: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The sentinel in use, if any joiner was protected.
    pub fn sentinel(&self) -> Option<char> {
        self.sentinel
    }

    /// Number of protected joiners.
    pub fn protected(&self) -> usize {
        self.protected
    }

    /// Turns every sentinel in `filtered` back into ZWJ.
    pub fn restore(&self, filtered: String) -> String {
        match self.sentinel {
            Some(sentinel) if filtered.contains(sentinel) => {
                filtered.replace(sentinel, "\u{200D}")
            }
            _ => filtered,
        }
    }
}

/// Protects emoji joiners using the process-wide strategy.
pub fn protect(text: &str) -> Shielded {
    protect_with(text, strategy())
}

/// Protects emoji joiners using an explicit strategy.
pub fn protect_with(text: &str, strategy: &PictographicStrategy) -> Shielded {
    if !text.contains(ZWJ) {
        return Shielded::passthrough(text);
    }

    let Some(sentinel) = free_sentinel(text) else {
        log::warn!("emoji guard: no free sentinel in U+FDD0..U+FDEF, guard disabled for this text");
        return Shielded::passthrough(text);
    };

    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut protected = 0;

    for (i, &c) in chars.iter().enumerate() {
        if c == ZWJ && joins_pictographs(&chars, i, strategy) {
            result.push(sentinel);
            protected += 1;
        } else {
            result.push(c);
        }
    }

    Shielded {
        text: result,
        sentinel: (protected > 0).then_some(sentinel),
        protected,
    }
}

/// Picks the first noncharacter in the sentinel block absent from `text`.
fn free_sentinel(text: &str) -> Option<char> {
    let mut used: u32 = 0;
    for c in text.chars() {
        let cp = c as u32;
        if (SENTINEL_FIRST..=SENTINEL_LAST).contains(&cp) {
            used |= 1 << (cp - SENTINEL_FIRST);
        }
    }
    (SENTINEL_FIRST..=SENTINEL_LAST)
        .find(|cp| used & (1 << (cp - SENTINEL_FIRST)) == 0)
        .and_then(char::from_u32)
}

/// The left side may carry VS16 or a skin tone modifier before the joiner.
/// Neighbours are read from the original text, so chains of any length are
/// resolved in one scan.
fn joins_pictographs(chars: &[char], zwj: usize, strategy: &PictographicStrategy) -> bool {
    let Some(&next) = chars.get(zwj + 1) else {
        return false;
    };
    if !strategy.is_pictographic(next) {
        return false;
    }

    let Some(mut left) = zwj.checked_sub(1) else {
        return false;
    };
    let prev = chars[left];
    if prev == VS16 || classify::is_emoji_modifier(prev as u32) {
        let Some(before) = left.checked_sub(1) else {
            return false;
        };
        left = before;
    }
    strategy.is_pictographic(chars[left])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str) -> String {
        let shielded = protect(text);
        shielded.restore(shielded.text().to_string())
    }

    #[test]
    fn test_property_strategy_available() {
        assert_eq!(strategy().name(), "extended_pictographic");
        assert!(strategy().is_pictographic('\u{1F468}'));
        assert!(strategy().is_pictographic('\u{2764}'));
        assert!(!strategy().is_pictographic('a'));
    }

    #[test]
    fn test_simple_sequence_protected() {
        let shielded = protect("\u{1F468}\u{200D}\u{1F4BB}");
        assert_eq!(shielded.protected(), 1);
        assert!(!shielded.text().contains(ZWJ));
        assert_eq!(shielded.sentinel(), Some('\u{FDD0}'));
    }

    #[test]
    fn test_family_chain_protected() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}";
        let shielded = protect(family);
        assert_eq!(shielded.protected(), 3);
        assert_eq!(roundtrip(family), family);
    }

    #[test]
    fn test_vs16_and_modifier_on_left() {
        // Rainbow flag: white flag + VS16 + ZWJ + rainbow
        assert_eq!(protect("\u{1F3F3}\u{FE0F}\u{200D}\u{1F308}").protected(), 1);
        // Woman technologist, medium skin tone
        assert_eq!(protect("\u{1F469}\u{1F3FD}\u{200D}\u{1F4BB}").protected(), 1);
        // Heart on fire: BMP pictograph on the left
        assert_eq!(protect("\u{2764}\u{FE0F}\u{200D}\u{1F525}").protected(), 1);
    }

    #[test]
    fn test_text_joiners_not_protected() {
        assert_eq!(protect("a\u{200D}b").protected(), 0);
        assert_eq!(protect("\u{200D}\u{1F468}").protected(), 0);
        assert_eq!(protect("\u{1F468}\u{200D}").protected(), 0);
        // Devanagari conjunct joiner
        assert_eq!(protect("\u{0915}\u{094D}\u{200D}\u{0937}").protected(), 0);
    }

    #[test]
    fn test_sentinel_avoids_existing_scalars() {
        let text = "\u{FDD0}\u{1F468}\u{200D}\u{1F4BB}";
        let shielded = protect(text);
        assert_eq!(shielded.sentinel(), Some('\u{FDD1}'));
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_exhausted_pool_disables_guard() {
        let mut text: String = (0xFDD0..=0xFDEF).filter_map(char::from_u32).collect();
        text.push_str("\u{1F468}\u{200D}\u{1F4BB}");
        let shielded = protect(&text);
        assert_eq!(shielded.protected(), 0);
        assert_eq!(shielded.text(), text);
    }

    #[test]
    fn test_heuristic_strategy() {
        let heuristic = PictographicStrategy::SupplementaryPlane;
        assert_eq!(protect_with("\u{1F468}\u{200D}\u{1F4BB}", &heuristic).protected(), 1);
        // BMP pictographs are not recognised by the heuristic
        assert_eq!(protect_with("\u{2764}\u{200D}\u{1F525}", &heuristic).protected(), 0);
    }

    #[test]
    fn test_restore_without_sentinel_is_identity() {
        let shielded = Shielded::passthrough("abc");
        assert_eq!(shielded.restore("abc".to_string()), "abc");
    }
}
