//! Character filter pass.
//!
//! A single left-to-right scan over scalar values. For each scalar:
//!
//! 1. hard-allowed → keep
//! 2. hard-blocked → drop
//! 3. allowed for the requested language → keep
//! 4. first enabled removal rule that matches → drop
//! 5. otherwise keep
//!
//! Two post-passes live here as well: isolated combining-mark pruning and
//! the late directionality-control strip.

use crate::classify::{self, BOM, ZWJ, ZWSP};
use crate::profile::{LanguageAllowance, Profile, VariationSelectorPolicy};
use unicode_normalization::char::is_combining_mark;

/// Removal rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalRule {
    Controls,
    ByteOrderMark,
    FormatControls,
    InvisibleSeparators,
    SoftHyphen,
    TagCharacters,
    VariationSelectors,
    NonCharacters,
    PrivateUse,
}

/// Returns the first enabled rule that removes `c`.
///
/// `at_text_start` is true when nothing has been emitted yet; a BOM there is
/// removed even when `strip_bom_anywhere` is off.
pub fn removal_rule(c: char, profile: &Profile, at_text_start: bool) -> Option<RemovalRule> {
    let cp = c as u32;

    if profile.categories.controls && c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
        return Some(RemovalRule::Controls);
    }
    if c == BOM {
        return (profile.strip_bom_anywhere || at_text_start).then_some(RemovalRule::ByteOrderMark);
    }
    if profile.categories.format_controls
        && (classify::is_zero_width(cp)
            || classify::is_bidi_control(cp)
            || classify::is_format_control(cp)
            || classify::is_shorthand_format(cp))
    {
        return Some(RemovalRule::FormatControls);
    }
    if profile.strip_invisible_separators && classify::is_math_invisible(cp) {
        return Some(RemovalRule::InvisibleSeparators);
    }
    if profile.strip_soft_hyphens && classify::is_hyphenation(cp) {
        return Some(RemovalRule::SoftHyphen);
    }
    if profile.strip_tag_characters && classify::is_tag_character(cp) {
        return Some(RemovalRule::TagCharacters);
    }
    if strips_variation_selector(cp, profile.variation_selectors) {
        return Some(RemovalRule::VariationSelectors);
    }
    if profile.remove_noncharacters && classify::is_noncharacter(cp) {
        return Some(RemovalRule::NonCharacters);
    }
    if profile.private_use.covers(cp) {
        return Some(RemovalRule::PrivateUse);
    }
    None
}

fn strips_variation_selector(cp: u32, policy: VariationSelectorPolicy) -> bool {
    let selector =
        classify::is_variation_selector(cp) || classify::is_ideographic_variation_selector(cp);
    match policy {
        VariationSelectorPolicy::None => false,
        VariationSelectorPolicy::All => selector,
        VariationSelectorPolicy::EmojiSafekeep => {
            selector && !classify::is_presentation_selector(cp)
        }
    }
}

enum Verdict {
    Keep,
    Drop,
    /// Drop, but emit a space to keep words apart.
    Separator,
}

struct Filter<'a> {
    profile: &'a Profile,
    allowance: Option<&'a LanguageAllowance>,
    sentinel: Option<char>,
}

impl Filter<'_> {
    fn verdict(&self, c: char, at_text_start: bool) -> Verdict {
        let shielded = self.sentinel == Some(c);
        // A protected joiner is still a ZWJ as far as allow/block lists go.
        let probe = if shielded { ZWJ } else { c };

        if self.profile.is_hard_allowed(probe) {
            return Verdict::Keep;
        }
        if self.profile.is_hard_blocked(probe) {
            return Verdict::Drop;
        }
        if shielded || self.allowance.is_some_and(|a| a.chars.contains(&c)) {
            return Verdict::Keep;
        }

        match removal_rule(c, self.profile, at_text_start) {
            None => Verdict::Keep,
            Some(RemovalRule::FormatControls)
                if c == ZWSP && self.profile.zero_width_space_as_space =>
            {
                Verdict::Separator
            }
            Some(_) => Verdict::Drop,
        }
    }
}

/// Runs the filter pass over `text`.
///
/// Re-running the pass on its own output is a no-op.
pub fn filter(text: &str, profile: &Profile, lang: Option<&str>) -> String {
    filter_shielded(text, profile, lang, None)
}

/// Filter pass that keeps `sentinel` (a protected ZWJ) unless ZWJ is hard-blocked.
pub(crate) fn filter_shielded(
    text: &str,
    profile: &Profile,
    lang: Option<&str>,
    sentinel: Option<char>,
) -> String {
    let filter = Filter {
        profile,
        allowance: lang.and_then(|l| profile.allowance_for(l)),
        sentinel,
    };

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match filter.verdict(c, result.is_empty()) {
            Verdict::Keep => result.push(c),
            Verdict::Drop => {}
            Verdict::Separator => {
                let after_visible = result.chars().next_back().is_some_and(|p| !p.is_whitespace());
                let before_visible = chars.peek().is_some_and(|n| !n.is_whitespace());
                if after_visible && before_visible {
                    result.push(' ');
                }
            }
        }
    }

    result
}

/// A base is any non-whitespace, non-control, non-combining character.
fn is_base(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !is_combining_mark(c)
}

/// Drops combining marks that do not follow a base character.
///
/// Stacked marks are kept as long as the chain starts at a base, so
/// `e\u{0301}\u{0323}` survives while a leading `\u{0301}` does not.
pub fn prune_isolated_marks(text: &str, profile: &Profile) -> String {
    let mut result = String::with_capacity(text.len());
    let mut attached = false;

    for c in text.chars() {
        if is_combining_mark(c) {
            if attached || profile.is_hard_allowed(c) {
                result.push(c);
            }
            continue;
        }
        attached = is_base(c);
        result.push(c);
    }

    result
}

/// Late pass removing LRM, RLM, ALM, embeddings, overrides and isolates,
/// regardless of language. Hard-allowed scalars are kept.
pub fn strip_directionality_controls(text: &str, profile: &Profile) -> String {
    text.chars()
        .filter(|&c| !classify::is_bidi_control(c as u32) || profile.is_hard_allowed(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PrivateUseScope;

    fn run(text: &str, profile: &Profile) -> String {
        filter(text, profile, None)
    }

    #[test]
    fn test_removes_invisible_categories() {
        let profile = Profile::default().without_language_allowances();
        let input = "a\u{200C}b\u{200E}c\u{2062}d\u{00AD}e\u{E0041}f\u{FDD0}g\u{E000}h\u{034F}i\u{1BCA0}j";
        assert_eq!(run(input, &profile), "abcdefghij");
    }

    #[test]
    fn test_controls_keep_line_structure() {
        let profile = Profile::default();
        assert_eq!(run("a\u{0000}b\u{0007}c\u{0085}d", &profile), "abcd");
        assert_eq!(run("a\tb\r\nc", &profile), "a\tb\r\nc");
    }

    #[test]
    fn test_disabled_rule_never_drops() {
        let mut profile = Profile::default();
        profile.strip_soft_hyphens = false;
        profile.categories.format_controls = false;
        assert_eq!(run("co\u{00AD}op", &profile), "co\u{00AD}op");
        assert_eq!(run("a\u{200C}b", &profile), "a\u{200C}b");
    }

    #[test]
    fn test_zwsp_becomes_separator_between_words() {
        let profile = Profile::default();
        assert_eq!(run("has\u{200B}an", &profile), "has an");
        assert_eq!(run("has \u{200B}an", &profile), "has an");
        assert_eq!(run("\u{200B}start", &profile), "start");
        assert_eq!(run("end\u{200B}", &profile), "end");
        assert_eq!(run("a\u{200B}\u{200B}b", &profile), "a b");

        let mut plain = Profile::default();
        plain.zero_width_space_as_space = false;
        assert_eq!(run("has\u{200B}an", &plain), "hasan");
    }

    #[test]
    fn test_bom_rules() {
        let profile = Profile::default();
        assert_eq!(run("\u{FEFF}a\u{FEFF}b", &profile), "ab");

        let mut leading_only = Profile::default();
        leading_only.strip_bom_anywhere = false;
        assert_eq!(run("\u{FEFF}\u{FEFF}a\u{FEFF}b", &leading_only), "a\u{FEFF}b");
    }

    #[test]
    fn test_variation_selector_policy() {
        let mut profile = Profile::default();

        profile.variation_selectors = VariationSelectorPolicy::EmojiSafekeep;
        assert_eq!(run("A\u{FE0F}", &profile), "A\u{FE0F}");
        assert_eq!(run("A\u{FE0E}B\u{FE00}", &profile), "A\u{FE0E}B");
        assert_eq!(run("\u{845B}\u{E0100}", &profile), "\u{845B}");

        profile.variation_selectors = VariationSelectorPolicy::All;
        assert_eq!(run("A\u{FE0F}", &profile), "A");

        profile.variation_selectors = VariationSelectorPolicy::None;
        assert_eq!(run("A\u{FE0F}\u{FE00}\u{E0100}", &profile), "A\u{FE0F}\u{FE00}\u{E0100}");
    }

    #[test]
    fn test_presentation_selector_hard_blocked() {
        let profile = Profile::default().with_hard_block(['\u{FE0F}']);
        assert_eq!(run("A\u{FE0F}", &profile), "A");
    }

    #[test]
    fn test_private_use_scope() {
        let input = "\u{E000}\u{F0000}\u{10FFFD}x";
        let mut profile = Profile::default();
        profile.private_use = PrivateUseScope::None;
        assert_eq!(run(input, &profile), input);
        profile.private_use = PrivateUseScope::BmpOnly;
        assert_eq!(run(input, &profile), "\u{F0000}\u{10FFFD}x");
        profile.private_use = PrivateUseScope::All;
        assert_eq!(run(input, &profile), "x");
    }

    #[test]
    fn test_language_allowance() {
        let profile = Profile::default();
        let persian = "\u{0645}\u{06CC}\u{200C}\u{062E}\u{0648}\u{0627}\u{0647}\u{0645}";
        assert_eq!(filter(persian, &profile, Some("fa")), persian);
        assert_eq!(
            filter(persian, &profile, None),
            "\u{0645}\u{06CC}\u{062E}\u{0648}\u{0627}\u{0647}\u{0645}"
        );

        let thai = "\u{0E20}\u{0E32}\u{0E29}\u{0E32}\u{200B}\u{0E44}\u{0E17}\u{0E22}";
        assert_eq!(filter(thai, &profile, Some("th-TH")), thai);
    }

    #[test]
    fn test_hard_allow_overrides_everything() {
        let profile = Profile::max_sterile().with_hard_allow(['\u{200B}', '\u{E000}', '\u{0007}']);
        assert_eq!(run("a\u{200B}b\u{E000}\u{0007}", &profile), "a\u{200B}b\u{E000}\u{0007}");
    }

    #[test]
    fn test_hard_block_beats_language_allowance() {
        let profile = Profile::default().with_hard_block(['\u{200C}', 'x']);
        assert_eq!(filter("a\u{200C}bx", &profile, Some("fa")), "ab");
    }

    #[test]
    fn test_sentinel_kept_unless_zwj_blocked() {
        let sentinel = '\u{FDD0}';
        let profile = Profile::max_sterile();
        let shielded = "\u{1F468}\u{FDD0}\u{1F4BB}";
        assert_eq!(
            filter_shielded(shielded, &profile, None, Some(sentinel)),
            shielded
        );

        let blocked = Profile::default().with_hard_block([ZWJ]);
        assert_eq!(
            filter_shielded(shielded, &blocked, None, Some(sentinel)),
            "\u{1F468}\u{1F4BB}"
        );

        // Without the sentinel registered, U+FDD0 is just a noncharacter
        assert_eq!(run(shielded, &profile), "\u{1F468}\u{1F4BB}");
    }

    #[test]
    fn test_filter_is_idempotent_on_samples() {
        let profile = Profile::default();
        for input in [
            "\u{200B}\u{FEFF}x",
            "a\u{200B}\u{00AD}",
            "\u{FEFF}\u{200B}\u{FEFF}",
            "mixed \u{202E}text\u{202C} here\u{FE0F}",
        ] {
            let once = run(input, &profile);
            assert_eq!(run(&once, &profile), once, "input {input:?}");
        }
    }

    #[test]
    fn test_removal_rule_order() {
        let profile = Profile::default();
        assert_eq!(removal_rule('\u{0001}', &profile, false), Some(RemovalRule::Controls));
        assert_eq!(removal_rule(BOM, &profile, false), Some(RemovalRule::ByteOrderMark));
        assert_eq!(removal_rule('\u{2066}', &profile, false), Some(RemovalRule::FormatControls));
        assert_eq!(
            removal_rule('\u{2063}', &profile, false),
            Some(RemovalRule::InvisibleSeparators)
        );
        assert_eq!(removal_rule('\u{FFFF}', &profile, false), Some(RemovalRule::NonCharacters));
        assert_eq!(removal_rule('a', &profile, false), None);
    }

    #[test]
    fn test_prune_isolated_marks() {
        let profile = Profile::default();
        assert_eq!(prune_isolated_marks("\u{0301}e\u{0301}", &profile), "e\u{0301}");
        assert_eq!(prune_isolated_marks("a \u{0308}b", &profile), "a b");
        assert_eq!(prune_isolated_marks("e\u{0301}\u{0323}", &profile), "e\u{0301}\u{0323}");
        assert_eq!(prune_isolated_marks("\n\u{20DD}", &profile), "\n");
        // Keycap sequence: VS16 and enclosing keycap attach to the digit
        assert_eq!(prune_isolated_marks("1\u{FE0F}\u{20E3}", &profile), "1\u{FE0F}\u{20E3}");

        let allowed = Profile::default().with_hard_allow(['\u{0301}']);
        assert_eq!(prune_isolated_marks(" \u{0301}", &allowed), " \u{0301}");
    }

    #[test]
    fn test_strip_directionality_controls() {
        let profile = Profile::default();
        let input = "\u{202B}abc\u{202C}\u{200F}\u{061C}\u{2067}d\u{2069}";
        assert_eq!(strip_directionality_controls(input, &profile), "abcd");

        let allowed = Profile::default().with_hard_allow(['\u{200F}']);
        assert_eq!(strip_directionality_controls("a\u{200F}", &allowed), "a\u{200F}");
    }
}
