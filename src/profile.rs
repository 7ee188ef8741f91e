//! Sanitize profiles.
//!
//! A [`Profile`] is a fully specified, immutable-by-convention configuration.
//! Partial JSON documents are merged over [`Profile::default`] at load time,
//! so the filter never sees a sparse configuration.

use crate::classify;
use crate::error::{Error, Result};
use crate::normalize::NormalizationForm;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which Private Use Areas the filter removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateUseScope {
    /// Keep all private use characters.
    None,
    /// Remove U+E000..U+F8FF only.
    #[default]
    BmpOnly,
    /// Remove the BMP area and supplementary areas A and B.
    All,
}

impl PrivateUseScope {
    /// Returns true if this scope removes `cp`.
    pub fn covers(self, cp: u32) -> bool {
        match self {
            Self::None => false,
            Self::BmpOnly => classify::is_private_use_bmp(cp),
            Self::All => {
                classify::is_private_use_bmp(cp) || classify::is_private_use_supplementary(cp)
            }
        }
    }
}

/// How variation selectors are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationSelectorPolicy {
    /// Keep every variation selector.
    None,
    /// Strip all except VS15/VS16 (text/emoji presentation).
    #[default]
    EmojiSafekeep,
    /// Strip every variation selector.
    All,
}

/// Markup stripping toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupFlags {
    /// Remove HTML/XML tags, script/style blocks, and decode entities.
    pub html_xml: bool,
    /// Remove inline Markdown syntax, headings and blockquote markers.
    pub markdown: bool,
    /// Remove fenced code blocks.
    pub code_fences: bool,
}

impl Default for MarkupFlags {
    fn default() -> Self {
        Self {
            html_xml: true,
            markdown: true,
            code_fences: false,
        }
    }
}

impl MarkupFlags {
    /// All stripping disabled.
    pub fn none() -> Self {
        Self {
            html_xml: false,
            markdown: false,
            code_fences: false,
        }
    }

    /// All stripping enabled.
    pub fn all() -> Self {
        Self {
            html_xml: true,
            markdown: true,
            code_fences: true,
        }
    }

    /// Returns true if any stripping is enabled.
    pub fn any(&self) -> bool {
        self.html_xml || self.markdown || self.code_fences
    }
}

/// General-category removal toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFlags {
    /// C0/C1 controls other than TAB, LF and CR.
    pub controls: bool,
    /// Zero-width, bidi, and other invisible format characters.
    pub format_controls: bool,
    /// Unpaired surrogates in UTF-16 input (dropped instead of replaced with U+FFFD).
    pub surrogates: bool,
}

impl Default for CategoryFlags {
    fn default() -> Self {
        Self {
            controls: true,
            format_controls: true,
            surrogates: true,
        }
    }
}

/// Characters a language legitimately needs, exempt from removal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageAllowance {
    pub chars: BTreeSet<char>,
    pub comment: Option<String>,
}

impl LanguageAllowance {
    pub fn new(chars: impl IntoIterator<Item = char>, comment: Option<&str>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
            comment: comment.map(str::to_string),
        }
    }
}

const JOINERS: &[char] = &[classify::ZWNJ, classify::ZWJ];

/// Built-in exceptions: (languages, chars, comment).
const BUILTIN_ALLOWANCES: &[(&[&str], &[char], &str)] = &[
    (
        &["th", "km", "lo", "my"],
        &[classify::ZWSP],
        "zero width space marks word boundaries",
    ),
    (
        &["fa", "ps", "ku"],
        &[classify::ZWNJ],
        "ZWNJ separates morphemes without a visible space",
    ),
    (&["ar", "ur"], JOINERS, "joiners control cursive shaping"),
    (
        &[
            "hi", "mr", "ne", "sa", "bn", "as", "gu", "pa", "or", "ta", "te", "kn", "ml", "si",
        ],
        JOINERS,
        "joiners select conjunct and half forms",
    ),
    (
        &["mn"],
        &['\u{180B}', '\u{180C}', '\u{180D}', '\u{180E}'],
        "free variation selectors pick Mongolian glyph forms",
    ),
];

fn builtin_allowances() -> BTreeMap<String, LanguageAllowance> {
    let mut map = BTreeMap::new();
    for (langs, chars, comment) in BUILTIN_ALLOWANCES {
        for lang in *langs {
            map.insert(
                lang.to_string(),
                LanguageAllowance::new(chars.iter().copied(), Some(comment)),
            );
        }
    }
    map
}

/// Lowercases a language tag and unifies `_` to `-`.
fn canonical_language(lang: &str) -> String {
    lang.trim().to_ascii_lowercase().replace('_', "-")
}

/// Sanitize profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Normalization form for the pre and post passes.
    pub normalization: NormalizationForm,
    /// Promote NFC/NFD to NFKC/NFKD.
    pub compatibility_decomposition: bool,
    /// Run the whitespace/line normalizer.
    pub collapse_whitespace: bool,
    pub markup: MarkupFlags,
    pub categories: CategoryFlags,
    pub remove_noncharacters: bool,
    pub private_use: PrivateUseScope,
    /// Drop combining marks left without a base character.
    pub remove_isolated_combining_marks: bool,
    /// Late pass removing LRM/RLM/embeddings/overrides/isolates.
    pub strip_directionality_controls: bool,
    pub strip_soft_hyphens: bool,
    /// Invisible math operators U+2061..U+2064.
    pub strip_invisible_separators: bool,
    pub strip_tag_characters: bool,
    pub variation_selectors: VariationSelectorPolicy,
    /// Remove U+FEFF everywhere instead of only at the start of text.
    pub strip_bom_anywhere: bool,
    /// Shield ZWJs inside emoji sequences from removal.
    pub preserve_emoji_sequences: bool,
    /// Replace a removed ZWSP between two visible characters with a space.
    pub zero_width_space_as_space: bool,
    /// Per-language exceptions, keyed by lowercase language tag.
    pub language_allowances: BTreeMap<String, LanguageAllowance>,
    /// Always kept, overriding every removal rule.
    pub hard_allow: BTreeSet<char>,
    /// Always removed, overriding language allowances.
    pub hard_block: BTreeSet<char>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            normalization: NormalizationForm::Nfc,
            compatibility_decomposition: false,
            collapse_whitespace: true,
            markup: MarkupFlags::default(),
            categories: CategoryFlags::default(),
            remove_noncharacters: true,
            private_use: PrivateUseScope::BmpOnly,
            remove_isolated_combining_marks: true,
            strip_directionality_controls: true,
            strip_soft_hyphens: true,
            strip_invisible_separators: true,
            strip_tag_characters: true,
            variation_selectors: VariationSelectorPolicy::EmojiSafekeep,
            strip_bom_anywhere: true,
            preserve_emoji_sequences: true,
            zero_width_space_as_space: true,
            language_allowances: builtin_allowances(),
            hard_allow: BTreeSet::new(),
            hard_block: BTreeSet::new(),
        }
    }
}

impl Profile {
    /// Creates a profile with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps emoji presentation and tag sequences (subdivision flags) intact.
    pub fn emoji_safe() -> Self {
        Self {
            variation_selectors: VariationSelectorPolicy::EmojiSafekeep,
            preserve_emoji_sequences: true,
            strip_tag_characters: false,
            ..Self::default()
        }
    }

    /// Removes everything the engine knows how to remove.
    pub fn max_sterile() -> Self {
        Self {
            normalization: NormalizationForm::Nfkc,
            compatibility_decomposition: true,
            markup: MarkupFlags::all(),
            private_use: PrivateUseScope::All,
            variation_selectors: VariationSelectorPolicy::All,
            preserve_emoji_sequences: false,
            language_allowances: BTreeMap::new(),
            ..Self::default()
        }
    }

    /// Character filtering only; markup is left untouched.
    pub fn markup_intact() -> Self {
        Self {
            markup: MarkupFlags::none(),
            ..Self::default()
        }
    }

    /// Loads a profile from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        Ok(profile.with_canonical_languages())
    }

    /// Loads a profile from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the profile to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn with_canonical_languages(mut self) -> Self {
        let allowances = std::mem::take(&mut self.language_allowances);
        for (lang, allowance) in allowances {
            let entry = self
                .language_allowances
                .entry(canonical_language(&lang))
                .or_default();
            entry.chars.extend(allowance.chars);
            if entry.comment.is_none() {
                entry.comment = allowance.comment;
            }
        }
        self
    }

    /// The form actually applied, after the compatibility flag.
    pub fn effective_form(&self) -> NormalizationForm {
        if self.compatibility_decomposition {
            self.normalization.compatibility()
        } else {
            self.normalization
        }
    }

    /// Finds the allowance for a language tag: full tag first, then primary subtag.
    pub fn allowance_for(&self, lang: &str) -> Option<&LanguageAllowance> {
        let tag = canonical_language(lang);
        if tag.is_empty() {
            return None;
        }
        self.language_allowances.get(&tag).or_else(|| {
            let primary = tag.split('-').next().unwrap_or(&tag);
            self.language_allowances.get(primary)
        })
    }

    pub fn is_hard_allowed(&self, c: char) -> bool {
        self.hard_allow.contains(&c)
    }

    pub fn is_hard_blocked(&self, c: char) -> bool {
        self.hard_block.contains(&c)
    }

    // ==================== Builders ====================

    /// Sets the normalization form.
    pub fn with_normalization(mut self, form: NormalizationForm) -> Self {
        self.normalization = form;
        self
    }

    /// Enables or disables compatibility decomposition.
    pub fn with_compatibility_decomposition(mut self, enabled: bool) -> Self {
        self.compatibility_decomposition = enabled;
        self
    }

    /// Sets the markup stripping flags.
    pub fn with_markup(mut self, markup: MarkupFlags) -> Self {
        self.markup = markup;
        self
    }

    /// Sets the variation selector policy.
    pub fn with_variation_selectors(mut self, policy: VariationSelectorPolicy) -> Self {
        self.variation_selectors = policy;
        self
    }

    /// Sets the private use removal scope.
    pub fn with_private_use(mut self, scope: PrivateUseScope) -> Self {
        self.private_use = scope;
        self
    }

    /// Enables or disables the emoji sequence guard.
    pub fn with_emoji_preservation(mut self, enabled: bool) -> Self {
        self.preserve_emoji_sequences = enabled;
        self
    }

    /// Disables whitespace collapsing.
    pub fn without_whitespace_collapse(mut self) -> Self {
        self.collapse_whitespace = false;
        self
    }

    /// Adds characters to the hard allow set.
    pub fn with_hard_allow(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.hard_allow.extend(chars);
        self
    }

    /// Adds characters to the hard block set.
    pub fn with_hard_block(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.hard_block.extend(chars);
        self
    }

    /// Adds (or extends) the allowance for a language.
    pub fn with_language_allowance(
        mut self,
        lang: &str,
        chars: impl IntoIterator<Item = char>,
        comment: Option<&str>,
    ) -> Self {
        let entry = self
            .language_allowances
            .entry(canonical_language(lang))
            .or_default();
        entry.chars.extend(chars);
        if let Some(comment) = comment {
            entry.comment = Some(comment.to_string());
        }
        self
    }

    /// Removes every language allowance, including the built-in ones.
    pub fn without_language_allowances(mut self) -> Self {
        self.language_allowances.clear();
        self
    }
}

/// Named, reusable profile presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Default,
    EmojiSafe,
    MaxSterile,
    MarkupIntact,
}

impl Preset {
    pub fn all() -> [Self; 4] {
        [
            Self::Default,
            Self::EmojiSafe,
            Self::MaxSterile,
            Self::MarkupIntact,
        ]
    }

    /// Builds the profile for this preset.
    pub fn profile(self) -> Profile {
        match self {
            Self::Default => Profile::default(),
            Self::EmojiSafe => Profile::emoji_safe(),
            Self::MaxSterile => Profile::max_sterile(),
            Self::MarkupIntact => Profile::markup_intact(),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "default" => Ok(Self::Default),
            "emoji_safe" => Ok(Self::EmojiSafe),
            "max_sterile" => Ok(Self::MaxSterile),
            "markup_intact" => Ok(Self::MarkupIntact),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::EmojiSafe => write!(f, "emoji_safe"),
            Self::MaxSterile => write!(f, "max_sterile"),
            Self::MarkupIntact => write!(f, "markup_intact"),
        }
    }
}

impl From<Preset> for Profile {
    fn from(preset: Preset) -> Self {
        preset.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.normalization, NormalizationForm::Nfc);
        assert!(profile.markup.html_xml);
        assert!(profile.markup.markdown);
        assert!(!profile.markup.code_fences);
        assert!(profile.categories.format_controls);
        assert_eq!(
            profile.variation_selectors,
            VariationSelectorPolicy::EmojiSafekeep
        );
        assert!(profile.hard_allow.is_empty());
        assert!(profile.hard_block.is_empty());
    }

    #[test]
    fn test_presets_override_default() {
        let sterile = Profile::max_sterile();
        assert_eq!(sterile.private_use, PrivateUseScope::All);
        assert_eq!(sterile.variation_selectors, VariationSelectorPolicy::All);
        assert!(sterile.language_allowances.is_empty());
        assert_eq!(sterile.effective_form(), NormalizationForm::Nfkc);

        let intact = Profile::markup_intact();
        assert!(!intact.markup.any());
        assert!(intact.categories.format_controls);

        let emoji = Profile::emoji_safe();
        assert!(emoji.preserve_emoji_sequences);
        assert!(!emoji.strip_tag_characters);
    }

    #[test]
    fn test_preset_names() {
        for preset in Preset::all() {
            let parsed: Preset = preset.to_string().parse().unwrap();
            assert_eq!(parsed, preset);
        }
        assert_eq!("Max-Sterile".parse::<Preset>().unwrap(), Preset::MaxSterile);
        assert!(matches!(
            "paranoid".parse::<Preset>(),
            Err(Error::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_effective_form() {
        let profile = Profile::default()
            .with_normalization(NormalizationForm::Nfd)
            .with_compatibility_decomposition(true);
        assert_eq!(profile.effective_form(), NormalizationForm::Nfkd);
    }

    #[test]
    fn test_private_use_scope() {
        assert!(!PrivateUseScope::None.covers(0xE000));
        assert!(PrivateUseScope::BmpOnly.covers(0xE000));
        assert!(!PrivateUseScope::BmpOnly.covers(0xF0000));
        assert!(PrivateUseScope::All.covers(0x10FFFD));
    }

    #[test]
    fn test_builtin_language_allowances() {
        let profile = Profile::default();
        let thai = profile.allowance_for("th").unwrap();
        assert!(thai.chars.contains(&'\u{200B}'));
        assert!(thai.comment.is_some());

        let persian = profile.allowance_for("fa-IR").unwrap();
        assert!(persian.chars.contains(&'\u{200C}'));
        assert!(!persian.chars.contains(&'\u{200D}'));

        let hindi = profile.allowance_for("hi_IN").unwrap();
        assert!(hindi.chars.contains(&'\u{200D}'));

        assert!(profile.allowance_for("en").is_none());
        assert!(profile.allowance_for("").is_none());
    }

    #[test]
    fn test_full_tag_preferred_over_primary() {
        let profile = Profile::default()
            .without_language_allowances()
            .with_language_allowance("pt", ['\u{00AD}'], None)
            .with_language_allowance("pt-BR", ['\u{2060}'], Some("regional"));
        let br = profile.allowance_for("PT-br").unwrap();
        assert!(br.chars.contains(&'\u{2060}'));
        let pt = profile.allowance_for("pt-PT").unwrap();
        assert!(pt.chars.contains(&'\u{00AD}'));
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let json = r#"{
            "variation_selectors": "all",
            "private_use": "none",
            "markup": { "code_fences": true },
            "hard_allow": ["\u200d"],
            "language_allowances": { "DE": { "chars": ["\u00ad"], "comment": "hyphenation" } }
        }"#;
        let profile = Profile::from_json(json).unwrap();
        assert_eq!(profile.variation_selectors, VariationSelectorPolicy::All);
        assert_eq!(profile.private_use, PrivateUseScope::None);
        assert!(profile.markup.code_fences);
        // Unspecified nested fields keep their defaults
        assert!(profile.markup.html_xml);
        assert!(profile.collapse_whitespace);
        assert!(profile.is_hard_allowed('\u{200D}'));
        let de = profile.allowance_for("de").unwrap();
        assert!(de.chars.contains(&'\u{00AD}'));
        assert_eq!(de.comment.as_deref(), Some("hyphenation"));
    }

    #[test]
    fn test_json_roundtrip_preserves_profile() {
        let profile = Profile::max_sterile().with_hard_block(['\u{200C}']);
        let json = profile.to_json().unwrap();
        assert_eq!(Profile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn test_invalid_json() {
        let result = Profile::from_json(r#"{ "private_use": "everything" }"#);
        assert!(matches!(result, Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "strip_bom_anywhere": false }}"#).unwrap();
        let profile = Profile::from_json_file(file.path()).unwrap();
        assert!(!profile.strip_bom_anywhere);

        let missing = Profile::from_json_file("/nonexistent/profile.json");
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
