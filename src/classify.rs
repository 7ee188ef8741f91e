//! Codepoint classification.
//!
//! Maps a single Unicode scalar value to the semantic category the engine
//! reports on, and exposes the membership predicates the filter evaluates.
//! A scalar has exactly one *primary* category (used for statistics), but
//! may satisfy several predicates: U+FEFF is reported as [`Category::Bom`]
//! while [`is_zero_width`] is still true for it.
//!
//! All tables are `const` and sorted, so lookups are a binary search with
//! no runtime initialisation and no shared mutable state.

use serde::Serialize;
use std::fmt;

/// Semantic category of a codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// ZWSP, ZWNJ, ZWJ, word joiner
    ZeroWidth,
    /// U+FEFF byte order mark / zero width no-break space
    Bom,
    /// LRM, RLM, ALM, embeddings, overrides and isolates
    BidiControl,
    /// Invisible math operators U+2061..U+2064
    MathInvisible,
    /// Soft hyphen
    Hyphenation,
    /// Mongolian free variation selectors and VS1..VS16
    VariationSelector,
    /// Combining grapheme joiner and interlinear annotation controls
    FormatControl,
    /// Duployan shorthand format controls
    ShorthandFormat,
    /// Tag characters U+E0000..U+E007F
    TagCharacter,
    /// Ideographic variation selectors VS17..VS256
    IdeographicVariationSelector,
    /// Permanently reserved noncharacters
    NonCharacter,
    /// Private Use Area (all planes)
    PrivateUse,
    /// Common combining diacritic blocks
    CombiningMark,
    /// Unpaired UTF-16 surrogate code unit
    Surrogate,
    /// Not tracked
    None,
}

impl Category {
    /// Every tracked category, in reporting order. Excludes [`Category::None`].
    pub fn all() -> Vec<Self> {
        vec![
            Self::ZeroWidth,
            Self::Bom,
            Self::BidiControl,
            Self::MathInvisible,
            Self::Hyphenation,
            Self::VariationSelector,
            Self::FormatControl,
            Self::ShorthandFormat,
            Self::TagCharacter,
            Self::IdeographicVariationSelector,
            Self::NonCharacter,
            Self::PrivateUse,
            Self::CombiningMark,
            Self::Surrogate,
        ]
    }

    /// Stable upper-case identifier, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZeroWidth => "ZERO_WIDTH",
            Self::Bom => "BOM",
            Self::BidiControl => "BIDI_CONTROL",
            Self::MathInvisible => "MATH_INVISIBLE",
            Self::Hyphenation => "HYPHENATION",
            Self::VariationSelector => "VARIATION_SELECTOR",
            Self::FormatControl => "FORMAT_CONTROL",
            Self::ShorthandFormat => "SHORTHAND_FORMAT",
            Self::TagCharacter => "TAG_CHARACTER",
            Self::IdeographicVariationSelector => "IDEOGRAPHIC_VARIATION_SELECTOR",
            Self::NonCharacter => "NON_CHARACTER",
            Self::PrivateUse => "PRIVATE_USE",
            Self::CombiningMark => "COMBINING_MARK",
            Self::Surrogate => "SURROGATE",
            Self::None => "NONE",
        }
    }

    /// Human-readable description for UI display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ZeroWidth => "Zero-width spaces and joiners",
            Self::Bom => "Byte order marks",
            Self::BidiControl => "Bidirectional text controls",
            Self::MathInvisible => "Invisible math operators",
            Self::Hyphenation => "Soft hyphens",
            Self::VariationSelector => "Variation selectors",
            Self::FormatControl => "Format controls",
            Self::ShorthandFormat => "Shorthand format controls",
            Self::TagCharacter => "Tag characters",
            Self::IdeographicVariationSelector => "Ideographic variation selectors",
            Self::NonCharacter => "Noncharacters",
            Self::PrivateUse => "Private use characters",
            Self::CombiningMark => "Combining marks",
            Self::Surrogate => "Unpaired surrogates",
            Self::None => "Ordinary characters",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primary-category table. Sorted by start, non-overlapping.
const CATEGORY_RANGES: &[(u32, u32, Category)] = &[
    (0x00AD, 0x00AD, Category::Hyphenation),
    (0x0300, 0x034E, Category::CombiningMark),
    (0x034F, 0x034F, Category::FormatControl),
    (0x0350, 0x036F, Category::CombiningMark),
    (0x061C, 0x061C, Category::BidiControl),
    (0x180B, 0x180E, Category::VariationSelector),
    (0x1AB0, 0x1AFF, Category::CombiningMark),
    (0x1DC0, 0x1DFF, Category::CombiningMark),
    (0x200B, 0x200D, Category::ZeroWidth),
    (0x200E, 0x200F, Category::BidiControl),
    (0x202A, 0x202E, Category::BidiControl),
    (0x2060, 0x2060, Category::ZeroWidth),
    (0x2061, 0x2064, Category::MathInvisible),
    (0x2066, 0x2069, Category::BidiControl),
    (0x20D0, 0x20FF, Category::CombiningMark),
    (0xD800, 0xDFFF, Category::Surrogate),
    (0xE000, 0xF8FF, Category::PrivateUse),
    (0xFDD0, 0xFDEF, Category::NonCharacter),
    (0xFE00, 0xFE0F, Category::VariationSelector),
    (0xFE20, 0xFE2F, Category::CombiningMark),
    (0xFEFF, 0xFEFF, Category::Bom),
    (0xFFF9, 0xFFFB, Category::FormatControl),
    (0x1BCA0, 0x1BCA3, Category::ShorthandFormat),
    (0xE0000, 0xE007F, Category::TagCharacter),
    (0xE0100, 0xE01EF, Category::IdeographicVariationSelector),
    (0xF0000, 0xFFFFD, Category::PrivateUse),
    (0x100000, 0x10FFFD, Category::PrivateUse),
];

const ZERO_WIDTH: &[u32] = &[0x200B, 0x200C, 0x200D, 0x2060, 0xFEFF];

const BIDI_CONTROLS: &[(u32, u32)] = &[
    (0x061C, 0x061C),
    (0x200E, 0x200F),
    (0x202A, 0x202E),
    (0x2066, 0x2069),
];

/// Zero width space.
pub const ZWSP: char = '\u{200B}';
/// Zero width non-joiner.
pub const ZWNJ: char = '\u{200C}';
/// Zero width joiner.
pub const ZWJ: char = '\u{200D}';
/// Byte order mark.
pub const BOM: char = '\u{FEFF}';
/// Text presentation selector (VS15).
pub const VS15: char = '\u{FE0E}';
/// Emoji presentation selector (VS16).
pub const VS16: char = '\u{FE0F}';

/// Returns the primary category of a codepoint.
///
/// Values outside the Unicode range, and anything not tracked, classify as
/// [`Category::None`].
pub fn classify(codepoint: u32) -> Category {
    if is_noncharacter(codepoint) {
        return Category::NonCharacter;
    }
    CATEGORY_RANGES
        .binary_search_by(|&(start, end, _)| {
            if end < codepoint {
                std::cmp::Ordering::Less
            } else if start > codepoint {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .map(|idx| CATEGORY_RANGES[idx].2)
        .unwrap_or(Category::None)
}

/// Convenience wrapper over [`classify`] for a `char`.
pub fn classify_char(c: char) -> Category {
    classify(c as u32)
}

fn in_ranges(ranges: &[(u32, u32)], cp: u32) -> bool {
    ranges.iter().any(|&(start, end)| (start..=end).contains(&cp))
}

pub fn is_zero_width(cp: u32) -> bool {
    ZERO_WIDTH.contains(&cp)
}

pub fn is_bidi_control(cp: u32) -> bool {
    in_ranges(BIDI_CONTROLS, cp)
}

pub fn is_math_invisible(cp: u32) -> bool {
    (0x2061..=0x2064).contains(&cp)
}

pub fn is_hyphenation(cp: u32) -> bool {
    cp == 0x00AD
}

/// Mongolian free variation selectors (including the deprecated vowel
/// separator) and VS1..VS16.
pub fn is_variation_selector(cp: u32) -> bool {
    (0x180B..=0x180E).contains(&cp) || (0xFE00..=0xFE0F).contains(&cp)
}

/// VS15/VS16, which pick text or emoji presentation.
pub fn is_presentation_selector(cp: u32) -> bool {
    cp == VS15 as u32 || cp == VS16 as u32
}

pub fn is_format_control(cp: u32) -> bool {
    cp == 0x034F || (0xFFF9..=0xFFFB).contains(&cp)
}

pub fn is_shorthand_format(cp: u32) -> bool {
    (0x1BCA0..=0x1BCA3).contains(&cp)
}

pub fn is_tag_character(cp: u32) -> bool {
    (0xE0000..=0xE007F).contains(&cp)
}

pub fn is_ideographic_variation_selector(cp: u32) -> bool {
    (0xE0100..=0xE01EF).contains(&cp)
}

/// U+FDD0..U+FDEF and the last two codepoints of every plane.
pub fn is_noncharacter(cp: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&cp) || (cp <= 0x10FFFF && (cp & 0xFFFE) == 0xFFFE)
}

pub fn is_private_use_bmp(cp: u32) -> bool {
    (0xE000..=0xF8FF).contains(&cp)
}

/// Supplementary Private Use Areas A and B.
pub fn is_private_use_supplementary(cp: u32) -> bool {
    (0xF0000..=0xFFFFD).contains(&cp) || (0x100000..=0x10FFFD).contains(&cp)
}

/// Block-based heuristic used for detection only. The filter's isolated
/// mark pruning uses the full Unicode mark property instead.
pub fn is_combining_mark_heuristic(cp: u32) -> bool {
    matches!(
        cp,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

/// Skin tone modifiers U+1F3FB..U+1F3FF.
pub fn is_emoji_modifier(cp: u32) -> bool {
    (0x1F3FB..=0x1F3FF).contains(&cp)
}

/// Unicode space separators (Zs) other than U+0020.
pub fn is_space_separator(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}
