//! Detection reporter.
//!
//! Counts tracked codepoints without modifying the text.

use crate::classify::{classify_char, Category};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of tracked codepoints found in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    /// Number of tracked codepoints.
    pub total_count: usize,
    /// Count per category. Every tracked category is present, zero or not.
    pub categories: BTreeMap<Category, usize>,
    /// Positions of each hit, in ascending order.
    ///
    /// Scalar indices for [`detect`], UTF-16 code unit indices for
    /// [`detect_utf16`].
    pub positions: Vec<usize>,
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self {
            total_count: 0,
            categories: Category::all().into_iter().map(|c| (c, 0)).collect(),
            positions: Vec::new(),
        }
    }
}

impl DetectionResult {
    /// Count for one category.
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    /// True when nothing tracked was found.
    pub fn is_clean(&self) -> bool {
        self.total_count == 0
    }

    fn record(&mut self, category: Category, position: usize) {
        if category == Category::None {
            return;
        }
        *self.categories.entry(category).or_insert(0) += 1;
        self.total_count += 1;
        self.positions.push(position);
    }
}

/// Reports tracked codepoints in `text`, with scalar-index positions.
///
/// # Example
///
/// ```
/// use unisweep::{detect, Category};
///
/// let result = detect("a\u{200B}b\u{FEFF}c");
/// assert_eq!(result.total_count, 2);
/// assert_eq!(result.count(Category::ZeroWidth), 1);
/// assert_eq!(result.count(Category::Bom), 1);
/// assert_eq!(result.positions, vec![1, 3]);
/// ```
pub fn detect(text: &str) -> DetectionResult {
    let mut result = DetectionResult::default();
    for (index, c) in text.chars().enumerate() {
        result.record(classify_char(c), index);
    }
    result
}

/// Reports tracked codepoints in UTF-16 input, with code unit positions.
///
/// Unpaired surrogates are reported under [`Category::Surrogate`].
pub fn detect_utf16(units: &[u16]) -> DetectionResult {
    let mut result = DetectionResult::default();
    let mut offset = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => {
                result.record(classify_char(c), offset);
                offset += c.len_utf16();
            }
            Err(_) => {
                result.record(Category::Surrogate, offset);
                offset += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_counts_and_positions() {
        let result = detect("a\u{200B}b\u{FEFF}c");
        assert_eq!(result.total_count, 2);
        assert_eq!(result.count(Category::ZeroWidth), 1);
        assert_eq!(result.count(Category::Bom), 1);
        assert_eq!(result.positions, vec![1, 3]);
    }

    #[test]
    fn test_clean_text() {
        let result = detect("plain ascii text");
        assert!(result.is_clean());
        assert!(result.positions.is_empty());
        assert_eq!(result.categories.len(), Category::all().len());
        assert!(result.categories.values().all(|&n| n == 0));
    }

    #[test]
    fn test_positions_are_scalar_indices() {
        // Emoji are one scalar each, regardless of UTF-8 or UTF-16 width
        let result = detect("\u{1F468}\u{200D}\u{1F4BB}\u{E000}");
        assert_eq!(result.positions, vec![1, 3]);
        assert_eq!(result.count(Category::PrivateUse), 1);
    }

    #[test]
    fn test_all_categories_reported() {
        let text = "\u{200C}\u{202E}\u{2062}\u{00AD}\u{FE0F}\u{034F}\u{1BCA1}\u{E0067}\u{E0100}\u{FFFE}\u{F0000}\u{0301}";
        let result = detect(text);
        assert_eq!(result.total_count, 12);
        for category in Category::all() {
            let expected = usize::from(!matches!(category, Category::Bom | Category::Surrogate));
            assert_eq!(result.count(category), expected, "{category}");
        }
    }

    #[test]
    fn test_detect_utf16_lone_surrogates() {
        // 'a', lone high surrogate, ZWSP, surrogate pair (U+1F600), lone low surrogate
        let units = [0x0061, 0xD800, 0x200B, 0xD83D, 0xDE00, 0xDC00];
        let result = detect_utf16(&units);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.count(Category::Surrogate), 2);
        assert_eq!(result.count(Category::ZeroWidth), 1);
        assert_eq!(result.positions, vec![1, 2, 5]);
    }

    #[test]
    fn test_serializes_category_names() {
        let json = serde_json::to_string(&detect("a\u{200B}")).unwrap();
        assert!(json.contains("\"total_count\":1"));
        assert!(json.contains("\"ZERO_WIDTH\":1"));
        assert!(json.contains("\"positions\":[1]"));
    }
}
