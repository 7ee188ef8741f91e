//! # unisweep
//!
//! A Unicode sanitization engine for untrusted text: chat messages, scraped
//! pages, pasted documents and LLM input. It strips markup, normalizes,
//! removes invisible and format-control characters, and reports what it
//! found, while keeping emoji sequences and script-specific joiners intact.
//!
//! ## Quick Start
//!
//! ```
//! use unisweep::{sanitize, Profile};
//!
//! let clean = sanitize("**Hello**\u{200B}world\u{FEFF}", &Profile::default(), None);
//! assert_eq!(clean, "Hello world");
//! ```
//!
//! ## Pipeline
//!
//! 1. Markup stripping (HTML/XML, Markdown, optional code fences)
//! 2. Unicode normalization (NFC by default)
//! 3. Emoji-sequence guard
//! 4. Character filter pass (hard allow, hard block, language allowance, rules)
//! 5. Isolated combining-mark pruning and late bidi strip
//! 6. Whitespace normalization and final normalization
//!
//! ## Features
//!
//! - `parallel` (default): Rayon-backed [`Sanitizer::sanitize_batch`]

pub mod classify;
pub mod detect;
pub mod emoji;
pub mod error;
pub mod filter;
pub mod markup;
pub mod normalize;
pub mod profile;
pub mod sanitize;
pub mod whitespace;

// Re-exports
pub use classify::{classify, classify_char, Category};
pub use detect::{detect, detect_utf16, DetectionResult};
pub use error::{Error, Result};
pub use filter::filter;
pub use markup::strip_markup;
pub use normalize::NormalizationForm;
pub use profile::{
    CategoryFlags, LanguageAllowance, MarkupFlags, Preset, PrivateUseScope, Profile,
    VariationSelectorPolicy,
};
pub use sanitize::{sanitize, sanitize_utf16, sanitize_with_stats, Sanitized};
pub use whitespace::normalize_whitespace;

use std::path::Path;

/// Builder for sanitizing with a fixed profile and language.
///
/// # Example
///
/// ```
/// use unisweep::{Preset, Sanitizer};
///
/// let sanitizer = Sanitizer::new()
///     .with_preset(Preset::MaxSterile)
///     .with_language("fa");
///
/// assert_eq!(sanitizer.sanitize("\u{FB01}x\u{E000}"), "fix");
/// ```
#[derive(Debug, Clone)]
pub struct Sanitizer {
    profile: Profile,
    language: Option<String>,
    parallel: bool,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    /// Creates a sanitizer with the default profile and no language.
    pub fn new() -> Self {
        Self {
            profile: Profile::default(),
            language: None,
            parallel: true,
        }
    }

    /// Uses `profile` for every call.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Uses the profile of a named preset.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.profile = preset.profile();
        self
    }

    /// Loads the profile from a JSON file, merged over the defaults.
    pub fn with_profile_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.profile = Profile::from_json_file(path)?;
        Ok(self)
    }

    /// Applies the allowance for this language tag.
    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    /// Disables parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn sanitize(&self, text: &str) -> String {
        sanitize(text, &self.profile, self.language())
    }

    pub fn sanitize_with_stats(&self, text: &str) -> Sanitized {
        sanitize_with_stats(text, &self.profile, self.language())
    }

    pub fn sanitize_utf16(&self, units: &[u16]) -> String {
        sanitize_utf16(units, &self.profile, self.language())
    }

    /// Same as [`detect`]: detection reads the raw text and does not depend on
    /// the profile or language. Offered here so one handle covers both calls.
    pub fn detect(&self, text: &str) -> DetectionResult {
        detect(text)
    }

    /// Sanitizes many texts, in parallel when the `parallel` feature is enabled.
    ///
    /// Output order matches input order.
    pub fn sanitize_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            use rayon::prelude::*;
            return texts
                .par_iter()
                .map(|text| self.sanitize(text.as_ref()))
                .collect();
        }

        texts.iter().map(|text| self.sanitize(text.as_ref())).collect()
    }
}
