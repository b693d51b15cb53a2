/*!
 * Heuristics deciding whether drawing text is worth translating.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::formatting::clean_formatting;

/// Minimum share of readable characters for text to be sent to a backend.
pub const DEFAULT_MIN_PRINTABLE_RATIO: f32 = 0.7;

/// Single Han characters (门, 窗) are meaningful drawing labels.
pub const DEFAULT_MIN_CHARS: usize = 1;

/// Text made of digits, punctuation, symbols and spaces only.
static SYMBOLIC_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\d\p{P}\p{S}]+$").expect("symbolic label regex is valid"));

/// Bracketed grid or axis references such as `[A-1]` or `(B2)`.
static GRID_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\[\(\{<]\s*[A-Za-z]{0,3}\s*[-_./:]?\s*\d+(?:\s*[-_./:]\s*[A-Za-z\d]+)*\s*[\]\)\}>]$")
        .expect("grid reference regex is valid")
});

/// Writing system a language pair reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Han,
    Latin,
}

impl Script {
    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Han => is_han(c),
            Self::Latin => c.is_alphabetic() && (c as u32) < 0x0250,
        }
    }
}

fn is_han(c: char) -> bool {
    matches!(c as u32, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF)
}

/// Whether a character belongs to the readable set for zh/fr/en drawings.
pub fn is_readable_char(c: char) -> bool {
    if c.is_whitespace() && !c.is_control() {
        return true;
    }
    matches!(c as u32,
        0x0021..=0x007E        // ASCII graphic
        | 0x00A0..=0x024F      // Latin-1 supplement, Latin extended A/B
        | 0x0370..=0x03FF      // Greek (µ, Ω, Δ)
        | 0x2010..=0x205E      // general punctuation
        | 0x2100..=0x22FF      // letterlike, number forms, arrows, math
        | 0x2300               // ⌀
        | 0x2460..=0x24FF      // enclosed alphanumerics (① axis marks)
        | 0x2500..=0x257F      // box drawing
        | 0x25A0..=0x25FF      // geometric shapes
        | 0x3000..=0x303F      // CJK symbols and punctuation
        | 0xFF01..=0xFFEF      // fullwidth forms
    ) || is_han(c)
}

/// Share of readable characters, 1.0 for empty text.
pub fn printable_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 1.0;
    }
    let readable = text.chars().filter(|c| is_readable_char(*c)).count();
    readable as f32 / total as f32
}

/// Codes and labels that are never sent to a backend.
pub fn is_code_label(cleaned: &str) -> bool {
    let trimmed = cleaned.trim();
    !trimmed.is_empty() && (SYMBOLIC_LABEL.is_match(trimmed) || GRID_REFERENCE.is_match(trimmed))
}

/// Length and readability thresholds applied to cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidityPolicy {
    /// Minimum cleaned length in code points
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Minimum share of readable characters
    #[serde(default = "default_min_printable_ratio")]
    pub min_printable_ratio: f32,
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

fn default_min_printable_ratio() -> f32 {
    DEFAULT_MIN_PRINTABLE_RATIO
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            min_printable_ratio: DEFAULT_MIN_PRINTABLE_RATIO,
        }
    }
}

impl ValidityPolicy {
    pub fn is_valid_for_translation(&self, text: &str) -> bool {
        let cleaned = clean_formatting(text);
        if cleaned.trim().is_empty() {
            return false;
        }
        if cleaned.chars().count() < self.min_chars {
            return false;
        }
        printable_ratio(&cleaned) >= self.min_printable_ratio
    }
}
