/*!
 * Finalization of backend output.
 *
 * Leaked hint prefixes are cut, glossary terms are forced, the pair's
 * correction table is applied and the result is made safe to write.
 * Applying `post_process` to its own output changes nothing.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::sanitizer::{TextSanitizer, collapse_whitespace};
use crate::translation::glossary::LanguagePairConfig;

/// Upper bound on correction passes; every table reaches its fixed point well before.
const MAX_CORRECTION_PASSES: usize = 8;

/// Hint label, optionally translated, through the last text label
static LEAKED_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^.*?(?:architectural terms|建筑术语|termes (?:d'architecture|architecturaux))\s*[:：].*(?:text|texte|原文)\s*[:：]\s*",
    )
    .expect("leaked hint regex is valid")
});

/// Hint label and its term list when the text label got lost
static LEAKED_TERMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*(?:architectural terms|建筑术语|termes (?:d'architecture|architecturaux))\s*[:：][^.。]*[.。]\s*",
    )
    .expect("leaked terms regex is valid")
});

/// Cut anything a backend echoed back from a context hint
pub fn strip_leaked_hint(output: &str) -> String {
    let without_hint = LEAKED_HINT.replace(output, "");
    LEAKED_TERMS.replace(&without_hint, "").into_owned()
}

/// Apply an ordered replacement table until nothing changes
pub fn apply_corrections(text: &str, corrections: &[(&str, &str)]) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_CORRECTION_PASSES {
        let mut next = current.clone();
        for (wrong, right) in corrections {
            if next.contains(wrong) {
                next = next.replace(wrong, right);
            }
        }
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Finalize a backend answer for `cleaned_input`
pub fn post_process(
    backend_output: &str,
    cleaned_input: &str,
    pair: &LanguagePairConfig,
    sanitizer: &TextSanitizer,
) -> String {
    let stripped = strip_leaked_hint(backend_output);

    let forced = match pair.glossary.get(cleaned_input.trim()) {
        Some(term) => {
            if stripped.trim() != term {
                debug!(
                    "Forcing glossary term '{}' over backend output '{}'",
                    term,
                    stripped.trim()
                );
            }
            term.to_string()
        }
        None => stripped,
    };

    let corrected = apply_corrections(&forced, &pair.corrections);
    sanitizer.encode_safely(&collapse_whitespace(&corrected))
}
