/*!
 * Text sanitizer for drawing labels.
 *
 * Repairs encoding damage, strips characters that cannot live in a drawing,
 * removes MTEXT formatting codes and decides whether a label is worth
 * translating. Every function here is infallible.
 */

pub mod encoding;
pub mod formatting;
pub mod validity;

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::warn;

pub use encoding::{RawText, is_invalid_char, strip_invalid_chars};
pub use formatting::{clean_formatting, collapse_whitespace};
pub use validity::{Script, ValidityPolicy, is_code_label};

/// Sanitizer bound to the candidate input encodings and one output encoding.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    candidates: Vec<&'static Encoding>,
    output: &'static Encoding,
    policy: ValidityPolicy,
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self {
            candidates: encoding::DEFAULT_CANDIDATE_ENCODINGS.clone(),
            output: UTF_8,
            policy: ValidityPolicy::default(),
        }
    }
}

impl TextSanitizer {
    pub fn new(
        candidates: Vec<&'static Encoding>,
        output: &'static Encoding,
        policy: ValidityPolicy,
    ) -> Self {
        Self {
            candidates,
            output,
            policy,
        }
    }

    /// Builds a sanitizer from encoding labels as found in the config file.
    pub fn from_labels(
        candidate_labels: &[String],
        output_label: &str,
        policy: ValidityPolicy,
    ) -> Result<Self> {
        let candidates = candidate_labels
            .iter()
            .map(|label| {
                encoding::encoding_for_label(label)
                    .ok_or_else(|| anyhow!("Unknown text encoding: {}", label))
            })
            .collect::<Result<Vec<_>>>()?;
        let output = encoding::encoding_for_label(output_label)
            .ok_or_else(|| anyhow!("Unknown output encoding: {}", output_label))?;
        Ok(Self::new(candidates, output, policy))
    }

    pub fn policy(&self) -> &ValidityPolicy {
        &self.policy
    }

    pub fn output_encoding(&self) -> &'static Encoding {
        self.output
    }

    /// Turns stored drawing text into a clean string. Never fails.
    pub fn decode_safely(&self, raw: &RawText) -> String {
        let decoded = match raw {
            RawText::Text(text) => {
                let repaired = encoding::repair_text(text);
                if repaired != *text {
                    warn!(
                        "Repaired damaged text {:?} -> {:?}",
                        strip_invalid_chars(text),
                        repaired
                    );
                }
                repaired
            }
            RawText::Bytes { bytes } => encoding::decode_bytes(bytes, &self.candidates),
            RawText::Utf16 { utf16 } => encoding::decode_utf16_lossless(utf16),
        };
        encoding::fit_to_encoding(&decoded, self.output)
    }

    /// Prepares text for writing: accent repair, invalid character removal,
    /// and removal of anything the output encoding cannot hold.
    pub fn encode_safely(&self, text: &str) -> String {
        let repaired = encoding::repair_text(text);
        encoding::fit_to_encoding(&repaired, self.output)
    }

    pub fn clean_formatting(&self, text: &str) -> String {
        clean_formatting(text)
    }

    pub fn is_valid_for_translation(&self, text: &str) -> bool {
        self.policy.is_valid_for_translation(text)
    }
}
