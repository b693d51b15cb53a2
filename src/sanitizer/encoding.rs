/*!
 * Encoding repair for text coming out of legacy drawings.
 *
 * Drawing text arrives as well-formed strings, as raw bytes in an unknown
 * codepage, or as UTF-16 units that may hold unpaired surrogates. Everything
 * here is total: the worst case is an empty string, never an error.
 */

use std::borrow::Cow;

use encoding_rs::{Encoding, GB18030, GBK, UTF_8, WINDOWS_1252};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Text as stored by the drawing, before any repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    /// Already decoded text, possibly carrying mojibake or escaped bytes
    Text(String),
    /// Bytes in an unknown legacy codepage
    Bytes { bytes: Vec<u8> },
    /// UTF-16 code units, unpaired surrogates allowed
    Utf16 { utf16: Vec<u16> },
}

impl RawText {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Bytes { bytes } => bytes.is_empty(),
            Self::Utf16 { utf16 } => utf16.is_empty(),
        }
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Decoding order for byte input: UTF-8, Chinese double-byte, then Western 8-bit.
pub static DEFAULT_CANDIDATE_ENCODINGS: Lazy<Vec<&'static Encoding>> =
    Lazy::new(|| vec![UTF_8, GBK, GB18030, WINDOWS_1252]);

/// Escaped byte spellings and Latin-1 mojibake seen in French drawing text.
const ACCENT_REPAIRS: &[(&str, &str)] = &[
    ("\\xc9", "É"),
    ("\\xe9", "é"),
    ("\\xe8", "è"),
    ("\\xea", "ê"),
    ("\\xf4", "ô"),
    ("\\xe0", "à"),
    ("\\xe7", "ç"),
    ("\\xf9", "ù"),
    ("\\xfb", "û"),
    ("\\xee", "î"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ãª", "ê"),
    ("Ã«", "ë"),
    ("Ã¢", "â"),
    ("Ã§", "ç"),
    ("Ã´", "ô"),
    ("Ã®", "î"),
    ("Ã¯", "ï"),
    ("Ã¹", "ù"),
    ("Ã»", "û"),
    ("Ã‰", "É"),
    ("Ã\u{a0}", "à"),
    ("Ã ", "à"),
];

static BYTE_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\x([0-9A-Fa-f]{2})").expect("byte escape regex is valid"));

/// Characters that must never reach a drawing, a report or a log line.
///
/// Covers control characters, invisible format characters, private use,
/// noncharacters, the replacement character and the two Thaana code points
/// that legacy GBK fonts produce for broken glyphs.
pub fn is_invalid_char(c: char) -> bool {
    let cp = c as u32;
    if c.is_control() {
        return true;
    }
    matches!(
        cp,
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x0780
            | 0x07B0
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xE000..=0xF8FF
            | 0xFDD0..=0xFDEF
            | 0xFEFF
            | 0xFFF9..=0xFFFD
            | 0xF0000..=0x10FFFF
    ) || (cp & 0xFFFE) == 0xFFFE
}

/// Removes invalid characters. Tabs and line breaks become plain spaces.
pub fn strip_invalid_chars(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => result.push(' '),
            c if is_invalid_char(c) => {}
            c => result.push(c),
        }
    }
    result
}

/// Applies the fixed accent table, then undoes a UTF-8 as Windows-1252 misread.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    let mut repaired = Cow::Borrowed(text);
    for (broken, fixed) in ACCENT_REPAIRS {
        if repaired.contains(broken) {
            repaired = Cow::Owned(repaired.replace(broken, fixed));
        }
    }

    if let Some(recovered) = reinterpret_as_utf8(&repaired) {
        return Cow::Owned(recovered);
    }
    repaired
}

/// Re-reads text whose UTF-8 bytes were decoded as Windows-1252.
fn reinterpret_as_utf8(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return None;
    }
    let recovered = std::str::from_utf8(&bytes).ok()?;
    (recovered != text).then(|| recovered.to_string())
}

/// Turns literal `\xHH` escapes into bytes and decodes them.
///
/// The surrounding text is read as Latin-1 bytes, so text holding anything
/// above U+00FF (Han labels) is left alone. UTF-8 is tried first,
/// Windows-1252 is the single alternate.
fn decode_byte_escapes(text: &str) -> Option<String> {
    if !BYTE_ESCAPE.is_match(text) {
        return None;
    }
    let mut bytes = Vec::with_capacity(text.len());
    let mut last = 0;
    for caps in BYTE_ESCAPE.captures_iter(text) {
        let whole = caps.get(0)?;
        push_latin1(&text[last..whole.start()], &mut bytes)?;
        bytes.push(u8::from_str_radix(&caps[1], 16).ok()?);
        last = whole.end();
    }
    push_latin1(&text[last..], &mut bytes)?;

    match std::str::from_utf8(&bytes) {
        Ok(decoded) => Some(decoded.to_string()),
        Err(_) => {
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
            Some(decoded.into_owned())
        }
    }
}

fn push_latin1(segment: &str, bytes: &mut Vec<u8>) -> Option<()> {
    for c in segment.chars() {
        bytes.push(u8::try_from(u32::from(c)).ok()?);
    }
    Some(())
}

/// Repairs a decoded string: accent table, invalid characters, byte escapes.
pub fn repair_text(text: &str) -> String {
    let repaired = repair_mojibake(text);
    let stripped = strip_invalid_chars(&repaired);
    match decode_byte_escapes(&stripped) {
        Some(decoded) => strip_invalid_chars(&repair_mojibake(&decoded)),
        None => stripped,
    }
}

/// Decodes raw bytes against the candidate encodings in order.
///
/// The first candidate that decodes without malformed sequences wins. When
/// none does, the bytes are read lossily and replacement characters dropped.
pub fn decode_bytes(bytes: &[u8], candidates: &[&'static Encoding]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    for encoding in candidates {
        if let Some(decoded) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());
            return repair_text(&decoded);
        }
    }
    warn!(
        "No candidate encoding fits {} bytes, decoding lossily",
        bytes.len()
    );
    repair_text(&String::from_utf8_lossy(bytes))
}

/// Decodes UTF-16 units, dropping unpaired surrogates.
pub fn decode_utf16_lossless(units: &[u16]) -> String {
    let mut dropped = 0usize;
    let decoded: String = char::decode_utf16(units.iter().copied())
        .filter_map(|unit| match unit {
            Ok(c) => Some(c),
            Err(_) => {
                dropped += 1;
                None
            }
        })
        .collect();
    if dropped > 0 {
        warn!("Dropped {} unpaired surrogate unit(s) from drawing text", dropped);
    }
    repair_text(&decoded)
}

/// Drops characters the output encoding cannot represent.
pub fn fit_to_encoding(text: &str, encoding: &'static Encoding) -> String {
    if encoding.output_encoding() == UTF_8 {
        return text.to_string();
    }
    let (_, _, had_errors) = encoding.encode(text);
    if !had_errors {
        return text.to_string();
    }
    let mut buf = [0u8; 4];
    let kept: String = text
        .chars()
        .filter(|c| {
            let (_, _, unmappable) = encoding.encode(c.encode_utf8(&mut buf));
            !unmappable
        })
        .collect();
    warn!(
        "Dropped {} character(s) not representable in {}",
        text.chars().count() - kept.chars().count(),
        encoding.name()
    );
    kept
}

/// Resolves an encoding label such as `gbk` or `cp1252`.
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label_no_replacement(label.trim().as_bytes())
}
