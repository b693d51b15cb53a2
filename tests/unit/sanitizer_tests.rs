/*!
 * Tests for the text sanitizer
 */

use cad_translator::sanitizer::validity::printable_ratio;
use cad_translator::sanitizer::{RawText, TextSanitizer, ValidityPolicy, is_code_label};
use encoding_rs::{GBK, UTF_8};

#[test]
fn test_decodeSafely_withSurrogateInput_shouldNeverEmitSurrogates() {
    let sanitizer = TextSanitizer::default();
    let samples: Vec<Vec<u16>> = vec![
        vec![0xD800],
        vec![0xDFFF, 0x0041],
        vec![0x5929, 0xDC00, 0xD83D, 0x82B1],
        vec![0xD83D, 0xDE00, 0xD800, 0xD800],
        vec![0x0070, 0x006C, 0xDBFF],
    ];

    for utf16 in samples {
        let decoded = sanitizer.decode_safely(&RawText::Utf16 { utf16 });
        // A Rust string cannot hold surrogates; check it survives UTF-8 encoding unchanged
        let (bytes, _, had_errors) = UTF_8.encode(&decoded);
        assert!(!had_errors);
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), decoded);
        assert!(!decoded.contains('\u{FFFD}'));
    }
}

#[test]
fn test_decodeSafely_withGbkBytes_shouldDecodeChinese() {
    let sanitizer = TextSanitizer::default();
    let (bytes, _, _) = GBK.encode("卫生间");
    let decoded = sanitizer.decode_safely(&RawText::Bytes {
        bytes: bytes.into_owned(),
    });
    assert_eq!(decoded, "卫生间");
}

#[test]
fn test_decodeSafely_withUndecodableBytes_shouldDropReplacementCharacters() {
    let sanitizer = TextSanitizer::new(vec![UTF_8], UTF_8, ValidityPolicy::default());
    let decoded = sanitizer.decode_safely(&RawText::Bytes {
        bytes: vec![b'm', b'u', b'r', 0xFF, 0xFE],
    });
    assert_eq!(decoded, "mur");
}

#[test]
fn test_decodeSafely_withEscapedBytes_shouldRestoreAccents() {
    let sanitizer = TextSanitizer::default();
    assert_eq!(
        sanitizer.decode_safely(&RawText::from("Entr\\xe9e")),
        "Entrée"
    );
    assert_eq!(
        sanitizer.decode_safely(&RawText::from("Fa\u{c3}\u{a7}ade")),
        "Façade"
    );
}

#[test]
fn test_encodeSafely_withGbkOutput_shouldDropUnmappableCharacters() {
    let sanitizer = TextSanitizer::new(vec![UTF_8], GBK, ValidityPolicy::default());
    let encoded = sanitizer.encode_safely("门\u{1F6AA}");
    let (_, _, had_errors) = GBK.encode(&encoded);
    assert!(!had_errors);
    assert_eq!(encoded, "门");
}

#[test]
fn test_cleanFormatting_withMTextCodes_shouldKeepOnlyText() {
    let sanitizer = TextSanitizer::default();
    assert_eq!(
        sanitizer.clean_formatting(r"{\fArial|b1|i0|c0|p34;\H2.5;卫生间\Ptoilettes}"),
        "卫生间 toilettes"
    );
    assert_eq!(sanitizer.clean_formatting(r"\C1;  墙  \~ 面 "), "墙 面");
}

#[test]
fn test_isValidForTranslation_withLowPrintableRatio_shouldReject() {
    let sanitizer = TextSanitizer::default();
    // 3 readable characters out of 10
    let garbled = "abc█████▓▒";
    assert_eq!(garbled.chars().count(), 10);
    assert!((printable_ratio(garbled) - 0.3).abs() < f32::EPSILON);
    assert!(!sanitizer.is_valid_for_translation(garbled));
}

#[test]
fn test_isValidForTranslation_withEdgeCases_shouldFollowPolicy() {
    let sanitizer = TextSanitizer::default();
    assert!(!sanitizer.is_valid_for_translation(""));
    assert!(!sanitizer.is_valid_for_translation("   "));
    assert!(sanitizer.is_valid_for_translation("门"));
    assert!(sanitizer.is_valid_for_translation("Ø 120 mm"));

    let strict = TextSanitizer::new(
        vec![UTF_8],
        UTF_8,
        ValidityPolicy {
            min_chars: 2,
            min_printable_ratio: 0.8,
        },
    );
    assert!(!strict.is_valid_for_translation("门"));
}

#[test]
fn test_isCodeLabel_shouldRecognizeNumbersAndGridReferences() {
    for code in ["12.5", "[A-1]", "(B2)", "±0.000", "1:100", "%%c50"] {
        let cleaned = cad_translator::sanitizer::clean_formatting(code);
        assert!(is_code_label(&cleaned), "{} should be a code", code);
    }
    for label in ["门", "A-101 Bureau", "Cuisine"] {
        assert!(!is_code_label(label), "{} should not be a code", label);
    }
}
