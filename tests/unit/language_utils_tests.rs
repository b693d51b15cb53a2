/*!
 * Tests for language utility functions
 */

use cad_translator::language_utils::{
    deepl_source_code, deepl_target_code, get_language_name, google_code, language_codes_match,
    normalize_locale, validate_language_code,
};

#[test]
fn test_normalizeLocale_withRegionalTags_shouldReturnIso6391() {
    assert_eq!(normalize_locale("zh-CN").unwrap(), "zh");
    assert_eq!(normalize_locale("zh_Hans").unwrap(), "zh");
    assert_eq!(normalize_locale("FR-fr").unwrap(), "fr");
    assert_eq!(normalize_locale("fra").unwrap(), "fr");
    assert_eq!(normalize_locale("chi").unwrap(), "zh");
    assert_eq!(normalize_locale(" en ").unwrap(), "en");
}

#[test]
fn test_normalizeLocale_withInvalidCodes_shouldFail() {
    assert!(normalize_locale("").is_err());
    assert!(normalize_locale("xx").is_err());
    assert!(normalize_locale("french").is_err());
    assert!(validate_language_code("zz-ZZ").is_err());
    assert!(validate_language_code("zh").is_ok());
}

#[test]
fn test_languageCodesMatch_shouldCompareNormalizedCodes() {
    assert!(language_codes_match("zh", "zh-CN"));
    assert!(language_codes_match("fre", "fr"));
    assert!(!language_codes_match("fr", "en"));
    assert!(!language_codes_match("xx", "xx"));
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("zh-CN").unwrap(), "Chinese");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_backendSpellings_shouldMatchEngineConventions() {
    assert_eq!(google_code("zh"), "zh-CN");
    assert_eq!(google_code("fr-FR"), "fr");
    assert_eq!(deepl_source_code("zh"), "ZH");
    assert_eq!(deepl_target_code("zh"), "ZH-HANS");
    assert_eq!(deepl_target_code("en"), "EN-US");
    assert_eq!(deepl_target_code("fr"), "FR");
}
