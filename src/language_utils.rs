use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for drawing translation
///
/// Language pairs are stored as ISO 639-1 codes. Backends want their own
/// spellings (`zh-CN` for Google, `ZH`/`EN-US` for DeepL, an English name
/// for chat models); the mapping lives here.

/// Reduce a locale tag (`zh-cn`, `zh_Hans`, `fr-FR`, `fra`) to its ISO 639-1 code
pub fn normalize_locale(code: &str) -> Result<String> {
    let lowered = code.trim().to_lowercase().replace('_', "-");
    let primary = lowered.split('-').next().unwrap_or_default();

    match primary.len() {
        2 => Language::from_639_1(primary)
            .map(|_| primary.to_string())
            .ok_or_else(|| anyhow!("Invalid language code: {}", code)),
        3 => {
            // ISO 639-2/B spellings still show up in older configs
            let part2t = match primary {
                "fre" => "fra",
                "chi" => "zho",
                "ger" => "deu",
                other => other,
            };
            Language::from_639_3(part2t)
                .and_then(|lang| lang.to_639_1())
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Invalid language code: {}", code))
        }
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Validate that a code names a real language
pub fn validate_language_code(code: &str) -> Result<()> {
    normalize_locale(code).map(|_| ())
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_locale(code1), normalize_locale(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_locale(code)?;
    let lang = Language::from_639_1(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Code spelling expected by the Google translate endpoint
pub fn google_code(code: &str) -> String {
    match normalize_locale(code).as_deref() {
        Ok("zh") => "zh-CN".to_string(),
        Ok(other) => other.to_string(),
        Err(_) => code.to_string(),
    }
}

/// Source code spelling expected by DeepL
pub fn deepl_source_code(code: &str) -> String {
    normalize_locale(code)
        .unwrap_or_else(|_| code.to_string())
        .to_uppercase()
}

/// Target code spelling expected by DeepL; English needs a regional variant
pub fn deepl_target_code(code: &str) -> String {
    match deepl_source_code(code).as_str() {
        "EN" => "EN-US".to_string(),
        "PT" => "PT-PT".to_string(),
        "ZH" => "ZH-HANS".to_string(),
        other => other.to_string(),
    }
}
