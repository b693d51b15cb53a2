/*!
 * Tests for app configuration functionality
 */

use cad_translator::app_config::{
    Config, EngineConfig, IdenticalOutputPolicy, LogLevel, TranslationEngine,
};
use cad_translator::translation::PairKey;

/// Test default configuration values
#[test]
fn test_default_config_shouldBeValid() {
    let config = Config::default();

    assert_eq!(config.pair, PairKey::ZhToFr);
    assert_eq!(config.translation.engine, TranslationEngine::Google);
    assert_eq!(config.translation.available_engines.len(), 3);
    assert_eq!(config.text.min_chars, 1);
    assert!((config.text.min_printable_ratio - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.document.output_encoding, "utf-8");
    assert!(!config.document.include_blocks);
    assert!(config.cache.enabled);
    assert!(!config.cache.persistent);
    assert!(config.connectivity.enabled);
    assert_eq!(
        config.translation.common.identical_output,
        IdenticalOutputPolicy::Fallback
    );
    assert!(config.translation.common.auto_detect_fallback);
    assert_eq!(config.log_level, LogLevel::Info);

    assert!(config.validate().is_ok());
}

/// Test that a sparse file is completed with defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "pair": "fr_to_zh",
        "translation": { "engine": "deepl",
            "available_engines": [{ "type": "deepl", "api_key": "abc:fx" }] },
        "document": { "mtext_font": "SimSun", "output_encoding": "gbk" }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.pair, PairKey::FrToZh);
    assert_eq!(config.translation.engine, TranslationEngine::DeepL);
    assert_eq!(config.translation.get_api_key(), "abc:fx");
    assert_eq!(config.translation.common.rate_limit_delay_ms, 500);
    assert_eq!(config.document.mtext_font.as_deref(), Some("SimSun"));
    assert_eq!(config.document.input_encodings[0], "utf-8");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withKeylessPaidEngine_shouldFail() {
    let mut config = Config::default();
    config.translation.engine = TranslationEngine::OpenAI;
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("OpenAI"));
}

#[test]
fn test_validate_withUnknownEncoding_shouldFail() {
    let mut config = Config::default();
    config.document.output_encoding = "ebcdic-klingon".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.document.input_encodings.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOutOfRangeRatio_shouldFail() {
    let mut config = Config::default();
    config.text.min_printable_ratio = 1.5;
    assert!(config.validate().is_err());

    config.text.min_printable_ratio = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withMalformedUrls_shouldFail() {
    let mut config = Config::default();
    config.connectivity.probe_url = Some("not a url".to_string());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.available_engines[0].endpoint = "://broken".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_activeEngineConfig_withMissingEntry_shouldUseDefaults() {
    let mut config = Config::default();
    config.translation.available_engines = vec![EngineConfig::new(TranslationEngine::Google)];
    config.translation.engine = TranslationEngine::OpenAI;

    let engine = config.translation.active_engine_config();
    assert_eq!(engine.engine_type, TranslationEngine::OpenAI);
    assert_eq!(engine.model, "gpt-4o-mini");
    assert_eq!(engine.timeout_secs, 30);
}

#[test]
fn test_translationEngine_fromStr_shouldAcceptAliases() {
    assert_eq!("DeepL".parse::<TranslationEngine>().unwrap(), TranslationEngine::DeepL);
    assert_eq!("chatgpt".parse::<TranslationEngine>().unwrap(), TranslationEngine::OpenAI);
    assert!("babelfish".parse::<TranslationEngine>().is_err());
    assert_eq!(TranslationEngine::OpenAI.to_string(), "openai");
    assert!(!TranslationEngine::Google.requires_api_key());
}

#[test]
fn test_config_roundTripThroughJson_shouldKeepPolicy() {
    let mut config = Config::default();
    config.translation.common.identical_output = IdenticalOutputPolicy::Accept;
    config.pair = PairKey::EnToZh;

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"identical_output\": \"accept\""));
    assert!(json.contains("\"pair\": \"en_to_zh\""));

    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.translation.common.identical_output, IdenticalOutputPolicy::Accept);
    assert_eq!(parsed.pair, PairKey::EnToZh);
}
