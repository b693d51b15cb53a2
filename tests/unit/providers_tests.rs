/*!
 * Tests for backend construction and error classification
 */

use std::time::Duration;

use cad_translator::app_config::{EngineConfig, TranslationEngine};
use cad_translator::errors::ProviderError;
use cad_translator::providers::deepl::DeepL;
use cad_translator::providers::google::Google;
use cad_translator::providers::mock::{MockBehavior, MockProvider};
use cad_translator::providers::openai::OpenAI;
use cad_translator::providers::{Provider, create_provider};
use serde_json::json;

#[test]
fn test_createProvider_withEachEngine_shouldNameBackend() {
    let google = create_provider(&EngineConfig::new(TranslationEngine::Google)).unwrap();
    assert_eq!(google.name(), "google");
    assert_eq!(google.model(), "default");

    let mut deepl = EngineConfig::new(TranslationEngine::DeepL);
    deepl.api_key = "key:fx".to_string();
    let deepl = create_provider(&deepl).unwrap();
    assert_eq!(deepl.name(), "deepl");
    assert!(deepl.probe_url().starts_with("https://api-free.deepl.com"));

    let mut openai = EngineConfig::new(TranslationEngine::OpenAI);
    openai.api_key = "sk-test".to_string();
    openai.model = "gpt-4o".to_string();
    let openai = create_provider(&openai).unwrap();
    assert_eq!(openai.name(), "openai");
    assert_eq!(openai.model(), "gpt-4o");
}

#[test]
fn test_createProvider_withMissingKey_shouldFail() {
    assert!(create_provider(&EngineConfig::new(TranslationEngine::DeepL)).is_err());
    assert!(create_provider(&EngineConfig::new(TranslationEngine::OpenAI)).is_err());
}

#[test]
fn test_isLanguageRejection_shouldOnlyFlagSourceLanguageProblems() {
    assert!(ProviderError::InvalidLanguage("zh".to_string()).is_language_rejection());
    assert!(
        ProviderError::ApiError {
            status_code: 400,
            message: "Value for 'source_lang' not supported".to_string(),
        }
        .is_language_rejection()
    );
    assert!(
        ProviderError::RequestFailed("Invalid source language: zz".to_string())
            .is_language_rejection()
    );
    assert!(!ProviderError::ConnectionError("timeout".to_string()).is_language_rejection());
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_language_rejection());
    assert!(!ProviderError::QuotaExceeded("456".to_string()).is_language_rejection());
}

#[test]
fn test_googleExtractText_withSeveralSegments_shouldConcatenate() {
    let body = json!([[["Sortie ", "出口", null], ["de secours", "安全", null]], null, "zh-CN"]);
    assert_eq!(Google::extract_text(&body).unwrap(), "Sortie de secours");
    assert!(matches!(
        Google::extract_text(&json!({"error": "x"})),
        Err(ProviderError::ParseError(_))
    ));
}

#[test]
fn test_deeplBuildRequest_shouldUseDeeplCodes() {
    let request = serde_json::to_value(DeepL::build_request("门", Some("zh"), "en")).unwrap();
    assert_eq!(request["source_lang"], "ZH");
    assert_eq!(request["target_lang"], "EN-US");
    assert_eq!(request["text"][0], "门");

    let auto = serde_json::to_value(DeepL::build_request("门", None, "fr")).unwrap();
    assert!(auto.get("source_lang").is_none());
}

#[test]
fn test_openaiSystemPrompt_withAutoDetect_shouldNotNameSource() {
    let prompt = OpenAI::system_prompt(None, "zh");
    assert!(prompt.contains("the detected language"));
    assert!(prompt.contains("Chinese"));
}

#[tokio::test]
async fn test_mockIntermittent_shouldFailEveryNthRequest() {
    let provider = MockProvider::new(MockBehavior::Intermittent { fail_every: 2 });
    assert!(provider.translate("a", Some("fr"), "zh").await.is_ok());
    assert!(provider.translate("b", Some("fr"), "zh").await.is_err());
    assert!(provider.translate("c", Some("fr"), "zh").await.is_ok());
}

#[tokio::test]
async fn test_mockTestConnection_shouldReflectBehavior() {
    assert!(
        MockProvider::working()
            .test_connection(Duration::from_millis(10))
            .await
            .is_ok()
    );
    assert!(
        MockProvider::failing()
            .test_connection(Duration::from_millis(10))
            .await
            .is_err()
    );
}
