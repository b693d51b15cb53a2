/*!
 * Tests for the translation dispatcher
 */

use std::sync::Arc;

use cad_translator::app_config::IdenticalOutputPolicy;
use cad_translator::providers::mock::MockProvider;
use cad_translator::sanitizer::TextSanitizer;
use cad_translator::translation::{
    DispatchOptions, PairKey, TranslationCache, TranslationOutcome, TranslationService,
};

use crate::common::{fast_options, mock_service};

#[tokio::test]
async fn test_translate_withRepeatedText_shouldCallBackendOnce() {
    let provider = MockProvider::working().with_responses([("楼梯间", "cage d'escalier")]);
    let service = mock_service(provider.clone());

    let first = service
        .translate_with_outcome("楼梯间", Some(PairKey::ZhToFr))
        .await;
    let second = service
        .translate_with_outcome("楼梯间", Some(PairKey::ZhToFr))
        .await;

    assert_eq!(first.text, "cage d'escalier");
    assert_eq!(first.outcome, TranslationOutcome::Translated);
    assert_eq!(second.text, first.text);
    assert_eq!(second.outcome, TranslationOutcome::CacheHit);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withOtherPair_shouldNotReuseCacheEntry() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone());

    let french = service.translate("平面", Some(PairKey::ZhToFr)).await;
    let english = service.translate("平面", Some(PairKey::ZhToEn)).await;

    assert_eq!(french, "[fr] 平面");
    assert_eq!(english, "[en] 平面");
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withDisabledCache_shouldCallBackendEachTime() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone()).with_cache(TranslationCache::new(false));

    service.translate("平面", Some(PairKey::ZhToFr)).await;
    service.translate("平面", Some(PairKey::ZhToFr)).await;

    assert_eq!(provider.request_count(), 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_translate_withCodeLabels_shouldNeverReachBackend() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone());

    for code in ["12.5", "[A-1]", r"{\H2.5;1:100}"] {
        let result = service
            .translate_with_outcome(code, Some(PairKey::ZhToFr))
            .await;
        assert_eq!(result.outcome, TranslationOutcome::SkippedCode);
        assert!(result.outcome.is_skip());
    }
    assert_eq!(service.translate("12.5", Some(PairKey::ZhToFr)).await, "12.5");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withUnreadableText_shouldSkipWithoutBackendCall() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone());

    let result = service
        .translate_with_outcome("abc█████▓▒", Some(PairKey::FrToZh))
        .await;

    assert_eq!(result.outcome, TranslationOutcome::SkippedInvalid);
    assert_eq!(result.text, "abc█████▓▒");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withGlossaryTerm_shouldOverrideBackendOutput() {
    let provider = MockProvider::working().with_responses([("天花", "variole")]);
    let service = mock_service(provider.clone());

    assert_eq!(service.translate("天花", Some(PairKey::ZhToFr)).await, "plafond");
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withRejectedSourceLanguage_shouldRetryWithAutoDetect() {
    let provider = MockProvider::rejecting_source();
    let service = mock_service(provider.clone());

    let result = service
        .translate_with_outcome("Porte coupe-feu", Some(PairKey::FrToZh))
        .await;

    assert_eq!(result.text, "[zh] Porte coupe-feu");
    assert_eq!(result.outcome, TranslationOutcome::TranslatedWithFallback);
    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].source_language.as_deref(), Some("fr"));
    assert_eq!(requests[1].source_language, None);
    assert_eq!(requests[1].target_language, "zh");
}

#[tokio::test]
async fn test_translate_withEveryLanguageRejected_shouldKeepOriginal() {
    let provider = MockProvider::rejecting_all();
    let service = mock_service(provider.clone());
    let original = "Local\u{200B} technique";

    let result = service
        .translate_with_outcome(original, Some(PairKey::FrToZh))
        .await;

    assert_eq!(result.text, service.sanitizer().encode_safely(original));
    assert_eq!(result.text, "Local technique");
    assert!(result.outcome.is_failure());
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withFallbackDisabled_shouldNotRetry() {
    let provider = MockProvider::rejecting_source();
    let options = DispatchOptions {
        auto_detect_fallback: false,
        ..fast_options()
    };
    let service = TranslationService::with_provider(
        Arc::new(provider.clone()),
        TextSanitizer::default(),
        options,
    );

    let result = service
        .translate_with_outcome("Gaine", Some(PairKey::FrToZh))
        .await;

    assert_eq!(result.text, "Gaine");
    assert!(result.outcome.is_failure());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withUnchangedOutput_shouldFollowIdenticalPolicy() {
    let provider = MockProvider::echo();
    let service = mock_service(provider.clone());
    let result = service
        .translate_with_outcome("平面", Some(PairKey::ZhToFr))
        .await;
    assert!(result.outcome.is_failure());
    assert_eq!(result.text, "平面");
    assert_eq!(provider.request_count(), 2);

    let provider = MockProvider::echo();
    let options = DispatchOptions {
        identical_output: IdenticalOutputPolicy::Accept,
        ..fast_options()
    };
    let service = TranslationService::with_provider(
        Arc::new(provider.clone()),
        TextSanitizer::default(),
        options,
    );
    let result = service
        .translate_with_outcome("平面", Some(PairKey::ZhToFr))
        .await;
    assert_eq!(result.outcome, TranslationOutcome::Translated);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withFailure_shouldNotCacheOriginal() {
    let provider = MockProvider::failing();
    let service = mock_service(provider.clone());

    service.translate("走廊尽头", Some(PairKey::ZhToFr)).await;
    service.translate("走廊尽头", Some(PairKey::ZhToFr)).await;

    assert_eq!(provider.request_count(), 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_translate_withFrenchDimensions_shouldSendExpandedText() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone());

    let resolved = service
        .translate_with_outcome("W400*H650", Some(PairKey::FrToZh))
        .await;
    assert_eq!(resolved.text, "宽度400×高度650");
    assert_eq!(resolved.outcome, TranslationOutcome::ResolvedLocally);
    assert_eq!(provider.request_count(), 0);

    service.translate("Porte W:900mm", Some(PairKey::FrToZh)).await;
    assert_eq!(provider.requests()[0].text, "Porte 宽度:900mm");
}

#[tokio::test]
async fn test_translate_withFrenchAbbreviationOnOtherPair_shouldNotExpand() {
    let provider = MockProvider::working();
    let service = mock_service(provider.clone());

    service.translate("RDC", Some(PairKey::EnToZh)).await;

    assert_eq!(provider.request_count(), 1);
    assert_eq!(provider.requests()[0].text, "RDC");
}
