/*!
 * Core translation service implementation.
 *
 * `TranslationService` turns one raw drawing label into its translation. It
 * never fails: every backend problem degrades to the original text, and the
 * reason is reported through `TranslationOutcome`.
 */

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use super::abbreviations::expand_abbreviations;
use super::cache::{TranslationCache, truncate_text};
use super::glossary::{LanguagePairConfig, PairKey, build_hint};
use super::postprocess::post_process;
use crate::app_config::{Config, IdenticalOutputPolicy, TranslationCommonConfig};
use crate::database::{DatabaseConnection, Repository};
use crate::providers::{self, Provider};
use crate::sanitizer::{RawText, TextSanitizer, is_code_label};

/// Dispatcher behaviour knobs
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Pause after each successful backend call
    pub rate_limit_delay: Duration,
    /// Handling of unchanged backend output
    pub identical_output: IdenticalOutputPolicy,
    /// Retry once with auto-detection on recoverable failures
    pub auto_detect_fallback: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from(&TranslationCommonConfig::default())
    }
}

impl From<&TranslationCommonConfig> for DispatchOptions {
    fn from(common: &TranslationCommonConfig) -> Self {
        Self {
            rate_limit_delay: Duration::from_millis(common.rate_limit_delay_ms),
            identical_output: common.identical_output,
            auto_detect_fallback: common.auto_detect_fallback,
        }
    }
}

/// Tagged result of one backend attempt
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// Post-processed translation
    Success(String),
    /// Worth one retry with auto-detection
    RecoverableFailure(String),
    /// Give up on this label
    FatalFailure(String),
}

/// How a label was handled
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// Empty text or no pair selected
    PassThrough,
    /// Served from the cache
    CacheHit,
    /// Translated by the backend
    Translated,
    /// Translated after retrying with auto-detection
    TranslatedWithFallback,
    /// Resolved without a backend (abbreviations)
    ResolvedLocally,
    /// Not natural language worth translating
    SkippedInvalid,
    /// Number, code or grid reference kept as is
    SkippedCode,
    /// Backend failed; original text kept
    Failed(String),
}

impl TranslationOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SkippedInvalid | Self::SkippedCode)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for TranslationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThrough => write!(f, "pass-through"),
            Self::CacheHit => write!(f, "cache hit"),
            Self::Translated => write!(f, "translated"),
            Self::TranslatedWithFallback => write!(f, "translated (auto-detect)"),
            Self::ResolvedLocally => write!(f, "resolved locally"),
            Self::SkippedInvalid => write!(f, "skipped (invalid)"),
            Self::SkippedCode => write!(f, "skipped (code)"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Translation of one label together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub outcome: TranslationOutcome,
}

impl Translation {
    fn new(text: impl Into<String>, outcome: TranslationOutcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }
}

/// Translation service: cache, sanitizer and one backend
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    cache: TranslationCache,
    sanitizer: TextSanitizer,
    options: DispatchOptions,
}

impl TranslationService {
    /// Assemble a service from its parts
    pub fn with_provider(
        provider: Arc<dyn Provider>,
        sanitizer: TextSanitizer,
        options: DispatchOptions,
    ) -> Self {
        Self {
            provider,
            cache: TranslationCache::default(),
            sanitizer,
            options,
        }
    }

    /// Replace the cache, e.g. with a persistent one
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    /// Sanitizer for the configured encodings and validity policy
    pub fn sanitizer_for(config: &Config) -> Result<TextSanitizer> {
        TextSanitizer::from_labels(
            &config.text.candidate_encodings,
            &config.document.output_encoding,
            config.text.validity_policy(),
        )
    }

    /// Build the configured engine, sanitizer and cache
    pub fn new(config: &Config) -> Result<Self> {
        let engine = config.translation.active_engine_config();
        let provider = providers::create_provider(&engine)?;
        let sanitizer = Self::sanitizer_for(config)?;

        let mut cache = TranslationCache::new(config.cache.enabled);
        if config.cache.enabled && config.cache.persistent {
            let connection = match &config.cache.path {
                Some(path) => DatabaseConnection::new(path),
                None => DatabaseConnection::new_default(),
            }
            .context("Failed to open the persistent translation cache")?;
            cache = cache.with_persistence(
                Repository::new(connection),
                provider.name(),
                provider.model(),
            );
        }

        Ok(Self::with_provider(
            provider,
            sanitizer,
            DispatchOptions::from(&config.translation.common),
        )
        .with_cache(cache))
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn sanitizer(&self) -> &TextSanitizer {
        &self.sanitizer
    }

    /// Translate a raw label; always returns a string
    pub async fn translate(&self, text: &str, pair: Option<PairKey>) -> String {
        self.translate_with_outcome(text, pair).await.text
    }

    /// Translate a raw label and report how the result was obtained
    pub async fn translate_with_outcome(&self, text: &str, pair: Option<PairKey>) -> Translation {
        let Some(pair_key) = pair else {
            return Translation::new(text, TranslationOutcome::PassThrough);
        };
        if text.is_empty() {
            return Translation::new(text, TranslationOutcome::PassThrough);
        }

        if let Some(cached) = self.cache.get(text, pair_key).await {
            return Translation::new(cached, TranslationOutcome::CacheHit);
        }

        let decoded = self.sanitizer.decode_safely(&RawText::Text(text.to_string()));
        let cleaned = self.sanitizer.clean_formatting(&decoded);
        if cleaned.is_empty() || !self.sanitizer.is_valid_for_translation(&cleaned) {
            info!("Skipping text unsuitable for translation: {:?}", truncate_text(&decoded, 40));
            return Translation::new(
                self.sanitizer.encode_safely(&decoded),
                TranslationOutcome::SkippedInvalid,
            );
        }

        if is_code_label(&cleaned) {
            debug!("Keeping code label '{}' untranslated", cleaned);
            self.cache.store(text, pair_key, &cleaned).await;
            return Translation::new(cleaned, TranslationOutcome::SkippedCode);
        }

        let config = pair_key.config();
        let mut payload = cleaned.clone();
        if config.expands_abbreviations {
            if let Some(expansion) = expand_abbreviations(&cleaned) {
                debug!("Expanded abbreviations '{}' -> '{}'", cleaned, expansion.text);
                if expansion.complete {
                    let resolved = self.sanitizer.encode_safely(&expansion.text);
                    self.cache.store(text, pair_key, &resolved).await;
                    return Translation::new(resolved, TranslationOutcome::ResolvedLocally);
                }
                payload = expansion.text;
            }
        }

        let hint = build_hint(&cleaned, &config);
        if hint != cleaned {
            debug!("Context hint: {}", hint);
        }

        let first = self
            .attempt(&payload, &cleaned, Some(config.source_code), &config)
            .await;
        let (translated, outcome) = match first {
            BackendOutcome::Success(translated) => (translated, TranslationOutcome::Translated),
            BackendOutcome::RecoverableFailure(reason) if self.options.auto_detect_fallback => {
                warn!(
                    "{} failed for '{}' ({}), retrying with auto-detection",
                    self.provider.name(),
                    truncate_text(&cleaned, 40),
                    reason
                );
                match self.attempt(&payload, &cleaned, None, &config).await {
                    BackendOutcome::Success(translated) => {
                        (translated, TranslationOutcome::TranslatedWithFallback)
                    }
                    BackendOutcome::RecoverableFailure(reason)
                    | BackendOutcome::FatalFailure(reason) => {
                        return self.give_up(text, &cleaned, reason);
                    }
                }
            }
            BackendOutcome::RecoverableFailure(reason) | BackendOutcome::FatalFailure(reason) => {
                return self.give_up(text, &cleaned, reason);
            }
        };

        self.cache.store(text, pair_key, &translated).await;
        if !self.options.rate_limit_delay.is_zero() {
            tokio::time::sleep(self.options.rate_limit_delay).await;
        }
        debug!("'{}' -> '{}'", truncate_text(&cleaned, 40), truncate_text(&translated, 40));
        Translation::new(translated, outcome)
    }

    /// One backend call, classified
    async fn attempt(
        &self,
        payload: &str,
        cleaned: &str,
        source_language: Option<&str>,
        pair: &LanguagePairConfig,
    ) -> BackendOutcome {
        match self
            .provider
            .translate(payload, source_language, pair.target_code)
            .await
        {
            Ok(raw) => {
                let finalized = post_process(&raw, cleaned, pair, &self.sanitizer);
                if finalized.trim().is_empty() {
                    return BackendOutcome::RecoverableFailure("backend returned empty text".to_string());
                }
                if finalized.trim() == cleaned.trim() {
                    return match self.options.identical_output {
                        IdenticalOutputPolicy::Fallback => BackendOutcome::RecoverableFailure(
                            "backend returned the text unchanged".to_string(),
                        ),
                        IdenticalOutputPolicy::Accept => {
                            warn!("Backend returned '{}' unchanged", truncate_text(cleaned, 40));
                            BackendOutcome::Success(finalized)
                        }
                    };
                }
                BackendOutcome::Success(finalized)
            }
            Err(e) if e.is_language_rejection() => BackendOutcome::RecoverableFailure(e.to_string()),
            Err(e) => BackendOutcome::FatalFailure(e.to_string()),
        }
    }

    fn give_up(&self, original: &str, cleaned: &str, reason: String) -> Translation {
        error!(
            "Translation failed for '{}': {}; keeping original text",
            truncate_text(cleaned, 40),
            reason
        );
        Translation::new(
            self.sanitizer.encode_safely(original),
            TranslationOutcome::Failed(reason),
        )
    }
}
