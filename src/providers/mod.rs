/*!
 * Translation backends.
 *
 * This module contains client implementations for the supported engines:
 * - Google: free `translate_a/single` endpoint, no key
 * - DeepL: DeepL API v2 (free and pro tiers)
 * - OpenAI: chat-completion API used as a translator
 * - Mock: scripted backend for offline tests
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::fmt::Debug;

use crate::app_config::{EngineConfig, TranslationEngine};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// `source_language` of `None` asks the backend to detect the language itself.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short engine identifier used in logs and cache keys
    fn name(&self) -> &str;

    /// Model or API flavour, part of persistent cache keys
    fn model(&self) -> &str {
        "default"
    }

    /// Translate one label
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// URL probed by the connectivity precheck
    fn probe_url(&self) -> String;

    /// Test the connection to the provider
    async fn test_connection(&self, timeout: Duration) -> Result<(), ProviderError> {
        probe_endpoint(&self.probe_url(), timeout).await
    }
}

/// Probe that an endpoint answers at all. Any HTTP status counts as reachable.
pub async fn probe_endpoint(url: &str, timeout: Duration) -> Result<(), ProviderError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

    debug!("Probing {} (timeout {:?})", url, timeout);
    match client.head(url).send().await {
        Ok(response) => {
            debug!("Probe of {} answered {}", url, response.status());
            Ok(())
        }
        Err(e) => Err(ProviderError::ConnectionError(format!(
            "{} is unreachable: {}",
            url, e
        ))),
    }
}

/// Map a non-success HTTP answer onto a provider error
pub(crate) fn classify_status(status: StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        400 if body.to_lowercase().contains("lang") => ProviderError::InvalidLanguage(body),
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        456 => ProviderError::QuotaExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

/// Map a transport failure onto a provider error
pub(crate) fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Build an HTTP client with the engine timeout
pub(crate) fn http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        })
}

/// Instantiate the backend described by an engine configuration
pub fn create_provider(config: &EngineConfig) -> Result<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match config.engine_type {
        TranslationEngine::Google => Arc::new(google::Google::new(
            &config.endpoint,
            config.timeout_secs,
        )),
        TranslationEngine::DeepL => {
            if config.api_key.trim().is_empty() {
                return Err(anyhow!("DeepL requires an API key"));
            }
            Arc::new(deepl::DeepL::new(
                &config.api_key,
                &config.endpoint,
                config.timeout_secs,
            ))
        }
        TranslationEngine::OpenAI => {
            if config.api_key.trim().is_empty() {
                return Err(anyhow!("OpenAI requires an API key"));
            }
            Arc::new(openai::OpenAI::new(
                &config.api_key,
                &config.endpoint,
                &config.model,
                config.timeout_secs,
            ))
        }
    };
    Ok(provider)
}

pub mod deepl;
pub mod google;
pub mod mock;
pub mod openai;
