use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils::{deepl_source_code, deepl_target_code};
use crate::providers::{Provider, classify_status, classify_transport, http_client};

const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_ENDPOINT: &str = "https://api.deepl.com";

/// DeepL client for the v2 translate API
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, without path
    endpoint: String,
}

/// DeepL translate request
#[derive(Debug, Serialize)]
pub struct DeepLRequest {
    /// Texts to translate
    text: Vec<String>,
    /// Target language, e.g. `FR` or `EN-US`
    target_lang: String,
    /// Source language; omitted for auto-detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

/// One translated text
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

impl DeepL {
    /// Create a new DeepL client; keys ending in `:fx` use the free tier
    pub fn new(api_key: &str, endpoint: &str, timeout_secs: u64) -> Self {
        let endpoint = if !endpoint.trim().is_empty() {
            endpoint.trim_end_matches('/').to_string()
        } else if api_key.trim().ends_with(":fx") {
            FREE_ENDPOINT.to_string()
        } else {
            PRO_ENDPOINT.to_string()
        };
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.trim().to_string(),
            endpoint,
        }
    }

    pub fn build_request(
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> DeepLRequest {
        DeepLRequest {
            text: vec![text.to_string()],
            target_lang: deepl_target_code(target_language),
            source_lang: source_language.map(deepl_source_code),
        }
    }
}

#[async_trait]
impl Provider for DeepL {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = Self::build_request(text, source_language, target_language);
        let url = format!("{}/v2/translate", self.endpoint);

        debug!(
            "DeepL request {:?} -> {}",
            request.source_lang, request.target_lang
        );
        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(classify_status(status, error_text));
        }

        let body: DeepLResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        body.translations
            .into_iter()
            .next()
            .map(|translation| {
                if let Some(detected) = &translation.detected_source_language {
                    debug!("DeepL detected source language {}", detected);
                }
                translation.text
            })
            .ok_or_else(|| ProviderError::ParseError("empty translation list".to_string()))
    }

    fn probe_url(&self) -> String {
        self.endpoint.clone()
    }
}
