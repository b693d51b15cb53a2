use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::language_utils::google_code;
use crate::providers::{Provider, classify_status, classify_transport, http_client};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Client for the keyless Google translate endpoint
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, without path
    endpoint: String,
}

impl Google {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Self {
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        Self {
            client: http_client(timeout_secs),
            endpoint,
        }
    }

    /// Join the translated segments of a `translate_a/single` answer
    ///
    /// The answer is a nested array: `[[["seg", "orig", ...], ...], null, "zh-CN"]`.
    pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("missing segment list".to_string()))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();
        Ok(text)
    }
}

#[async_trait]
impl Provider for Google {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let source = source_language
            .map(google_code)
            .unwrap_or_else(|| "auto".to_string());
        let target = google_code(target_language);
        let url = format!("{}/translate_a/single", self.endpoint);

        debug!("Google request {} -> {} ({} chars)", source, target, text.chars().count());
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google translate error ({}): {}", status, error_text);
            // The endpoint answers a bare 400 for unknown language codes
            if status.as_u16() == 400 {
                return Err(ProviderError::InvalidLanguage(format!(
                    "invalid source language {}: {}",
                    source, error_text
                )));
            }
            return Err(classify_status(status, error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Self::extract_text(&body)
    }

    fn probe_url(&self) -> String {
        self.endpoint.clone()
    }
}
