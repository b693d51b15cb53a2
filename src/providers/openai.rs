use async_trait::async_trait;
use log::error;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils::get_language_name;
use crate::providers::{Provider, classify_status, classify_transport, http_client};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible chat client used as a label translator
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, without path
    endpoint: String,
    /// Chat model
    model: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

impl OpenAI {
    pub fn new(api_key: &str, endpoint: &str, model: &str, timeout_secs: u64) -> Self {
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.trim().to_string()
        };
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.trim().to_string(),
            endpoint,
            model,
        }
    }

    /// System prompt restricting the model to a bare translation
    pub fn system_prompt(source_language: Option<&str>, target_language: &str) -> String {
        let target = get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());
        let source = match source_language {
            Some(code) => get_language_name(code).unwrap_or_else(|_| code.to_string()),
            None => "the detected language".to_string(),
        };
        format!(
            "You translate labels from architectural and MEP drawings from {} to {}. \
             Reply with the translation only, without quotes, notes or explanations. \
             Keep numbers, units and codes unchanged.",
            source, target
        )
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(source_language, target_language),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
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
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(classify_status(status, error_text));
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::ParseError("no choices in response".to_string()))
    }

    fn probe_url(&self) -> String {
        self.endpoint.clone()
    }
}
