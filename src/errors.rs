/*!
 * Error types for the cad-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with translation backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The backend rejected or could not detect the language code
    #[error("Invalid source language: {0}")]
    InvalidLanguage(String),

    /// Usage quota of the account is exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The engine is missing mandatory configuration (API key, endpoint)
    #[error("Engine not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether retrying with automatic source-language detection may succeed.
    pub fn is_language_rejection(&self) -> bool {
        match self {
            Self::InvalidLanguage(_) => true,
            Self::ApiError { message, .. } => mentions_source_language(message),
            Self::RequestFailed(message) => mentions_source_language(message),
            _ => false,
        }
    }
}

fn mentions_source_language(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("invalid source language")
        || lower.contains("source_lang")
        || lower.contains("source language")
}

/// Errors raised by the drawing collaborator
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read from disk
    #[error("Failed to read drawing {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The content is not a well-formed drawing
    #[error("Malformed drawing: {0}")]
    Format(String),

    /// The drawing could not be written
    #[error("Failed to write drawing {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// Text cannot be represented in the requested encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An element reference no longer resolves
    #[error("No element at {0}")]
    MissingElement(String),

    /// The element kind does not carry text
    #[error("Element of kind {0} does not carry text")]
    NotTextBearing(String),
}

/// Errors that stop a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input could not be loaded with any candidate encoding
    #[error("Could not read drawing: {0}")]
    DocumentRead(#[source] DocumentError),

    /// The translated drawing could not be saved
    #[error("Could not save drawing: {source}")]
    DocumentWrite {
        #[source]
        source: DocumentError,
        /// Report written before the failure, if any
        report: Option<PathBuf>,
    },

    /// The audit report could not be written
    #[error("Could not write report {path}: {reason}")]
    Report { path: PathBuf, reason: String },

    /// Connectivity precheck failed
    #[error("Translation backend unreachable: {0}")]
    BackendUnreachable(String),

    /// The run was cancelled between items
    #[error("Run cancelled after {processed} of {total} items")]
    Cancelled { processed: usize, total: usize },

    /// Invalid configuration for the run
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the drawing collaborator
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a pipeline run
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
