use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::sanitizer::ValidityPolicy;
use crate::sanitizer::encoding::encoding_for_label;
use crate::translation::glossary::PairKey;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation direction and glossary
    #[serde(default)]
    pub pair: PairKey,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Text validity and decoding settings
    #[serde(default)]
    pub text: TextConfig,

    /// Drawing read/write settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Translation cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Connectivity precheck settings
    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationEngine {
    // @engine: Google free endpoint
    #[default]
    Google,
    // @engine: DeepL API
    #[serde(rename = "deepl")]
    DeepL,
    // @engine: OpenAI-compatible chat completion
    #[serde(rename = "openai")]
    OpenAI,
}

impl TranslationEngine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::DeepL => "DeepL",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }

    // @returns: Whether the engine refuses to work without an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Google)
    }
}

impl std::fmt::Display for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::DeepL),
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid engine type: {}", s)),
        }
    }
}

/// Engine configuration entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: TranslationEngine,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL; empty selects the engine default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Model name (chat engines only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EngineConfig {
    // @param engine_type: Engine enum
    // @returns: Engine config with defaults
    pub fn new(engine_type: TranslationEngine) -> Self {
        Self {
            engine_type,
            api_key: String::new(),
            endpoint: String::new(),
            model: match engine_type {
                TranslationEngine::OpenAI => default_openai_model(),
                _ => String::new(),
            },
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Engine to use
    #[serde(default)]
    pub engine: TranslationEngine,

    /// Configured engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// What to do when a backend returns its input unchanged
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdenticalOutputPolicy {
    /// Treat as a failed call and retry with auto-detection
    #[default]
    Fallback,
    /// Keep the output and log a warning
    Accept,
}

/// Common translation settings applicable to all engines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Delay in milliseconds after each successful backend call
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Handling of unchanged backend output
    #[serde(default)]
    pub identical_output: IdenticalOutputPolicy,

    /// Retry once with source-language auto-detection on recoverable failures
    #[serde(default = "default_true")]
    pub auto_detect_fallback: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            identical_output: IdenticalOutputPolicy::default(),
            auto_detect_fallback: true,
        }
    }
}

/// Text decoding and validity settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TextConfig {
    /// Minimum cleaned length in code points
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Minimum share of readable characters
    #[serde(default = "default_min_printable_ratio")]
    pub min_printable_ratio: f32,

    /// Encodings tried, in order, on raw byte text
    #[serde(default = "default_encodings")]
    pub candidate_encodings: Vec<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            min_printable_ratio: default_min_printable_ratio(),
            candidate_encodings: default_encodings(),
        }
    }
}

impl TextConfig {
    pub fn validity_policy(&self) -> ValidityPolicy {
        ValidityPolicy {
            min_chars: self.min_chars,
            min_printable_ratio: self.min_printable_ratio,
        }
    }
}

/// Drawing read/write settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocumentConfig {
    /// Also translate block definitions
    #[serde(default)]
    pub include_blocks: bool,

    /// Encodings tried, in order, when reading a drawing
    #[serde(default = "default_encodings")]
    pub input_encodings: Vec<String>,

    /// Encoding used when saving
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,

    /// Font wrapped around translated MTEXT, e.g. `SimSun`
    #[serde(default)]
    pub mtext_font: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            include_blocks: false,
            input_encodings: default_encodings(),
            output_encoding: default_output_encoding(),
            mtext_font: None,
        }
    }
}

/// Translation cache settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether to memoize translations at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Keep translations in a SQLite store across runs
    #[serde(default)]
    pub persistent: bool,

    /// Store location; defaults to the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            persistent: false,
            path: None,
        }
    }
}

/// Connectivity precheck settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectivityConfig {
    /// Probe the backend before a run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL probed instead of the engine endpoint
    #[serde(default)]
    pub probe_url: Option<String>,

    /// Probe timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_url: None,
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_rate_limit_delay_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_min_chars() -> usize {
    crate::sanitizer::validity::DEFAULT_MIN_CHARS
}

fn default_min_printable_ratio() -> f32 {
    crate::sanitizer::validity::DEFAULT_MIN_PRINTABLE_RATIO
}

fn default_encodings() -> Vec<String> {
    ["utf-8", "gbk", "gb18030", "windows-1252"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_output_encoding() -> String {
    "utf-8".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages of the pair
        let pair = self.pair.config();
        crate::language_utils::validate_language_code(pair.source_code)?;
        crate::language_utils::validate_language_code(pair.target_code)?;

        if self.translation.engine.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} engine",
                self.translation.engine.display_name()
            ));
        }

        let endpoint = self.translation.get_endpoint();
        if !endpoint.is_empty() {
            url::Url::parse(&endpoint)
                .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;
        }
        if let Some(probe_url) = &self.connectivity.probe_url {
            url::Url::parse(probe_url)
                .map_err(|e| anyhow!("Invalid probe URL '{}': {}", probe_url, e))?;
        }

        if !(self.text.min_printable_ratio > 0.0 && self.text.min_printable_ratio <= 1.0) {
            return Err(anyhow!(
                "min_printable_ratio must be in (0, 1], got {}",
                self.text.min_printable_ratio
            ));
        }

        for label in self
            .text
            .candidate_encodings
            .iter()
            .chain(self.document.input_encodings.iter())
            .chain(std::iter::once(&self.document.output_encoding))
        {
            if encoding_for_label(label).is_none() {
                return Err(anyhow!("Unknown text encoding: {}", label));
            }
        }
        if self.document.input_encodings.is_empty() {
            return Err(anyhow!("At least one input encoding is required"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            pair: PairKey::default(),
            translation: TranslationConfig::default(),
            text: TextConfig::default(),
            document: DocumentConfig::default(),
            cache: CacheConfig::default(),
            connectivity: ConnectivityConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        self.available_engines
            .iter()
            .find(|e| e.engine_type == self.engine)
    }

    /// Active engine configuration, falling back to defaults
    pub fn active_engine_config(&self) -> EngineConfig {
        self.get_active_engine_config()
            .cloned()
            .unwrap_or_else(|| EngineConfig::new(self.engine))
    }

    /// Get the API key for the active engine
    pub fn get_api_key(&self) -> String {
        self.get_active_engine_config()
            .map(|e| e.api_key.trim().to_string())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active engine; empty means engine default
    pub fn get_endpoint(&self) -> String {
        self.get_active_engine_config()
            .map(|e| e.endpoint.trim().to_string())
            .unwrap_or_default()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            engine: TranslationEngine::default(),
            available_engines: vec![
                EngineConfig::new(TranslationEngine::Google),
                EngineConfig::new(TranslationEngine::DeepL),
                EngineConfig::new(TranslationEngine::OpenAI),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
