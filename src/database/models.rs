/*!
 * Rows of the translation cache store.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of a stored translation: the text plus everything that shapes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKey {
    /// SHA-256 of the raw label text
    pub text_hash: String,
    pub source_language: String,
    pub target_language: String,
    pub engine: String,
    /// Model or API flavour of the engine
    pub model: String,
}

impl StoredKey {
    pub fn new(
        source_text: &str,
        source_language: &str,
        target_language: &str,
        engine: &str,
        model: &str,
    ) -> Self {
        Self {
            text_hash: Self::hash_text(source_text),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            engine: engine.to_string(),
            model: model.to_string(),
        }
    }

    /// Lowercase hex SHA-256 of `text`
    pub fn hash_text(text: &str) -> String {
        format!("{:x}", Sha256::digest(text.as_bytes()))
    }
}

/// Cached translation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Row id, 0 until inserted
    pub id: i64,
    pub key: StoredKey,
    /// Raw label text, kept for inspection
    pub source_text: String,
    pub translated_text: String,
    /// RFC 3339 creation time
    pub created_at: String,
    pub hit_count: i64,
}

impl CacheRecord {
    pub fn new(key: StoredKey, source_text: &str, translated_text: &str) -> Self {
        Self {
            id: 0,
            key,
            source_text: source_text.to_string(),
            translated_text: translated_text.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            hit_count: 1,
        }
    }
}

/// Aggregate figures of the persistent cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cached translations
    pub total_entries: i64,
    /// Sum of hit counts
    pub total_hits: i64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cached label(s), {} hit(s)",
            self.total_entries, self.total_hits
        )
    }
}
