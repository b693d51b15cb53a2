/*!
 * Queries of the persistent translation cache.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::{CacheRecord, CacheStats, StoredKey};

/// Access to cached translations
#[derive(Clone, Debug)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Repository over the store in the user's data directory
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Repository over a private in-memory store
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Translation stored under `key`; a hit bumps the row's hit count
    pub async fn get_cached_translation(&self, key: &StoredKey) -> Result<Option<String>> {
        let key = key.clone();
        self.db
            .execute_async(move |conn| {
                let translated = conn
                    .query_row(
                        r#"
                        UPDATE translation_cache
                        SET hit_count = hit_count + 1
                        WHERE source_text_hash = ?1
                          AND source_language = ?2
                          AND target_language = ?3
                          AND engine = ?4
                          AND model = ?5
                        RETURNING translated_text
                        "#,
                        params![
                            key.text_hash,
                            key.source_language,
                            key.target_language,
                            key.engine,
                            key.model
                        ],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                if translated.is_some() {
                    debug!("Persistent cache hit for {}", &key.text_hash[..12]);
                }
                Ok(translated)
            })
            .await
    }

    /// Insert a translation; a newer translation of the same key wins
    pub async fn cache_translation(&self, record: &CacheRecord) -> Result<()> {
        let record = record.clone();
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_cache (
                        source_text_hash, source_language, target_language, engine, model,
                        source_text, translated_text, created_at, hit_count
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(source_text_hash, source_language, target_language, engine, model)
                    DO UPDATE SET translated_text = excluded.translated_text
                    "#,
                    params![
                        record.key.text_hash,
                        record.key.source_language,
                        record.key.target_language,
                        record.key.engine,
                        record.key.model,
                        record.source_text,
                        record.translated_text,
                        record.created_at,
                        record.hit_count,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Entry count and total hits
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        self.db
            .execute_async(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(hit_count), 0) FROM translation_cache",
                    [],
                    |row| {
                        Ok(CacheStats {
                            total_entries: row.get(0)?,
                            total_hits: row.get(1)?,
                        })
                    },
                )?)
            })
            .await
    }

    /// Delete every entry, returning how many were removed
    pub async fn clear_cache(&self) -> Result<i64> {
        self.db
            .execute_async(|conn| Ok(conn.execute("DELETE FROM translation_cache", [])? as i64))
            .await
    }
}
