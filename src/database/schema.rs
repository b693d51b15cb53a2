/*!
 * Schema migrations of the translation cache store.
 *
 * The applied version is tracked in SQLite's `user_version` pragma. Each
 * entry of `MIGRATIONS` moves the store one version forward inside its own
 * transaction.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    // v1: translated labels keyed by text hash, direction and engine
    r#"
    CREATE TABLE translation_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_text_hash TEXT NOT NULL,
        source_text TEXT NOT NULL,
        source_language TEXT NOT NULL,
        target_language TEXT NOT NULL,
        translated_text TEXT NOT NULL,
        engine TEXT NOT NULL,
        model TEXT NOT NULL,
        created_at TEXT NOT NULL,
        hit_count INTEGER NOT NULL DEFAULT 1,
        UNIQUE(source_text_hash, source_language, target_language, engine, model)
    );
    "#,
];

/// Version reached once every migration ran
pub const SCHEMA_VERSION: usize = MIGRATIONS.len();

/// Bring the store up to `SCHEMA_VERSION`
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        bail!(
            "Translation cache uses schema v{}, newer than the supported v{}",
            current,
            SCHEMA_VERSION
        );
    }
    if current == SCHEMA_VERSION {
        debug!("Translation cache schema is up to date (v{})", current);
        return Ok(());
    }

    for (index, migration) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = index + 1;
        info!("Migrating translation cache to schema v{}", version);

        let tx = conn
            .unchecked_transaction()
            .context("Failed to start schema migration")?;
        tx.execute_batch(migration)
            .with_context(|| format!("Schema migration v{} failed", version))?;
        tx.pragma_update(None, "user_version", version as i64)?;
        tx.commit()?;
    }
    Ok(())
}

/// Schema version recorded in the store, 0 for a fresh file
pub fn schema_version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read schema version")?;
    Ok(usize::try_from(version).unwrap_or_default())
}
