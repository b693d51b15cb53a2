/*!
 * SQLite handle of the persistent translation cache.
 *
 * One connection is shared behind a mutex; every query runs on tokio's
 * blocking pool so the dispatcher never stalls the runtime.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;

use super::schema;

const CACHE_DIRNAME: &str = "cad-translator";
const CACHE_FILENAME: &str = "translations.db";

/// Concurrent folder runs may hold the file briefly
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared connection to the cache store
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DatabaseConnection({})", self.db_path.display())
    }
}

impl DatabaseConnection {
    /// Open the store under the user's local data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open or create the store at `db_path`, creating parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {:?}", parent))?;
        }

        info!("Opening translation cache at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open translation cache {:?}", db_path))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Translation cache journal mode: {}", mode);

        Self::wrap(db_path, conn)
    }

    /// Store that lives as long as the value, for tests and one-off runs
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory cache")?;
        Self::wrap(PathBuf::from(":memory:"), conn)
    }

    fn wrap(db_path: PathBuf, conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/cad-translator/translations.db`
    pub fn default_database_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .map(|base| base.join(CACHE_DIRNAME).join(CACHE_FILENAME))
            .ok_or_else(|| anyhow!("Could not determine a data directory for the cache"))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || f(&connection.lock()))
            .await
            .context("Translation cache task panicked")?
    }
}
