//! Database handle shared by the note and button stores.

use crate::buttons::ButtonStore;
use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::notes::NoteStore;
use crate::schema::SCHEMA;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Database handle for notekeep.
///
/// Cloning is cheap; clones share the pool and the write locks.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    locks: Arc<WriteLocks>,
}

impl Database {
    /// Open or create a database at the given path.
    pub async fn open(path: &Path, config: &DatabaseConfig) -> Result<Self> {
        let parent = path.parent().unwrap_or(Path::new("."));
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened notes database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Wrap a pool built elsewhere and make sure the schema exists.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self {
            pool,
            locks: Arc::new(WriteLocks::default()),
        };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Note operations.
    pub fn notes(&self) -> NoteStore {
        NoteStore::new(self.clone())
    }

    /// Button operations.
    pub fn buttons(&self) -> ButtonStore {
        ButtonStore::new(self.clone())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn locks(&self) -> &WriteLocks {
        &self.locks
    }

    /// Close the database.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Write locks for the two tables.
///
/// Any path holding both takes `notes` first and releases it last. The locks
/// are not reentrant: a holder must not call back into a public write that
/// takes the same lock.
#[derive(Default)]
pub(crate) struct WriteLocks {
    notes: Mutex<()>,
    buttons: Mutex<()>,
}

impl WriteLocks {
    pub(crate) async fn notes(&self) -> MutexGuard<'_, ()> {
        self.notes.lock().await
    }

    pub(crate) async fn buttons(&self) -> MutexGuard<'_, ()> {
        self.buttons.lock().await
    }

    /// Take both locks in order.
    pub(crate) async fn both(&self) -> BothGuard<'_> {
        let notes = self.notes.lock().await;
        let buttons = self.buttons.lock().await;
        BothGuard {
            _buttons: buttons,
            _notes: notes,
        }
    }
}

/// Fields drop in declaration order, so `buttons` is released before `notes`.
pub(crate) struct BothGuard<'a> {
    _buttons: MutexGuard<'a, ()>,
    _notes: MutexGuard<'a, ()>,
}
