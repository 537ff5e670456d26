//! The shared SQLite handle.
//!
//! One connection sits behind a mutex. Every logical operation holds the lock
//! for its own duration only, and multi-step sequences hold it for the whole
//! transaction.

use crate::{StorageError, StorageResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Cloneable handle to the store's database connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) a database file.
    pub fn open(path: &Path, busy_timeout: Duration) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        info!(path = %path.display(), "opened provisioning database");
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::StorageUnavailable("database lock poisoned".into()))
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<R>(&self, f: impl FnOnce(&Connection) -> StorageResult<R>) -> StorageResult<R> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` inside a transaction. Any error rolls every write back.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&Connection) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "rolling back transaction");
                tx.rollback()?;
                Err(e)
            }
        }
    }
}
