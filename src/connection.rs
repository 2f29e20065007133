/*!
 * Database connection management and single-statement execution.
 *
 * This module wraps one SQLite connection for thread-safe access and
 * provides async execution via tokio's spawn_blocking. It also hosts the
 * statement runners: exactly one statement per call, no retries, with
 * optional debug tracing of statement text, parameters, and outcome.
 */

use log::{debug, error, info};
use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::SyncError;
use crate::statement::Statement;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "syncstore.db";

/// Default database directory name under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "syncstore";

/// Thread-safe wrapper around the embedded engine's connection
#[derive(Clone)]
pub struct StoreConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl StoreConnection {
    /// Open a connection at the default location under the user data dir
    pub fn new_default() -> Result<Self, SyncError> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open a connection at the specified path, creating parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, SyncError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", db_path);
        let conn = Connection::open(&db_path)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing and throwaway stores)
    pub fn new_in_memory() -> Result<Self, SyncError> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory()?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default database path under the system data directory
    pub fn default_database_path() -> Result<PathBuf, SyncError> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| SyncError::Task("could not determine data directory".to_string()))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// The database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run an operation against the connection on the current thread.
    /// For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&Connection) -> Result<T, SyncError>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| SyncError::Task(format!("failed to acquire database lock: {}", e)))?;

        f(&conn)
    }

    /// Run an operation asynchronously via spawn_blocking.
    ///
    /// This is the preferred entry point from async contexts: the statement
    /// executes off the runtime's core threads and the caller suspends until
    /// the engine reports an outcome.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&Connection) -> Result<T, SyncError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| SyncError::Task(format!("failed to acquire database lock: {}", e)))?;

            f(&conn)
        })
        .await
        .map_err(|e| SyncError::Task(format!("database task panicked: {}", e)))?
    }

    /// Begin a transaction and run operations within it, committing on
    /// success. Statements issued through the scope execute in submission
    /// order and commit atomically together.
    pub fn transaction<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T, SyncError>,
    {
        let mut conn = self
            .connection
            .lock()
            .map_err(|e| SyncError::Task(format!("failed to acquire database lock: {}", e)))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    /// Begin an async transaction via spawn_blocking
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T, SyncError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| SyncError::Task(format!("failed to acquire database lock: {}", e)))?;

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .map_err(|e| SyncError::Task(format!("database transaction task panicked: {}", e)))?
    }
}

/// One physical row as the readers return it: the key plus the serialized
/// model state from the `value` column
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Row key, in whatever affinity the engine stored it
    pub id: SqlValue,
    /// Full JSON-serialized model state
    pub value: String,
}

/// Run a row-returning statement, yielding `(id, value)` rows in engine
/// order. When `debug` is set the statement, parameters, and outcome are
/// logged; tracing never alters the result or the error path.
pub fn run_query(
    conn: &Connection,
    statement: &Statement,
    debug: bool,
) -> Result<Vec<StoredRow>, SyncError> {
    let outcome = query_rows(conn, statement);
    trace_outcome(statement, debug, outcome.as_ref().err());
    outcome
}

fn query_rows(conn: &Connection, statement: &Statement) -> Result<Vec<StoredRow>, SyncError> {
    let mut prepared = conn.prepare(&statement.sql)?;
    let rows = prepared.query_map(rusqlite::params_from_iter(statement.params.iter()), |row| {
        Ok(StoredRow {
            id: row.get(0)?,
            value: row.get(1)?,
        })
    })?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

/// Run a write statement, yielding the number of rows the engine reports as
/// affected. Same tracing contract as `run_query`.
pub fn run_execute(
    conn: &Connection,
    statement: &Statement,
    debug: bool,
) -> Result<usize, SyncError> {
    let outcome = conn
        .execute(
            &statement.sql,
            rusqlite::params_from_iter(statement.params.iter()),
        )
        .map_err(SyncError::from);
    trace_outcome(statement, debug, outcome.as_ref().err());
    outcome
}

fn trace_outcome(statement: &Statement, debug: bool, failure: Option<&SyncError>) {
    if !debug {
        return;
    }
    match failure {
        None => debug!("{} {:?} - finished", statement.sql, statement.params),
        Some(e) => error!("{} {:?} - error: {}", statement.sql, statement.params, e),
    }
}
