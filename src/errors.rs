/*!
 * Error types for the syncstore library.
 *
 * This module contains the error taxonomy for the sync layer, using the
 * thiserror crate for ergonomic error definitions. Configuration errors
 * (missing url, unresolved route, bad filter shape) are returned before any
 * statement reaches the engine; statement errors wrap the engine's own
 * failure; a zero-rows update is reported as its own variant so callers can
 * tell it apart from an engine rejection.
 */

use thiserror::Error;

use crate::store::SyncOperation;

/// Errors that can occur while dispatching a sync operation
#[derive(Error, Debug)]
pub enum SyncError {
    /// Neither the options nor the model yielded a url for the request
    #[error("no url available for {operation} request")]
    MissingUrl {
        /// The operation that was being dispatched
        operation: SyncOperation,
    },

    /// The url did not start with any registered route prefix
    #[error("url '{url}' does not map to a registered route (known prefixes: {known})")]
    UnknownRoute {
        /// The url that failed to resolve
        url: String,
        /// Comma-separated list of registered prefixes
        known: String,
    },

    /// A filter was supplied in a shape the builder does not understand
    #[error("unsupported filter shape: {0}")]
    UnsupportedFilter(String),

    /// The model has no value under its id attribute to key the row
    #[error("model has no '{0}' attribute to key the row")]
    MissingId(String),

    /// An update intended to touch exactly one row touched a different count
    #[error("update for id '{id}' affected {affected} rows, expected exactly 1")]
    RowCount {
        /// The id the update was keyed on
        id: String,
        /// Number of rows the engine reported as changed
        affected: usize,
    },

    /// The embedded engine rejected or failed a statement
    #[error("statement execution failed: {0}")]
    Statement(#[from] rusqlite::Error),

    /// A stored value column did not contain valid JSON
    #[error("stored value is not valid JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Filesystem problem while opening or creating the database
    #[error("database file error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking database task panicked or the connection lock was poisoned
    #[error("database task failed: {0}")]
    Task(String),
}

impl SyncError {
    /// Whether this error is a configuration mistake rather than a runtime
    /// failure. Configuration errors abort the operation before any SQL runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyncError::MissingUrl { .. }
                | SyncError::UnknownRoute { .. }
                | SyncError::UnsupportedFilter(_)
                | SyncError::MissingId(_)
        )
    }
}
