/*!
 * The sync dispatcher.
 *
 * `SyncStore` owns the connection, the route table, and the config, and
 * translates one sync request (operation, model, options) into a statement
 * plan, runs it, and maps rows back into model-shaped JSON. Planning is
 * synchronous and fails fast on configuration mistakes; only statement
 * execution suspends, inside the connection's blocking task.
 */

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::connection::{StoreConnection, run_execute, run_query};
use crate::errors::SyncError;
use crate::model::Model;
use crate::routes::RouteTable;
use crate::schema;
use crate::statement::{self, Filter, Statement};

/// The four persistence verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    /// Insert a new row for the model
    Create,
    /// Fetch one model by id, or a filtered collection
    Read,
    /// Rewrite the row for an existing model
    Update,
    /// Remove the model's row
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Create => write!(f, "create"),
            SyncOperation::Read => write!(f, "read"),
            SyncOperation::Update => write!(f, "update"),
            SyncOperation::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for SyncOperation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(SyncOperation::Create),
            "read" => Ok(SyncOperation::Read),
            "update" => Ok(SyncOperation::Update),
            "delete" => Ok(SyncOperation::Delete),
            _ => Err(anyhow::anyhow!("Invalid sync operation: {}", s)),
        }
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Url override; when absent the model's own url is used
    pub url: Option<String>,
    /// Bulk-read filter
    pub filters: Option<Filter>,
}

impl SyncOptions {
    /// Options with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the url the request resolves against
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Constrain a bulk read
    pub fn with_filters(mut self, filter: impl Into<Filter>) -> Self {
        self.filters = Some(filter.into());
        self
    }
}

/// What a sync operation produced
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Single-row read: the deserialized model state, or None for zero rows
    Record(Option<serde_json::Value>),
    /// Bulk read: deserialized model states in engine row order
    Records(Vec<serde_json::Value>),
    /// Write operation: rows the engine reported as affected
    Written(usize),
}

impl SyncOutcome {
    /// The single record, if this outcome is one
    pub fn into_record(self) -> Option<serde_json::Value> {
        match self {
            SyncOutcome::Record(record) => record,
            _ => None,
        }
    }

    /// The record list, or empty for non-read outcomes
    pub fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            SyncOutcome::Records(records) => records,
            SyncOutcome::Record(Some(record)) => vec![record],
            _ => Vec::new(),
        }
    }

    /// Rows written, for write outcomes
    pub fn rows_written(&self) -> Option<usize> {
        match self {
            SyncOutcome::Written(n) => Some(*n),
            _ => None,
        }
    }
}

/// Statement plan for one request. Built synchronously, executed inside the
/// blocking task.
#[derive(Debug)]
enum Plan {
    /// Single-row read
    QueryOne(Statement),
    /// Bulk read
    QueryMany(Statement),
    /// Write where the affected-row count is reported as-is
    Execute(Statement),
    /// Update that must affect exactly one row
    ExecuteExactlyOne {
        statement: Statement,
        id: String,
    },
}

/// A model store mapping url-prefix routes onto SQLite tables
#[derive(Clone)]
pub struct SyncStore {
    conn: StoreConnection,
    routes: Arc<RouteTable>,
    config: StoreConfig,
}

impl SyncStore {
    /// Open a store backed by a database file, creating every registered
    /// route's table before returning.
    pub async fn open<P: AsRef<Path>>(
        path: P,
        routes: RouteTable,
        config: StoreConfig,
    ) -> Result<Self, SyncError> {
        Self::initialize(StoreConnection::new(path)?, routes, config).await
    }

    /// Open a store at the default database location
    pub async fn open_default(routes: RouteTable, config: StoreConfig) -> Result<Self, SyncError> {
        Self::initialize(StoreConnection::new_default()?, routes, config).await
    }

    /// Open an in-memory store (for testing and throwaway data)
    pub async fn open_in_memory(
        routes: RouteTable,
        config: StoreConfig,
    ) -> Result<Self, SyncError> {
        Self::initialize(StoreConnection::new_in_memory()?, routes, config).await
    }

    async fn initialize(
        conn: StoreConnection,
        routes: RouteTable,
        config: StoreConfig,
    ) -> Result<Self, SyncError> {
        let routes = Arc::new(routes);
        let for_schema = Arc::clone(&routes);
        conn.execute_async(move |c| schema::initialize(c, &for_schema))
            .await?;

        Ok(Self {
            conn,
            routes,
            config,
        })
    }

    /// The registered routes
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The store's behavior flags
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying connection
    pub fn connection(&self) -> &StoreConnection {
        &self.conn
    }

    /// Dispatch one sync operation.
    ///
    /// The url comes from the options or, failing that, the model; it
    /// resolves to a table by longest-prefix match. Reads return
    /// `Record`/`Records` of deserialized `value` state; writes return
    /// `Written`. An update that matches no row fails with
    /// `SyncError::RowCount`; a delete of a missing id is idempotent and
    /// reports `Written(0)`. Configuration errors return before any SQL is
    /// issued. On create, a model without an id gets one assigned (adopting
    /// a legacy `apiid` attribute when present) before the statement runs.
    pub async fn sync(
        &self,
        operation: SyncOperation,
        model: &mut Model,
        options: SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let plan = plan(&self.routes, &self.config, operation, model, &options)?;
        let debug = self.config.debug;
        self.conn
            .execute_async(move |conn| run_plan(conn, debug, plan))
            .await
    }

    /// Run several operations in one engine transaction.
    ///
    /// The closure's scope dispatches synchronously against the shared
    /// transaction; statements execute in submission order and commit
    /// atomically when the closure returns Ok. Any error rolls the whole
    /// batch back.
    pub async fn with_transaction<F, T>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&TxScope<'_>) -> Result<T, SyncError> + Send + 'static,
        T: Send + 'static,
    {
        let routes = Arc::clone(&self.routes);
        let config = self.config;

        self.conn
            .transaction_async(move |tx| {
                let conn: &Connection = tx;
                let scope = TxScope {
                    conn,
                    routes,
                    config,
                };
                f(&scope)
            })
            .await
    }
}

/// Dispatch surface inside a caller-managed transaction
pub struct TxScope<'conn> {
    conn: &'conn Connection,
    routes: Arc<RouteTable>,
    config: StoreConfig,
}

impl TxScope<'_> {
    /// Dispatch one sync operation on the shared transaction. Same contract
    /// as `SyncStore::sync`, minus the suspension: the statement runs right
    /// here, inside the transaction's blocking task.
    pub fn sync(
        &self,
        operation: SyncOperation,
        model: &mut Model,
        options: SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let plan = plan(&self.routes, &self.config, operation, model, &options)?;
        run_plan(self.conn, self.config.debug, plan)
    }
}

fn plan(
    routes: &RouteTable,
    config: &StoreConfig,
    operation: SyncOperation,
    model: &mut Model,
    options: &SyncOptions,
) -> Result<Plan, SyncError> {
    let url = options
        .url
        .clone()
        .or_else(|| model.url().map(str::to_string))
        .ok_or(SyncError::MissingUrl { operation })?;

    let descriptor = routes.resolve(&url).ok_or_else(|| SyncError::UnknownRoute {
        url: url.clone(),
        known: routes.prefixes().join(", "),
    })?;

    match operation {
        SyncOperation::Read => match model.id() {
            Some(id) => Ok(Plan::QueryOne(statement::read_one(descriptor, id))),
            None => Ok(Plan::QueryMany(statement::read_all(
                descriptor,
                options.filters.as_ref(),
            ))),
        },
        SyncOperation::Create => {
            model.resolve_id();
            Ok(Plan::Execute(statement::create(
                descriptor,
                model,
                config.insert_or_replace,
            )?))
        }
        SyncOperation::Update if config.insert_or_replace => {
            // Replace-on-missing: the update becomes a create with OR
            // REPLACE, and the zero-rows check does not apply.
            model.resolve_id();
            Ok(Plan::Execute(statement::create(descriptor, model, true)?))
        }
        SyncOperation::Update => {
            let statement = statement::update(descriptor, model)?;
            let id = model.id_text().unwrap_or_default();
            Ok(Plan::ExecuteExactlyOne { statement, id })
        }
        SyncOperation::Delete => Ok(Plan::Execute(statement::delete(descriptor, model)?)),
    }
}

fn run_plan(conn: &Connection, debug: bool, plan: Plan) -> Result<SyncOutcome, SyncError> {
    match plan {
        Plan::QueryOne(statement) => {
            let rows = run_query(conn, &statement, debug)?;
            let record = rows
                .into_iter()
                .next()
                .map(|row| serde_json::from_str(&row.value))
                .transpose()?;
            Ok(SyncOutcome::Record(record))
        }
        Plan::QueryMany(statement) => {
            let rows = run_query(conn, &statement, debug)?;
            let records = rows
                .into_iter()
                .map(|row| serde_json::from_str(&row.value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SyncOutcome::Records(records))
        }
        Plan::Execute(statement) => {
            let affected = run_execute(conn, &statement, debug)?;
            Ok(SyncOutcome::Written(affected))
        }
        Plan::ExecuteExactlyOne { statement, id } => {
            let affected = run_execute(conn, &statement, debug)?;
            if affected == 1 {
                Ok(SyncOutcome::Written(affected))
            } else {
                Err(SyncError::RowCount { id, affected })
            }
        }
    }
}
