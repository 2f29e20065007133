/*!
 * # syncstore - local model persistence over embedded SQLite
 *
 * A Rust library mapping object-model CRUD operations onto a
 * table-per-collection SQLite backend, for client-side applications that
 * want model persistence without a network round trip.
 *
 * ## Features
 *
 * - Url-prefix routes registered against table descriptors
 * - Full model state serialized as JSON into a single `value` column,
 *   keyed by a unique string `id`
 * - Extra columns mirrored from model attributes for equality filtering
 * - Identifier generation for models persisted without an id
 * - Single-row and filtered bulk reads, plus create/update/delete
 * - Optional insert-or-replace write semantics and statement tracing
 * - Atomic multi-operation composition through a shared transaction scope
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `config`: Store behavior flags
 * - `routes`: Route registration and longest-prefix resolution
 * - `model`: In-memory model representation
 * - `ident`: Identifier generation
 * - `statement`: Pure SQL statement builders
 * - `connection`: Thread-safe connection wrapper and statement runners
 * - `schema`: Table creation for registered routes
 * - `store`: The sync dispatcher
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod config;
pub mod connection;
pub mod errors;
pub mod ident;
pub mod model;
pub mod routes;
pub mod schema;
pub mod statement;
pub mod store;

// Re-export main types for easier usage
pub use config::StoreConfig;
pub use connection::{StoreConnection, StoredRow};
pub use errors::SyncError;
pub use model::Model;
pub use routes::{RouteTable, RouteTarget, TableDescriptor};
pub use statement::{Filter, Statement};
pub use store::{SyncOperation, SyncOptions, SyncOutcome, SyncStore, TxScope};
