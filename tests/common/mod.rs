/*!
 * Common test utilities for the syncstore test suite
 */

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

use syncstore::{Model, RouteTable, RouteTarget, StoreConfig, SyncStore};

/// Creates a temporary directory for test databases
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Initializes test logging once; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Route map used across the workflow tests: a plain table and a table with
/// two filterable columns
pub fn sample_routes() -> RouteTable {
    let mut routes = RouteTable::new();
    routes.register("/things", "things");
    routes.register(
        "/users",
        RouteTarget::Descriptor {
            table: "users".to_string(),
            cols: vec!["fname".to_string(), "lname".to_string()],
        },
    );
    routes
}

/// Opens an in-memory store over the sample routes
pub async fn open_sample_store() -> SyncStore {
    SyncStore::open_in_memory(sample_routes(), StoreConfig::default())
        .await
        .expect("failed to open in-memory store")
}

/// A thing model carrying a single name attribute
pub fn thing_model(name: &str) -> Model {
    let mut model = Model::new().with_url("/things");
    model.set("name", name);
    model
}

/// A user model with first/last name attributes mirrored into filter columns
pub fn user_model(fname: &str, lname: &str) -> Model {
    let mut model = Model::new().with_url("/users");
    model.set("fname", fname);
    model.set("lname", lname);
    model.set("active", json!(true));
    model
}
