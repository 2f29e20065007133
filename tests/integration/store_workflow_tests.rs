/*!
 * End-to-end workflow tests for the sync store: initialization, CRUD round
 * trips, filtered collection reads, transactional composition, and
 * persistence across reopen.
 */

use serde_json::json;

use syncstore::{
    Filter, Model, RouteTable, StoreConfig, SyncOperation, SyncOptions, SyncOutcome, SyncStore,
};

use crate::common;

#[tokio::test]
async fn test_open_shouldCreateOneTablePerRouteBeforeReturning() {
    let store = common::open_sample_store().await;

    let tables: Vec<String> = store
        .connection()
        .execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .filter_map(|r| r.ok())
                .collect();
            Ok(names)
        })
        .expect("failed to list tables");

    assert!(tables.contains(&"things".to_string()));
    assert!(tables.contains(&"users".to_string()));
}

#[tokio::test]
async fn test_createThenReadById_shouldReturnTheStoredAttribute() {
    let store = common::open_sample_store().await;

    let mut thing = common::thing_model("x");
    store
        .sync(SyncOperation::Create, &mut thing, SyncOptions::new())
        .await
        .expect("create failed");
    assert!(thing.has_id(), "create should assign an id");

    let record = store
        .sync(SyncOperation::Read, &mut thing, SyncOptions::new())
        .await
        .expect("read failed")
        .into_record()
        .expect("row should exist");

    assert_eq!(record["name"], json!("x"));
}

#[tokio::test]
async fn test_collectionLifecycle_shouldSupportFilteredReads() {
    let store = common::open_sample_store().await;

    for (fname, lname) in [("Fred", "Flintstone"), ("Wilma", "Flintstone"), ("Barney", "Rubble")] {
        let mut user = common::user_model(fname, lname);
        store
            .sync(SyncOperation::Create, &mut user, SyncOptions::new())
            .await
            .expect("create failed");
    }

    let mut collection = Model::new().with_url("/users");

    // unfiltered read returns the whole table
    let all = store
        .sync(SyncOperation::Read, &mut collection, SyncOptions::new())
        .await
        .expect("read failed")
        .into_records();
    assert_eq!(all.len(), 3);

    // column filter narrows by equality
    let filter = Filter::from_value(&json!({"lname": "Flintstone"})).expect("object filter");
    let flintstones = store
        .sync(
            SyncOperation::Read,
            &mut collection,
            SyncOptions::new().with_filters(filter),
        )
        .await
        .expect("read failed")
        .into_records();
    assert_eq!(flintstones.len(), 2);

    // raw fragment filters are passed through verbatim
    let fragment = Filter::from("\"fname\" = 'Barney'");
    let barney = store
        .sync(
            SyncOperation::Read,
            &mut collection,
            SyncOptions::new().with_filters(fragment),
        )
        .await
        .expect("read failed")
        .into_records();
    assert_eq!(barney.len(), 1);
    assert_eq!(barney[0]["lname"], json!("Rubble"));
}

#[tokio::test]
async fn test_updateDeleteCycle_shouldMaintainRowInvariants() {
    let store = common::open_sample_store().await;

    let mut user = common::user_model("Fred", "Flintstone");
    store
        .sync(SyncOperation::Create, &mut user, SyncOptions::new())
        .await
        .expect("create failed");

    user.set("lname", "Granite");
    store
        .sync(SyncOperation::Update, &mut user, SyncOptions::new())
        .await
        .expect("update failed");

    let record = store
        .sync(SyncOperation::Read, &mut user, SyncOptions::new())
        .await
        .expect("read failed")
        .into_record()
        .expect("row should exist");
    assert_eq!(record["lname"], json!("Granite"));

    let outcome = store
        .sync(SyncOperation::Delete, &mut user, SyncOptions::new())
        .await
        .expect("delete failed");
    assert_eq!(outcome.rows_written(), Some(1));

    let outcome = store
        .sync(SyncOperation::Read, &mut user, SyncOptions::new())
        .await
        .expect("read failed");
    assert_eq!(outcome, SyncOutcome::Record(None));
}

#[tokio::test]
async fn test_transactionalSeed_shouldBeAtomicAndOrdered() {
    let store = common::open_sample_store().await;

    let created: Vec<String> = store
        .with_transaction(|scope| {
            let mut ids = Vec::new();
            for name in ["one", "two", "three"] {
                let mut thing = common::thing_model(name);
                scope.sync(SyncOperation::Create, &mut thing, SyncOptions::new())?;
                ids.push(thing.id_text().expect("id assigned inside transaction"));
            }
            Ok(ids)
        })
        .await
        .expect("transaction failed");
    assert_eq!(created.len(), 3);

    let mut collection = Model::new().with_url("/things");
    let records = store
        .sync(SyncOperation::Read, &mut collection, SyncOptions::new())
        .await
        .expect("read failed")
        .into_records();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_fileBackedStore_shouldPersistAcrossReopen() {
    let dir = common::create_temp_dir().expect("failed to create temp dir");
    let db_path = dir.path().join("workflow.db");

    let assigned_id = {
        let store = SyncStore::open(&db_path, common::sample_routes(), StoreConfig::default())
            .await
            .expect("failed to open store");

        let mut thing = common::thing_model("durable");
        store
            .sync(SyncOperation::Create, &mut thing, SyncOptions::new())
            .await
            .expect("create failed");
        thing.id_text().expect("id assigned")
    };

    // reopen against the same file; CREATE TABLE IF NOT EXISTS must not
    // clobber the existing rows
    let store = SyncStore::open(&db_path, common::sample_routes(), StoreConfig::default())
        .await
        .expect("failed to reopen store");

    let mut thing = Model::new().with_url("/things");
    thing.set("id", assigned_id.as_str());
    let record = store
        .sync(SyncOperation::Read, &mut thing, SyncOptions::new())
        .await
        .expect("read failed")
        .into_record()
        .expect("row should survive reopen");
    assert_eq!(record["name"], json!("durable"));
}

#[tokio::test]
async fn test_routeMapFromJson_shouldDriveStoreInitialization() {
    // route maps can come straight from a JSON config document
    let raw = json!({
        "/things": "things",
        "/users": {"table": "users", "cols": ["fname", "lname"]}
    });

    let mut routes = RouteTable::new();
    for (prefix, target) in raw.as_object().expect("route map object") {
        let target: syncstore::RouteTarget =
            serde_json::from_value(target.clone()).expect("valid route target");
        routes.register(prefix.as_str(), target);
    }

    let store = SyncStore::open_in_memory(routes, StoreConfig::default())
        .await
        .expect("failed to open store");

    let mut user = common::user_model("Betty", "Rubble");
    store
        .sync(SyncOperation::Create, &mut user, SyncOptions::new())
        .await
        .expect("create failed");

    let mut collection = Model::new().with_url("/users");
    let filter = Filter::from_value(&json!({"fname": "Betty"})).expect("object filter");
    let records = store
        .sync(
            SyncOperation::Read,
            &mut collection,
            SyncOptions::new().with_filters(filter),
        )
        .await
        .expect("read failed")
        .into_records();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_debugTracing_shouldNotChangeOutcomes() {
    common::init_logging();
    let store = SyncStore::open_in_memory(common::sample_routes(), StoreConfig::new().with_debug(true))
        .await
        .expect("failed to open store");

    let mut thing = common::thing_model("traced");
    store
        .sync(SyncOperation::Create, &mut thing, SyncOptions::new())
        .await
        .expect("create failed");

    let record = store
        .sync(SyncOperation::Read, &mut thing, SyncOptions::new())
        .await
        .expect("read failed")
        .into_record()
        .expect("row should exist");
    assert_eq!(record["name"], json!("traced"));

    // error paths stay errors under tracing
    let mut ghost = common::user_model("No", "Body");
    ghost.set("id", "missing");
    let err = store
        .sync(SyncOperation::Update, &mut ghost, SyncOptions::new())
        .await
        .expect_err("update of a missing row should fail");
    assert!(matches!(err, syncstore::SyncError::RowCount { .. }));
}
