/*!
 * Schema initialization for registered routes.
 *
 * Every registered route gets a `CREATE TABLE IF NOT EXISTS` with an
 * untyped unique `id` column, an untyped `value` column for the serialized
 * model state, and one untyped column per extra filterable column. Column
 * typing is intentionally absent; SQLite's flexible affinity carries the
 * scalar mirrors, and `value` is always JSON text.
 */

use log::{debug, info};
use rusqlite::Connection;

use crate::errors::SyncError;
use crate::routes::{RouteTable, TableDescriptor};
use crate::statement::quote_ident;

/// DDL for one descriptor's table
pub fn create_table_sql(descriptor: &TableDescriptor) -> String {
    let mut columns = vec![
        format!("{} UNIQUE", quote_ident("id")),
        quote_ident("value"),
    ];
    columns.extend(descriptor.cols.iter().map(|col| quote_ident(col)));

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&descriptor.table),
        columns.join(", ")
    )
}

/// Create the table behind every registered route.
///
/// Tables are created in registration order; the first failure aborts and
/// is returned, leaving later tables uncreated. Returning at all means
/// every table finished, so completion is signalled exactly once.
pub fn initialize(conn: &Connection, routes: &RouteTable) -> Result<(), SyncError> {
    for descriptor in routes.descriptors() {
        let sql = create_table_sql(descriptor);
        debug!("{}", sql);
        conn.execute(&sql, [])?;
    }

    info!("Initialized {} route table(s)", routes.len());
    Ok(())
}
