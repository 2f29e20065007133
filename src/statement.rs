/*!
 * SQL statement builders for the four sync verbs plus filtered bulk reads.
 *
 * Builders are pure: given a table descriptor and a model snapshot they
 * produce a statement template and its ordered parameter list, and perform
 * no I/O. Id resolution (the one side effect the create path needs) happens
 * on the model before the builder runs.
 */

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::errors::SyncError;
use crate::model::Model;
use crate::routes::TableDescriptor;

/// A statement template plus its ordered parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Parameterized SQL text
    pub sql: String,
    /// Parameters in placeholder order
    pub params: Vec<SqlValue>,
}

/// Bulk-read filter shape.
///
/// A raw fragment is appended verbatim after `WHERE` (the caller vouches for
/// it); a column map becomes one `col = ?` clause per entry joined with
/// `AND`, parameters in the map's iteration order (serde_json maps iterate
/// sorted by key, so parameter order is deterministic).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Raw predicate fragment, trusted as-is
    Fragment(String),
    /// Column-to-value equality constraints
    Columns(serde_json::Map<String, Value>),
}

impl Filter {
    /// Build a filter from a loose JSON value. Strings become raw fragments,
    /// objects become column maps; anything else is a configuration error.
    pub fn from_value(value: &Value) -> Result<Self, SyncError> {
        match value {
            Value::String(fragment) => Ok(Filter::Fragment(fragment.clone())),
            Value::Object(map) => Ok(Filter::Columns(map.clone())),
            other => Err(SyncError::UnsupportedFilter(format!(
                "expected a string or object, got {}",
                other
            ))),
        }
    }
}

impl From<&str> for Filter {
    fn from(fragment: &str) -> Self {
        Filter::Fragment(fragment.to_string())
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Convert a JSON attribute value into a SQL parameter.
///
/// Scalars map directly (booleans as 0/1); nested arrays and objects are
/// stored as their JSON text, mirroring how the `value` column holds the
/// full state.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Build the INSERT for a create.
///
/// Columns are `id`, `value`, then the descriptor's extra columns in order;
/// the `value` parameter is the model's full JSON state and each extra
/// column gets the matching attribute (NULL when absent). With
/// `insert_or_replace` the INSERT carries OR REPLACE semantics and
/// overwrites any row with the same id.
pub fn create(
    descriptor: &TableDescriptor,
    model: &Model,
    insert_or_replace: bool,
) -> Result<Statement, SyncError> {
    let id = model
        .id()
        .ok_or_else(|| SyncError::MissingId(model.id_attribute().to_string()))?;

    let mut columns = vec![quote_ident("id"), quote_ident("value")];
    let mut params = vec![to_sql_value(id), SqlValue::Text(model.to_json().to_string())];
    for col in &descriptor.cols {
        columns.push(quote_ident(col));
        params.push(model.get(col).map(to_sql_value).unwrap_or(SqlValue::Null));
    }

    let placeholders = vec!["?"; params.len()].join(", ");
    let or_replace = if insert_or_replace { " OR REPLACE" } else { "" };
    let sql = format!(
        "INSERT{} INTO {} ({}) VALUES ({})",
        or_replace,
        quote_ident(&descriptor.table),
        columns.join(", "),
        placeholders
    );

    Ok(Statement { sql, params })
}

/// Build the single-row SELECT keyed by id
pub fn read_one(descriptor: &TableDescriptor, id: &Value) -> Statement {
    Statement {
        sql: format!(
            "SELECT {}, {} FROM {} WHERE {} = ?",
            quote_ident("id"),
            quote_ident("value"),
            quote_ident(&descriptor.table),
            quote_ident("id")
        ),
        params: vec![to_sql_value(id)],
    }
}

/// Build the bulk SELECT, optionally constrained by a filter
pub fn read_all(descriptor: &TableDescriptor, filter: Option<&Filter>) -> Statement {
    let mut sql = format!(
        "SELECT {}, {} FROM {}",
        quote_ident("id"),
        quote_ident("value"),
        quote_ident(&descriptor.table)
    );
    let mut params = Vec::new();

    match filter {
        None => {}
        Some(Filter::Fragment(fragment)) => {
            sql.push_str(" WHERE ");
            sql.push_str(fragment);
        }
        Some(Filter::Columns(map)) => {
            let clauses: Vec<String> = map
                .iter()
                .map(|(col, value)| {
                    params.push(to_sql_value(value));
                    format!("{} = ?", quote_ident(col))
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
    }

    Statement { sql, params }
}

/// Build the UPDATE keyed by id.
///
/// Sets `value` plus every extra column, assignments joined with commas.
pub fn update(descriptor: &TableDescriptor, model: &Model) -> Result<Statement, SyncError> {
    let id = model
        .id()
        .ok_or_else(|| SyncError::MissingId(model.id_attribute().to_string()))?;

    let mut assignments = vec![format!("{} = ?", quote_ident("value"))];
    let mut params = vec![SqlValue::Text(model.to_json().to_string())];
    for col in &descriptor.cols {
        assignments.push(format!("{} = ?", quote_ident(col)));
        params.push(model.get(col).map(to_sql_value).unwrap_or(SqlValue::Null));
    }
    params.push(to_sql_value(id));

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_ident(&descriptor.table),
        assignments.join(", "),
        quote_ident("id")
    );

    Ok(Statement { sql, params })
}

/// Build the DELETE keyed by id
pub fn delete(descriptor: &TableDescriptor, model: &Model) -> Result<Statement, SyncError> {
    let id = model
        .id()
        .ok_or_else(|| SyncError::MissingId(model.id_attribute().to_string()))?;

    Ok(Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(&descriptor.table),
            quote_ident("id")
        ),
        params: vec![to_sql_value(id)],
    })
}
