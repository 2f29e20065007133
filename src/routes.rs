/*!
 * Route registration and resolution.
 *
 * A route maps a url-prefix string to a table descriptor. Routes are
 * registered once when the store opens and read on every sync call; the
 * registry is owned by the store rather than living in process-global state,
 * so independent stores (and tests) carry independent route tables.
 */

use log::warn;
use serde::{Deserialize, Serialize};

/// Registration-time shape of a route's storage target.
///
/// A bare table name desugars to a descriptor with no extra columns. The
/// untagged representation lets route maps live in JSON config files using
/// either `"things"` or `{"table": "users", "cols": ["fname"]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RouteTarget {
    /// Just a table name, no filterable columns
    Table(String),
    /// Table name plus extra filterable columns
    Descriptor {
        /// Table name
        table: String,
        /// Extra columns mirrored from model attributes for filtering
        #[serde(default)]
        cols: Vec<String>,
    },
}

impl From<&str> for RouteTarget {
    fn from(table: &str) -> Self {
        RouteTarget::Table(table.to_string())
    }
}

impl From<String> for RouteTarget {
    fn from(table: String) -> Self {
        RouteTarget::Table(table)
    }
}

impl RouteTarget {
    /// Normalize into the canonical descriptor form
    pub fn into_descriptor(self) -> TableDescriptor {
        match self {
            RouteTarget::Table(table) => TableDescriptor { table, cols: Vec::new() },
            RouteTarget::Descriptor { table, cols } => TableDescriptor { table, cols },
        }
    }
}

/// Canonical registration record: a table name and its extra filterable
/// columns. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name
    pub table: String,
    /// Extra columns mirrored from model attributes, in declaration order
    pub cols: Vec<String>,
}

impl TableDescriptor {
    /// Build a descriptor directly
    pub fn new(table: impl Into<String>, cols: Vec<String>) -> Self {
        Self {
            table: table.into(),
            cols,
        }
    }
}

/// Registry mapping url prefixes to table descriptors
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, TableDescriptor)>,
}

impl RouteTable {
    /// Create an empty route table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Re-registering the same prefix overwrites the
    /// previous descriptor; registering a prefix that overlaps an existing
    /// one is legal but logged as a configuration warning, since resolution
    /// then depends on prefix length.
    pub fn register(&mut self, prefix: impl Into<String>, target: impl Into<RouteTarget>) {
        let prefix = prefix.into();
        let descriptor = target.into().into_descriptor();

        if let Some(existing) = self.routes.iter_mut().find(|(p, _)| *p == prefix) {
            existing.1 = descriptor;
            return;
        }

        for (other, _) in &self.routes {
            if other.starts_with(&prefix) || prefix.starts_with(other.as_str()) {
                warn!(
                    "route prefixes '{}' and '{}' overlap, longest prefix wins at resolution",
                    prefix, other
                );
            }
        }
        self.routes.push((prefix, descriptor));
    }

    /// Resolve a url to a table descriptor by longest-prefix match.
    ///
    /// Every registered prefix that is a literal string-prefix of the url is
    /// a candidate; the longest one wins, independent of registration order.
    pub fn resolve(&self, url: &str) -> Option<&TableDescriptor> {
        self.routes
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, descriptor)| descriptor)
    }

    /// Registered prefixes, in registration order
    pub fn prefixes(&self) -> Vec<&str> {
        self.routes.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Registered descriptors, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.routes.iter().map(|(_, d)| d)
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
