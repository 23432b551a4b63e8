//! The raw table operations offered by the remote store.

use crate::Result;
use serde_json::Value;

/// Selects rows by equality on zero or more columns. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    /// A filter that matches every row.
    pub(crate) fn all() -> Self {
        Self::default()
    }

    /// A filter that matches rows where `column` equals `value`.
    pub(crate) fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::all().and(column, value)
    }

    /// Adds another equality condition.
    pub(crate) fn and(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub(crate) fn is_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Evaluates the filter against a JSON row. Strings are compared as-is, other scalars by their
    /// JSON text, so `"id" = "7"` matches both `"7"` and `7`.
    pub(crate) fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            match row.get(column) {
                Some(Value::String(s)) => s == expected,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == *expected,
            }
        })
    }
}

/// Row-level access to remote tables. Rows are JSON objects keyed by column name.
///
/// There are two implementations: `RestStore`, which talks to the hosted store over HTTP, and
/// `TestStore`, which keeps the tables in memory.
#[async_trait::async_trait]
pub(crate) trait Store {
    /// Returns the rows of `table` that match `filter`.
    async fn select(&mut self, table: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Inserts `rows` into `table` in one request.
    async fn insert(&mut self, table: &str, rows: &[Value]) -> Result<()>;

    /// Sets the columns present in `patch` on every row of `table` that matches `filter`.
    async fn update(&mut self, table: &str, filter: &Filter, patch: &Value) -> Result<()>;

    /// Deletes every row of `table` that matches `filter`.
    async fn delete(&mut self, table: &str, filter: &Filter) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches() {
        let row = json!({"id": 7, "username": "sari", "role": null});
        assert!(Filter::all().matches(&row));
        assert!(Filter::eq("id", "7").matches(&row));
        assert!(Filter::eq("username", "sari").and("id", "7").matches(&row));
        assert!(!Filter::eq("username", "sari").and("id", "8").matches(&row));
        assert!(!Filter::eq("role", "null").matches(&row));
        assert!(!Filter::eq("missing", "x").matches(&row));
    }
}
