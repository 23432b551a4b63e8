//! Implements the `Store` trait using in-memory tables for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a hosted store. State is shared process-wide and keyed by the store
//! URL, so every `TestStore` created for the same URL sees the same tables.

use crate::api::{Filter, Store};
use crate::Result;
use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{LazyLock, Mutex, MutexGuard};

static STATES: LazyLock<Mutex<HashMap<String, TestStoreState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The contents of an in-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TestStoreState {
    /// Rows by table name.
    pub(crate) tables: BTreeMap<String, Vec<Value>>,
    /// When set, inserts into this table fail, simulating a store outage mid-publish.
    pub(crate) reject_inserts_into: Option<String>,
    /// When set, updates of this table fail.
    pub(crate) reject_updates_into: Option<String>,
    /// When set, deletes from this table fail.
    pub(crate) reject_deletes_into: Option<String>,
    next_id: u64,
}

impl TestStoreState {
    /// The rows of `table`, empty if the table has never been written.
    pub(crate) fn rows(&self, table: &str) -> &[Value] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }
}

/// An implementation of the `Store` trait that does not use the network.
pub(crate) struct TestStore {
    key: String,
}

impl TestStore {
    /// Create a `TestStore` for the tables stored under `key`, normally the configured store URL.
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub(crate) fn get_state(&self) -> TestStoreState {
        states().get(&self.key).cloned().unwrap_or_default()
    }

    pub(crate) fn set_state(&self, state: TestStoreState) {
        states().insert(self.key.clone(), state);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TestStoreState) -> R) -> R {
        let mut states = states();
        f(states.entry(self.key.clone()).or_default())
    }
}

fn states() -> MutexGuard<'static, HashMap<String, TestStoreState>> {
    // A panic while holding the lock leaves the data intact, so poisoning is ignored.
    STATES.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait::async_trait]
impl Store for TestStore {
    async fn select(&mut self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        Ok(self.with_state(|state| {
            state
                .rows(table)
                .iter()
                .filter(|row| filter.matches(row))
                .cloned()
                .collect()
        }))
    }

    async fn insert(&mut self, table: &str, rows: &[Value]) -> Result<()> {
        self.with_state(|state| {
            if state.reject_inserts_into.as_deref() == Some(table) {
                bail!("The store rejected the insert on '{table}' with 503 Service Unavailable");
            }
            let mut prepared = Vec::with_capacity(rows.len());
            for row in rows {
                let mut object: Map<String, Value> = row
                    .as_object()
                    .cloned()
                    .with_context(|| format!("Rows inserted into '{table}' must be objects"))?;
                if !object.contains_key("id") {
                    state.next_id += 1;
                    object.insert("id".to_string(), Value::from(state.next_id));
                }
                prepared.push(Value::Object(object));
            }
            state
                .tables
                .entry(table.to_string())
                .or_default()
                .extend(prepared);
            Ok(())
        })
    }

    async fn update(&mut self, table: &str, filter: &Filter, patch: &Value) -> Result<()> {
        let patch = patch
            .as_object()
            .with_context(|| format!("The update patch for '{table}' must be an object"))?;
        self.with_state(|state| {
            if state.reject_updates_into.as_deref() == Some(table) {
                bail!("The store rejected the update on '{table}' with 409 Conflict");
            }
            if let Some(rows) = state.tables.get_mut(table) {
                for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                    if let Some(object) = row.as_object_mut() {
                        for (column, value) in patch {
                            object.insert(column.clone(), value.clone());
                        }
                    }
                }
            }
            Ok(())
        })
    }

    async fn delete(&mut self, table: &str, filter: &Filter) -> Result<()> {
        self.with_state(|state| {
            if state.reject_deletes_into.as_deref() == Some(table) {
                bail!("The store rejected the delete on '{table}' with 403 Forbidden");
            }
            if let Some(rows) = state.tables.get_mut(table) {
                rows.retain(|row| !filter.matches(row));
            }
            Ok(())
        })
    }
}
