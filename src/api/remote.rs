//! Maps the records of the event fund onto the tables of the remote store.

use crate::api::{Filter, Store};
use crate::config::Tables;
use crate::model::{
    AdminUser, Amount, Collection, Donation, Entry, EntryKind, Expense, InitialBalance, Ledger,
    Role, WeeklyCollection,
};
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

/// A record type that has a table in the remote store.
pub(crate) trait RemoteRecord: Collection + Clone {
    /// The remote row type, whose fields are named after the table's columns.
    type Row: Serialize + DeserializeOwned + From<Self> + Into<Self>;

    fn table(tables: &Tables) -> &str;
}

/// Typed access to the remote store.
pub struct Remote {
    store: Box<dyn Store + Send>,
    tables: Tables,
}

impl Remote {
    pub(crate) fn new(store: Box<dyn Store + Send>, tables: Tables) -> Self {
        Self { store, tables }
    }

    /// The remote table that holds records of `kind`.
    pub fn table(&self, kind: EntryKind) -> &str {
        match kind {
            EntryKind::Initial => &self.tables.initial,
            EntryKind::Weekly => &self.tables.weekly,
            EntryKind::Donor => &self.tables.donors,
            EntryKind::Expense => &self.tables.expenses,
        }
    }

    /// Reads every published record and the last-updated time.
    pub async fn fetch_ledger(&mut self) -> Result<Ledger> {
        let ledger = Ledger {
            last_updated: self.last_updated().await?,
            initial: self.select_all::<InitialBalance>().await?,
            weekly: self.select_all::<WeeklyCollection>().await?,
            donors: self.select_all::<Donation>().await?,
            expenses: self.select_all::<Expense>().await?,
        };
        debug!(
            "Fetched {} published records",
            ledger.counts().total()
        );
        Ok(ledger)
    }

    async fn select_all<T: RemoteRecord>(&mut self) -> Result<Vec<T>> {
        let table = T::table(&self.tables).to_string();
        let rows = self.store.select(&table, &Filter::all()).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value::<T::Row>(row)
                    .map(Into::into)
                    .with_context(|| format!("Unable to parse a row of '{table}'"))
            })
            .collect()
    }

    /// Inserts `entries` in a single request. Local ids are not sent; the store assigns its own.
    pub(crate) async fn insert_all<T: RemoteRecord>(&mut self, entries: &[T]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let table = T::table(&self.tables).to_string();
        let rows = entries
            .iter()
            .map(|e| to_row_without_id::<T>(e.clone()))
            .collect::<Result<Vec<Value>>>()?;
        trace!("Inserting {} rows into {table}", rows.len());
        self.store.insert(&table, &rows).await
    }

    /// Overwrites the remote row with the id of `entry` with the fields of `entry`.
    pub(crate) async fn update_entry<T: RemoteRecord>(&mut self, entry: &T) -> Result<()> {
        let table = T::table(&self.tables).to_string();
        let patch = to_row_without_id::<T>(entry.clone())?;
        self.store
            .update(&table, &Filter::eq("id", entry.id()), &patch)
            .await
    }

    pub(crate) async fn delete_entry(&mut self, kind: EntryKind, id: &str) -> Result<()> {
        let table = self.table(kind).to_string();
        self.store.delete(&table, &Filter::eq("id", id)).await
    }

    /// Deletes every row of the table holding `kind`.
    pub(crate) async fn delete_all(&mut self, kind: EntryKind) -> Result<()> {
        let table = self.table(kind).to_string();
        self.store.delete(&table, &Filter::all()).await
    }

    async fn last_updated(&mut self) -> Result<Option<DateTime<Utc>>> {
        let table = self.tables.meta.clone();
        let rows = self.store.select(&table, &Filter::all()).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let meta: MetaRow =
            serde_json::from_value(row).with_context(|| format!("Unable to parse '{table}'"))?;
        Ok(meta.last_updated)
    }

    /// Records `timestamp` as the last-updated time, updating the metadata row if one exists and
    /// inserting it otherwise.
    pub(crate) async fn write_last_updated(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        let table = self.tables.meta.clone();
        let existing = self.store.select(&table, &Filter::all()).await?;
        let patch = json!({ "last_updated": timestamp });
        match existing.first().and_then(|row| row.get("id")).map(id_text) {
            Some(id) => {
                self.store
                    .update(&table, &Filter::eq("id", id), &patch)
                    .await
            }
            None => self.store.insert(&table, &[patch]).await,
        }
    }

    /// Returns the account matching `username` and `password`, if any.
    pub(crate) async fn verify_user(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<AdminUser>> {
        let table = self.tables.users.clone();
        let filter = Filter::eq("username", username).and("password", password);
        let rows = self.store.select(&table, &filter).await?;
        rows.into_iter().next().map(parse_user).transpose()
    }

    /// Lists administrator accounts, newest first.
    pub(crate) async fn users(&mut self) -> Result<Vec<AdminUser>> {
        let table = self.tables.users.clone();
        let rows = self.store.select(&table, &Filter::all()).await?;
        let mut users = rows
            .into_iter()
            .map(parse_user)
            .collect::<Result<Vec<_>>>()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub(crate) async fn username_exists(&mut self, username: &str) -> Result<bool> {
        let table = self.tables.users.clone();
        let rows = self
            .store
            .select(&table, &Filter::eq("username", username))
            .await?;
        Ok(!rows.is_empty())
    }

    pub(crate) async fn add_user(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let table = self.tables.users.clone();
        let row = json!({
            "username": username,
            "password": password,
            "role": role,
            "created_at": created_at,
        });
        self.store.insert(&table, &[row]).await
    }

    pub(crate) async fn delete_user(&mut self, id: &str) -> Result<()> {
        let table = self.tables.users.clone();
        self.store.delete(&table, &Filter::eq("id", id)).await
    }
}

fn to_row_without_id<T: RemoteRecord>(entry: T) -> Result<Value> {
    let mut row = serde_json::to_value(T::Row::from(entry))
        .with_context(|| format!("Unable to serialize a {} row", T::KIND))?;
    if let Some(object) = row.as_object_mut() {
        object.remove("id");
    }
    Ok(row)
}

fn parse_user(row: Value) -> Result<AdminUser> {
    let row: UserRow = serde_json::from_value(row).context("Unable to parse an admin user")?;
    Ok(AdminUser {
        id: row.id,
        username: row.username,
        role: row.role.unwrap_or_default(),
        created_at: row.created_at,
    })
}

/// The text of a JSON id, which the store may return as a string or a number.
fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(_) | Value::Number(_) => Ok(id_text(&value)),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct MetaRow {
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    username: String,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct InitialRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    date: NaiveDate,
    nominal: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WeeklyRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    date: NaiveDate,
    week: String,
    rt: String,
    gross_amount: Amount,
    consumption_cut: Amount,
    commission_cut: Amount,
    net_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DonorRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    date: NaiveDate,
    name: String,
    nominal: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ExpenseRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    date: NaiveDate,
    purpose: String,
    nominal: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_by: Option<String>,
}

impl From<InitialBalance> for InitialRow {
    fn from(e: InitialBalance) -> Self {
        Self {
            id: e.id,
            date: e.date,
            nominal: e.amount,
            created_by: e.created_by,
            edited_by: e.edited_by,
        }
    }
}

impl From<InitialRow> for InitialBalance {
    fn from(r: InitialRow) -> Self {
        Self {
            id: r.id,
            date: r.date,
            amount: r.nominal,
            created_by: r.created_by,
            edited_by: r.edited_by,
        }
    }
}

impl From<WeeklyCollection> for WeeklyRow {
    fn from(e: WeeklyCollection) -> Self {
        Self {
            id: e.id,
            date: e.date,
            week: e.week,
            rt: e.zone,
            gross_amount: e.gross,
            consumption_cut: e.consumption_cut,
            commission_cut: e.commission_cut,
            net_amount: e.net,
            created_by: e.created_by,
            edited_by: e.edited_by,
        }
    }
}

impl From<WeeklyRow> for WeeklyCollection {
    fn from(r: WeeklyRow) -> Self {
        Self {
            id: r.id,
            date: r.date,
            week: r.week,
            zone: r.rt,
            gross: r.gross_amount,
            consumption_cut: r.consumption_cut,
            commission_cut: r.commission_cut,
            net: r.net_amount,
            created_by: r.created_by,
            edited_by: r.edited_by,
        }
    }
}

impl From<Donation> for DonorRow {
    fn from(e: Donation) -> Self {
        Self {
            id: e.id,
            date: e.date,
            name: e.donor,
            nominal: e.amount,
            created_by: e.created_by,
            edited_by: e.edited_by,
        }
    }
}

impl From<DonorRow> for Donation {
    fn from(r: DonorRow) -> Self {
        Self {
            id: r.id,
            date: r.date,
            donor: r.name,
            amount: r.nominal,
            created_by: r.created_by,
            edited_by: r.edited_by,
        }
    }
}

impl From<Expense> for ExpenseRow {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            date: e.date,
            purpose: e.purpose,
            nominal: e.amount,
            created_by: e.created_by,
            edited_by: e.edited_by,
        }
    }
}

impl From<ExpenseRow> for Expense {
    fn from(r: ExpenseRow) -> Self {
        Self {
            id: r.id,
            date: r.date,
            purpose: r.purpose,
            amount: r.nominal,
            created_by: r.created_by,
            edited_by: r.edited_by,
        }
    }
}

impl RemoteRecord for InitialBalance {
    type Row = InitialRow;

    fn table(tables: &Tables) -> &str {
        &tables.initial
    }
}

impl RemoteRecord for WeeklyCollection {
    type Row = WeeklyRow;

    fn table(tables: &Tables) -> &str {
        &tables.weekly
    }
}

impl RemoteRecord for Donation {
    type Row = DonorRow;

    fn table(tables: &Tables) -> &str {
        &tables.donors
    }
}

impl RemoteRecord for Expense {
    type Row = ExpenseRow;

    fn table(tables: &Tables) -> &str {
        &tables.expenses
    }
}
