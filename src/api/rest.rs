//! Implements the `Store` trait against a PostgREST-compatible HTTP API, such as the one served by
//! a hosted Supabase project at `{store_url}/rest/v1/{table}`.

use crate::api::{Filter, Store};
use crate::Result;
use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the remote store over HTTP. The API key is sent both as the `apikey` header and as a
/// bearer token.
pub(super) struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub(super) fn new(base_url: &str, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Builds the URL of `table`, encoding `filter` as PostgREST query parameters.
    fn table_url(&self, table: &str, filter: Option<&Filter>, select: bool) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .with_context(|| format!("Unable to build the URL for table '{table}'"))?;
        if select || filter.is_some() {
            let mut query = url.query_pairs_mut();
            if select {
                query.append_pair("select", "*");
            }
            if let Some(filter) = filter {
                if filter.is_all() {
                    // PostgREST refuses unfiltered updates and deletes.
                    query.append_pair("id", "not.is.null");
                }
                for (column, value) in filter.conditions() {
                    query.append_pair(column, &format!("eq.{value}"));
                }
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!("{method} {url}");
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait::async_trait]
impl Store for RestStore {
    async fn select(&mut self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        let url = self.table_url(table, Some(filter).filter(|f| !f.is_all()), true)?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .with_context(|| format!("Unable to reach the store to read '{table}'"))?;
        let response = check(response, "select", table).await?;
        response
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("Unable to parse the rows of '{table}'"))
    }

    async fn insert(&mut self, table: &str, rows: &[Value]) -> Result<()> {
        let url = self.table_url(table, None, false)?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .with_context(|| format!("Unable to reach the store to insert into '{table}'"))?;
        check(response, "insert", table).await?;
        Ok(())
    }

    async fn update(&mut self, table: &str, filter: &Filter, patch: &Value) -> Result<()> {
        let url = self.table_url(table, Some(filter), false)?;
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Unable to reach the store to update '{table}'"))?;
        check(response, "update", table).await?;
        Ok(())
    }

    async fn delete(&mut self, table: &str, filter: &Filter) -> Result<()> {
        let url = self.table_url(table, Some(filter), false)?;
        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .with_context(|| format!("Unable to reach the store to delete from '{table}'"))?;
        check(response, "delete", table).await?;
        Ok(())
    }
}

/// Turns a non-success response into an error carrying the status and the store's message.
async fn check(response: Response, operation: &str, table: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("The store rejected the {operation} on '{table}' with {status}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestStore {
        RestStore::new("https://example.supabase.co/", "key".to_string()).unwrap()
    }

    #[test]
    fn test_table_url_select() {
        let url = store().table_url("Mingguan_data", None, true).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/Mingguan_data?select=*"
        );
    }

    #[test]
    fn test_table_url_filter() {
        let filter = Filter::eq("username", "sari").and("password", "p w");
        let url = store()
            .table_url("admin_users", Some(&filter), true)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/admin_users?select=*&username=eq.sari&password=eq.p+w"
        );
    }

    #[test]
    fn test_table_url_delete_all() {
        let url = store()
            .table_url("Donatur_data", Some(&Filter::all()), false)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/Donatur_data?id=not.is.null"
        );
    }

    #[test]
    fn test_table_url_insert_has_no_query() {
        let url = store().table_url("Pengeluaran_data", None, false).unwrap();
        assert_eq!(url.query(), None);
    }
}
