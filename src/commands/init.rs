use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file using `store_url` along with default settings
/// - Copies `api_key_file` into its default location in the data dir.
///
/// # Arguments
/// - `fund_home` - The directory that will be the root of data directory, e.g. `$HOME/event-fund`
/// - `api_key_file` - A file holding the API key of the table store. This will be copied from the
///   `api_key_file` path to its default location and name in the data directory.
/// - `store_url` - The base URL of the table store, e.g. https://abcdefgh.supabase.co
///
/// # Errors
/// - Returns an error if the URL is invalid or if any file operations fail.
pub async fn init(fund_home: &Path, api_key_file: &Path, store_url: &str) -> Result<Out<()>> {
    let config = Config::create(fund_home, api_key_file, store_url)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the fund directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("key.txt");
        std::fs::write(&key, "secret-key\n").unwrap();
        let home = dir.path().join("fund");

        let out = init(&home, &key, "https://example.supabase.co/").await.unwrap();
        assert!(out.message().starts_with("Successfully created"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.store_url(), "https://example.supabase.co");
        assert_eq!(config.api_key().await.unwrap(), "secret-key");
        assert!(config.reports_dir().is_dir());
    }

    #[tokio::test]
    async fn test_init_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("key.txt");
        std::fs::write(&key, "k").unwrap();
        let err = init(&dir.path().join("fund"), &key, "not a url")
            .await
            .unwrap_err();
        assert_eq!(crate::error::error_type(&err), Some(ErrorType::Config));
    }
}
