//! Configuration file handling for the event fund.
//!
//! The configuration file is stored at `$FUND_HOME/config.json` and contains settings for the
//! application including the remote store URL, the table names, backup settings, the session idle
//! window and the letterhead printed on reports.

use crate::backup::Backup;
use crate::error::{public_error, ErrorType};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "event-fund";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const IDLE_TIMEOUT_SECS: u64 = 300;
/// Western Indonesian Time, UTC+7.
const UTC_OFFSET_MINUTES: i32 = 420;
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const REPORTS: &str = "reports";
const API_KEY: &str = "api_key";
const CONFIG_JSON: &str = "config.json";
const STAGED_JSON: &str = "staged.json";
const SESSION_JSON: &str = "session.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FUND_HOME` and from there it loads `$FUND_HOME/config.json`. It provides paths to
/// other items that are either configurable or are expected in a certain location within the
/// data directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `store_url` along with default settings
    /// - Copies `api_key_file` into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/event-fund`
    /// - `api_key_file` - A file holding the API key of the remote store.
    /// - `store_url` - The base URL of the remote store, e.g. `https://abcd.supabase.co`
    ///
    /// # Errors
    /// - Returns an error if the URL is not an http(s) URL or if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        api_key_file: &Path,
        store_url: &str,
    ) -> Result<Self> {
        validate_store_url(store_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fund home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;
        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;
        utils::make_dir(root.join(REPORTS)).await?;

        utils::copy(api_key_file, secrets_dir.join(API_KEY)).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            store_url: store_url.trim_end_matches('/').to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups: backups_dir,
            secrets: secrets_dir,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `fund_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - return the loaded configuration object
    pub async fn load(fund_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fund_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fund home directory is missing, run 'fund init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn store_url(&self) -> &str {
        &self.config_file.store_url
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// How long a session may stay idle before it is logged out.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.idle_timeout_secs)
    }

    /// The offset used when displaying timestamps. Falls back to UTC if the configured value is
    /// out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.config_file.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn tables(&self) -> &Tables {
        &self.config_file.tables
    }

    pub fn letterhead(&self) -> &Letterhead {
        &self.config_file.letterhead
    }

    /// The path of the locally persisted staged container.
    pub fn staged_path(&self) -> PathBuf {
        self.root.join(STAGED_JSON)
    }

    /// The path of the session file.
    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_JSON)
    }

    /// The default directory that reports are written to.
    pub fn reports_dir(&self) -> PathBuf {
        match &self.config_file.reports_dir {
            Some(p) => self.resolve(p.clone()),
            None => self.root.join(REPORTS),
        }
    }

    /// Returns the stored `api_key_path` if it is absolute, otherwise resolves the relative path.
    pub fn api_key_path(&self) -> PathBuf {
        self.resolve(self.config_file.api_key_path())
    }

    /// Reads the API key of the remote store.
    pub async fn api_key(&self) -> Result<String> {
        let path = self.api_key_path();
        let key = utils::read(&path).await?.trim().to_string();
        if key.is_empty() {
            return Err(public_error(
                ErrorType::Config,
                format!("The API key file '{}' is empty", path.display()),
            ));
        }
        Ok(key)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

fn validate_store_url(store_url: &str) -> Result<()> {
    let url = Url::parse(store_url)
        .with_context(|| format!("Invalid store URL '{store_url}'"))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        bail!("The store URL must use http or https, got '{}'", url.scheme());
    }
    Ok(())
}

/// The names of the remote tables. The defaults match the tables of the deployed store.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Tables {
    pub initial: String,
    pub weekly: String,
    pub donors: String,
    pub expenses: String,
    pub meta: String,
    pub users: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            initial: "DanaSebelumnya_data".to_string(),
            weekly: "Mingguan_data".to_string(),
            donors: "Donatur_data".to_string(),
            expenses: "Pengeluaran_data".to_string(),
            meta: "app_meta".to_string(),
            users: "admin_users".to_string(),
        }
    }
}

/// A titled signature line on the accountability report.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Signatory {
    pub title: String,
    #[serde(default)]
    pub name: String,
}

impl Signatory {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            name: String::new(),
        }
    }
}

/// The organization details printed on reports.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Letterhead {
    /// Bold heading lines at the top of every page.
    pub lines: Vec<String>,
    /// The address line under the heading.
    pub address: String,
    /// The short name of the committee, used in section titles and file names.
    pub short_name: String,
    /// The city printed before the date above the signatures.
    pub city: String,
    /// The title block of the accountability report.
    pub accountability_title: Vec<String>,
    /// The venue line printed under the accountability title.
    pub venue: String,
    /// The committee members who sign the accountability report.
    pub signatories: Vec<Signatory>,
    /// The officials who acknowledge the accountability report.
    pub acknowledged_by: Vec<Signatory>,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            lines: vec![
                "PANITIA HARI BESAR ISLAM".to_string(),
                "MAULID NABI MUHAMMAD SAW".to_string(),
                "DEWAN KEMAKMURAN MASJID (DKM) JAMI' AL-ISHLAH".to_string(),
            ],
            address: "Jl. H.A Djuminta Kp. Teriti Rw. 04 Desa Karet Kec. Sepatan Kab. Tangerang"
                .to_string(),
            short_name: "PHBI".to_string(),
            city: "Tangerang".to_string(),
            accountability_title: vec![
                "LAPORAN PERTANGGUNG JAWABAN".to_string(),
                "PANITIA PERINGATAN HARI BESAR ISLAM (PHBI)".to_string(),
                "MAULID NABI MUHAMMAD SAW".to_string(),
            ],
            venue: "Masjid Jam'i Al-Ishlah Kp. Teriti RW. 04".to_string(),
            signatories: vec![
                Signatory::titled("Wakil Ketua,"),
                Signatory::titled("Sekretaris,"),
                Signatory::titled("Bendahara,"),
            ],
            acknowledged_by: vec![
                Signatory::titled("Ketua DKM,"),
                Signatory::titled("Ketua RW,"),
                Signatory::titled("Ketua Pemuda,"),
            ],
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "event-fund",
///   "config_version": 1,
///   "store_url": "https://abcdefgh.supabase.co",
///   "backup_copies": 5,
///   "idle_timeout_secs": 300,
///   "utc_offset_minutes": 420,
///   "api_key_path": ".secrets/api_key"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "event-fund"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the remote store
    store_url: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Seconds of inactivity after which a session is logged out
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,

    /// Offset from UTC, in minutes, used to display dates and times
    #[serde(default = "default_utc_offset_minutes")]
    utc_offset_minutes: i32,

    /// Path to the API key file (optional, relative to config.json or absolute)
    /// Defaults to $FUND_HOME/.secrets/api_key if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key_path: Option<PathBuf>,

    /// Where reports are written when no output directory is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reports_dir: Option<PathBuf>,

    #[serde(default)]
    tables: Tables,

    #[serde(default)]
    letterhead: Letterhead,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_idle_timeout_secs() -> u64 {
    IDLE_TIMEOUT_SECS
}

fn default_utc_offset_minutes() -> i32 {
    UTC_OFFSET_MINUTES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            store_url: String::new(),
            backup_copies: BACKUP_COPIES,
            idle_timeout_secs: IDLE_TIMEOUT_SECS,
            utc_offset_minutes: UTC_OFFSET_MINUTES,
            api_key_path: None,
            reports_dir: None,
            tables: Tables::default(),
            letterhead: Letterhead::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        validate_store_url(&config.store_url)?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::serialize(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }

    /// Gets the API key path.
    ///
    /// If the path is relative, it should be interpreted as relative to the config.json file.
    /// If None, defaults to $FUND_HOME/.secrets/api_key
    fn api_key_path(&self) -> PathBuf {
        self.api_key_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(API_KEY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("fund_home");
        let key_file = dir.path().join("key.txt");
        utils::write(&key_file, "secret-key\n").await.unwrap();

        let config = Config::create(&home_dir, &key_file, "https://example.supabase.co/")
            .await
            .unwrap();

        assert_eq!("https://example.supabase.co", config.store_url());
        assert_eq!("secret-key", config.api_key().await.unwrap());
        assert!(config.backups().is_dir());
        assert!(config.secrets().is_dir());
        assert!(config.reports_dir().is_dir());
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
        assert_eq!(config.utc_offset().local_minus_utc(), 7 * 3600);
        assert_eq!(config.tables().weekly, "Mingguan_data");
        // The key file is copied, not moved.
        assert!(key_file.is_file());
    }

    #[tokio::test]
    async fn test_config_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let key_file = dir.path().join("key.txt");
        utils::write(&key_file, "k").await.unwrap();
        let created = Config::create(dir.path().join("home"), &key_file, "http://localhost:54321")
            .await
            .unwrap();
        let loaded = Config::load(created.root()).await.unwrap();
        assert_eq!(created.store_url(), loaded.store_url());
        assert_eq!(created.letterhead(), loaded.letterhead());
        assert_eq!(created.staged_path(), loaded.staged_path());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let key_file = dir.path().join("key.txt");
        utils::write(&key_file, "k").await.unwrap();
        let result = Config::create(dir.path().join("home"), &key_file, "ftp://example.com").await;
        assert!(result.is_err());
        let result = Config::create(dir.path().join("home2"), &key_file, "not a url").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "event-fund",
            "config_version": 1,
            "store_url": "https://minimal.supabase.co"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.idle_timeout_secs, 300);
        assert_eq!(config.utc_offset_minutes, 420);
        assert_eq!(config.tables, Tables::default());
        assert_eq!(config.letterhead, Letterhead::default());
        assert_eq!(config.api_key_path(), PathBuf::from(SECRETS).join(API_KEY));
    }

    #[tokio::test]
    async fn test_config_file_partial_tables() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "event-fund",
            "config_version": 1,
            "store_url": "https://minimal.supabase.co",
            "tables": { "weekly": "weekly_collections" }
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.tables.weekly, "weekly_collections");
        assert_eq!(config.tables.donors, "Donatur_data");
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "store_url": "https://example.supabase.co"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let config = ConfigFile::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("api_key_path"));
        assert!(!json.contains("reports_dir"));
    }
}
