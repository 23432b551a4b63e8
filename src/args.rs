//! These structs provide the CLI interface for the fund CLI.

use crate::model::{Amount, EntryKind, Role, Scope};
use crate::report::{ReportFormat, ReportKind};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fund: A command-line tool for keeping the books of a community event fund.
///
/// Administrators stage records of four kinds (initial balances carried over from the previous
/// committee, weekly collections per neighborhood unit, donations and expenses), then publish them
/// to a hosted table store where they become the public record. Anyone can view the public
/// summary; reports can be generated as spreadsheets and printable documents.
///
/// Run `fund init` first to point the tool at your store.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need the base URL of your table store (for
    /// a hosted Supabase project this looks like https://abcdefgh.supabase.co) and a file holding
    /// its API key. The key file is copied into the data directory.
    Init(InitArgs),
    /// Log in as an administrator. The session ends after a period of inactivity.
    Login(LoginArgs),
    /// End the current session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Manage administrator accounts.
    Users(UsersArgs),
    /// Stage a new record. Staged records become public when you publish.
    Insert(InsertArgs),
    /// Change a staged or published record.
    Update(UpdateArgs),
    /// Delete a staged or published record.
    Delete(DeleteArgs),
    /// Move every staged record to the public store.
    Publish(PublishArgs),
    /// Delete every record of a kind, staged and published. Requires the owner role.
    Reset(ResetArgs),
    /// List staged and published records.
    List(ListArgs),
    /// Show the public summary of the fund. No login required.
    Summary(SummaryArgs),
    /// Generate a spreadsheet and/or printable report from the published records.
    Report(ReportArgs),
    /// Run commands interactively. The session is logged out after the idle window passes
    /// without input.
    Shell,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fund data and configuration is held. Defaults to ~/event-fund
    #[arg(long, env = "FUND_HOME", default_value_t = default_fund_home())]
    fund_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fund_home: PathBuf) -> Self {
        Self {
            log_level,
            fund_home: fund_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fund_home(&self) -> &DisplayPath {
        &self.fund_home
    }
}

/// (Not shown): Args for the `fund init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the table store, e.g. https://abcdefgh.supabase.co
    #[arg(long)]
    store_url: String,

    /// The path to a file holding the API key of the store. This file will be copied to the
    /// default secrets location in the main data directory.
    #[arg(long)]
    api_key: PathBuf,
}

impl InitArgs {
    pub fn new(store_url: impl Into<String>, api_key: impl Into<PathBuf>) -> Self {
        Self {
            store_url: store_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    pub fn api_key(&self) -> &Path {
        &self.api_key
    }
}

/// (Not shown): Args for the `fund login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    /// Can also be given in the FUND_PASSWORD environment variable.
    #[arg(long, env = "FUND_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// (Not shown): Args for the `fund users` command.
#[derive(Debug, Parser, Clone)]
pub struct UsersArgs {
    #[command(subcommand)]
    action: UsersAction,
}

impl UsersArgs {
    pub fn new(action: UsersAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &UsersAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UsersAction {
    /// List administrator accounts, newest first.
    List,
    /// Create an administrator account. The first account ever created is an owner and can be
    /// created without logging in.
    Add(AddUserArgs),
    /// Delete an administrator account.
    Remove(RemoveUserArgs),
}

/// (Not shown): Args for the `fund users add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddUserArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    /// Must match --password.
    #[arg(long)]
    pub confirm_password: String,

    #[arg(long, value_enum, default_value_t = Role::Admin)]
    pub role: Role,
}

/// (Not shown): Args for the `fund users remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveUserArgs {
    /// The id of the account, as shown by `fund users list`.
    pub id: String,

    /// Confirm the deletion.
    #[arg(long)]
    pub yes: bool,
}

/// (Not shown): Args for the `fund insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entry: InsertSubcommand,
}

impl InsertArgs {
    pub fn new(entry: InsertSubcommand) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &InsertSubcommand {
        &self.entry
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Funds carried over from the previous committee.
    Initial(InsertInitialArgs),
    /// Money collected in one zone during one week. The cuts and the net amount are computed.
    Weekly(InsertWeeklyArgs),
    /// A contribution from a donor.
    Donor(InsertDonorArgs),
    /// Money spent from the fund.
    Expense(InsertExpenseArgs),
}

/// (Not shown): Args for the `fund insert initial` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertInitialArgs {
    /// The date in YYYY-MM-DD format.
    #[arg(long)]
    pub date: NaiveDate,

    /// The amount, e.g. 1500000 or "Rp 1.500.000".
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,
}

/// (Not shown): Args for the `fund insert weekly` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertWeeklyArgs {
    /// The date in YYYY-MM-DD format.
    #[arg(long)]
    pub date: NaiveDate,

    /// The week label, e.g. "Minggu ke-3". Weeks are ordered by the first number in the label.
    #[arg(long)]
    pub week: String,

    /// The neighborhood unit, e.g. "RT 01".
    #[arg(long)]
    pub zone: String,

    /// The gross amount collected.
    #[arg(long, allow_hyphen_values = true)]
    pub gross: Amount,
}

/// (Not shown): Args for the `fund insert donor` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertDonorArgs {
    /// The date in YYYY-MM-DD format.
    #[arg(long)]
    pub date: NaiveDate,

    /// The name of the donor or the source of the funds.
    #[arg(long)]
    pub donor: String,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,
}

/// (Not shown): Args for the `fund insert expense` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertExpenseArgs {
    /// The date in YYYY-MM-DD format.
    #[arg(long)]
    pub date: NaiveDate,

    /// What the money was spent on.
    #[arg(long)]
    pub purpose: String,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,
}

/// (Not shown): Args for the `fund update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entry: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn new(entry: UpdateSubcommand) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &UpdateSubcommand {
        &self.entry
    }
}

/// Staged records are looked up first; if the id is not staged, the published record is updated
/// in the store. Only the fields given are changed.
#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    Initial(UpdateInitialArgs),
    Weekly(UpdateWeeklyArgs),
    Donor(UpdateDonorArgs),
    Expense(UpdateExpenseArgs),
}

/// (Not shown): Args for the `fund update initial` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateInitialArgs {
    pub id: String,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Amount>,
}

/// (Not shown): Args for the `fund update weekly` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateWeeklyArgs {
    pub id: String,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub week: Option<String>,

    #[arg(long)]
    pub zone: Option<String>,

    /// A new gross amount. The cuts and the net amount are recomputed.
    #[arg(long, allow_hyphen_values = true)]
    pub gross: Option<Amount>,
}

/// (Not shown): Args for the `fund update donor` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateDonorArgs {
    pub id: String,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub donor: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Amount>,
}

/// (Not shown): Args for the `fund update expense` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateExpenseArgs {
    pub id: String,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub purpose: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Amount>,
}

/// (Not shown): Args for the `fund delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The kind of record.
    #[arg(value_enum)]
    pub kind: EntryKind,

    /// The id of the record, as shown by `fund list`.
    pub id: String,

    /// Confirm the deletion of a published record. Not needed for staged records.
    #[arg(long)]
    pub yes: bool,
}

impl DeleteArgs {
    pub fn new(kind: EntryKind, id: impl Into<String>, yes: bool) -> Self {
        Self {
            kind,
            id: id.into(),
            yes,
        }
    }
}

/// (Not shown): Args for the `fund publish` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct PublishArgs {
    /// The publish time recorded as the last update, in RFC 3339 format. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// (Not shown): Args for the `fund reset` command.
#[derive(Debug, Parser, Clone)]
pub struct ResetArgs {
    /// Which records to delete.
    #[arg(value_enum)]
    pub scope: Scope,

    /// Confirm the deletion.
    #[arg(long)]
    pub yes: bool,
}

/// The output format of `fund list`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ListFormat {
    #[default]
    Table,
    Json,
    Csv,
}

serde_plain::derive_display_from_serialize!(ListFormat);
serde_plain::derive_fromstr_from_deserialize!(ListFormat);

/// (Not shown): Args for the `fund list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// Which records to list.
    #[arg(value_enum, default_value_t = Scope::All)]
    pub scope: Scope,

    #[arg(long, value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
}

/// (Not shown): Args for the `fund summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// The week to show weekly collections for, or "all". Defaults to the latest week.
    #[arg(long)]
    pub week: Option<String>,
}

/// (Not shown): Args for the `fund report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Which report to generate.
    #[arg(value_enum)]
    pub kind: ReportKind,

    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    pub format: ReportFormat,

    /// The directory to write the files to. Defaults to $FUND_HOME/reports
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ReportArgs {
    pub fn new(kind: ReportKind, format: ReportFormat, out: Option<PathBuf>) -> Self {
        Self { kind, format, out }
    }
}

fn default_fund_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("event-fund"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fund-home or FUND_HOME instead of relying on the default \
                fund home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("event-fund")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_weekly() {
        let args = Args::try_parse_from([
            "fund",
            "--fund-home",
            "/tmp/fund",
            "insert",
            "weekly",
            "--date",
            "2026-09-06",
            "--week",
            "Minggu ke-3",
            "--zone",
            "RT 01",
            "--gross",
            "Rp 100.000",
        ])
        .unwrap();
        assert_eq!(args.common().fund_home().path(), Path::new("/tmp/fund"));
        let Command::Insert(insert) = args.command() else {
            panic!("expected insert");
        };
        let InsertSubcommand::Weekly(weekly) = insert.entry() else {
            panic!("expected weekly");
        };
        assert_eq!(weekly.week, "Minggu ke-3");
        assert_eq!(weekly.gross, Amount::rupiah(100_000));
    }

    #[test]
    fn test_parse_report_defaults_to_both_formats() {
        let args = Args::try_parse_from(["fund", "report", "financial"]).unwrap();
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.kind, ReportKind::Financial);
        assert_eq!(report.format, ReportFormat::Both);
        assert!(report.out.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Args::try_parse_from([
            "fund", "insert", "expense", "--date", "17/10/2026", "--purpose", "x", "--amount", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_defaults() {
        let args = Args::try_parse_from(["fund", "list"]).unwrap();
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.scope, Scope::All);
        assert_eq!(list.format, ListFormat::Table);
    }
}
