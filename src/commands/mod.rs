//! Command handlers for the fund CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler returns an `Out`
//! so that the one-shot CLI and the interactive shell print results the same way.

mod auth;
mod delete;
mod init;
mod insert;
mod list;
mod publish;
mod report;
mod reset;
mod shell;
mod summary;
mod update;
mod users;

use crate::api::{self, Mode, Remote};
use crate::args::{Command, InsertSubcommand, UpdateSubcommand, UsersAction};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout, whoami};
pub use delete::delete;
pub use init::init;
pub use insert::{insert_donor, insert_expense, insert_initial, insert_weekly};
pub use list::{list, Listing, ListedEntry, Source};
pub use publish::{publish, Published};
pub use report::{report, Written};
pub use reset::reset;
pub use shell::shell;
pub use summary::{summary, Summary, WeekTotals};
pub use update::{update_donor, update_expense, update_initial, update_weekly};
pub use users::{users_add, users_list, users_remove};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and the interactive shell.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        self.debug_structure();
    }

    /// Print the message to stdout, for output that is the point of the command (listings and
    /// the summary), and the structured data (if it exists) as JSON to `debug!`.
    pub fn print_stdout(&self) {
        println!("{}", self.message);
        self.debug_structure();
    }

    fn debug_structure(&self) {
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Runs any command that works against an existing data directory. `init` and `shell` are handled
/// by the caller.
pub async fn run(config: &Config, mode: Mode, command: &Command) -> Result<()> {
    let _: () = match command {
        Command::Init(_) | Command::Shell => {
            return Err(public_error(
                ErrorType::Validation,
                "init and shell cannot be run from the shell",
            ))
        }

        Command::Login(args) => login(config, mode, &args.username, &args.password)
            .await?
            .print(),
        Command::Logout => logout(config).await?.print(),
        Command::Whoami => whoami(config).await?.print(),

        Command::Users(users_args) => match users_args.action() {
            UsersAction::List => users_list(config, mode).await?.print_stdout(),
            UsersAction::Add(args) => users_add(config, mode, args).await?.print(),
            UsersAction::Remove(args) => users_remove(config, mode, args).await?.print(),
        },

        Command::Insert(insert_args) => match insert_args.entry() {
            InsertSubcommand::Initial(args) => insert_initial(config, args).await?.print(),
            InsertSubcommand::Weekly(args) => insert_weekly(config, mode, args).await?.print(),
            InsertSubcommand::Donor(args) => insert_donor(config, args).await?.print(),
            InsertSubcommand::Expense(args) => insert_expense(config, args).await?.print(),
        },

        Command::Update(update_args) => match update_args.entry() {
            UpdateSubcommand::Initial(args) => update_initial(config, mode, args).await?.print(),
            UpdateSubcommand::Weekly(args) => update_weekly(config, mode, args).await?.print(),
            UpdateSubcommand::Donor(args) => update_donor(config, mode, args).await?.print(),
            UpdateSubcommand::Expense(args) => update_expense(config, mode, args).await?.print(),
        },

        Command::Delete(args) => delete(config, mode, args).await?.print(),
        Command::Publish(args) => publish(config, mode, args).await?.print(),
        Command::Reset(args) => reset(config, mode, args).await?.print(),
        Command::List(args) => list(config, mode, args).await?.print_stdout(),
        Command::Summary(args) => summary(config, mode, args).await?.print_stdout(),
        Command::Report(args) => report(config, mode, args).await?.print(),
    };
    Ok(())
}

/// "1 weekly collection" or "2 weekly collections".
pub(crate) fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Connects to the table store configured for `mode`.
pub(crate) async fn connect(config: &Config, mode: Mode) -> Result<Remote> {
    api::remote(config, mode).await.pub_result(ErrorType::Config)
}
