//! Books for a community event fund.
//!
//! Administrators stage records locally and publish them to a hosted table store, where they form
//! the public record. The published records feed a summary view and spreadsheet and printable
//! reports.

mod api;
pub mod args;
mod backup;
pub mod commands;
mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod session;
mod staged;
mod utils;

pub use api::{Mode, Remote, TEST_MODE_VAR};
pub use backup::{Backup, Snapshot};
pub use config::{Config, Letterhead, Signatory, Tables};
pub use error::{Error, ErrorType, Result};
pub use staged::Staged;
