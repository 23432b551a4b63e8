//! Moves staged records to the published container.

use crate::api::{Mode, Remote, RemoteRecord};
use crate::args::PublishArgs;
use crate::backup::PUBLISH_PRE;
use crate::commands::{connect, plural, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{Counts, Donation, EntryKind, Expense, InitialBalance, WeeklyCollection};
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// The outcome of a publish.
#[derive(Debug, Clone, Serialize)]
pub struct Published {
    /// Records moved by this publish.
    pub moved: Counts,
    /// Records in the published container afterwards.
    pub published: Counts,
    pub last_updated: DateTime<Utc>,
    /// The backup of the staged container taken before anything was sent.
    pub backup: PathBuf,
}

/// Publishes every staged record.
///
/// Kinds are sent in order: initial balances, weekly collections, donations, expenses. Each kind
/// leaves the staged container as soon as its insert succeeds. If an insert fails the command
/// stops there: kinds sent before it stay published and kinds after it stay staged. After the last
/// kind the publish time is recorded and the published records are fetched again.
///
/// # Errors
/// - A validation error if nothing is staged.
/// - A remote error if the store rejects an insert or the timestamp write.
pub async fn publish(config: &Config, mode: Mode, args: &PublishArgs) -> Result<Out<Published>> {
    let session = session::require_login(config, Utc::now()).await?;
    let mut staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    if staged.ledger().is_empty() {
        return Err(public_error(ErrorType::Validation, "nothing to publish"));
    }

    let backup = config
        .backup()
        .save_json(PUBLISH_PRE, staged.ledger())
        .await
        .pub_result(ErrorType::Local)?;
    debug!("Backed up the staged records to {}", backup.display());

    let timestamp = args.timestamp.unwrap_or_else(Utc::now);
    let mut remote = connect(config, mode).await?;
    let mut moved = Counts::default();
    for kind in EntryKind::ALL {
        let n = match kind {
            EntryKind::Initial => drain::<InitialBalance>(&mut remote, &mut staged).await,
            EntryKind::Weekly => drain::<WeeklyCollection>(&mut remote, &mut staged).await,
            EntryKind::Donor => drain::<Donation>(&mut remote, &mut staged).await,
            EntryKind::Expense => drain::<Expense>(&mut remote, &mut staged).await,
        }
        .with_context(|| {
            format!(
                "Publishing stopped at the {}, {} published before the failure",
                kind.plural(),
                plural(moved.total(), "record was", "records were")
            )
        })?;
        if n > 0 {
            info!("Published {}", plural(n, kind_one(kind), kind.plural()));
        }
        moved.set(kind, n);
    }

    remote
        .write_last_updated(timestamp)
        .await
        .pub_result(ErrorType::Remote)?;
    let ledger = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;

    let message = format!(
        "{} published by {} at {}",
        plural(moved.total(), "record", "records"),
        session.username,
        timestamp
            .with_timezone(&config.utc_offset())
            .format("%Y-%m-%d %H:%M:%S")
    );
    Ok(Out::new(
        message,
        Published {
            moved,
            published: ledger.counts(),
            last_updated: timestamp,
            backup,
        },
    ))
}

/// Sends every staged record of type `T`, then removes them from the staged container and saves
/// it. Returns the number of records sent.
async fn drain<T: RemoteRecord>(remote: &mut Remote, staged: &mut Staged) -> Result<usize> {
    let entries = T::of(staged.ledger());
    let n = entries.len();
    if n == 0 {
        return Ok(0);
    }
    remote
        .insert_all(entries)
        .await
        .pub_result(ErrorType::Remote)?;
    T::of_mut(staged.ledger_mut()).clear();
    staged
        .save()
        .await
        .with_context(|| {
            format!(
                "The staged file could not be updated after sending {}, remove the {} from {} \
                 before publishing again",
                plural(n, kind_one(T::KIND), T::KIND.plural()),
                T::KIND.plural(),
                staged.path().display()
            )
        })
        .pub_result(ErrorType::Local)?;
    Ok(n)
}

fn kind_one(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Initial => "initial balance",
        EntryKind::Weekly => "weekly collection",
        EntryKind::Donor => "donation",
        EntryKind::Expense => "expense",
    }
}
