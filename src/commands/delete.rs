//! Delete command handler.

use crate::api::Mode;
use crate::args::DeleteArgs;
use crate::commands::insert::require_text;
use crate::commands::{connect, Out, Source};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use chrono::Utc;
use tracing::debug;

/// Deletes a record by kind and id.
///
/// A staged record is removed locally and only needs a login. A published record is deleted from
/// the store, which needs `--yes` and an owner, after which the published records are fetched
/// again.
///
/// # Errors
/// - A validation error if neither container has the record, or `--yes` is missing for a
///   published record.
/// - An authorization error for a published record when the user is not an owner.
pub async fn delete(config: &Config, mode: Mode, args: &DeleteArgs) -> Result<Out<Source>> {
    let session = session::require_login(config, Utc::now()).await?;
    let id = require_text(&args.id, "id")?;
    let kind = args.kind;

    let mut staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    if staged.ledger_mut().remove(kind, id) {
        staged.save().await.pub_result(ErrorType::Local)?;
        return Ok(Out::new(
            format!("Deleted staged {kind} entry {id}"),
            Source::Staged,
        ));
    }

    let mut remote = connect(config, mode).await?;
    let published = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;
    if !published.contains(kind, id) {
        return Err(public_error(
            ErrorType::Validation,
            format!("there is no {kind} entry with id {id}"),
        ));
    }
    if !args.yes {
        return Err(public_error(
            ErrorType::Validation,
            format!("{kind} entry {id} is published, add --yes to delete it"),
        ));
    }
    session.verify_owner(&mut remote).await?;

    remote
        .delete_entry(kind, id)
        .await
        .pub_result(ErrorType::Remote)?;
    let refreshed = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;
    debug!(
        "{} published {} remain",
        refreshed.counts().get(kind),
        kind.plural()
    );
    Ok(Out::new(
        format!("Deleted published {kind} entry {id}"),
        Source::Published,
    ))
}
