//! Reset command handler.

use crate::api::Mode;
use crate::args::ResetArgs;
use crate::backup::{Snapshot, RESET_PRE};
use crate::commands::{connect, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::Counts;
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use chrono::Utc;
use tracing::{debug, warn};

/// Deletes every record of the kinds in `args.scope`, staged and published alike. Requires an
/// owner and `--yes`. Both containers are backed up first.
///
/// Returns the number of records that were removed from each container, staged first.
pub async fn reset(
    config: &Config,
    mode: Mode,
    args: &ResetArgs,
) -> Result<Out<(Counts, Counts)>> {
    if !args.yes {
        return Err(public_error(
            ErrorType::Validation,
            format!(
                "resetting {} deletes published records, add --yes to confirm",
                args.scope
            ),
        ));
    }
    let session = session::require_login(config, Utc::now()).await?;
    let mut remote = connect(config, mode).await?;
    session.verify_owner(&mut remote).await?;

    let mut staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    let published = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;
    let snapshot = Snapshot {
        staged: staged.ledger().clone(),
        published,
    };
    let path = config
        .backup()
        .save_json(RESET_PRE, &snapshot)
        .await
        .pub_result(ErrorType::Local)?;
    debug!("Backed up both containers to {}", path.display());

    let mut staged_removed = Counts::default();
    let mut published_removed = Counts::default();
    for kind in args.scope.kinds() {
        staged_removed.set(kind, staged.ledger().counts().get(kind));
        published_removed.set(kind, snapshot.published.counts().get(kind));
        staged.ledger_mut().clear(kind);
    }
    staged.save().await.pub_result(ErrorType::Local)?;

    for kind in args.scope.kinds() {
        remote.delete_all(kind).await.pub_result(ErrorType::Remote)?;
    }
    let remaining = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;
    warn!(
        "{} reset {}, {} published records remain",
        session.username,
        args.scope,
        remaining.counts().total()
    );

    Ok(Out::new(
        format!(
            "Deleted {} staged and {} published records",
            staged_removed.total(),
            published_removed.total()
        ),
        (staged_removed, published_removed),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Donation, Role, Scope};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    async fn stage_donation(env: &TestEnv) {
        let mut staged = Staged::load(&env.config()).await.unwrap();
        staged.ledger_mut().donors.push(Donation::new(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            "Hamba Allah",
            Amount::rupiah(100_000),
            None,
        ));
        staged.save().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_one_kind() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Owner).await;
        env.login("sari").await;
        let config = env.config();
        env.publish_weekly("Minggu ke-1", "RT 01", 100_000).await;
        env.publish_weekly("Minggu ke-1", "RT 02", 100_000).await;
        stage_donation(&env).await;

        let args = ResetArgs {
            scope: Scope::Weekly,
            yes: true,
        };
        let out = reset(&config, Mode::Testing, &args).await.unwrap();
        assert_eq!(out.message(), "Deleted 0 staged and 2 published records");
        assert!(env.get_state().rows(&config.tables().weekly).is_empty());
        // Donations are outside the scope.
        assert_eq!(Staged::load(&config).await.unwrap().ledger().donors.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_all_clears_staged() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Owner).await;
        env.login("sari").await;
        stage_donation(&env).await;
        let args = ResetArgs {
            scope: Scope::All,
            yes: true,
        };
        let out = reset(&env.config(), Mode::Testing, &args).await.unwrap();
        assert_eq!(out.structure().unwrap().0.donors, 1);
        assert!(Staged::load(&env.config()).await.unwrap().ledger().is_empty());
    }

    #[tokio::test]
    async fn test_reset_requires_yes_and_owner() {
        let env = TestEnv::new().await;
        env.add_user("budi", "x", Role::Admin).await;
        env.login("budi").await;
        let mut args = ResetArgs {
            scope: Scope::All,
            yes: false,
        };
        let err = reset(&env.config(), Mode::Testing, &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));

        args.yes = true;
        let err = reset(&env.config(), Mode::Testing, &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Authorization));
    }
}
