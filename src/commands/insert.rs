//! Insert command handlers. New records always go to the staged container.

use crate::api::Mode;
use crate::args::{InsertDonorArgs, InsertExpenseArgs, InsertInitialArgs, InsertWeeklyArgs};
use crate::commands::{connect, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{Amount, Collection, Donation, Expense, InitialBalance, Ledger, WeeklyCollection};
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use chrono::Utc;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Stages funds carried over from the previous committee.
pub async fn insert_initial(
    config: &Config,
    args: &InsertInitialArgs,
) -> Result<Out<InitialBalance>> {
    let session = session::require_login(config, Utc::now()).await?;
    require_positive(args.amount, "amount")?;
    stage(
        config,
        InitialBalance::new(args.date, args.amount, Some(session.username)),
    )
    .await
}

/// Stages a weekly collection. The cuts and the net amount are computed from the gross amount.
///
/// # Errors
/// - A duplicate error if a staged or published collection already exists for the same week and
///   zone.
pub async fn insert_weekly(
    config: &Config,
    mode: Mode,
    args: &InsertWeeklyArgs,
) -> Result<Out<WeeklyCollection>> {
    let session = session::require_login(config, Utc::now()).await?;
    let week = require_text(&args.week, "week")?;
    let zone = require_text(&args.zone, "zone")?;
    require_positive(args.gross, "gross")?;

    let staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    let published = connect(config, mode)
        .await?
        .fetch_ledger()
        .await
        .pub_result(ErrorType::Remote)?;
    ensure_free_slot(staged.ledger(), &published, week, zone, None)?;

    let entry = WeeklyCollection::new(args.date, week, zone, args.gross, Some(session.username));
    save_staged(staged, entry).await
}

/// Stages a donation.
pub async fn insert_donor(config: &Config, args: &InsertDonorArgs) -> Result<Out<Donation>> {
    let session = session::require_login(config, Utc::now()).await?;
    let donor = require_text(&args.donor, "donor")?;
    require_positive(args.amount, "amount")?;
    stage(
        config,
        Donation::new(args.date, donor, args.amount, Some(session.username)),
    )
    .await
}

/// Stages an expense.
pub async fn insert_expense(config: &Config, args: &InsertExpenseArgs) -> Result<Out<Expense>> {
    let session = session::require_login(config, Utc::now()).await?;
    let purpose = require_text(&args.purpose, "purpose")?;
    require_positive(args.amount, "amount")?;
    stage(
        config,
        Expense::new(args.date, purpose, args.amount, Some(session.username)),
    )
    .await
}

async fn stage<T>(config: &Config, entry: T) -> Result<Out<T>>
where
    T: Collection + Serialize + Clone + Debug,
{
    let staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    save_staged(staged, entry).await
}

async fn save_staged<T>(mut staged: Staged, entry: T) -> Result<Out<T>>
where
    T: Collection + Serialize + Clone + Debug,
{
    T::of_mut(staged.ledger_mut()).push(entry.clone());
    staged.save().await.pub_result(ErrorType::Local)?;
    debug!("Saved {}", staged.path().display());
    Ok(Out::new(
        format!("Staged {} entry {}", T::KIND, entry.id()),
        entry,
    ))
}

/// Trims `value` and fails with a validation error if nothing is left.
pub(super) fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(public_error(
            ErrorType::Validation,
            format!("{field} must not be empty"),
        ));
    }
    Ok(trimmed)
}

pub(super) fn require_positive(amount: Amount, field: &str) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(public_error(
            ErrorType::Validation,
            format!("{field} must be greater than zero, got {amount}"),
        ))
    }
}

/// Fails with a duplicate error if `staged` or `published` has a weekly collection for `week` and
/// `zone` other than the one with `exclude_id`.
pub(super) fn ensure_free_slot(
    staged: &Ledger,
    published: &Ledger,
    week: &str,
    zone: &str,
    exclude_id: Option<&str>,
) -> Result<()> {
    let conflict = staged
        .weekly_conflict(week, zone, exclude_id)
        .map(|e| ("staged", e))
        .or_else(|| {
            published
                .weekly_conflict(week, zone, exclude_id)
                .map(|e| ("published", e))
        });
    match conflict {
        Some((source, existing)) => Err(public_error(
            ErrorType::Duplicate,
            format!(
                "{zone} already has a {source} weekly collection for {week} (id {})",
                existing.id
            ),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::DeleteArgs;
    use crate::commands::delete;
    use crate::error::error_type;
    use crate::model::{EntryKind, Role};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 6).unwrap()
    }

    fn weekly_args(week: &str, zone: &str, gross: i64) -> InsertWeeklyArgs {
        InsertWeeklyArgs {
            date: date(),
            week: week.to_string(),
            zone: zone.to_string(),
            gross: Amount::rupiah(gross),
        }
    }

    async fn logged_in_env() -> TestEnv {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.login("sari").await;
        env
    }

    #[tokio::test]
    async fn test_insert_weekly_computes_cuts() {
        let env = logged_in_env().await;
        let config = env.config();
        let out = insert_weekly(&config, Mode::Testing, &weekly_args("Week 3", "Zone 1", 100_000))
            .await
            .unwrap();
        let entry = out.structure().unwrap();
        assert_eq!(entry.consumption_cut, Amount::rupiah(5_000));
        assert_eq!(entry.commission_cut, Amount::rupiah(10_000));
        assert_eq!(entry.net, Amount::rupiah(85_000));
        assert_eq!(entry.created_by.as_deref(), Some("sari"));

        let staged = Staged::load(&config).await.unwrap();
        assert_eq!(staged.ledger().weekly, vec![entry.clone()]);
    }

    #[tokio::test]
    async fn test_insert_weekly_rejects_staged_duplicate() {
        let env = logged_in_env().await;
        let config = env.config();
        insert_weekly(&config, Mode::Testing, &weekly_args("Week 3", "Zone 1", 100_000))
            .await
            .unwrap();
        let err = insert_weekly(&config, Mode::Testing, &weekly_args(" Week 3", "Zone 1 ", 5))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Duplicate));
        // Another zone in the same week is fine.
        insert_weekly(&config, Mode::Testing, &weekly_args("Week 3", "Zone 2", 5))
            .await
            .unwrap();
        assert_eq!(Staged::load(&config).await.unwrap().ledger().weekly.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_weekly_rejects_published_duplicate() {
        let env = logged_in_env().await;
        let config = env.config();
        env.publish_weekly("Week 3", "Zone 1", 100_000).await;
        let err = insert_weekly(&config, Mode::Testing, &weekly_args("Week 3", "Zone 1", 1))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Duplicate));
        assert!(format!("{err:#}").contains("published"));
    }

    #[tokio::test]
    async fn test_insert_validation() {
        let env = logged_in_env().await;
        let config = env.config();
        let args = InsertExpenseArgs {
            date: date(),
            purpose: "  ".to_string(),
            amount: Amount::rupiah(1_000),
        };
        let err = insert_expense(&config, &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));

        let args = InsertDonorArgs {
            date: date(),
            donor: "Hamba Allah".to_string(),
            amount: Amount::rupiah(-5),
        };
        let err = insert_donor(&config, &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert!(Staged::load(&config).await.unwrap().ledger().is_empty());
    }

    #[tokio::test]
    async fn test_insert_requires_login() {
        let env = TestEnv::new().await;
        let args = InsertInitialArgs {
            date: date(),
            amount: Amount::rupiah(500_000),
        };
        let err = insert_initial(&env.config(), &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Authorization));
    }

    #[tokio::test]
    async fn test_insert_then_delete_restores_staged() {
        let env = logged_in_env().await;
        let config = env.config();
        let before = Staged::load(&config).await.unwrap().ledger().clone();
        let args = InsertDonorArgs {
            date: date(),
            donor: "Pak RT".to_string(),
            amount: Amount::rupiah(250_000),
        };
        let out = insert_donor(&config, &args).await.unwrap();
        let id = out.structure().unwrap().id.clone();

        delete(&config, Mode::Testing, &DeleteArgs::new(EntryKind::Donor, id, false))
            .await
            .unwrap();
        assert_eq!(Staged::load(&config).await.unwrap().ledger(), &before);
    }
}
