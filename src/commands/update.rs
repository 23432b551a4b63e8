//! Update command handlers.
//!
//! The id is looked up in the staged container first. A staged record is changed locally; a
//! published record is changed in the store, after which the published container is fetched again.

use crate::api::{Mode, RemoteRecord};
use crate::args::{UpdateDonorArgs, UpdateExpenseArgs, UpdateInitialArgs, UpdateWeeklyArgs};
use crate::commands::insert::{ensure_free_slot, require_positive, require_text};
use crate::commands::{connect, Out, Source};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{Donation, Expense, InitialBalance, Ledger, WeeklyCollection};
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use chrono::Utc;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Changes the date and/or amount of an initial balance.
pub async fn update_initial(
    config: &Config,
    mode: Mode,
    args: &UpdateInitialArgs,
) -> Result<Out<InitialBalance>> {
    require_changes(args.date.is_some() || args.amount.is_some())?;
    update_record(config, mode, &args.id, |e: &mut InitialBalance| {
        if let Some(date) = args.date {
            e.date = date;
        }
        if let Some(amount) = args.amount {
            require_positive(amount, "amount")?;
            e.amount = amount;
        }
        Ok(())
    })
    .await
}

/// Changes a weekly collection. A new gross amount recomputes the cuts and the net amount; a new
/// week or zone must not collide with another collection.
pub async fn update_weekly(
    config: &Config,
    mode: Mode,
    args: &UpdateWeeklyArgs,
) -> Result<Out<WeeklyCollection>> {
    require_changes(
        args.date.is_some() || args.week.is_some() || args.zone.is_some() || args.gross.is_some(),
    )?;
    update_record(config, mode, &args.id, |e: &mut WeeklyCollection| {
        if let Some(date) = args.date {
            e.date = date;
        }
        if let Some(week) = &args.week {
            e.week = require_text(week, "week")?.to_string();
        }
        if let Some(zone) = &args.zone {
            e.zone = require_text(zone, "zone")?.to_string();
        }
        if let Some(gross) = args.gross {
            require_positive(gross, "gross")?;
            e.set_gross(gross);
        }
        Ok(())
    })
    .await
}

/// Changes a donation.
pub async fn update_donor(
    config: &Config,
    mode: Mode,
    args: &UpdateDonorArgs,
) -> Result<Out<Donation>> {
    require_changes(args.date.is_some() || args.donor.is_some() || args.amount.is_some())?;
    update_record(config, mode, &args.id, |e: &mut Donation| {
        if let Some(date) = args.date {
            e.date = date;
        }
        if let Some(donor) = &args.donor {
            e.donor = require_text(donor, "donor")?.to_string();
        }
        if let Some(amount) = args.amount {
            require_positive(amount, "amount")?;
            e.amount = amount;
        }
        Ok(())
    })
    .await
}

/// Changes an expense.
pub async fn update_expense(
    config: &Config,
    mode: Mode,
    args: &UpdateExpenseArgs,
) -> Result<Out<Expense>> {
    require_changes(args.date.is_some() || args.purpose.is_some() || args.amount.is_some())?;
    update_record(config, mode, &args.id, |e: &mut Expense| {
        if let Some(date) = args.date {
            e.date = date;
        }
        if let Some(purpose) = &args.purpose {
            e.purpose = require_text(purpose, "purpose")?.to_string();
        }
        if let Some(amount) = args.amount {
            require_positive(amount, "amount")?;
            e.amount = amount;
        }
        Ok(())
    })
    .await
}

fn require_changes(any: bool) -> Result<()> {
    if any {
        Ok(())
    } else {
        Err(public_error(
            ErrorType::Validation,
            "nothing to change, give at least one field",
        ))
    }
}

/// Rules that an edited record must satisfy against both containers.
trait Constrained: RemoteRecord + Serialize + Debug {
    /// Whether `check` looks at the published container.
    const NEEDS_PUBLISHED: bool = false;

    fn check(&self, _staged: &Ledger, _published: &Ledger) -> Result<()> {
        Ok(())
    }
}

impl Constrained for InitialBalance {}

impl Constrained for Donation {}

impl Constrained for Expense {}

impl Constrained for WeeklyCollection {
    const NEEDS_PUBLISHED: bool = true;

    fn check(&self, staged: &Ledger, published: &Ledger) -> Result<()> {
        ensure_free_slot(staged, published, &self.week, &self.zone, Some(&self.id))
    }
}

async fn update_record<T>(
    config: &Config,
    mode: Mode,
    id: &str,
    edit: impl FnOnce(&mut T) -> Result<()>,
) -> Result<Out<T>>
where
    T: Constrained,
{
    let session = session::require_login(config, Utc::now()).await?;
    let id = require_text(id, "id")?;
    let mut staged = Staged::load(config).await.pub_result(ErrorType::Local)?;

    let in_staged = T::find(staged.ledger(), id).is_some();
    let mut remote = if in_staged && !T::NEEDS_PUBLISHED {
        None
    } else {
        Some(connect(config, mode).await?)
    };
    let published = match remote.as_mut() {
        Some(remote) => remote.fetch_ledger().await.pub_result(ErrorType::Remote)?,
        None => Ledger::new(),
    };

    let (mut entry, source) = match T::find(staged.ledger(), id) {
        Some(e) => (e.clone(), Source::Staged),
        None => match T::find(&published, id) {
            Some(e) => (e.clone(), Source::Published),
            None => {
                return Err(public_error(
                    ErrorType::Validation,
                    format!("there is no {} entry with id {id}", T::KIND),
                ))
            }
        },
    };
    edit(&mut entry)?;
    entry.set_edited_by(&session.username);
    entry.check(staged.ledger(), &published)?;

    match source {
        Source::Staged => {
            if let Some(slot) = T::find_mut(staged.ledger_mut(), id) {
                *slot = entry.clone();
            }
            staged.save().await.pub_result(ErrorType::Local)?;
            Ok(Out::new(
                format!("Updated staged {} entry {id}", T::KIND),
                entry,
            ))
        }
        Source::Published => {
            let mut remote = match remote {
                Some(remote) => remote,
                None => connect(config, mode).await?,
            };
            remote
                .update_entry(&entry)
                .await
                .pub_result(ErrorType::Remote)?;
            let refreshed = remote.fetch_ledger().await.pub_result(ErrorType::Remote)?;
            debug!("Published now holds {} records", refreshed.counts().total());
            let entry = T::find(&refreshed, id).cloned().unwrap_or(entry);
            Ok(Out::new(
                format!("Updated published {} entry {id}", T::KIND),
                entry,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{InsertExpenseArgs, InsertWeeklyArgs};
    use crate::commands::{insert_expense, insert_weekly};
    use crate::error::error_type;
    use crate::model::{Amount, Role};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 13).unwrap()
    }

    async fn env() -> TestEnv {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.add_user("budi", "x", Role::Admin).await;
        env
    }

    async fn stage_weekly(env: &TestEnv, week: &str, zone: &str) -> String {
        let args = InsertWeeklyArgs {
            date: date(),
            week: week.to_string(),
            zone: zone.to_string(),
            gross: Amount::rupiah(100_000),
        };
        insert_weekly(&env.config(), Mode::Testing, &args)
            .await
            .unwrap()
            .structure()
            .unwrap()
            .id
            .clone()
    }

    #[tokio::test]
    async fn test_update_staged_gross_recomputes_cuts() {
        let env = env().await;
        env.login("sari").await;
        let id = stage_weekly(&env, "Minggu ke-1", "RT 01").await;

        env.login("budi").await;
        let args = UpdateWeeklyArgs {
            id: id.clone(),
            gross: Some(Amount::rupiah(200_000)),
            ..Default::default()
        };
        let out = update_weekly(&env.config(), Mode::Testing, &args)
            .await
            .unwrap();
        assert!(out.message().starts_with("Updated staged weekly entry"));

        let staged = Staged::load(&env.config()).await.unwrap();
        let entry = &staged.ledger().weekly[0];
        assert_eq!(entry.id, id);
        assert_eq!(entry.net, Amount::rupiah(170_000));
        assert_eq!(entry.commission_cut, Amount::rupiah(20_000));
        assert_eq!(entry.created_by.as_deref(), Some("sari"));
        assert_eq!(entry.edited_by.as_deref(), Some("budi"));
    }

    #[tokio::test]
    async fn test_update_weekly_rejects_collision() {
        let env = env().await;
        env.login("sari").await;
        stage_weekly(&env, "Minggu ke-1", "RT 01").await;
        let id = stage_weekly(&env, "Minggu ke-1", "RT 02").await;

        let args = UpdateWeeklyArgs {
            id: id.clone(),
            zone: Some("RT 01".to_string()),
            ..Default::default()
        };
        let err = update_weekly(&env.config(), Mode::Testing, &args)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Duplicate));

        // Re-saving the same slot does not collide with itself.
        let args = UpdateWeeklyArgs {
            id,
            zone: Some("RT 02".to_string()),
            ..Default::default()
        };
        update_weekly(&env.config(), Mode::Testing, &args)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_published_record() {
        let env = env().await;
        env.login("sari").await;
        let id = env.publish_weekly("Minggu ke-2", "RT 03", 100_000).await;

        let args = UpdateWeeklyArgs {
            id: id.clone(),
            gross: Some(Amount::rupiah(50_000)),
            ..Default::default()
        };
        let out = update_weekly(&env.config(), Mode::Testing, &args)
            .await
            .unwrap();
        assert!(out.message().starts_with("Updated published weekly entry"));
        let entry = out.structure().unwrap();
        assert_eq!(entry.net, Amount::rupiah(42_500));
        assert_eq!(entry.edited_by.as_deref(), Some("sari"));
        assert!(Staged::load(&env.config()).await.unwrap().ledger().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_and_empty_update() {
        let env = env().await;
        env.login("sari").await;
        let args = UpdateExpenseArgs {
            id: "nope".to_string(),
            amount: Some(Amount::rupiah(1)),
            ..Default::default()
        };
        let err = update_expense(&env.config(), Mode::Testing, &args)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));

        let staged = InsertExpenseArgs {
            date: date(),
            purpose: "Spanduk".to_string(),
            amount: Amount::rupiah(75_000),
        };
        let id = insert_expense(&env.config(), &staged)
            .await
            .unwrap()
            .structure()
            .unwrap()
            .id
            .clone();
        let args = UpdateExpenseArgs {
            id,
            ..Default::default()
        };
        let err = update_expense(&env.config(), Mode::Testing, &args)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_failed_published_update_changes_nothing() {
        let env = env().await;
        env.login("sari").await;
        let config = env.config();
        let id = env.publish_weekly("Minggu ke-3", "RT 04", 100_000).await;
        stage_weekly(&env, "Minggu ke-3", "RT 05").await;

        let mut state = env.get_state();
        state.reject_updates_into = Some(config.tables().weekly.clone());
        env.set_state(state);
        let remote_before = env.get_state();
        let staged_before = Staged::load(&config).await.unwrap().ledger().clone();

        let args = UpdateWeeklyArgs {
            id,
            gross: Some(Amount::rupiah(50_000)),
            ..Default::default()
        };
        let err = update_weekly(&config, Mode::Testing, &args)
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Remote));
        let expected = format!(
            "The store rejected the update on '{}' with 409 Conflict",
            config.tables().weekly
        );
        assert!(format!("{err:#}").ends_with(&expected));

        assert_eq!(env.get_state(), remote_before);
        let staged_after = Staged::load(&config).await.unwrap().ledger().clone();
        assert_eq!(staged_after, staged_before);
    }
}
