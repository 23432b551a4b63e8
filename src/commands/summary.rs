//! The public summary of the published records. No login is needed.

use crate::api::Mode;
use crate::args::SummaryArgs;
use crate::commands::{connect, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::model::{
    compare_weeks, same_label, sorted_by_date, Amount, Donation, Expense, Ledger, Totals,
    WeeklyCollection,
};
use crate::{Config, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

/// The `--week` value that selects every week.
pub const ALL_WEEKS: &str = "all";

/// Sums over the weekly collections shown in the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekTotals {
    pub gross: Amount,
    pub consumption: Amount,
    pub commission: Amount,
    pub net: Amount,
}

impl WeekTotals {
    fn of(entries: &[WeeklyCollection]) -> Self {
        entries.iter().fold(Self::default(), |t, e| Self {
            gross: t.gross + e.gross,
            consumption: t.consumption + e.consumption_cut,
            commission: t.commission + e.commission_cut,
            net: t.net + e.net,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Totals over every published record, regardless of the week filter.
    pub totals: Totals,
    pub last_updated: Option<DateTime<Utc>>,
    /// Every week label, ordered by week number.
    pub weeks: Vec<String>,
    /// The week shown, or `None` when every week is shown.
    pub week: Option<String>,
    pub weekly: Vec<WeeklyCollection>,
    pub weekly_totals: WeekTotals,
    pub donors: Vec<Donation>,
    pub expenses: Vec<Expense>,
}

/// Summarizes the published records.
///
/// The weekly section shows the week named by `--week`, every week for `--week all`, and the
/// highest numbered week when `--week` is not given.
///
/// # Errors
/// - A validation error if `--week` names a week that has no collections.
pub async fn summary(config: &Config, mode: Mode, args: &SummaryArgs) -> Result<Out<Summary>> {
    let ledger = connect(config, mode)
        .await?
        .fetch_ledger()
        .await
        .pub_result(ErrorType::Remote)?;
    let summary = summarize(&ledger, args.week.as_deref())?;
    let text = render(&summary, config.utc_offset());
    Ok(Out::new(text, summary))
}

fn summarize(ledger: &Ledger, week: Option<&str>) -> Result<Summary> {
    let weeks = ledger.weeks();
    let week = match week.map(str::trim) {
        None => ledger.latest_week(),
        Some(w) if w.eq_ignore_ascii_case(ALL_WEEKS) => None,
        Some(w) => match weeks.iter().find(|known| same_label(known, w)) {
            Some(known) => Some(known.clone()),
            None => {
                return Err(public_error(
                    ErrorType::Validation,
                    format!("there are no collections for '{w}', known weeks: {}", weeks.join(", ")),
                ))
            }
        },
    };

    let mut weekly: Vec<WeeklyCollection> = ledger
        .weekly
        .iter()
        .filter(|e| week.as_ref().is_none_or(|w| e.in_week(w)))
        .cloned()
        .collect();
    weekly.sort_by(|a, b| compare_weeks(&a.week, &b.week).then_with(|| a.zone.cmp(&b.zone)));

    Ok(Summary {
        totals: ledger.totals(),
        last_updated: ledger.last_updated,
        weekly_totals: WeekTotals::of(&weekly),
        weeks,
        week,
        weekly,
        donors: sorted_by_date(&ledger.donors).into_iter().cloned().collect(),
        expenses: sorted_by_date(&ledger.expenses).into_iter().cloned().collect(),
    })
}

fn render(s: &Summary, offset: FixedOffset) -> String {
    let last_updated = match s.last_updated {
        Some(t) => t.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    };
    let t = &s.totals;
    let mut lines = vec![
        format!("Last updated:       {last_updated}"),
        format!("Total income:       {:>16}", t.income.to_string()),
        format!("Total expenses:     {:>16}", t.expenses.to_string()),
        format!("Balance:            {:>16}", t.balance.to_string()),
        String::new(),
        "Income".to_string(),
        format!("  Opening balance:  {:>16}", t.initial.to_string()),
        format!("  Weekly (net):     {:>16}", t.weekly_net.to_string()),
        format!("  Donations:        {:>16}", t.donors.to_string()),
        String::new(),
    ];

    lines.push(match &s.week {
        Some(week) => format!("Weekly collections, {week}"),
        None => "Weekly collections, all weeks".to_string(),
    });
    if s.weekly.is_empty() {
        lines.push("  none".to_string());
    }
    for e in &s.weekly {
        let label = if s.week.is_some() {
            e.zone.clone()
        } else {
            format!("{} / {}", e.week, e.zone)
        };
        lines.push(weekly_line(&label, e.gross, e.consumption_cut, e.commission_cut, e.net));
    }
    let w = &s.weekly_totals;
    lines.push(weekly_line("Total", w.gross, w.consumption, w.commission, w.net));
    lines.push(String::new());

    lines.push("Donations".to_string());
    if s.donors.is_empty() {
        lines.push("  none".to_string());
    }
    for e in &s.donors {
        lines.push(dated_line(e.date, &e.donor, e.amount));
    }
    lines.push(String::new());

    lines.push("Expenses".to_string());
    if s.expenses.is_empty() {
        lines.push("  none".to_string());
    }
    for e in &s.expenses {
        lines.push(dated_line(e.date, &e.purpose, e.amount));
    }
    lines.join("\n")
}

fn weekly_line(
    label: &str,
    gross: Amount,
    consumption: Amount,
    commission: Amount,
    net: Amount,
) -> String {
    format!(
        "  {label:<24} gross {:>14}  cuts {:>12} {:>12}  net {:>14}",
        gross.to_string(),
        consumption.to_string(),
        commission.to_string(),
        net.to_string()
    )
}

fn dated_line(date: NaiveDate, text: &str, amount: Amount) -> String {
    format!("  {date}  {text:<32} {:>16}", amount.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::test::TestEnv;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    fn ledger() -> Ledger {
        let weekly = |week: &str, zone: &str, gross: i64| {
            WeeklyCollection::new(date(1), week, zone, Amount::rupiah(gross), None)
        };
        Ledger {
            last_updated: Some("2026-09-20T12:00:00Z".parse().unwrap()),
            weekly: vec![
                weekly("Minggu ke-10", "RT 02", 200_000),
                weekly("Minggu ke-2", "RT 01", 100_000),
                weekly("Minggu ke-10", "RT 01", 100_000),
            ],
            expenses: vec![Expense::new(date(5), "Spanduk", Amount::rupiah(75_000), None)],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_to_latest_week() {
        let s = summarize(&ledger(), None).unwrap();
        assert_eq!(s.week.as_deref(), Some("Minggu ke-10"));
        assert_eq!(s.weeks, vec!["Minggu ke-2", "Minggu ke-10"]);
        let zones: Vec<&str> = s.weekly.iter().map(|e| e.zone.as_str()).collect();
        assert_eq!(zones, vec!["RT 01", "RT 02"]);
        assert_eq!(s.weekly_totals.gross, Amount::rupiah(300_000));
        assert_eq!(s.weekly_totals.net, Amount::rupiah(255_000));
        // The headline totals are not filtered.
        assert_eq!(s.totals.weekly_net, Amount::rupiah(340_000));
        assert_eq!(s.totals.balance, Amount::rupiah(265_000));
    }

    #[test]
    fn test_week_filter() {
        let s = summarize(&ledger(), Some("all")).unwrap();
        assert_eq!(s.week, None);
        assert_eq!(s.weekly.len(), 3);
        assert_eq!(s.weekly[0].week, "Minggu ke-2");

        let s = summarize(&ledger(), Some(" minggu ke-2 ")).unwrap();
        assert_eq!(s.week.as_deref(), Some("Minggu ke-2"));
        assert_eq!(s.weekly.len(), 1);

        let err = summarize(&ledger(), Some("Minggu ke-7")).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[test]
    fn test_week_labels_differing_in_case_are_one_week() {
        let mut ledger = ledger();
        ledger.weekly.push(WeeklyCollection::new(
            date(8),
            "minggu KE-2 ",
            "RT 03",
            Amount::rupiah(50_000),
            None,
        ));
        assert_eq!(ledger.weeks(), vec!["Minggu ke-2", "Minggu ke-10"]);

        let s = summarize(&ledger, Some("MINGGU KE-2")).unwrap();
        assert_eq!(s.week.as_deref(), Some("Minggu ke-2"));
        let zones: Vec<&str> = s.weekly.iter().map(|e| e.zone.as_str()).collect();
        assert_eq!(zones, vec!["RT 01", "RT 03"]);
        assert_eq!(s.weekly_totals.gross, Amount::rupiah(150_000));
    }

    #[test]
    fn test_empty_ledger() {
        let s = summarize(&Ledger::new(), None).unwrap();
        assert_eq!(s.week, None);
        let text = render(&s, FixedOffset::east_opt(7 * 3600).unwrap());
        assert!(text.starts_with("Last updated:       never"));
        assert!(text.contains("Balance:                        Rp 0"));
    }

    #[test]
    fn test_render_uses_offset() {
        let s = summarize(&ledger(), None).unwrap();
        let text = render(&s, FixedOffset::east_opt(7 * 3600).unwrap());
        assert!(text.starts_with("Last updated:       2026-09-20 19:00:00"));
        assert!(text.contains("Weekly collections, Minggu ke-10"));
        assert!(text.contains("Spanduk"));
    }

    #[tokio::test]
    async fn test_summary_needs_no_login() {
        let env = TestEnv::new().await;
        env.publish_weekly("Minggu ke-1", "RT 01", 100_000).await;
        let out = summary(&env.config(), Mode::Testing, &SummaryArgs::default())
            .await
            .unwrap();
        let s = out.structure().unwrap();
        assert_eq!(s.totals.income, Amount::rupiah(85_000));
        assert!(out.message().contains("RT 01"));
    }
}
