//! The rows and totals that both report formats print, derived from the published ledger.

use crate::model::{
    compare_weeks, label_key, sorted_by_date, Amount, Donation, Expense, InitialBalance, Ledger,
    Totals, WeeklyCollection,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Sums of the amount columns of weekly collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklySums {
    pub gross: Amount,
    pub consumption: Amount,
    pub commission: Amount,
    pub net: Amount,
}

impl WeeklySums {
    fn add(&mut self, entry: &WeeklyCollection) {
        self.gross += entry.gross;
        self.consumption += entry.consumption_cut;
        self.commission += entry.commission_cut;
        self.net += entry.net;
    }

    fn add_sums(&mut self, other: &WeeklySums) {
        self.gross += other.gross;
        self.consumption += other.consumption;
        self.commission += other.commission;
        self.net += other.net;
    }
}

/// The weekly collections of one week, ordered by zone, with their subtotal.
#[derive(Debug, Clone)]
pub struct WeekGroup<'a> {
    pub week: String,
    pub entries: Vec<&'a WeeklyCollection>,
    pub subtotal: WeeklySums,
}

/// The net collected in one week, dated by the earliest collection of that week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSummary {
    pub week: String,
    pub date: NaiveDate,
    pub net: Amount,
}

/// Everything a report prints, computed once from a ledger.
#[derive(Debug, Clone)]
pub struct ReportData<'a> {
    pub initial: Vec<&'a InitialBalance>,
    pub weeks: Vec<WeekGroup<'a>>,
    pub weekly_total: WeeklySums,
    pub week_summaries: Vec<WeekSummary>,
    pub donors: Vec<&'a Donation>,
    pub expenses: Vec<&'a Expense>,
    pub totals: Totals,
}

impl<'a> ReportData<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        let weeks = week_groups(&ledger.weekly);
        let mut weekly_total = WeeklySums::default();
        for group in &weeks {
            weekly_total.add_sums(&group.subtotal);
        }
        Self {
            initial: sorted_by_date(&ledger.initial),
            week_summaries: week_summaries(&weeks),
            weeks,
            weekly_total,
            donors: sorted_by_date(&ledger.donors),
            expenses: sorted_by_date(&ledger.expenses),
            totals: ledger.totals(),
        }
    }
}

/// Groups weekly collections by week label. Groups are ordered by week number and the entries of
/// a group by zone; entries with the same zone keep date order.
pub fn week_groups(entries: &[WeeklyCollection]) -> Vec<WeekGroup<'_>> {
    let mut groups: Vec<WeekGroup<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in sorted_by_date(entries) {
        let i = *index.entry(label_key(&entry.week)).or_insert_with(|| {
            groups.push(WeekGroup {
                week: entry.week.trim().to_string(),
                entries: Vec::new(),
                subtotal: WeeklySums::default(),
            });
            groups.len() - 1
        });
        groups[i].entries.push(entry);
        groups[i].subtotal.add(entry);
    }
    for group in &mut groups {
        group.entries.sort_by(|a, b| a.zone.cmp(&b.zone));
    }
    groups.sort_by(|a, b| compare_weeks(&a.week, &b.week));
    groups
}

fn week_summaries(groups: &[WeekGroup<'_>]) -> Vec<WeekSummary> {
    groups
        .iter()
        .filter_map(|group| {
            let date = group.entries.iter().map(|e| e.date).min()?;
            Some(WeekSummary {
                week: group.week.clone(),
                date,
                net: group.subtotal.net,
            })
        })
        .collect()
}
