//! The container that holds one set of records of every kind.
//!
//! Two containers exist at runtime: the staged one, persisted locally, and the published one,
//! mirrored from the remote store. Both are a `Ledger`.

use crate::model::{
    compare_weeks, same_label, Amount, Donation, Entry, EntryKind, Expense, InitialBalance,
    WeeklyCollection,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// When the published records were last changed by a publish. Unused for staged records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub initial: Vec<InitialBalance>,
    #[serde(default)]
    pub weekly: Vec<WeeklyCollection>,
    #[serde(default)]
    pub donors: Vec<Donation>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

/// The number of records of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub initial: usize,
    pub weekly: usize,
    pub donors: usize,
    pub expenses: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.initial + self.weekly + self.donors + self.expenses
    }

    pub fn get(&self, kind: EntryKind) -> usize {
        match kind {
            EntryKind::Initial => self.initial,
            EntryKind::Weekly => self.weekly,
            EntryKind::Donor => self.donors,
            EntryKind::Expense => self.expenses,
        }
    }

    pub(crate) fn set(&mut self, kind: EntryKind, n: usize) {
        match kind {
            EntryKind::Initial => self.initial = n,
            EntryKind::Weekly => self.weekly = n,
            EntryKind::Donor => self.donors = n,
            EntryKind::Expense => self.expenses = n,
        }
    }
}

/// Sums over a ledger. Every figure is a direct sum of the underlying records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub initial: Amount,
    pub weekly_gross: Amount,
    pub weekly_consumption: Amount,
    pub weekly_commission: Amount,
    pub weekly_net: Amount,
    pub donors: Amount,
    pub expenses: Amount,
    /// `initial + weekly_net + donors`
    pub income: Amount,
    /// `income - expenses`
    pub balance: Amount,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    pub fn counts(&self) -> Counts {
        Counts {
            initial: self.initial.len(),
            weekly: self.weekly.len(),
            donors: self.donors.len(),
            expenses: self.expenses.len(),
        }
    }

    pub fn totals(&self) -> Totals {
        let initial: Amount = self.initial.iter().map(|e| e.amount).sum();
        let weekly_net: Amount = self.weekly.iter().map(|e| e.net).sum();
        let donors: Amount = self.donors.iter().map(|e| e.amount).sum();
        let expenses: Amount = self.expenses.iter().map(|e| e.amount).sum();
        let income = initial + weekly_net + donors;
        Totals {
            initial,
            weekly_gross: self.weekly.iter().map(|e| e.gross).sum(),
            weekly_consumption: self.weekly.iter().map(|e| e.consumption_cut).sum(),
            weekly_commission: self.weekly.iter().map(|e| e.commission_cut).sum(),
            weekly_net,
            donors,
            expenses,
            income,
            balance: income - expenses,
        }
    }

    /// Removes every record of `kind`.
    pub fn clear(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Initial => self.initial.clear(),
            EntryKind::Weekly => self.weekly.clear(),
            EntryKind::Donor => self.donors.clear(),
            EntryKind::Expense => self.expenses.clear(),
        }
    }

    /// True if a record of `kind` with `id` exists.
    pub fn contains(&self, kind: EntryKind, id: &str) -> bool {
        match kind {
            EntryKind::Initial => position(&self.initial, id).is_some(),
            EntryKind::Weekly => position(&self.weekly, id).is_some(),
            EntryKind::Donor => position(&self.donors, id).is_some(),
            EntryKind::Expense => position(&self.expenses, id).is_some(),
        }
    }

    /// Removes the record of `kind` with `id`. Returns false if there was no such record.
    pub fn remove(&mut self, kind: EntryKind, id: &str) -> bool {
        match kind {
            EntryKind::Initial => remove_by_id(&mut self.initial, id),
            EntryKind::Weekly => remove_by_id(&mut self.weekly, id),
            EntryKind::Donor => remove_by_id(&mut self.donors, id),
            EntryKind::Expense => remove_by_id(&mut self.expenses, id),
        }
    }

    /// Finds a weekly entry for the same week and zone, ignoring the entry with `exclude_id`.
    pub fn weekly_conflict(
        &self,
        week: &str,
        zone: &str,
        exclude_id: Option<&str>,
    ) -> Option<&WeeklyCollection> {
        self.weekly
            .iter()
            .filter(|e| Some(e.id.as_str()) != exclude_id)
            .find(|e| e.same_slot(week, zone))
    }

    /// The distinct week labels present, ordered by week number. Labels that differ only in case
    /// or surrounding whitespace are one week, spelled as first seen.
    pub fn weeks(&self) -> Vec<String> {
        let mut weeks: Vec<String> = Vec::new();
        for entry in &self.weekly {
            if !weeks.iter().any(|w| same_label(w, &entry.week)) {
                weeks.push(entry.week.trim().to_string());
            }
        }
        weeks.sort_by(|a, b| compare_weeks(a, b));
        weeks
    }

    /// The week label with the highest week number, if any weekly entries exist.
    pub fn latest_week(&self) -> Option<String> {
        self.weeks().pop()
    }
}

fn position<T: Entry>(entries: &[T], id: &str) -> Option<usize> {
    entries.iter().position(|e| e.id() == id)
}

fn remove_by_id<T: Entry>(entries: &mut Vec<T>, id: &str) -> bool {
    match position(entries, id) {
        Some(i) => {
            entries.remove(i);
            true
        }
        None => false,
    }
}

/// Gives generic access to the collection of a given entry type within a `Ledger`.
pub trait Collection: Entry + Sized {
    fn of(ledger: &Ledger) -> &Vec<Self>;

    fn of_mut(ledger: &mut Ledger) -> &mut Vec<Self>;

    fn find<'a>(ledger: &'a Ledger, id: &str) -> Option<&'a Self> {
        Self::of(ledger).iter().find(|e| e.id() == id)
    }

    fn find_mut<'a>(ledger: &'a mut Ledger, id: &str) -> Option<&'a mut Self> {
        Self::of_mut(ledger).iter_mut().find(|e| e.id() == id)
    }
}

macro_rules! impl_collection {
    ($ty:ty, $field:ident) => {
        impl Collection for $ty {
            fn of(ledger: &Ledger) -> &Vec<Self> {
                &ledger.$field
            }

            fn of_mut(ledger: &mut Ledger) -> &mut Vec<Self> {
                &mut ledger.$field
            }
        }
    };
}

impl_collection!(InitialBalance, initial);
impl_collection!(WeeklyCollection, weekly);
impl_collection!(Donation, donors);
impl_collection!(Expense, expenses);
