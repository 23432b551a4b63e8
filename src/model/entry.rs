//! The four kinds of ledger records.
//!
//! Every record carries an `id`, a calendar `date`, its amount field(s), a free text field and
//! optional attribution. Staged records get a locally generated UUID as their `id`; published
//! records carry the identifier assigned by the remote store.

use crate::model::{Amount, EntryKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// The share of a weekly collection's gross amount set aside for consumption (5%).
pub const CONSUMPTION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// The share of a weekly collection's gross amount paid as commission (10%).
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Behavior shared by every record kind.
pub trait Entry {
    const KIND: EntryKind;

    fn id(&self) -> &str;

    fn date(&self) -> NaiveDate;

    /// The amount this record contributes to its total: the net amount for weekly collections,
    /// the nominal amount for everything else.
    fn amount(&self) -> Amount;

    fn created_by(&self) -> Option<&str>;

    fn set_edited_by(&mut self, user: &str);
}

/// Generates a new identifier for a staged record.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Funds carried over from the previous committee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialBalance {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
}

impl InitialBalance {
    pub fn new(date: NaiveDate, amount: Amount, created_by: Option<String>) -> Self {
        Self {
            id: new_id(),
            date,
            amount,
            created_by,
            edited_by: None,
        }
    }
}

/// The deductions taken from a weekly collection's gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cuts {
    pub consumption: Amount,
    pub commission: Amount,
    pub net: Amount,
}

impl Cuts {
    /// `consumption = gross × 5%`, `commission = gross × 10%`, and the remainder is `net`.
    pub fn from_gross(gross: Amount) -> Self {
        let consumption = gross.percent(CONSUMPTION_RATE);
        let commission = gross.percent(COMMISSION_RATE);
        Self {
            consumption,
            commission,
            net: gross - consumption - commission,
        }
    }
}

/// Money collected in one zone during one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCollection {
    pub id: String,
    pub date: NaiveDate,
    /// A free-form week label such as `Minggu ke-3`.
    pub week: String,
    /// The neighborhood unit the money was collected in, e.g. `RT 01`.
    pub zone: String,
    pub gross: Amount,
    pub consumption_cut: Amount,
    pub commission_cut: Amount,
    pub net: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
}

impl WeeklyCollection {
    pub fn new(
        date: NaiveDate,
        week: impl Into<String>,
        zone: impl Into<String>,
        gross: Amount,
        created_by: Option<String>,
    ) -> Self {
        let cuts = Cuts::from_gross(gross);
        Self {
            id: new_id(),
            date,
            week: week.into(),
            zone: zone.into(),
            gross,
            consumption_cut: cuts.consumption,
            commission_cut: cuts.commission,
            net: cuts.net,
            created_by,
            edited_by: None,
        }
    }

    /// Sets `gross` and recomputes the cuts and the net amount from it.
    pub fn set_gross(&mut self, gross: Amount) {
        let cuts = Cuts::from_gross(gross);
        self.gross = gross;
        self.consumption_cut = cuts.consumption;
        self.commission_cut = cuts.commission;
        self.net = cuts.net;
    }

    /// True when this entry is for the same week and zone, compared with `same_label`.
    pub fn same_slot(&self, week: &str, zone: &str) -> bool {
        self.in_week(week) && same_label(&self.zone, zone)
    }

    pub fn in_week(&self, week: &str) -> bool {
        same_label(&self.week, week)
    }
}

/// Week and zone labels are equal after trimming and ignoring ASCII case.
pub fn same_label(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// The form of a label that `same_label` compares.
pub fn label_key(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

/// A contribution from a named donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub date: NaiveDate,
    pub donor: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
}

impl Donation {
    pub fn new(
        date: NaiveDate,
        donor: impl Into<String>,
        amount: Amount,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            date,
            donor: donor.into(),
            amount,
            created_by,
            edited_by: None,
        }
    }
}

/// Money spent from the fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub purpose: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        purpose: impl Into<String>,
        amount: Amount,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            date,
            purpose: purpose.into(),
            amount,
            created_by,
            edited_by: None,
        }
    }
}

macro_rules! impl_entry {
    ($ty:ty, $kind:expr, |$s:ident| $amount:expr) => {
        impl Entry for $ty {
            const KIND: EntryKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn date(&self) -> NaiveDate {
                self.date
            }

            fn amount(&self) -> Amount {
                let $s = self;
                $amount
            }

            fn created_by(&self) -> Option<&str> {
                self.created_by.as_deref()
            }

            fn set_edited_by(&mut self, user: &str) {
                self.edited_by = Some(user.to_string());
            }
        }
    };
}

impl_entry!(InitialBalance, EntryKind::Initial, |s| s.amount);
impl_entry!(WeeklyCollection, EntryKind::Weekly, |s| s.net);
impl_entry!(Donation, EntryKind::Donor, |s| s.amount);
impl_entry!(Expense, EntryKind::Expense, |s| s.amount);

/// Extracts the first run of digits in a week label, e.g. `10` for `Minggu ke-10`. Labels without
/// digits are treated as week 0.
pub fn week_number(label: &str) -> u64 {
    label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .fold(0u64, |n, c| {
            n.saturating_mul(10)
                .saturating_add(u64::from(c.to_digit(10).unwrap_or(0)))
        })
}

/// Orders week labels numerically, falling back to the label text for equal numbers.
pub fn compare_weeks(a: &str, b: &str) -> Ordering {
    week_number(a)
        .cmp(&week_number(b))
        .then_with(|| a.cmp(b))
}

/// Sorts entries by date, oldest first. The sort is stable so entries on the same date keep their
/// insertion order.
pub fn sorted_by_date<T>(entries: &[T]) -> Vec<&T>
where
    T: Entry,
{
    let mut sorted: Vec<&T> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date());
    sorted
}
