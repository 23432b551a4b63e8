//! The records, containers and money type of the event fund.

mod amount;
mod entry;
mod kind;
mod ledger;
mod user;

pub use amount::{Amount, AmountError};
pub use entry::{
    compare_weeks, label_key, new_id, same_label, sorted_by_date, week_number, Cuts, Donation, Entry, Expense,
    InitialBalance, WeeklyCollection, COMMISSION_RATE, CONSUMPTION_RATE,
};
pub use kind::{EntryKind, Scope};
pub use ledger::{Collection, Counts, Ledger, Totals};
pub use user::{AdminUser, Role};
