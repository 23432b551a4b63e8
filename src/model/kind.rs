use serde::{Deserialize, Serialize};

/// Identifies one of the four record kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Funds carried over from the previous committee.
    Initial,
    /// Weekly collections per zone.
    Weekly,
    /// Donor contributions.
    Donor,
    /// Expenses.
    Expense,
}

serde_plain::derive_display_from_serialize!(EntryKind);
serde_plain::derive_fromstr_from_deserialize!(EntryKind);

impl EntryKind {
    /// All kinds, in the order they are published.
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Initial,
        EntryKind::Weekly,
        EntryKind::Donor,
        EntryKind::Expense,
    ];

    /// A human readable, plural name used in command output.
    pub fn plural(&self) -> &'static str {
        match self {
            EntryKind::Initial => "initial balances",
            EntryKind::Weekly => "weekly collections",
            EntryKind::Donor => "donations",
            EntryKind::Expense => "expenses",
        }
    }
}

/// Which collections a command applies to: every kind or just one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Initial,
    Weekly,
    Donor,
    Expense,
}

serde_plain::derive_display_from_serialize!(Scope);
serde_plain::derive_fromstr_from_deserialize!(Scope);

impl Scope {
    /// The kinds covered by this scope, in publish order.
    pub fn kinds(&self) -> Vec<EntryKind> {
        match self {
            Scope::All => EntryKind::ALL.to_vec(),
            Scope::Initial => vec![EntryKind::Initial],
            Scope::Weekly => vec![EntryKind::Weekly],
            Scope::Donor => vec![EntryKind::Donor],
            Scope::Expense => vec![EntryKind::Expense],
        }
    }
}

impl From<EntryKind> for Scope {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Initial => Scope::Initial,
            EntryKind::Weekly => Scope::Weekly,
            EntryKind::Donor => Scope::Donor,
            EntryKind::Expense => Scope::Expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_display_and_parse() {
        assert_eq!(EntryKind::Weekly.to_string(), "weekly");
        assert_eq!(EntryKind::from_str("donor").unwrap(), EntryKind::Donor);
        assert!(EntryKind::from_str("income").is_err());
    }

    #[test]
    fn test_scope_kinds() {
        assert_eq!(Scope::All.kinds(), EntryKind::ALL.to_vec());
        assert_eq!(Scope::Expense.kinds(), vec![EntryKind::Expense]);
        assert_eq!(Scope::from(EntryKind::Initial), Scope::Initial);
    }
}
