//! Lists staged and published records side by side.

use crate::api::Mode;
use crate::args::{ListArgs, ListFormat};
use crate::commands::{connect, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{sorted_by_date, Amount, Entry, EntryKind, Ledger, Totals};
use crate::session;
use crate::staged::Staged;
use crate::{Config, Result};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The container a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Staged,
    Published,
}

serde_plain::derive_display_from_serialize!(Source);
serde_plain::derive_fromstr_from_deserialize!(Source);

/// One record of any kind, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedEntry {
    pub source: Source,
    pub kind: EntryKind,
    pub id: String,
    pub date: NaiveDate,
    /// The week and zone, the donor or the purpose. Empty for initial balances.
    pub description: String,
    /// Only weekly collections have a gross amount.
    pub gross: Option<Amount>,
    /// The net amount for weekly collections, the nominal amount otherwise.
    pub amount: Amount,
    pub created_by: Option<String>,
    pub edited_by: Option<String>,
}

impl ListedEntry {
    fn new<T: Entry>(
        source: Source,
        entry: &T,
        description: String,
        gross: Option<Amount>,
        edited_by: Option<&String>,
    ) -> Self {
        Self {
            source,
            kind: T::KIND,
            id: entry.id().to_string(),
            date: entry.date(),
            description,
            gross,
            amount: entry.amount(),
            created_by: entry.created_by().map(str::to_string),
            edited_by: edited_by.cloned(),
        }
    }
}

/// The result of `fund list`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub entries: Vec<ListedEntry>,
    /// What the next publish would add.
    pub staged_totals: Totals,
}

/// Lists the records of the kinds in `args.scope` from both containers. Within a kind, staged
/// records come first; each group is ordered by date. Requires a login.
pub async fn list(config: &Config, mode: Mode, args: &ListArgs) -> Result<Out<Listing>> {
    session::require_login(config, Utc::now()).await?;
    let staged = Staged::load(config).await.pub_result(ErrorType::Local)?;
    let published = connect(config, mode)
        .await?
        .fetch_ledger()
        .await
        .pub_result(ErrorType::Remote)?;

    let mut entries = Vec::new();
    for kind in args.scope.kinds() {
        entries.extend(flatten(staged.ledger(), Source::Staged, kind));
        entries.extend(flatten(&published, Source::Published, kind));
    }
    let listing = Listing {
        entries,
        staged_totals: staged.ledger().totals(),
    };

    let message = match args.format {
        ListFormat::Table => table(&listing),
        ListFormat::Json => {
            serde_json::to_string_pretty(&listing).context("Unable to serialize the listing")?
        }
        ListFormat::Csv => csv_text(&listing.entries)?,
    };
    Ok(Out::new(message, listing))
}

fn flatten(ledger: &Ledger, source: Source, kind: EntryKind) -> Vec<ListedEntry> {
    match kind {
        EntryKind::Initial => sorted_by_date(&ledger.initial)
            .into_iter()
            .map(|e| ListedEntry::new(source, e, String::new(), None, e.edited_by.as_ref()))
            .collect(),
        EntryKind::Weekly => sorted_by_date(&ledger.weekly)
            .into_iter()
            .map(|e| {
                let description = format!("{} / {}", e.week, e.zone);
                ListedEntry::new(source, e, description, Some(e.gross), e.edited_by.as_ref())
            })
            .collect(),
        EntryKind::Donor => sorted_by_date(&ledger.donors)
            .into_iter()
            .map(|e| ListedEntry::new(source, e, e.donor.clone(), None, e.edited_by.as_ref()))
            .collect(),
        EntryKind::Expense => sorted_by_date(&ledger.expenses)
            .into_iter()
            .map(|e| ListedEntry::new(source, e, e.purpose.clone(), None, e.edited_by.as_ref()))
            .collect(),
    }
}

fn table(listing: &Listing) -> String {
    let mut lines = vec![format!(
        "{:<9} {:<7} {:<36} {:<10} {:<32} {:>16}",
        "SOURCE", "KIND", "ID", "DATE", "DESCRIPTION", "AMOUNT"
    )];
    for e in &listing.entries {
        lines.push(format!(
            "{:<9} {:<7} {:<36} {:<10} {:<32} {:>16}",
            e.source,
            e.kind,
            e.id,
            e.date,
            e.description,
            e.amount.to_string()
        ));
    }
    let t = &listing.staged_totals;
    lines.push(String::new());
    lines.push(plural(listing.entries.len(), "record", "records"));
    lines.push(format!(
        "Staged totals: initial {}, weekly net {}, donations {}, expenses {}",
        t.initial, t.weekly_net, t.donors, t.expenses
    ));
    lines.join("\n")
}

fn csv_text(entries: &[ListedEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in entries {
        writer
            .serialize(entry)
            .context("Unable to write a CSV row")?;
    }
    let bytes = writer.into_inner().context("Unable to finish the CSV output")?;
    String::from_utf8(bytes).context("The CSV output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::InsertDonorArgs;
    use crate::commands::insert_donor;
    use crate::error::error_type;
    use crate::model::{Role, Scope};
    use crate::test::TestEnv;

    async fn env_with_records() -> TestEnv {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.login("sari").await;
        env.publish_weekly("Minggu ke-1", "RT 01", 100_000).await;
        let args = InsertDonorArgs {
            date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            donor: "Pak RT".to_string(),
            amount: Amount::rupiah(250_000),
        };
        insert_donor(&env.config(), &args).await.unwrap();
        env
    }

    fn args(scope: Scope, format: ListFormat) -> ListArgs {
        ListArgs { scope, format }
    }

    #[tokio::test]
    async fn test_list_merges_both_containers() {
        let env = env_with_records().await;
        let out = list(&env.config(), Mode::Testing, &args(Scope::All, ListFormat::Table))
            .await
            .unwrap();
        let listing = out.structure().unwrap();
        assert_eq!(listing.entries.len(), 2);
        let weekly = &listing.entries[0];
        assert_eq!(weekly.source, Source::Published);
        assert_eq!(weekly.description, "Minggu ke-1 / RT 01");
        assert_eq!(weekly.amount, Amount::rupiah(85_000));
        let donor = &listing.entries[1];
        assert_eq!(donor.source, Source::Staged);
        assert_eq!(donor.created_by.as_deref(), Some("sari"));
        assert_eq!(listing.staged_totals.donors, Amount::rupiah(250_000));
        assert!(out.message().contains("Rp 250.000"));
        assert!(out.message().contains("2 records"));
    }

    #[tokio::test]
    async fn test_list_scope_and_csv() {
        let env = env_with_records().await;
        let out = list(&env.config(), Mode::Testing, &args(Scope::Donor, ListFormat::Csv))
            .await
            .unwrap();
        let mut lines = out.message().lines();
        assert_eq!(
            lines.next(),
            Some("source,kind,id,date,description,gross,amount,created_by,edited_by")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("staged,donor,"));
        assert!(row.ends_with(",2026-09-02,Pak RT,,250000,sari,"));
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn test_list_json() {
        let env = env_with_records().await;
        let out = list(&env.config(), Mode::Testing, &args(Scope::Weekly, ListFormat::Json))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(out.message()).unwrap();
        assert_eq!(value["entries"][0]["gross"], 100_000);
        assert_eq!(value["entries"][0]["source"], "published");
    }

    #[tokio::test]
    async fn test_list_requires_login() {
        let env = TestEnv::new().await;
        let err = list(&env.config(), Mode::Testing, &args(Scope::All, ListFormat::Table))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Authorization));
    }
}
