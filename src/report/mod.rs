//! Spreadsheet and printable reports of the published records.
//!
//! Both formats are pure functions of a ledger, a `ReportKind` and `RenderOptions`: the ledger is
//! turned into `ReportData` (sorted rows and totals) and each renderer lays out the sections that
//! the kind calls for.

mod data;
pub mod format;
mod layout;
mod pdf;
pub mod words;
mod xlsx;

use crate::config::Letterhead;
use crate::model::{Amount, Ledger};
use crate::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub use data::{week_groups, ReportData, WeekGroup, WeekSummary, WeeklySums};

/// Which report to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Weekly collections per zone, grouped by week.
    Weekly,
    /// Donations.
    Donor,
    /// Expenses.
    Expense,
    /// Opening balance, weekly collections and donations.
    Income,
    /// Every section followed by the reconciliation.
    Financial,
    /// The committee's accountability report with signatures.
    Accountability,
}

serde_plain::derive_display_from_serialize!(ReportKind);
serde_plain::derive_fromstr_from_deserialize!(ReportKind);

/// Which files to write.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Pdf,
    Xlsx,
    #[default]
    Both,
}

serde_plain::derive_display_from_serialize!(ReportFormat);
serde_plain::derive_fromstr_from_deserialize!(ReportFormat);

impl ReportFormat {
    pub fn pdf(&self) -> bool {
        matches!(self, ReportFormat::Pdf | ReportFormat::Both)
    }

    pub fn xlsx(&self) -> bool {
        matches!(self, ReportFormat::Xlsx | ReportFormat::Both)
    }
}

/// A part of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Opening,
    WeeklyDetail,
    WeeklySummary,
    Donors,
    Expenses,
    Reconciliation,
}

impl ReportKind {
    /// The sections of this report, in print order.
    pub fn sections(&self) -> &'static [Section] {
        use Section::*;
        match self {
            ReportKind::Weekly => &[WeeklyDetail],
            ReportKind::Donor => &[Donors],
            ReportKind::Expense => &[Expenses],
            ReportKind::Income => &[Opening, WeeklyDetail, Donors],
            ReportKind::Financial => &[Opening, WeeklyDetail, Donors, Expenses, Reconciliation],
            ReportKind::Accountability => {
                &[Opening, WeeklySummary, Donors, Expenses, Reconciliation]
            }
        }
    }

    pub fn has(&self, section: Section) -> bool {
        self.sections().contains(&section)
    }

    /// The file name of the report without the date and extension, e.g.
    /// `Laporan_PHBI_Mingguan_Per_RT`.
    pub fn stem(&self, short_name: &str) -> String {
        let suffix = match self {
            ReportKind::Weekly => "Mingguan_Per_RT",
            ReportKind::Donor => "Proposal_Amplop",
            ReportKind::Expense => "Pengeluaran",
            ReportKind::Income => "Pemasukan_Gabungan",
            ReportKind::Financial => "Rekapitulasi",
            ReportKind::Accountability => "Pertanggung_Jawaban",
        };
        let short_name: String = short_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("Laporan_{short_name}_{suffix}")
    }

    /// `{stem}_{YYYY-MM-DD}.{extension}`
    pub fn file_name(&self, options: &RenderOptions<'_>, extension: &str) -> String {
        format!(
            "{}_{}.{extension}",
            self.stem(&options.letterhead.short_name),
            options.generated_at.format("%Y-%m-%d")
        )
    }
}

/// Settings that are not part of the ledger.
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    /// The generation time, printed in footers and used in file names.
    pub generated_at: DateTime<FixedOffset>,
    /// When the published records were last updated, in the display offset.
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub letterhead: &'a Letterhead,
}

/// Renders the spreadsheet version of a report.
pub fn render_xlsx(
    ledger: &Ledger,
    kind: ReportKind,
    options: &RenderOptions<'_>,
) -> Result<Vec<u8>> {
    xlsx::render(&ReportData::new(ledger), kind, options)
}

/// Renders the printable version of a report.
pub fn render_pdf(
    ledger: &Ledger,
    kind: ReportKind,
    options: &RenderOptions<'_>,
) -> Result<Vec<u8>> {
    pdf::render(&ReportData::new(ledger), kind, options)
}

/// A labelled line of the reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReconciliationLine {
    pub(crate) label: String,
    pub(crate) amount: Amount,
    /// Grand totals are emphasized.
    pub(crate) total: bool,
}

/// The opening balance, the income streams, their total, the expenses and the balance, labelled
/// for print.
pub(crate) fn reconciliation(
    data: &ReportData<'_>,
    weekly_label: &str,
    balance_label: String,
) -> Vec<ReconciliationLine> {
    let line = |label: &str, amount: Amount, total: bool| ReconciliationLine {
        label: label.to_string(),
        amount,
        total,
    };
    let t = &data.totals;
    vec![
        line("Total Saldo Awal (Panitia Sebelumnya)", t.initial, false),
        line(weekly_label, t.weekly_net, false),
        line("Total Pemasukan Proposal / Amplop", t.donors, false),
        line("TOTAL SEMUA PEMASUKAN", t.income, true),
        line("TOTAL PENGELUARAN", t.expenses, true),
        ReconciliationLine {
            label: balance_label,
            amount: t.balance,
            total: true,
        },
    ]
}
