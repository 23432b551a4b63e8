//! Renders reports as Excel workbooks with one worksheet per section.

use crate::model::Amount;
use crate::report::data::ReportData;
use crate::report::{format, reconciliation, RenderOptions, ReportKind, Section};
use crate::Result;
use anyhow::Context;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

const HEADER_FILL: u32 = 0xE5E7EB;
const CURRENCY: &str = "\"Rp\" #,##0";
/// Added to the longest value of a column to get its width in characters.
const WIDTH_PADDING: usize = 5;

#[derive(Debug, Clone)]
enum Cell {
    Empty,
    Text(String),
    /// A centered sequence number.
    Number(usize),
    Money(Amount),
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// The number of characters the cell occupies when displayed.
    fn width(&self) -> usize {
        match self {
            Cell::Empty => 0,
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => n.to_string().len(),
            Cell::Money(a) => a.to_string().chars().count(),
        }
    }
}

#[derive(Debug, Clone)]
struct Row {
    cells: Vec<Cell>,
    total: bool,
}

impl Row {
    fn data(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            total: false,
        }
    }

    fn total(cells: Vec<Cell>) -> Self {
        Self { cells, total: true }
    }
}

#[derive(Debug, Clone)]
struct Sheet {
    name: &'static str,
    headers: &'static [&'static str],
    rows: Vec<Row>,
}

pub(super) fn render(
    data: &ReportData<'_>,
    kind: ReportKind,
    options: &RenderOptions<'_>,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for section in kind.sections() {
        let sheet = match section {
            Section::Opening => opening(data),
            Section::WeeklyDetail => weekly_detail(data),
            Section::WeeklySummary => weekly_summary(data),
            Section::Donors => donors(data),
            Section::Expenses => expenses(data),
            Section::Reconciliation => reconciliation_sheet(data, options),
        };
        write_sheet(&mut workbook, &sheet)
            .with_context(|| format!("Unable to write the '{}' worksheet", sheet.name))?;
    }
    workbook
        .save_to_buffer()
        .context("Unable to produce the workbook")
}

fn opening(data: &ReportData<'_>) -> Sheet {
    let mut rows: Vec<Row> = data
        .initial
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Row::data(vec![
                Cell::Number(i + 1),
                Cell::text(format::date(e.date)),
                Cell::Money(e.amount),
            ])
        })
        .collect();
    rows.push(Row::total(vec![
        Cell::Empty,
        Cell::text("TOTAL SALDO AWAL"),
        Cell::Money(data.totals.initial),
    ]));
    Sheet {
        name: "Dana Awal",
        headers: &["No", "Tanggal", "Nominal"],
        rows,
    }
}

fn weekly_detail(data: &ReportData<'_>) -> Sheet {
    let mut rows = Vec::new();
    for group in &data.weeks {
        for e in &group.entries {
            rows.push(Row::data(vec![
                Cell::text(&e.week),
                Cell::text(format::date(e.date)),
                Cell::text(&e.zone),
                Cell::Money(e.gross),
                Cell::Money(e.consumption_cut),
                Cell::Money(e.commission_cut),
                Cell::Money(e.net),
            ]));
        }
        let s = &group.subtotal;
        rows.push(Row::total(vec![
            Cell::text(format!("Total {}", group.week)),
            Cell::Empty,
            Cell::Empty,
            Cell::Money(s.gross),
            Cell::Money(s.consumption),
            Cell::Money(s.commission),
            Cell::Money(s.net),
        ]));
    }
    let t = &data.weekly_total;
    rows.push(Row::total(vec![
        Cell::text("TOTAL PENDAPATAN BERSIH"),
        Cell::Empty,
        Cell::Empty,
        Cell::Money(t.gross),
        Cell::Money(t.consumption),
        Cell::Money(t.commission),
        Cell::Money(t.net),
    ]));
    Sheet {
        name: "Mingguan Detail",
        headers: &[
            "Minggu",
            "Tanggal",
            "RT",
            "Pemasukan Kotor",
            "Potongan Konsumsi (5%)",
            "Potongan Komisi (10%)",
            "Jumlah Bersih",
        ],
        rows,
    }
}

fn weekly_summary(data: &ReportData<'_>) -> Sheet {
    let mut rows: Vec<Row> = data
        .week_summaries
        .iter()
        .enumerate()
        .map(|(i, w)| {
            Row::data(vec![
                Cell::Number(i + 1),
                Cell::text(format::date(w.date)),
                Cell::Money(w.net),
                Cell::text(&w.week),
            ])
        })
        .collect();
    rows.push(Row::total(vec![
        Cell::Empty,
        Cell::text("TOTAL"),
        Cell::Money(data.weekly_total.net),
        Cell::Empty,
    ]));
    Sheet {
        name: "Mingguan Ringkasan",
        headers: &["No", "Tanggal", "Nominal Bersih", "Keterangan"],
        rows,
    }
}

fn donors(data: &ReportData<'_>) -> Sheet {
    let mut rows: Vec<Row> = data
        .donors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Row::data(vec![
                Cell::Number(i + 1),
                Cell::text(format::date(e.date)),
                Cell::text(&e.donor),
                Cell::Money(e.amount),
            ])
        })
        .collect();
    rows.push(Row::total(vec![
        Cell::Empty,
        Cell::Empty,
        Cell::text("TOTAL PEMASUKAN PROPOSAL/AMPLOP"),
        Cell::Money(data.totals.donors),
    ]));
    Sheet {
        name: "Donatur",
        headers: &["No", "Tanggal", "Sumber Dana / Donatur", "Nominal"],
        rows,
    }
}

fn expenses(data: &ReportData<'_>) -> Sheet {
    let mut rows: Vec<Row> = data
        .expenses
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Row::data(vec![
                Cell::Number(i + 1),
                Cell::text(format::date(e.date)),
                Cell::text(&e.purpose),
                Cell::Money(e.amount),
            ])
        })
        .collect();
    rows.push(Row::total(vec![
        Cell::Empty,
        Cell::Empty,
        Cell::text("TOTAL DANA PENGELUARAN"),
        Cell::Money(data.totals.expenses),
    ]));
    Sheet {
        name: "Pengeluaran",
        headers: &["No", "Tanggal", "Keperluan", "Nominal"],
        rows,
    }
}

fn reconciliation_sheet(data: &ReportData<'_>, options: &RenderOptions<'_>) -> Sheet {
    let balance_label = format!(
        "SISA SALDO SAAT INI (Update: {})",
        format::optional_date_time(options.last_updated.as_ref())
    );
    let rows = reconciliation(data, "Total Pemasukan Mingguan (Bersih)", balance_label)
        .into_iter()
        .map(|line| Row {
            cells: vec![Cell::Text(line.label), Cell::Money(line.amount)],
            total: line.total,
        })
        .collect();
    Sheet {
        name: "Rekapitulasi",
        headers: &["KATEGORI", "TOTAL NOMINAL"],
        rows,
    }
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name)?;

    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);
    let plain = Format::new().set_border(FormatBorder::Thin);
    let centered = plain.clone().set_align(FormatAlign::Center);
    let money = plain.clone().set_num_format(CURRENCY);

    for (col, title) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let bold = |f: &Format| if row.total { f.clone().set_bold() } else { f.clone() };
        for (col, cell) in row.cells.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {
                    worksheet.write_blank(r, c, &bold(&plain))?;
                }
                Cell::Text(s) => {
                    worksheet.write_string_with_format(r, c, s, &bold(&plain))?;
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(r, c, *n as f64, &bold(&centered))?;
                }
                Cell::Money(a) => {
                    worksheet.write_number_with_format(r, c, a.to_f64(), &bold(&money))?;
                }
            }
        }
    }

    for (col, width) in column_widths(sheet).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}

/// Each column is as wide as its longest value plus padding.
fn column_widths(sheet: &Sheet) -> Vec<usize> {
    sheet
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = sheet
                .rows
                .iter()
                .filter_map(|row| row.cells.get(col))
                .map(Cell::width)
                .max()
                .unwrap_or(0);
            longest.max(header.chars().count()) + WIDTH_PADDING
        })
        .collect()
}
