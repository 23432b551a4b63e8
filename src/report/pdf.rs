//! Renders reports as F4 PDF documents with the committee letterhead on every page.

use crate::config::Signatory;
use crate::model::Amount;
use crate::report::data::ReportData;
use crate::report::layout::{
    Align, Cell, Column, Document, Font, Item, Page, Rgb, Table, TableRow, TextStyle, BLACK,
    GREY, PAGE_HEIGHT, PAGE_WIDTH, PT_TO_MM, TABLE_LEFT,
};
use crate::report::{format, reconciliation, words, RenderOptions, ReportKind, Section};
use crate::Result;
use anyhow::anyhow;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon,
};
use std::collections::HashMap;

const ROW_FONT_SIZE: f32 = 8.0;
const CENTER_X: f32 = PAGE_WIDTH / 2.0;
const FOOTER_Y: f32 = PAGE_HEIGHT - 10.0;
/// The reconciliation of the financial report moves to a new page below this line.
const RECONCILIATION_LIMIT: f32 = 250.0;
/// Room needed below the signature line for both rows of signatures.
const SIGNATURE_HEIGHT: f32 = 65.0;
const SIGNATURE_TOP: f32 = 50.0;
const SIGNATURE_COLUMNS: [f32; 3] = [45.0, 105.0, 165.0];
const BLANK_NAME: &str = "(..............................)";

const RED: Rgb = Rgb(255, 0, 0);

/// Header and footer fills of each section's table.
struct Palette {
    head: Rgb,
    foot: Rgb,
}

const OPENING: Palette = Palette {
    head: Rgb(88, 28, 135),
    foot: Rgb(233, 213, 255),
};
const WEEKLY: Palette = Palette {
    head: Rgb(13, 148, 136),
    foot: Rgb(204, 251, 241),
};
const DONORS: Palette = Palette {
    head: Rgb(30, 64, 175),
    foot: Rgb(219, 234, 254),
};
const EXPENSES: Palette = Palette {
    head: Rgb(185, 28, 28),
    foot: Rgb(254, 226, 226),
};
const RECONCILIATION: Palette = Palette {
    head: Rgb(204, 85, 0),
    foot: Rgb(255, 200, 100),
};

const SECTION_TITLE: TextStyle = TextStyle::new(9.0, Font::HelveticaBold);
const NUMBERED_TITLE: TextStyle = TextStyle::new(8.0, Font::HelveticaBold);
const NOTE: TextStyle = TextStyle::new(8.0, Font::HelveticaOblique);
const SIGNATURE: TextStyle = TextStyle::new(10.0, Font::Helvetica);
const SIGNATURE_NAME: TextStyle = TextStyle::new(10.0, Font::HelveticaBold);
const FOOTER: TextStyle = TextStyle::new(7.0, Font::HelveticaOblique).color(GREY);

const ROMAN: [&str; 5] = ["I", "II", "III", "IV", "V"];

pub(super) fn render(
    data: &ReportData<'_>,
    kind: ReportKind,
    options: &RenderOptions<'_>,
) -> Result<Vec<u8>> {
    let pages = layout(data, kind, options);
    write(&kind.stem(&options.letterhead.short_name), &pages)
}

/// Lays out every page of the report, letterhead and footer included.
fn layout(data: &ReportData<'_>, kind: ReportKind, options: &RenderOptions<'_>) -> Vec<Page> {
    let mut doc = Document::new();
    if kind == ReportKind::Accountability {
        accountability(&mut doc, data, options);
    } else {
        sections(&mut doc, data, kind, options);
    }
    let mut pages = doc.into_pages();
    let count = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        letterhead(page, options);
        footer(page, kind, options, i + 1, count);
    }
    pages
}

fn sections(
    doc: &mut Document,
    data: &ReportData<'_>,
    kind: ReportKind,
    options: &RenderOptions<'_>,
) {
    for (i, section) in kind.sections().iter().enumerate() {
        let gap = if i == 0 { None } else { Some(8.0) };
        let title = match section {
            Section::Opening => "LAPORAN SALDO AWAL (PANITIA SEBELUMNYA)",
            Section::WeeklyDetail => "LAPORAN PEMASUKAN MINGGUAN (PER RT)",
            Section::WeeklySummary => "LAPORAN PEMASUKAN MINGGUAN",
            Section::Donors => "LAPORAN PEMASUKAN PROPOSAL / AMPLOP",
            Section::Expenses => "LAPORAN DANA PENGELUARAN",
            Section::Reconciliation => {
                reconciliation_section(doc, data, options);
                continue;
            }
        };
        doc.title(SECTION_TITLE, CENTER_X, Align::Center, title, gap, 5.0);
        match section {
            Section::Opening => opening(doc, data),
            Section::WeeklyDetail => doc.table(&weekly_detail(data)),
            Section::WeeklySummary => doc.table(&weekly_summary(data)),
            Section::Donors => doc.table(&donors(data)),
            Section::Expenses => doc.table(&expenses(data)),
            Section::Reconciliation => {}
        }
    }
}

fn reconciliation_section(
    doc: &mut Document,
    data: &ReportData<'_>,
    options: &RenderOptions<'_>,
) {
    doc.set_y(doc.y() + 10.0);
    if doc.y() > RECONCILIATION_LIMIT {
        doc.new_page();
    }
    let title = format!("LAPORAN REKAPITULASI DANA {}", options.letterhead.short_name);
    doc.title(SECTION_TITLE, CENTER_X, Align::Center, &title, None, 4.0);
    let balance_label = format!(
        "(Update: {}) SISA SALDO SAAT INI",
        format::optional_date_time(options.last_updated.as_ref())
    );
    reconciliation_table(
        doc,
        data,
        "Total Pemasukan Bersih Mingguan (Per RT)",
        balance_label,
    );
}

fn accountability(doc: &mut Document, data: &ReportData<'_>, options: &RenderOptions<'_>) {
    let letterhead = options.letterhead;
    let top = doc.y();
    let x = 108.0;
    for (i, line) in letterhead.accountability_title.iter().enumerate() {
        let style = if i == 0 {
            TextStyle::new(12.0, Font::HelveticaBold)
        } else {
            TextStyle::new(10.0, Font::HelveticaBold)
        };
        doc.text(style, x, top + 2.0 + 5.0 * i as f32, Align::Center, line);
    }
    let venue_y = top + 2.0 + 5.0 * letterhead.accountability_title.len().max(3) as f32;
    doc.text(
        TextStyle::new(9.0, Font::Helvetica),
        x,
        venue_y,
        Align::Center,
        &letterhead.venue,
    );
    doc.set_y(venue_y + 8.0);

    for (i, section) in ReportKind::Accountability.sections().iter().enumerate() {
        let title = match section {
            Section::Opening => "LAPORAN SALDO AWAL (PANITIA SEBELUMNYA)".to_string(),
            Section::WeeklySummary => "LAPORAN PEMASUKAN MINGGUAN".to_string(),
            Section::Donors => "LAPORAN PEMASUKAN PROPOSAL / AMPLOP".to_string(),
            Section::Expenses => "LAPORAN DANA PENGELUARAN".to_string(),
            Section::Reconciliation => {
                format!("LAPORAN REKAPITULASI DANA {}", letterhead.short_name)
            }
            Section::WeeklyDetail => continue,
        };
        let numeral = ROMAN.get(i).copied().unwrap_or_default();
        let gap = if i == 0 { None } else { Some(6.0) };
        doc.title(
            NUMBERED_TITLE,
            TABLE_LEFT,
            Align::Left,
            &format!("{numeral}. {title}"),
            gap,
            2.0,
        );
        match section {
            Section::Opening => opening(doc, data),
            Section::WeeklySummary => doc.table(&weekly_summary(data)),
            Section::Donors => doc.table(&donors(data)),
            Section::Expenses => doc.table(&expenses(data)),
            Section::Reconciliation => reconciliation_table(
                doc,
                data,
                "Total Pemasukan Bersih Mingguan (Ringkasan)",
                "SISA SALDO SAAT INI".to_string(),
            ),
            Section::WeeklyDetail => {}
        }
    }

    signatures(doc, options);
}

fn signatures(doc: &mut Document, options: &RenderOptions<'_>) {
    let letterhead = options.letterhead;
    let mut y = doc.y() + 25.0;
    if y + SIGNATURE_HEIGHT > FOOTER_Y {
        doc.new_page();
        y = SIGNATURE_TOP;
    }
    let place = format!(
        "{}, {}",
        letterhead.city,
        format::date(options.generated_at.date_naive())
    );
    doc.text(SIGNATURE, SIGNATURE_COLUMNS[2], y - 8.0, Align::Center, &place);

    signature_row(doc, y, &letterhead.signatories);
    let y = y + 32.0;
    doc.text(SIGNATURE, SIGNATURE_COLUMNS[1], y, Align::Center, "Mengetahui,");
    let y = y + 8.0;
    signature_row(doc, y, &letterhead.acknowledged_by);
    doc.set_y(y + 22.0);
}

/// Titles on `y` and names 22mm below, one signatory per column.
fn signature_row(doc: &mut Document, y: f32, signatories: &[Signatory]) {
    for (signatory, x) in signatories.iter().zip(SIGNATURE_COLUMNS) {
        doc.text(SIGNATURE, x, y, Align::Center, &signatory.title);
        let name = if signatory.name.trim().is_empty() {
            BLANK_NAME
        } else {
            signatory.name.as_str()
        };
        doc.text(SIGNATURE_NAME, x, y + 22.0, Align::Center, name);
    }
}

fn money(amount: Amount) -> Cell {
    Cell::new(amount.to_string())
}

fn opening(doc: &mut Document, data: &ReportData<'_>) {
    if data.initial.is_empty() {
        let y = doc.y() + 4.0;
        doc.text(NOTE, CENTER_X, y, Align::Center, "(Tidak ada data dana awal)");
        doc.set_y(y + 2.0);
        return;
    }
    let mut table = Table::new(
        vec![
            Column::fixed("No", 15.0, Align::Center),
            Column::auto("TANGGAL", Align::Center),
            Column::fixed("NOMINAL", 35.0, Align::Right),
        ],
        OPENING.head,
        ROW_FONT_SIZE,
    );
    for (i, e) in data.initial.iter().enumerate() {
        table.push(TableRow::new(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(format::date(e.date)),
            money(e.amount),
        ]));
    }
    table.push(
        TableRow::new(vec![
            Cell::new("TOTAL SALDO AWAL").span(2).align(Align::Right),
            money(data.totals.initial),
        ])
        .emphasized(OPENING.foot),
    );
    doc.table(&table);
}

fn weekly_detail(data: &ReportData<'_>) -> Table {
    let mut table = Table::new(
        vec![
            Column::fixed("MINGGU", 20.0, Align::Center),
            Column::fixed("TANGGAL", 25.0, Align::Center),
            Column::fixed("RT", 12.0, Align::Center),
            Column::auto("PEMASUKAN", Align::Right),
            Column::auto("KONSUMSI 5%", Align::Right),
            Column::auto("KOMISI 10%", Align::Right),
            Column::fixed("PENDAPATAN BERSIH", 35.0, Align::Right),
        ],
        WEEKLY.head,
        ROW_FONT_SIZE,
    );
    for group in &data.weeks {
        for e in &group.entries {
            table.push(TableRow::new(vec![
                Cell::new(e.week.as_str()),
                Cell::new(format::date(e.date)),
                Cell::new(e.zone.as_str()),
                money(e.gross),
                money(e.consumption_cut).color(RED),
                money(e.commission_cut).color(RED),
                money(e.net),
            ]));
        }
        let s = &group.subtotal;
        table.push(
            TableRow::new(vec![
                Cell::new(format!("Total {}", group.week))
                    .span(3)
                    .align(Align::Center),
                money(s.gross),
                money(s.consumption).color(RED),
                money(s.commission).color(RED),
                money(s.net),
            ])
            .emphasized(WEEKLY.foot),
        );
    }
    let t = &data.weekly_total;
    table.push(
        TableRow::new(vec![
            Cell::new("TOTAL PENDAPATAN BERSIH").span(3).align(Align::Center),
            money(t.gross),
            money(t.consumption).color(RED),
            money(t.commission).color(RED),
            money(t.net),
        ])
        .emphasized(WEEKLY.foot),
    );
    table
}

fn weekly_summary(data: &ReportData<'_>) -> Table {
    let mut table = Table::new(
        vec![
            Column::fixed("NO", 12.0, Align::Center),
            Column::fixed("TANGGAL", 28.0, Align::Center),
            Column::auto("MINGGU KE", Align::Center),
            Column::fixed("NOMINAL", 35.0, Align::Right),
        ],
        WEEKLY.head,
        ROW_FONT_SIZE,
    );
    for (i, w) in data.week_summaries.iter().enumerate() {
        table.push(TableRow::new(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(format::date(w.date)),
            Cell::new(w.week.as_str()),
            money(w.net),
        ]));
    }
    table.push(
        TableRow::new(vec![
            Cell::new("TOTAL PEMASUKAN MINGGUAN").span(3).align(Align::Right),
            money(data.weekly_total.net),
        ])
        .emphasized(WEEKLY.foot),
    );
    table
}

fn donors(data: &ReportData<'_>) -> Table {
    let mut table = Table::new(
        vec![
            Column::fixed("NO", 12.0, Align::Center),
            Column::fixed("TANGGAL", 28.0, Align::Center),
            Column::auto("SUMBER DANA / DONATUR", Align::Left),
            Column::fixed("NOMINAL", 35.0, Align::Right),
        ],
        DONORS.head,
        ROW_FONT_SIZE,
    );
    for (i, e) in data.donors.iter().enumerate() {
        table.push(TableRow::new(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(format::date(e.date)),
            Cell::new(e.donor.as_str()),
            money(e.amount),
        ]));
    }
    table.push(
        TableRow::new(vec![
            Cell::new("TOTAL PEMASUKAN PROPOSAL/AMPLOP")
                .span(3)
                .align(Align::Right),
            money(data.totals.donors),
        ])
        .emphasized(DONORS.foot),
    );
    table
}

fn expenses(data: &ReportData<'_>) -> Table {
    let mut table = Table::new(
        vec![
            Column::fixed("NO", 12.0, Align::Center),
            Column::fixed("TANGGAL", 28.0, Align::Center),
            Column::auto("KEPERLUAN", Align::Left),
            Column::fixed("NOMINAL", 35.0, Align::Right),
        ],
        EXPENSES.head,
        ROW_FONT_SIZE,
    );
    for (i, e) in data.expenses.iter().enumerate() {
        table.push(TableRow::new(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(format::date(e.date)),
            Cell::new(e.purpose.as_str()),
            money(e.amount),
        ]));
    }
    table.push(
        TableRow::new(vec![
            Cell::new("TOTAL DANA PENGELUARAN").span(3).align(Align::Right),
            money(data.totals.expenses),
        ])
        .emphasized(EXPENSES.foot),
    );
    table
}

/// The reconciliation table followed by the balance spelled out in words.
fn reconciliation_table(
    doc: &mut Document,
    data: &ReportData<'_>,
    weekly_label: &str,
    balance_label: String,
) {
    let mut table = Table::new(
        vec![
            Column::auto("KETERANGAN", Align::Left),
            Column::fixed("NOMINAL", 35.0, Align::Right),
        ],
        RECONCILIATION.head,
        ROW_FONT_SIZE,
    );
    table.keep_together = true;
    let lines = reconciliation(data, weekly_label, balance_label);
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.into_iter().enumerate() {
        let amount = money(line.amount);
        let row = if i == last {
            let label = Cell::new(line.label).align(Align::Right);
            TableRow::new(vec![label, amount]).emphasized(RECONCILIATION.foot)
        } else if line.total {
            TableRow::new(vec![Cell::new(line.label), amount]).bold()
        } else {
            TableRow::new(vec![Cell::new(line.label), amount])
        };
        table.push(row);
    }
    doc.table(&table);

    let y = doc.y() + 6.0;
    let words = format!(
        "Terbilang : {} Rupiah",
        words::spell(data.totals.balance.whole())
    );
    doc.text(
        TextStyle::new(9.0, Font::HelveticaOblique),
        196.0,
        y,
        Align::Right,
        &words,
    );
    doc.set_y(y);
}

fn letterhead(page: &mut Page, options: &RenderOptions<'_>) {
    let letterhead = options.letterhead;
    let heading = TextStyle::new(14.0, Font::TimesBold);
    for (i, line) in letterhead.lines.iter().enumerate() {
        page.text(heading, 112.0, 15.0 + 6.0 * i as f32, Align::Center, line);
    }
    let address_y = 15.0 + 6.0 * letterhead.lines.len().max(3) as f32;
    page.text(
        TextStyle::new(10.0, Font::TimesRoman),
        112.0,
        address_y,
        Align::Center,
        &letterhead.address,
    );
    page.line((10.0, address_y + 4.0), (200.0, address_y + 4.0), 0.5);
    page.line((10.0, address_y + 5.0), (200.0, address_y + 5.0), 0.3);
}

fn footer(
    page: &mut Page,
    kind: ReportKind,
    options: &RenderOptions<'_>,
    number: usize,
    count: usize,
) {
    let date = format::date(options.generated_at.date_naive());
    let time = format::time(&options.generated_at);
    let left = if kind == ReportKind::Accountability {
        format!(
            "Laporan Pertanggung Jawaban Panitia {} | dibuat pada {date} pukul {time}",
            options.letterhead.short_name
        )
    } else {
        format!("didownload pada: {date}, Pukul : {time}")
    };
    page.text(FOOTER, TABLE_LEFT, FOOTER_Y, Align::Left, &left);
    page.text(
        FOOTER,
        195.0,
        FOOTER_Y,
        Align::Right,
        &format!("Hal {number} dari {count}"),
    );
}

/// The standard PDF fonts used by the layout.
struct Fonts(HashMap<Font, IndirectFontRef>);

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let mut fonts = HashMap::new();
        for (font, builtin) in [
            (Font::TimesBold, BuiltinFont::TimesBold),
            (Font::TimesRoman, BuiltinFont::TimesRoman),
            (Font::Helvetica, BuiltinFont::Helvetica),
            (Font::HelveticaBold, BuiltinFont::HelveticaBold),
            (Font::HelveticaOblique, BuiltinFont::HelveticaOblique),
        ] {
            let reference = doc
                .add_builtin_font(builtin)
                .map_err(|e| anyhow!("Unable to add the {font:?} font: {e}"))?;
            fonts.insert(font, reference);
        }
        Ok(Self(fonts))
    }

    fn get(&self, font: Font) -> Result<&IndirectFontRef> {
        self.0
            .get(&font)
            .ok_or_else(|| anyhow!("The {font:?} font was not loaded"))
    }
}

fn color(rgb: Rgb) -> Color {
    let Rgb(r, g, b) = rgb;
    Color::Rgb(printpdf::Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Layout coordinates run down from the top of the page, PDF coordinates run up from the bottom.
fn point(x: f32, y: f32) -> (Point, bool) {
    (Point::new(Mm(x), Mm(PAGE_HEIGHT - y)), false)
}

fn write(title: &str, pages: &[Page]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts::load(&doc)?;
    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw(&layer, &fonts, page)?;
    }
    doc.save_to_bytes()
        .map_err(|e| anyhow!("Unable to produce the PDF document: {e}"))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, page: &Page) -> Result<()> {
    for item in &page.items {
        match item {
            Item::Fill { x, y, w, h, color: c } => {
                layer.set_fill_color(color(*c));
                layer.add_polygon(Polygon {
                    rings: vec![vec![
                        point(*x, *y),
                        point(x + w, *y),
                        point(x + w, y + h),
                        point(*x, y + h),
                    ]],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            Item::Line { from, to, width } => {
                layer.set_outline_color(color(BLACK));
                layer.set_outline_thickness(width / PT_TO_MM);
                layer.add_line(Line {
                    points: vec![point(from.0, from.1), point(to.0, to.1)],
                    is_closed: false,
                });
            }
            Item::Text {
                x,
                y,
                size,
                font,
                color: c,
                text,
            } => {
                layer.set_fill_color(color(*c));
                layer.use_text(
                    text.as_str(),
                    *size,
                    Mm(*x),
                    Mm(PAGE_HEIGHT - y),
                    fonts.get(*font)?,
                );
            }
        }
    }
    // Leave the fill black for whatever comes next.
    layer.set_fill_color(color(BLACK));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Letterhead;
    use crate::model::{Donation, Expense, InitialBalance, Ledger, WeeklyCollection};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
    }

    fn ledger(expenses: usize) -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .initial
            .push(InitialBalance::new(date(1), Amount::rupiah(500_000), None));
        ledger.weekly.push(WeeklyCollection::new(
            date(6),
            "Minggu ke-1",
            "RT 01",
            Amount::rupiah(100_000),
            None,
        ));
        ledger.donors.push(Donation::new(
            date(7),
            "Hamba Allah",
            Amount::rupiah(250_000),
            None,
        ));
        for i in 0..expenses {
            ledger.expenses.push(Expense::new(
                date(8),
                format!("Belanja {i}"),
                Amount::rupiah(1_000),
                None,
            ));
        }
        ledger
    }

    fn texts(pages: &[Page]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.texts())
            .map(str::to_string)
            .collect()
    }

    fn options(letterhead: &Letterhead) -> RenderOptions<'_> {
        RenderOptions {
            generated_at: "2026-10-17T09:30:15+07:00".parse().unwrap(),
            last_updated: None,
            letterhead,
        }
    }

    #[test]
    fn test_financial_sections_and_words() {
        let letterhead = Letterhead::default();
        let ledger = ledger(1);
        let data = ReportData::new(&ledger);
        let pages = layout(&data, ReportKind::Financial, &options(&letterhead));
        let texts = texts(&pages);
        for expected in [
            "LAPORAN SALDO AWAL (PANITIA SEBELUMNYA)",
            "LAPORAN PEMASUKAN MINGGUAN (PER RT)",
            "LAPORAN PEMASUKAN PROPOSAL / AMPLOP",
            "LAPORAN DANA PENGELUARAN",
            "LAPORAN REKAPITULASI DANA PHBI",
            "TOTAL PENDAPATAN BERSIH",
            // 500.000 + 85.000 + 250.000 - 1.000
            "Terbilang : Delapan Ratus Tiga Puluh Empat Ribu Rupiah",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing '{expected}'");
        }
        assert!(texts.iter().any(|t| t.contains("SISA SALDO SAAT INI")));
    }

    #[test]
    fn test_every_page_has_letterhead_and_page_number() {
        let letterhead = Letterhead::default();
        let ledger = ledger(150);
        let data = ReportData::new(&ledger);
        let pages = layout(&data, ReportKind::Expense, &options(&letterhead));
        let count = pages.len();
        assert!(count > 1);
        for (i, page) in pages.iter().enumerate() {
            let texts = page.texts();
            assert!(texts.contains(&"PANITIA HARI BESAR ISLAM"));
            assert!(texts.contains(&"didownload pada: 17 Oktober 2026, Pukul : 09:30:15"));
            let number = format!("Hal {} dari {count}", i + 1);
            assert!(texts.contains(&number.as_str()));
        }
    }

    #[test]
    fn test_empty_opening_balance_note() {
        let letterhead = Letterhead::default();
        let ledger = Ledger::new();
        let data = ReportData::new(&ledger);
        let pages = layout(&data, ReportKind::Income, &options(&letterhead));
        assert!(texts(&pages).contains(&"(Tidak ada data dana awal)".to_string()));
    }

    #[test]
    fn test_accountability_layout() {
        let letterhead = Letterhead::default();
        let ledger = ledger(2);
        let data = ReportData::new(&ledger);
        let pages = layout(&data, ReportKind::Accountability, &options(&letterhead));
        let texts = texts(&pages);
        for expected in [
            "LAPORAN PERTANGGUNG JAWABAN",
            "I. LAPORAN SALDO AWAL (PANITIA SEBELUMNYA)",
            "II. LAPORAN PEMASUKAN MINGGUAN",
            "V. LAPORAN REKAPITULASI DANA PHBI",
            "TOTAL PEMASUKAN MINGGUAN",
            "Total Pemasukan Bersih Mingguan (Ringkasan)",
            "Mengetahui,",
            "Bendahara,",
            "Tangerang, 17 Oktober 2026",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing '{expected}'");
        }
        assert!(texts
            .iter()
            .any(|t| t.starts_with("Laporan Pertanggung Jawaban Panitia PHBI | dibuat pada")));
    }

    #[test]
    fn test_render_produces_pdf() {
        let letterhead = Letterhead::default();
        let ledger = ledger(3);
        for kind in [ReportKind::Weekly, ReportKind::Accountability] {
            let bytes = render(&ReportData::new(&ledger), kind, &options(&letterhead)).unwrap();
            assert_eq!(&bytes[..4], b"%PDF", "{kind}");
        }
    }
}
