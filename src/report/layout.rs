//! Lays out printable reports on F4 pages.
//!
//! Layout is separate from PDF output: a `Document` produces pages of positioned `Item`s, measured
//! in millimetres from the top-left corner, and `pdf` turns them into drawing operations. Text
//! widths are estimated from average glyph widths of the standard fonts, which is close enough
//! for alignment and wrapping.

/// F4 portrait.
pub(super) const PAGE_WIDTH: f32 = 210.0;
pub(super) const PAGE_HEIGHT: f32 = 330.0;

/// Where content starts below the letterhead.
pub(super) const CONTENT_TOP: f32 = 46.0;
const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - 20.0;
/// A section title that would start below this line starts on a new page instead.
const SECTION_LIMIT: f32 = 280.0;

pub(super) const TABLE_LEFT: f32 = 15.0;
pub(super) const TABLE_WIDTH: f32 = 180.0;
const CELL_PADDING: f32 = 1.5;
const LINE_SPACING: f32 = 1.15;
const GRID_WIDTH: f32 = 0.1;

pub(super) const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Font {
    TimesBold,
    TimesRoman,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl Font {
    fn is_bold(&self) -> bool {
        matches!(self, Font::TimesBold | Font::HelveticaBold)
    }

    fn is_times(&self) -> bool {
        matches!(self, Font::TimesBold | Font::TimesRoman)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Rgb(pub u8, pub u8, pub u8);

pub(super) const BLACK: Rgb = Rgb(0, 0, 0);
pub(super) const WHITE: Rgb = Rgb(255, 255, 255);
pub(super) const GREY: Rgb = Rgb(100, 100, 100);

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Item {
    /// `x` is the left edge of the text and `y` its baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Rgb,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
    },
    /// A filled rectangle whose top-left corner is at `x`, `y`.
    Fill {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Page {
    pub(super) items: Vec<Item>,
}

impl Page {
    /// Places text so that `x` is its left edge, center or right edge according to `align`.
    pub(super) fn text(&mut self, style: TextStyle, x: f32, y: f32, align: Align, text: &str) {
        let w = text_width(text, style.size, style.font);
        let left = match align {
            Align::Left => x,
            Align::Center => x - w / 2.0,
            Align::Right => x - w,
        };
        self.items.push(Item::Text {
            x: left,
            y,
            size: style.size,
            font: style.font,
            color: style.color,
            text: text.to_string(),
        });
    }

    pub(super) fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32) {
        self.items.push(Item::Line { from, to, width });
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.items.push(Item::Fill { x, y, w, h, color });
    }

    /// The text of every text item, in drawing order.
    #[cfg(test)]
    pub(super) fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct TextStyle {
    pub(super) size: f32,
    pub(super) font: Font,
    pub(super) color: Rgb,
}

impl TextStyle {
    pub(super) const fn new(size: f32, font: Font) -> Self {
        Self {
            size,
            font,
            color: BLACK,
        }
    }

    pub(super) const fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Estimates the width of `text` in millimetres.
pub(super) fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let em: f32 = text.chars().map(glyph_width).sum();
    let mut factor = 1.0;
    if font.is_bold() {
        factor *= 1.06;
    }
    if font.is_times() {
        factor *= 0.92;
    }
    em * factor * size * PT_TO_MM
}

/// Approximate advance widths, in ems, of Helvetica glyphs.
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 0.22,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'I' | '/' | 'f' | 't' => 0.28,
        'r' | '(' | ')' | '-' => 0.33,
        'm' | 'w' => 0.83,
        'M' | 'W' => 0.88,
        '0'..='9' => 0.556,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_lowercase() => 0.53,
        _ => 0.6,
    }
}

/// Breaks `text` into lines no wider than `width`. A single word wider than `width` gets its own
/// line.
fn wrap(text: &str, width: f32, size: f32, font: Font) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(&candidate, size, font) > width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// A table column. Columns without a width share the space the fixed columns leave.
#[derive(Debug, Clone)]
pub(super) struct Column {
    pub(super) title: &'static str,
    pub(super) width: Option<f32>,
    pub(super) align: Align,
}

impl Column {
    pub(super) fn fixed(title: &'static str, width: f32, align: Align) -> Self {
        Self {
            title,
            width: Some(width),
            align,
        }
    }

    pub(super) fn auto(title: &'static str, align: Align) -> Self {
        Self {
            title,
            width: None,
            align,
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Cell {
    pub(super) text: String,
    /// How many columns the cell covers.
    pub(super) span: usize,
    /// Overrides the alignment of the column the cell starts in.
    pub(super) align: Option<Align>,
    /// Overrides the text color of the row.
    pub(super) color: Option<Rgb>,
}

impl Cell {
    pub(super) fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: 1,
            align: None,
            color: None,
        }
    }

    pub(super) fn span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub(super) fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub(super) fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone)]
pub(super) struct TableRow {
    pub(super) cells: Vec<Cell>,
    pub(super) bold: bool,
    pub(super) fill: Option<Rgb>,
    pub(super) color: Rgb,
}

impl TableRow {
    pub(super) fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            bold: false,
            fill: None,
            color: BLACK,
        }
    }

    pub(super) fn of<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(Cell::new).collect())
    }

    /// A bold row on a colored background, as used for totals.
    pub(super) fn emphasized(mut self, fill: Rgb) -> Self {
        self.bold = true;
        self.fill = Some(fill);
        self
    }

    pub(super) fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(super) fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone)]
pub(super) struct Table {
    pub(super) columns: Vec<Column>,
    pub(super) head_fill: Rgb,
    pub(super) rows: Vec<TableRow>,
    pub(super) font_size: f32,
    /// Move the whole table to the next page rather than splitting it.
    pub(super) keep_together: bool,
}

impl Table {
    pub(super) fn new(columns: Vec<Column>, head_fill: Rgb, font_size: f32) -> Self {
        Self {
            columns,
            head_fill,
            rows: Vec::new(),
            font_size,
            keep_together: false,
        }
    }

    pub(super) fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<f32> {
        let fixed: f32 = self.columns.iter().filter_map(|c| c.width).sum();
        let autos = self.columns.iter().filter(|c| c.width.is_none()).count();
        let share = if autos == 0 {
            0.0
        } else {
            ((TABLE_WIDTH - fixed) / autos as f32).max(10.0)
        };
        self.columns
            .iter()
            .map(|c| c.width.unwrap_or(share))
            .collect()
    }
}

/// A cell after its width and lines are known.
struct Placed {
    x: f32,
    w: f32,
    lines: Vec<String>,
    align: Align,
    color: Rgb,
}

struct PlacedRow {
    cells: Vec<Placed>,
    height: f32,
    style: TextStyle,
    fill: Option<Rgb>,
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LINE_SPACING
}

fn place_row(table: &Table, widths: &[f32], row: &TableRow, head: bool) -> PlacedRow {
    let font = if row.bold {
        Font::HelveticaBold
    } else {
        Font::Helvetica
    };
    let style = TextStyle::new(table.font_size, font).color(row.color);
    let mut cells = Vec::with_capacity(row.cells.len());
    let mut col = 0;
    let mut x = TABLE_LEFT;
    for cell in &row.cells {
        if col >= widths.len() {
            break;
        }
        let end = (col + cell.span).min(widths.len());
        let w: f32 = widths[col..end].iter().sum();
        let align = if head {
            Align::Center
        } else {
            cell.align.unwrap_or(table.columns[col].align)
        };
        let lines = wrap(&cell.text, w - 2.0 * CELL_PADDING, table.font_size, font);
        cells.push(Placed {
            x,
            w,
            lines,
            align,
            color: cell.color.unwrap_or(row.color),
        });
        x += w;
        col = end;
    }
    let max_lines = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1);
    PlacedRow {
        cells,
        height: max_lines as f32 * line_height(table.font_size) + 2.0 * CELL_PADDING,
        style,
        fill: row.fill,
    }
}

fn draw_row(page: &mut Page, row: &PlacedRow, top: f32) {
    if let Some(fill) = row.fill {
        let w: f32 = row.cells.iter().map(|c| c.w).sum();
        page.fill(TABLE_LEFT, top, w, row.height, fill);
    }
    let lh = line_height(row.style.size);
    // The baseline sits a little above the bottom of the line box.
    let ascent = row.style.size * PT_TO_MM * 0.85;
    for cell in &row.cells {
        let style = row.style.color(cell.color);
        for (i, line) in cell.lines.iter().enumerate() {
            let y = top + CELL_PADDING + i as f32 * lh + ascent;
            let x = match cell.align {
                Align::Left => cell.x + CELL_PADDING,
                Align::Center => cell.x + cell.w / 2.0,
                Align::Right => cell.x + cell.w - CELL_PADDING,
            };
            page.text(style, x, y, cell.align, line);
        }
        let bottom = top + row.height;
        page.line((cell.x, top), (cell.x + cell.w, top), GRID_WIDTH);
        page.line((cell.x, bottom), (cell.x + cell.w, bottom), GRID_WIDTH);
        page.line((cell.x, top), (cell.x, bottom), GRID_WIDTH);
        page.line((cell.x + cell.w, top), (cell.x + cell.w, bottom), GRID_WIDTH);
    }
}

/// A document being laid out, with a cursor on the last page.
#[derive(Debug, Clone)]
pub(super) struct Document {
    pages: Vec<Page>,
    y: f32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub(super) fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: CONTENT_TOP,
        }
    }

    /// The vertical position of the cursor.
    pub(super) fn y(&self) -> f32 {
        self.y
    }

    pub(super) fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub(super) fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub(super) fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = CONTENT_TOP;
    }

    /// Starts a new page if `needed` millimetres below the cursor would pass `limit`. Returns
    /// true if a page was added.
    pub(super) fn ensure_room(&mut self, needed: f32, limit: f32) -> bool {
        if self.y + needed > limit {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Writes text at the cursor's page.
    pub(super) fn text(&mut self, style: TextStyle, x: f32, y: f32, align: Align, text: &str) {
        self.page().text(style, x, y, align, text);
    }

    /// A section title. Unless it is the first thing on the page, it is separated from what came
    /// before by `gap`.
    pub(super) fn title(
        &mut self,
        style: TextStyle,
        x: f32,
        align: Align,
        text: &str,
        gap: Option<f32>,
        after: f32,
    ) {
        if let Some(gap) = gap {
            self.y += gap;
            if self.y > SECTION_LIMIT {
                self.new_page();
            }
        }
        let y = self.y;
        self.text(style, x, y, align, text);
        self.y += after;
    }

    /// Lays out `table` at the cursor, starting new pages as needed and repeating the header row
    /// on each of them. The cursor ends below the table.
    pub(super) fn table(&mut self, table: &Table) {
        let widths = table.widths();
        let head = TableRow::of(table.columns.iter().map(|c| c.title))
            .emphasized(table.head_fill)
            .color(WHITE);
        let head = place_row(table, &widths, &head, true);
        let rows: Vec<PlacedRow> = table
            .rows
            .iter()
            .map(|row| place_row(table, &widths, row, false))
            .collect();

        let first = rows.first().map(|r| r.height).unwrap_or(0.0);
        let needed = if table.keep_together {
            head.height + rows.iter().map(|r| r.height).sum::<f32>()
        } else {
            head.height + first
        };
        self.ensure_room(needed, CONTENT_BOTTOM);

        let y = self.y;
        draw_row(self.page(), &head, y);
        self.y += head.height;
        for row in &rows {
            if self.ensure_room(row.height, CONTENT_BOTTOM) {
                let y = self.y;
                draw_row(self.page(), &head, y);
                self.y += head.height;
            }
            let y = self.y;
            draw_row(self.page(), row, y);
            self.y += row.height;
        }
    }

    /// Returns the laid out pages.
    pub(super) fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> Table {
        let mut table = Table::new(
            vec![
                Column::fixed("NO", 12.0, Align::Center),
                Column::auto("KEPERLUAN", Align::Left),
                Column::fixed("NOMINAL", 35.0, Align::Right),
            ],
            Rgb(185, 28, 28),
            8.0,
        );
        for i in 0..rows {
            table.push(TableRow::of([
                (i + 1).to_string(),
                "Konsumsi".to_string(),
                "Rp 10.000".to_string(),
            ]));
        }
        table
    }

    #[test]
    fn test_widths_fill_the_table() {
        let widths = table(0).widths();
        assert_eq!(widths.len(), 3);
        assert!((widths.iter().sum::<f32>() - TABLE_WIDTH).abs() < 0.001);
        assert!((widths[1] - 133.0).abs() < 0.001);
    }

    #[test]
    fn test_wrap() {
        let lines = wrap("Sewa tenda dan sound system", 20.0, 8.0, Font::Helvetica);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "Sewa tenda dan sound system");
        assert_eq!(wrap("", 20.0, 8.0, Font::Helvetica), vec![String::new()]);
    }

    #[test]
    fn test_alignment() {
        let mut page = Page::default();
        let style = TextStyle::new(10.0, Font::Helvetica);
        page.text(style, 100.0, 50.0, Align::Right, "abc");
        let Item::Text { x, .. } = &page.items[0] else {
            panic!("expected text");
        };
        let w = text_width("abc", 10.0, Font::Helvetica);
        assert!((x + w - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_long_table_repeats_header() {
        let mut doc = Document::new();
        doc.table(&table(120));
        let pages = doc.into_pages();
        assert!(pages.len() > 1);
        for page in &pages {
            assert_eq!(page.texts()[..3], ["NO", "KEPERLUAN", "NOMINAL"]);
        }
        let rows: usize = pages
            .iter()
            .map(|p| p.texts().iter().filter(|t| **t == "Konsumsi").count())
            .sum();
        assert_eq!(rows, 120);
    }

    #[test]
    fn test_rows_stay_inside_content_area() {
        let mut doc = Document::new();
        doc.table(&table(200));
        for page in doc.into_pages() {
            for item in &page.items {
                if let Item::Text { y, .. } = item {
                    assert!(*y >= CONTENT_TOP && *y <= CONTENT_BOTTOM, "{y}");
                }
            }
        }
    }

    #[test]
    fn test_keep_together_moves_table() {
        let mut doc = Document::new();
        doc.set_y(290.0);
        let mut small = table(3);
        small.keep_together = true;
        doc.table(&small);
        let pages = doc.into_pages();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].items.is_empty());
    }
}
