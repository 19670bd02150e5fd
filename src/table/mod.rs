// src/table/mod.rs
//
// DOM plumbing shared by the locator and the row extractor. Documents are
// whatever the html5 parser makes of real-world markup, so rows are resolved
// per table: nested tables excluded, `thead` rows excluded from the body, and
// a headerless table's first row usable as its header.

pub mod extract;
pub mod locate;

pub use extract::{extract_rows, PageResult, Record, Value};
pub use locate::{locate, Located};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::normalize::clean_text;

pub(crate) static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));
static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("tbody selector"));
static A_HREF: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));
static IMG_LABELED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[alt], img[title]").expect("img selector"));

/// Whether `row`'s nearest `table` ancestor is `table` (nested-table guard).
fn belongs_to(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .map(|el| el.id() == table.id())
        .unwrap_or(false)
}

fn in_thead(row: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() != "table")
        .any(|el| el.value().name() == "thead")
}

/// Data rows of this table: the `tr`s of its first `tbody` only (the html5
/// parser synthesizes one around stray rows). `tfoot` rows and any further
/// `tbody` sections are not data, and nested tables are excluded.
pub(crate) fn body_rows<'a>(table: ElementRef<'a>, skip_header_row: bool) -> Vec<ElementRef<'a>> {
    let Some(tbody) = table.select(&TBODY).find(|tb| belongs_to(*tb, table)) else {
        return Vec::new();
    };
    let mut rows: Vec<_> = tbody
        .select(&TR)
        .filter(|tr| belongs_to(*tr, table))
        .collect();
    // A headerless table's first row doubles as its header; it is not data.
    if skip_header_row && !rows.is_empty() {
        rows.remove(0);
    }
    rows
}

/// Header row of a table: first `thead` row, else the first row of the table.
/// The second element is true when the header had to be taken from the body.
pub(crate) fn header_row(table: ElementRef<'_>) -> Option<(ElementRef<'_>, bool)> {
    let mut first_any = None;
    for tr in table.select(&TR).filter(|tr| belongs_to(*tr, table)) {
        if in_thead(tr) {
            return Some((tr, false));
        }
        if first_any.is_none() {
            first_any = Some(tr);
        }
    }
    first_any.map(|tr| (tr, true))
}

/// Direct `td`/`th` children of a row.
pub(crate) fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

pub(crate) fn cell_text(cell: ElementRef<'_>) -> String {
    clean_text(&cell.text().collect::<String>())
}

/// First anchor of the cell whose href contains one of `fragments`, else the
/// first anchor at all.
pub(crate) fn cell_anchor<'a>(
    cell: ElementRef<'a>,
    fragments: &[&str],
) -> Option<(ElementRef<'a>, &'a str)> {
    let anchors: Vec<_> = cell
        .select(&A_HREF)
        .filter_map(|a| a.value().attr("href").map(|href| (a, href)))
        .collect();
    anchors
        .iter()
        .find(|(_, href)| fragments.iter().any(|f| href.contains(f)))
        .or_else(|| anchors.first())
        .copied()
}

/// Cell text for localized-label columns: flag image alt/title wins.
pub(crate) fn label_text(cell: ElementRef<'_>) -> String {
    if let Some(img) = cell.select(&IMG_LABELED).next() {
        let v = img.value();
        if let Some(alt) = v.attr("alt").or_else(|| v.attr("title")) {
            let alt = clean_text(alt);
            if !alt.is_empty() {
                return alt;
            }
        }
    }
    cell_text(cell)
}
