// src/table/extract.rs
//
// Turns a located table into one immutable record per body row. Numeric
// fields come out as f64 with NaN for anything unparseable; string fields
// default to empty, never missing. The row count is reported independently
// of how many rows made usable records, because pagination keys off it.

use scraper::ElementRef;
use serde::Serialize;
use url::Url;

use crate::normalize::{parse_int_loose, parse_int_strict};
use crate::schema::{ColumnSchema, FieldKind};

use super::{cell_text, label_text, row_cells, Located};

/// One extracted cell value, typed per the schema field.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Num(f64),
    Text(String),
}

/// One row's extracted values. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub name: String,
    /// Entity detail link, empty when the identity cell has no anchor.
    pub link: String,
    /// Parallel to the schema's field list.
    pub values: Vec<Value>,
}

impl Record {
    /// Numeric view of a field; NaN for text fields and absent data.
    pub fn num(&self, idx: usize) -> f64 {
        match self.values.get(idx) {
            Some(Value::Num(v)) => *v,
            _ => f64::NAN,
        }
    }

    /// Text view of a field; empty for numeric fields.
    pub fn text(&self, idx: usize) -> &str {
        match self.values.get(idx) {
            Some(Value::Text(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Export rendition: finite numbers plain, NaN as empty.
    pub fn display(&self, idx: usize) -> String {
        match self.values.get(idx) {
            Some(Value::Num(v)) if v.is_finite() => format!("{}", v),
            Some(Value::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

/// Records from one fetched page plus its raw body-row count.
#[derive(Debug)]
pub struct PageResult {
    pub records: Vec<Record>,
    /// Body rows seen, filtered or not; drives last-page detection.
    pub per_page: usize,
}

/// Extract every body row of a located table, in row order.
pub fn extract_rows(located: &Located<'_>, schema: &ColumnSchema, base: Option<&Url>) -> PageResult {
    let rows = super::body_rows(located.table, located.header_in_body);
    let per_page = rows.len();

    let mut records = Vec::with_capacity(per_page);
    for row in rows {
        let cells = row_cells(row);
        if cells.is_empty() {
            continue; // spacer/banner rows still count toward per_page
        }

        let (name, link) = identity_of(&cells, located.map.identity, schema, base);
        let values = schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| read_field(&cells, located.map.fields[i], &field.kind))
            .collect();
        records.push(Record { name, link, values });
    }

    PageResult { records, per_page }
}

fn identity_of(
    cells: &[ElementRef<'_>],
    identity: usize,
    schema: &ColumnSchema,
    base: Option<&Url>,
) -> (String, String) {
    let Some(cell) = cells.get(identity) else {
        return (String::new(), String::new());
    };
    match super::cell_anchor(*cell, schema.identity.link_fragments) {
        Some((a, href)) => {
            let name = cell_text(a);
            let name = if name.is_empty() { cell_text(*cell) } else { name };
            (name, resolve(href, base))
        }
        None => (cell_text(*cell), String::new()),
    }
}

fn resolve(href: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

fn read_field(cells: &[ElementRef<'_>], col: Option<usize>, kind: &FieldKind) -> Value {
    if let FieldKind::Inferred { min, max } = kind {
        // No header column: first numeric cell inside the magnitude window.
        let v = cells
            .iter()
            .map(|c| parse_int_strict(&cell_text(*c)))
            .find(|v| v.is_finite() && *v >= *min && *v <= *max)
            .unwrap_or(f64::NAN);
        return Value::Num(v);
    }

    let text = col
        .and_then(|c| cells.get(c))
        .map(|c| match kind {
            FieldKind::Label => label_text(*c),
            _ => cell_text(*c),
        })
        .unwrap_or_default();

    match kind {
        FieldKind::Amount => Value::Num(parse_int_strict(&text)),
        FieldKind::Count => Value::Num(parse_int_loose(&text)),
        FieldKind::Text | FieldKind::Label => Value::Text(text),
        FieldKind::Inferred { .. } => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::table::locate;
    use scraper::Html;

    const PAGE: &str = r#"<html><body><table>
        <thead><tr><th>Player</th><th>Nat</th><th>Pos</th><th>Year</th>
        <th>Tal</th><th>Mas</th><th>Price</th></tr></thead>
        <tbody>
          <tr><td><a href="/player/7">Iker&nbsp;Ruiz</a></td>
              <td><img alt="Spain" src="es.png"></td>
              <td>Gk</td><td>24</td><td>8</td><td>96</td><td>1,250</td></tr>
          <tr><td>Anon</td><td></td><td>Cb</td><td>n/a</td><td>5</td>
              <td>70</td><td>free</td></tr>
        </tbody></table></body></html>"#;

    #[test]
    fn extracts_typed_records_in_row_order() {
        let doc = Html::parse_document(PAGE);
        let schema = schema::players();
        let hit = locate::locate(&doc, &schema).expect("locate");
        let base = Url::parse("https://meneger.net/players").unwrap();
        let page = extract_rows(&hit, &schema, Some(&base));

        assert_eq!(page.per_page, 2);
        let first = &page.records[0];
        assert_eq!(first.name, "Iker Ruiz");
        assert_eq!(first.link, "https://meneger.net/player/7");
        assert_eq!(first.text(schema.field_index("nat").unwrap()), "Spain");
        assert_eq!(first.num(schema.field_index("mas").unwrap()), 96.0);
        assert_eq!(first.num(schema.field_index("price").unwrap()), 1250.0);

        let second = &page.records[1];
        assert_eq!(second.name, "Anon");
        assert_eq!(second.link, "");
        assert!(second.num(schema.field_index("age").unwrap()).is_nan());
        assert!(second.num(schema.field_index("price").unwrap()).is_nan());
    }

    #[test]
    fn per_page_counts_rows_not_records() {
        let html = r#"<html><body><table>
            <thead><tr><th>Player</th><th>Price</th></tr></thead>
            <tbody>
              <tr><td><a href="/player/1">A</a></td><td>100</td></tr>
              <tr></tr>
              <tr><td><a href="/player/2">B</a></td><td>200</td></tr>
            </tbody></table></body></html>"#;
        let doc = Html::parse_document(html);
        let schema = schema::players();
        let hit = locate::locate(&doc, &schema).expect("locate");
        let page = extract_rows(&hit, &schema, None);
        assert_eq!(page.per_page, 3);
        assert_eq!(page.records.len(), 2);
    }

    #[test]
    fn footer_and_extra_tbody_rows_are_not_data() {
        let html = r#"<html><body><table>
            <thead><tr><th>Player</th><th>Price</th></tr></thead>
            <tbody>
              <tr><td><a href="/player/1">A</a></td><td>100</td></tr>
              <tr><td><a href="/player/2">B</a></td><td>200</td></tr>
            </tbody>
            <tbody>
              <tr><td>archived</td><td>999</td></tr>
            </tbody>
            <tfoot><tr><td>totals</td><td>300</td></tr></tfoot>
            </table></body></html>"#;
        let doc = Html::parse_document(html);
        let schema = schema::players();
        let hit = locate::locate(&doc, &schema).expect("locate");
        let page = extract_rows(&hit, &schema, None);
        assert_eq!(page.per_page, 2);
        let names: Vec<_> = page.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn inferred_fields_pick_by_magnitude() {
        let rows: String = (0..12)
            .map(|i| {
                format!(
                    "<tr><td>{i}</td><td><a href=\"/team/{i}\">T{i}</a></td>\
                     <td>18</td><td>740</td><td>900,000</td></tr>"
                )
            })
            .collect();
        let html = format!(
            "<html><body><table><thead><tr><th>#</th><th>Team</th><th>Pl</th>\
             <th>Pw</th><th>Price</th></tr></thead><tbody>{rows}</tbody></table></body></html>"
        );
        let doc = Html::parse_document(&html);
        let schema = schema::teams();
        let hit = locate::locate(&doc, &schema).expect("locate");
        let page = extract_rows(&hit, &schema, None);
        let r = &page.records[0];
        assert_eq!(r.num(schema.field_index("players").unwrap()), 18.0);
        assert_eq!(r.num(schema.field_index("power").unwrap()), 740.0);
        assert_eq!(r.num(schema.field_index("price").unwrap()), 900_000.0);
    }

    #[test]
    fn display_renders_nan_as_empty() {
        let r = Record {
            name: "x".into(),
            link: String::new(),
            values: vec![Value::Num(f64::NAN), Value::Num(12.0), Value::Text("Gk".into())],
        };
        assert_eq!(r.display(0), "");
        assert_eq!(r.display(1), "12");
        assert_eq!(r.display(2), "Gk");
    }
}
