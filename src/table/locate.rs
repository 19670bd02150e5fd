// src/table/locate.rs
//
// Finds the one table on a page that actually holds the entity list. Header
// heuristics first, a structural guess second, and a link sanity check in
// both paths so a lookalike table (standings, fixtures) never wins on header
// text alone. Returns None when nothing matches; an empty page is not an
// error here.

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use crate::normalize::parse_int_strict;
use crate::schema::{ColumnMap, ColumnSchema, FieldKind};

use super::{body_rows, cell_anchor, cell_text, header_row, row_cells, TABLE};

/// How many body rows the sanity / structural checks sample.
const SANITY_SAMPLE: usize = 8;
const STRUCTURAL_SAMPLE: usize = 10;
/// Structural fallback only considers tables at least this big.
const MIN_FALLBACK_ROWS: usize = 10;
const MIN_FALLBACK_COLS: usize = 5;
/// Identity-column guess needs this many link hits in the sample.
const MIN_LINK_HITS: usize = 4;
/// Price-like magnitude floor for the amount-column guess.
const AMOUNT_FLOOR: f64 = 50_000.0;

pub struct Located<'a> {
    pub table: ElementRef<'a>,
    pub map: ColumnMap,
    /// True when the header row was the table's first row (no `thead`); the
    /// extractor must then skip it when walking body rows.
    pub header_in_body: bool,
}

/// Scan every table in document order and return the first one matching the
/// schema, falling back to a structural guess when no header matches at all.
pub fn locate<'a>(doc: &'a Html, schema: &ColumnSchema) -> Option<Located<'a>> {
    for (i, table) in doc.select(&TABLE).enumerate() {
        if let Some(found) = match_by_headers(table, schema) {
            trace!(schema = schema.name, candidate = i, "table matched by headers");
            return Some(found);
        }
    }
    for (i, table) in doc.select(&TABLE).enumerate() {
        if let Some(found) = match_structurally(table, schema) {
            debug!(
                schema = schema.name,
                candidate = i,
                "no header match on page, structural fallback hit"
            );
            return Some(found);
        }
    }
    None
}

fn normalized_headers(row: ElementRef<'_>) -> Vec<String> {
    row_cells(row)
        .into_iter()
        .map(|c| cell_text(c).to_lowercase())
        .collect()
}

fn match_by_headers<'a>(table: ElementRef<'a>, schema: &ColumnSchema) -> Option<Located<'a>> {
    let (head, in_body) = header_row(table)?;
    let headers = normalized_headers(head);
    if headers.is_empty() {
        return None;
    }

    let identity = headers.iter().position(|h| schema.identity.matcher.is_match(h))?;

    let mut fields = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let pos = headers.iter().position(|h| field.matches_header(h));
        if field.required && pos.is_none() {
            return None;
        }
        fields.push(pos);
    }

    let map = ColumnMap { identity, fields };
    if !identity_sane(table, in_body, map.identity, schema) {
        trace!(schema = schema.name, "headers matched but identity column has no entity links");
        return None;
    }
    Some(Located { table, map, header_in_body: in_body })
}

/// At least one sampled body row must carry an entity link in the identity
/// column. Guards against unrelated tables that share header text.
fn identity_sane(
    table: ElementRef<'_>,
    header_in_body: bool,
    identity: usize,
    schema: &ColumnSchema,
) -> bool {
    body_rows(table, header_in_body)
        .into_iter()
        .take(SANITY_SAMPLE)
        .any(|row| {
            row_cells(row)
                .get(identity)
                .and_then(|cell| cell_anchor(*cell, schema.identity.link_fragments))
                .is_some_and(|(_, href)| schema.identity.link_matches(href))
        })
}

/// Headerless fallback: a big enough table where one of the leading columns
/// is dense with entity links and one of the trailing columns looks like an
/// amount. Only usable when the schema's required fields are a single amount
/// column (plus identity).
fn match_structurally<'a>(table: ElementRef<'a>, schema: &ColumnSchema) -> Option<Located<'a>> {
    let mut required = schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.required);
    let amount_field = match (required.next(), required.next()) {
        (Some((i, f)), None) if matches!(f.kind, FieldKind::Amount) => i,
        _ => return None,
    };

    let rows = body_rows(table, false);
    if rows.len() < MIN_FALLBACK_ROWS {
        return None;
    }
    let sample: Vec<Vec<ElementRef<'_>>> = rows
        .iter()
        .take(STRUCTURAL_SAMPLE)
        .map(|r| row_cells(*r))
        .collect();
    let cols = sample.first().map(Vec::len).unwrap_or(0);
    if cols < MIN_FALLBACK_COLS {
        return None;
    }

    // Identity guess: first leading column dense with entity links.
    let identity = (0..cols.min(6)).find(|&c| {
        let hits = sample
            .iter()
            .filter(|cells| {
                cells
                    .get(c)
                    .and_then(|cell| cell_anchor(*cell, schema.identity.link_fragments))
                    .is_some_and(|(_, href)| schema.identity.link_matches(href))
            })
            .count();
        hits >= MIN_LINK_HITS
    })?;

    // Amount guess: the trailing column with the most price-like values.
    let mut best: Option<(usize, usize)> = None;
    for c in (cols.saturating_sub(3)..cols).rev() {
        let hits = sample
            .iter()
            .filter(|cells| {
                cells
                    .get(c)
                    .map(|cell| parse_int_strict(&cell_text(*cell)))
                    .is_some_and(|v| v.is_finite() && v >= AMOUNT_FLOOR)
            })
            .count();
        if hits > 0 && best.map(|(_, b)| hits > b).unwrap_or(true) {
            best = Some((c, hits));
        }
    }
    let (amount_col, _) = best?;

    let fields = schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, _)| (i == amount_field).then_some(amount_col))
        .collect();
    Some(Located {
        table,
        map: ColumnMap { identity, fields },
        header_in_body: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    fn player_rows(n: usize) -> String {
        (0..n)
            .map(|i| {
                format!(
                    "<tr><td><a href=\"/player/{i}\">P{i}</a></td><td>ESP</td>\
                     <td>Cf</td><td>2{i}</td><td>7</td><td>80</td><td>1,{i}00</td></tr>"
                )
            })
            .collect()
    }

    const PLAYER_HEAD: &str = "<thead><tr><th>Player</th><th>Nat</th><th>Pos</th>\
        <th>Year</th><th>Tal</th><th>Mas</th><th>Price</th></tr></thead>";

    #[test]
    fn finds_table_by_headers() {
        let html = doc(&format!("<table>{PLAYER_HEAD}<tbody>{}</tbody></table>", player_rows(3)));
        let schema = schema::players();
        let hit = locate(&html, &schema).expect("locate");
        assert_eq!(hit.map.identity, 0);
        assert_eq!(hit.map.fields[schema.field_index("price").unwrap()], Some(6));
        assert_eq!(hit.map.fields[schema.field_index("age").unwrap()], Some(3));
        assert!(!hit.header_in_body);
    }

    #[test]
    fn rejects_table_missing_required_header_even_if_bigger() {
        // First table is large but has no price column; second is the real one.
        let big = format!(
            "<table><thead><tr><th>Player</th><th>Nat</th></tr></thead><tbody>{}</tbody></table>",
            (0..30)
                .map(|i| format!("<tr><td><a href=\"/player/{i}\">P{i}</a></td><td>ESP</td></tr>"))
                .collect::<String>()
        );
        let real = format!("<table>{PLAYER_HEAD}<tbody>{}</tbody></table>", player_rows(2));
        let html = doc(&format!("{big}{real}"));
        let hit = locate(&html, &schema::players()).expect("locate");
        // identity map proves it picked the 7-column table
        assert_eq!(hit.map.fields.last().copied().flatten(), Some(6));
    }

    #[test]
    fn rejects_identity_column_without_links() {
        let html = doc(&format!(
            "<table>{PLAYER_HEAD}<tbody>{}</tbody></table>",
            (0..6)
                .map(|i| format!(
                    "<tr><td>P{i}</td><td>ESP</td><td>Cf</td><td>21</td>\
                     <td>7</td><td>80</td><td>100</td></tr>"
                ))
                .collect::<String>()
        ));
        assert!(locate(&html, &schema::players()).is_none());
    }

    #[test]
    fn headerless_first_row_acts_as_header() {
        let html = doc(&format!(
            "<table><tr><td>Player</td><td>Nat</td><td>Pos</td><td>Year</td>\
             <td>Tal</td><td>Mas</td><td>Price</td></tr>{}</table>",
            player_rows(4)
        ));
        let hit = locate(&html, &schema::players()).expect("locate");
        assert!(hit.header_in_body);
    }

    #[test]
    fn structural_fallback_finds_teams_without_headers() {
        let rows: String = (0..12)
            .map(|i| {
                format!(
                    "<tr><td>{i}</td><td><a href=\"/team/{i}\">Team {i}</a></td>\
                     <td>18</td><td>740</td><td>1,2{i}0,000</td></tr>"
                )
            })
            .collect();
        let html = doc(&format!("<table><tbody>{rows}</tbody></table>"));
        let schema = schema::teams();
        let hit = locate(&html, &schema).expect("fallback locate");
        assert_eq!(hit.map.identity, 1);
        assert_eq!(hit.map.fields[schema.field_index("price").unwrap()], Some(4));
    }

    #[test]
    fn empty_page_is_none_not_error() {
        let html = doc("<p>maintenance</p>");
        assert!(locate(&html, &schema::players()).is_none());
    }
}
