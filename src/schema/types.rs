// src/schema/types.rs
//
// A schema describes one list page as data: which semantic fields the crawl
// cares about, how their headers read, and how their cells are typed. The
// locator turns a schema plus a document into a ColumnMap; everything else
// works off that map.

use regex::Regex;

/// How a mapped cell is read into a typed value.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Currency-like integer: strict digit-only parse.
    Amount,
    /// Bounded integer that may carry annotation text: loose parse.
    Count,
    /// Raw trimmed text.
    Text,
    /// Text with an `img[alt]` / `img[title]` fallback (country flags).
    Label,
    /// No header of its own: first numeric cell of the row inside the given
    /// inclusive magnitude range.
    Inferred { min: f64, max: f64 },
}

/// One semantic field of a schema.
#[derive(Debug, Clone)]
pub struct Field {
    /// Stable key used by filter rules and config.
    pub name: &'static str,
    /// Column label used in exports.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Required fields must map to a header or the table is rejected.
    pub required: bool,
    /// Case-insensitive rule tested against the normalized lowercased header
    /// text. `None` for
    /// [`FieldKind::Inferred`] fields, which have no header.
    pub matcher: Option<Regex>,
}

impl Field {
    pub fn matches_header(&self, header: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(header))
    }
}

/// The primary identity column: entity name plus its detail hyperlink.
#[derive(Debug, Clone)]
pub struct Identity {
    pub label: &'static str,
    pub matcher: Regex,
    /// An anchor in the identity column must contain one of these href
    /// fragments for the table to pass the sanity check.
    pub link_fragments: &'static [&'static str],
}

impl Identity {
    pub fn link_matches(&self, href: &str) -> bool {
        self.link_fragments.iter().any(|f| href.contains(f))
    }
}

/// Ordered set of fields one extraction target cares about.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub identity: Identity,
    pub fields: Vec<Field>,
}

impl ColumnSchema {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, idx: usize) -> &Field {
        &self.fields[idx]
    }
}

/// Field-name -> zero-based column position for one located table.
///
/// Invariant (upheld by the locator): every required field is `Some`, and
/// `identity` is a valid cell index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub identity: usize,
    /// Parallel to `ColumnSchema::fields`; `None` = optional field absent.
    pub fields: Vec<Option<usize>>,
}

impl ColumnMap {
    /// Highest cell index the map can touch; rows shorter than this are
    /// still extracted, missing cells just read as absent.
    pub fn max_index(&self) -> usize {
        self.fields
            .iter()
            .flatten()
            .copied()
            .chain(std::iter::once(self.identity))
            .max()
            .unwrap_or(0)
    }
}
