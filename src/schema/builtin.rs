// src/schema/builtin.rs
//
// The builtin schemas for the site's list pages. Header vocabularies come
// straight from the pages, localized synonyms included; writing them as data
// keeps the locator logic shared across every entity type.

use regex::Regex;

use super::types::{ColumnSchema, Field, FieldKind, Identity};

fn rule(pattern: &str) -> Option<Regex> {
    // Patterns are compile-time constants over lowercased header text.
    Some(Regex::new(pattern).expect("header rule regex"))
}

fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    pattern: &str,
) -> Field {
    Field {
        name,
        label,
        kind,
        required,
        matcher: rule(pattern),
    }
}

fn inferred(name: &'static str, label: &'static str, min: f64, max: f64) -> Field {
    Field {
        name,
        label,
        kind: FieldKind::Inferred { min, max },
        required: false,
        matcher: None,
    }
}

/// Players list: `/players?pos=..&sort=..&start=..`.
pub fn players() -> ColumnSchema {
    ColumnSchema {
        name: "players",
        identity: Identity {
            label: "Name",
            matcher: Regex::new("player").expect("identity rule"),
            link_fragments: &["/player/"],
        },
        fields: vec![
            field("nat", "Nat", FieldKind::Label, false, "^nat"),
            field("pos", "Pos", FieldKind::Text, false, "^pos"),
            // some lists title the age column "Year"
            field("age", "Age", FieldKind::Count, false, "^(year|age)$"),
            field("tal", "Tal", FieldKind::Count, false, "^tal"),
            field("mas", "Mas", FieldKind::Count, false, r"\bmas\b"),
            field("price", "Price", FieldKind::Amount, true, "price"),
        ],
    }
}

/// Staff lists (coaches, goalkeeping coaches, physiotherapists).
pub fn staff() -> ColumnSchema {
    ColumnSchema {
        name: "staff",
        identity: Identity {
            label: "Name",
            matcher: Regex::new("^(staff|name)$").expect("identity rule"),
            link_fragments: &["/staff/"],
        },
        fields: vec![
            field("nat", "Nat", FieldKind::Label, false, "^nat"),
            field("pos", "Role", FieldKind::Text, true, "^pos"),
            field("age", "Age", FieldKind::Count, false, "^(year|age)$"),
            field("tal", "Tal", FieldKind::Count, true, "^tal"),
            field("mas", "Mas", FieldKind::Count, false, "^mas"),
            // shown preformatted on the site, kept as text
            field("salary", "Salary", FieldKind::Text, false, "salary|wage|price"),
        ],
    }
}

/// Teams list. Players/power have no reliable headers of their own; they are
/// picked out of each row by magnitude.
pub fn teams() -> ColumnSchema {
    ColumnSchema {
        name: "teams",
        identity: Identity {
            label: "Team",
            matcher: Regex::new("team|команда|club").expect("identity rule"),
            link_fragments: &["/team/", "/teams"],
        },
        fields: vec![
            inferred("players", "Players", 10.0, 30.0),
            inferred("power", "Power", 200.0, 2000.0),
            field("price", "Price", FieldKind::Amount, true, "price|цена|стоим|cost"),
        ],
    }
}

/// Tournaments list (cups, trophies).
pub fn tournaments() -> ColumnSchema {
    ColumnSchema {
        name: "tournaments",
        identity: Identity {
            label: "Tournament",
            matcher: Regex::new("tournament|cup|trophy|name").expect("identity rule"),
            link_fragments: &["/tournament", "/cup"],
        },
        fields: vec![
            field("teams", "Teams", FieldKind::Count, false, "^teams?$"),
            field("prize", "Prize", FieldKind::Amount, false, "prize|fund"),
            field("status", "Status", FieldKind::Text, false, "^(status|stage)"),
        ],
    }
}

/// Look a builtin schema up by its config name.
pub fn by_name(name: &str) -> Option<ColumnSchema> {
    match name {
        "players" => Some(players()),
        "staff" => Some(staff()),
        "teams" => Some(teams()),
        "tournaments" => Some(tournaments()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_vocabulary() {
        let p = players();
        assert!(p.identity.matcher.is_match("player"));
        assert!(p.fields[p.field_index("age").unwrap()].matches_header("year"));
        assert!(p.fields[p.field_index("mas").unwrap()].matches_header("mas"));
        assert!(!p.fields[p.field_index("mas").unwrap()].matches_header("master"));
        assert!(p.fields[p.field_index("price").unwrap()].matches_header("price, cr"));

        let t = teams();
        assert!(t.identity.matcher.is_match("команда"));
        assert!(t.fields[t.field_index("price").unwrap()].matches_header("стоимость"));
    }

    #[test]
    fn by_name_covers_all_builtins() {
        for name in ["players", "staff", "teams", "tournaments"] {
            assert!(by_name(name).is_some(), "{name}");
        }
        assert!(by_name("fixtures").is_none());
    }

    #[test]
    fn identity_link_fragments() {
        let t = teams();
        assert!(t.identity.link_matches("https://example.net/team/12"));
        assert!(!t.identity.link_matches("/staff/9"));
    }
}
