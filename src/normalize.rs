// src/normalize.rs
//
// Cell text on the site is noisy: non-breaking spaces, currency glyphs,
// thousands separators, stray annotations around the number. Everything here
// degrades to NaN instead of erroring; numeric filters treat NaN as "absent".

use once_cell::sync::Lazy;
use regex::Regex;

/// Thousands group right after a comma, e.g. the ",234" in "1,234 cr".
/// `\b` keeps "1,2345" from being collapsed into a bogus "12345".
static THOUSANDS_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\d{3})\b").expect("thousands regex"));

/// First signed integer substring.
static FIRST_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").expect("integer regex"));

static MULTI_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

fn drop_nbsp(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Strict integer parse: keep digit characters only, everything else is
/// stripped. Used for currency-like fields where fractions and signs never
/// legitimately occur. `"1,234"` -> 1234.0, `"$ 1 000"` -> 1000.0.
///
/// Returns NaN when no digit survives.
pub fn parse_int_strict(text: &str) -> f64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    digits.parse::<f64>().unwrap_or(f64::NAN)
}

/// Loose integer parse: collapse thousands groups, then take the first signed
/// integer substring. Used for bounded fields that may carry annotation text
/// around the number. `"Δ 1,234.50 pts"` -> 1234.0 (integer-only extraction,
/// the fractional part is ignored by design).
///
/// Returns NaN when the text holds no digits at all.
pub fn parse_int_loose(text: &str) -> f64 {
    let no_nbsp = drop_nbsp(text);
    let cleaned = THOUSANDS_GROUP.replace_all(&no_nbsp, "$1");
    match FIRST_INT.find(&cleaned) {
        Some(m) => m.as_str().parse::<f64>().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Normalize display text: NBSP -> space, collapse whitespace runs, trim.
pub fn clean_text(text: &str) -> String {
    MULTI_WS
        .replace_all(drop_nbsp(text).trim(), " ")
        .into_owned()
}
