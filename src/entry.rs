// src/entry.rs
//
// Entry-form detection for tournament pages: find the first form carrying a
// submit control whose text reads like the participation button, and gather
// its fields (hidden inputs and any CSRF token included) for a POST. The
// engine proper never calls this; the poller binary does.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::normalize::clean_text;

static FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").expect("form selector"));
static CONTROLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, button").expect("controls selector"));
static NAMED_INPUTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name]").expect("inputs selector"));

/// A submittable form, detached from the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    /// Raw `action` attribute; may be relative or empty (self).
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl EntryForm {
    /// Resolve the form target against the page it was found on.
    pub fn target(&self, page: &Url) -> Url {
        if self.action.is_empty() {
            return page.clone();
        }
        page.join(&self.action).unwrap_or_else(|_| page.clone())
    }
}

fn is_submit_control(el: ElementRef<'_>) -> bool {
    match el.value().name() {
        "button" => true,
        "input" => matches!(el.value().attr("type"), Some("submit") | Some("button")),
        _ => false,
    }
}

fn control_text(el: ElementRef<'_>) -> String {
    match el.value().attr("value") {
        Some(v) if !v.trim().is_empty() => clean_text(v),
        _ => clean_text(&el.text().collect::<String>()),
    }
}

/// First form with a submit control matching `button` (tested lowercased).
pub fn find_entry_form(doc: &Html, button: &Regex) -> Option<EntryForm> {
    for form in doc.select(&FORM) {
        let submit = form
            .select(&CONTROLS)
            .find(|c| is_submit_control(*c) && button.is_match(&control_text(*c).to_lowercase()));
        let Some(submit) = submit else { continue };

        let mut fields: Vec<(String, String)> = form
            .select(&NAMED_INPUTS)
            .filter(|i| !is_submit_control(*i))
            .filter_map(|i| {
                let name = i.value().attr("name")?;
                Some((name.to_string(), i.value().attr("value").unwrap_or("").to_string()))
            })
            .collect();

        // Keep the clicked control's name/value pair when it has one.
        if let Some(name) = submit.value().attr("name") {
            fields.push((name.to_string(), submit.value().attr("value").unwrap_or("").to_string()));
        }

        return Some(EntryForm {
            action: form.value().attr("action").unwrap_or("").to_string(),
            fields,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_rule() -> Regex {
        Regex::new(r"take\s*part").unwrap()
    }

    #[test]
    fn finds_form_and_collects_hidden_fields() {
        let html = Html::parse_document(
            r#"<html><body>
            <form action="/search"><input name="q"><button>Search</button></form>
            <form action="/marbella-cup" method="post">
              <input type="hidden" name="csrf" value="tok123">
              <input type="hidden" name="team" value="88">
              <input type="submit" name="apply" value="Take part">
            </form>
            </body></html>"#,
        );
        let form = find_entry_form(&html, &button_rule()).expect("form");
        assert_eq!(form.action, "/marbella-cup");
        assert_eq!(
            form.fields,
            vec![
                ("csrf".to_string(), "tok123".to_string()),
                ("team".to_string(), "88".to_string()),
                ("apply".to_string(), "Take part".to_string()),
            ]
        );
    }

    #[test]
    fn matches_button_element_text() {
        let html = Html::parse_document(
            r#"<form action=""><button type="submit">Take&nbsp;Part</button></form>"#,
        );
        let form = find_entry_form(&html, &button_rule()).expect("form");
        assert!(form.fields.is_empty());
        let page = Url::parse("https://meneger.net/marbella-cup").unwrap();
        assert_eq!(form.target(&page), page);
    }

    #[test]
    fn none_when_no_matching_button() {
        let html = Html::parse_document(
            r#"<form action="/x"><input type="submit" value="Save"></form>"#,
        );
        assert!(find_entry_form(&html, &button_rule()).is_none());
    }

    #[test]
    fn target_resolves_relative_action() {
        let form = EntryForm { action: "/marbella-cup".into(), fields: vec![] };
        let page = Url::parse("https://meneger.net/somewhere").unwrap();
        assert_eq!(form.target(&page).as_str(), "https://meneger.net/marbella-cup");
    }
}
