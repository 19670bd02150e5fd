// src/filter.rs
//
// Configured predicates, ANDed in order, short-circuiting on the first
// failure. Absent numeric data (NaN) passes every bound but an explicit
// equals test; empty string sets and empty candidate values restrict
// nothing.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::schema::ColumnSchema;
use crate::table::Record;

/// One configured rule, as written in the config file. A single rule may
/// expand into several predicates (min and max, include and exclude).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRule {
    pub field: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min_exclusive: bool,
    #[serde(default)]
    pub max_exclusive: bool,
    #[serde(default)]
    pub equals: Option<f64>,
    #[serde(default)]
    pub any_of: Option<Vec<String>>,
    #[serde(default)]
    pub none_of: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    Min { value: f64, exclusive: bool },
    Max { value: f64, exclusive: bool },
    Equals(f64),
    AnyOf(Vec<String>),
    NoneOf(Vec<String>),
}

#[derive(Debug, Clone, Copy)]
enum FieldRef {
    /// The identity column's name text.
    Name,
    /// Index into the schema's field list.
    Index(usize),
}

/// Rules resolved against one schema, ready to evaluate per record.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    preds: Vec<(FieldRef, Predicate)>,
}

impl CompiledFilter {
    /// Resolve field names once; unknown fields are a configuration error.
    pub fn compile(rules: &[FilterRule], schema: &ColumnSchema) -> Result<Self> {
        let mut preds = Vec::new();
        for rule in rules {
            let field = if rule.field == "name" {
                FieldRef::Name
            } else {
                match schema.field_index(&rule.field) {
                    Some(i) => FieldRef::Index(i),
                    None => bail!(
                        "filter field {:?} is not part of schema {:?}",
                        rule.field,
                        schema.name
                    ),
                }
            };

            if let Some(value) = rule.equals {
                preds.push((field, Predicate::Equals(value)));
            }
            if let Some(value) = rule.min {
                preds.push((field, Predicate::Min { value, exclusive: rule.min_exclusive }));
            }
            if let Some(value) = rule.max {
                preds.push((field, Predicate::Max { value, exclusive: rule.max_exclusive }));
            }
            if let Some(list) = rule.any_of.as_ref().filter(|l| !l.is_empty()) {
                preds.push((field, Predicate::AnyOf(list.clone())));
            }
            if let Some(list) = rule.none_of.as_ref().filter(|l| !l.is_empty()) {
                preds.push((field, Predicate::NoneOf(list.clone())));
            }
        }
        Ok(Self { preds })
    }

    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }

    /// AND over all predicates, first failure wins.
    pub fn passes(&self, record: &Record) -> bool {
        self.preds.iter().all(|(field, pred)| {
            let num = match field {
                FieldRef::Name => f64::NAN,
                FieldRef::Index(i) => record.num(*i),
            };
            let text = match field {
                FieldRef::Name => record.name.as_str(),
                FieldRef::Index(i) => record.text(*i),
            };
            eval(pred, num, text)
        })
    }
}

fn eval(pred: &Predicate, num: f64, text: &str) -> bool {
    match pred {
        // Absent data is not grounds for exclusion.
        Predicate::Min { value, exclusive } => {
            !num.is_finite() || if *exclusive { num > *value } else { num >= *value }
        }
        Predicate::Max { value, exclusive } => {
            !num.is_finite() || if *exclusive { num < *value } else { num <= *value }
        }
        // Except here: equality demands the field actually be present.
        Predicate::Equals(value) => num.is_finite() && num == *value,
        Predicate::AnyOf(list) => contains_any(text, list),
        Predicate::NoneOf(list) => text.is_empty() || !list.iter().any(|c| containment(text, c)),
    }
}

fn containment(value: &str, candidate: &str) -> bool {
    value.to_lowercase().contains(&candidate.to_lowercase())
}

fn contains_any(value: &str, list: &[String]) -> bool {
    // Empty candidate value restricts nothing, same as an empty list.
    value.is_empty() || list.iter().any(|c| containment(value, c))
}
