//! Request parameters and the compound parameter parser.
//!
//! Compound parameters pack several descriptors into one string:
//! `"city:id,name|currency"` is two groups separated by `|`, each a name
//! optionally followed by `:` and a comma-separated value list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys with a fixed meaning; never treated as column filters.
pub const RESERVED_KEYS: &[&str] = &[
    "language_id",
    "with",
    "selected_fields",
    "order_by",
    "where_not_null",
    "limit",
];

/// Values attached to a parsed parameter group.
///
/// A group with one value yields `Single`, never a one-element `List`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValues {
    Single(String),
    List(Vec<String>),
}

impl ParamValues {
    /// All values as a slice-like iterator regardless of shape.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let (single, list): (Option<&str>, &[String]) = match self {
            ParamValues::Single(v) => (Some(v.as_str()), &[]),
            ParamValues::List(vs) => (None, vs.as_slice()),
        };
        single.into_iter().chain(list.iter().map(String::as_str))
    }

    /// The first value.
    pub fn first(&self) -> Option<&str> {
        self.iter().next()
    }
}

/// One `name[:v1,v2]` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParameter {
    pub name: String,
    pub values: Option<ParamValues>,
}

impl ParsedParameter {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: None,
        }
    }
}

/// Parse a compound parameter string.
///
/// Always returns a sequence, even for a single group. Empty groups and
/// empty values are skipped; a group whose values are all empty is bare.
///
/// ```
/// use recordkit_query::{ParamValues, ParsedParameter, parse_parameters};
///
/// let parsed = parse_parameters("a:1,2|b:3|c");
/// assert_eq!(parsed.len(), 3);
/// assert_eq!(parsed[1].values, Some(ParamValues::Single("3".into())));
/// assert_eq!(parsed[2], ParsedParameter::bare("c"));
/// ```
pub fn parse_parameters(raw: &str) -> Vec<ParsedParameter> {
    raw.split('|')
        .filter_map(|group| {
            let group = group.trim();
            if group.is_empty() {
                return None;
            }
            let (name, rest) = match group.split_once(':') {
                Some((name, rest)) => (name.trim(), Some(rest)),
                None => (group, None),
            };
            if name.is_empty() {
                return None;
            }
            let values = rest.and_then(|rest| {
                let mut values: Vec<String> = split_list(rest);
                match values.len() {
                    0 => None,
                    1 => values.pop().map(ParamValues::Single),
                    _ => Some(ParamValues::List(values)),
                }
            });
            Some(ParsedParameter {
                name: name.to_string(),
                values,
            })
        })
        .collect()
}

/// Split a comma list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Raw request parameters, as the transport layer hands them over.
///
/// Deserializes from a flat string map such as a decoded query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// A parameter's value; empty strings count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// The active language, if present and numeric.
    pub fn language_id(&self) -> Option<i64> {
        self.get("language_id").and_then(|v| v.trim().parse().ok())
    }

    /// Every non-reserved parameter, the candidates for column filters.
    pub fn filter_candidates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
