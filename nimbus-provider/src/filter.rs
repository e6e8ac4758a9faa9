//! Data-source filter blocks: linear scans over the flattened result list.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ProviderError, Result};

/// One filter block from a data-source definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub regex: bool,
}

/// Keep the entries whose attribute matches every filter. An entry without
/// the named attribute never matches.
pub fn apply_filters(
    filters: &[Filter],
    items: Vec<Map<String, Value>>,
) -> Result<Vec<Map<String, Value>>> {
    let mut kept = items;
    for filter in filters {
        let matcher = Matcher::compile(filter)?;
        kept.retain(|item| {
            item.get(&filter.name)
                .map(display_value)
                .is_some_and(|v| matcher.matches(&v))
        });
    }
    Ok(kept)
}

enum Matcher {
    Literal(Vec<String>),
    Patterns(Vec<Regex>),
}

impl Matcher {
    fn compile(filter: &Filter) -> Result<Self> {
        if !filter.regex {
            return Ok(Matcher::Literal(filter.values.clone()));
        }
        let patterns = filter
            .values
            .iter()
            .map(|v| {
                Regex::new(v).map_err(|e| ProviderError::InvalidFilter {
                    name: filter.name.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Matcher::Patterns(patterns))
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Literal(values) => values.iter().any(|v| v == value),
            Matcher::Patterns(patterns) => patterns.iter().any(|p| p.is_match(value)),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
