//! Ruleset ingestion.
//!
//! Intents are persisted as a JSON array:
//!
//! ```json
//! [
//!   {
//!     "triggers": [{ "type": "CONTAINS", "text": "cheap" }],
//!     "context": { "categories": ["Notebook"] },
//!     "action": {
//!       "type": "DEFINITION",
//!       "filters": [{ "key": "cost.PRICE", "min": 0, "max": 233 }],
//!       "sorts": [{ "key": "cost.PRICE", "direction": "ASC" }],
//!       "explanation": { "en": "You want the cheap stuff" },
//!       "metaData": { "x": "y" }
//!     }
//!   }
//! ]
//! ```
//!
//! `min`, `max` and `values` entries may be numbers or strings (`"$1"`).
//! When several sorts are listed the last one wins. Regex trigger syntax is
//! not validated here: malformed patterns simply never match.

use crate::error::{IntentError, Result};
use crate::intent::{ActionTemplate, ActionType, FilterTemplate, Intent, IntentContext, Placement, Sort, Trigger};
use crate::template::Template;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawIntent {
    triggers: Vec<Trigger>,
    #[serde(default)]
    context: IntentContext,
    action: RawAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    #[serde(rename = "type", default)]
    action_type: ActionType,
    #[serde(default)]
    filters: Vec<RawFilter>,
    #[serde(default)]
    sorts: Vec<Sort>,
    #[serde(default)]
    explanation: BTreeMap<String, String>,
    #[serde(default)]
    meta_data: serde_json::Map<String, serde_json::Value>,
    redirect: Option<String>,
    rewrite: Option<String>,
    remove_trigger: Option<bool>,
    #[serde(default)]
    append_queries: Vec<String>,
    #[serde(default)]
    mix_in_queries: Vec<String>,
    #[serde(default)]
    exclude_queries: Vec<String>,
    #[serde(default)]
    placements: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    key: String,
    min: Option<Scalar>,
    max: Option<Scalar>,
    #[serde(default)]
    values: Vec<Scalar>,
    margin: Option<f64>,
    unit: Option<String>,
    boolean_value: Option<bool>,
    without: Option<bool>,
}

/// JSON numbers and strings are both accepted where a definition is expected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Parse a ruleset from a JSON string.
pub fn from_json_str(json: &str) -> Result<Vec<Intent>> {
    let raw: Vec<RawIntent> = serde_json::from_str(json)?;
    convert(raw)
}

/// Parse a ruleset from any reader yielding JSON.
pub fn from_reader(reader: impl Read) -> Result<Vec<Intent>> {
    let raw: Vec<RawIntent> = serde_json::from_reader(reader)?;
    convert(raw)
}

/// Read and parse a ruleset file.
pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Intent>> {
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text)
}

fn convert(raw: Vec<RawIntent>) -> Result<Vec<Intent>> {
    let intents = raw.into_iter().enumerate().map(|(index, r)| build_intent(index, r)).collect::<Result<Vec<_>>>()?;
    tracing::debug!(count = intents.len(), "loaded intent ruleset");
    Ok(intents)
}

fn build_intent(index: usize, raw: RawIntent) -> Result<Intent> {
    let invalid = |reason: &str| IntentError::InvalidIntent { index, reason: reason.to_string() };

    if raw.triggers.is_empty() {
        return Err(invalid("intent has no triggers"));
    }

    let action = raw.action;
    match action.action_type {
        ActionType::Rewrite if action.rewrite.is_none() => return Err(invalid("REWRITE action without `rewrite`")),
        ActionType::Redirect if action.redirect.is_none() => {
            return Err(invalid("REDIRECT action without `redirect`"));
        }
        _ => {}
    }

    let filters = action.filters.into_iter().map(build_filter).collect();

    let template = ActionTemplate {
        action_type: action.action_type,
        filters,
        sort: action.sorts.into_iter().last(),
        remove_trigger: action.remove_trigger.unwrap_or(true),
        redirect: action.redirect.map(Template::from),
        rewrite: action.rewrite.map(Template::from),
        append_queries: action.append_queries,
        mix_in_queries: action.mix_in_queries,
        exclude_queries: action.exclude_queries,
        placements: action.placements,
        explanation: action.explanation,
        meta_data: action.meta_data,
    };

    let mut intent = Intent::new(template).with_context(raw.context);
    for trigger in raw.triggers {
        intent.add_trigger(trigger);
    }
    Ok(intent)
}

fn build_filter(raw: RawFilter) -> FilterTemplate {
    let mut filter = FilterTemplate::new(raw.key);
    if let Some(min) = raw.min {
        filter.set_min_definition(&min.into_text());
    }
    if let Some(max) = raw.max {
        filter.set_max_definition(&max.into_text());
    }
    for value in raw.values {
        filter.add_value(&value.into_text());
    }
    filter.margin = raw.margin;
    if let Some(unit) = raw.unit {
        filter = filter.with_unit(&unit);
    }
    filter.boolean_value = raw.boolean_value;
    filter.without = raw.without;
    filter
}
