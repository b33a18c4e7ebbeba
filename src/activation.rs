//! Resolved, per-call copies of action templates.

use crate::intent::{ActionTemplate, ActionType, FilterTemplate, IntentId, MatchType, Placement, Sort, Trigger};
use serde::Serialize;
use std::collections::BTreeMap;

/// A filter with concrete bounds.
///
/// Bounds that could not be resolved stay `None`; they are never defaulted to
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedFilter {
    pub key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub without: Option<bool>,
}

impl ActivatedFilter {
    /// Copy the passive parts of `template`; bounds and values are filled in
    /// by the activation step.
    pub(crate) fn from_template(template: &FilterTemplate) -> Self {
        ActivatedFilter {
            key: template.key.clone(),
            values: Vec::new(),
            min: None,
            max: None,
            margin: template.margin,
            unit: None,
            boolean_value: template.boolean_value,
            without: template.without,
        }
    }

    pub(crate) fn push_value(&mut self, value: String) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }
}

/// The concrete result of firing one intent against one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedAction {
    pub intent_id: IntentId,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub match_type: MatchType,
    pub trigger: Trigger,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<ActivatedFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    pub remove_trigger: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub append_queries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mix_in_queries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_queries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<Placement>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub explanation: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub meta_data: serde_json::Map<String, serde_json::Value>,
    /// Query text after rewriting or trigger removal.
    pub modified_query: String,
}

impl ActivatedAction {
    /// Copy everything that needs no resolution out of `template`.
    ///
    /// `modified_query` starts out as the query the intent fired on.
    pub(crate) fn from_template(
        intent_id: IntentId,
        template: &ActionTemplate,
        match_type: MatchType,
        trigger: &Trigger,
        query: &str,
    ) -> Self {
        ActivatedAction {
            intent_id,
            action_type: template.action_type,
            match_type,
            trigger: trigger.clone(),
            filters: Vec::new(),
            sort: template.sort.clone(),
            remove_trigger: template.remove_trigger,
            redirect: None,
            rewrite: None,
            append_queries: template.append_queries.clone(),
            mix_in_queries: template.mix_in_queries.clone(),
            exclude_queries: template.exclude_queries.clone(),
            placements: template.placements.clone(),
            explanation: template.explanation.clone(),
            meta_data: template.meta_data.clone(),
            modified_query: query.to_string(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.action_type == ActionType::Redirect
    }

    pub fn filter(&self, key: &str) -> Option<&ActivatedFilter> {
        self.filters.iter().find(|f| f.key == key)
    }
}
