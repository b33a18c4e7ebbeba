//! Intent data model.
//!
//! An [`Intent`] bundles triggers (how a query is recognized), an opaque
//! context (when the intent applies) and one [`ActionTemplate`] (what happens
//! when it fires). Templates are passive values: they are read during
//! resolution but never mutated by it; every resolve call produces fresh
//! [`ActivatedAction`](crate::ActivatedAction)s instead.

use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default fractional window applied around a numeric anchor.
pub const DEFAULT_MARGIN: f64 = 0.05;

/// How a trigger recognizes a query, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Trigger text equals the query.
    Match,
    /// Trigger text occurs in the query as a whole word.
    PhraseMatch,
    /// Trigger text is a substring of the query.
    Contains,
    /// Trigger text is a case-insensitive regular expression.
    Regex,
}

impl MatchType {
    /// All match types in the order the matcher evaluates them.
    pub const PRECEDENCE: [MatchType; 4] =
        [MatchType::Match, MatchType::PhraseMatch, MatchType::Contains, MatchType::Regex];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Match => "MATCH",
            MatchType::PhraseMatch => "PHRASE_MATCH",
            MatchType::Contains => "CONTAINS",
            MatchType::Regex => "REGEX",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    match_type: MatchType,
    text: String,
}

impl Trigger {
    pub fn new(match_type: MatchType, text: impl Into<String>) -> Self {
        Trigger { match_type, text: text.into() }
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_match_type(&mut self, match_type: MatchType) {
        self.match_type = match_type;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Length used for specificity ordering (characters, not bytes).
    pub(crate) fn specificity(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Structured filters and/or a sort.
    #[default]
    Definition,
    /// Replace (part of) the query text.
    Rewrite,
    /// Terminate resolution with a redirect target.
    Redirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Sort { key: key.into(), direction }
    }
}

/// Pin the results of an auxiliary query at a fixed result position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub query: String,
    pub position: usize,
}

impl Placement {
    pub fn new(query: impl Into<String>, position: usize) -> Self {
        Placement { query: query.into(), position }
    }
}

/// Unresolved filter description.
///
/// `min`/`max`/`unit` and each value may be literals or reference capture
/// groups of a REGEX trigger (`$N`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTemplate {
    pub key: String,
    values: Vec<Template>,
    pub min: Option<Template>,
    pub max: Option<Template>,
    pub margin: Option<f64>,
    pub unit: Option<Template>,
    pub boolean_value: Option<bool>,
    pub without: Option<bool>,
}

impl FilterTemplate {
    pub fn new(key: impl Into<String>) -> Self {
        FilterTemplate { key: key.into(), ..Default::default() }
    }

    /// Set the minimum definition. An empty definition means "no bound".
    pub fn with_min(mut self, definition: &str) -> Self {
        self.set_min_definition(definition);
        self
    }

    pub fn with_max(mut self, definition: &str) -> Self {
        self.set_max_definition(definition);
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.add_value(value);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = definition(unit);
        self
    }

    pub fn with_boolean_value(mut self, value: bool) -> Self {
        self.boolean_value = Some(value);
        self
    }

    pub fn with_without(mut self, without: bool) -> Self {
        self.without = Some(without);
        self
    }

    pub fn set_min_definition(&mut self, text: &str) {
        self.min = definition(text);
    }

    pub fn set_max_definition(&mut self, text: &str) {
        self.max = definition(text);
    }

    /// Add a value; duplicates are ignored so values behave as an ordered set.
    pub fn add_value(&mut self, value: &str) {
        let template = Template::parse(value);
        if !self.values.contains(&template) {
            self.values.push(template);
        }
    }

    pub fn values(&self) -> &[Template] {
        &self.values
    }
}

fn definition(text: &str) -> Option<Template> {
    let template = Template::parse(text.trim());
    (!template.is_empty()).then_some(template)
}

/// Declarative description of what happens when an intent fires.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTemplate {
    pub action_type: ActionType,
    pub filters: Vec<FilterTemplate>,
    pub sort: Option<Sort>,
    pub remove_trigger: bool,
    pub redirect: Option<Template>,
    pub rewrite: Option<Template>,
    pub append_queries: Vec<String>,
    pub mix_in_queries: Vec<String>,
    pub exclude_queries: Vec<String>,
    pub placements: Vec<Placement>,
    /// Human-readable explanation keyed by ISO 639-1 language code.
    pub explanation: BTreeMap<String, String>,
    pub meta_data: serde_json::Map<String, serde_json::Value>,
}

impl Default for ActionTemplate {
    fn default() -> Self {
        ActionTemplate {
            action_type: ActionType::Definition,
            filters: Vec::new(),
            sort: None,
            remove_trigger: true,
            redirect: None,
            rewrite: None,
            append_queries: Vec::new(),
            mix_in_queries: Vec::new(),
            exclude_queries: Vec::new(),
            placements: Vec::new(),
            explanation: BTreeMap::new(),
            meta_data: serde_json::Map::new(),
        }
    }
}

impl ActionTemplate {
    pub fn definition() -> Self {
        ActionTemplate::default()
    }

    pub fn rewrite(template: &str) -> Self {
        ActionTemplate { action_type: ActionType::Rewrite, rewrite: Some(Template::parse(template)), ..Default::default() }
    }

    pub fn redirect(template: &str) -> Self {
        ActionTemplate {
            action_type: ActionType::Redirect,
            redirect: Some(Template::parse(template)),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterTemplate) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_remove_trigger(mut self, remove: bool) -> Self {
        self.remove_trigger = remove;
        self
    }

    pub fn with_explanation(mut self, language: &str, text: impl Into<String>) -> Self {
        self.explanation.insert(language.to_string(), text.into());
        self
    }
}

/// Opaque identifier of an intent, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(u64);

static NEXT_INTENT_ID: AtomicU64 = AtomicU64::new(1);

impl IntentId {
    fn next() -> Self {
        IntentId(NEXT_INTENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intent#{}", self.0)
    }
}

/// Opaque context declared by an intent; interpreted only by a
/// [`ContextMatcher`](crate::ContextMatcher).
pub type IntentContext = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct Intent {
    id: IntentId,
    triggers: Vec<Trigger>,
    context: IntentContext,
    action: ActionTemplate,
}

impl Intent {
    pub fn new(action: ActionTemplate) -> Self {
        Intent { id: IntentId::next(), triggers: Vec::new(), context: IntentContext::new(), action }
    }

    pub fn with_trigger(mut self, match_type: MatchType, text: &str) -> Self {
        self.add_trigger(Trigger::new(match_type, text));
        self
    }

    pub fn with_context(mut self, context: IntentContext) -> Self {
        self.context = context;
        self
    }

    /// Insert a trigger, keeping triggers sorted by descending length.
    ///
    /// The sort is stable: equally long triggers keep their insertion order.
    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
        self.triggers.sort_by_key(|t| std::cmp::Reverse(t.specificity()));
    }

    pub fn set_context(&mut self, context: IntentContext) {
        self.context = context;
    }

    pub fn set_action(&mut self, action: ActionTemplate) {
        self.action = action;
    }

    pub fn id(&self) -> IntentId {
        self.id
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn context(&self) -> &IntentContext {
        &self.context
    }

    pub fn action(&self) -> &ActionTemplate {
        &self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_stay_sorted_by_descending_length() {
        let intent = Intent::new(ActionTemplate::definition())
            .with_trigger(MatchType::Contains, "tv")
            .with_trigger(MatchType::Contains, "television")
            .with_trigger(MatchType::Regex, "t\\.v\\.")
            .with_trigger(MatchType::Contains, "ab");

        let texts: Vec<&str> = intent.triggers().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["television", "t\\.v\\.", "tv", "ab"]);
    }

    #[test]
    fn specificity_counts_characters() {
        let intent = Intent::new(ActionTemplate::definition())
            .with_trigger(MatchType::Contains, "über")
            .with_trigger(MatchType::Contains, "abcde");
        assert_eq!(intent.triggers()[0].text(), "abcde");
    }

    #[test]
    fn intent_ids_are_unique() {
        let a = Intent::new(ActionTemplate::definition());
        let b = Intent::new(ActionTemplate::definition());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn empty_definitions_are_absent() {
        let filter = FilterTemplate::new("price").with_min("").with_max(" $1 ");
        assert!(filter.min.is_none());
        assert_eq!(filter.max.as_ref().and_then(Template::as_group), Some(1));
        assert_eq!(filter.margin, None);
    }

    #[test]
    fn filter_values_form_an_ordered_set() {
        let filter = FilterTemplate::new("color").with_value("red").with_value("$1").with_value("red");
        let values: Vec<String> = filter.values().iter().map(ToString::to_string).collect();
        assert_eq!(values, vec!["red", "$1"]);
    }

    #[test]
    fn action_defaults() {
        let action = ActionTemplate::default();
        assert_eq!(action.action_type, ActionType::Definition);
        assert!(action.remove_trigger);
        assert!(action.filters.is_empty());
        assert!(action.explanation.is_empty());
        assert!(action.meta_data.is_empty());
    }
}
