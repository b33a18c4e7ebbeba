//! Context matching.
//!
//! Intents may declare a context (for example the product categories or the
//! audience they are meant for). Whether that context applies to a request is
//! decided by a [`ContextMatcher`]. The resolver consults the matcher at most
//! once per intent per round; implementations must be fast and total.

use crate::intent::IntentContext;
use serde_json::Value;

pub trait ContextMatcher {
    /// Return `true` if an intent declaring `context` may fire for the
    /// current request.
    fn matches(&self, context: &IntentContext) -> bool;
}

impl<F> ContextMatcher for F
where
    F: Fn(&IntentContext) -> bool,
{
    fn matches(&self, context: &IntentContext) -> bool {
        self(context)
    }
}

/// A [`ContextMatcher`] backed by the JSON context of one request.
///
/// Only keys present on both sides are compared:
///
/// ```text
/// intent value     request value     matches when
/// string/number    same kind         values are equal
/// array            scalar            array contains the value
/// array            array             arrays share an element
/// ```
///
/// An empty intent context applies to every request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: serde_json::Map<String, Value>,
}

impl RequestContext {
    pub fn new(values: serde_json::Map<String, Value>) -> Self {
        RequestContext { values }
    }

    /// Build from a JSON value; anything but an object yields an empty context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => RequestContext { values },
            _ => RequestContext::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ContextMatcher for RequestContext {
    fn matches(&self, context: &IntentContext) -> bool {
        if context.is_empty() {
            return true;
        }
        self.values.iter().all(|(key, request_value)| match context.get(key) {
            Some(intent_value) => values_match(intent_value, request_value),
            None => true,
        })
    }
}

fn values_match(intent: &Value, request: &Value) -> bool {
    match (intent, request) {
        (Value::Array(allowed), Value::Array(requested)) => requested.iter().any(|r| allowed.contains(r)),
        (Value::Array(allowed), scalar) => allowed.contains(scalar),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Null, _) | (_, Value::Null) => true,
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent_context(value: Value) -> IntentContext {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test contexts are objects"),
        }
    }

    #[test]
    fn empty_intent_context_always_matches() {
        let request = RequestContext::from_value(json!({"userGender": "female"}));
        assert!(request.matches(&IntentContext::new()));
    }

    #[test]
    fn scalar_values_must_be_equal() {
        let intent = intent_context(json!({"userGender": "female", "whatever": 123.0}));
        assert!(RequestContext::from_value(json!({"userGender": "female"})).matches(&intent));
        assert!(RequestContext::from_value(json!({"whatever": 123})).matches(&intent));
        assert!(!RequestContext::from_value(json!({"userGender": "male"})).matches(&intent));
    }

    #[test]
    fn arrays_contain_request_values() {
        let intent = intent_context(json!({"categories": ["Notebook", "Tablet"]}));
        assert!(RequestContext::from_value(json!({"categories": "Notebook"})).matches(&intent));
        assert!(RequestContext::from_value(json!({"categories": ["Phone", "Tablet"]})).matches(&intent));
        assert!(!RequestContext::from_value(json!({"categories": "Phone"})).matches(&intent));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let intent = intent_context(json!({"categories": ["Notebook"]}));
        let mut request = RequestContext::default();
        request.insert("locale", "de");
        assert!(request.matches(&intent));
    }

    #[test]
    fn closures_are_matchers() {
        let only_empty = |ctx: &IntentContext| ctx.is_empty();
        assert!(only_empty.matches(&IntentContext::new()));
        assert!(!only_empty.matches(&intent_context(json!({"a": 1}))));
    }
}
