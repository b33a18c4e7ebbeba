//! Ruleset indexing.
//!
//! This module holds the *static* side of the engine: the immutable
//! [`IntentSet`] built once from the loaded intents and shared by every
//! resolve call.
//!
//! Resolution is split into two phases:
//!
//! 1. **Build** (this module): keep the intents in registration order, record
//!    which match types each intent carries (`MatchTypeMask`), index intents
//!    per match type and warm the regex cache.
//! 2. **Run** (see `resolver.rs`): scan the query pass by pass
//!    (`matcher.rs`) and activate the first intent that fires
//!    (`activate.rs`).
//!
//! ## Invariants
//!
//! - `IntentIdx` is an index into `IntentSet::intents`.
//! - Every per-type list in `IntentIndex` is in registration order, so the
//!   first-registered intent wins within a tier.
//! - Nothing here is mutated after `IntentSet::new` returns.

use super::regex_cache::RegexCache;
use crate::intent::{ActionType, Intent, MatchType, Trigger};
use crate::units::{UnitNormalizer, UnitTable};
use std::sync::Arc;

/// Intent identifier inside one set (index into the intents vector).
pub(crate) type IntentIdx = usize;

bitflags::bitflags! {
    /// Match types present among an intent's triggers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MatchTypeMask: u8 {
        const MATCH        = 1 << 0;
        const PHRASE_MATCH = 1 << 1;
        const CONTAINS     = 1 << 2;
        const REGEX        = 1 << 3;
    }
}

impl MatchTypeMask {
    pub fn of(match_type: MatchType) -> Self {
        match match_type {
            MatchType::Match => MatchTypeMask::MATCH,
            MatchType::PhraseMatch => MatchTypeMask::PHRASE_MATCH,
            MatchType::Contains => MatchTypeMask::CONTAINS,
            MatchType::Regex => MatchTypeMask::REGEX,
        }
    }

    /// Union of the match types of `intent`'s triggers.
    pub fn of_intent(intent: &Intent) -> Self {
        intent.triggers().iter().fold(MatchTypeMask::empty(), |mask, t| mask | MatchTypeMask::of(t.match_type()))
    }

    fn slot(match_type: MatchType) -> usize {
        match match_type {
            MatchType::Match => 0,
            MatchType::PhraseMatch => 1,
            MatchType::Contains => 2,
            MatchType::Regex => 3,
        }
    }
}

#[derive(Default, Debug)]
pub(crate) struct IntentIndex {
    by_type: [Vec<IntentIdx>; 4],
}

impl IntentIndex {
    /// Intents carrying at least one trigger of `match_type`, in registration order.
    pub(crate) fn by_type(&self, match_type: MatchType) -> &[IntentIdx] {
        &self.by_type[MatchTypeMask::slot(match_type)]
    }
}

/// Immutable, indexed ruleset.
///
/// Build once at startup and share it (`&IntentSet` or `Arc<IntentSet>`)
/// across threads; [`resolve`](IntentSet::resolve) takes `&self` and keeps all
/// per-call state local.
pub struct IntentSet {
    intents: Vec<Intent>,
    index: IntentIndex,
    regexes: RegexCache,
    units: Arc<dyn UnitNormalizer + Send + Sync>,
}

impl IntentSet {
    /// Index `intents` (kept in the given order) using the built-in unit table.
    pub fn new(intents: Vec<Intent>) -> Self {
        Self::with_units(intents, Arc::new(UnitTable::default()))
    }

    /// Index `intents` with an injected unit normalizer.
    pub fn with_units(intents: Vec<Intent>, units: Arc<dyn UnitNormalizer + Send + Sync>) -> Self {
        let mut index = IntentIndex::default();
        for (idx, intent) in intents.iter().enumerate() {
            let mask = MatchTypeMask::of_intent(intent);
            for match_type in MatchType::PRECEDENCE {
                if mask.contains(MatchTypeMask::of(match_type)) {
                    index.by_type[MatchTypeMask::slot(match_type)].push(idx);
                }
            }
        }

        let set = IntentSet { intents, index, regexes: RegexCache::new(), units };

        // Warm the cache so malformed patterns are reported at load time.
        for &idx in set.index.by_type(MatchType::Regex) {
            let intent = &set.intents[idx];
            for trigger in intent.triggers().iter().filter(|t| t.match_type() == MatchType::Regex) {
                set.regexes.get(&effective_pattern(intent, trigger));
            }
        }

        tracing::debug!(
            intents = set.intents.len(),
            regex_patterns = set.regexes.len(),
            "indexed intent set"
        );

        set
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub(crate) fn intent(&self, idx: IntentIdx) -> &Intent {
        &self.intents[idx]
    }

    pub(crate) fn index(&self) -> &IntentIndex {
        &self.index
    }

    pub(crate) fn regexes(&self) -> &RegexCache {
        &self.regexes
    }

    pub(crate) fn units(&self) -> &dyn UnitNormalizer {
        self.units.as_ref()
    }
}

impl std::fmt::Debug for IntentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentSet")
            .field("intents", &self.intents.len())
            .field("index", &self.index)
            .field("units", &"<unit normalizer>")
            .finish()
    }
}

/// Pattern actually compiled for a REGEX trigger.
///
/// REDIRECT intents replace the entire query, so their pattern is widened to
/// cover it and the groups see the full match.
pub(crate) fn effective_pattern(intent: &Intent, trigger: &Trigger) -> String {
    if intent.action().action_type == ActionType::Redirect {
        format!(".*{}.*", trigger.text())
    } else {
        trigger.text().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ActionTemplate;

    #[test]
    fn indexes_intents_by_match_type_in_registration_order() {
        let set = IntentSet::new(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Contains, "a"),
            Intent::new(ActionTemplate::definition())
                .with_trigger(MatchType::Regex, "b+")
                .with_trigger(MatchType::Contains, "bb"),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Match, "c"),
        ]);

        assert_eq!(set.index().by_type(MatchType::Contains), &[0, 1]);
        assert_eq!(set.index().by_type(MatchType::Regex), &[1]);
        assert_eq!(set.index().by_type(MatchType::Match), &[2]);
        assert!(set.index().by_type(MatchType::PhraseMatch).is_empty());
        assert_eq!(MatchTypeMask::of_intent(&set.intents()[1]), MatchTypeMask::REGEX | MatchTypeMask::CONTAINS);
    }

    #[test]
    fn warms_regex_cache_with_wrapped_redirect_patterns() {
        let redirect = Intent::new(ActionTemplate::redirect("https://example.com/$1"))
            .with_trigger(MatchType::Regex, "help (\\w+)");
        let pattern = effective_pattern(&redirect, &redirect.triggers()[0]);
        assert_eq!(pattern, ".*help (\\w+).*");

        let set = IntentSet::new(vec![redirect]);
        assert_eq!(set.regexes().len(), 1);
        assert!(set.regexes().get(&pattern).is_some());
    }

    #[test]
    fn intent_set_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IntentSet>();
    }
}
