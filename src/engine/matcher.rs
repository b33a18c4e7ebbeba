//! Four-pass trigger matching.
//!
//! A round scans the query in strict precedence order and stops at the first
//! trigger that fires:
//!
//! ```text
//! pass 1  MATCH         trigger == query
//! pass 2  PHRASE_MATCH  trigger occurs as a whole word (case-sensitive)
//! pass 3  CONTAINS      trigger is a substring
//! pass 4  REGEX         case-insensitive search (REDIRECT: `.*pattern.*`)
//! ```
//!
//! Within a pass intents are visited in registration order, and within an
//! intent its triggers in descending-length order. Specificity is therefore
//! only compared inside one intent: across intents of the same tier the
//! first-registered one wins.
//!
//! Triggers with empty text only ever fire in the MATCH pass (against an
//! empty query); in every other pass they would match everything.

use super::compiled_intents::{IntentIdx, IntentSet, effective_pattern};
use crate::context::ContextMatcher;
use crate::intent::{Intent, MatchType, Trigger};
use regex::{Captures, Regex};

/// The first trigger that fired in a round.
#[derive(Debug)]
pub(crate) struct TriggerHit<'a> {
    pub intent: &'a Intent,
    pub trigger: &'a Trigger,
    pub match_type: MatchType,
    /// Present for REGEX hits only.
    pub regex: Option<RegexHit>,
}

/// A REGEX hit: the compiled pattern and the groups of its first match.
#[derive(Debug)]
pub(crate) struct RegexHit {
    pub regex: Regex,
    pub groups: Vec<Option<String>>,
}

impl RegexHit {
    /// Text of the whole first match.
    pub fn matched(&self) -> &str {
        self.groups.first().and_then(|g| g.as_deref()).unwrap_or("")
    }
}

pub(crate) fn capture_groups(caps: &Captures<'_>) -> Vec<Option<String>> {
    caps.iter().map(|m| m.map(|m| m.as_str().to_string())).collect()
}

/// Per-round memo of context-matcher verdicts.
///
/// The matcher is consulted at most once per intent per round, no matter how
/// many passes visit the intent.
pub(crate) struct ContextGate<'m> {
    matcher: Option<&'m dyn ContextMatcher>,
    verdicts: Vec<Option<bool>>,
}

impl<'m> ContextGate<'m> {
    pub fn new(matcher: Option<&'m dyn ContextMatcher>, intents: usize) -> Self {
        ContextGate { matcher, verdicts: vec![None; intents] }
    }

    fn allows(&mut self, idx: IntentIdx, intent: &Intent) -> bool {
        let Some(matcher) = self.matcher else {
            return true;
        };
        *self.verdicts[idx].get_or_insert_with(|| matcher.matches(intent.context()))
    }
}

/// Run the four passes over `query` and return the first trigger that fires.
pub(crate) fn find_trigger<'a>(set: &'a IntentSet, query: &str, gate: &mut ContextGate<'_>) -> Option<TriggerHit<'a>> {
    for match_type in MatchType::PRECEDENCE {
        for &idx in set.index().by_type(match_type) {
            let intent = set.intent(idx);
            if !gate.allows(idx, intent) {
                continue;
            }

            for trigger in intent.triggers().iter().filter(|t| t.match_type() == match_type) {
                if let Some(hit) = try_trigger(set, intent, trigger, query) {
                    tracing::trace!(pass = %match_type, intent = %intent.id(), trigger = trigger.text(), "trigger fired");
                    return Some(hit);
                }
            }
        }
        tracing::trace!(pass = %match_type, "no trigger fired");
    }
    None
}

fn try_trigger<'a>(set: &IntentSet, intent: &'a Intent, trigger: &'a Trigger, query: &str) -> Option<TriggerHit<'a>> {
    let text = trigger.text();
    let match_type = trigger.match_type();

    let fired = match match_type {
        MatchType::Match => text == query,
        MatchType::PhraseMatch => !text.is_empty() && contains_word(query, text),
        MatchType::Contains => !text.is_empty() && query.contains(text),
        MatchType::Regex => {
            if text.is_empty() {
                return None;
            }
            let regex = set.regexes().get(&effective_pattern(intent, trigger))?;
            let groups = capture_groups(&regex.captures(query)?);
            return Some(TriggerHit { intent, trigger, match_type, regex: Some(RegexHit { regex, groups }) });
        }
    };

    fired.then_some(TriggerHit { intent, trigger, match_type, regex: None })
}

/// Case-sensitive whole-word containment.
///
/// An occurrence counts when the characters on both sides are absent or are
/// neither letters nor digits.
pub(crate) fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        before.is_none_or(|c| !c.is_alphanumeric()) && after.is_none_or(|c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ActionTemplate;
    use crate::IntentContext;
    use std::cell::Cell;

    fn set_of(intents: Vec<Intent>) -> IntentSet {
        IntentSet::new(intents)
    }

    #[test]
    fn whole_word_containment() {
        assert!(contains_word("cheap laptops", "cheap"));
        assert!(contains_word("really cheap!", "cheap"));
        assert!(contains_word("(cheap)", "cheap"));
        assert!(!contains_word("cheapest laptops", "cheap"));
        assert!(!contains_word("Cheap laptops", "cheap"));
        // a later occurrence may qualify even if the first does not
        assert!(contains_word("cheapest or cheap", "cheap"));
        assert!(contains_word("über alles", "über"));
        assert!(!contains_word("5tb", "tb"));
    }

    #[test]
    fn earlier_pass_beats_earlier_intent() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Contains, "tv"),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Match, "cheap tv"),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        let hit = find_trigger(&set, "cheap tv", &mut gate).unwrap();
        assert_eq!(hit.match_type, MatchType::Match);
        assert_eq!(hit.intent.id(), set.intents()[1].id());
    }

    #[test]
    fn first_registered_intent_wins_within_a_pass() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Contains, "tv"),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Contains, "cheap tv"),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        let hit = find_trigger(&set, "cheap tv", &mut gate).unwrap();
        assert_eq!(hit.trigger.text(), "tv");
    }

    #[test]
    fn longer_trigger_wins_within_an_intent() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition())
                .with_trigger(MatchType::Contains, "tv")
                .with_trigger(MatchType::Contains, "cheap tv"),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        let hit = find_trigger(&set, "a cheap tv", &mut gate).unwrap();
        assert_eq!(hit.trigger.text(), "cheap tv");
    }

    #[test]
    fn regex_hits_carry_groups_and_ignore_case() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Regex, r"under (\d+)(€)?"),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        let hit = find_trigger(&set, "UNDER 100 please", &mut gate).unwrap();
        let regex = hit.regex.unwrap();
        assert_eq!(regex.matched(), "UNDER 100");
        assert_eq!(regex.groups, vec![Some("UNDER 100".to_string()), Some("100".to_string()), None]);
    }

    #[test]
    fn malformed_regex_is_skipped() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Regex, "(broken"),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Regex, "work(s|ing)"),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        let hit = find_trigger(&set, "(broken but working", &mut gate).unwrap();
        assert_eq!(hit.trigger.text(), "work(s|ing)");
    }

    #[test]
    fn empty_triggers_only_match_empty_queries() {
        let set = set_of(vec![
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Contains, ""),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Regex, ""),
        ]);
        let mut gate = ContextGate::new(None, set.len());
        assert!(find_trigger(&set, "anything", &mut gate).is_none());
    }

    #[test]
    fn context_matcher_is_consulted_once_per_intent() {
        let mut rejected = IntentContext::new();
        rejected.insert("audience".into(), "kids".into());

        let set = set_of(vec![
            Intent::new(ActionTemplate::definition())
                .with_context(rejected)
                .with_trigger(MatchType::Match, "x")
                .with_trigger(MatchType::PhraseMatch, "tv")
                .with_trigger(MatchType::Contains, "tv")
                .with_trigger(MatchType::Regex, "tv"),
            Intent::new(ActionTemplate::definition()).with_trigger(MatchType::Regex, "t.$"),
        ]);

        let calls = Cell::new(0);
        let matcher = |ctx: &IntentContext| {
            calls.set(calls.get() + 1);
            ctx.is_empty()
        };
        let mut gate = ContextGate::new(Some(&matcher), set.len());
        let hit = find_trigger(&set, "tv", &mut gate).unwrap();

        assert_eq!(hit.intent.id(), set.intents()[1].id());
        assert_eq!(calls.get(), 2);
    }
}
