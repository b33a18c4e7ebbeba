//! The cascading resolution loop.
//!
//! Resolution is a bounded state machine over `(query, rounds_left)`:
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            v                                              │
//! query ─> find_trigger (4 passes) ──none──> stop: NoMatch  │
//!            │                                              │
//!            └─hit─> activate ─> push action                │
//!                       │                                   │
//!                       ├─ REDIRECT ──────────> stop: Redirect
//!                       ├─ rounds exhausted ──> stop: RoundLimit
//!                       └─ query = modified_query ──────────┘
//! ```
//!
//! Every value mutated here (the working query, the output list, the
//! activations and the context verdict memo) is local to one run; the
//! [`IntentSet`] is only read. Output is therefore a pure function of the
//! query, the ruleset and the collaborators' answers.

use super::activate::activate;
use super::compiled_intents::IntentSet;
use super::matcher::{ContextGate, find_trigger};
use super::metrics::{RoundMetrics, RunMetrics, RunResult, StopReason};
use crate::activation::ActivatedAction;
use crate::api::Options;
use crate::context::ContextMatcher;
use std::time::Instant;

/// Resolver orchestrates one resolve call against an [`IntentSet`].
///
/// Usage: `Resolver::new(&set, matcher, &options).run(query)`.
pub struct Resolver<'a> {
    set: &'a IntentSet,
    matcher: Option<&'a dyn ContextMatcher>,
    options: &'a Options,
}

impl<'a> Resolver<'a> {
    pub fn new(set: &'a IntentSet, matcher: Option<&'a dyn ContextMatcher>, options: &'a Options) -> Self {
        Resolver { set, matcher, options }
    }

    /// Resolve `query` and return per-round timing details alongside the actions.
    pub fn run_with_metrics(&self, query: &str) -> RunResult {
        let total_start = Instant::now();
        let mut query = query.to_string();
        let mut actions: Vec<ActivatedAction> = Vec::new();
        let mut rounds: Vec<RoundMetrics> = Vec::new();
        let mut stop = StopReason::RoundLimit;

        for round in 0..self.options.max_rounds {
            let round_start = Instant::now();
            let mut gate = ContextGate::new(self.matcher, self.set.len());

            let Some(hit) = find_trigger(self.set, &query, &mut gate) else {
                rounds.push(RoundMetrics {
                    query: query.clone(),
                    match_type: None,
                    intent: None,
                    trigger: None,
                    duration: round_start.elapsed(),
                });
                stop = StopReason::NoMatch;
                break;
            };

            let action = activate(&hit, &query, self.set.units(), self.options);
            tracing::debug!(
                round,
                intent = %action.intent_id,
                pass = %action.match_type,
                trigger = action.trigger.text(),
                action = ?action.action_type,
                modified_query = %action.modified_query,
                "intent activated"
            );

            rounds.push(RoundMetrics {
                query: query.clone(),
                match_type: Some(hit.match_type),
                intent: Some(action.intent_id),
                trigger: Some(hit.trigger.text().to_string()),
                duration: round_start.elapsed(),
            });

            let redirect = action.is_redirect();
            query.clone_from(&action.modified_query);
            actions.push(action);

            if redirect {
                stop = StopReason::Redirect;
                break;
            }
        }

        if stop == StopReason::RoundLimit {
            tracing::debug!(max_rounds = self.options.max_rounds, "round limit reached, check for cyclic rewrite rules");
        }

        RunResult { actions, metrics: RunMetrics { total: total_start.elapsed(), rounds, stop } }
    }

    /// Resolve `query`.
    ///
    /// Convenience wrapper that discards timing details.
    pub fn run(&self, query: &str) -> Vec<ActivatedAction> {
        self.run_with_metrics(query).actions
    }
}
