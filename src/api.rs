use crate::activation::ActivatedAction;
use crate::context::ContextMatcher;
use crate::engine::{IntentSet, Resolver, RoundMetrics, StopReason};
use crate::intent::{DEFAULT_MARGIN, IntentId, MatchType};
use std::time::Duration;

/// Default bound on cascading rounds per resolve call.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Options that affect resolution behavior.
#[derive(Debug, Clone)]
pub struct Options {
    /// ISO 639-1 code passed to unit translation.
    pub language: String,
    /// Upper bound on rounds; guards against cyclic rewrite rules.
    pub max_rounds: usize,
    /// Margin used for numeric anchors whose filter declares none.
    pub default_margin: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options { language: "en".to_string(), max_rounds: DEFAULT_MAX_ROUNDS, default_margin: DEFAULT_MARGIN }
    }
}

/// Result from [`resolve_with`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The query as received.
    pub query: String,
    /// Activations in firing order. A REDIRECT, if any, is last.
    pub actions: Vec<ActivatedAction>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl Resolution {
    /// Query text after the last activation (the input if nothing fired).
    pub fn final_query(&self) -> &str {
        self.actions.last().map(|a| a.modified_query.as_str()).unwrap_or(&self.query)
    }

    /// The redirect that terminated resolution, if any.
    pub fn redirect(&self) -> Option<&str> {
        self.actions.last().filter(|a| a.is_redirect()).and_then(|a| a.redirect.as_deref())
    }
}

/// A compact per-round trace used in verbose output.
#[derive(Debug, Clone)]
pub struct RoundTrace {
    pub round: usize,
    pub query: String,
    pub match_type: Option<MatchType>,
    pub intent: Option<IntentId>,
    pub trigger: Option<String>,
    pub duration: Duration,
}

/// Additional details returned by [`resolve_verbose_with`].
#[derive(Debug, Clone)]
pub struct ResolutionDetails {
    pub total: Duration,
    pub rounds: Vec<RoundTrace>,
    pub stop: StopReason,
    /// Number of intents in the set that was consulted.
    pub intents: usize,
}

/// Result from [`resolve_verbose_with`].
#[derive(Debug, Clone)]
pub struct ResolutionVerbose {
    pub query: String,
    pub actions: Vec<ActivatedAction>,
    pub elapsed: Duration,
    pub details: ResolutionDetails,
}

/// Resolve `query` against `intents` with every intent context-eligible and
/// default [`Options`].
///
/// # Example
/// ```
/// use intentio::{ActionTemplate, Intent, IntentSet, MatchType, resolve};
///
/// let set = IntentSet::new(vec![
///     Intent::new(ActionTemplate::rewrite("television")).with_trigger(MatchType::Contains, "tv"),
/// ]);
/// let actions = resolve(&set, "cheap tv");
/// assert_eq!(actions[0].modified_query, "cheap television");
/// ```
pub fn resolve(intents: &IntentSet, query: &str) -> Vec<ActivatedAction> {
    resolve_with(intents, query, None, &Options::default()).actions
}

/// Resolve `query` with an optional context matcher and explicit options.
pub fn resolve_with(
    intents: &IntentSet,
    query: &str,
    matcher: Option<&dyn ContextMatcher>,
    options: &Options,
) -> Resolution {
    let run = Resolver::new(intents, matcher, options).run_with_metrics(query);
    Resolution { query: query.to_string(), actions: run.actions, elapsed: run.metrics.total }
}

/// Resolve `query` and return a per-round trace.
///
/// The default [`resolve_with`] path does not keep these traces.
pub fn resolve_verbose_with(
    intents: &IntentSet,
    query: &str,
    matcher: Option<&dyn ContextMatcher>,
    options: &Options,
) -> ResolutionVerbose {
    let run = Resolver::new(intents, matcher, options).run_with_metrics(query);

    let rounds = run.metrics.rounds.into_iter().enumerate().map(|(round, m)| round_trace(round, m)).collect();
    let details =
        ResolutionDetails { total: run.metrics.total, rounds, stop: run.metrics.stop, intents: intents.len() };

    ResolutionVerbose { query: query.to_string(), actions: run.actions, elapsed: run.metrics.total, details }
}

impl IntentSet {
    /// Resolve `query` with default options.
    ///
    /// `matcher` decides context eligibility; `None` makes every intent eligible.
    pub fn resolve(&self, query: &str, matcher: Option<&dyn ContextMatcher>) -> Vec<ActivatedAction> {
        Resolver::new(self, matcher, &Options::default()).run(query)
    }
}

fn round_trace(round: usize, m: RoundMetrics) -> RoundTrace {
    RoundTrace {
        round: round + 1,
        query: m.query,
        match_type: m.match_type,
        intent: m.intent,
        trigger: m.trigger,
        duration: m.duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionTemplate, FilterTemplate, Intent};

    fn sample_set() -> IntentSet {
        IntentSet::new(vec![
            Intent::new(ActionTemplate::rewrite("television")).with_trigger(MatchType::PhraseMatch, "tv"),
            Intent::new(ActionTemplate::definition().with_filter(FilterTemplate::new("price").with_max("300")))
                .with_trigger(MatchType::Contains, "cheap"),
        ])
    }

    #[test]
    fn resolve_with_returns_actions_and_final_query() {
        let set = sample_set();
        let res = resolve_with(&set, "cheap tv", None, &Options::default());

        assert_eq!(res.query, "cheap tv");
        assert_eq!(res.actions.len(), 2);
        assert_eq!(res.final_query(), "television");
        assert_eq!(res.redirect(), None);
        assert!(res.elapsed >= Duration::ZERO);
    }

    #[test]
    fn resolve_verbose_includes_rounds_and_stop_reason() {
        let set = sample_set();
        let res = resolve_verbose_with(&set, "cheap tv", None, &Options::default());

        assert_eq!(res.elapsed, res.details.total);
        assert_eq!(res.details.intents, 2);
        // two activations plus the final round that found nothing
        assert_eq!(res.details.rounds.len(), 3);
        assert_eq!(res.details.rounds[0].match_type, Some(MatchType::PhraseMatch));
        assert_eq!(res.details.rounds[1].query, "cheap television");
        assert_eq!(res.details.rounds[2].intent, None);
        assert_eq!(res.details.stop, StopReason::NoMatch);
    }

    #[test]
    fn options_defaults() {
        let options = Options::default();
        assert_eq!(options.language, "en");
        assert_eq!(options.max_rounds, 10);
        assert_eq!(options.default_margin, 0.05);
    }

    #[test]
    fn method_and_free_function_agree() {
        let set = sample_set();
        assert_eq!(set.resolve("cheap tv", None), resolve(&set, "cheap tv"));
    }
}
