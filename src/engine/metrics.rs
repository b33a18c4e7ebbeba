//! Resolver run metrics.
//!
//! A small set of structs used to observe and debug the cascading loop.
//!
//! The intended usage is:
//!
//! - `Resolver::run` for normal operation.
//! - `Resolver::run_with_metrics` for profiling, debugging rule cascades, and
//!   inspecting which intent fired in which round.
//!
//! Timing is always collected; `run` simply drops it.

use crate::activation::ActivatedAction;
use crate::intent::{IntentId, MatchType};
use std::time::Duration;

/// Why the cascading loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A round ran all four passes without a match.
    NoMatch,
    /// A REDIRECT fired.
    Redirect,
    /// The round budget was exhausted.
    RoundLimit,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::NoMatch => "no match",
            StopReason::Redirect => "redirect",
            StopReason::RoundLimit => "round limit",
        }
    }
}

/// One round of the loop.
#[derive(Debug, Clone)]
pub struct RoundMetrics {
    /// Query scanned in this round.
    pub query: String,
    /// Pass that fired, if any.
    pub match_type: Option<MatchType>,
    pub intent: Option<IntentId>,
    pub trigger: Option<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub total: Duration,
    pub rounds: Vec<RoundMetrics>,
    pub stop: StopReason,
}

/// Resolver output bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub actions: Vec<ActivatedAction>,
    pub metrics: RunMetrics,
}
