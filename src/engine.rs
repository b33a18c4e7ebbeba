//! Matching and resolution engine.
//!
//! This module is the internal core behind [`crate::api`]. It is split into
//! focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! intents ──┐
//!           │  IntentSet::new                 (compiled_intents.rs)
//!           │   - per-match-type index
//!           │   - regex cache warm-up          (regex_cache.rs)
//!           └──────────────┬────────────────
//!                          │
//! query ──> Resolver::run_with_metrics        (resolver.rs)
//!             loop (≤ max_rounds):
//!               find_trigger: 4 passes         (matcher.rs)
//!               activate: template -> action   (activate.rs)
//!               stop on no match / redirect
//!                          │
//!                          v
//!               Vec<ActivatedAction> + RunMetrics (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_intents.rs`: the immutable [`IntentSet`] and its indexes.
//! - `regex_cache.rs`: concurrent memo of compiled REGEX triggers.
//! - `matcher.rs`: precedence passes, whole-word matching, context gating.
//! - `activate.rs`: `$N` substitution, numeric bounds, margins, units,
//!   trigger removal.
//! - `resolver.rs`: the bounded cascading loop.
//! - `metrics.rs`: optional per-round timing and the stop reason.
//!
//! ## Debugging
//!
//! The engine logs through `tracing`: one `debug` event per activation and
//! `trace` events per pass. The CLI enables them with `INTENTIO_LOG=debug`.

#[path = "engine/activate.rs"]
mod activate;
#[path = "engine/compiled_intents.rs"]
mod compiled_intents;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/regex_cache.rs"]
mod regex_cache;
#[path = "engine/resolver.rs"]
mod resolver;


pub use compiled_intents::IntentSet;
pub use metrics::{RoundMetrics, StopReason};
pub use resolver::Resolver;
