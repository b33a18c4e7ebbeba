//! A rule-based search intent engine.
//!
//! Given a free-text query and a set of [`Intent`]s, decide which intents fire
//! and in what order, and produce concrete [`ActivatedAction`]s: query
//! rewrites, redirects, or filter/sort directives whose numeric bounds are
//! resolved from regex capture groups, margins and units.
//!
//! ```
//! use intentio::{ActionTemplate, FilterTemplate, Intent, IntentSet, MatchType};
//!
//! let set = IntentSet::new(vec![
//!     Intent::new(ActionTemplate::definition().with_filter(FilterTemplate::new("price").with_max("$1")))
//!         .with_trigger(MatchType::Regex, r"under (\d+)€"),
//! ]);
//!
//! let actions = set.resolve("I want under 100€ laptops", None);
//! assert_eq!(actions[0].filters[0].max, Some(100.0));
//! assert_eq!(actions[0].modified_query, "I want laptops");
//! ```

#[macro_use]
mod macros;
mod activation;
mod api;
mod context;
mod engine;
mod error;
mod intent;
pub mod ruleset;
mod template;
mod units;

pub use activation::{ActivatedAction, ActivatedFilter};
pub use api::{
    DEFAULT_MAX_ROUNDS, Options, Resolution, ResolutionDetails, ResolutionVerbose, RoundTrace, resolve,
    resolve_verbose_with, resolve_with,
};
pub use context::{ContextMatcher, RequestContext};
pub use engine::{IntentSet, StopReason};
pub use error::{IntentError, Result};
pub use intent::{
    ActionTemplate, ActionType, DEFAULT_MARGIN, FilterTemplate, Intent, IntentContext, IntentId, MatchType, Placement,
    Sort, SortDirection, Trigger,
};
pub use template::{Segment, Template};
pub use units::{UnitFamily, UnitNormalizer, UnitTable};
