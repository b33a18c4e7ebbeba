//! Memoized regex compilation.
//!
//! REGEX triggers are evaluated on every round of every resolve call, so
//! compiled patterns are kept in a concurrent map keyed by the exact pattern
//! text (after REDIRECT wrapping). Reads are lock-free per shard; a pattern
//! that fails to compile is stored as `None` under its own key only, so one
//! malformed trigger never affects the others.

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Default)]
pub struct RegexCache {
    entries: DashMap<String, Option<Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive regex for `pattern`, or `None` if it is malformed.
    ///
    /// `Regex` clones share the compiled program, so handing out owned values
    /// is cheap.
    pub fn get(&self, pattern: &str) -> Option<Regex> {
        if let Some(entry) = self.entries.get(pattern) {
            return entry.value().clone();
        }

        let compiled = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "malformed regex trigger will never match");
                None
            }
        };

        self.entries.entry(pattern.to_string()).or_insert(compiled).value().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_case_insensitive_patterns_once() {
        let cache = RegexCache::new();
        let re = cache.get(r"under (\d+)").unwrap();
        assert!(re.is_match("UNDER 5"));
        cache.get(r"under (\d+)").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn malformed_patterns_do_not_poison_others() {
        let cache = RegexCache::new();
        assert!(cache.get("(unclosed").is_none());
        assert!(cache.get("(unclosed").is_none());
        assert!(cache.get("closed").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn shared_across_threads() {
        let cache = RegexCache::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert!(cache.get(r"\d+ ?gb").is_some()));
            }
        });
        assert_eq!(cache.len(), 1);
    }
}
