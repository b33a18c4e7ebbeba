//! Template → activation.
//!
//! Turns the [`TriggerHit`] of a round into an [`ActivatedAction`]:
//!
//! ```text
//! REWRITE     REGEX: every match -> template with groups, lower-cased
//!             else : trigger text -> template text
//! REDIRECT    REGEX: (wrapped) match -> template with groups
//!             else : template verbatim
//! DEFINITION  filters: min/max, values (numeric anchors -> margin window),
//!             optional unit normalization; then trigger removal
//! ```
//!
//! Resolution failures (missing groups, unparsable numbers) only leave the
//! affected field unresolved; an activation is always produced.

use super::matcher::{RegexHit, TriggerHit, capture_groups};
use crate::activation::{ActivatedAction, ActivatedFilter};
use crate::api::Options;
use crate::intent::{ActionType, FilterTemplate};
use crate::template::{Groups, Template, parse_number};
use crate::units::UnitNormalizer;

pub(crate) fn activate(hit: &TriggerHit<'_>, query: &str, units: &dyn UnitNormalizer, options: &Options) -> ActivatedAction {
    let template = hit.intent.action();
    let mut action = ActivatedAction::from_template(hit.intent.id(), template, hit.match_type, hit.trigger, query);

    match template.action_type {
        ActionType::Rewrite => {
            let rewrite = template.rewrite.clone().unwrap_or_default();
            let rewritten = match &hit.regex {
                Some(regex) => substitute(regex, query, &rewrite).to_lowercase(),
                None => query.replace(hit.trigger.text(), &rewrite.to_string()),
            };
            action.rewrite = Some(rewritten.clone());
            action.modified_query = rewritten;
        }
        ActionType::Redirect => {
            let redirect = template.redirect.clone().unwrap_or_default();
            let target = match &hit.regex {
                Some(regex) => substitute(regex, query, &redirect),
                None => redirect.to_string(),
            };
            action.redirect = Some(target);
        }
        ActionType::Definition => {
            let groups = hit.regex.as_ref().map(|r| r.groups.as_slice());
            action.filters =
                template.filters.iter().map(|filter| activate_filter(filter, groups, units, options)).collect();

            if template.remove_trigger {
                let needle = match &hit.regex {
                    Some(regex) => regex.matched(),
                    None => hit.trigger.text(),
                };
                action.modified_query = remove_occurrences(query, needle);
            }
        }
    }

    action
}

/// Replace every match of the hit's regex in `query` by `template`, expanded
/// with that match's own groups.
fn substitute(hit: &RegexHit, query: &str, template: &Template) -> String {
    hit.regex.replace_all(query, |caps: &regex::Captures<'_>| template.expand_lossy(&capture_groups(caps))).into_owned()
}

fn activate_filter(
    template: &FilterTemplate,
    groups: Option<&Groups>,
    units: &dyn UnitNormalizer,
    options: &Options,
) -> ActivatedFilter {
    let mut filter = ActivatedFilter::from_template(template);
    filter.min = template.min.as_ref().and_then(|d| d.resolve_number(groups));
    filter.max = template.max.as_ref().and_then(|d| d.resolve_number(groups));
    filter.unit = template.unit.as_ref().and_then(|u| u.expand(groups));

    for value in template.values() {
        let (Some(index), Some(groups)) = (value.first_group(), groups) else {
            // Literal entry, or a reference that only a REGEX trigger can fill.
            filter.push_value(value.to_string());
            continue;
        };

        let Some(text) = groups.get(index).and_then(|g| g.as_deref()) else {
            tracing::debug!(key = %template.key, group = index, "filter value references a missing group");
            continue;
        };

        match parse_number(text) {
            Some(anchor) => {
                let anchor = normalize_anchor(anchor, template, groups, units, options, &mut filter);
                let margin = template.margin.unwrap_or(options.default_margin);
                let (low, high) = (anchor - anchor * margin, anchor + anchor * margin);
                filter.min = Some(low.min(high));
                filter.max = Some(low.max(high));
            }
            None => filter.push_value(value.expand_lossy(groups)),
        }
    }

    filter
}

/// Convert a numeric anchor through the unit normalizer when the filter's unit
/// is exactly a capture-group reference; records the resulting unit on `filter`.
fn normalize_anchor(
    anchor: f64,
    template: &FilterTemplate,
    groups: &Groups,
    units: &dyn UnitNormalizer,
    options: &Options,
    filter: &mut ActivatedFilter,
) -> f64 {
    let Some(index) = template.unit.as_ref().and_then(Template::as_group) else {
        return anchor;
    };
    let Some(token) = groups.get(index).and_then(|g| g.as_deref()) else {
        return anchor;
    };

    match units.translate(token, &options.language) {
        Some(canonical) => {
            let normalized = units.normalize(anchor, &canonical);
            filter.unit = Some(units.base_unit(&canonical).unwrap_or(canonical));
            normalized
        }
        None => {
            tracing::debug!(token, language = %options.language, "unit token has no translation");
            filter.unit = Some(token.to_string());
            anchor
        }
    }
}

/// Delete every space-delimited run containing `needle`, then tidy whitespace.
///
/// ```text
/// remove_occurrences("I want cheap laptops", "cheap") == "I want laptops"
/// remove_occurrences("super-cheap tvs", "cheap")      == "tvs"
/// ```
pub(crate) fn remove_occurrences(query: &str, needle: &str) -> String {
    if needle.is_empty() {
        return collapse_whitespace(query);
    }

    let mut out = String::with_capacity(query.len());
    let mut rest = query;
    while let Some(start) = rest.find(needle) {
        let before = &rest[..start];
        let keep = before.rfind(' ').map_or(0, |i| i + 1);
        out.push_str(&before[..keep]);

        let after = &rest[start + needle.len()..];
        let skip = after.find(' ').unwrap_or(after.len());
        rest = &after[skip..];
    }
    out.push_str(rest);

    collapse_whitespace(&out)
}

fn collapse_whitespace(text: &str) -> String {
    regex!(r"\s{2,}").replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_trigger_with_adjacent_characters() {
        assert_eq!(remove_occurrences("I want cheap laptops", "cheap"), "I want laptops");
        assert_eq!(remove_occurrences("super-cheap tvs", "cheap"), "tvs");
        assert_eq!(remove_occurrences("cheap cheap cheap", "cheap"), "");
        assert_eq!(remove_occurrences("laptops under 100€", "under 100€"), "laptops");
        assert_eq!(remove_occurrences("no match here", "cheap"), "no match here");
        assert_eq!(remove_occurrences("  spaced   out ", ""), "spaced out");
    }

    #[test]
    fn multi_word_needles_expand_on_both_ends() {
        assert_eq!(remove_occurrences("i want xunder 100€s now", "under 100€"), "i want now");
    }
}
