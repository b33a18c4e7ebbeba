//! The `$N` back-reference mini-language.
//!
//! Filter bounds, filter values, units, rewrites and redirects may reference
//! capture groups of a REGEX trigger with `$N`. Rather than re-scanning the
//! raw string on every activation, templates are parsed once into a sequence
//! of [`Segment`]s:
//!
//! ```text
//! "less than $1 euro"  ->  [Literal("less than "), Group(1), Literal(" euro")]
//! "$1"                 ->  [Group(1)]
//! "233"                ->  [Literal("233")]
//! ```
//!
//! A `$` that is not followed by at least one ASCII digit stays literal.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Back-reference to capture group `N` (`$0` is the whole match).
    Group(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Capture groups of a regex match, indexed like the regex itself.
///
/// `None` marks a group that exists but did not participate in the match.
pub type Groups = [Option<String>];

impl Template {
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }

            match digits.parse::<usize>() {
                Ok(index) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Group(index));
                }
                Err(_) => {
                    // Lone `$` or an index too large to address any group.
                    literal.push('$');
                    literal.push_str(&digits);
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Template { segments }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() { Template::default() } else { Template { segments: vec![Segment::Literal(text)] } }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_groups(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Group(_)))
    }

    /// Index of the first group reference, if any.
    pub fn first_group(&self) -> Option<usize> {
        self.segments.iter().find_map(|s| match s {
            Segment::Group(i) => Some(*i),
            Segment::Literal(_) => None,
        })
    }

    /// `Some(N)` when the whole template is exactly `$N`.
    pub fn as_group(&self) -> Option<usize> {
        match self.segments.as_slice() {
            [Segment::Group(i)] => Some(*i),
            _ => None,
        }
    }

    /// Expand group references against `groups`.
    ///
    /// Returns `None` if a referenced group is out of range, did not take
    /// part in the match, or no groups are available at all.
    pub fn expand(&self, groups: Option<&Groups>) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(i) => out.push_str(groups?.get(*i)?.as_deref()?),
            }
        }
        Some(out)
    }

    /// Like [`expand`](Self::expand), but references that cannot be resolved
    /// expand to the empty string.
    pub fn expand_lossy(&self, groups: &Groups) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(i) => {
                    if let Some(Some(text)) = groups.get(*i) {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }

    /// Expand and parse the result as a number.
    pub fn resolve_number(&self, groups: Option<&Groups>) -> Option<f64> {
        parse_number(&self.expand(groups)?)
    }
}

/// Lenient numeric parse used for bounds and anchors.
pub fn parse_number(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Group(i) => write!(f, "${i}")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::parse(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(items: &[Option<&str>]) -> Vec<Option<String>> {
        items.iter().map(|g| g.map(str::to_string)).collect()
    }

    #[test]
    fn parses_literals_and_group_references() {
        let t = Template::parse("less than $1 euro");
        assert_eq!(
            t.segments(),
            &[Segment::Literal("less than ".into()), Segment::Group(1), Segment::Literal(" euro".into())]
        );
        assert_eq!(t.first_group(), Some(1));
        assert_eq!(t.as_group(), None);
        assert_eq!(t.to_string(), "less than $1 euro");
    }

    #[test]
    fn lone_dollar_stays_literal() {
        let t = Template::parse("$ and $x");
        assert!(!t.has_groups());
        assert_eq!(t.to_string(), "$ and $x");
    }

    #[test]
    fn whole_group_template() {
        assert_eq!(Template::parse("$12").as_group(), Some(12));
        assert!(Template::parse("").is_empty());
    }

    #[test]
    fn expand_fails_on_missing_groups() {
        let g = groups(&[Some("under 100"), Some("100"), None]);
        assert_eq!(Template::parse("$1").expand(Some(&g[..])).as_deref(), Some("100"));
        assert_eq!(Template::parse("$2").expand(Some(&g[..])), None);
        assert_eq!(Template::parse("$7").expand(Some(&g[..])), None);
        assert_eq!(Template::parse("$1").expand(None), None);
        assert_eq!(Template::parse("233").expand(None).as_deref(), Some("233"));
    }

    #[test]
    fn expand_lossy_drops_missing_groups() {
        let g = groups(&[Some("x"), None]);
        assert_eq!(Template::parse("a$1b$5").expand_lossy(&g), "ab");
    }

    #[test]
    fn resolves_numbers() {
        let g = groups(&[Some("under 100"), Some("100")]);
        assert_eq!(Template::parse("$1").resolve_number(Some(&g[..])), Some(100.0));
        assert_eq!(Template::parse("-$1").resolve_number(Some(&g[..])), Some(-100.0));
        assert_eq!(Template::parse("12.5").resolve_number(None), Some(12.5));
        assert_eq!(Template::parse("cheap").resolve_number(None), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
