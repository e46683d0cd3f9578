//! Glob patterns over identity triples.
//!
//! Patterns are split on `::` like qualified names:
//! - a `*` segment matches any number of segments (a bare `*` matches anything)
//! - an `@` segment matches exactly one segment
//! - `*` inside a segment matches any run of characters within it
//!
//! Specificity is the number of wildcard tokens; fewer is more specific.

use metaobjects_types::MetaIdentity;
use metaobjects_types::name::PACKAGE_SEPARATOR;
use std::fmt;

const ANY_TOKEN: &str = "*";
const SEGMENT_TOKEN: &str = "@";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    raw: String,
    segments: Vec<String>,
}

impl Glob {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw.split(PACKAGE_SEPARATOR).map(str::to_string).collect();
        Self { raw, segments }
    }

    #[must_use]
    pub fn any() -> Self {
        Self::new(ANY_TOKEN)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        if self.raw == ANY_TOKEN {
            return true;
        }
        let parts: Vec<&str> = value.split(PACKAGE_SEPARATOR).collect();
        match_segments(&self.segments, &parts)
    }

    /// Number of wildcard tokens in the pattern.
    #[must_use]
    pub fn wildcards(&self) -> usize {
        self.segments
            .iter()
            .map(|s| {
                if s == SEGMENT_TOKEN {
                    1
                } else {
                    s.matches('*').count()
                }
            })
            .sum()
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_segments(pattern: &[String], value: &[&str]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return value.is_empty();
    };
    if head == ANY_TOKEN {
        return match_segments(rest, value)
            || (!value.is_empty() && match_segments(pattern, &value[1..]));
    }
    let Some((first, remaining)) = value.split_first() else {
        return false;
    };
    let segment_ok = head == SEGMENT_TOKEN || wildcard_match(head, first);
    segment_ok && match_segments(rest, remaining)
}

/// Matches a single segment where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ti = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// A `(type, subtype, name)` pattern selecting the nodes a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPattern {
    pub meta_type: Glob,
    pub subtype: Glob,
    pub name: Glob,
}

impl TargetPattern {
    #[must_use]
    pub fn new(meta_type: &str, subtype: &str, name: &str) -> Self {
        Self {
            meta_type: Glob::new(meta_type),
            subtype: Glob::new(subtype),
            name: Glob::new(name),
        }
    }

    /// Matches every node.
    #[must_use]
    pub fn any() -> Self {
        Self::new(ANY_TOKEN, ANY_TOKEN, ANY_TOKEN)
    }

    #[must_use]
    pub fn matches(&self, identity: &MetaIdentity) -> bool {
        self.meta_type.matches(&identity.meta_type)
            && self.subtype.matches(&identity.subtype)
            && self.name.matches(&identity.name)
    }

    #[must_use]
    pub fn wildcards(&self) -> usize {
        self.meta_type.wildcards() + self.subtype.wildcards() + self.name.wildcards()
    }
}

impl fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.meta_type, self.subtype, self.name)
    }
}
