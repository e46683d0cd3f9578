//! The qualified-name grammar.
//!
//! Names are `::`-delimited paths. Every segment starts with an ASCII letter
//! followed by letters, digits or `_`. Attribute names may additionally start
//! with the private marker `_`, and `loader`/`view` names may contain `-`.

use crate::{Error, Result, TYPE_ATTR};

/// Separates package segments from each other and from the short name.
pub const PACKAGE_SEPARATOR: &str = "::";

/// Prefix marking an attribute as private (not visible through inheritance).
pub const PRIVATE_MARKER: char = '_';

const PARENT_PREFIX: &str = "..::";

/// Splits a name into `(package, short_name)`. The package is empty for bare names.
#[must_use]
pub fn split_qualified(name: &str) -> (&str, &str) {
    match name.rfind(PACKAGE_SEPARATOR) {
        Some(idx) => (&name[..idx], &name[idx + PACKAGE_SEPARATOR.len()..]),
        None => ("", name),
    }
}

/// Joins a package and a short name. An empty package yields the bare name.
#[must_use]
pub fn qualify(package: &str, short_name: &str) -> String {
    if package.is_empty() {
        short_name.to_string()
    } else {
        format!("{package}{PACKAGE_SEPARATOR}{short_name}")
    }
}

/// True if the name contains a package separator.
#[must_use]
pub fn is_qualified(name: &str) -> bool {
    name.contains(PACKAGE_SEPARATOR)
}

/// True if the short name starts with the private marker.
#[must_use]
pub fn is_private(name: &str) -> bool {
    split_qualified(name).1.starts_with(PRIVATE_MARKER)
}

/// True if the value is a package-relative reference (`::x` or `..::x`).
#[must_use]
pub fn is_relative(value: &str) -> bool {
    value.starts_with(PACKAGE_SEPARATOR) || value.starts_with(PARENT_PREFIX)
}

/// Validates a possibly-qualified name for a node of the given type.
pub fn validate_name(meta_type: &str, name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }

    let allow_hyphen = matches!(meta_type, "loader" | "view");
    let segments: Vec<&str> = name.split(PACKAGE_SEPARATOR).collect();
    let last = segments.len() - 1;

    for (idx, segment) in segments.iter().enumerate() {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(invalid("empty package segment"));
        };
        let private_ok = idx == last && meta_type == TYPE_ATTR && first == PRIVATE_MARKER;
        if !first.is_ascii_alphabetic() && !private_ok {
            return Err(invalid(&format!(
                "segment '{segment}' must start with a letter"
            )));
        }
        if let Some(bad) =
            chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || (allow_hyphen && *c == '-')))
        {
            return Err(invalid(&format!(
                "segment '{segment}' contains illegal character '{bad}'"
            )));
        }
    }
    Ok(())
}

/// Expands a package-relative value against a base package.
///
/// `::x` appends to the base, each leading `..::` drops one trailing base
/// segment. Values that are not relative are returned unchanged.
pub fn expand_package(base: &str, value: &str) -> Result<String> {
    if let Some(rest) = value.strip_prefix(PACKAGE_SEPARATOR) {
        return Ok(qualify(base, rest));
    }
    if !value.starts_with(PARENT_PREFIX) {
        return Ok(value.to_string());
    }

    let mut rest = value;
    let mut ups = 0usize;
    while let Some(stripped) = rest.strip_prefix(PARENT_PREFIX) {
        rest = stripped;
        ups += 1;
    }

    let mut segments: Vec<&str> = if base.is_empty() {
        Vec::new()
    } else {
        base.split(PACKAGE_SEPARATOR).collect()
    };
    if ups > segments.len() {
        return Err(Error::InvalidPackage {
            base: base.to_string(),
            value: value.to_string(),
            reason: format!("climbs {ups} levels but base has {}", segments.len()),
        });
    }
    segments.truncate(segments.len() - ups);
    Ok(qualify(&segments.join(PACKAGE_SEPARATOR), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_bare_name() {
        assert_eq!(split_qualified("Car"), ("", "Car"));
    }

    #[test]
    fn split_uses_last_separator() {
        assert_eq!(split_qualified("acme::fleet::Car"), ("acme::fleet", "Car"));
    }

    #[test]
    fn private_marker_on_short_name_only() {
        assert!(is_private("_isAbstract"));
        assert!(is_private("acme::_hidden"));
        assert!(!is_private("_acme::visible"));
    }
}
