//! Typed attribute values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The value kinds an attribute can hold. Each maps to one `attr` subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    String,
    Int,
    Long,
    Double,
    Boolean,
    StringArray,
    Class,
}

impl ValueKind {
    /// All kinds, in registration order.
    pub const ALL: [ValueKind; 7] = [
        ValueKind::String,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Double,
        ValueKind::Boolean,
        ValueKind::StringArray,
        ValueKind::Class,
    ];

    /// The `attr` subtype carrying values of this kind.
    #[must_use]
    pub const fn subtype(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Boolean => "boolean",
            ValueKind::StringArray => "stringArray",
            ValueKind::Class => "class",
        }
    }

    #[must_use]
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.subtype() == subtype)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtype())
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_subtype(s).ok_or_else(|| Error::UnknownValueKind(s.to_string()))
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttrValue {
    String(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    StringArray(Vec<String>),
    Class(String),
}

impl AttrValue {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            AttrValue::String(_) => ValueKind::String,
            AttrValue::Int(_) => ValueKind::Int,
            AttrValue::Long(_) => ValueKind::Long,
            AttrValue::Double(_) => ValueKind::Double,
            AttrValue::Boolean(_) => ValueKind::Boolean,
            AttrValue::StringArray(_) => ValueKind::StringArray,
            AttrValue::Class(_) => ValueKind::Class,
        }
    }

    /// Infers a value from the shape of a literal.
    ///
    /// `true`/`false` become booleans, integers become `Int` (or `Long` when
    /// they overflow 32 bits), decimals become `Double`, `[a,b]` becomes a
    /// string array and anything else stays a string.
    #[must_use]
    pub fn sniff(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return AttrValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return AttrValue::Boolean(false);
        }
        if looks_integral(trimmed) {
            if let Ok(v) = trimmed.parse::<i32>() {
                return AttrValue::Int(v);
            }
            if let Ok(v) = trimmed.parse::<i64>() {
                return AttrValue::Long(v);
            }
            return AttrValue::String(text.to_string());
        }
        if looks_decimal(trimmed) {
            if let Ok(v) = trimmed.parse::<f64>() {
                return AttrValue::Double(v);
            }
        }
        if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return AttrValue::StringArray(split_list(inner));
        }
        AttrValue::String(text.to_string())
    }

    /// Parses a literal as a specific kind.
    pub fn parse_as(kind: ValueKind, text: &str) -> Result<Self> {
        let invalid = || Error::InvalidLiteral {
            kind,
            text: text.to_string(),
        };
        let trimmed = text.trim();
        Ok(match kind {
            ValueKind::String => AttrValue::String(text.to_string()),
            ValueKind::Class => AttrValue::Class(trimmed.to_string()),
            ValueKind::Int => AttrValue::Int(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Long => AttrValue::Long(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Double => AttrValue::Double(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    AttrValue::Boolean(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    AttrValue::Boolean(false)
                } else {
                    return Err(invalid());
                }
            }
            ValueKind::StringArray => {
                let inner = trimmed
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .unwrap_or(trimmed);
                AttrValue::StringArray(split_list(inner))
            }
        })
    }

    /// Converts this value to another kind, going through its text form.
    pub fn convert(self, kind: ValueKind) -> Result<Self> {
        if self.kind() == kind {
            return Ok(self);
        }
        match (self, kind) {
            (AttrValue::Int(v), ValueKind::Long) => Ok(AttrValue::Long(i64::from(v))),
            (AttrValue::Int(v), ValueKind::Double) => Ok(AttrValue::Double(f64::from(v))),
            (AttrValue::StringArray(items), ValueKind::String) => {
                Ok(AttrValue::String(items.join(",")))
            }
            (AttrValue::String(s), ValueKind::StringArray) => {
                Ok(AttrValue::StringArray(split_list(&s)))
            }
            (other, kind) => AttrValue::parse_as(kind, &other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Class(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(i64::from(*v)),
            AttrValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) | AttrValue::Class(s) => f.write_str(s),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Long(v) => write!(f, "{v}"),
            AttrValue::Double(v) => write!(f, "{v}"),
            AttrValue::Boolean(v) => write!(f, "{v}"),
            AttrValue::StringArray(items) => f.write_str(&items.join(",")),
        }
    }
}

fn looks_integral(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn looks_decimal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let Some((int_part, frac)) = mantissa.split_once('.') else {
        return false;
    };
    let mantissa_ok = int_part.bytes().all(|b| b.is_ascii_digit())
        && !frac.is_empty()
        && frac.bytes().all(|b| b.is_ascii_digit());
    let exponent_ok = exponent.is_none_or(|e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    });
    mantissa_ok && exponent_ok
}

fn split_list(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
