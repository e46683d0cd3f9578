//! Format-agnostic source documents.
//!
//! Readers (see [`json`](crate::json)) turn a concrete file format into these
//! types; the merger only ever sees a [`SourceDocument`].

use metaobjects_types::{AttrValue, ValueKind};
use std::fmt;

/// A scalar or list literal as written in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
}

impl Literal {
    /// Infers a typed value from the literal's shape. Text is sniffed.
    #[must_use]
    pub fn sniff(&self) -> AttrValue {
        match self {
            Literal::Text(text) => AttrValue::sniff(text),
            Literal::Bool(b) => AttrValue::Boolean(*b),
            Literal::Integer(i) => integer_value(*i),
            Literal::Float(f) => AttrValue::Double(*f),
            Literal::List(items) => AttrValue::StringArray(items.clone()),
        }
    }

    /// Interprets the literal as a value of `kind`.
    pub fn to_value(&self, kind: ValueKind) -> metaobjects_types::Result<AttrValue> {
        match self {
            Literal::Text(text) => AttrValue::parse_as(kind, text),
            other => other.sniff().convert(kind),
        }
    }
}

fn integer_value(i: i64) -> AttrValue {
    match i32::try_from(i) {
        Ok(small) => AttrValue::Int(small),
        Err(_) => AttrValue::Long(i),
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(text) => f.write_str(text),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::List(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

impl From<&str> for Literal {
    fn from(text: &str) -> Self {
        Literal::Text(text.to_string())
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

/// One node of a source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceNode {
    pub meta_type: String,
    pub subtype: Option<String>,
    pub name: Option<String>,
    pub package: Option<String>,
    pub super_ref: Option<String>,
    pub value: Option<Literal>,
    pub is_abstract: bool,
    pub is_interface: bool,
    /// Requires an existing node to overlay.
    pub overlay: bool,
    pub children: Vec<SourceNode>,
    /// Attributes written directly on the node entry, in document order.
    pub inline: Vec<(String, Literal)>,
}

impl SourceNode {
    #[must_use]
    pub fn new(meta_type: impl Into<String>) -> Self {
        Self {
            meta_type: meta_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn extends(mut self, reference: impl Into<String>) -> Self {
        self.super_ref = Some(reference.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<Literal>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn abstract_node(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    #[must_use]
    pub fn overlay(mut self) -> Self {
        self.overlay = true;
        self
    }

    #[must_use]
    pub fn child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.inline.push((name.into(), value.into()));
        self
    }

    /// `type.subtype(name)` with placeholders for what the document left out.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{}.{}({})",
            self.meta_type,
            self.subtype.as_deref().unwrap_or("?"),
            self.name.as_deref().unwrap_or("?")
        )
    }
}

/// A complete document: an optional default package and its top-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    pub package: Option<String>,
    pub children: Vec<SourceNode>,
    /// Where the document came from, used in diagnostics.
    pub origin: Option<String>,
}

impl SourceDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn origin_or_default(&self) -> &str {
        self.origin.as_deref().unwrap_or("<document>")
    }
}
