//! JSON reader and writer for metadata documents.
//!
//! ```json
//! {
//!   "metadata": {
//!     "package": "acme",
//!     "children": [
//!       { "object": { "subType": "pojo", "name": "Car", "children": [
//!         { "field": { "subType": "string", "name": "name", "@maxLength": 40 } }
//!       ] } }
//!     ]
//!   }
//! }
//! ```
//!
//! Every child entry is a single-key object whose key is the node type.
//! Scalar keys other than the reserved ones become inline attributes; a
//! leading `@` is stripped.

use crate::error::{LoaderError, LoaderResult};
use crate::source::{Literal, SourceDocument, SourceNode};
use crate::RESERVED_KEYS;
use metaobjects_model::{MetaTree, NodeId};
use metaobjects_types::AttrValue;
use serde_json::{Map, Value, json};
use tracing::debug;

const DOCUMENT_KEY: &str = "metadata";

/// Parses a JSON document. `origin` names the source in errors.
pub fn read_document(text: &str, origin: &str) -> LoaderResult<SourceDocument> {
    let value: Value = serde_json::from_str(text)?;
    let format = |reason: String| LoaderError::Format {
        origin: origin.to_string(),
        reason,
    };

    let body = value
        .get(DOCUMENT_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| format(format!("expected a top-level \"{DOCUMENT_KEY}\" object")))?;

    let package = match body.get("package").or_else(|| body.get("defaultPackage")) {
        None | Some(Value::Null) => None,
        Some(Value::String(p)) => Some(p.clone()),
        Some(other) => return Err(format(format!("package must be a string, got {other}"))),
    };

    let children = read_children(body, origin)?;
    Ok(SourceDocument {
        package,
        children,
        origin: Some(origin.to_string()),
    })
}

fn read_children(body: &Map<String, Value>, origin: &str) -> LoaderResult<Vec<SourceNode>> {
    match body.get("children") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.iter().map(|e| read_entry(e, origin)).collect(),
        Some(other) => Err(LoaderError::Format {
            origin: origin.to_string(),
            reason: format!("children must be an array, got {other}"),
        }),
    }
}

fn read_entry(entry: &Value, origin: &str) -> LoaderResult<SourceNode> {
    let format = |reason: String| LoaderError::Format {
        origin: origin.to_string(),
        reason,
    };
    let missing_type = || LoaderError::MissingType {
        origin: origin.to_string(),
        parent: "document entry".to_string(),
    };

    let object = entry
        .as_object()
        .ok_or_else(|| format(format!("child entry must be an object, got {entry}")))?;
    let mut keys = object.iter();
    let (meta_type, body) = match (keys.next(), keys.next()) {
        (Some((meta_type, body)), None) => (meta_type, body),
        (None, _) => return Err(missing_type()),
        (Some(_), Some(_)) => {
            return Err(format(format!(
                "child entry must have exactly one type key, got {}",
                object.len()
            )));
        }
    };
    if meta_type.trim().is_empty() {
        return Err(missing_type());
    }
    let body = body
        .as_object()
        .ok_or_else(|| format(format!("body of '{meta_type}' must be an object")))?;

    let text = |key: &str| -> LoaderResult<Option<String>> {
        match body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(format(format!("'{key}' of '{meta_type}' must be a string, got {other}"))),
        }
    };
    let flag = |key: &str| -> LoaderResult<bool> {
        match body.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => Ok(s.eq_ignore_ascii_case("true")),
            Some(other) => Err(format(format!("'{key}' of '{meta_type}' must be a boolean, got {other}"))),
        }
    };

    let mut node = SourceNode::new(meta_type.clone());
    node.subtype = text("subType")?;
    node.name = text("name")?;
    node.package = text("package")?;
    node.super_ref = text("super")?;
    node.is_abstract = flag("isAbstract")?;
    node.is_interface = flag("isInterface")?;
    node.overlay = flag("overlay")?;
    node.value = body
        .get("value")
        .filter(|v| !v.is_null())
        .map(|v| to_literal(v).ok_or_else(|| format(format!("unsupported value {v}"))))
        .transpose()?;
    node.children = read_children(body, origin)?;

    for (key, value) in body {
        let attr_name = key.strip_prefix('@').unwrap_or(key);
        if RESERVED_KEYS.contains(&key.as_str()) || attr_name.is_empty() {
            continue;
        }
        let literal = to_literal(value).ok_or_else(|| {
            format(format!("inline attribute '{attr_name}' of '{meta_type}' must be a scalar or list"))
        })?;
        node.inline.push((attr_name.to_string(), literal));
    }
    Ok(node)
}

fn to_literal(value: &Value) -> Option<Literal> {
    match value {
        Value::String(s) => Some(Literal::Text(s.clone())),
        Value::Bool(b) => Some(Literal::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Literal::Integer)
            .or_else(|| n.as_f64().map(Literal::Float)),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Literal::List),
        Value::Null | Value::Object(_) => None,
    }
}

// ── Writer ──────────────────────────────────────────────────────

/// Renders a tree as a JSON value in the reader's format.
///
/// Root-level nodes carry qualified names. Overlay wrappers are written with
/// `"overlay": true` instead of a super reference. Private attributes are
/// dropped, except the abstract marker, which becomes `isAbstract`.
#[must_use]
pub fn to_value(tree: &MetaTree) -> Value {
    let children: Vec<Value> = tree
        .children(tree.root())
        .iter()
        .filter(|id| !tree.identity(**id).is_private())
        .map(|id| node_entry(tree, *id))
        .collect();
    let mut document = Map::new();
    document.insert(DOCUMENT_KEY.to_string(), json!({ "children": children }));
    Value::Object(document)
}

/// Pretty-printed [`to_value`].
pub fn write_document(tree: &MetaTree) -> LoaderResult<String> {
    Ok(serde_json::to_string_pretty(&to_value(tree))?)
}

fn node_entry(tree: &MetaTree, id: NodeId) -> Value {
    let node = tree.node(id);
    let mut body = Map::new();
    body.insert("subType".to_string(), Value::from(node.subtype()));
    body.insert("name".to_string(), Value::from(node.name()));

    if node.is_overlay() {
        body.insert("overlay".to_string(), Value::Bool(true));
    } else if let Some(super_id) = node.super_data() {
        if tree.parent_of(super_id) == Some(tree.root()) {
            body.insert("super".to_string(), Value::from(tree.identity(super_id).name.as_str()));
        } else {
            debug!(node = %node.identity(), "Super is not a root-level node; not written");
        }
    }
    if tree.is_abstract(id) {
        body.insert("isAbstract".to_string(), Value::Bool(true));
    }
    if let Some(value) = node.value() {
        body.insert("value".to_string(), value_to_json(value));
    }

    let children: Vec<Value> = tree
        .children(id)
        .iter()
        .filter(|child| !tree.identity(**child).is_private())
        .map(|child| node_entry(tree, *child))
        .collect();
    if !children.is_empty() {
        body.insert("children".to_string(), Value::Array(children));
    }

    let mut entry = Map::new();
    entry.insert(node.meta_type().to_string(), Value::Object(body));
    Value::Object(entry)
}

fn value_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::String(s) | AttrValue::Class(s) => Value::from(s.as_str()),
        AttrValue::Int(v) => Value::from(*v),
        AttrValue::Long(v) => Value::from(*v),
        AttrValue::Double(v) => serde_json::Number::from_f64(*v)
            .map_or_else(|| Value::from(v.to_string()), Value::Number),
        AttrValue::Boolean(b) => Value::Bool(*b),
        AttrValue::StringArray(items) => Value::from(items.clone()),
    }
}
