//! Applies a source document to a tree.
//!
//! Each document node goes through the same steps: resolve its package and
//! name, resolve its super reference, then either reuse a node that already
//! exists under the parent (overlay in place), wrap an inherited one, or
//! create a fresh node through the registry. Declared children follow, and
//! inline attributes come last.

use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::source::{Literal, SourceDocument, SourceNode};
use crate::{INTERFACE_ATTR, RESERVED_KEYS};
use metaobjects_model::{ABSTRACT_ATTR, MetaTree, NodeId};
use metaobjects_registry::{RegistryError, TypeDefinition, TypeRegistry};
use metaobjects_types::{AttrValue, TYPE_ATTR, ValueKind, name};
use std::fmt;
use tracing::{debug, warn};

/// What a single merge did to the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Nodes constructed through the registry.
    pub created: usize,
    /// Existing nodes reused as the merge target.
    pub overlaid: usize,
    /// Inherited nodes wrapped under a new parent.
    pub wrapped: usize,
    /// Attributes created or updated from inline keys.
    pub inline: usize,
    /// Anomalies that lenient mode skipped.
    pub warnings: Vec<String>,
}

impl MergeReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, overlaid {}, wrapped {}, inline {}",
            self.created, self.overlaid, self.wrapped, self.inline
        )?;
        if !self.warnings.is_empty() {
            write!(f, ", {} warning(s)", self.warnings.len())?;
        }
        Ok(())
    }
}

pub(crate) struct Merger<'a> {
    tree: &'a mut MetaTree,
    registry: &'a TypeRegistry,
    strict: bool,
    default_package: Option<&'a str>,
    origin: &'a str,
    report: MergeReport,
}

impl<'a> Merger<'a> {
    pub(crate) fn new(
        tree: &'a mut MetaTree,
        registry: &'a TypeRegistry,
        config: &'a LoaderConfig,
        origin: &'a str,
    ) -> Self {
        Self {
            tree,
            registry,
            strict: config.strict,
            default_package: config.default_package.as_deref(),
            origin,
            report: MergeReport::default(),
        }
    }

    pub(crate) fn merge(mut self, document: &SourceDocument) -> LoaderResult<MergeReport> {
        let base = self.default_package.unwrap_or_default();
        let package = match &document.package {
            Some(package) => name::expand_package(base, package)?,
            None => base.to_string(),
        };
        debug!(origin = self.origin, package = %package, nodes = document.children.len(), "Merging document");

        let root = self.tree.root();
        for node in &document.children {
            self.process(root, node, &package)?;
        }
        Ok(self.report)
    }

    fn process(&mut self, parent: NodeId, source: &SourceNode, context: &str) -> LoaderResult<()> {
        let registry = self.registry;
        if source.meta_type.trim().is_empty() {
            return Err(LoaderError::MissingType {
                origin: self.origin.to_string(),
                parent: self.describe(parent),
            });
        }
        let at_root = parent == self.tree.root();

        let package = match &source.package {
            Some(package) => name::expand_package(context, package)?,
            None => context.to_string(),
        };

        // An unknown type takes precedence over an unresolved super.
        let super_lookup = source
            .super_ref
            .as_ref()
            .map(|reference| self.resolve_super(source, reference, &package));
        // Without a declared subtype a node takes its super's.
        let inherited_subtype = match (&source.subtype, &super_lookup) {
            (None, Some(Ok(super_id))) => Some(self.tree.node(*super_id).subtype().to_string()),
            _ => None,
        };
        let subtype = source.subtype.as_deref().or(inherited_subtype.as_deref());

        let definition = match registry.resolve(&source.meta_type, subtype) {
            Ok(definition) => definition,
            Err(RegistryError::UnknownType { meta_type, subtype }) => {
                let anomaly = LoaderError::UnknownType {
                    meta_type,
                    subtype,
                    parent: self.describe(parent),
                };
                return self.recover(parent, anomaly);
            }
            Err(other) => return Err(other.into()),
        };
        let super_id = super_lookup.transpose()?;

        let node_name = match &source.name {
            Some(given) if at_root => root_name(given, &package)?,
            Some(given) => given.clone(),
            None => {
                let scope = if at_root { package.as_str() } else { "" };
                self.generate_name(parent, source, definition, scope)?
            }
        };
        name::validate_name(&source.meta_type, &node_name)?;

        let local = self
            .tree
            .try_get_child(parent, Some(&source.meta_type), &node_name, false);
        let inherited = if local.is_none() && !at_root {
            self.tree
                .try_get_child(parent, Some(&source.meta_type), &node_name, true)
        } else {
            None
        };

        let node = match (local, inherited) {
            (Some(existing), _) if self.redeclares(existing, source) => {
                debug!(node = %self.tree.identity(existing), "Replacing redeclared node");
                self.create(parent, definition, &node_name, super_id)?
            }
            (Some(existing), _) => {
                debug!(node = %self.tree.identity(existing), "Overlaying in place");
                self.report.overlaid += 1;
                self.redundant_super(existing, source, super_id)?;
                existing
            }
            (None, Some(original)) => {
                let wrapper = self.tree.wrap(original);
                self.tree.add_child(parent, wrapper)?;
                debug!(node = %self.tree.identity(wrapper), parent = %self.describe(parent), "Wrapped inherited node");
                self.report.wrapped += 1;
                self.redundant_super(wrapper, source, super_id)?;
                wrapper
            }
            (None, None) => {
                if source.overlay {
                    return Err(LoaderError::OverlayTargetMissing {
                        node: format!("{}.{}({})", source.meta_type, definition.subtype(), node_name),
                    });
                }
                self.create(parent, definition, &node_name, super_id)?
            }
        };

        if source.is_abstract {
            self.set_attribute(node, ABSTRACT_ATTR, AttrValue::Boolean(true))?;
        }
        if source.is_interface {
            self.set_attribute(node, INTERFACE_ATTR, AttrValue::Boolean(true))?;
        }
        if let Some(literal) = &source.value {
            self.apply_value(node, literal)?;
        }

        let child_package = if at_root {
            self.tree.identity(node).package().to_string()
        } else {
            package
        };
        for child in &source.children {
            self.process(node, child, &child_package)?;
        }

        let identity = self.tree.identity(node);
        let node_definition = registry
            .find_type(&identity.meta_type, &identity.subtype)
            .unwrap_or(definition);
        self.apply_inline(node, source, node_definition)
    }

    /// A replaceable node declared again with a different subtype is
    /// rebuilt rather than overlaid.
    fn redeclares(&self, existing: NodeId, source: &SourceNode) -> bool {
        let node = self.tree.node(existing);
        node.is_replaceable()
            && source
                .subtype
                .as_deref()
                .is_some_and(|subtype| subtype != node.subtype())
    }

    fn create(
        &mut self,
        parent: NodeId,
        definition: &TypeDefinition,
        node_name: &str,
        super_id: Option<NodeId>,
    ) -> LoaderResult<NodeId> {
        let fresh = self.registry.create_instance(
            definition.meta_type(),
            Some(definition.subtype()),
            node_name,
        )?;
        let id = self.tree.attach(parent, fresh)?;
        if let Some(super_id) = super_id {
            self.tree.set_super(id, super_id)?;
        }
        self.report.created += 1;
        Ok(id)
    }

    fn generate_name(
        &self,
        parent: NodeId,
        source: &SourceNode,
        definition: &TypeDefinition,
        scope: &str,
    ) -> LoaderResult<String> {
        let missing = |reason: &str| LoaderError::MissingName {
            meta_type: source.meta_type.clone(),
            parent: self.describe(parent),
            reason: reason.to_string(),
        };
        if source.is_abstract {
            return Err(missing("abstract nodes must be named"));
        }
        if let Some(fixed) = definition.default_name() {
            return Ok(name::qualify(scope, fixed));
        }
        if let Some(prefix) = definition.default_name_prefix() {
            let scoped = name::qualify(scope, prefix);
            let index = self.tree.next_name_index(parent, &source.meta_type, &scoped);
            return Ok(format!("{scoped}{index}"));
        }
        Err(missing("its type defines no default name or prefix"))
    }

    /// Looks a super reference up among the root-level nodes of the same
    /// type: relative to the node's package first, then as written.
    fn resolve_super(
        &self,
        source: &SourceNode,
        reference: &str,
        package: &str,
    ) -> LoaderResult<NodeId> {
        let meta_type = source.meta_type.as_str();
        let candidates = if name::is_relative(reference) {
            vec![name::expand_package(package, reference)?]
        } else if package.is_empty() {
            vec![reference.to_string()]
        } else {
            vec![name::qualify(package, reference), reference.to_string()]
        };

        let root = self.tree.root();
        candidates
            .iter()
            .find_map(|candidate| self.tree.try_get_child(root, Some(meta_type), candidate, false))
            .ok_or_else(|| LoaderError::UnresolvedSuper {
                node: source.describe(),
                reference: reference.to_string(),
            })
    }

    /// Sets a local attribute, creating it when the node has none of that name.
    fn set_attribute(&mut self, node: NodeId, attr_name: &str, value: AttrValue) -> LoaderResult<NodeId> {
        let attr = match self.tree.try_get_child(node, Some(TYPE_ATTR), attr_name, false) {
            Some(existing) => existing,
            None => {
                let fresh = self
                    .registry
                    .create_instance(TYPE_ATTR, Some(value.kind().subtype()), attr_name)?;
                self.tree.attach(node, fresh)?
            }
        };
        self.tree.set_value(attr, value)?;
        Ok(attr)
    }

    fn apply_value(&mut self, node: NodeId, literal: &Literal) -> LoaderResult<()> {
        let Some(kind) = self.tree.node(node).value_kind() else {
            let anomaly = LoaderError::UnexpectedValue {
                node: self.describe(node),
            };
            return self.recover(node, anomaly);
        };
        let value = literal.to_value(kind)?;
        self.tree.set_value(node, value)?;
        Ok(())
    }

    /// Turns inline keys into attribute children. A kind declared in the
    /// type's attribute contract wins over the literal's shape.
    fn apply_inline(
        &mut self,
        node: NodeId,
        source: &SourceNode,
        definition: &TypeDefinition,
    ) -> LoaderResult<()> {
        let inline = source
            .inline
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()));

        let Some(default_subtype) = definition.inline_attr_subtype() else {
            for (attr_name, _) in inline {
                let anomaly = LoaderError::InlineAttributeRejected {
                    node: self.describe(node),
                    attribute: attr_name.clone(),
                };
                self.recover(node, anomaly)?;
            }
            return Ok(());
        };
        let default_kind = ValueKind::from_subtype(default_subtype).unwrap_or(ValueKind::String);

        for (attr_name, literal) in inline {
            let value = match definition.attribute(attr_name) {
                Some(spec) => literal.to_value(spec.kind)?,
                None => match literal.sniff() {
                    AttrValue::String(text) => AttrValue::String(text).convert(default_kind)?,
                    sniffed => sniffed,
                },
            };
            self.set_attribute(node, attr_name, value)?;
            self.report.inline += 1;
        }
        Ok(())
    }

    /// A super declared on an existing node is only an anomaly when it
    /// names a different node than the one already linked.
    fn redundant_super(
        &mut self,
        node: NodeId,
        source: &SourceNode,
        super_id: Option<NodeId>,
    ) -> LoaderResult<()> {
        let (Some(reference), Some(super_id)) = (&source.super_ref, super_id) else {
            return Ok(());
        };
        if self.tree.super_of(node) == Some(super_id) {
            return Ok(());
        }
        let anomaly = LoaderError::RedundantSuper {
            node: self.describe(node),
            reference: reference.clone(),
        };
        self.recover(node, anomaly)
    }

    /// Strict mode fails on a recoverable anomaly. Lenient mode records it
    /// and logs it at most once per node.
    fn recover(&mut self, node: NodeId, anomaly: LoaderError) -> LoaderResult<()> {
        if self.strict {
            return Err(anomaly);
        }
        let message = anomaly.to_string();
        if self.tree.node(node).cache().mark_once(&format!("warned:{message}")) {
            warn!(node = %self.tree.identity(node), origin = self.origin, "{message}");
        }
        self.report.warnings.push(message);
        Ok(())
    }

    fn describe(&self, id: NodeId) -> String {
        if id == self.tree.root() {
            self.tree.identity(id).name.clone()
        } else {
            self.tree.path_of(id)
        }
    }
}

/// Qualifies a root-level name with its package unless it already carries one.
fn root_name(given: &str, package: &str) -> LoaderResult<String> {
    if name::is_relative(given) {
        Ok(name::expand_package(package, given)?)
    } else if name::is_qualified(given) {
        Ok(given.to_string())
    } else {
        Ok(name::qualify(package, given))
    }
}
