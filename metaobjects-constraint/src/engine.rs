//! Rule storage, selection and the tree guard implementation.

use crate::IDENTIFIER_PATTERN;
use crate::error::{ConstraintError, ConstraintResult};
use crate::pattern::TargetPattern;
use crate::placement::PlacementConstraint;
use crate::validation::{Subject, ValidationConstraint, ValidationRule};
use metaobjects_model::{ConstraintViolation, MetaTree, NodeId, TreeGuard, ViolationKind};
use metaobjects_registry::TypeRegistry;
use metaobjects_types::{AttrValue, MetaIdentity, TYPE_FIELD, TYPE_KEY, TYPE_OBJECT};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const WHITELIST_ID: &str = "placement.whitelist";

/// Declarative summary of a rule for schema generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConstraint {
    pub id: String,
    pub target: String,
    pub kind: &'static str,
    pub description: String,
    /// False for custom logic, which generators document but never translate.
    pub serializable: bool,
}

/// Holds placement and validation rules and enforces them against a tree.
pub struct ConstraintEngine {
    registry: Arc<TypeRegistry>,
    placements: Vec<PlacementConstraint>,
    validations: Vec<ValidationConstraint>,
}

impl std::fmt::Debug for ConstraintEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintEngine")
            .field("types", &self.registry.len())
            .field("placements", &self.placements.len())
            .field("validations", &self.validations.len())
            .finish()
    }
}

impl ConstraintEngine {
    /// An engine with no explicit rules. Registry whitelists still apply.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            placements: Vec::new(),
            validations: Vec::new(),
        }
    }

    /// An engine with the built-in rules: identifier names for objects,
    /// fields and keys, and no field-in-field or object-in-object nesting.
    pub fn with_defaults(registry: Arc<TypeRegistry>) -> ConstraintResult<Self> {
        let mut engine = Self::new(registry);
        for meta_type in [TYPE_OBJECT, TYPE_FIELD, TYPE_KEY] {
            engine.add_validation(
                ValidationConstraint::regex(
                    format!("{meta_type}.name.identifier"),
                    TargetPattern::new(meta_type, "*", "*"),
                    Subject::Name,
                    IDENTIFIER_PATTERN,
                )?
                .with_description(format!("{meta_type} names must be identifiers")),
            )?;
        }
        for meta_type in [TYPE_FIELD, TYPE_OBJECT] {
            engine.add_placement(
                PlacementConstraint::forbid(
                    format!("placement.{meta_type}-in-{meta_type}"),
                    TargetPattern::new(meta_type, "*", "*"),
                    TargetPattern::new(meta_type, "*", "*"),
                )
                .with_description(format!("a {meta_type} cannot contain another {meta_type}")),
            )?;
        }
        Ok(engine)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn add_placement(&mut self, constraint: PlacementConstraint) -> ConstraintResult<()> {
        self.ensure_unique(&constraint.id)?;
        debug!(id = %constraint.id, "Added placement constraint");
        self.placements.push(constraint);
        Ok(())
    }

    pub fn add_validation(&mut self, constraint: ValidationConstraint) -> ConstraintResult<()> {
        self.ensure_unique(&constraint.id)?;
        debug!(id = %constraint.id, kind = constraint.rule.kind(), "Added validation constraint");
        self.validations.push(constraint);
        Ok(())
    }

    /// Rule counts, for undoing a partially applied batch.
    pub(crate) fn checkpoint(&self) -> (usize, usize) {
        (self.placements.len(), self.validations.len())
    }

    pub(crate) fn rollback(&mut self, (placements, validations): (usize, usize)) {
        self.placements.truncate(placements);
        self.validations.truncate(validations);
    }

    fn ensure_unique(&self, id: &str) -> ConstraintResult<()> {
        let taken = self.placements.iter().any(|c| c.id == id)
            || self.validations.iter().any(|c| c.id == id);
        if taken {
            return Err(ConstraintError::DuplicateConstraint(id.to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn placements(&self) -> &[PlacementConstraint] {
        &self.placements
    }

    #[must_use]
    pub fn validations(&self) -> &[ValidationConstraint] {
        &self.validations
    }

    // ── Placement ───────────────────────────────────────────────

    /// Decides whether `child` may be attached under `parent`.
    ///
    /// The most specific matching explicit rules decide; a forbidding rule
    /// wins a tie. Without a matching rule, the parent's registry whitelist
    /// applies. Everything else is allowed.
    pub fn check_placement(
        &self,
        parent: &MetaIdentity,
        child: &MetaIdentity,
    ) -> Result<(), ConstraintViolation> {
        let matching: Vec<&PlacementConstraint> = self
            .placements
            .iter()
            .filter(|c| c.applies_to(parent, child))
            .collect();

        if let Some(best) = matching.iter().map(|c| c.wildcards()).min() {
            let forbidding = matching
                .iter()
                .filter(|c| c.wildcards() == best)
                .find(|c| !c.allowed);
            return match forbidding {
                Some(rule) => Err(ConstraintViolation::new(
                    ViolationKind::Placement,
                    &rule.id,
                    child.to_string(),
                    format!("cannot be attached under {parent}"),
                )),
                None => Ok(()),
            };
        }

        if let Some(definition) = self.registry.find_type(&parent.meta_type, &parent.subtype) {
            if !definition.accepts(child) {
                return Err(ConstraintViolation::new(
                    ViolationKind::Placement,
                    WHITELIST_ID,
                    child.to_string(),
                    format!("{} does not accept {} children", definition.key(), child.type_key()),
                ));
            }
        }
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────

    /// Rules for `subject` matching `identity`, keeping only the most
    /// specific pattern per rule kind.
    fn applicable(&self, identity: &MetaIdentity, subject: Subject) -> Vec<&ValidationConstraint> {
        let matching: Vec<&ValidationConstraint> = self
            .validations
            .iter()
            .filter(|c| c.subject == subject && c.target.matches(identity))
            .collect();

        let mut best: HashMap<&'static str, usize> = HashMap::new();
        for constraint in &matching {
            let wildcards = constraint.target.wildcards();
            best.entry(constraint.rule.kind())
                .and_modify(|w| *w = (*w).min(wildcards))
                .or_insert(wildcards);
        }
        matching
            .into_iter()
            .filter(|c| best.get(c.rule.kind()) == Some(&c.target.wildcards()))
            .collect()
    }

    /// Checks name rules for a node about to be attached.
    pub fn validate_name(&self, identity: &MetaIdentity) -> Result<(), ConstraintViolation> {
        for constraint in self.applicable(identity, Subject::Name) {
            constraint.check_name(identity)?;
        }
        Ok(())
    }

    /// Checks value rules for a node.
    pub fn validate_value(
        &self,
        tree: &MetaTree,
        node: NodeId,
        value: Option<&AttrValue>,
    ) -> Result<(), ConstraintViolation> {
        for constraint in self.applicable(tree.identity(node), Subject::Value) {
            constraint.check_value(tree, node, value)?;
        }
        Ok(())
    }

    /// Checks the registry contract of a non-abstract node: required
    /// attributes must resolve to a value and required children must exist.
    pub fn check_required(&self, tree: &MetaTree, node: NodeId) -> Result<(), ConstraintViolation> {
        if tree.is_abstract(node) {
            return Ok(());
        }
        let identity = tree.identity(node);
        let Some(definition) = self.registry.find_type(&identity.meta_type, &identity.subtype)
        else {
            return Ok(());
        };

        for spec in definition.required_attributes() {
            if tree.attribute(node, &spec.name).is_none() {
                return Err(ConstraintViolation::new(
                    ViolationKind::Completeness,
                    format!("{}.required.{}", definition.key(), spec.name),
                    identity.to_string(),
                    format!("missing required {} attribute '{}'", spec.kind, spec.name),
                ));
            }
        }

        if let Some(requirements) = definition.child_requirements() {
            let children = tree.children_of(node, None, true);
            for requirement in requirements.iter().filter(|r| r.required) {
                let present = children
                    .iter()
                    .any(|c| requirement.matches(tree.identity(*c)));
                if !present {
                    return Err(ConstraintViolation::new(
                        ViolationKind::Completeness,
                        format!("{}.requires.{}", definition.key(), requirement.meta_type),
                        identity.to_string(),
                        format!(
                            "missing required child {}.{}({})",
                            requirement.meta_type, requirement.subtype, requirement.name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    // ── Schema view ─────────────────────────────────────────────

    /// Describes every rule for schema generators. Custom logic is reported
    /// as "custom validation" and flagged as not serializable.
    #[must_use]
    pub fn schema_constraints(&self) -> Vec<SchemaConstraint> {
        let placements = self.placements.iter().map(|c| SchemaConstraint {
            id: c.id.clone(),
            target: format!("{} > {}", c.parent, c.child),
            kind: if c.allowed { "placement.allowed" } else { "placement.forbidden" },
            description: c.description.clone(),
            serializable: true,
        });
        let validations = self.validations.iter().map(|c| SchemaConstraint {
            id: c.id.clone(),
            target: c.target.to_string(),
            kind: c.rule.kind(),
            description: match c.rule {
                ValidationRule::Custom { .. } => "custom validation".to_string(),
                _ => c.description.clone(),
            },
            serializable: c.is_schema_serializable(),
        });
        placements.chain(validations).collect()
    }
}

impl TreeGuard for ConstraintEngine {
    fn check_attach(
        &self,
        tree: &MetaTree,
        parent: NodeId,
        child: &MetaIdentity,
    ) -> Result<(), ConstraintViolation> {
        self.check_placement(tree.identity(parent), child)?;
        self.validate_name(child)
    }

    fn check_value(
        &self,
        tree: &MetaTree,
        node: NodeId,
        value: Option<&AttrValue>,
    ) -> Result<(), ConstraintViolation> {
        self.validate_value(tree, node, value)
    }

    fn check_complete(&self, tree: &MetaTree, node: NodeId) -> Result<(), ConstraintViolation> {
        self.check_required(tree, node)
    }
}
