//! Validation rules for names and attribute values.

use crate::error::{ConstraintError, ConstraintResult};
use crate::pattern::TargetPattern;
use metaobjects_model::{ConstraintViolation, MetaTree, NodeId, ViolationKind};
use metaobjects_types::{AttrValue, MetaIdentity};
use regex_lite::Regex;
use std::fmt;
use std::sync::Arc;

const EXCERPT_LEN: usize = 50;

/// Predicate backing a custom-logic rule. Receives the tree so it can follow
/// references to other nodes.
pub type CustomPredicate = Arc<dyn Fn(&MetaTree, NodeId, Option<&AttrValue>) -> bool + Send + Sync>;

/// What a validation rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// The short name of the node, checked when it is attached.
    Name,
    /// The node's value, checked whenever it is set and during validation.
    Value,
}

#[derive(Clone)]
pub enum ValidationRule {
    Regex(Regex),
    Enum {
        values: Vec<String>,
        case_sensitive: bool,
    },
    Length {
        min: Option<usize>,
        max: Option<usize>,
        allow_null: bool,
    },
    Required,
    /// Arbitrary logic that cannot be expressed declaratively. Never
    /// translated into schemas.
    Custom {
        logic: String,
        predicate: CustomPredicate,
    },
}

impl ValidationRule {
    /// Short name of the rule family. Rules only compete on specificity
    /// within the same family.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRule::Regex(_) => "regex",
            ValidationRule::Enum { .. } => "enum",
            ValidationRule::Length { .. } => "length",
            ValidationRule::Required => "required",
            ValidationRule::Custom { .. } => "custom",
        }
    }

    /// Checks a textual subject. `None` means the subject is absent.
    fn check_text(&self, text: Option<&str>) -> Result<(), String> {
        match self {
            ValidationRule::Regex(regex) => match text {
                Some(t) if !regex.is_match(t) => Err(format!(
                    "'{}' does not match pattern {}",
                    excerpt(t),
                    regex.as_str()
                )),
                _ => Ok(()),
            },
            ValidationRule::Enum {
                values,
                case_sensitive,
            } => match text {
                Some(t) => {
                    let found = values.iter().any(|v| {
                        if *case_sensitive {
                            v == t
                        } else {
                            v.eq_ignore_ascii_case(t)
                        }
                    });
                    if found {
                        Ok(())
                    } else {
                        Err(format!("'{}' is not one of [{}]", excerpt(t), values.join(", ")))
                    }
                }
                None => Ok(()),
            },
            ValidationRule::Length {
                min,
                max,
                allow_null,
            } => match text {
                None if *allow_null => Ok(()),
                None => Err("value is required".to_string()),
                Some(t) => {
                    let len = t.chars().count();
                    if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
                        Err(format!(
                            "length {len} of '{}' is outside {}..{}",
                            excerpt(t),
                            min.map_or(String::new(), |m| m.to_string()),
                            max.map_or(String::new(), |m| m.to_string()),
                        ))
                    } else {
                        Ok(())
                    }
                }
            },
            ValidationRule::Required => match text {
                Some(_) => Ok(()),
                None => Err("value is required".to_string()),
            },
            ValidationRule::Custom { .. } => Ok(()),
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            ValidationRule::Enum {
                values,
                case_sensitive,
            } => f
                .debug_struct("Enum")
                .field("values", values)
                .field("case_sensitive", case_sensitive)
                .finish(),
            ValidationRule::Length {
                min,
                max,
                allow_null,
            } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .field("allow_null", allow_null)
                .finish(),
            ValidationRule::Required => f.write_str("Required"),
            ValidationRule::Custom { logic, .. } => {
                f.debug_struct("Custom").field("logic", logic).finish()
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_LEN).collect();
    format!("{cut}...")
}

/// A validation rule bound to a target pattern.
#[derive(Debug, Clone)]
pub struct ValidationConstraint {
    pub id: String,
    pub description: String,
    pub target: TargetPattern,
    pub subject: Subject,
    pub rule: ValidationRule,
}

impl ValidationConstraint {
    fn build(id: String, target: TargetPattern, subject: Subject, rule: ValidationRule) -> Self {
        Self {
            id,
            description: String::new(),
            target,
            subject,
            rule,
        }
    }

    pub fn regex(
        id: impl Into<String>,
        target: TargetPattern,
        subject: Subject,
        pattern: &str,
    ) -> ConstraintResult<Self> {
        let id = id.into();
        let regex = Regex::new(pattern).map_err(|source| ConstraintError::InvalidPattern {
            id: id.clone(),
            source,
        })?;
        Ok(Self::build(id, target, subject, ValidationRule::Regex(regex)))
    }

    #[must_use]
    pub fn enumeration(
        id: impl Into<String>,
        target: TargetPattern,
        values: Vec<String>,
        case_sensitive: bool,
    ) -> Self {
        Self::build(
            id.into(),
            target,
            Subject::Value,
            ValidationRule::Enum {
                values,
                case_sensitive,
            },
        )
    }

    pub fn length(
        id: impl Into<String>,
        target: TargetPattern,
        subject: Subject,
        min: Option<usize>,
        max: Option<usize>,
        allow_null: bool,
    ) -> ConstraintResult<Self> {
        let id = id.into();
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ConstraintError::InvalidParameter {
                    id,
                    parameter: "min".to_string(),
                    reason: format!("min {lo} is greater than max {hi}"),
                });
            }
        }
        Ok(Self::build(
            id,
            target,
            subject,
            ValidationRule::Length {
                min,
                max,
                allow_null,
            },
        ))
    }

    #[must_use]
    pub fn required(id: impl Into<String>, target: TargetPattern) -> Self {
        Self::build(id.into(), target, Subject::Value, ValidationRule::Required)
    }

    #[must_use]
    pub fn custom(
        id: impl Into<String>,
        target: TargetPattern,
        logic: impl Into<String>,
        predicate: CustomPredicate,
    ) -> Self {
        Self::build(
            id.into(),
            target,
            Subject::Value,
            ValidationRule::Custom {
                logic: logic.into(),
                predicate,
            },
        )
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// False for rules that schema generators must not translate.
    #[must_use]
    pub fn is_schema_serializable(&self) -> bool {
        !matches!(self.rule, ValidationRule::Custom { .. })
    }

    fn violation(&self, node: &MetaIdentity, explanation: String) -> ConstraintViolation {
        ConstraintViolation::new(ViolationKind::Validation, &self.id, node.to_string(), explanation)
    }

    pub(crate) fn check_name(&self, identity: &MetaIdentity) -> Result<(), ConstraintViolation> {
        self.rule
            .check_text(Some(identity.short_name()))
            .map_err(|why| self.violation(identity, why))
    }

    pub(crate) fn check_value(
        &self,
        tree: &MetaTree,
        node: NodeId,
        value: Option<&AttrValue>,
    ) -> Result<(), ConstraintViolation> {
        let identity = tree.identity(node);
        if let ValidationRule::Custom { logic, predicate } = &self.rule {
            if predicate(tree, node, value) {
                return Ok(());
            }
            return Err(self.violation(identity, format!("custom validation failed: {logic}")));
        }
        let text = value.map(ToString::to_string);
        self.rule
            .check_text(text.as_deref())
            .map_err(|why| self.violation(identity, why))
    }
}
