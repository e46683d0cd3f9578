//! JSON constraint definition documents.
//!
//! ```json
//! {
//!   "abstracts": [
//!     { "id": "identifier", "type": "regex", "parameters": { "pattern": "^[a-z]+$" } }
//!   ],
//!   "constraints": [
//!     { "targetType": "field", "targetSubType": "*", "targetName": "*", "abstractRef": "identifier" },
//!     { "targetType": "attr", "targetName": "maxLength", "type": "length",
//!       "parameters": { "min": 1, "max": 4 } }
//!   ]
//! }
//! ```

use crate::engine::ConstraintEngine;
use crate::error::{ConstraintError, ConstraintResult};
use crate::pattern::TargetPattern;
use crate::placement::PlacementConstraint;
use crate::validation::{Subject, ValidationConstraint};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    abstracts: Vec<AbstractDefinition>,
    #[serde(default)]
    constraints: Vec<ConstraintDefinition>,
}

#[derive(Debug, Deserialize)]
struct AbstractDefinition {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConstraintDefinition {
    id: Option<String>,
    target_type: String,
    #[serde(default = "any_pattern")]
    target_sub_type: String,
    #[serde(default = "any_pattern")]
    target_name: String,
    abstract_ref: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    overrides: Map<String, Value>,
}

fn any_pattern() -> String {
    "*".to_string()
}

/// A definition with its abstract (if any) folded in.
struct Resolved {
    id: String,
    kind: String,
    description: String,
    target: TargetPattern,
    parameters: Map<String, Value>,
}

impl Resolved {
    fn string(&self, key: &str) -> ConstraintResult<Option<String>> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(key, format!("expected a string, got {other}"))),
        }
    }

    fn required_string(&self, key: &str) -> ConstraintResult<String> {
        self.string(key)?
            .ok_or_else(|| ConstraintError::MissingParameter {
                id: self.id.clone(),
                parameter: key.to_string(),
            })
    }

    fn bool_or(&self, key: &str, default: bool) -> ConstraintResult<bool> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {other}"))),
        }
    }

    fn size(&self, key: &str) -> ConstraintResult<Option<usize>> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(key, format!("expected a non-negative integer, got {n}"))),
            Some(other) => Err(self.invalid(key, format!("expected a number, got {other}"))),
        }
    }

    fn strings(&self, key: &str) -> ConstraintResult<Vec<String>> {
        match self.parameters.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Ok(other.to_string()),
                })
                .collect(),
            Some(other) => Err(self.invalid(key, format!("expected an array, got {other}"))),
            None => Err(ConstraintError::MissingParameter {
                id: self.id.clone(),
                parameter: key.to_string(),
            }),
        }
    }

    fn subject(&self, default: Subject) -> ConstraintResult<Subject> {
        match self.string("subject")?.as_deref() {
            None => Ok(default),
            Some("name") => Ok(Subject::Name),
            Some("value") => Ok(Subject::Value),
            Some(other) => Err(self.invalid("subject", format!("expected 'name' or 'value', got '{other}'"))),
        }
    }

    fn invalid(&self, key: &str, reason: String) -> ConstraintError {
        ConstraintError::InvalidParameter {
            id: self.id.clone(),
            parameter: key.to_string(),
            reason,
        }
    }
}

impl ConstraintEngine {
    /// Parses a definition document and adds every constraint in it.
    /// Returns the number of constraints added. If any entry fails, none of
    /// the document's constraints are kept.
    pub fn load_definitions(&mut self, json: &str) -> ConstraintResult<usize> {
        let file: DefinitionFile = serde_json::from_str(json)?;
        let abstracts: HashMap<&str, &AbstractDefinition> =
            file.abstracts.iter().map(|a| (a.id.as_str(), a)).collect();

        let checkpoint = self.checkpoint();
        for definition in &file.constraints {
            if let Err(err) = resolve(definition, &abstracts).and_then(|r| self.add_resolved(r)) {
                self.rollback(checkpoint);
                return Err(err);
            }
        }
        let added = file.constraints.len();
        info!(constraints = added, abstracts = abstracts.len(), "Loaded constraint definitions");
        Ok(added)
    }

    pub fn load_definitions_file(&mut self, path: &Path) -> ConstraintResult<usize> {
        let json = std::fs::read_to_string(path).map_err(|source| ConstraintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_definitions(&json)
    }

    fn add_resolved(&mut self, r: Resolved) -> ConstraintResult<()> {
        match r.kind.as_str() {
            "regex" => {
                let pattern = r.required_string("pattern")?;
                let subject = r.subject(Subject::Name)?;
                let constraint = ValidationConstraint::regex(r.id.clone(), r.target.clone(), subject, &pattern)?
                    .with_description(r.description.clone());
                self.add_validation(constraint)
            }
            "enum" => {
                let values = r.strings("values")?;
                let case_sensitive = r.bool_or("caseSensitive", true)?;
                let mut constraint =
                    ValidationConstraint::enumeration(r.id.clone(), r.target.clone(), values, case_sensitive)
                        .with_description(r.description.clone());
                constraint.subject = r.subject(Subject::Value)?;
                self.add_validation(constraint)
            }
            "length" => {
                let constraint = ValidationConstraint::length(
                    r.id.clone(),
                    r.target.clone(),
                    r.subject(Subject::Value)?,
                    r.size("min")?,
                    r.size("max")?,
                    r.bool_or("allowNull", true)?,
                )?
                .with_description(r.description.clone());
                self.add_validation(constraint)
            }
            "required" => self.add_validation(
                ValidationConstraint::required(r.id.clone(), r.target.clone())
                    .with_description(r.description.clone()),
            ),
            "placement" => {
                let parent = TargetPattern::new(
                    &r.required_string("parentType")?,
                    &r.string("parentSubType")?.unwrap_or_else(any_pattern),
                    &r.string("parentName")?.unwrap_or_else(any_pattern),
                );
                let constraint = if r.bool_or("allowed", false)? {
                    PlacementConstraint::allow(r.id.clone(), parent, r.target.clone())
                } else {
                    PlacementConstraint::forbid(r.id.clone(), parent, r.target.clone())
                };
                self.add_placement(constraint.with_description(r.description.clone()))
            }
            other => Err(ConstraintError::UnknownConstraintType {
                id: r.id.clone(),
                kind: other.to_string(),
            }),
        }
    }
}

fn resolve(
    definition: &ConstraintDefinition,
    abstracts: &HashMap<&str, &AbstractDefinition>,
) -> ConstraintResult<Resolved> {
    let target = TargetPattern::new(
        &definition.target_type,
        &definition.target_sub_type,
        &definition.target_name,
    );

    let (kind, mut parameters, abstract_description) = match &definition.abstract_ref {
        Some(reference) => {
            let base = abstracts.get(reference.as_str()).ok_or_else(|| {
                ConstraintError::UnknownAbstract {
                    id: definition.id.clone().unwrap_or_else(|| reference.clone()),
                    reference: reference.clone(),
                }
            })?;
            (base.kind.clone(), base.parameters.clone(), base.description.clone())
        }
        None => {
            let kind = definition.kind.clone().ok_or_else(|| ConstraintError::MissingParameter {
                id: definition.id.clone().unwrap_or_else(|| target.to_string()),
                parameter: "type".to_string(),
            })?;
            (kind, Map::new(), String::new())
        }
    };
    for (key, value) in definition.parameters.iter().chain(definition.overrides.iter()) {
        parameters.insert(key.clone(), value.clone());
    }

    let id = definition.id.clone().unwrap_or_else(|| format!("{kind}:{target}"));
    Ok(Resolved {
        id,
        kind,
        description: definition.description.clone().unwrap_or(abstract_description),
        target,
        parameters,
    })
}
