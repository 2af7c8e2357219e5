//! Entity Factory
//!
//! Compiles an [`EntitySchema`] into an [`EntityValidator`]: one generic
//! validator driven by the declared fields and relationships. Entity
//! references, whether from a relationship or a `ref` field type, are
//! shape-checked against the referenced field and looked up in the index.
//! Constraints are compiled once.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::{
    Cardinality, EntitySchema, FieldConstraints, PrimitiveKind, TypeRef, TypeRegistry,
};
use crate::validation::index::{Identifier, IdentifierIndex};
use crate::validation::outcome::{Record, RejectedRecord, ValidatedEntity};
use crate::validation::violation::{FieldProblem, ReferenceViolation, Violation};

/// Type shape with entity references already resolved
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Primitive(PrimitiveKind),
    List(Box<Shape>),
    Optional(Box<Shape>),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => write!(f, "{kind}"),
            Shape::List(inner) => write!(f, "list<{inner}>"),
            Shape::Optional(inner) => write!(f, "optional<{inner}>"),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledConstraints {
    min_value: Option<f64>,
    max_value: Option<f64>,
    enum_values: Option<Vec<String>>,
    pattern: Option<(String, Regex)>,
}

impl CompiledConstraints {
    fn compile(entity: &str, field: &str, raw: &FieldConstraints) -> Result<Self, SchemaError> {
        let pattern = match &raw.pattern {
            Some(pattern) => {
                let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    SchemaError::malformed(
                        entity,
                        format!("field '{field}': invalid pattern '{pattern}': {e}"),
                    )
                })?;
                Some((pattern.clone(), regex))
            }
            None => None,
        };

        Ok(Self {
            min_value: raw.min_value,
            max_value: raw.max_value,
            enum_values: raw.enum_values.clone(),
            pattern,
        })
    }

    /// Check a scalar that already conforms to its primitive kind
    fn check(&self, value: &Value) -> Result<(), String> {
        if let Some(number) = value.as_f64() {
            if let Some(min) = self.min_value {
                if number < min {
                    return Err(format!("value {number} is below minimum {min}"));
                }
            }
            if let Some(max) = self.max_value {
                if number > max {
                    return Err(format!("value {number} exceeds maximum {max}"));
                }
            }
        }

        if let Some(text) = value.as_str() {
            if let Some(allowed) = &self.enum_values {
                if !allowed.iter().any(|v| v == text) {
                    return Err(format!(
                        "value '{}' is not one of: {}",
                        text,
                        allowed.join(", ")
                    ));
                }
            }
            if let Some((pattern, regex)) = &self.pattern {
                if !regex.is_match(text) {
                    return Err(format!("value '{text}' does not match pattern '{pattern}'"));
                }
            }
        }

        Ok(())
    }
}

/// Entity field whose values a reference must match
#[derive(Debug, Clone)]
struct Reference {
    target: String,
    field: String,
}

#[derive(Debug, Clone)]
struct FieldCheck {
    name: String,
    shape: Shape,
    optional: bool,
    constraints: Option<CompiledConstraints>,
    /// Set for `ref` field types
    reference: Option<Reference>,
}

#[derive(Debug, Clone)]
struct RelationshipCheck {
    attribute: String,
    reference: Reference,
    shape: Shape,
    optional: bool,
}

/// Builds validators from entity schemas
pub struct EntityFactory;

impl EntityFactory {
    /// Compile an entity schema into a validator
    pub fn build(schema: &EntitySchema, registry: &TypeRegistry) -> Result<EntityValidator, SchemaError> {
        let mut fields = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let shape = flatten(&field.ty, registry, &schema.name, &field.name)?;
            let constraints = field
                .constraints
                .as_ref()
                .map(|c| CompiledConstraints::compile(&schema.name, &field.name, c))
                .transpose()?;
            // flatten has already checked the target has an identifier
            let reference = field.ty.referenced_entity().and_then(|target| {
                registry.identifier_field(target).map(|id| Reference {
                    target: target.to_string(),
                    field: id.to_string(),
                })
            });

            fields.push(FieldCheck {
                name: field.name.clone(),
                shape,
                optional: field.optional,
                constraints,
                reference,
            });
        }

        let mut relationships = Vec::with_capacity(schema.relationships.len());
        for rel in &schema.relationships {
            let shape = match &rel.attribute_type {
                Some(ty) => flatten(ty, registry, &schema.name, &rel.attribute)?,
                None => {
                    let kind = registry
                        .field_type(&rel.target, &rel.reference_field)
                        .and_then(TypeRef::as_primitive)
                        .ok_or_else(|| {
                            SchemaError::malformed(
                                &schema.name,
                                format!(
                                    "reference field '{}.{}' has no primitive type",
                                    rel.target, rel.reference_field
                                ),
                            )
                        })?;
                    attribute_shape(rel.cardinality, kind)
                }
            };

            relationships.push(RelationshipCheck {
                attribute: rel.attribute.clone(),
                reference: Reference {
                    target: rel.target.clone(),
                    field: rel.reference_field.clone(),
                },
                shape,
                optional: rel.optional,
            });
        }

        let declared = fields
            .iter()
            .map(|f| f.name.clone())
            .chain(relationships.iter().map(|r| r.attribute.clone()))
            .collect();

        Ok(EntityValidator {
            entity: schema.name.clone(),
            identifier: schema.identifier.clone(),
            fields,
            relationships,
            strict: schema.strict,
            declared,
            indexed_fields: schema.identifier.iter().cloned().collect(),
        })
    }
}

fn attribute_shape(cardinality: Cardinality, kind: PrimitiveKind) -> Shape {
    if cardinality.is_list() {
        Shape::List(Box::new(Shape::Primitive(kind)))
    } else {
        Shape::Primitive(kind)
    }
}

/// Resolve entity references to the shape of the target's identifier
fn flatten(ty: &TypeRef, registry: &TypeRegistry, entity: &str, field: &str) -> Result<Shape, SchemaError> {
    match ty {
        TypeRef::Primitive(kind) => Ok(Shape::Primitive(*kind)),
        TypeRef::ListOf(inner) => Ok(Shape::List(Box::new(flatten(inner, registry, entity, field)?))),
        TypeRef::OptionalOf(inner) => Ok(Shape::Optional(Box::new(flatten(
            inner, registry, entity, field,
        )?))),
        TypeRef::EntityRef(target) => registry
            .identifier_field(target)
            .and_then(|id| registry.field_type(target, id))
            .and_then(TypeRef::as_primitive)
            .map(Shape::Primitive)
            .ok_or_else(|| {
                SchemaError::malformed(
                    entity,
                    format!("field '{field}' references '{target}', which has no identifier"),
                )
            }),
    }
}

/// Validator for records of one entity
#[derive(Debug, Clone)]
pub struct EntityValidator {
    entity: String,
    identifier: Option<String>,
    fields: Vec<FieldCheck>,
    relationships: Vec<RelationshipCheck>,
    strict: bool,
    declared: HashSet<String>,
    /// Fields whose values go into the index on acceptance
    indexed_fields: Vec<String>,
}

impl EntityValidator {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Everything this entity references, as `(entity, field)` pairs
    pub fn references(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.reference.as_ref())
            .chain(self.relationships.iter().map(|r| &r.reference))
            .map(|r| (r.target.as_str(), r.field.as_str()))
    }

    /// Ask for another field's values to be indexed on acceptance
    pub fn index_field(&mut self, field: &str) {
        if !self.indexed_fields.iter().any(|f| f == field) {
            self.indexed_fields.push(field.to_string());
        }
    }

    pub fn indexed_fields(&self) -> &[String] {
        &self.indexed_fields
    }

    /// Validate a record against this entity.
    ///
    /// The index is only read. Every violation found is collected.
    pub fn validate(&self, record: Record, index: &IdentifierIndex) -> Result<ValidatedEntity, RejectedRecord> {
        let mut violations = Vec::new();

        for field in &self.fields {
            match record.get(&field.name) {
                None | Some(Value::Null) if field.optional => {}
                None => violations.push(Violation::missing(&field.name)),
                Some(value) => {
                    check_shape(
                        value,
                        &field.shape,
                        &field.name,
                        field.constraints.as_ref(),
                        &mut violations,
                    );
                    if let Some(reference) = &field.reference {
                        check_references(value, &field.shape, &field.name, reference, index, &mut violations);
                    }
                }
            }
        }

        for rel in &self.relationships {
            let value = match record.get(&rel.attribute) {
                None | Some(Value::Null) if rel.optional => continue,
                None => {
                    violations.push(Violation::missing(&rel.attribute));
                    continue;
                }
                Some(value) => value,
            };

            check_shape(value, &rel.shape, &rel.attribute, None, &mut violations);
            check_references(value, &rel.shape, &rel.attribute, &rel.reference, index, &mut violations);
        }

        if let Some(id_field) = &self.identifier {
            if let Some(id) = record.get(id_field).and_then(Identifier::from_value) {
                if index.contains(&self.entity, id_field, &id) {
                    violations.push(Violation::field(
                        id_field,
                        FieldProblem::DuplicateIdentifier { identifier: id },
                    ));
                }
            }
        }

        if self.strict {
            for key in record.keys() {
                if !self.declared.contains(key) {
                    violations.push(Violation::field(key, FieldProblem::Unknown));
                }
            }
        }

        if violations.is_empty() {
            Ok(ValidatedEntity {
                entity: self.entity.clone(),
                record,
            })
        } else {
            Err(RejectedRecord {
                entity: self.entity.clone(),
                record,
                violations,
            })
        }
    }

    /// Record an accepted entity's indexed values
    pub fn register(&self, accepted: &ValidatedEntity, index: &mut IdentifierIndex) {
        for field in &self.indexed_fields {
            if let Some(id) = accepted.get(field).and_then(Identifier::from_value) {
                index.insert(&self.entity, field, id);
            }
        }
    }
}

/// Look up every scalar the shape places in `value`
fn check_references(
    value: &Value,
    shape: &Shape,
    attribute: &str,
    reference: &Reference,
    index: &IdentifierIndex,
    violations: &mut Vec<Violation>,
) {
    let mut scalars = Vec::new();
    collect_scalars(value, shape, &mut scalars);

    for id in scalars.into_iter().filter_map(Identifier::from_value) {
        if !index.contains(&reference.target, &reference.field, &id) {
            violations.push(Violation::Reference(ReferenceViolation {
                attribute: attribute.to_string(),
                target: reference.target.clone(),
                reference_field: reference.field.clone(),
                identifier: id,
            }));
        }
    }
}

fn collect_scalars<'v>(value: &'v Value, shape: &Shape, out: &mut Vec<&'v Value>) {
    match (shape, value) {
        (Shape::Optional(inner), _) => collect_scalars(value, inner, out),
        (Shape::List(inner), Value::Array(items)) => {
            for item in items {
                collect_scalars(item, inner, out);
            }
        }
        // Already reported as a type mismatch
        (Shape::List(_), _) => {}
        (Shape::Primitive(_), _) => out.push(value),
    }
}

fn check_shape(
    value: &Value,
    shape: &Shape,
    path: &str,
    constraints: Option<&CompiledConstraints>,
    violations: &mut Vec<Violation>,
) {
    match shape {
        Shape::Optional(inner) => {
            if !value.is_null() {
                check_shape(value, inner, path, constraints, violations);
            }
        }
        Shape::List(inner) => match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_shape(item, inner, &format!("{path}[{i}]"), constraints, violations);
                }
            }
            other => violations.push(Violation::type_mismatch(path, shape, value_kind(other))),
        },
        Shape::Primitive(kind) => {
            if !conforms(value, *kind) {
                violations.push(Violation::type_mismatch(path, kind, value_kind(value)));
            } else if let Some(constraints) = constraints {
                if let Err(message) = constraints.check(value) {
                    violations.push(Violation::constraint(path, message));
                }
            }
        }
    }
}

fn conforms(value: &Value, kind: PrimitiveKind) -> bool {
    match kind {
        PrimitiveKind::Int => value.is_i64() || value.is_u64(),
        PrimitiveKind::Float => value.is_number(),
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Bool => value.is_boolean(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
