//! Schema Model
//!
//! Validated, immutable representation of a schema. Built from raw
//! [`EntityDef`]s in two passes: every entity name is declared first so field
//! types may reference entities declared later in the file, then fields and
//! identifiers are resolved for all entities, and relationships last (they
//! need the target's identifier).

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::schema::definition::{Cardinality, EntityDef, FieldConstraints, SchemaFile};
use crate::schema::registry::{TypeRef, TypeRegistry};

/// A field declared on an entity
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    pub constraints: Option<FieldConstraints>,
}

/// A reference from one entity's attribute to identifiers of another
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSpec {
    pub attribute: String,
    pub target: String,
    pub cardinality: Cardinality,
    /// Field of the target whose values the attribute holds
    pub reference_field: String,
    /// Explicitly declared attribute type, if any
    pub attribute_type: Option<TypeRef>,
    pub optional: bool,
}

/// A validated entity definition
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub identifier: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub relationships: Vec<RelationshipSpec>,
    pub strict: bool,
}

impl EntitySchema {
    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Entities this one references through `ref` field types or
    /// relationships, excluding itself, in declaration order
    pub fn dependencies(&self) -> Vec<&str> {
        let targets = self
            .fields
            .iter()
            .filter_map(|f| f.ty.referenced_entity())
            .chain(self.relationships.iter().map(|r| r.target.as_str()));

        let mut deps: Vec<&str> = Vec::new();
        for target in targets {
            if target != self.name && !deps.contains(&target) {
                deps.push(target);
            }
        }
        deps
    }
}

/// A complete, validated schema
#[derive(Debug, Clone)]
pub struct Schema {
    entities: Vec<EntitySchema>,
    registry: TypeRegistry,
}

impl Schema {
    pub fn from_file(file: SchemaFile) -> Result<Self, SchemaError> {
        Self::from_definitions(file.into_entities())
    }

    pub fn from_definitions(defs: Vec<EntityDef>) -> Result<Self, SchemaError> {
        let mut registry = TypeRegistry::new();
        for def in &defs {
            registry.declare_entity(&def.name)?;
        }

        let mut entities = Vec::with_capacity(defs.len());
        for def in &defs {
            let fields = resolve_fields(def, &mut registry)?;
            let identifier = resolve_identifier(def, &fields)?;
            if let Some(id) = &identifier {
                registry.set_identifier(&def.name, id);
            }

            entities.push(EntitySchema {
                name: def.name.clone(),
                identifier,
                fields,
                relationships: Vec::new(),
                strict: def.strict,
            });
        }

        for (def, entity) in defs.iter().zip(entities.iter_mut()) {
            entity.relationships = resolve_relationships(def, entity, &registry)?;
        }

        log::debug!("Loaded schema with {} entities", entities.len());

        Ok(Self { entities, registry })
    }

    /// Entities in declaration order
    pub fn entities(&self) -> &[EntitySchema] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.is_entity(name)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

fn resolve_fields(def: &EntityDef, registry: &mut TypeRegistry) -> Result<Vec<FieldSpec>, SchemaError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(def.fields.len());

    for field in &def.fields {
        if field.name.is_empty() {
            return Err(SchemaError::malformed(&def.name, "field with an empty name"));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::malformed(
                &def.name,
                format!("field '{}' is declared more than once", field.name),
            ));
        }

        let ty = registry
            .resolve(&field.type_name)
            .map_err(|e| e.in_field(&def.name, &field.name))?;
        registry.register_field(&def.name, &field.name, ty.clone());

        fields.push(FieldSpec {
            name: field.name.clone(),
            optional: field.optional || ty.is_optional(),
            ty,
            constraints: field.constraints.clone(),
        });
    }

    Ok(fields)
}

/// Explicit identifier, else a field named `id`, else the first `*_id` field
fn resolve_identifier(def: &EntityDef, fields: &[FieldSpec]) -> Result<Option<String>, SchemaError> {
    let chosen = match &def.identifier {
        Some(name) => Some(
            fields
                .iter()
                .find(|f| &f.name == name)
                .ok_or_else(|| {
                    SchemaError::malformed(
                        &def.name,
                        format!("identifier '{name}' is not a declared field"),
                    )
                })?,
        ),
        None => fields
            .iter()
            .find(|f| f.name == "id")
            .or_else(|| fields.iter().find(|f| f.name.ends_with("_id"))),
    };

    let Some(field) = chosen else {
        return Ok(None);
    };

    if field.optional || field.ty.as_primitive().is_none() {
        return Err(SchemaError::malformed(
            &def.name,
            format!(
                "identifier '{}' must be a required primitive field, found {}",
                field.name, field.ty
            ),
        ));
    }

    Ok(Some(field.name.clone()))
}

fn resolve_relationships(
    def: &EntityDef,
    entity: &EntitySchema,
    registry: &TypeRegistry,
) -> Result<Vec<RelationshipSpec>, SchemaError> {
    let mut seen = HashSet::new();
    let mut relationships = Vec::with_capacity(def.relationships.len());

    for rel in &def.relationships {
        if rel.attribute.is_empty() {
            return Err(SchemaError::malformed(&def.name, "relationship with an empty attribute"));
        }
        if entity.field(&rel.attribute).is_some() || !seen.insert(rel.attribute.as_str()) {
            return Err(SchemaError::malformed(
                &def.name,
                format!("attribute '{}' is declared more than once", rel.attribute),
            ));
        }
        if !registry.is_entity(&rel.target) {
            return Err(SchemaError::UnknownType {
                entity: def.name.clone(),
                field: rel.attribute.clone(),
                type_name: rel.target.clone(),
            });
        }

        let cardinality = rel.cardinality.ok_or_else(|| {
            SchemaError::malformed(
                &def.name,
                format!("relationship '{}' must declare a cardinality", rel.attribute),
            )
        })?;

        let reference_field = match &rel.reference_field {
            Some(field) => field.clone(),
            None => registry
                .identifier_field(&rel.target)
                .map(str::to_string)
                .ok_or_else(|| {
                    SchemaError::malformed(
                        &def.name,
                        format!(
                            "relationship '{}' needs a reference_field: '{}' has no identifier",
                            rel.attribute, rel.target
                        ),
                    )
                })?,
        };

        match registry.field_type(&rel.target, &reference_field) {
            Some(ty) if ty.as_primitive().is_some() => {}
            Some(ty) => {
                return Err(SchemaError::malformed(
                    &def.name,
                    format!(
                        "reference field '{}.{}' must be primitive, found {}",
                        rel.target, reference_field, ty
                    ),
                ));
            }
            None => {
                return Err(SchemaError::malformed(
                    &def.name,
                    format!(
                        "reference field '{}' is not declared on '{}'",
                        reference_field, rel.target
                    ),
                ));
            }
        }

        let attribute_type = rel
            .type_name
            .as_deref()
            .map(|name| registry.resolve(name))
            .transpose()
            .map_err(|e| e.in_field(&def.name, &rel.attribute))?;

        let optional = rel.optional || attribute_type.as_ref().is_some_and(TypeRef::is_optional);

        relationships.push(RelationshipSpec {
            attribute: rel.attribute.clone(),
            target: rel.target.clone(),
            cardinality,
            reference_field,
            attribute_type,
            optional,
        });
    }

    Ok(relationships)
}
