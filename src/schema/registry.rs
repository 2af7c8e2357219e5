//! Type Registry
//!
//! Maps type expressions from schema files to [`TypeRef`]s. Knows the
//! primitive names and every entity declared so far, and remembers the
//! field types of each entity so entity references can be resolved to the
//! shape of the referenced field once the whole schema is known.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::SchemaError;
use crate::parser::{self, TypeExpr};

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    String,
    Bool,
}

impl PrimitiveKind {
    /// Look up a primitive by any of its accepted spellings
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" | "integer" => Some(PrimitiveKind::Int),
            "float" => Some(PrimitiveKind::Float),
            "str" | "string" => Some(PrimitiveKind::String),
            "bool" | "boolean" => Some(PrimitiveKind::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Resolved semantic type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    ListOf(Box<TypeRef>),
    OptionalOf(Box<TypeRef>),
    /// Reference to an entity; conforms to the type of its identifier
    EntityRef(String),
}

impl TypeRef {
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeRef::OptionalOf(_))
    }

    /// Entity referenced anywhere inside this type
    pub fn referenced_entity(&self) -> Option<&str> {
        match self {
            TypeRef::Primitive(_) => None,
            TypeRef::ListOf(inner) | TypeRef::OptionalOf(inner) => inner.referenced_entity(),
            TypeRef::EntityRef(name) => Some(name),
        }
    }

    /// The primitive kind, if this is a bare primitive
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{kind}"),
            TypeRef::ListOf(inner) => write!(f, "list<{inner}>"),
            TypeRef::OptionalOf(inner) => write!(f, "optional<{inner}>"),
            TypeRef::EntityRef(name) => write!(f, "ref {name}"),
        }
    }
}

/// Keywords of the type grammar; entities may not use these names
const RESERVED_NAMES: &[&str] = &["list", "List", "optional", "Optional", "ref"];

#[derive(Debug, Clone, Default)]
struct EntityTypes {
    identifier: Option<String>,
    fields: HashMap<String, TypeRef>,
}

/// Registry of primitives and declared entities
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entities: BTreeMap<String, EntityTypes>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entity name so type expressions can refer to it
    pub fn declare_entity(&mut self, name: &str) -> Result<(), SchemaError> {
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(SchemaError::malformed(
                name,
                "entity names must be non-empty and contain only letters, digits and '_'",
            ));
        }
        if PrimitiveKind::from_name(name).is_some() || RESERVED_NAMES.contains(&name) {
            return Err(SchemaError::malformed(
                name,
                "entity name collides with a built-in type name",
            ));
        }
        if self.entities.contains_key(name) {
            return Err(SchemaError::DuplicateEntity(name.to_string()));
        }

        self.entities.insert(name.to_string(), EntityTypes::default());
        Ok(())
    }

    /// Check if a name is a declared entity
    pub fn is_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// List declared entity names (sorted)
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve a type expression
    ///
    /// Errors carry no location; callers attach one with
    /// `SchemaError::in_field`.
    pub fn resolve(&self, type_name: &str) -> Result<TypeRef, SchemaError> {
        let expr = parser::parse_type_expr(type_name).map_err(|e| SchemaError::TypeSyntax {
            expression: type_name.to_string(),
            reason: e.0,
        })?;

        self.resolve_expr(&expr)
    }

    fn resolve_expr(&self, expr: &TypeExpr) -> Result<TypeRef, SchemaError> {
        match expr {
            TypeExpr::Name(name) => {
                if let Some(kind) = PrimitiveKind::from_name(name) {
                    Ok(TypeRef::Primitive(kind))
                } else if self.is_entity(name) {
                    Ok(TypeRef::EntityRef(name.clone()))
                } else {
                    Err(unknown(name))
                }
            }
            TypeExpr::Ref(name) => {
                if self.is_entity(name) {
                    Ok(TypeRef::EntityRef(name.clone()))
                } else {
                    Err(unknown(name))
                }
            }
            TypeExpr::List(inner) => Ok(TypeRef::ListOf(Box::new(self.resolve_expr(inner)?))),
            TypeExpr::Optional(inner) => {
                Ok(TypeRef::OptionalOf(Box::new(self.resolve_expr(inner)?)))
            }
        }
    }

    /// Record the resolved type of an entity field
    pub fn register_field(&mut self, entity: &str, field: &str, ty: TypeRef) {
        self.entities
            .entry(entity.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), ty);
    }

    /// Record which field identifies instances of an entity
    pub fn set_identifier(&mut self, entity: &str, field: &str) {
        self.entities.entry(entity.to_string()).or_default().identifier = Some(field.to_string());
    }

    /// Identifier field of an entity
    pub fn identifier_field(&self, entity: &str) -> Option<&str> {
        self.entities.get(entity)?.identifier.as_deref()
    }

    /// Resolved type of an entity field
    pub fn field_type(&self, entity: &str, field: &str) -> Option<&TypeRef> {
        self.entities.get(entity)?.fields.get(field)
    }
}

fn unknown(name: &str) -> SchemaError {
    SchemaError::UnknownType {
        entity: String::new(),
        field: String::new(),
        type_name: name.to_string(),
    }
}
