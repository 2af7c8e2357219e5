//! Schema-level errors.
//!
//! Only problems that make the schema unusable are errors. Record-level
//! problems are violations collected into a [`RejectedRecord`], and
//! entity-level problems are [`SchemaMismatch`] entries in the outcome.
//!
//! [`RejectedRecord`]: crate::validation::RejectedRecord
//! [`SchemaMismatch`]: crate::validation::SchemaMismatch

use thiserror::Error;

/// Error raised while loading or compiling a schema.
///
/// Any of these aborts a run before a single record is validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field or relationship declares a type the registry cannot resolve.
    #[error("unknown type '{type_name}'{}", location(.entity, .field))]
    UnknownType {
        entity: String,
        field: String,
        type_name: String,
    },

    /// A type expression does not match the type grammar.
    #[error("invalid type expression '{expression}': {reason}")]
    TypeSyntax { expression: String, reason: String },

    /// Relationship targets form a cycle.
    #[error("cyclic schema: {}", .entities.join(" -> "))]
    CyclicSchema { entities: Vec<String> },

    /// Two entities share a name.
    #[error("entity '{0}' is declared more than once")]
    DuplicateEntity(String),

    /// Any other structural problem in an entity definition.
    #[error("malformed schema for entity '{entity}': {reason}")]
    Malformed { entity: String, reason: String },
}

impl SchemaError {
    pub(crate) fn malformed(entity: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the entity and field a type expression belongs to.
    ///
    /// The registry resolves bare expressions and cannot know where they came
    /// from; callers fill that in here.
    pub(crate) fn in_field(self, entity: &str, field: &str) -> Self {
        match self {
            Self::UnknownType { type_name, .. } => Self::UnknownType {
                entity: entity.to_string(),
                field: field.to_string(),
                type_name,
            },
            Self::TypeSyntax { expression, reason } => Self::Malformed {
                entity: entity.to_string(),
                reason: format!("field '{field}': invalid type expression '{expression}': {reason}"),
            },
            other => other,
        }
    }
}

fn location(entity: &str, field: &str) -> String {
    if entity.is_empty() {
        String::new()
    } else {
        format!(" for '{entity}.{field}'")
    }
}
