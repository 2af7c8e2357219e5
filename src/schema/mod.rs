//! Schema System
//!
//! Raw schema documents, the type registry, and the validated schema model.

pub mod definition;
pub mod model;
pub mod registry;

pub use definition::{Cardinality, EntityDef, FieldConstraints, FieldDef, RelationshipDef, SchemaFile};
pub use model::{EntitySchema, FieldSpec, RelationshipSpec, Schema};
pub use registry::{PrimitiveKind, TypeRef, TypeRegistry};
