//! Validation Engine
//!
//! Validators built from the schema, the run-scoped identifier index, and
//! the engine that ties them together.

pub mod engine;
pub mod index;
pub mod outcome;
pub mod validator;
pub mod violation;

pub use engine::{run, ValidationEngine};
pub use index::{Identifier, IdentifierIndex};
pub use outcome::{
    Dataset, MismatchKind, Record, RejectedRecord, SchemaMismatch, ValidatedEntity,
    ValidationOutcome,
};
pub use validator::{EntityFactory, EntityValidator};
pub use violation::{FieldProblem, FieldViolation, ReferenceViolation, Violation};
