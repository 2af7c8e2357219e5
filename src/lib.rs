//! Schema Validator
//!
//! Validates records of related entities against a declarative schema.
//!
//! This library provides:
//! - A closed-grammar type expression parser
//! - Schema loading and a type registry
//! - Per-entity validators and a dependency-ordered validation engine
//! - Text and JSON reports, configuration and watch mode

pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod runner;
pub mod schema;
pub mod source;
pub mod validation;
pub mod watch;

// Re-exports for clean public API
pub use config::Config;
pub use error::SchemaError;
pub use parser::{parse_type_expr, TypeExpr};
pub use schema::{Schema, TypeRef, TypeRegistry};
pub use validation::{
    run, Dataset, Identifier, IdentifierIndex, Record, ValidationEngine, ValidationOutcome,
    Violation,
};
