//! Record-level violations.
//!
//! These are data, not errors: a record with violations becomes a
//! [`RejectedRecord`](crate::validation::RejectedRecord) carrying all of them.

use std::fmt;

use serde::Serialize;

use crate::validation::index::Identifier;

/// A single problem found on a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Field(FieldViolation),
    Reference(ReferenceViolation),
}

/// Shape problem on a field or relationship attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Field name, with an index suffix for list elements (`Class[1]`)
    pub field: String,
    #[serde(flatten)]
    pub problem: FieldProblem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum FieldProblem {
    Missing,
    TypeMismatch { expected: String, found: String },
    Constraint { message: String },
    /// Key not declared on a strict entity
    Unknown,
    DuplicateIdentifier { identifier: Identifier },
}

/// Reference to an identifier that is not in the index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceViolation {
    pub attribute: String,
    pub target: String,
    pub reference_field: String,
    pub identifier: Identifier,
}

impl Violation {
    pub fn missing(field: &str) -> Self {
        Self::field(field, FieldProblem::Missing)
    }

    pub fn type_mismatch(field: &str, expected: impl fmt::Display, found: &str) -> Self {
        Self::field(
            field,
            FieldProblem::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        )
    }

    pub fn constraint(field: &str, message: String) -> Self {
        Self::field(field, FieldProblem::Constraint { message })
    }

    pub fn field(field: &str, problem: FieldProblem) -> Self {
        Violation::Field(FieldViolation {
            field: field.to_string(),
            problem,
        })
    }

    /// Field or attribute the violation is about
    pub fn field_name(&self) -> &str {
        match self {
            Violation::Field(v) => &v.field,
            Violation::Reference(v) => &v.attribute,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Violation::Reference(_))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Field(v) => write!(f, "{v}"),
            Violation::Reference(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "field '{}' is required but missing", self.field),
            FieldProblem::TypeMismatch { expected, found } => write!(
                f,
                "field '{}' expects {}, found {}",
                self.field, expected, found
            ),
            FieldProblem::Constraint { message } => write!(f, "field '{}' {}", self.field, message),
            FieldProblem::Unknown => write!(f, "field '{}' is not declared", self.field),
            FieldProblem::DuplicateIdentifier { identifier } => write!(
                f,
                "field '{}' repeats identifier {} already accepted",
                self.field, identifier
            ),
        }
    }
}

impl fmt::Display for ReferenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attribute '{}' references unknown {}.{} {}",
            self.attribute, self.target, self.reference_field, self.identifier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_violation_names_identifier() {
        let violation = Violation::Reference(ReferenceViolation {
            attribute: "Class".to_string(),
            target: "Class".to_string(),
            reference_field: "class_id".to_string(),
            identifier: Identifier::from(3),
        });

        assert_eq!(
            violation.to_string(),
            "attribute 'Class' references unknown Class.class_id 3"
        );
        assert!(violation.is_reference());
        assert_eq!(violation.field_name(), "Class");
    }

    #[test]
    fn test_field_violation_messages() {
        assert_eq!(
            Violation::missing("name").to_string(),
            "field 'name' is required but missing"
        );
        assert_eq!(
            Violation::type_mismatch("Class[1]", "int", "string").to_string(),
            "field 'Class[1]' expects int, found string"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Violation::type_mismatch("age", "int", "string")).unwrap();

        assert_eq!(value["kind"], "field");
        assert_eq!(value["problem"], "type_mismatch");
        assert_eq!(value["field"], "age");
        assert_eq!(value["expected"], "int");
    }
}
