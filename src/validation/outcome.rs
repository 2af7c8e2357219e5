//! Validation inputs and results.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::violation::Violation;

/// A raw record: field name to value
pub type Record = Map<String, Value>;

/// Records per entity name
pub type Dataset = BTreeMap<String, Vec<Record>>;

/// A record that passed every check for its entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedEntity {
    pub entity: String,
    pub record: Record,
}

impl ValidatedEntity {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }
}

/// A record that failed, with every violation found on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub entity: String,
    pub record: Record,
    pub violations: Vec<Violation>,
}

/// Which side of the schema/dataset pairing is missing an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// The dataset has records for an entity the schema does not declare
    NotInSchema,
    /// The schema declares an entity the dataset has no entry for
    NotInDataset,
}

/// Entity-level mismatch; isolated to that entity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SchemaMismatch {
    pub entity: String,
    pub kind: MismatchKind,
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::NotInSchema => write!(
                f,
                "entity '{}' has records but is not declared in the schema",
                self.entity
            ),
            MismatchKind::NotInDataset => write!(
                f,
                "entity '{}' is declared in the schema but absent from the dataset",
                self.entity
            ),
        }
    }
}

/// Result of one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationOutcome {
    /// Entities in the order they were validated
    pub order: Vec<String>,
    pub accepted: BTreeMap<String, Vec<ValidatedEntity>>,
    pub rejected: BTreeMap<String, Vec<RejectedRecord>>,
    pub mismatches: Vec<SchemaMismatch>,
}

impl ValidationOutcome {
    pub fn accepted_for(&self, entity: &str) -> &[ValidatedEntity] {
        self.accepted.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rejected_for(&self, entity: &str) -> &[RejectedRecord] {
        self.rejected.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.values().map(Vec::len).sum()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.values().map(Vec::len).sum()
    }

    pub fn mismatch_for(&self, entity: &str) -> Option<&SchemaMismatch> {
        self.mismatches.iter().find(|m| m.entity == entity)
    }

    /// No rejected records and no mismatches
    pub fn is_clean(&self) -> bool {
        self.rejected_count() == 0 && self.mismatches.is_empty()
    }
}
