//! Validation Engine
//!
//! Orders entities so every relationship target is validated before the
//! entities that reference it, then validates each record against its
//! entity and partitions the results.

use std::collections::{BTreeMap, HashMap};

use crate::error::SchemaError;
use crate::schema::Schema;
use crate::validation::index::IdentifierIndex;
use crate::validation::outcome::{Dataset, MismatchKind, SchemaMismatch, ValidationOutcome};
use crate::validation::validator::{EntityFactory, EntityValidator};

/// Compiled validators in validation order
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    validators: Vec<EntityValidator>,
    levels: Vec<Vec<String>>,
}

impl ValidationEngine {
    /// Compile a schema.
    ///
    /// Every schema-level failure surfaces here, before any record is seen.
    pub fn new(schema: &Schema) -> Result<Self, SchemaError> {
        let levels = dependency_levels(schema)?;

        let mut by_name: HashMap<String, EntityValidator> = HashMap::new();
        for entity in schema.entities() {
            let validator = EntityFactory::build(entity, schema.registry())?;
            by_name.insert(entity.name.clone(), validator);
        }

        // Non-identifier reference fields must be indexed too
        let wanted: Vec<(String, String)> = by_name
            .values()
            .flat_map(|v| v.references().map(|(e, f)| (e.to_string(), f.to_string())))
            .collect();
        for (entity, field) in wanted {
            if let Some(target) = by_name.get_mut(&entity) {
                target.index_field(&field);
            }
        }

        let validators = levels
            .iter()
            .flatten()
            .filter_map(|name| by_name.remove(name))
            .collect();

        Ok(Self { validators, levels })
    }

    /// Entities in validation order
    pub fn order(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.entity()).collect()
    }

    /// Dependency levels; a level only references earlier levels
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    pub fn validator(&self, entity: &str) -> Option<&EntityValidator> {
        self.validators.iter().find(|v| v.entity() == entity)
    }

    /// Validate a dataset.
    ///
    /// Starts from an empty index every time, so repeated runs over the same
    /// input produce identical outcomes.
    pub fn run(&self, dataset: &Dataset) -> ValidationOutcome {
        let mut index = IdentifierIndex::new();
        let mut outcome = ValidationOutcome {
            order: self.order().into_iter().map(str::to_string).collect(),
            ..ValidationOutcome::default()
        };

        for entity in dataset.keys() {
            if self.validator(entity).is_none() {
                log::warn!("Skipping '{}': not declared in the schema", entity);
                outcome.mismatches.push(SchemaMismatch {
                    entity: entity.clone(),
                    kind: MismatchKind::NotInSchema,
                });
            }
        }

        for validator in &self.validators {
            let entity = validator.entity();
            let Some(records) = dataset.get(entity) else {
                log::warn!("No records for '{}': absent from the dataset", entity);
                outcome.mismatches.push(SchemaMismatch {
                    entity: entity.to_string(),
                    kind: MismatchKind::NotInDataset,
                });
                continue;
            };

            let mut accepted = Vec::new();
            let mut rejected = Vec::new();

            for record in records {
                match validator.validate(record.clone(), &index) {
                    Ok(valid) => {
                        // Register before the next record so later siblings
                        // can reference this one
                        validator.register(&valid, &mut index);
                        accepted.push(valid);
                    }
                    Err(invalid) => rejected.push(invalid),
                }
            }

            log::debug!(
                "Validated '{}': {} accepted, {} rejected",
                entity,
                accepted.len(),
                rejected.len()
            );

            outcome.accepted.insert(entity.to_string(), accepted);
            outcome.rejected.insert(entity.to_string(), rejected);
        }

        outcome.mismatches.sort();

        log::info!(
            "Validation finished: {} accepted, {} rejected, {} mismatched entities",
            outcome.accepted_count(),
            outcome.rejected_count(),
            outcome.mismatches.len()
        );

        outcome
    }
}

/// Compile `schema` and validate `dataset` against it
pub fn run(schema: &Schema, dataset: &Dataset) -> Result<ValidationOutcome, SchemaError> {
    Ok(ValidationEngine::new(schema)?.run(dataset))
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done(usize),
}

/// Group entities by the length of their longest dependency chain.
///
/// Inside a level, entities keep their declaration order. Self-references do
/// not count as dependencies.
fn dependency_levels(schema: &Schema) -> Result<Vec<Vec<String>>, SchemaError> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut levels: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    for entity in schema.entities() {
        visit(schema, &entity.name, &mut marks)?;
    }

    for entity in schema.entities() {
        if let Some(Mark::Done(depth)) = marks.get(entity.name.as_str()) {
            levels.entry(*depth).or_default().push(entity.name.clone());
        }
    }

    Ok(levels.into_values().collect())
}

struct Frame<'a> {
    name: &'a str,
    deps: Vec<&'a str>,
    next: usize,
}

impl<'a> Frame<'a> {
    fn new(schema: &'a Schema, name: &'a str) -> Self {
        let deps = schema
            .entity(name)
            .map(|e| e.dependencies())
            .unwrap_or_default();
        Self { name, deps, next: 0 }
    }
}

/// Depth-first walk from `root` with an explicit stack, so long dependency
/// chains cannot exhaust the call stack
fn visit<'a>(
    schema: &'a Schema,
    root: &'a str,
    marks: &mut HashMap<&'a str, Mark>,
) -> Result<(), SchemaError> {
    if marks.contains_key(root) {
        return Ok(());
    }

    marks.insert(root, Mark::Visiting);
    let mut stack = vec![Frame::new(schema, root)];

    while let Some(frame) = stack.last_mut() {
        let next = frame.deps.get(frame.next).copied();
        frame.next += 1;

        match next {
            Some(dep) => match marks.get(dep) {
                Some(Mark::Done(_)) => {}
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|f| f.name == dep).unwrap_or(0);
                    let mut entities: Vec<String> =
                        stack[start..].iter().map(|f| f.name.to_string()).collect();
                    entities.push(dep.to_string());
                    return Err(SchemaError::CyclicSchema { entities });
                }
                None => {
                    marks.insert(dep, Mark::Visiting);
                    stack.push(Frame::new(schema, dep));
                }
            },
            None => {
                let Some(done) = stack.pop() else { break };
                let depth = done
                    .deps
                    .iter()
                    .filter_map(|d| match marks.get(d) {
                        Some(Mark::Done(depth)) => Some(depth + 1),
                        _ => None,
                    })
                    .max()
                    .unwrap_or(0);
                marks.insert(done.name, Mark::Done(depth));
            }
        }
    }

    Ok(())
}
