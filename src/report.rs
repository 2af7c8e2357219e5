//! Reporting
//!
//! Renders a [`ValidationOutcome`] for people (text) or tools (JSON). The text
//! report lists every violation of every rejected record.

use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;

use crate::validation::{Record, ValidationOutcome};

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render an outcome in the given format
pub fn render(outcome: &ValidationOutcome, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(outcome)),
        ReportFormat::Json => render_json(outcome),
    }
}

pub fn render_json(outcome: &ValidationOutcome) -> Result<String> {
    let mut json = serde_json::to_string_pretty(outcome)?;
    json.push('\n');
    Ok(json)
}

pub fn render_text(outcome: &ValidationOutcome) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Validation order: {}", outcome.order.join(", "));

    let _ = writeln!(out, "\nAccepted:");
    for entity in &outcome.order {
        let accepted = outcome.accepted_for(entity);
        if accepted.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {} ({})", entity, accepted.len());
        for valid in accepted {
            let _ = writeln!(out, "    {}", record_text(&valid.record));
        }
    }

    let _ = writeln!(out, "\nRejected:");
    for entity in &outcome.order {
        let rejected = outcome.rejected_for(entity);
        if rejected.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {} ({})", entity, rejected.len());
        for invalid in rejected {
            let _ = writeln!(out, "    {}", record_text(&invalid.record));
            for violation in &invalid.violations {
                let _ = writeln!(out, "      - {violation}");
            }
        }
    }

    if !outcome.mismatches.is_empty() {
        let _ = writeln!(out, "\nSchema mismatches:");
        for mismatch in &outcome.mismatches {
            let _ = writeln!(out, "  - {mismatch}");
        }
    }

    let _ = writeln!(
        out,
        "\nSummary: {} accepted, {} rejected, {} mismatched",
        outcome.accepted_count(),
        outcome.rejected_count(),
        outcome.mismatches.len()
    );

    out
}

/// Render just the validation order, one dependency level per line
pub fn render_levels(levels: &[Vec<String>]) -> String {
    let mut out = String::new();
    for (depth, level) in levels.iter().enumerate() {
        let _ = writeln!(out, "{}: {}", depth, level.join(", "));
    }
    out
}

fn record_text(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| "<unprintable record>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{
        Identifier, MismatchKind, ReferenceViolation, RejectedRecord, SchemaMismatch,
        ValidatedEntity, Violation,
    };
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn sample_outcome() -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            order: vec!["Class".to_string(), "Tutor".to_string()],
            ..ValidationOutcome::default()
        };
        outcome.accepted.insert(
            "Class".to_string(),
            vec![ValidatedEntity {
                entity: "Class".to_string(),
                record: record(json!({"class_id": 1})),
            }],
        );
        outcome.rejected.insert(
            "Tutor".to_string(),
            vec![RejectedRecord {
                entity: "Tutor".to_string(),
                record: record(json!({"employee_id": 2, "Class": [3]})),
                violations: vec![
                    Violation::missing("name"),
                    Violation::Reference(ReferenceViolation {
                        attribute: "Class".to_string(),
                        target: "Class".to_string(),
                        reference_field: "class_id".to_string(),
                        identifier: Identifier::from(3),
                    }),
                ],
            }],
        );
        outcome.mismatches.push(SchemaMismatch {
            entity: "Principal".to_string(),
            kind: MismatchKind::NotInSchema,
        });
        outcome
    }

    #[test]
    fn test_text_lists_every_violation() {
        let text = render_text(&sample_outcome());

        assert!(text.starts_with("Validation order: Class, Tutor\n"));
        assert!(text.contains("  Class (1)\n    {\"class_id\":1}\n"));
        assert!(text.contains("      - field 'name' is required but missing\n"));
        assert!(text.contains("      - attribute 'Class' references unknown Class.class_id 3\n"));
        assert!(text.contains("  - entity 'Principal' has records but is not declared in the schema\n"));
        assert!(text.ends_with("Summary: 1 accepted, 1 rejected, 1 mismatched\n"));
    }

    #[test]
    fn test_json_round_trips_counts() {
        let json = render(&sample_outcome(), ReportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["accepted"]["Class"].as_array().unwrap().len(), 1);
        let violations = value["rejected"]["Tutor"][0]["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1]["kind"], "reference");
        assert_eq!(violations[1]["identifier"], 3);
        assert_eq!(value["mismatches"][0]["kind"], "not_in_schema");
    }

    #[test]
    fn test_render_levels() {
        let levels = vec![
            vec!["Class".to_string(), "Room".to_string()],
            vec!["Tutor".to_string()],
        ];
        assert_eq!(render_levels(&levels), "0: Class, Room\n1: Tutor\n");
    }
}
