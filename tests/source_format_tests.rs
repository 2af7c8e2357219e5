//! The same schema and data in every supported format validate identically
use std::fs;

use schema_validator::source::{load_dataset, load_schema};
use schema_validator::ValidationEngine;
use tempfile::TempDir;

const SCHEMA_YAML: &str = r#"
entities:
  - name: Class
    fields:
      - name: class_id
        type: int
  - name: Student
    fields:
      - name: student_id
        type: int
    relationships:
      - schema: many_to_many
        target: Class
        attribute: Class
        type: List[int]
"#;

const SCHEMA_JSON: &str = r#"{
  "entities": [
    {"name": "Class", "fields": [{"name": "class_id", "type": "int"}]},
    {
      "name": "Student",
      "fields": [{"name": "student_id", "type": "int"}],
      "relationships": [
        {"schema": "many_to_many", "target": "Class", "attribute": "Class", "type": "List[int]"}
      ]
    }
  ]
}"#;

const SCHEMA_TOML: &str = r#"
[[entities]]
name = "Class"
fields = [{ name = "class_id", type = "int" }]

[[entities]]
name = "Student"
fields = [{ name = "student_id", type = "int" }]
relationships = [
  { schema = "many-to-many", target = "Class", attribute = "Class", type = "list<int>" },
]
"#;

const DATA_YAML: &str = r#"
Class:
  - class_id: 1
Student:
  - student_id: 1
    Class: [1]
  - student_id: 2
    Class: [1, 2]
"#;

const DATA_JSON: &str = r#"{
  "Class": [{"class_id": 1}],
  "Student": [
    {"student_id": 1, "Class": [1]},
    {"student_id": 2, "Class": [1, 2]}
  ]
}"#;

const DATA_TOML: &str = r#"
[[Class]]
class_id = 1

[[Student]]
student_id = 1
Class = [1]

[[Student]]
student_id = 2
Class = [1, 2]
"#;

#[test]
fn test_formats_are_equivalent() {
    let dir = TempDir::new().unwrap();
    let mut outcomes = Vec::new();

    for (ext, schema, data) in [
        ("yaml", SCHEMA_YAML, DATA_YAML),
        ("json", SCHEMA_JSON, DATA_JSON),
        ("toml", SCHEMA_TOML, DATA_TOML),
    ] {
        let schema_path = dir.path().join(format!("model.{ext}"));
        let data_path = dir.path().join(format!("data.{ext}"));
        fs::write(&schema_path, schema).unwrap();
        fs::write(&data_path, data).unwrap();

        let schema = load_schema(&schema_path).unwrap();
        let dataset = load_dataset(&data_path).unwrap();
        outcomes.push(ValidationEngine::new(&schema).unwrap().run(&dataset));
    }

    assert_eq!(outcomes[0].accepted_count(), 2);
    assert_eq!(outcomes[0].rejected_count(), 1);
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0], outcomes[2]);
}

#[test]
fn test_load_errors_name_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.yaml");
    fs::write(&path, "- name: [unclosed").unwrap();

    let err = load_schema(&path).unwrap_err();
    assert!(format!("{err:#}").contains("model.yaml"));

    let missing = dir.path().join("data.json");
    let err = load_dataset(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to read data file"));
}

#[test]
fn test_bundled_school_sample() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/school");
    let schema = load_schema(&root.join("model.yaml")).unwrap();
    let dataset = load_dataset(&root.join("data.yaml")).unwrap();

    let outcome = ValidationEngine::new(&schema).unwrap().run(&dataset);
    assert_eq!(outcome.order, vec!["Class", "Tutor", "Student"]);
    assert_eq!(outcome.accepted_count(), 4);
    assert_eq!(outcome.rejected_for("Tutor").len(), 1);

    let student = &outcome.rejected_for("Student")[0];
    let messages: Vec<String> = student.violations.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "field 'year' value 14 exceeds maximum 13",
            "field 'nickname' is not declared",
        ]
    );
}
