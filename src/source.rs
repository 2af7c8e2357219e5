//! Schema and data sources.
//!
//! Loads schema and dataset documents from YAML, JSON or TOML files. The
//! format follows the file extension.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::schema::{Schema, SchemaFile};
use crate::validation::{Dataset, Record};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
    Toml,
}

impl SourceFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(SourceFormat::Yaml),
            Some("json") => Ok(SourceFormat::Json),
            Some("toml") => Ok(SourceFormat::Toml),
            _ => bail!(
                "Unsupported file type for {} (expected .yaml, .yml, .json or .toml)",
                path.display()
            ),
        }
    }
}

/// Parse a schema document
pub fn parse_schema(content: &str, format: SourceFormat) -> Result<Schema> {
    let file: SchemaFile = match format {
        SourceFormat::Yaml => serde_yaml::from_str(content)?,
        SourceFormat::Json => serde_json::from_str(content)?,
        SourceFormat::Toml => toml::from_str(content)?,
    };

    Ok(Schema::from_file(file)?)
}

/// Load a schema file
pub fn load_schema(path: &Path) -> Result<Schema> {
    let format = SourceFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

    parse_schema(&content, format)
        .with_context(|| format!("Failed to load schema: {}", path.display()))
}

/// Parse a dataset document: a mapping from entity name to a list of records
pub fn parse_dataset(content: &str, format: SourceFormat) -> Result<Dataset> {
    let value: Value = match format {
        SourceFormat::Yaml => serde_yaml::from_str(content)?,
        SourceFormat::Json => serde_json::from_str(content)?,
        SourceFormat::Toml => toml::from_str(content)?,
    };

    let entities = match value {
        Value::Object(entities) => entities,
        // An empty YAML document
        Value::Null => return Ok(Dataset::new()),
        other => bail!("Dataset must be a mapping of entity names, found {}", kind(&other)),
    };

    let mut dataset = Dataset::new();
    for (entity, records) in entities {
        let records = match records {
            Value::Array(items) => items,
            // `Student:` with nothing under it
            Value::Null => Vec::new(),
            other => bail!("Entity '{}' must hold a list of records, found {}", entity, kind(&other)),
        };

        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, item)| into_record(item).map_err(|found| {
                anyhow!("Record {} of '{}' must be a mapping, found {}", i, entity, found)
            }))
            .collect::<Result<Vec<Record>>>()?;

        dataset.insert(entity, records);
    }

    Ok(dataset)
}

/// Load a dataset file
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let format = SourceFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    parse_dataset(&content, format)
        .with_context(|| format!("Failed to load data: {}", path.display()))
}

fn into_record(value: Value) -> std::result::Result<Record, &'static str> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("data/model.yml")).unwrap(),
            SourceFormat::Yaml
        );
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("model.toml")).unwrap(),
            SourceFormat::Toml
        );
        assert!(SourceFormat::from_path(&PathBuf::from("model.py")).is_err());
        assert!(SourceFormat::from_path(&PathBuf::from("model")).is_err());
    }

    #[test]
    fn test_parse_dataset_yaml() {
        let dataset = parse_dataset(
            r#"
Class:
  - class_id: 1
    name: Class 1
Student:
"#,
            SourceFormat::Yaml,
        )
        .unwrap();

        assert_eq!(dataset["Class"].len(), 1);
        assert!(dataset["Student"].is_empty());
    }

    #[test]
    fn test_parse_dataset_rejects_non_mapping_record() {
        let err = parse_dataset(r#"{"Class": [1, 2]}"#, SourceFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "Record 0 of 'Class' must be a mapping, found a number");
    }

    #[test]
    fn test_parse_dataset_rejects_non_list_entity() {
        let err = parse_dataset("Class = 3\n", SourceFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("must hold a list"));
    }

    #[test]
    fn test_schema_error_is_downcastable() {
        let err = parse_schema(
            r#"[{"name": "Class", "fields": [{"name": "class_id", "type": "eval('1')"}]}]"#,
            SourceFormat::Json,
        )
        .unwrap_err();

        let schema_err = err.downcast_ref::<SchemaError>().expect("schema error");
        assert!(matches!(schema_err, SchemaError::Malformed { .. }));
    }
}
