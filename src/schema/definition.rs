//! Schema File Types
//!
//! Raw shapes deserialized from a schema document. Nothing here is checked
//! beyond what serde enforces; [`Schema::from_file`] turns these into the
//! validated model.
//!
//! [`Schema::from_file`]: crate::schema::Schema::from_file

use serde::{Deserialize, Serialize};

/// Root schema document.
///
/// Either a bare list of entity definitions (the YAML layout) or a table
/// with an `entities` list (needed for TOML, which has no top-level arrays).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SchemaFile {
    Entities(Vec<EntityDef>),
    Document { entities: Vec<EntityDef> },
}

impl SchemaFile {
    pub fn into_entities(self) -> Vec<EntityDef> {
        match self {
            SchemaFile::Entities(entities) => entities,
            SchemaFile::Document { entities } => entities,
        }
    }
}

/// Entity definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EntityDef {
    pub name: String,
    /// Identifier field; inferred when omitted
    #[serde(default)]
    pub identifier: Option<String>,
    /// Reject record keys that are neither fields nor relationship attributes
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
}

/// Field definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
    pub constraints: Option<FieldConstraints>,
}

/// Value constraints on a field
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FieldConstraints {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub enum_values: Option<Vec<String>>,
    /// Regular expression the whole string must match
    pub pattern: Option<String>,
}

/// Relationship definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RelationshipDef {
    pub attribute: String,
    pub target: String,
    #[serde(default, alias = "schema")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub reference_field: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// Relationship cardinality
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[serde(alias = "one-to-many")]
    OneToMany,
    #[serde(alias = "many-to-many")]
    ManyToMany,
    #[serde(alias = "many-to-one")]
    ManyToOne,
}

impl Cardinality {
    /// Whether the attribute holds a list of references
    pub fn is_list(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOOL_YAML: &str = r#"
- name: Class
  fields:
    - name: class_id
      type: int
    - name: name
      type: str
- name: Tutor
  fields:
    - name: employee_id
      type: int
  relationships:
    - schema: one_to_many
      target: Class
      attribute: Class
      type: List[int]
      reference_field: class_id
"#;

    #[test]
    fn test_parse_list_layout() {
        let file: SchemaFile = serde_yaml::from_str(SCHOOL_YAML).unwrap();
        let entities = file.into_entities();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "Class");
        assert_eq!(entities[0].fields[1].type_name, "str");

        let rel = &entities[1].relationships[0];
        assert_eq!(rel.cardinality, Some(Cardinality::OneToMany));
        assert_eq!(rel.type_name.as_deref(), Some("List[int]"));
        assert_eq!(rel.reference_field.as_deref(), Some("class_id"));
    }

    #[test]
    fn test_parse_document_layout_from_toml() {
        let content = r#"
[[entities]]
name = "Class"
identifier = "class_id"

[[entities.fields]]
name = "class_id"
type = "int"
"#;
        let file: SchemaFile = toml::from_str(content).unwrap();
        let entities = file.into_entities();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].identifier.as_deref(), Some("class_id"));
        assert!(!entities[0].strict);
    }

    #[test]
    fn test_cardinality_spellings() {
        let a: Cardinality = serde_yaml::from_str("many_to_many").unwrap();
        let b: Cardinality = serde_yaml::from_str("many-to-one").unwrap();

        assert!(a.is_list());
        assert_eq!(b, Cardinality::ManyToOne);
        assert!(!b.is_list());
    }
}
