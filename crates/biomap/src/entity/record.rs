//! Entity and dataset containers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MapperError, Result};

use super::value::is_blank;

/// One biological record: an ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    fields: IndexMap<String, Value>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entity from a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(MapperError::Config(format!(
                "Entity must be a JSON object, got: {}",
                other
            ))),
        }
    }

    /// Add a field, returning the entity (builder style).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a field as non-empty text.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check whether a field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Iterate over `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entity has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when at least one of `fields` holds a non-blank value.
    pub fn has_any_value(&self, fields: &[String]) -> bool {
        fields
            .iter()
            .any(|f| self.fields.get(f).is_some_and(|v| !is_blank(v)))
    }

    /// A copy of this entity with `fields` merged on top.
    ///
    /// Existing fields with the same name are replaced in place; new fields
    /// are appended.
    pub fn with_fields<I>(&self, fields: I) -> Entity
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut merged = self.clone();
        merged.fields.extend(fields);
        merged
    }

    /// A copy of this entity without the given fields.
    pub fn without_fields(&self, fields: &[String]) -> Entity {
        let mut stripped = self.clone();
        for field in fields {
            stripped.fields.shift_remove(field);
        }
        stripped
    }

    /// A copy of this entity where sentinel values in `fields` become null.
    pub fn with_sentinels_blanked(&self, fields: &[String], sentinels: &[&str]) -> Entity {
        let mut cleaned = self.clone();
        for field in fields {
            if let Some(value) = cleaned.fields.get_mut(field) {
                if matches!(value, Value::String(s) if sentinels.contains(&s.trim())) {
                    *value = Value::Null;
                }
            }
        }
        cleaned
    }

    /// Consume the entity and return its fields.
    pub fn into_fields(self) -> IndexMap<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for Entity {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// An ordered collection of entities sharing one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column names, in first-seen order across rows.
    pub columns: Vec<String>,
    /// Row data.
    pub rows: Vec<Entity>,
}

impl Dataset {
    /// Create a dataset, deriving the column list from the rows.
    pub fn new(rows: Vec<Entity>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for name in row.field_names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Self { columns, rows }
    }

    /// Build a dataset from a JSON array of objects.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let rows = items
                    .into_iter()
                    .map(Entity::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::new(rows))
            }
            other => Err(MapperError::Config(format!(
                "Dataset must be a JSON array of objects, got: {}",
                other
            ))),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row.
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.rows.get(index)
    }

    /// Iterate over rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.rows.iter()
    }

    /// All values of one column (missing cells are null).
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(name).unwrap_or(&Value::Null))
    }
}
