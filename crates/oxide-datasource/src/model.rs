//! The model layer boundary.
//!
//! Models own their declared schema and any cached query results. The
//! datasource reads the schema, adds fields derived from external tables, and
//! signals cache invalidation after writes.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::datatype::Datatype;
use crate::error::Result;

/// Default primary key field.
pub const DEFAULT_PRIMARY_KEY: &str = "_id";

/// Constraints attached to a declared field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// The model requires a value.
    #[serde(default)]
    pub required: bool,
    /// Values must be unique.
    #[serde(default)]
    pub unique: bool,
}

/// A declared field: its datatype name and constraints.
///
/// The datatype is kept as the model layer wrote it; it is only checked
/// against [`Datatype`] when the field has to become a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Datatype name, e.g. `string` or `datetime`.
    pub datatype: String,
    /// Field constraints.
    #[serde(default)]
    pub constraints: Constraints,
}

impl FieldDescriptor {
    /// Creates a descriptor with no constraints.
    #[must_use]
    pub fn new(datatype: impl Into<String>) -> Self {
        Self {
            datatype: datatype.into(),
            constraints: Constraints::default(),
        }
    }
}

impl From<Datatype> for FieldDescriptor {
    fn from(datatype: Datatype) -> Self {
        Self::new(datatype.as_str())
    }
}

/// A named declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field descriptor.
    #[serde(flatten)]
    pub descriptor: FieldDescriptor,
}

/// The ordered set of fields a model declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredSchema {
    fields: Vec<Field>,
}

impl DeclaredSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing an existing one with the same name in place.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<FieldDescriptor>,
    ) -> Self {
        self.insert(name, descriptor);
        self
    }

    /// Adds a field, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: impl Into<FieldDescriptor>) {
        let name = name.into();
        let descriptor = descriptor.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.descriptor = descriptor,
            None => self.fields.push(Field { name, descriptor }),
        }
    }

    /// Removes a field by name.
    pub fn remove(&mut self, name: &str) -> Option<FieldDescriptor> {
        let index = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(index).descriptor)
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.descriptor)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.descriptor))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&str> for FieldDescriptor {
    fn from(datatype: &str) -> Self {
        Self::new(datatype)
    }
}

/// A model as seen by the datasource.
pub trait Model: Send + Sync {
    /// Table backing the model.
    fn table(&self) -> &str;

    /// Primary key field.
    fn primary_key(&self) -> &str {
        DEFAULT_PRIMARY_KEY
    }

    /// Declared schema.
    fn schema(&self) -> &DeclaredSchema;

    /// Whether the schema is derived from the live table instead of declared.
    fn uses_external_schema(&self) -> bool {
        false
    }

    /// Adds a field derived from the live table.
    fn add_field(&mut self, name: &str, datatype: Datatype);

    /// Marks cached results for this model as stale.
    fn invalidate_cache(&self) {}
}

/// A model described by data, e.g. loaded from a JSON file.
///
/// ```json
/// {
///   "table": "people",
///   "fields": [
///     {"name": "name", "datatype": "string"},
///     {"name": "born", "datatype": "date", "constraints": {"required": true}}
///   ]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Table name.
    pub table: String,
    /// Primary key field.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Derive the schema from the live table.
    #[serde(default)]
    pub external_schema: bool,
    /// Declared fields.
    #[serde(default)]
    pub fields: DeclaredSchema,
    #[serde(skip)]
    cache_generation: AtomicU64,
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

impl ModelDefinition {
    /// Creates a model with the default primary key and no fields.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: default_primary_key(),
            external_schema: false,
            fields: DeclaredSchema::new(),
            cache_generation: AtomicU64::new(0),
        }
    }

    /// Sets the declared schema.
    #[must_use]
    pub fn with_schema(mut self, schema: DeclaredSchema) -> Self {
        self.fields = schema;
        self
    }

    /// Sets the primary key field.
    #[must_use]
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Derives the schema from the live table.
    #[must_use]
    pub fn external(mut self) -> Self {
        self.external_schema = true;
        self
    }

    /// Returns how many times the cache has been invalidated.
    #[must_use]
    pub fn cache_generation(&self) -> u64 {
        self.cache_generation.load(Ordering::Relaxed)
    }

    /// Loads a model definition from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Model for ModelDefinition {
    fn table(&self) -> &str {
        &self.table
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn schema(&self) -> &DeclaredSchema {
        &self.fields
    }

    fn uses_external_schema(&self) -> bool {
        self.external_schema
    }

    fn add_field(&mut self, name: &str, datatype: Datatype) {
        self.fields.insert(name, datatype);
    }

    fn invalidate_cache(&self) {
        self.cache_generation.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = DeclaredSchema::new()
            .field("zeta", "string")
            .field("alpha", "number")
            .field("mid", Datatype::Boolean);
        let names: Vec<&str> = schema.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut schema = DeclaredSchema::new().field("a", "string").field("b", "string");
        schema.insert("a", "number");
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.iter().next().unwrap().1.datatype, "number");
        assert_eq!(schema.remove("a").unwrap().datatype, "number");
        assert!(schema.get("a").is_none());
    }

    #[test]
    fn test_definition_from_json() {
        let model: ModelDefinition = serde_json::from_str(
            r#"{
                "table": "people",
                "fields": [
                    {"name": "name", "datatype": "string"},
                    {"name": "born", "datatype": "date", "constraints": {"required": true}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(model.table(), "people");
        assert_eq!(model.primary_key(), "_id");
        assert!(!model.uses_external_schema());
        assert_eq!(model.schema().len(), 2);
        assert!(model.schema().get("born").unwrap().constraints.required);
    }

    #[test]
    fn test_invalidate_cache_bumps_generation() {
        let model = ModelDefinition::new("people");
        assert_eq!(model.cache_generation(), 0);
        model.invalidate_cache();
        model.invalidate_cache();
        assert_eq!(model.cache_generation(), 2);
    }

    #[test]
    fn test_add_field() {
        let mut model = ModelDefinition::new("ext").external();
        model.add_field("count", Datatype::Number);
        assert_eq!(model.schema().get("count").unwrap().datatype, "number");
    }
}
