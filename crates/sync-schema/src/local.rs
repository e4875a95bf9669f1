//! Persisted local schema
//!
//! The local schema is a JSON document loaded once and never mutated:
//! - nodes live under `schema.properties`, falling back to `properties`
//! - the version is read from `version`, `meta.lastTouchedVersion` or
//!   `$version`, in that order
//! - enumerated fields are found by walking every `properties` map

use crate::error::SchemaError;
use crate::model::{
    EnumTable, NodeDescriptor, PropertyDescriptor, SchemaDocument, SchemaSnapshot, UNKNOWN_TYPE,
    UNKNOWN_VERSION,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const VERSION_PATHS: [&str; 3] = ["version", "meta.lastTouchedVersion", "$version"];

/// Read-only view over the persisted local schema document
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSchema {
    root: Value,
    path: PathBuf,
}

impl LocalSchema {
    /// Load from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not JSON, or its root is
    /// not an object
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SchemaError::io_error(path, e))?;
        let schema = Self::from_json_str(&content, path)?;
        tracing::debug!(path = %path.display(), nodes = schema.node_names().len(), "loaded local schema");
        Ok(schema)
    }

    /// Parse from a JSON string; `origin` is only used in error messages
    ///
    /// # Errors
    /// Returns error if the content is not JSON or its root is not an object
    pub fn from_json_str(content: &str, origin: impl Into<PathBuf>) -> Result<Self, SchemaError> {
        let path = origin.into();
        let root: Value = serde_json::from_str(content).map_err(|source| SchemaError::InvalidJson {
            path: path.clone(),
            source,
        })?;
        Self::from_value(root, path)
    }

    /// Wrap an already parsed value
    ///
    /// # Errors
    /// Returns error if the value is not an object
    pub fn from_value(root: Value, origin: impl Into<PathBuf>) -> Result<Self, SchemaError> {
        let path = origin.into();
        if !root.is_object() {
            return Err(SchemaError::NotAnObject(path));
        }
        Ok(Self { root, path })
    }

    /// Where the schema came from
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw JSON value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Get value at path (dot notation)
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            match current {
                Value::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Declared version, or `"unknown"`
    #[must_use]
    pub fn version(&self) -> String {
        VERSION_PATHS
            .iter()
            .filter_map(|path| self.get_path(path))
            .find_map(scalar_to_string)
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// The node collection, `schema.properties` taking precedence
    #[must_use]
    pub fn node_collection(&self) -> Option<&Map<String, Value>> {
        self.get_path("schema.properties")
            .and_then(Value::as_object)
            .or_else(|| self.get_path("properties").and_then(Value::as_object))
    }

    /// Names of the top-level nodes
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        self.node_collection()
            .map(|nodes| nodes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Node tree in the shared model
    #[must_use]
    pub fn document(&self) -> SchemaDocument {
        self.node_collection()
            .map(|nodes| {
                nodes
                    .iter()
                    .map(|(name, value)| (name.clone(), node_from_value(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every `enum` attribute in the tree, keyed by dotted path
    ///
    /// The walk starts at `schema` when present, otherwise at the document
    /// root. An `enum` on the root itself is keyed `"root"`.
    #[must_use]
    pub fn enum_table(&self) -> EnumTable {
        let start = self.root.get("schema").filter(|v| v.is_object()).unwrap_or(&self.root);
        let mut table = EnumTable::new();
        collect_enums(start, "", &mut table);
        table
    }

    /// Comparable snapshot of the local side
    #[must_use]
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot::new(self.version(), self.document(), self.enum_table())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collect_enums(value: &Value, path: &str, table: &mut EnumTable) {
    let Some(obj) = value.as_object() else {
        return;
    };

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        let key = if path.is_empty() { "root" } else { path };
        table.insert(key, values.iter().map(enum_value_to_string));
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, child) in props {
            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            collect_enums(child, &child_path, table);
        }
    }
}

fn enum_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_of(obj: &Map<String, Value>) -> String {
    match obj.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("|"),
        _ => UNKNOWN_TYPE.to_string(),
    }
}

fn node_from_value(value: &Value) -> NodeDescriptor {
    let Some(obj) = value.as_object() else {
        return NodeDescriptor::new();
    };

    let required_names: Vec<&str> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut node = NodeDescriptor::new();
    node.description = obj.get("description").and_then(Value::as_str).map(str::to_string);

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, prop_value) in props {
            let mut prop = property_from_value(prop_value);
            if prop.required.is_none() && required_names.contains(&name.as_str()) {
                prop.required = Some(true);
            }
            node.properties.insert(name.clone(), prop);
        }
    }
    node
}

fn property_from_value(value: &Value) -> PropertyDescriptor {
    let Some(obj) = value.as_object() else {
        return PropertyDescriptor::unknown();
    };

    let mut prop = PropertyDescriptor::new(type_of(obj));
    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        prop = prop.with_enum(values.iter().map(enum_value_to_string));
    }
    prop.default = obj.get("default").cloned();
    prop.required = obj.get("required").and_then(Value::as_bool);
    prop
}
