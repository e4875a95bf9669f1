//! Schema tree types
//!
//! The shared shape of both sides of a comparison:
//! - [`PropertyDescriptor`] for a single configuration field
//! - [`NodeDescriptor`] for a top-level configuration section
//! - [`SchemaDocument`] mapping node names to descriptors
//! - [`EnumTable`] mapping field paths to enumerated values
//! - [`SchemaSnapshot`] bundling all of the above with a version

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel used when no version could be determined
pub const UNKNOWN_VERSION: &str = "unknown";

/// Type tag for properties whose type could not be recovered
pub const UNKNOWN_TYPE: &str = "unknown";

/// Type tag carried by every node descriptor
pub const OBJECT_TYPE: &str = "object";

fn unknown_type() -> String {
    UNKNOWN_TYPE.to_string()
}

fn object_type() -> String {
    OBJECT_TYPE.to_string()
}

/// A single property within a node
///
/// Enum values are an ordered set: equality ignores order, iteration keeps
/// the order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Declared type (`"string"`, `"object"`, `"unknown"`, ...)
    #[serde(rename = "type", default = "unknown_type")]
    pub kind: String,

    /// Allowed values, if the property is enumerated
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<IndexSet<String>>,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Whether the property must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl PropertyDescriptor {
    /// Create descriptor with the given type
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            enum_values: None,
            default: None,
            required: None,
        }
    }

    /// Descriptor with the `"unknown"` type tag
    #[inline]
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TYPE)
    }

    /// With enumerated values (duplicates collapse, first wins)
    #[inline]
    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// With required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Required flag, absent meaning optional
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

impl Default for PropertyDescriptor {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A top-level configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Always `"object"`
    #[serde(rename = "type", default = "object_type")]
    pub kind: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Properties keyed by name
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDescriptor>,

    /// Excerpt of the text the node was recovered from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl NodeDescriptor {
    /// Create empty object node
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: object_type(),
            description: None,
            properties: IndexMap::new(),
            raw: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With an additional property (replaces an existing one of the same name)
    #[inline]
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// With raw excerpt
    #[inline]
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Look up a property
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }
}

impl Default for NodeDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mapping from node name to descriptor, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    nodes: IndexMap<String, NodeDescriptor>,
}

impl SchemaDocument {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node, returning the previous descriptor
    pub fn insert(&mut self, name: impl Into<String>, node: NodeDescriptor) -> Option<NodeDescriptor> {
        self.nodes.insert(name.into(), node)
    }

    /// Insert a node only if the name is not present yet
    ///
    /// Returns `true` when the node was inserted.
    pub fn insert_if_absent(&mut self, name: &str, node: impl FnOnce() -> NodeDescriptor) -> bool {
        if self.nodes.contains_key(name) {
            return false;
        }
        self.nodes.insert(name.to_string(), node());
        true
    }

    /// Look up a node
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(name)
    }

    /// Check if a node is present
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Remove a node
    pub fn remove(&mut self, name: &str) -> Option<NodeDescriptor> {
        self.nodes.shift_remove(name)
    }

    /// Node names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Iterate over `(name, descriptor)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeDescriptor)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Enum table obtained by walking every node's properties
    ///
    /// Keys are dotted `node.property` paths.
    #[must_use]
    pub fn enum_table(&self) -> EnumTable {
        let mut table = EnumTable::new();
        for (node_name, node) in &self.nodes {
            for (prop_name, prop) in &node.properties {
                if let Some(values) = &prop.enum_values {
                    table.insert(format!("{node_name}.{prop_name}"), values.iter().cloned());
                }
            }
        }
        table
    }
}

impl FromIterator<(String, NodeDescriptor)> for SchemaDocument {
    fn from_iter<I: IntoIterator<Item = (String, NodeDescriptor)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Mapping from field name or dotted path to enumerated values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumTable(IndexMap<String, Vec<String>>);

impl EnumTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert values for a field, replacing any previous entry
    ///
    /// Values are deduplicated keeping the first occurrence.
    pub fn insert<I, S>(&mut self, field: impl Into<String>, values: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(field.into(), dedup_values(values))
    }

    /// Values for a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether the field has an entry
    #[inline]
    #[must_use]
    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(field, values)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for EnumTable {
    type Item = (String, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Deduplicate values, keeping the order of first appearance
#[must_use]
pub fn dedup_values<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// One side of a comparison: version, node tree and enum table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Version string, `"unknown"` when undetermined
    pub version: String,
    /// Node tree
    pub nodes: SchemaDocument,
    /// Enumerated fields
    pub enums: EnumTable,
}

impl SchemaSnapshot {
    /// Create snapshot from explicit parts
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>, nodes: SchemaDocument, enums: EnumTable) -> Self {
        Self {
            version: version.into(),
            nodes,
            enums,
        }
    }

    /// Create snapshot whose enum table is walked from the node tree
    #[must_use]
    pub fn from_nodes(version: impl Into<String>, nodes: SchemaDocument) -> Self {
        let enums = nodes.enum_table();
        Self::new(version, nodes, enums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn enum_table_dedups_preserving_order() {
        let mut table = EnumTable::new();
        table.insert("mode", ["local", "remote", "local", "hybrid", "remote"]);

        assert_eq!(table.get("mode").unwrap(), ["local", "remote", "hybrid"]);
    }

    #[test]
    fn enum_set_equality_ignores_order() {
        let a = PropertyDescriptor::new("string").with_enum(["a", "b"]);
        let b = PropertyDescriptor::new("string").with_enum(["b", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn absent_required_is_optional() {
        assert!(!PropertyDescriptor::new("string").is_required());
        assert!(PropertyDescriptor::new("string").with_required(true).is_required());
    }

    #[test]
    fn insert_if_absent_keeps_existing() {
        let mut doc = SchemaDocument::new();
        doc.insert("gateway", NodeDescriptor::new().with_description("first"));

        let inserted = doc.insert_if_absent("gateway", || NodeDescriptor::new().with_description("second"));

        assert!(!inserted);
        assert_eq!(doc.get("gateway").unwrap().description.as_deref(), Some("first"));
    }

    #[test]
    fn document_enum_table_uses_dotted_paths() {
        let doc: SchemaDocument = [(
            "gateway".to_string(),
            NodeDescriptor::new()
                .with_property("mode", PropertyDescriptor::new("string").with_enum(["local", "remote"]))
                .with_property("port", PropertyDescriptor::new("number")),
        )]
        .into_iter()
        .collect();

        let table = doc.enum_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("gateway.mode").unwrap(), ["local", "remote"]);
    }

    #[test]
    fn property_serializes_with_schema_keys() {
        let prop = PropertyDescriptor::new("string")
            .with_enum(["a"])
            .with_default(json!("a"))
            .with_required(true);

        let value = serde_json::to_value(&prop).unwrap();
        assert_eq!(value, json!({"type": "string", "enum": ["a"], "default": "a", "required": true}));
    }

    #[test]
    fn node_deserializes_with_defaults() {
        let node: NodeDescriptor = serde_json::from_value(json!({"properties": {"port": {}}})).unwrap();
        assert_eq!(node.kind, OBJECT_TYPE);
        assert_eq!(node.property("port").unwrap().kind, UNKNOWN_TYPE);
    }
}
