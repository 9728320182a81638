//! Graph model: entities and the crate document that holds them

use crate::error::{DomainError, Result};
use chrono::DateTime;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// `@id` of the root dataset
pub const ROOT_ID: &str = "./";

/// File name of the metadata document, also the descriptor node's `@id`
pub const METADATA_FILE: &str = "ro-crate-metadata.json";

/// Base crate context, always declared
pub const BASE_CONTEXT: &str = "https://w3id.org/ro/crate/1.1/context";

/// RO-Crate release the metadata descriptor conforms to
pub const BASE_SPEC: &str = "https://w3id.org/ro/crate/1.1";

/// Context that defines the process-run vocabulary
pub const WORKFLOW_RUN_CONTEXT: &str = "https://w3id.org/ro/terms/workflow-run/context";

/// Process Run Crate profile URI
pub const PROCESS_RUN_PROFILE: &str = "https://w3id.org/ro/wfrun/process/0.5";

/// Process Run Crate profile version
pub const PROCESS_RUN_PROFILE_VERSION: &str = "0.5";

/// `@type` of recorded executions
pub const CREATE_ACTION: &str = "CreateAction";

/// Properties holding lists of references; merged as ordered sets
pub const REFERENCE_LIST_FIELDS: [&str; 4] = ["hasPart", "object", "result", "conformsTo"];

/// Reference fields that must resolve to a node in the graph
const RESOLVED_FIELDS: [&str; 3] = ["hasPart", "object", "result"];

/// Build a `{"@id": id}` reference
pub fn reference(id: &str) -> Value {
    json!({ "@id": id })
}

/// Build a JSON array of references, in order
pub fn reference_list<'a>(ids: impl IntoIterator<Item = &'a str>) -> Value {
    Value::Array(ids.into_iter().map(reference).collect())
}

/// Ids referenced by a property value (single reference or array of them)
pub fn reference_ids(value: &Value) -> Vec<String> {
    let single = |v: &Value| v.get("@id").and_then(Value::as_str).map(str::to_string);
    match value {
        Value::Array(items) => items.iter().filter_map(single).collect(),
        other => single(other).into_iter().collect(),
    }
}

/// A node of the graph, addressed by its `@id`
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique key of the node
    pub id: String,
    /// JSON-LD `@type`, kept verbatim (string or array)
    pub entity_type: Value,
    /// All other properties
    pub properties: Map<String, Value>,
}

impl Entity {
    /// Create an entity with a single type and no properties
    pub fn new(id: impl Into<String>, entity_type: &str) -> Self {
        Self {
            id: id.into(),
            entity_type: Value::String(entity_type.to_string()),
            properties: Map::new(),
        }
    }

    /// Set a property (builder style)
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property when the value is present
    pub fn with_opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Set a property
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Read a property
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Read a string property
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether the node carries the given `@type` (alone or in a type array)
    pub fn has_type(&self, entity_type: &str) -> bool {
        match &self.entity_type {
            Value::String(t) => t == entity_type,
            Value::Array(types) => types.iter().any(|t| t.as_str() == Some(entity_type)),
            _ => false,
        }
    }

    /// Ids referenced by a property
    pub fn references(&self, key: &str) -> Vec<String> {
        self.get(key).map(reference_ids).unwrap_or_default()
    }

    /// Serialize as a JSON object
    pub fn to_value(&self) -> Value {
        let mut object = self.properties.clone();
        object.insert("@id".to_string(), Value::String(self.id.clone()));
        if !self.entity_type.is_null() {
            object.insert("@type".to_string(), self.entity_type.clone());
        }
        Value::Object(object)
    }

    /// Parse a graph element
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::MergeConflict("graph element is not an object".to_string()))?;
        let id = object
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::MergeConflict("graph element without a string @id".to_string()))?
            .to_string();
        let entity_type = object.get("@type").cloned().unwrap_or(Value::Null);
        let properties = object
            .iter()
            .filter(|(key, _)| key.as_str() != "@id" && key.as_str() != "@type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Self {
            id,
            entity_type,
            properties,
        })
    }
}

/// A linked-data crate document: context declarations plus the graph array
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrateDocument {
    /// `@context` entries, in declaration order
    pub context: Vec<Value>,
    /// `@graph` nodes, in document order
    pub graph: Vec<Entity>,
}

impl CrateDocument {
    /// Find a node by `@id`
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.graph.iter().find(|entity| entity.id == id)
    }

    /// The root dataset, if present
    pub fn root(&self) -> Option<&Entity> {
        self.get(ROOT_ID)
    }

    /// All nodes of a given type, in document order
    pub fn entities_of_type<'a>(&'a self, entity_type: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.graph.iter().filter(move |entity| entity.has_type(entity_type))
    }

    /// Whether a context entry is declared
    pub fn declares_context(&self, context: &str) -> bool {
        self.context.iter().any(|entry| entry.as_str() == Some(context))
    }

    /// Serialize as a JSON-LD document
    ///
    /// A single context entry is written bare, several as an array.
    pub fn to_value(&self) -> Value {
        let context = match self.context.as_slice() {
            [single] => single.clone(),
            entries => Value::Array(entries.to_vec()),
        };
        json!({
            "@context": context,
            "@graph": self.graph.iter().map(Entity::to_value).collect::<Vec<_>>(),
        })
    }

    /// Parse a previously persisted document
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::MergeConflict("document is not a JSON object".to_string()))?;
        let context = match object.get("@context") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries.clone(),
            Some(entry) => vec![entry.clone()],
        };
        let graph = object
            .get("@graph")
            .and_then(Value::as_array)
            .ok_or_else(|| DomainError::MergeConflict("document has no @graph array".to_string()))?
            .iter()
            .map(Entity::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { context, graph })
    }

    /// Check structural invariants: unique ids and resolvable file references
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for entity in &self.graph {
            if !ids.insert(entity.id.as_str()) {
                return Err(DomainError::InvalidGraph(format!("duplicate @id '{}'", entity.id)));
            }
        }
        for entity in &self.graph {
            for field in RESOLVED_FIELDS {
                for target in entity.references(field) {
                    if !ids.contains(target.as_str()) {
                        return Err(DomainError::InvalidGraph(format!(
                            "'{}' of '{}' references missing node '{}'",
                            field, entity.id, target
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Recorded command lines ordered by the end of their execution
    ///
    /// Uses the action's `name` (the plain command line) and falls back to
    /// its `@id`. Actions whose `endTime` does not parse sort after the
    /// others; ties keep document order.
    pub fn recorded_commands(&self) -> Vec<String> {
        let mut actions: Vec<(Option<i64>, String, String)> = self
            .entities_of_type(CREATE_ACTION)
            .filter_map(|action| {
                let end = action.get_str("endTime")?;
                let command = action.get_str("name").unwrap_or(&action.id).to_string();
                let parsed = DateTime::parse_from_rfc3339(end)
                    .ok()
                    .map(|t| t.timestamp_nanos_opt().unwrap_or(i64::MAX));
                Some((parsed, end.to_string(), command))
            })
            .collect();

        actions.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });
        actions.into_iter().map(|(_, _, command)| command).collect()
    }
}
