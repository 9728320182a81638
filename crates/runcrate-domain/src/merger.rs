//! Graph merger - folds a freshly assembled graph into a persisted document
//!
//! Nodes are reconciled by `@id`. Scalar properties take the incoming value,
//! reference lists (`hasPart`, `object`, `result`, `conformsTo`) become the
//! ordered union of old then new. Recorded actions are never overwritten: an
//! incoming CreateAction whose `@id` is already taken, by an earlier action
//! or by any other node, is stored under `"{command line} #{n}"`.

use crate::entity::{CrateDocument, Entity, CREATE_ACTION, REFERENCE_LIST_FIELDS, ROOT_ID};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

/// Result of a merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The document to persist
    pub document: CrateDocument,
    /// Ids the incoming actions were stored under, in graph order
    pub action_ids: Vec<String>,
}

/// Reconciles new graphs with previously persisted documents
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphMerger;

impl GraphMerger {
    /// Create a merger
    pub fn new() -> Self {
        Self
    }

    /// Merge `incoming` into `existing`
    ///
    /// Without an existing document the incoming graph is merged into an
    /// empty one, so an action whose `@id` is taken by another incoming node
    /// is still renamed. The existing document is never modified; the result
    /// is rebuilt.
    pub fn merge(&self, incoming: &CrateDocument, existing: Option<&CrateDocument>) -> MergeOutcome {
        let empty = CrateDocument {
            context: Vec::new(),
            graph: Vec::new(),
        };
        let existing = existing.unwrap_or(&empty);

        let mut nodes: IndexMap<String, Entity> = existing
            .graph
            .iter()
            .map(|entity| (entity.id.clone(), entity.clone()))
            .collect();
        let incoming_ids: Vec<&str> = incoming
            .graph
            .iter()
            .filter(|entity| !entity.has_type(CREATE_ACTION))
            .map(|entity| entity.id.as_str())
            .collect();
        let mut action_ids = Vec::new();

        for entity in &incoming.graph {
            if entity.has_type(CREATE_ACTION) {
                let mut action = entity.clone();
                let taken = |id: &str| nodes.contains_key(id) || incoming_ids.contains(&id);
                if taken(&action.id) {
                    let command = action.get_str("name").unwrap_or(&entity.id).to_string();
                    action.id = free_action_id(&command, taken);
                    info!(
                        "Id '{}' is already in use; storing this run as '{}'",
                        entity.id, action.id
                    );
                }
                action_ids.push(action.id.clone());
                nodes.insert(action.id.clone(), action);
                continue;
            }

            let merged = match nodes.get(&entity.id) {
                Some(old) => merge_entity(old, entity),
                None => entity.clone(),
            };
            nodes.insert(entity.id.clone(), merged);
        }

        if let Some(end_time) = latest_end_time(incoming) {
            if let Some(root) = nodes.get_mut(ROOT_ID) {
                root.set("datePublished", end_time);
            }
        }

        let mut context = existing.context.clone();
        for entry in &incoming.context {
            if !context.contains(entry) {
                context.push(entry.clone());
            }
        }

        debug!(
            "Merged {} incoming nodes into {} existing; result has {} nodes",
            incoming.graph.len(),
            existing.graph.len(),
            nodes.len()
        );

        MergeOutcome {
            document: CrateDocument {
                context,
                graph: nodes.into_values().collect(),
            },
            action_ids,
        }
    }
}

/// Field-level merge of two nodes sharing an `@id`
fn merge_entity(old: &Entity, new: &Entity) -> Entity {
    let mut properties = old.properties.clone();
    for (key, value) in &new.properties {
        let merged = if REFERENCE_LIST_FIELDS.contains(&key.as_str()) {
            union_values(old.properties.get(key), value)
        } else {
            value.clone()
        };
        properties.insert(key.clone(), merged);
    }

    Entity {
        id: new.id.clone(),
        entity_type: if new.entity_type.is_null() {
            old.entity_type.clone()
        } else {
            new.entity_type.clone()
        },
        properties,
    }
}

/// Ordered, deduplicated union of old then new list items
///
/// A single-element result stays a bare value when the new value was bare.
fn union_values(old: Option<&Value>, new: &Value) -> Value {
    let items = |value: &Value| match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };

    let mut merged: Vec<Value> = Vec::new();
    for item in old.map(items).unwrap_or_default().into_iter().chain(items(new)) {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }

    if merged.len() == 1 && !new.is_array() {
        merged.remove(0)
    } else {
        Value::Array(merged)
    }
}

/// First `"{command} #{n}"`, n >= 2, for which `taken` is false
pub(crate) fn free_action_id(command: &str, taken: impl Fn(&str) -> bool) -> String {
    (2u64..)
        .map(|n| format!("{} #{}", command, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| format!("{} #{}", command, u64::MAX))
}

/// `endTime` of the last action in the incoming graph
fn latest_end_time(incoming: &CrateDocument) -> Option<String> {
    incoming
        .entities_of_type(CREATE_ACTION)
        .filter_map(|action| action.get_str("endTime"))
        .last()
        .map(str::to_string)
}
