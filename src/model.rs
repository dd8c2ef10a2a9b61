//! Canonical graph schema shared by every converter.
//!
//! All converters produce the same shape: a [`GraphData`] holding an
//! insertion-ordered list of [`Node`]s (unique by id) and a list of
//! [`Edge`]s (encounter order, duplicates allowed). On the wire both
//! serialize to flat JSON objects - `id`/`source`/`target` plus a
//! passthrough property bag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A graph node with a stable identifier and a flat property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within one converted result set.
    pub id: String,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered type tags (property-graph and traversal sources only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Additional scalar properties, flattened into the wire object.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Node {
    /// Creates a node with the given id and no other fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            labels: Vec::new(),
            properties: Map::new(),
        }
    }

    /// Inserts a property, routing reserved keys to their dedicated fields.
    ///
    /// `label` replaces the display label, `labels` replaces the type tags,
    /// and `id` is ignored - the identifier is fixed at construction so the
    /// first-seen dedup invariant holds.
    pub fn insert_property(&mut self, key: &str, value: Value) {
        match key {
            "id" => {}
            "label" => {
                if let Some(label) = crate::convert::coerce_str(&value) {
                    self.label = Some(label);
                }
            }
            "labels" => {
                if let Value::Array(items) = &value {
                    self.labels = items
                        .iter()
                        .filter_map(crate::convert::coerce_str)
                        .collect();
                }
            }
            _ => {
                self.properties.insert(key.to_string(), value);
            }
        }
    }
}

/// A graph edge referencing two node identifiers.
///
/// An edge may reference an endpoint that was never materialized as a node
/// when the source data carried only the id; callers tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Display label (relationship type or predicate local name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Additional scalar properties, flattened into the wire object.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Edge {
    /// Creates an edge between two node ids with no label or properties.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            properties: Map::new(),
        }
    }

    /// Inserts a property, routing reserved keys to their dedicated fields.
    ///
    /// `label` replaces the display label; `source` and `target` are ignored
    /// since the endpoints are fixed at construction.
    pub fn insert_property(&mut self, key: &str, value: Value) {
        match key {
            "source" | "target" => {}
            "label" => {
                if let Some(label) = crate::convert::coerce_str(&value) {
                    self.label = Some(label);
                }
            }
            _ => {
                self.properties.insert(key.to_string(), value);
            }
        }
    }
}

/// The canonical converter output: nodes plus edges.
///
/// Freshly allocated per `convert` call. Nodes are unique by id with
/// first-seen-wins dedup; edges keep encounter order and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    /// Splits the graph into its node and edge lists.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serializes_flat() {
        let mut node = Node::new("n1");
        node.label = Some("Person".to_string());
        node.labels = vec!["Person".to_string()];
        node.insert_property("name", json!("Alice"));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"id": "n1", "label": "Person", "labels": ["Person"], "name": "Alice"})
        );
    }

    #[test]
    fn test_node_omits_empty_label_fields() {
        let node = Node::new("n1");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({"id": "n1"}));
    }

    #[test]
    fn test_insert_property_routes_reserved_keys() {
        let mut node = Node::new("n1");
        node.insert_property("id", json!("other"));
        node.insert_property("label", json!("Person"));
        node.insert_property("age", json!(30));

        assert_eq!(node.id, "n1");
        assert_eq!(node.label.as_deref(), Some("Person"));
        assert_eq!(node.properties.get("age"), Some(&json!(30)));
        assert!(!node.properties.contains_key("id"));
        assert!(!node.properties.contains_key("label"));
    }

    #[test]
    fn test_edge_endpoints_fixed() {
        let mut edge = Edge::new("a", "b");
        edge.insert_property("source", json!("x"));
        edge.insert_property("since", json!(2001));

        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.properties.get("since"), Some(&json!(2001)));
    }

    #[test]
    fn test_edge_serializes_flat() {
        let mut edge = Edge::new("a", "b");
        edge.label = Some("KNOWS".to_string());
        edge.insert_property("weight", json!(0.5));

        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            value,
            json!({"source": "a", "target": "b", "label": "KNOWS", "weight": 0.5})
        );
    }
}
