//! Entity classification for property-graph result values.
//!
//! Driver result streams mix structurally similar but differently shaped
//! values: rich node/relationship objects with `element_id`/`labels`/
//! `properties` fields, path objects, plain mappings, and scalars. Instead
//! of ambient structural checks scattered through the converters, the
//! shapes are enumerated here as an explicit tagged classification with a
//! fixed priority order, so dispatch stays deterministic when a value
//! satisfies more than one shape.

use serde_json::{Map, Value};

use crate::convert::{coerce_str, first_of};
use crate::model::{Edge, Node};

/// The recognized shapes of a property-graph result value.
///
/// Checks run in declaration order: path, node, relationship, sequence.
/// A mapping that satisfies both the node and the relationship test is a
/// node - structural (richer) checks win over the generic mapping check.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// A path: contained nodes and relationships are processed individually.
    Path {
        nodes: &'a [Value],
        relationships: &'a [Value],
    },
    /// A node-shaped mapping.
    Node(&'a Map<String, Value>),
    /// A relationship-shaped mapping.
    Relationship(&'a Map<String, Value>),
    /// A sequence to recurse into elementwise.
    Sequence(&'a [Value]),
    /// Anything else - skipped silently.
    Unrecognized,
}

/// Classifies a result value into its [`Shape`].
pub fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::Object(map) => {
            if let (Some(Value::Array(nodes)), Some(Value::Array(relationships))) =
                (map.get("nodes"), map.get("relationships"))
            {
                return Shape::Path {
                    nodes,
                    relationships,
                };
            }
            if node_shaped(map) {
                return Shape::Node(map);
            }
            if relationship_shaped(map) {
                return Shape::Relationship(map);
            }
            Shape::Unrecognized
        }
        Value::Array(items) => Shape::Sequence(items),
        _ => Shape::Unrecognized,
    }
}

/// True if the value denotes a graph node.
pub fn is_node(value: &Value) -> bool {
    matches!(value, Value::Object(map) if node_shaped(map))
}

/// True if the value denotes a graph relationship.
pub fn is_relationship(value: &Value) -> bool {
    matches!(value, Value::Object(map) if relationship_shaped(map))
}

fn node_shaped(map: &Map<String, Value>) -> bool {
    (map.contains_key("labels") && map.contains_key("element_id"))
        || (map.contains_key("labels") && map.contains_key("properties"))
        || map.contains_key("id")
}

fn relationship_shaped(map: &Map<String, Value>) -> bool {
    (map.contains_key("type") && map.contains_key("start_node"))
        || (map.contains_key("type") && map.contains_key("source") && map.contains_key("target"))
        || (map.contains_key("source") && map.contains_key("target"))
}

/// Extracts a stable identifier from a node value.
///
/// Priority: driver-native `element_id`, then generic `id`, then a
/// memory-identity fallback. The fallback is only reached when no semantic
/// id exists; such ids are never compared across separate conversions.
pub fn node_id(value: &Value) -> String {
    if let Value::Object(map) = value {
        if let Some(id) = first_of(map, &["element_id", "id"]).and_then(coerce_str) {
            return id;
        }
    }
    anonymous_id(value)
}

// Last-resort identifier derived from the value's own address.
fn anonymous_id(value: &Value) -> String {
    format!("anon:{:x}", value as *const Value as usize)
}

/// Materializes a node-shaped mapping as a canonical [`Node`].
///
/// A `labels` entry supplies the type tags and the first tag becomes the
/// display label. A `properties` mapping is flattened into the bag;
/// otherwise the mapping's own non-reserved entries are copied. When no
/// label was assigned, a `name` property backfills it.
pub(crate) fn node_record(map: &Map<String, Value>) -> Node {
    let id = first_of(map, &["element_id", "id"])
        .and_then(coerce_str)
        .unwrap_or_else(|| format!("anon:{:x}", map as *const Map<String, Value> as usize));
    let mut node = Node::new(id);

    if let Some(labels_value) = map.get("labels") {
        let labels: Vec<String> = match labels_value {
            Value::Array(items) => items.iter().filter_map(coerce_str).collect(),
            other => coerce_str(other).into_iter().collect(),
        };
        if !labels.is_empty() {
            node.label = Some(labels[0].clone());
            node.labels = labels;
        }
    }

    match map.get("properties") {
        Some(Value::Object(props)) => {
            for (key, value) in props {
                node.insert_property(key, value.clone());
            }
        }
        _ => {
            for (key, value) in map {
                if !matches!(key.as_str(), "id" | "element_id" | "labels" | "properties") {
                    node.insert_property(key, value.clone());
                }
            }
        }
    }

    if node.label.is_none() {
        if let Some(name) = map
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(map)
            .get("name")
            .and_then(coerce_str)
        {
            node.label = Some(name);
        }
    }

    node
}

/// Materializes a relationship-shaped mapping as a canonical [`Edge`].
///
/// Endpoints come from `start_node`/`end_node` references when present,
/// else from `source`/`target` (a nested object contributes its own node
/// id, a scalar is used directly). The label is the `type`, else `label`.
pub(crate) fn relationship_record(map: &Map<String, Value>) -> Edge {
    let (source, target) = match (map.get("start_node"), map.get("end_node")) {
        (Some(start), Some(end)) => (node_id(start), node_id(end)),
        _ => (
            map.get("source").map(endpoint_id).unwrap_or_default(),
            map.get("target").map(endpoint_id).unwrap_or_default(),
        ),
    };
    let mut edge = Edge::new(source, target);

    if let Some(label) = first_of(map, &["type", "label"]).and_then(coerce_str) {
        edge.label = Some(label);
    }

    match map.get("properties") {
        Some(Value::Object(props)) => {
            for (key, value) in props {
                edge.insert_property(key, value.clone());
            }
        }
        _ => {
            for (key, value) in map {
                if !matches!(
                    key.as_str(),
                    "source" | "target" | "start_node" | "end_node" | "type" | "label" | "properties"
                ) {
                    edge.insert_property(key, value.clone());
                }
            }
        }
    }

    edge
}

fn endpoint_id(value: &Value) -> String {
    match value {
        Value::Object(_) => node_id(value),
        other => coerce_str(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_priority_order() {
        // Path wins over everything.
        let path = json!({"nodes": [], "relationships": [], "id": "x"});
        assert!(matches!(classify(&path), Shape::Path { .. }));

        // A mapping with both node and relationship markers is a node.
        let both = json!({"id": "a", "source": "a", "target": "b"});
        assert!(matches!(classify(&both), Shape::Node(_)));

        let rel = json!({"source": "a", "target": "b"});
        assert!(matches!(classify(&rel), Shape::Relationship(_)));

        assert!(matches!(classify(&json!([1, 2])), Shape::Sequence(_)));
        assert!(matches!(classify(&json!("x")), Shape::Unrecognized));
        assert!(matches!(classify(&json!(null)), Shape::Unrecognized));
    }

    #[test]
    fn test_is_node_variants() {
        assert!(is_node(&json!({"labels": ["A"], "element_id": "4:0:1"})));
        assert!(is_node(&json!({"labels": ["A"], "properties": {}})));
        assert!(is_node(&json!({"id": 7})));
        assert!(!is_node(&json!({"labels": ["A"]})));
        assert!(!is_node(&json!("plain")));
    }

    #[test]
    fn test_is_relationship_variants() {
        assert!(is_relationship(
            &json!({"type": "KNOWS", "start_node": {"id": 1}, "end_node": {"id": 2}})
        ));
        assert!(is_relationship(
            &json!({"type": "KNOWS", "source": "a", "target": "b"})
        ));
        assert!(is_relationship(&json!({"source": "a", "target": "b"})));
        assert!(!is_relationship(&json!({"type": "KNOWS"})));
    }

    #[test]
    fn test_node_id_priority() {
        assert_eq!(node_id(&json!({"element_id": "4:0:7", "id": 1})), "4:0:7");
        assert_eq!(node_id(&json!({"id": 1})), "1");

        // No semantic id: memory-identity fallback, stable for the same value.
        let value = json!({"labels": ["A"], "properties": {}});
        assert_eq!(node_id(&value), node_id(&value));
        assert!(node_id(&value).starts_with("anon:"));
    }

    #[test]
    fn test_node_record_driver_shape() {
        let value = json!({
            "element_id": "4:0:1",
            "labels": ["Person", "Actor"],
            "properties": {"name": "Alice", "age": 33}
        });
        let node = node_record(value.as_object().unwrap());

        assert_eq!(node.id, "4:0:1");
        assert_eq!(node.label.as_deref(), Some("Person"));
        assert_eq!(node.labels, vec!["Person", "Actor"]);
        assert_eq!(node.properties.get("name"), Some(&json!("Alice")));
        assert_eq!(node.properties.get("age"), Some(&json!(33)));
    }

    #[test]
    fn test_node_record_plain_mapping_name_becomes_label() {
        let value = json!({"id": "a", "name": "Alice", "age": 33});
        let node = node_record(value.as_object().unwrap());

        assert_eq!(node.id, "a");
        assert_eq!(node.label.as_deref(), Some("Alice"));
        assert_eq!(node.properties.get("age"), Some(&json!(33)));
    }

    #[test]
    fn test_relationship_record_start_end_nodes() {
        let value = json!({
            "type": "KNOWS",
            "start_node": {"element_id": "4:0:1"},
            "end_node": {"id": 2},
            "properties": {"since": 1999}
        });
        let edge = relationship_record(value.as_object().unwrap());

        assert_eq!(edge.source, "4:0:1");
        assert_eq!(edge.target, "2");
        assert_eq!(edge.label.as_deref(), Some("KNOWS"));
        assert_eq!(edge.properties.get("since"), Some(&json!(1999)));
    }

    #[test]
    fn test_relationship_record_plain_mapping() {
        let value = json!({"source": "a", "target": {"id": "b"}, "label": "linked", "weight": 2});
        let edge = relationship_record(value.as_object().unwrap());

        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.label.as_deref(), Some("linked"));
        assert_eq!(edge.properties.get("weight"), Some(&json!(2)));
    }
}
