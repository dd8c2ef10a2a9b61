//! Graph-traversal result converter for Gremlin/TinkerPop.
//!
//! Traversal steps return several distinct shapes: vertex and edge
//! objects, path objects from `path()`, and plain mappings from
//! `valueMap()`/`elementMap()`. The recognition order is explicit:
//! path (`objects`), edge (`outV`/`inV`), element-map edge (`IN`/`OUT`),
//! then vertex (`id`). Single-element list properties flatten to the
//! scalar, the single-valued property convention of value-map results.

use serde_json::{Map, Value};

use crate::convert::{coerce_str, records, NodeSet, ResultConverter, WalkLimits};
use crate::model::{Edge, GraphData, Node};

/// Converts Gremlin traversal results to canonical graph data.
#[derive(Debug, Clone, Default)]
pub struct GremlinConverter {
    limits: WalkLimits,
}

impl GremlinConverter {
    /// Creates a converter with default walk limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter with explicit walk limits.
    pub fn with_limits(limits: WalkLimits) -> Self {
        Self { limits }
    }

    fn walk(&self, item: &Value, nodes: &mut NodeSet, edges: &mut Vec<Edge>) {
        let mut stack = vec![(item, 0usize)];
        let mut visited = 0usize;

        while let Some((item, depth)) = stack.pop() {
            if depth > self.limits.max_depth {
                continue;
            }
            visited += 1;
            if visited > self.limits.max_items {
                break;
            }

            match item {
                Value::Object(map) => {
                    if let Some(Value::Array(objects)) = map.get("objects") {
                        // Traversal path: recurse into each step.
                        for object in objects.iter().rev() {
                            stack.push((object, depth + 1));
                        }
                    } else if map.contains_key("outV") && map.contains_key("inV") {
                        edges.push(edge_record(map));
                    } else if map.contains_key("IN") && map.contains_key("OUT") {
                        edges.push(element_map_edge(map));
                    } else if map.contains_key("id") {
                        nodes.insert(vertex_record(map));
                    }
                }
                Value::Array(items) => {
                    for sub_item in items.iter().rev() {
                        stack.push((sub_item, depth + 1));
                    }
                }
                _ => {}
            }
        }
    }
}

impl ResultConverter for GremlinConverter {
    fn convert(&self, result: &Value) -> GraphData {
        let mut nodes = NodeSet::new();
        let mut edges = Vec::new();

        for item in records(result) {
            self.walk(item, &mut nodes, &mut edges);
        }

        GraphData {
            nodes: nodes.into_vec(),
            edges,
        }
    }
}

/// A vertex from a typed result, `valueMap()`, or `elementMap()`.
fn vertex_record(map: &Map<String, Value>) -> Node {
    let id = map
        .get("id")
        .and_then(coerce_str)
        .unwrap_or_else(|| format!("anon:{:x}", map as *const Map<String, Value> as usize));
    let mut node = Node::new(id);

    if let Some(label) = map.get("label").and_then(coerce_str) {
        node.label = Some(label);
    }

    match map.get("properties") {
        Some(Value::Object(props)) => {
            for (key, value) in props {
                node.insert_property(key, flatten_value(value));
            }
        }
        _ => {
            for (key, value) in map {
                if !matches!(key.as_str(), "id" | "label" | "properties") {
                    node.insert_property(key, flatten_value(value));
                }
            }
        }
    }

    node
}

/// A typed edge object with `outV`/`inV` endpoint references.
fn edge_record(map: &Map<String, Value>) -> Edge {
    let source = map.get("outV").map(endpoint_id).unwrap_or_default();
    let target = map.get("inV").map(endpoint_id).unwrap_or_default();
    let mut edge = Edge::new(source, target);

    if let Some(label) = map.get("label").and_then(coerce_str) {
        edge.label = Some(label);
    }

    if let Some(Value::Object(props)) = map.get("properties") {
        for (key, value) in props {
            edge.insert_property(key, flatten_value(value));
        }
    }

    edge
}

/// An edge from an `elementMap()` step, endpoints under `OUT`/`IN`.
fn element_map_edge(map: &Map<String, Value>) -> Edge {
    let source = map.get("OUT").map(endpoint_id).unwrap_or_default();
    let target = map.get("IN").map(endpoint_id).unwrap_or_default();
    let mut edge = Edge::new(source, target);

    if let Some(label) = map.get("label").and_then(coerce_str) {
        edge.label = Some(label);
    }

    for (key, value) in map {
        if !matches!(key.as_str(), "id" | "label" | "IN" | "OUT") {
            edge.insert_property(key, flatten_value(value));
        }
    }

    edge
}

// Endpoint references are either nested maps with an `id` or the raw id.
fn endpoint_id(value: &Value) -> String {
    match value {
        Value::Object(map) => map.get("id").and_then(coerce_str).unwrap_or_default(),
        other => coerce_str(other).unwrap_or_default(),
    }
}

// Single-element lists flatten to the scalar; longer lists stay lists.
fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 1 => items[0].clone(),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(value: Value) -> GraphData {
        GremlinConverter::new().convert(&value)
    }

    #[test]
    fn test_vertex_with_properties() {
        let data = convert(json!([
            {"id": 1, "label": "person", "properties": {"name": ["marko"], "age": [29]}}
        ]));

        assert_eq!(data.nodes.len(), 1);
        let node = &data.nodes[0];
        assert_eq!(node.id, "1");
        assert_eq!(node.label.as_deref(), Some("person"));
        assert_eq!(node.properties.get("name"), Some(&json!("marko")));
        assert_eq!(node.properties.get("age"), Some(&json!(29)));
    }

    #[test]
    fn test_edge_with_vertex_references() {
        let data = convert(json!([{
            "id": 7,
            "label": "knows",
            "outV": {"id": 1},
            "inV": {"id": 2},
            "properties": {"weight": 0.5}
        }]));

        assert_eq!(data.edges.len(), 1);
        let edge = &data.edges[0];
        assert_eq!(edge.source, "1");
        assert_eq!(edge.target, "2");
        assert_eq!(edge.label.as_deref(), Some("knows"));
        assert_eq!(edge.properties.get("weight"), Some(&json!(0.5)));
    }

    #[test]
    fn test_edge_with_raw_endpoint_ids() {
        let data = convert(json!([{"label": "knows", "outV": 1, "inV": 2}]));

        assert_eq!(data.edges[0].source, "1");
        assert_eq!(data.edges[0].target, "2");
    }

    #[test]
    fn test_path_objects() {
        let data = convert(json!([{
            "labels": [[], []],
            "objects": [
                {"id": 1, "label": "person"},
                {"id": 9, "label": "created", "outV": 1, "inV": 2},
                {"id": 2, "label": "software"}
            ]
        }]));

        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.edges.len(), 1);
    }

    #[test]
    fn test_element_map_edge() {
        let data = convert(json!([{
            "id": 13,
            "label": "develops",
            "OUT": {"id": 1, "label": "person"},
            "IN": {"id": 10, "label": "software"},
            "since": 2009
        }]));

        assert_eq!(data.edges.len(), 1);
        let edge = &data.edges[0];
        assert_eq!(edge.source, "1");
        assert_eq!(edge.target, "10");
        assert_eq!(edge.label.as_deref(), Some("develops"));
        assert_eq!(edge.properties.get("since"), Some(&json!(2009)));
    }

    #[test]
    fn test_value_map_flattening() {
        let data = convert(json!([
            {"id": 1, "name": ["Alice"], "aliases": ["Alice", "Bob"]}
        ]));

        let node = &data.nodes[0];
        assert_eq!(node.properties.get("name"), Some(&json!("Alice")));
        assert_eq!(node.properties.get("aliases"), Some(&json!(["Alice", "Bob"])));
    }

    #[test]
    fn test_vertex_dedup_first_wins() {
        let data = convert(json!([
            {"id": 1, "label": "person", "name": ["first"]},
            {"id": 1, "label": "person", "name": ["second"]}
        ]));

        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].properties.get("name"), Some(&json!("first")));
    }

    #[test]
    fn test_nested_collections_and_unknowns() {
        let data = convert(json!([[{"id": 1}], "scalar", null, {"no": "markers"}]));
        assert_eq!(data.nodes.len(), 1);
        assert!(data.edges.is_empty());
    }

    #[test]
    fn test_empty_and_null_input() {
        assert_eq!(convert(json!(null)), GraphData::default());
        assert_eq!(convert(json!([])), GraphData::default());
    }
}
