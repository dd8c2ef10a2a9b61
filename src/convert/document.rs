//! Document-store converter for AQL-style results.
//!
//! ArangoDB-style cursors yield plain documents. Edge documents carry
//! `_from`/`_to` collection-qualified references; everything else with a
//! `_key` or `_id` is a vertex document. Underscore-prefixed system keys
//! are bookkeeping and never reach the property bag.

use serde_json::{Map, Value};

use crate::convert::{coerce_str, first_of, records, NodeSet, ResultConverter};
use crate::model::{Edge, GraphData, Node};

/// Converts AQL cursor results to canonical graph data.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentConverter;

impl DocumentConverter {
    /// Creates the converter. It carries no configuration.
    pub fn new() -> Self {
        Self
    }
}

impl ResultConverter for DocumentConverter {
    fn convert(&self, result: &Value) -> GraphData {
        let mut nodes = NodeSet::new();
        let mut edges = Vec::new();

        for doc in records(result) {
            let Value::Object(map) = doc else {
                continue;
            };

            if map.contains_key("_from") && map.contains_key("_to") {
                edges.push(edge_document(map));
            } else if map.contains_key("_key") || map.contains_key("_id") {
                nodes.insert(vertex_document(map));
            }
        }

        GraphData {
            nodes: nodes.into_vec(),
            edges,
        }
    }
}

fn vertex_document(map: &Map<String, Value>) -> Node {
    // _key is already collection-local; _id is collection/key.
    let id = map
        .get("_key")
        .and_then(coerce_str)
        .or_else(|| map.get("_id").and_then(coerce_str).map(|id| local_part(&id).to_string()))
        .unwrap_or_else(|| format!("anon:{:x}", map as *const Map<String, Value> as usize));

    let mut node = Node::new(id.clone());
    node.label = Some(
        first_of(map, &["name", "label"])
            .and_then(coerce_str)
            .unwrap_or(id),
    );

    for (key, value) in map {
        if !key.starts_with('_') && key != "name" && key != "label" {
            node.insert_property(key, value.clone());
        }
    }

    node
}

fn edge_document(map: &Map<String, Value>) -> Edge {
    let source = map
        .get("_from")
        .and_then(coerce_str)
        .map(|v| local_part(&v).to_string())
        .unwrap_or_default();
    let target = map
        .get("_to")
        .and_then(coerce_str)
        .map(|v| local_part(&v).to_string())
        .unwrap_or_default();
    let mut edge = Edge::new(source, target);

    edge.label = first_of(map, &["label", "_key"]).and_then(coerce_str);

    for (key, value) in map {
        if !key.starts_with('_') && key != "label" {
            edge.insert_property(key, value.clone());
        }
    }

    edge
}

// The part after the collection prefix: "users/alice" -> "alice".
fn local_part(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(pos) => &reference[pos + 1..],
        None => reference,
    }
}
