//! Document-graph converter for GraphQL JSON responses.
//!
//! Two extraction modes. With explicit dot-and-index paths configured, the
//! nodes and edges lists are resolved directly and converted record by
//! record. Without paths, a structural auto-detection walk treats any
//! mapping carrying the configured id field as a node and fabricates
//! edges from field names for nested references. Auto-detection is a
//! heuristic: ambiguous schemas may over- or under-connect, and that is
//! documented behavior rather than a defect to correct.

use serde_json::{Map, Value};

use crate::config::GraphQlConfig;
use crate::convert::{coerce_str, first_of, NodeSet, ResultConverter, WalkLimits};
use crate::model::{Edge, GraphData, Node};

/// Converts GraphQL JSON responses to canonical graph data.
#[derive(Debug, Clone)]
pub struct GraphQlConverter {
    id_field: String,
    label_field: String,
    nodes_path: Option<String>,
    edges_path: Option<String>,
    source_field: String,
    target_field: String,
    limits: WalkLimits,
}

impl Default for GraphQlConverter {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            label_field: "name".to_string(),
            nodes_path: None,
            edges_path: None,
            source_field: "source".to_string(),
            target_field: "target".to_string(),
            limits: WalkLimits::default(),
        }
    }
}

impl GraphQlConverter {
    /// Creates a converter with default field names and auto-detection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a converter from configuration.
    pub fn from_config(config: &GraphQlConfig, limits: WalkLimits) -> Self {
        Self {
            id_field: config.id_field.clone(),
            label_field: config.label_field.clone(),
            nodes_path: config.nodes_path.clone(),
            edges_path: config.edges_path.clone(),
            source_field: config.source_field.clone(),
            target_field: config.target_field.clone(),
            limits,
        }
    }

    /// Overrides the id and label field names.
    pub fn with_fields(mut self, id_field: impl Into<String>, label_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self.label_field = label_field.into();
        self
    }

    /// Sets explicit paths to the nodes and edges lists, disabling
    /// auto-detection.
    pub fn with_paths(mut self, nodes_path: Option<String>, edges_path: Option<String>) -> Self {
        self.nodes_path = nodes_path;
        self.edges_path = edges_path;
        self
    }

    /// Overrides the edge endpoint field names.
    pub fn with_endpoints(
        mut self,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        self.source_field = source_field.into();
        self.target_field = target_field.into();
        self
    }

    fn item_node(&self, map: &Map<String, Value>) -> Node {
        let id = map
            .get(&self.id_field)
            .and_then(coerce_str)
            .unwrap_or_else(|| format!("anon:{:x}", map as *const Map<String, Value> as usize));
        let label = map
            .get(&self.label_field)
            .and_then(coerce_str)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| id.clone());

        let mut node = Node::new(id);
        node.label = Some(label);

        // Scalar passthrough only; nested objects and lists never land on
        // the property bag.
        for (key, value) in map {
            if key != &self.id_field && !value.is_object() && !value.is_array() {
                node.insert_property(key, value.clone());
            }
        }

        node
    }

    fn item_edge(&self, map: &Map<String, Value>) -> Edge {
        let source = self.endpoint(map, &self.source_field, "from");
        let target = self.endpoint(map, &self.target_field, "to");
        let mut edge = Edge::new(source, target);

        // Explicit-path edges always carry a label key, empty when no
        // label source is present.
        edge.label = Some(
            first_of(map, &["label", "type", "__typename"])
                .and_then(coerce_str)
                .unwrap_or_default(),
        );

        edge
    }

    // Endpoint: configured field else the alternate, nested object
    // contributes its id field.
    fn endpoint(&self, map: &Map<String, Value>, field: &str, alternate: &str) -> String {
        let value = match map.get(field) {
            Some(v) => v,
            None => match map.get(alternate) {
                Some(v) => v,
                None => return String::new(),
            },
        };
        match value {
            Value::Object(nested) => nested
                .get(&self.id_field)
                .and_then(coerce_str)
                .unwrap_or_default(),
            other => coerce_str(other).unwrap_or_default(),
        }
    }

    /// Structural auto-detection over an explicit work stack.
    fn auto_extract(&self, data: &Value, nodes: &mut NodeSet, edges: &mut Vec<Edge>) {
        let mut stack: Vec<(&Value, Option<String>, usize)> = vec![(data, None, 0)];
        let mut visited = 0usize;

        while let Some((value, parent_id, depth)) = stack.pop() {
            if depth > self.limits.max_depth {
                continue;
            }
            visited += 1;
            if visited > self.limits.max_items {
                break;
            }

            match value {
                Value::Object(map) if map.contains_key(&self.id_field) => {
                    let node = self.item_node(map);
                    let node_id = node.id.clone();
                    nodes.insert(node);

                    // Containment edge from an explicit parent context.
                    if let Some(parent) = parent_id {
                        if parent != node_id {
                            let mut edge = Edge::new(parent, node_id.clone());
                            edge.label = Some("contains".to_string());
                            edges.push(edge);
                        }
                    }

                    // Field-name edges for nested references. A recognized
                    // node terminates the walk: referenced children are
                    // materialized as-is and their own nested fields are
                    // ignored, as are non-reference container fields.
                    for (key, field_value) in map {
                        match field_value {
                            Value::Object(child) if child.contains_key(&self.id_field) => {
                                self.reference(&node_id, key, child, nodes, edges);
                            }
                            Value::Array(items) => {
                                for item in items {
                                    if let Value::Object(child) = item {
                                        if child.contains_key(&self.id_field) {
                                            self.reference(&node_id, key, child, nodes, edges);
                                        }
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Value::Object(map) => {
                    for field_value in map.values().rev() {
                        stack.push((field_value, parent_id.clone(), depth + 1));
                    }
                }
                Value::Array(items) => {
                    for item in items.iter().rev() {
                        stack.push((item, parent_id.clone(), depth + 1));
                    }
                }
                _ => {}
            }
        }
    }

    fn reference(
        &self,
        source_id: &str,
        field_name: &str,
        child: &Map<String, Value>,
        nodes: &mut NodeSet,
        edges: &mut Vec<Edge>,
    ) {
        let referenced = self.item_node(child);
        let mut edge = Edge::new(source_id, referenced.id.clone());
        edge.label = Some(field_name.to_string());
        edges.push(edge);
        nodes.insert(referenced);
    }
}

impl ResultConverter for GraphQlConverter {
    fn convert(&self, result: &Value) -> GraphData {
        // Unwrap the response envelope if present.
        let data = match result {
            Value::Object(map) => map.get("data").unwrap_or(result),
            _ => result,
        };

        let mut nodes = NodeSet::new();
        let mut edges = Vec::new();

        if let Some(path) = &self.nodes_path {
            if let Some(Value::Array(items)) = resolve_path(data, path) {
                for item in items {
                    if let Value::Object(map) = item {
                        nodes.insert(self.item_node(map));
                    }
                }
            }
        }

        if let Some(path) = &self.edges_path {
            if let Some(Value::Array(items)) = resolve_path(data, path) {
                for item in items {
                    if let Value::Object(map) = item {
                        let edge = self.item_edge(map);
                        if !edge.source.is_empty() && !edge.target.is_empty() {
                            edges.push(edge);
                        }
                    }
                }
            }
        }

        if self.nodes_path.is_none() && self.edges_path.is_none() {
            self.auto_extract(data, &mut nodes, &mut edges);
        }

        GraphData {
            nodes: nodes.into_vec(),
            edges,
        }
    }
}

/// Walks a dot-separated path; a segment is a mapping key, or an index
/// when the current value is a sequence and the segment is numeric. Any
/// failure yields no match, never an error.
fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
