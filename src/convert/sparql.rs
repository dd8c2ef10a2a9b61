//! Triple-store result converter for SPARQL.
//!
//! RDF has no native node/edge distinction, so the object position of each
//! subject-predicate-object binding decides the modeling: a URI-shaped
//! object becomes a node plus an edge, a literal becomes a property on the
//! subject node. That heuristic is applied consistently so repeated
//! conversions of the same data stay stable.
//!
//! Bindings are processed in two passes: a label pass that resolves
//! human-readable names via the configured label predicate, then the triple
//! pass that materializes nodes and edges.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::SparqlConfig;
use crate::convert::{coerce_str, records, NodeSet, ResultConverter};
use crate::model::{Edge, GraphData, Node};

/// The standard rdfs:label predicate, the default label source.
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// Converts SPARQL SELECT results to canonical graph data.
#[derive(Debug, Clone)]
pub struct SparqlConverter {
    subject_var: String,
    predicate_var: String,
    object_var: String,
    label_predicate: Option<String>,
}

impl Default for SparqlConverter {
    fn default() -> Self {
        Self {
            subject_var: "s".to_string(),
            predicate_var: "p".to_string(),
            object_var: "o".to_string(),
            label_predicate: Some(RDFS_LABEL.to_string()),
        }
    }
}

impl SparqlConverter {
    /// Creates a converter with the default `s`/`p`/`o` variables and
    /// rdfs:label as the label predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a converter from configuration. An empty label predicate
    /// disables label resolution.
    pub fn from_config(config: &SparqlConfig) -> Self {
        Self {
            subject_var: config.subject_var.clone(),
            predicate_var: config.predicate_var.clone(),
            object_var: config.object_var.clone(),
            label_predicate: config
                .label_predicate
                .clone()
                .filter(|p| !p.is_empty()),
        }
    }

    /// Overrides the binding variable names.
    pub fn with_vars(
        mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        self.subject_var = subject.into();
        self.predicate_var = predicate.into();
        self.object_var = object.into();
        self
    }

    /// Overrides the label predicate; `None` disables label resolution.
    pub fn with_label_predicate(mut self, predicate: Option<String>) -> Self {
        self.label_predicate = predicate;
        self
    }
}

impl ResultConverter for SparqlConverter {
    fn convert(&self, result: &Value) -> GraphData {
        let bindings = bindings(result);

        // Label pass: predicate == label predicate records subject -> label.
        let mut labels: HashMap<String, String> = HashMap::new();
        if let Some(label_predicate) = &self.label_predicate {
            for binding in bindings {
                if binding_value(binding, &self.predicate_var).as_deref()
                    == Some(label_predicate.as_str())
                {
                    let subject = binding_value(binding, &self.subject_var);
                    let object = binding_value(binding, &self.object_var);
                    if let (Some(subject), Some(object)) = (subject, object) {
                        labels.insert(subject, object);
                    }
                }
            }
        }

        // Triple pass.
        let mut nodes = NodeSet::new();
        let mut edges = Vec::new();

        for binding in bindings {
            let Some(subject) = binding_value(binding, &self.subject_var) else {
                continue;
            };
            let Some(predicate) = binding_value(binding, &self.predicate_var) else {
                continue;
            };
            if self.label_predicate.as_deref() == Some(predicate.as_str()) {
                continue;
            }

            if !nodes.contains(&subject) {
                nodes.insert(uri_node(&subject, &labels));
            }

            let Some(object) = binding_value(binding, &self.object_var) else {
                continue;
            };

            if is_uri(&object) {
                if !nodes.contains(&object) {
                    nodes.insert(uri_node(&object, &labels));
                }
                let mut edge = Edge::new(subject, object);
                edge.label = Some(local_name(&predicate).to_string());
                edge.insert_property("predicate", Value::String(predicate));
                edges.push(edge);
            } else if let Some(node) = nodes.get_mut(&subject) {
                // Literal object: scalar property keyed by the predicate's
                // local name.
                node.insert_property(local_name(&predicate), Value::String(object));
            }
        }

        GraphData {
            nodes: nodes.into_vec(),
            edges,
        }
    }
}

fn uri_node(uri: &str, labels: &HashMap<String, String>) -> Node {
    let mut node = Node::new(uri);
    node.label = Some(
        labels
            .get(uri)
            .cloned()
            .unwrap_or_else(|| local_name(uri).to_string()),
    );
    node.insert_property("uri", Value::String(uri.to_string()));
    node
}

/// Flattens the supported result envelopes to a binding slice:
/// a top-level `bindings` key, the `results.bindings` path of the SPARQL
/// JSON results format, a bare array, or a single binding object.
fn bindings(result: &Value) -> &[Value] {
    if let Value::Object(map) = result {
        if let Some(Value::Array(items)) = map.get("bindings") {
            return items;
        }
        if let Some(Value::Array(items)) = map
            .get("results")
            .and_then(|r| r.as_object())
            .and_then(|r| r.get("bindings"))
        {
            return items;
        }
    }
    records(result)
}

/// Extracts a variable's bound value from one binding.
///
/// Supports the SPARQL JSON term form `{"value": ...}` and bare scalars.
/// Missing variables and empty strings yield `None`.
fn binding_value(binding: &Value, var: &str) -> Option<String> {
    let map = binding.as_object()?;
    let value = match map.get(var)? {
        Value::Object(term) => term.get("value").and_then(coerce_str),
        other => coerce_str(other),
    };
    value.filter(|s| !s.is_empty())
}

fn is_uri(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://") || value.starts_with("urn:")
}

/// URI local name: after the last `#`, else after the last `/`, else the
/// whole URI.
fn local_name(uri: &str) -> &str {
    if let Some(pos) = uri.rfind('#') {
        &uri[pos + 1..]
    } else if let Some(pos) = uri.rfind('/') {
        &uri[pos + 1..]
    } else {
        uri
    }
}
