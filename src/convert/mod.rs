//! Result conversion core.
//!
//! Every query language gets one converter that normalizes the raw,
//! driver-specific result shape into the canonical [`GraphData`] schema.
//! Raw results are modeled as [`serde_json::Value`] - what the various
//! client libraries hand back once their record/vertex/edge objects are
//! serialized.
//!
//! Converters are best-effort and permissive: malformed or unrecognized
//! input is skipped, never raised. They hold only immutable configuration,
//! so a single instance is safe to share across threads and every call
//! allocates fresh output.
//!
//! # Usage
//!
//! ```
//! use anygraph::convert::{CypherConverter, ResultConverter};
//! use serde_json::json;
//!
//! let converter = CypherConverter::new();
//! let raw = json!([{"n": {"id": 1, "labels": ["Person"], "properties": {"name": "Alice"}}}]);
//! let data = converter.convert(&raw);
//! assert_eq!(data.nodes.len(), 1);
//! ```

mod classify;
mod cypher;
mod document;
mod graphql;
mod gremlin;
mod sparql;

pub use classify::{classify, is_node, is_relationship, node_id, Shape};
pub use cypher::{CypherConverter, GqlConverter};
pub use document::DocumentConverter;
pub use graphql::GraphQlConverter;
pub use gremlin::GremlinConverter;
pub use sparql::{SparqlConverter, RDFS_LABEL};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::AppError;
use crate::model::{GraphData, Node};

/// Converts one raw query result into the canonical graph schema.
///
/// This is the single operation at the conversion boundary. Implementations
/// never fail: anything they cannot recognize yields an empty or partial
/// result instead of an error.
pub trait ResultConverter: Send + Sync {
    /// Converts a raw result document to nodes and edges.
    fn convert(&self, result: &Value) -> GraphData;
}

/// Query languages with a converter in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    /// Cypher (Neo4j and compatible property-graph databases).
    Cypher,
    /// ISO GQL - shares the Cypher result shape.
    Gql,
    /// Gremlin/TinkerPop traversals.
    Gremlin,
    /// SPARQL (RDF triple stores).
    Sparql,
    /// GraphQL JSON responses.
    Graphql,
    /// AQL (ArangoDB document/edge collections).
    Aql,
}

impl QueryLanguage {
    /// Stable lowercase identifier, matching the registry ids.
    pub fn id(&self) -> &'static str {
        match self {
            QueryLanguage::Cypher => "cypher",
            QueryLanguage::Gql => "gql",
            QueryLanguage::Gremlin => "gremlin",
            QueryLanguage::Sparql => "sparql",
            QueryLanguage::Graphql => "graphql",
            QueryLanguage::Aql => "aql",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for QueryLanguage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cypher" => Ok(QueryLanguage::Cypher),
            "gql" => Ok(QueryLanguage::Gql),
            "gremlin" => Ok(QueryLanguage::Gremlin),
            "sparql" => Ok(QueryLanguage::Sparql),
            "graphql" => Ok(QueryLanguage::Graphql),
            "aql" => Ok(QueryLanguage::Aql),
            other => Err(AppError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Builds the converter for a query language from configuration.
pub fn converter_for(language: QueryLanguage, config: &Config) -> Box<dyn ResultConverter> {
    let limits = config.limits.walk_limits();
    match language {
        // GQL shares the Cypher result shape contract.
        QueryLanguage::Cypher | QueryLanguage::Gql => {
            Box::new(CypherConverter::with_limits(limits))
        }
        QueryLanguage::Gremlin => Box::new(GremlinConverter::with_limits(limits)),
        QueryLanguage::Sparql => Box::new(SparqlConverter::from_config(&config.sparql)),
        QueryLanguage::Graphql => Box::new(GraphQlConverter::from_config(&config.graphql, limits)),
        QueryLanguage::Aql => Box::new(DocumentConverter::new()),
    }
}

/// Ceilings for the tree walks performed during conversion.
///
/// Pathological inputs (deeply nested sequences, enormous documents) are
/// bounded by an explicit work stack instead of unguarded recursion. When a
/// ceiling is hit the remaining work is dropped silently, keeping the
/// best-effort contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    /// Maximum nesting depth the walk descends into.
    pub max_depth: usize,
    /// Maximum number of values the walk visits.
    pub max_items: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_items: 100_000,
        }
    }
}

/// Insertion-ordered node accumulator with first-seen-wins dedup.
///
/// Later representations of an already-seen id are dropped, not merged,
/// even when they carry more fields. Existing visualizations depend on
/// that asymmetry, so it is preserved exactly.
pub(crate) struct NodeSet {
    order: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeSet {
    pub(crate) fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts a node unless its id was already seen. Returns whether the
    /// node was kept.
    pub(crate) fn insert(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.order.len());
        self.order.push(node);
        true
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Mutable access to an already-inserted node, for property attachment.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.index.get(id)?;
        self.order.get_mut(idx)
    }

    pub(crate) fn into_vec(self) -> Vec<Node> {
        self.order
    }
}

/// Returns the first present value among `keys`, in order.
///
/// The shared ordered-fallback accessor: every converter that needs
/// "try key A, else key B" goes through this so the fallback order stays
/// explicit and testable.
pub(crate) fn first_of<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Coerces a scalar JSON value to a display string.
///
/// Strings pass through, numbers and booleans render via `Display`, and
/// null/arrays/objects yield `None` - containers are never stringified
/// into identifiers or labels.
pub fn coerce_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Splits a raw result into its top-level records.
///
/// Arrays iterate elementwise, null yields nothing, and any other value is
/// treated as a single record.
pub(crate) fn records(result: &Value) -> &[Value] {
    match result {
        Value::Null => &[],
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_of_respects_order() {
        let map = json!({"b": 2, "a": 1});
        let map = map.as_object().unwrap();

        assert_eq!(first_of(map, &["a", "b"]), Some(&json!(1)));
        assert_eq!(first_of(map, &["b", "a"]), Some(&json!(2)));
        assert_eq!(first_of(map, &["missing", "a"]), Some(&json!(1)));
        assert_eq!(first_of(map, &["x", "y"]), None);
    }

    #[test]
    fn test_coerce_str_scalars_only() {
        assert_eq!(coerce_str(&json!("x")), Some("x".to_string()));
        assert_eq!(coerce_str(&json!(1)), Some("1".to_string()));
        assert_eq!(coerce_str(&json!(true)), Some("true".to_string()));
        assert_eq!(coerce_str(&json!(null)), None);
        assert_eq!(coerce_str(&json!([1])), None);
        assert_eq!(coerce_str(&json!({"a": 1})), None);
    }

    #[test]
    fn test_node_set_first_wins() {
        let mut set = NodeSet::new();
        let mut first = Node::new("a");
        first.insert_property("name", json!("first"));
        let mut second = Node::new("a");
        second.insert_property("name", json!("second"));
        second.insert_property("extra", json!(true));

        assert!(set.insert(first));
        assert!(!set.insert(second));

        let nodes = set.into_vec();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].properties.get("name"), Some(&json!("first")));
        assert!(!nodes[0].properties.contains_key("extra"));
    }

    #[test]
    fn test_node_set_preserves_order() {
        let mut set = NodeSet::new();
        set.insert(Node::new("c"));
        set.insert(Node::new("a"));
        set.insert(Node::new("b"));

        let ids: Vec<_> = set.into_vec().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_records_shapes() {
        assert!(records(&json!(null)).is_empty());
        assert_eq!(records(&json!([1, 2])).len(), 2);
        assert_eq!(records(&json!({"n": 1})).len(), 1);
    }

    #[test]
    fn test_language_round_trip() {
        for id in ["cypher", "gql", "gremlin", "sparql", "graphql", "aql"] {
            let lang: QueryLanguage = id.parse().unwrap();
            assert_eq!(lang.id(), id);
        }
        assert!("datalog".parse::<QueryLanguage>().is_err());
    }
}
