//! Property-graph result converter for Cypher and GQL.
//!
//! Handles the record shapes produced by Neo4j-style drivers: iterables of
//! keyed records, single records, path values, nested collections, and the
//! plain-mapping renditions of all of these. Each record value is walked
//! with the entity classifier; nodes dedup first-seen-wins, relationships
//! append in encounter order.

use serde_json::Value;

use crate::convert::classify::{classify, node_record, relationship_record, Shape};
use crate::convert::{records, NodeSet, ResultConverter, WalkLimits};
use crate::model::{Edge, GraphData};

/// Converts Cypher query results to canonical graph data.
#[derive(Debug, Clone, Default)]
pub struct CypherConverter {
    limits: WalkLimits,
}

/// GQL shares the Cypher result shape contract.
pub type GqlConverter = CypherConverter;

impl CypherConverter {
    /// Creates a converter with default walk limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter with explicit walk limits.
    pub fn with_limits(limits: WalkLimits) -> Self {
        Self { limits }
    }

    /// Walks one record value, accumulating nodes and edges.
    fn walk(&self, value: &Value, nodes: &mut NodeSet, edges: &mut Vec<Edge>) {
        let mut stack = vec![(value, 0usize)];
        let mut visited = 0usize;

        while let Some((value, depth)) = stack.pop() {
            if depth > self.limits.max_depth {
                continue;
            }
            visited += 1;
            if visited > self.limits.max_items {
                break;
            }

            match classify(value) {
                Shape::Path {
                    nodes: path_nodes,
                    relationships,
                } => {
                    for node in path_nodes {
                        if let Value::Object(map) = node {
                            nodes.insert(node_record(map));
                        }
                    }
                    for rel in relationships {
                        if let Value::Object(map) = rel {
                            edges.push(relationship_record(map));
                        }
                    }
                }
                Shape::Node(map) => {
                    nodes.insert(node_record(map));
                }
                Shape::Relationship(map) => {
                    edges.push(relationship_record(map));
                }
                Shape::Sequence(items) => {
                    // Reverse so popping preserves encounter order.
                    for item in items.iter().rev() {
                        stack.push((item, depth + 1));
                    }
                }
                Shape::Unrecognized => {}
            }
        }
    }
}

impl ResultConverter for CypherConverter {
    fn convert(&self, result: &Value) -> GraphData {
        let mut nodes = NodeSet::new();
        let mut edges = Vec::new();

        for record in records(result) {
            if let Value::Object(map) = record {
                for (_key, value) in map {
                    self.walk(value, &mut nodes, &mut edges);
                }
            }
        }

        GraphData {
            nodes: nodes.into_vec(),
            edges,
        }
    }
}
