//! Backend collaborator contract.
//!
//! A backend pairs a driver adapter with the matching converter: it runs a
//! query against its data source, feeds the raw result through `convert`,
//! and hands the node/edge lists to the caller unchanged. The live driver
//! connections themselves stay outside this crate - adapters implement
//! [`RecordSource`] around whatever client library they use.
//!
//! # Usage
//!
//! ```ignore
//! let backend = SourceBackend::new(my_source, QueryLanguage::Cypher, &config);
//! let (nodes, edges) = backend.execute("MATCH (n)-[r]->(m) RETURN n, r, m").await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::convert::{coerce_str, converter_for, QueryLanguage, ResultConverter};
use crate::error::AppError;
use crate::model::{Edge, Node};

/// What a driver adapter must supply: raw query results and, optionally,
/// raw schema introspection output, both as JSON documents.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Runs a query and returns the raw result document.
    async fn run(&self, query: &str) -> Result<Value, AppError>;

    /// Returns raw schema introspection output, shaped as
    /// `{"node_types": [...], "edge_types": [...]}`.
    ///
    /// Sources without introspection keep the default.
    async fn schema(&self) -> Result<Value, AppError> {
        Ok(Value::Null)
    }
}

/// A node or edge type listing from schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaType {
    /// Label or relationship/collection type name.
    pub name: String,
    /// Known property keys for this type.
    #[serde(default)]
    pub properties: Vec<String>,
}

/// The backend boundary: execute queries, list schema types.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The query language this backend executes.
    fn query_language(&self) -> QueryLanguage;

    /// Executes a query and returns converted (nodes, edges).
    async fn execute(&self, query: &str) -> Result<(Vec<Node>, Vec<Edge>), AppError>;

    /// Fetches best-effort (node_types, edge_types) listings.
    ///
    /// Introspection failures degrade to empty lists; they never surface
    /// into query results.
    async fn fetch_schema(&self) -> Result<(Vec<SchemaType>, Vec<SchemaType>), AppError>;
}

/// Generic backend over any [`RecordSource`], wired to the converter for
/// its query language.
pub struct SourceBackend<S> {
    source: S,
    language: QueryLanguage,
    converter: Box<dyn ResultConverter>,
}

impl<S: RecordSource> SourceBackend<S> {
    /// Creates a backend with the configured converter for `language`.
    pub fn new(source: S, language: QueryLanguage, config: &Config) -> Self {
        Self {
            source,
            language,
            converter: converter_for(language, config),
        }
    }

    /// Creates a backend with an explicit converter.
    pub fn with_converter(
        source: S,
        language: QueryLanguage,
        converter: Box<dyn ResultConverter>,
    ) -> Self {
        Self {
            source,
            language,
            converter,
        }
    }

    /// Returns a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: RecordSource> Backend for SourceBackend<S> {
    fn query_language(&self) -> QueryLanguage {
        self.language
    }

    async fn execute(&self, query: &str) -> Result<(Vec<Node>, Vec<Edge>), AppError> {
        let raw = self.source.run(query).await?;
        let data = self.converter.convert(&raw);
        tracing::debug!(
            language = %self.language,
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "query result converted"
        );
        Ok(data.into_parts())
    }

    async fn fetch_schema(&self) -> Result<(Vec<SchemaType>, Vec<SchemaType>), AppError> {
        let raw = match self.source.schema().await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(language = %self.language, error = %err, "schema introspection failed");
                return Ok((Vec::new(), Vec::new()));
            }
        };
        Ok(parse_schema(&raw))
    }
}

/// Best-effort parse of `{"node_types": [...], "edge_types": [...]}`.
/// Anything missing or malformed yields empty lists.
fn parse_schema(raw: &Value) -> (Vec<SchemaType>, Vec<SchemaType>) {
    let Some(map) = raw.as_object() else {
        return (Vec::new(), Vec::new());
    };
    (
        schema_types(map.get("node_types")),
        schema_types(map.get("edge_types")),
    )
}

fn schema_types(value: Option<&Value>) -> Vec<SchemaType> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let map = entry.as_object()?;
            let name = crate::convert::first_of(map, &["name", "label", "type"])
                .and_then(coerce_str)?;
            let properties = map
                .get("properties")
                .and_then(Value::as_array)
                .map(|props| props.iter().filter_map(coerce_str).collect())
                .unwrap_or_default();
            Some(SchemaType { name, properties })
        })
        .collect()
}

/// A query language registry entry, for UI listings.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub enabled: bool,
}

/// The supported query languages.
pub const QUERY_LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo {
        id: "cypher",
        name: "Cypher",
        enabled: true,
    },
    LanguageInfo {
        id: "gql",
        name: "GQL",
        enabled: true,
    },
    LanguageInfo {
        id: "sparql",
        name: "SPARQL",
        enabled: true,
    },
    LanguageInfo {
        id: "gremlin",
        name: "Gremlin",
        enabled: true,
    },
    LanguageInfo {
        id: "graphql",
        name: "GraphQL",
        enabled: true,
    },
    LanguageInfo {
        id: "aql",
        name: "AQL",
        enabled: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Mock source for testing
    struct MockSource {
        result: Value,
        schema: Result<Value, String>,
    }

    #[async_trait]
    impl RecordSource for MockSource {
        async fn run(&self, _query: &str) -> Result<Value, AppError> {
            Ok(self.result.clone())
        }

        async fn schema(&self) -> Result<Value, AppError> {
            self.schema
                .clone()
                .map_err(AppError::backend)
        }
    }

    fn backend(source: MockSource, language: QueryLanguage) -> SourceBackend<MockSource> {
        SourceBackend::new(source, language, &Config::default())
    }

    #[tokio::test]
    async fn test_execute_converts_result() {
        let source = MockSource {
            result: json!([{"n": {"id": 1, "labels": ["Person"], "properties": {"name": "Alice"}}}]),
            schema: Ok(Value::Null),
        };
        let backend = backend(source, QueryLanguage::Cypher);

        let (nodes, edges) = backend.execute("MATCH (n) RETURN n").await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "1");
        assert!(edges.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_schema_parses_types() {
        let source = MockSource {
            result: Value::Null,
            schema: Ok(json!({
                "node_types": [{"label": "Person", "properties": ["name", "age"]}],
                "edge_types": [{"type": "KNOWS"}]
            })),
        };
        let backend = backend(source, QueryLanguage::Cypher);

        let (node_types, edge_types) = backend.fetch_schema().await.unwrap();
        assert_eq!(node_types.len(), 1);
        assert_eq!(node_types[0].name, "Person");
        assert_eq!(node_types[0].properties, vec!["name", "age"]);
        assert_eq!(edge_types[0].name, "KNOWS");
        assert!(edge_types[0].properties.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_schema_degrades_on_failure() {
        let source = MockSource {
            result: Value::Null,
            schema: Err("introspection unavailable".to_string()),
        };
        let backend = backend(source, QueryLanguage::Gremlin);

        let (node_types, edge_types) = backend.fetch_schema().await.unwrap();
        assert!(node_types.is_empty());
        assert!(edge_types.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_schema_tolerates_malformed_output() {
        let source = MockSource {
            result: Value::Null,
            schema: Ok(json!({"node_types": "not a list", "edge_types": [42]})),
        };
        let backend = backend(source, QueryLanguage::Aql);

        let (node_types, edge_types) = backend.fetch_schema().await.unwrap();
        assert!(node_types.is_empty());
        assert!(edge_types.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_converter_overrides_language_default() {
        let source = MockSource {
            result: json!([{"_key": "alice", "name": "Alice"}]),
            schema: Ok(Value::Null),
        };
        // An AQL-shaped source behind a backend labeled Cypher.
        let backend = SourceBackend::with_converter(
            source,
            QueryLanguage::Cypher,
            Box::new(crate::convert::DocumentConverter::new()),
        );

        let (nodes, edges) = backend.execute("FOR v IN users RETURN v").await.unwrap();
        assert_eq!(backend.query_language(), QueryLanguage::Cypher);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "alice");
        assert!(edges.is_empty());

        assert_eq!(
            backend.source().result,
            json!([{"_key": "alice", "name": "Alice"}])
        );
    }

    #[test]
    fn test_registry_covers_all_languages() {
        for language in [
            QueryLanguage::Cypher,
            QueryLanguage::Gql,
            QueryLanguage::Gremlin,
            QueryLanguage::Sparql,
            QueryLanguage::Graphql,
            QueryLanguage::Aql,
        ] {
            assert!(QUERY_LANGUAGES.iter().any(|info| info.id == language.id()));
        }
    }
}
