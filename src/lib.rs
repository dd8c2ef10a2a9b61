//! Anygraph - canonical graph normalization for heterogeneous query results.
//!
//! Graph databases speak different query languages and their client
//! libraries return different result shapes: property-graph records and
//! paths (Cypher/GQL), traversal vertices, edges and value-maps (Gremlin),
//! RDF triple bindings (SPARQL), nested JSON documents (GraphQL), and
//! document/edge collections (AQL). This crate normalizes all of them into
//! one canonical, deduplicated node/edge representation suitable for
//! visualization.
//!
//! The core is the [`convert`] module: one [`convert::ResultConverter`]
//! per query language, each a pure function of its input. The [`backend`]
//! module defines the collaborator contract that pairs a driver adapter
//! with its converter. Query execution, rendering, and the drivers
//! themselves live outside this crate.

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;

pub use convert::{converter_for, QueryLanguage, ResultConverter};
pub use error::AppError;
pub use model::{Edge, GraphData, Node};
