//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/anygraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.anygraph.toml`
//! 3. Environment variables: `ANYGRAPH_*` (sections separated by `__`,
//!    e.g. `ANYGRAPH_SPARQL__SUBJECT_VAR`)
//!
//! Every section is optional; an absent file or empty section yields the
//! documented defaults, so `Config::load()` succeeds on a fresh machine.
//!
//! ```toml
//! [sparql]
//! subject_var = "subj"
//! # empty string disables label resolution
//! label_predicate = ""
//!
//! [graphql]
//! id_field = "id"
//! label_field = "name"
//! nodes_path = "data.characters.results"
//!
//! [limits]
//! max_depth = 64
//! max_items = 100000
//! ```

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::convert::{WalkLimits, RDFS_LABEL};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sparql: SparqlConfig,
    #[serde(default)]
    pub graphql: GraphQlConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// SPARQL converter configuration: binding variable names and the label
/// predicate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SparqlConfig {
    /// Variable bound to the triple subject.
    pub subject_var: String,
    /// Variable bound to the triple predicate.
    pub predicate_var: String,
    /// Variable bound to the triple object.
    pub object_var: String,
    /// Predicate URI resolved to node display labels.
    /// An empty string disables label resolution.
    pub label_predicate: Option<String>,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            subject_var: "s".to_string(),
            predicate_var: "p".to_string(),
            object_var: "o".to_string(),
            label_predicate: Some(RDFS_LABEL.to_string()),
        }
    }
}

/// GraphQL converter configuration: field names and optional explicit
/// paths to the nodes/edges lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphQlConfig {
    /// Field name carrying node identifiers.
    pub id_field: String,
    /// Field name carrying node display labels.
    pub label_field: String,
    /// Dot-and-index path to the nodes list; auto-detection when unset.
    pub nodes_path: Option<String>,
    /// Dot-and-index path to the edges list; auto-detection when unset.
    pub edges_path: Option<String>,
    /// Field name carrying the edge source reference.
    pub source_field: String,
    /// Field name carrying the edge target reference.
    pub target_field: String,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            label_field: "name".to_string(),
            nodes_path: None,
            edges_path: None,
            source_field: "source".to_string(),
            target_field: "target".to_string(),
        }
    }
}

/// Ceilings for the conversion tree walks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum number of values visited per walk.
    pub max_items: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = WalkLimits::default();
        Self {
            max_depth: limits.max_depth,
            max_items: limits.max_items,
        }
    }
}

impl LimitsConfig {
    /// The walk limits carried by the converters.
    pub fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_depth: self.max_depth,
            max_items: self.max_items,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".anygraph.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("ANYGRAPH_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/anygraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("anygraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("anygraph").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.sparql.subject_var, "s");
        assert_eq!(config.sparql.label_predicate.as_deref(), Some(RDFS_LABEL));
        assert_eq!(config.graphql.id_field, "id");
        assert_eq!(config.graphql.label_field, "name");
        assert!(config.graphql.nodes_path.is_none());
        assert_eq!(config.limits.walk_limits(), WalkLimits::default());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "sparql": {"subject_var": "subj"},
            "limits": {"max_depth": 8}
        }))
        .unwrap();

        assert_eq!(config.sparql.subject_var, "subj");
        assert_eq!(config.sparql.predicate_var, "p");
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_items, WalkLimits::default().max_items);
    }
}
