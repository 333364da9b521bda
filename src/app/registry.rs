//! Known ILCD Network nodes
//!
//! A registry is a JSON document of the form
//! `{"nodes": [{"name": "...", "url": "..."}]}`. One ships inside the binary;
//! a user file can replace it. An empty list falls back to a single ProBas
//! entry so there is always something to connect to.

use std::path::Path;

use serde::Deserialize;

use crate::app::models::Node;
use crate::constants::nodes;
use crate::errors::{ConfigError, ConfigResult, InputResult, UserInputError};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    nodes: Vec<Node>,
}

/// Ordered list of nodes the user can connect to by number or label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    /// Registry compiled into the binary
    pub fn bundled() -> ConfigResult<Self> {
        Self::from_json(nodes::BUNDLED_REGISTRY)
    }

    /// Parse a registry document
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let file: RegistryFile = serde_json::from_str(content)?;
        let nodes: Vec<Node> = file
            .nodes
            .into_iter()
            .filter(|node| !node.base_url.trim().is_empty())
            .collect();
        Ok(Self::from_nodes(nodes))
    }

    /// Load a registry from a user file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for a missing file and
    /// `ConfigError::InvalidRegistry` for malformed JSON
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} nodes from {}",
            registry.nodes.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Wrap a node list, substituting the fallback node when it is empty
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        if nodes.is_empty() {
            tracing::warn!("Node registry is empty, using {}", nodes::FALLBACK_LABEL);
            return Self {
                nodes: vec![Node::new(nodes::FALLBACK_LABEL, nodes::FALLBACK_URL)],
            };
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by 1-based number or by case-insensitive label
    pub fn lookup(&self, key: &str) -> InputResult<&Node> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| self.nodes.get(i))
                .ok_or(UserInputError::OutOfRange {
                    kind: "node",
                    index,
                    min: 1,
                    max: self.nodes.len(),
                });
        }

        self.nodes
            .iter()
            .find(|node| node.label.eq_ignore_ascii_case(key))
            .ok_or_else(|| UserInputError::UnknownNode {
                label: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bundled_registry() {
        let registry = NodeRegistry::bundled().unwrap();
        assert!(!registry.is_empty());
        assert_eq!(registry.nodes()[0].label, "ProBas");
    }

    #[test]
    fn test_lookup_by_number_and_label() {
        let registry = NodeRegistry::from_json(
            r#"{"nodes":[{"name":"ProBas","url":"https://a"},{"name":"Oekobau.dat","url":"https://b"}]}"#,
        )
        .unwrap();

        assert_eq!(registry.lookup("2").unwrap().base_url, "https://b");
        assert_eq!(registry.lookup("oekobau.DAT").unwrap().base_url, "https://b");
        assert_eq!(
            registry.lookup("0"),
            Err(UserInputError::OutOfRange {
                kind: "node",
                index: 0,
                min: 1,
                max: 2
            })
        );
        assert!(matches!(
            registry.lookup("nowhere"),
            Err(UserInputError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let registry = NodeRegistry::from_json(r#"{"nodes":[]}"#).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.nodes()[0].base_url, nodes::FALLBACK_URL);

        // Entries without a URL do not count
        let registry = NodeRegistry::from_json(r#"{"nodes":[{"name":"X","url":" "}]}"#).unwrap();
        assert_eq!(registry.nodes()[0].label, nodes::FALLBACK_LABEL);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"nodes":[{{"name":"Local","url":"http://localhost:8080"}}]}}"#).unwrap();

        let registry = NodeRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.lookup("local").unwrap().label, "Local");
    }

    #[test]
    fn test_from_file_errors() {
        let missing = NodeRegistry::from_file(Path::new("/nonexistent/nodes.json"));
        assert!(matches!(missing, Err(ConfigError::NotFound { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let invalid = NodeRegistry::from_file(file.path());
        assert!(matches!(invalid, Err(ConfigError::InvalidRegistry(_))));
    }
}
