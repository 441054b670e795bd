//! Document configuration.
//!
//! A [`DocumentConfig`] can be built in code or loaded from TOML:
//!
//! ```
//! use horizon_bind_core::DocumentConfig;
//!
//! let config = DocumentConfig::from_toml_str(r#"
//! root_tag = "svg"
//! default_namespace = "http://www.w3.org/2000/svg"
//!
//! [namespaces]
//! chart = "urn:example:chart"
//! "#).unwrap();
//!
//! assert_eq!(config.root_tag, "svg");
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::namespace::NamespaceMap;

/// Configuration for a new [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Tag name of the root element.
    pub root_tag: String,
    /// Namespace URI of the root element (None for no namespace).
    pub default_namespace: Option<String>,
    /// Extra namespace prefixes, merged over the predefined ones.
    pub namespaces: BTreeMap<String, String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            root_tag: "html".to_string(),
            default_namespace: None,
            namespaces: BTreeMap::new(),
        }
    }
}

impl DocumentConfig {
    /// Create the default configuration (an `html` root, no namespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the root element's tag name.
    pub fn root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Set the root element's namespace.
    pub fn default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.default_namespace = Some(uri.into());
        self
    }

    /// Register an extra namespace prefix.
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Check that every declared namespace has a URI.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (prefix, uri) in &self.namespaces {
            if uri.trim().is_empty() {
                return Err(ConfigError::EmptyNamespace(prefix.clone()));
            }
        }
        Ok(())
    }

    /// The effective prefix map: predefined prefixes plus configured ones.
    pub fn namespace_map(&self) -> NamespaceMap {
        let mut map = NamespaceMap::default();
        for (prefix, uri) in &self.namespaces {
            map.insert(prefix.clone(), uri.clone());
        }
        map
    }
}
