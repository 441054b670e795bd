//! XML namespace prefixes and qualified-name resolution.
//!
//! Element and attribute names may carry a prefix (`svg:text`,
//! `xlink:href`). A known prefix is split off and resolved to its URI; an
//! unknown prefix is left in place so the name is used verbatim.

use std::collections::BTreeMap;
use std::fmt;

/// The XHTML namespace URI.
pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
/// The SVG namespace URI.
pub const SVG: &str = "http://www.w3.org/2000/svg";
/// The XLink namespace URI.
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
/// The XML namespace URI.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
/// The XMLNS namespace URI.
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// A mapping from namespace prefix to namespace URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMap {
    prefixes: BTreeMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty map with no prefixes at all.
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// Register (or replace) a prefix.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), uri.into());
    }

    /// Look up the URI registered for a prefix.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Iterate over `(prefix, uri)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Resolve a possibly-prefixed name.
    ///
    /// `xmlns` is stripped as a prefix even when followed by another prefix
    /// (`xmlns:svg` resolves to the XMLNS space with local name `svg`).
    pub fn resolve(&self, name: &str) -> QualifiedName {
        let Some((prefix, local)) = name.split_once(':') else {
            return QualifiedName::local(name);
        };

        if prefix == "xmlns" {
            return QualifiedName::new(self.get("xmlns").unwrap_or(XMLNS), local);
        }

        match self.get(prefix) {
            Some(space) => QualifiedName::new(space, local),
            None => QualifiedName::local(name),
        }
    }
}

impl Default for NamespaceMap {
    /// The predefined prefixes: `svg`, `xhtml`, `xlink`, `xml`, `xmlns`.
    fn default() -> Self {
        let mut map = Self::empty();
        map.insert("svg", SVG);
        map.insert("xhtml", XHTML);
        map.insert("xlink", XLINK);
        map.insert("xml", XML);
        map.insert("xmlns", XMLNS);
        map
    }
}

/// A name split into its namespace URI and local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace URI, if the name was prefixed with a known prefix.
    pub space: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QualifiedName {
    /// A namespaced name.
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            space: Some(space.into()),
            local: local.into(),
        }
    }

    /// A name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            space: None,
            local: local.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.space {
            Some(space) => write!(f, "{{{}}}{}", space, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_known_prefix() {
        let map = NamespaceMap::default();
        let name = map.resolve("svg:text");
        assert_eq!(name.space.as_deref(), Some(SVG));
        assert_eq!(name.local, "text");
    }

    #[test]
    fn test_unknown_prefix_is_kept_verbatim() {
        let map = NamespaceMap::default();
        let name = map.resolve("foo:bar");
        assert_eq!(name, QualifiedName::local("foo:bar"));
    }

    #[test]
    fn test_xmlns_prefix_is_stripped() {
        let map = NamespaceMap::default();
        let name = map.resolve("xmlns:svg");
        assert_eq!(name.space.as_deref(), Some(XMLNS));
        assert_eq!(name.local, "svg");
    }

    #[test]
    fn test_custom_prefix() {
        let mut map = NamespaceMap::default();
        map.insert("dummy", "http://www.w3.org/2020/dummynamespace");
        assert_eq!(
            map.resolve("dummy:node").space.as_deref(),
            Some("http://www.w3.org/2020/dummynamespace")
        );
    }
}
