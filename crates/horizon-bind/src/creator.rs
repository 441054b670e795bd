//! Element creators and namespace helpers.

use horizon_bind_core::namespace::XHTML;
use horizon_bind_core::{Element, NamespaceMap, NodeId, QualifiedName, Result};

/// The default namespace prefixes: `svg`, `xhtml`, `xlink`, `xml` and
/// `xmlns`. Documents may register more through their configuration.
pub fn namespaces() -> NamespaceMap {
    NamespaceMap::default()
}

/// Resolve a possibly-prefixed name against the default prefixes.
///
/// ```
/// use horizon_bind::namespace;
/// use horizon_bind_core::namespace::SVG;
///
/// let name = namespace("svg:text");
/// assert_eq!(name.space.as_deref(), Some(SVG));
/// assert_eq!(name.local, "text");
/// assert_eq!(namespace("div").space, None);
/// ```
pub fn namespace(name: &str) -> QualifiedName {
    namespaces().resolve(name)
}

/// Return a function that creates a detached element named `name` for a
/// given parent.
///
/// A prefixed name is resolved through the parent's document. An
/// unprefixed name takes the parent's namespace, except that children of
/// XHTML elements take the document's default namespace instead.
pub fn creator(name: &str) -> impl Fn(&Element) -> Result<NodeId> + Send + Sync + Clone + 'static {
    let name = name.to_string();
    move |parent: &Element| {
        let parent_id = parent.id();
        parent.document().write(|tree| -> Result<NodeId> {
            let qualified = tree.namespaces().resolve(&name);
            if qualified.space.is_some() {
                return Ok(tree.create_qualified(qualified));
            }
            let inherited = tree.namespace(parent_id)?.map(str::to_string);
            let space = match inherited {
                Some(space) if space == XHTML => {
                    let root = tree.root();
                    tree.namespace(root)?.map(str::to_string)
                }
                other => other,
            };
            Ok(tree.create_qualified(QualifiedName {
                space,
                local: qualified.local,
            }))
        })
    }
}
