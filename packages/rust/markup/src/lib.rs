//! Markup decoding for anyload.
//!
//! Wraps `scraper` to turn a markup string into a [`NodeCollection`] — an
//! ordered list of top-level nodes, each with an optional derived name and its
//! trimmed inner HTML. Name derivation follows the attribute priority
//! `name` > `id` > `data-name`.

use anyload_shared::{AnyloadError, Result};
use scraper::{ElementRef, Html};
use tracing::debug;

/// Attributes consulted (in order) when deriving a node's name.
const NAME_ATTRS: [&str; 3] = ["name", "id", "data-name"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single top-level markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Derived name, if the element carried a naming attribute.
    pub name: Option<String>,
    /// Trimmed inner HTML of the element.
    pub content: String,
}

impl Node {
    /// A named node.
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: content.into(),
        }
    }

    /// An unnamed node.
    pub fn unnamed(content: impl Into<String>) -> Self {
        Self {
            name: None,
            content: content.into(),
        }
    }
}

/// An ordered collection of top-level markup nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCollection {
    nodes: Vec<Node>,
}

impl NodeCollection {
    /// Iterate the nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes in the collection.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any node in the collection carries a name.
    pub fn has_named(&self) -> bool {
        self.nodes.iter().any(|n| n.name.is_some())
    }
}

impl From<Vec<Node>> for NodeCollection {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl IntoIterator for NodeCollection {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a markup string into a [`NodeCollection`].
///
/// The string is parsed as an HTML fragment; each top-level element becomes
/// one node. A string that yields no elements at all (e.g. an unterminated
/// tag, or plain text) is a parse error — callers treat that as "not markup".
pub fn decode(text: &str) -> Result<NodeCollection> {
    let fragment = Html::parse_fragment(text);

    let nodes: Vec<Node> = fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .map(|el| Node {
            name: derive_name(&el),
            content: el.inner_html().trim().to_string(),
        })
        .collect();

    if nodes.is_empty() {
        return Err(AnyloadError::parse(format!(
            "no elements found in markup: {text:?}"
        )));
    }

    debug!(count = nodes.len(), "decoded markup fragment");
    Ok(NodeCollection { nodes })
}

/// Derive a node name from the `name`, `id`, or `data-name` attribute.
fn derive_name(el: &ElementRef) -> Option<String> {
    NAME_ATTRS
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_unnamed_nodes() {
        let nodes = decode(r#"<i name="f1">f1t</i><i>f2t</i>"#).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes.iter().next().unwrap(),
            &Node::named("f1", "f1t")
        );
        assert!(nodes.has_named());
    }

    #[test]
    fn name_attribute_priority() {
        let nodes =
            decode(r#"<i name="a" id="b">x</i><i id="c" data-name="d">y</i><i data-name="e">z</i>"#)
                .unwrap();
        let names: Vec<_> = nodes.iter().map(|n| n.name.clone()).collect();
        assert_eq!(
            names,
            vec![Some("a".into()), Some("c".into()), Some("e".into())]
        );
    }

    #[test]
    fn nested_markup_keeps_inner_html() {
        let nodes = decode(r#"<i id="f1"><b id="n1">n1t</b></i>"#).unwrap();
        assert_eq!(nodes.len(), 1);
        let node = nodes.iter().next().unwrap();
        assert_eq!(node.name.as_deref(), Some("f1"));
        assert_eq!(node.content, r#"<b id="n1">n1t</b>"#);
    }

    #[test]
    fn content_is_trimmed() {
        let nodes = decode("<i>  spaced out  </i>").unwrap();
        assert_eq!(nodes.iter().next().unwrap().content, "spaced out");
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        assert!(decode("<invalid HTML").is_err());
    }

    #[test]
    fn plain_text_is_an_error() {
        assert!(decode("just some text").is_err());
    }

    #[test]
    fn empty_attribute_does_not_name() {
        let nodes = decode(r#"<i name="">x</i>"#).unwrap();
        assert!(!nodes.has_named());
    }
}
