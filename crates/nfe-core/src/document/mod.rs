//! Untyped document tree built from XML.
//!
//! The tree follows the usual XML-to-dictionary convention: attributes become
//! `@name` keys, repeated child elements collapse into a [`Node::List`], and
//! text next to attributes or children is stored under `#text`. An element
//! with neither attributes nor children is a plain [`Node::Text`], or
//! [`Node::Null`] when it is empty.

mod parser;
pub mod path;

pub use parser::{parse, ParseError};
pub use path::{resolve, resolve_or, resolve_text};

use std::collections::BTreeMap;

/// Key under which mixed text content is stored.
pub const TEXT_KEY: &str = "#text";

/// Prefix for attribute keys.
pub const ATTRIBUTE_PREFIX: char = '@';

/// One value in a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Node {
    /// Empty element.
    #[default]
    Null,
    /// Text-only element or attribute value.
    Text(String),
    /// Element with attributes and/or child elements.
    Map(BTreeMap<String, Node>),
    /// Repeated sibling elements sharing one name.
    List(Vec<Node>),
}

impl Node {
    /// Borrow the mapping, if this node is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this node is a key-value mapping.
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// Look up a direct child key of a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Scalar text of this node.
    ///
    /// A mapping yields its `#text` entry; null, lists and mappings without
    /// text yield the empty string.
    pub fn text(&self) -> &str {
        match self {
            Node::Text(text) => text,
            Node::Map(map) => match map.get(TEXT_KEY) {
                Some(Node::Text(text)) => text,
                _ => "",
            },
            Node::Null | Node::List(_) => "",
        }
    }
}

/// A parsed XML file: a mapping from the root element name to its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    root: Node,
}

impl RawDocument {
    /// Parse raw XML bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        parse(bytes).map(|root| Self { root })
    }

    /// Resolve a dotted path from the document root.
    pub fn resolve(&self, path: &str) -> Option<&Node> {
        resolve(&self.root, path)
    }
}
