//! Dotted-path lookup over a [`Node`] tree.
//!
//! A path like `nfeProc.NFe.infNFe` is walked one segment at a time. Lookup
//! stops at the first segment that is missing or that meets a non-mapping
//! value, so malformed trees never cause an error.

use super::Node;

/// Resolve `path` against `tree`.
pub fn resolve<'a>(tree: &'a Node, path: &str) -> Option<&'a Node> {
    path.split('.')
        .try_fold(tree, |current, segment| current.as_map()?.get(segment))
}

/// Resolve `path`, falling back to `default` when any segment is missing.
pub fn resolve_or<'a>(tree: &'a Node, path: &str, default: &'a Node) -> &'a Node {
    resolve(tree, path).unwrap_or(default)
}

/// Resolve `path` to its scalar text, or `""`.
pub fn resolve_text<'a>(tree: &'a Node, path: &str) -> &'a str {
    resolve(tree, path).map(Node::text).unwrap_or("")
}
