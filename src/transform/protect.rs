//! Protected-region classification.
//!
//! Verbatim regions (`pre`, `code`) must survive the pipeline
//! byte-for-byte, so every substitution pass consults this before touching
//! a text node. Link regions additionally block punctuation normalization,
//! which would otherwise rewrite hyphens inside resolved URLs.

use crate::model::tags::{LINK, VERBATIM_TAGS};
use crate::model::{NodeId, Tree};

/// Which protected set to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protect {
    /// Preformatted/code containers; blocks nearly all substitution passes.
    Verbatim,
    /// Resolved hyperlinks; blocks dash/quote adjustments only.
    Link,
}

/// True if the node, or any of its ancestors, carries a tag in the
/// protected set for `kind`.
pub fn is_protected(tree: &Tree, id: NodeId, kind: Protect) -> bool {
    let matches_kind = |tag: &str| match kind {
        Protect::Verbatim => VERBATIM_TAGS.contains(&tag),
        Protect::Link => tag == LINK,
    };

    if tree.tag(id).is_some_and(matches_kind) {
        return true;
    }
    tree.ancestors(id)
        .any(|ancestor| tree.tag(ancestor).is_some_and(matches_kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_inside_pre_is_verbatim() {
        let mut tree = Tree::new();
        let pre = tree.create_element("pre", vec![]);
        tree.append_child(NodeId::ROOT, pre);
        let em = tree.create_element("em", vec![]);
        tree.append_child(pre, em);
        let text = tree.create_text("for x in y");
        tree.append_child(em, text);

        assert!(is_protected(&tree, text, Protect::Verbatim));
        assert!(!is_protected(&tree, text, Protect::Link));
    }

    #[test]
    fn test_link_blocks_only_link_kind() {
        let mut tree = Tree::new();
        let link = tree.create_element("link", vec![("href".into(), "x".into())]);
        tree.append_child(NodeId::ROOT, link);
        let text = tree.create_text("example.com/a-b");
        tree.append_child(link, text);

        assert!(is_protected(&tree, text, Protect::Link));
        assert!(!is_protected(&tree, text, Protect::Verbatim));
    }

    #[test]
    fn test_plain_text_unprotected() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", vec![]);
        tree.append_child(NodeId::ROOT, p);
        let text = tree.create_text("ordinary prose");
        tree.append_child(p, text);

        assert!(!is_protected(&tree, text, Protect::Verbatim));
        assert!(!is_protected(&tree, text, Protect::Link));
    }
}
