//! Arena-based document tree.
//!
//! All nodes are stored in a contiguous vector. Parent links are plain
//! indices and child order is an index sequence owned by the arena, so the
//! parent back-references never form an ownership cycle. Detached nodes
//! (allocated but not yet inserted, or removed) simply have no parent and
//! are not reachable from the root.

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document root ID (always 0).
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root. Exactly one per tree, always at [`NodeId::ROOT`].
    Document,
    /// Element with a tag name and ordered attributes.
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    /// Text content.
    Text(String),
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    /// Parent node (None for the root and for detached nodes).
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-allocated document tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a new tree containing only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Get the number of nodes (including detached ones).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.alloc(Node::new(NodeData::Element {
            tag: tag.to_string(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    /// Append a child to a parent node. The child must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Insert a child at the given index among the parent's children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
    }

    /// Remove a node from its parent's child list. The node itself (and its
    /// subtree) stays allocated but becomes unreachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let parent = match self.get(id).and_then(|n| n.parent) {
            Some(p) => p,
            None => return,
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Position of a node among its parent's children.
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.get(parent)?.children.iter().position(|&c| c == id)
    }

    /// Replace a node with an ordered sequence of nodes, preserving the
    /// relative order of all other siblings. Returns false if the node has
    /// no parent to splice into.
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) -> bool {
        let parent = match self.get(id).and_then(|n| n.parent) {
            Some(p) => p,
            None => return false,
        };
        let index = match self.child_index(id) {
            Some(i) => i,
            None => return false,
        };
        self.detach(id);
        for (offset, &repl) in replacements.iter().enumerate() {
            self.insert_child(parent, index + offset, repl);
        }
        true
    }

    /// Wrap a node in a new element, which takes the node's place among its
    /// siblings. Returns the wrapper's ID.
    pub fn wrap(&mut self, id: NodeId, tag: &str) -> NodeId {
        let wrapper = self.create_element(tag, Vec::new());
        if let (Some(parent), Some(index)) =
            (self.get(id).and_then(|n| n.parent), self.child_index(id))
        {
            self.detach(id);
            self.insert_child(parent, index, wrapper);
        }
        self.append_child(wrapper, id);
        wrapper
    }

    /// Children of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Walk the parent chain, starting from the node's parent.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.get(id).and_then(|n| n.parent),
        }
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(|n| &n.data),
            Some(NodeData::Element { .. })
        )
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Text(_)))
    }

    /// Get an element's tag name.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Rename an element in place, keeping attributes and children.
    pub fn set_tag(&mut self, id: NodeId, new_tag: &str) {
        if let Some(NodeData::Element { tag, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            *tag = new_tag.to_string();
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing value or appending in order.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
                entry.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Get the content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: NodeId, new_text: impl Into<String>) {
        if let Some(NodeData::Text(s)) = self.get_mut(id).map(|n| &mut n.data) {
            *s = new_text.into();
        }
    }

    /// All descendants of a node in document order (pre-order, excluding
    /// the node itself). The result is a snapshot: mutating the tree does
    /// not invalidate it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Snapshot of all text nodes reachable from the root, in document order.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&id| self.is_text(id))
            .collect()
    }

    /// Snapshot of all elements under the root whose tag matches one of the
    /// given names, in document order.
    pub fn elements_named(&self, names: &[&str]) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&id| self.tag(id).is_some_and(|t| names.contains(&t)))
            .collect()
    }

    /// Concatenated text content of a subtree.
    pub fn collect_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for desc in self.descendants(id) {
            if let Some(text) = self.text(desc) {
                out.push_str(text);
            }
        }
        out
    }

    /// Render a subtree (children of `id`) as markup.
    pub fn render_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.render_node(child, &mut out);
        }
        out
    }

    /// Render a single node as markup, its own tags included.
    pub fn render_node_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_node(id, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeData::Element { tag, attrs }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if self.children(id).is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in self.children(id).to_vec().iter() {
                        self.render_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
            Some(NodeData::Document) | None => {}
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.get(id).and_then(|n| n.parent);
        Some(id)
    }
}

/// Escape text content for markup output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for markup output.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_children() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", vec![]);
        tree.append_child(NodeId::ROOT, p);
        let a = tree.create_text("one");
        let b = tree.create_text("two");
        tree.append_child(p, a);
        tree.append_child(p, b);

        assert_eq!(tree.children(p), &[a, b]);
        assert_eq!(tree.get(a).unwrap().parent, Some(p));
    }

    #[test]
    fn test_replace_with_preserves_order() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", vec![]);
        tree.append_child(NodeId::ROOT, p);
        let before = tree.create_text("before");
        let target = tree.create_text("target");
        let after = tree.create_text("after");
        tree.append_child(p, before);
        tree.append_child(p, target);
        tree.append_child(p, after);

        let x = tree.create_text("x");
        let y = tree.create_element("em", vec![]);
        assert!(tree.replace_with(target, &[x, y]));

        assert_eq!(tree.children(p), &[before, x, y, after]);
        assert_eq!(tree.get(target).unwrap().parent, None);
        assert_eq!(tree.get(x).unwrap().parent, Some(p));
    }

    #[test]
    fn test_replace_detached_fails() {
        let mut tree = Tree::new();
        let orphan = tree.create_text("orphan");
        let repl = tree.create_text("repl");
        assert!(!tree.replace_with(orphan, &[repl]));
    }

    #[test]
    fn test_wrap_takes_place_of_node() {
        let mut tree = Tree::new();
        let ul = tree.create_element("ul", vec![]);
        tree.append_child(NodeId::ROOT, ul);
        let first = tree.create_text("A");
        let second = tree.create_text("B");
        tree.append_child(ul, first);
        tree.append_child(ul, second);

        let wrapper = tree.wrap(first, "ul_first");

        assert_eq!(tree.children(ul), &[wrapper, second]);
        assert_eq!(tree.tag(wrapper), Some("ul_first"));
        assert_eq!(tree.children(wrapper), &[first]);
        assert_eq!(tree.get(first).unwrap().parent, Some(wrapper));
    }

    #[test]
    fn test_text_nodes_document_order() {
        let mut tree = Tree::new();
        let t1 = tree.create_text("one ");
        tree.append_child(NodeId::ROOT, t1);
        let em = tree.create_element("em", vec![]);
        tree.append_child(NodeId::ROOT, em);
        let t2 = tree.create_text("two");
        tree.append_child(em, t2);
        let t3 = tree.create_text(" three");
        tree.append_child(NodeId::ROOT, t3);

        assert_eq!(tree.text_nodes(), vec![t1, t2, t3]);
    }

    #[test]
    fn test_attrs_keep_order() {
        let mut tree = Tree::new();
        let img = tree.create_element("img", vec![("src".into(), "a.png".into())]);
        tree.set_attr(img, "alt", "pic");
        tree.set_attr(img, "src", "b.png");
        assert_eq!(tree.attr(img, "src"), Some("b.png"));
        assert_eq!(tree.attr(img, "alt"), Some("pic"));
    }

    #[test]
    fn test_render_markup_escapes_text() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", vec![]);
        tree.append_child(NodeId::ROOT, p);
        let t = tree.create_text("a < b & c");
        tree.append_child(p, t);
        assert_eq!(tree.render_markup(NodeId::ROOT), "<p>a &lt; b &amp; c</p>");
    }
}
