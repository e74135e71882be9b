//! Constituency tree data structures
//!
//! Trees are stored as an arena of [`Node`]s addressed by [`NodeId`]. Ids are
//! handed out in document pre-order, so the root is always the first node and
//! comparing ids compares document position.

use std::fmt;

/// Index of a node within its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena (pre-order rank)
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in a constituency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Terminal word
    Leaf { token: String },
    /// Constituent with ordered children
    Internal { label: String, children: Vec<NodeId> },
}

impl Node {
    /// Token for leaves, label for internal nodes
    pub fn text(&self) -> &str {
        match self {
            Node::Leaf { token } => token,
            Node::Internal { label, .. } => label,
        }
    }

    /// Children of an internal node; empty for leaves
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Internal { children, .. } => children,
        }
    }
}

/// A parsed tree (one record)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Tree {
    /// A tree consisting of a single leaf
    pub fn leaf(token: &str) -> Self {
        Self {
            nodes: vec![Node::Leaf {
                token: token.to_string(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by id
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text of a node: token for leaves, label for internal nodes
    pub fn text(&self, id: NodeId) -> &str {
        self.node(id).text()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Single-line S-expression of the subtree at `id`
    pub fn sexpr(&self, id: NodeId) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_node(&mut out, id);
        out
    }

    fn write_node<W: fmt::Write>(&self, f: &mut W, id: NodeId) -> fmt::Result {
        // Explicit stack so deeply nested trees cannot overflow
        let mut stack = vec![Emit::Node { id, space: false }];
        while let Some(step) = stack.pop() {
            let (id, space) = match step {
                Emit::Close => {
                    f.write_str(")")?;
                    continue;
                }
                Emit::Node { id, space } => (id, space),
            };
            if space {
                f.write_str(" ")?;
            }
            match self.node(id) {
                Node::Leaf { token } => f.write_str(token)?,
                Node::Internal { label, children } => {
                    f.write_str("(")?;
                    f.write_str(label)?;
                    stack.push(Emit::Close);
                    for (i, &child) in children.iter().enumerate().rev() {
                        let space = i > 0 || !label.is_empty();
                        stack.push(Emit::Node { id: child, space });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Pending output of the S-expression writer
enum Emit {
    Node { id: NodeId, space: bool },
    Close,
}

/// Canonical single-line S-expression
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root)
    }
}

/// Incremental pre-order construction used by the parser
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for an internal node whose children are not known yet
    pub(crate) fn open(&mut self, label: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Internal {
            label,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn set_label(&mut self, id: NodeId, text: String) {
        if let Node::Internal { label, .. } = &mut self.nodes[id.0] {
            *label = text;
        }
    }

    pub(crate) fn leaf(&mut self, token: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Leaf { token });
        id
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Node::Internal { children, .. } = &mut self.nodes[parent.0] {
            children.push(child);
        }
    }

    pub(crate) fn finish(self, root: NodeId) -> Tree {
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn np_tree() -> Tree {
        let mut b = TreeBuilder::new();
        let np = b.open("NP".to_string());
        let det = b.open("DT".to_string());
        let the = b.leaf("the".to_string());
        b.push_child(det, the);
        b.push_child(np, det);
        let n = b.open("NN".to_string());
        let dog = b.leaf("dog".to_string());
        b.push_child(n, dog);
        b.push_child(np, n);
        b.finish(np)
    }

    #[test]
    fn test_builder_assigns_preorder_ids() {
        let tree = np_tree();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.root().index(), 0);
        assert_eq!(tree.text(NodeId(1)), "DT");
        assert_eq!(tree.text(NodeId(2)), "the");
        assert_eq!(tree.children(tree.root()), &[NodeId(1), NodeId(3)]);
    }

    #[test]
    fn test_display_single_line() {
        assert_eq!(np_tree().to_string(), "(NP (DT the) (NN dog))");
    }

    #[test]
    fn test_subtree_sexpr() {
        let tree = np_tree();

        assert_eq!(tree.sexpr(NodeId(3)), "(NN dog)");
        assert_eq!(tree.sexpr(NodeId(4)), "dog");
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = Tree::leaf("hello");

        assert_eq!(tree.len(), 1);
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.to_string(), "hello");
    }

    #[test]
    fn test_get_out_of_range() {
        assert!(np_tree().get(NodeId(99)).is_none());
    }
}
