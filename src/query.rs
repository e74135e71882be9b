//! Tree queries
//!
//! Derived views over a [`Tree`]: leaf tokens, preterminal nodes, pre-order
//! walks and root-to-leaf paths. All results are in left-to-right document
//! order.

use thiserror::Error;

use crate::tree::{Node, NodeId, Tree};

/// Error type for queries given an unsuitable node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{operation} requires an internal node, got leaf {token:?}")]
    InvalidOperand {
        operation: &'static str,
        token: String,
    },
}

impl Tree {
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Leaf { .. })
    }

    /// Internal node with exactly one child, which is a leaf (e.g. `(N car)`)
    ///
    /// A label followed by several bare tokens, such as `(CD 412 682)`, is
    /// not a preterminal here even though [`Tree::preterminal_nodes`]
    /// reports it as one.
    pub fn is_preterminal(&self, id: NodeId) -> bool {
        match self.node(id) {
            Node::Internal { children, .. } => {
                children.len() == 1 && self.is_leaf(children[0])
            }
            Node::Leaf { .. } => false,
        }
    }

    /// The terminals (leaves) below `id`, in order
    pub fn terminals(&self, id: NodeId) -> Vec<&str> {
        self.preorder(id)
            .filter_map(|n| match self.node(n) {
                Node::Leaf { token } => Some(token.as_str()),
                Node::Internal { .. } => None,
            })
            .collect()
    }

    /// Internal nodes whose first child is a leaf, in order
    ///
    /// Descent stops at such a node, so a malformed `(CD 412 682)` is
    /// returned whole. Bare leaves in later positions contribute nothing.
    pub fn preterminal_nodes(&self, id: NodeId) -> Result<Vec<NodeId>, QueryError> {
        if let Node::Leaf { token } = self.node(id) {
            return Err(QueryError::InvalidOperand {
                operation: "preterminal_nodes",
                token: token.clone(),
            });
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Node::Internal { children, .. } = self.node(id) else {
                continue;
            };
            match children.first() {
                Some(&first) if self.is_leaf(first) => out.push(id),
                _ => stack.extend(children.iter().rev().copied()),
            }
        }
        Ok(out)
    }

    /// Depth-first pre-order walk starting at (and including) `id`
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }

    /// One top-to-bottom path per terminal
    ///
    /// `(S (NP (N Fred)) (VP (V runs)))` gives `[S NP N Fred]` and
    /// `[S VP V runs]`, as node ids.
    pub fn root_to_leaf_paths(&self, id: NodeId) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        let mut path = Vec::new();
        // (node, depth of its parent's path)
        let mut stack = vec![(id, 0)];
        while let Some((id, depth)) = stack.pop() {
            path.truncate(depth);
            path.push(id);
            match self.node(id) {
                Node::Leaf { .. } => paths.push(path.clone()),
                Node::Internal { children, .. } => {
                    stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
                }
            }
        }
        paths
    }
}

/// Lazy pre-order iterator returned by [`Tree::preorder`]
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
