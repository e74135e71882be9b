//! Named tree operations
//!
//! The closed set of operations the `apply` command can run over parsed
//! records. Each produces a JSON value so results can be written one per
//! line.

use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::tree::Tree;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("unknown operation {name:?} (expected one of: {expected})")]
    Unknown { name: String, expected: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Leaf tokens in order
    Terminals,
    /// Preterminal subtrees as S-expressions
    Preterminals,
    /// Root-to-leaf paths as lists of labels ending in the token
    Paths,
    /// Labels and tokens in pre-order
    Preorder,
    /// Canonical single-line S-expression
    Sexpr,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Terminals,
        Operation::Preterminals,
        Operation::Paths,
        Operation::Preorder,
        Operation::Sexpr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Terminals => "terminals",
            Operation::Preterminals => "preterminals",
            Operation::Paths => "paths",
            Operation::Preorder => "preorder",
            Operation::Sexpr => "sexpr",
        }
    }

    fn names() -> String {
        Self::ALL.map(Operation::name).join(", ")
    }

    pub fn apply(self, tree: &Tree) -> Value {
        let root = tree.root();
        match self {
            Operation::Terminals => json!(tree.terminals(root)),
            Operation::Preterminals => {
                // A bare-leaf tree has no preterminals
                let nodes = tree.preterminal_nodes(root).unwrap_or_default();
                Value::from_iter(nodes.into_iter().map(|id| tree.sexpr(id)))
            }
            Operation::Paths => Value::from_iter(
                tree.root_to_leaf_paths(root)
                    .into_iter()
                    .map(|path| Value::from_iter(path.into_iter().map(|id| tree.text(id)))),
            ),
            Operation::Preorder => Value::from_iter(tree.preorder(root).map(|id| tree.text(id))),
            Operation::Sexpr => Value::String(tree.to_string()),
        }
    }
}

impl FromStr for Operation {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| OperationError::Unknown {
                name: s.to_string(),
                expected: Self::names(),
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
