//! Python bindings for parsetools
//!
//! This module provides PyO3-based Python bindings for the Rust core.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::sync::Arc;

use crate::layout::{LayoutOptions, layout};
use crate::parser::{ParseError, parse_with};
use crate::segmenter::Segmenter;
use crate::tree::Tree as RustTree;
use crate::treebank::{Treebank, TreebankError};

/// Convert ParseError to Python exception
impl From<ParseError> for PyErr {
    fn from(err: ParseError) -> PyErr {
        PyValueError::new_err(format!("Bad S-expression: {}", err))
    }
}

impl From<TreebankError> for PyErr {
    fn from(err: TreebankError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[pyclass(name = "Tree", frozen)]
#[derive(Clone)]
pub struct PyTree {
    pub(crate) inner: Arc<RustTree>,
}

impl PyTree {
    fn new(tree: RustTree) -> Self {
        Self {
            inner: Arc::new(tree),
        }
    }
}

#[pymethods]
impl PyTree {
    /// Leaf tokens, in order
    fn terminals(&self) -> Vec<String> {
        let tree = &self.inner;
        tree.terminals(tree.root())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Preterminal subtrees as S-expressions
    fn preterminals(&self) -> Vec<String> {
        let tree = &self.inner;
        tree.preterminal_nodes(tree.root())
            .unwrap_or_default()
            .into_iter()
            .map(|id| tree.sexpr(id))
            .collect()
    }

    /// One list of labels per terminal, from the root down to the token
    fn paths(&self) -> Vec<Vec<String>> {
        let tree = &self.inner;
        tree.root_to_leaf_paths(tree.root())
            .into_iter()
            .map(|path| path.into_iter().map(|id| tree.text(id).to_string()).collect())
            .collect()
    }

    /// Bracket diagram of the tree
    #[pyo3(signature = (min_width=3, max_rows=40))]
    fn layout(&self, min_width: usize, max_rows: usize) -> String {
        let options = LayoutOptions {
            min_width,
            max_rows,
        };
        layout(&self.inner, &options).render()
    }

    fn sexpr(&self) -> String {
        self.inner.to_string()
    }

    #[getter]
    fn label(&self) -> String {
        self.inner.text(self.inner.root()).to_string()
    }

    fn __len__(&self) -> usize {
        self.inner.terminals(self.inner.root()).len()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        let words = self.terminals();
        let n = words.len();
        if n > 3 {
            format!("<Tree len={} words='{} ...'>", n, words[..3].join(" "))
        } else {
            format!("<Tree len={} words='{}'>", n, words.join(" "))
        }
    }
}

/// Parse one S-expression into a Tree.
///
/// Raises:
///     ValueError: If the text is not a balanced S-expression
#[pyfunction]
#[pyo3(signature = (text, add_root=true))]
fn parse_sexpr(text: &str, add_root: bool) -> PyResult<PyTree> {
    Ok(PyTree::new(parse_with(text, add_root)?))
}

/// Split text into raw (possibly multi-line) records.
#[pyfunction]
fn iter_parses(text: &str) -> Vec<String> {
    Segmenter::new(text.lines()).map(|r| r.text).collect()
}

/// Read every parseable tree from files matching a glob pattern.
///
/// Records that fail to parse are skipped.
#[pyfunction]
fn read_trees(glob_pattern: &str) -> PyResult<Vec<PyTree>> {
    let treebank = Treebank::from_glob(glob_pattern)?;
    Ok(treebank.into_iter().map(PyTree::new).collect())
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn parsetools(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTree>()?;

    m.add_function(wrap_pyfunction!(parse_sexpr, m)?)?;
    m.add_function(wrap_pyfunction!(iter_parses, m)?)?;
    m.add_function(wrap_pyfunction!(read_trees, m)?)?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}
