//! Parsetools: bracketed constituency parse toolkit
//!
//! Reads treebank-style S-expressions, answers structural queries over them
//! and draws them as ASCII bracket diagrams.
//! Core implementation in Rust with optional Python bindings.

pub mod export; // JSON sentence objects
pub mod layout; // Console bracket diagrams
pub mod ops; // Named operations for the CLI
pub mod parser; // S-expression parser
pub mod query; // Terminals, preterminals, walks, paths
pub mod segmenter; // Multi-line record reassembly
pub mod tree; // Arena tree data structures
pub mod treebank; // Record sources (strings, files, globs, stdin)

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use export::Sentence;
pub use layout::{Layout, LayoutOptions, Span, layout};
pub use ops::{Operation, OperationError};
pub use parser::{ParseError, is_balanced, parse, parse_with};
pub use query::{Preorder, QueryError};
pub use segmenter::{Record, RecordReader, Segmenter, TextStats, collapse_whitespace};
pub use tree::{Node, NodeId, Tree};
pub use treebank::{Records, Treebank, TreebankError};
