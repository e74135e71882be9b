//! Collections of bracketed trees
//!
//! A [`Treebank`] names where records come from: in-memory text, files
//! (gzip-aware), glob patterns or stdin. Iterating it yields parsed trees;
//! unreadable inputs and records that fail to parse are logged and skipped.

use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::parser::parse;
use crate::segmenter::{Record, RecordReader, TextStats};
use crate::tree::Tree;

#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("no files match {0:?}")]
    NoMatches(String),
}

/// Source of records
#[derive(Debug, Clone)]
enum Input {
    Text(String),
    File(PathBuf),
    Stdin,
}

impl Input {
    fn name(&self) -> String {
        match self {
            Input::Text(_) => "<string>".to_string(),
            Input::File(path) => path.display().to_string(),
            Input::Stdin => "<stdin>".to_string(),
        }
    }

    fn open(&self) -> io::Result<RecordReader<Box<dyn BufRead + Send>>> {
        let reader: Box<dyn BufRead + Send> = match self {
            Input::File(path) => return RecordReader::from_file(path),
            Input::Text(text) => Box::new(Cursor::new(text.as_bytes().to_vec())),
            Input::Stdin => Box::new(BufReader::new(io::stdin())),
        };
        Ok(RecordReader::new(reader))
    }
}

/// Collection of trees from strings, files, glob patterns or stdin
///
/// # Examples
///
/// ```no_run
/// use parsetools::Treebank;
///
/// for tree in Treebank::from_file("parses.mrg") {
///     println!("{}", tree.terminals(tree.root()).join(" "));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    inputs: Vec<Input>,
}

impl Treebank {
    /// Create from in-memory bracketed text
    pub fn from_string(text: &str) -> Self {
        Self {
            inputs: vec![Input::Text(text.to_string())],
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![Input::File(path.as_ref().to_path_buf())],
        }
    }

    /// Create from explicit file paths; `-` stands for stdin
    pub fn from_paths<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        let inputs = paths
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                if p == Path::new("-") {
                    Input::Stdin
                } else {
                    Input::File(p.to_path_buf())
                }
            })
            .collect();
        Self { inputs }
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, TreebankError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        if paths.is_empty() {
            return Err(TreebankError::NoMatches(pattern.to_string()));
        }
        paths.sort();
        Ok(Self::from_paths(paths))
    }

    /// Read from standard input
    pub fn stdin() -> Self {
        Self {
            inputs: vec![Input::Stdin],
        }
    }

    /// Raw records from every input, in order
    pub fn records(&self) -> Records {
        Records {
            inputs: self.inputs.clone().into_iter(),
            current: None,
            source: String::new(),
            stats: TextStats::default(),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Tree>> {
        self.clone().into_iter()
    }
}

impl IntoIterator for Treebank {
    type Item = Tree;
    type IntoIter = Box<dyn Iterator<Item = Self::Item>>;

    fn into_iter(self) -> Self::IntoIter {
        let mut records = self.records();
        let iter = std::iter::from_fn(move || {
            while let Some(record) = records.next() {
                match parse(&record.text) {
                    Ok(tree) => return Some(tree),
                    Err(e) => warn!(
                        source = %records.source(),
                        line = record.line_num,
                        error = %e,
                        "skipping record"
                    ),
                }
            }
            None
        });
        Box::new(iter)
    }
}

/// Record iterator over all inputs of a [`Treebank`]
///
/// Inputs that cannot be opened, and the remainder of an input after a read
/// error, are logged and skipped.
pub struct Records {
    inputs: std::vec::IntoIter<Input>,
    current: Option<RecordReader<Box<dyn BufRead + Send>>>,
    source: String,
    stats: TextStats,
}

impl Records {
    /// Name of the input the last record came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Decoding counters over everything read so far
    pub fn stats(&self) -> TextStats {
        let mut stats = self.stats;
        if let Some(reader) = &self.current {
            stats += reader.stats();
        }
        stats
    }
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(reader) = self.current.as_mut() {
                match reader.next() {
                    Some(Ok(record)) => return Some(record),
                    Some(Err(e)) => {
                        warn!(
                            source = %self.source,
                            error = %e,
                            "read failed, skipping rest of input"
                        );
                    }
                    None => {
                        self.stats += reader.stats();
                        self.current = None;
                    }
                }
                continue;
            }

            let input = self.inputs.next()?;
            self.source = input.name();
            match input.open() {
                Ok(reader) => self.current = Some(reader),
                Err(e) => warn!(source = %self.source, error = %e, "failed to open input"),
            }
        }
    }
}
