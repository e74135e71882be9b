//! Console tree diagrams
//!
//! Draws a tree as stacked brackets over its words:
//!
//! ```text
//! S-------------
//!     VP--------
//! N   V  V
//! bob is running
//! ```
//!
//! Each preterminal is a column. Every other constituent becomes a span over
//! the columns it dominates, and spans are packed greedily into rows,
//! narrowest first, so nested constituents sit below the ones containing
//! them.

use std::fmt;
use tracing::debug;

use crate::parser::ROOT_LABEL;
use crate::tree::{NodeId, Tree};

/// Layout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Minimum width of a column, in characters
    pub min_width: usize,
    /// Upper bound on span rows; spans that do not fit are dropped
    pub max_rows: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_width: 3,
            max_rows: 40,
        }
    }
}

/// Columns `start..end` dominated by a constituent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub node: NodeId,
}

impl Span {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// One leaf column: preterminal label, its word(s) and display width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub token: String,
    pub width: usize,
}

/// Per-column slots of one row, holding indices into [`Layout::spans`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    slots: Vec<Option<usize>>,
}

impl Row {
    fn new(columns: usize) -> Self {
        Self {
            slots: vec![None; columns],
        }
    }

    fn fits(&self, span: &Span) -> bool {
        self.slots[span.start..span.end].iter().all(Option::is_none)
    }

    fn occupy(&mut self, span: &Span, index: usize) {
        for slot in &mut self.slots[span.start..span.end] {
            *slot = Some(index);
        }
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Span indices in this row, left to right
    pub fn spans(&self) -> impl Iterator<Item = usize> + '_ {
        let mut last = None;
        self.slots.iter().filter_map(move |slot| {
            let span = (*slot)?;
            if last == Some(span) {
                return None;
            }
            last = Some(span);
            Some(span)
        })
    }
}

/// Row assignment for a tree
///
/// `rows[0]` is the row nearest the words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    columns: Vec<Column>,
    spans: Vec<Span>,
    rows: Vec<Row>,
}

/// Lay out a tree
pub fn layout(tree: &Tree, options: &LayoutOptions) -> Layout {
    let root = tree.root();
    let Ok(preterminals) = tree.preterminal_nodes(root) else {
        // A bare leaf: one column, no label
        let token = tree.text(root).to_string();
        return Layout {
            columns: vec![column(String::new(), token, options.min_width)],
            spans: Vec::new(),
            rows: Vec::new(),
        };
    };

    let mut column_of = vec![None; tree.len()];
    for (i, &id) in preterminals.iter().enumerate() {
        column_of[id.index()] = Some(i);
    }

    let mut spans = collect_spans(tree, &column_of);
    spans.sort_by_key(|span| (span.width(), span.start));

    let mut rows: Vec<Row> = Vec::new();
    for (index, span) in spans.iter().enumerate() {
        if let Some(row) = rows.iter_mut().find(|row| row.fits(span)) {
            row.occupy(span, index);
        } else if rows.len() < options.max_rows {
            let mut row = Row::new(preterminals.len());
            row.occupy(span, index);
            rows.push(row);
        } else {
            debug!(
                label = %span.label,
                start = span.start,
                end = span.end,
                "no room for span, dropping"
            );
        }
    }

    let columns = preterminals
        .iter()
        .map(|&id| {
            let token = tree.terminals(id).join(" ");
            column(tree.text(id).to_string(), token, options.min_width)
        })
        .collect();

    Layout {
        columns,
        spans,
        rows,
    }
}

fn column(label: String, token: String, min_width: usize) -> Column {
    let width = min_width
        .max(token.chars().count() + 1)
        .max(label.chars().count() + 1);
    Column {
        label,
        token,
        width,
    }
}

/// Spans of every constituent except leaves, preterminals and `ROOT`
///
/// A span starts at the column of the node's first preterminal, matched by
/// node id so that identical preterminals stay distinct. Nodes below a
/// column (inside a preterminal-like node) get no span.
fn collect_spans(tree: &Tree, column_of: &[Option<usize>]) -> Vec<Span> {
    let order: Vec<NodeId> = tree.preorder(tree.root()).collect();

    // (first column, number of columns) covered by each node, children first
    let mut extent: Vec<Option<(usize, usize)>> = vec![None; tree.len()];
    for &id in order.iter().rev() {
        extent[id.index()] = match column_of[id.index()] {
            Some(column) => Some((column, 1)),
            None => tree
                .children(id)
                .iter()
                .filter_map(|child| extent[child.index()])
                .fold(None, |acc, (start, count)| match acc {
                    Some((first, total)) => Some((first, total + count)),
                    None => Some((start, count)),
                }),
        };
    }

    let mut below_column = vec![false; tree.len()];
    let mut spans = Vec::new();
    for &id in &order {
        let hidden = below_column[id.index()] || column_of[id.index()].is_some();
        for &child in tree.children(id) {
            below_column[child.index()] = hidden;
        }
        if below_column[id.index()] || tree.is_leaf(id) || tree.is_preterminal(id) {
            continue;
        }
        let label = tree.text(id);
        if label == ROOT_LABEL {
            continue;
        }
        let Some((start, count)) = extent[id.index()] else {
            continue;
        };
        spans.push(Span {
            start,
            end: start + count,
            label: label.to_string(),
            node: id,
        });
    }
    spans
}

impl Layout {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row holding the span for `node`, if it was placed
    pub fn row_of(&self, node: NodeId) -> Option<usize> {
        let index = self.spans.iter().position(|span| span.node == node)?;
        self.rows
            .iter()
            .position(|row| row.slots.contains(&Some(index)))
    }

    /// Rendered lines: span rows from the top, then labels, then words
    pub fn render_lines(&self) -> Vec<String> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .rev()
            .map(|row| self.render_row(row))
            .collect();
        lines.push(self.render_cells(|c| c.label.as_str()));
        lines.push(self.render_cells(|c| c.token.as_str()));
        lines
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.render_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    fn render_cells(&self, text: impl Fn(&Column) -> &str) -> String {
        let mut out = String::new();
        for column in &self.columns {
            pad_to(&mut out, text(column), column.width);
        }
        out
    }

    fn render_row(&self, row: &Row) -> String {
        let mut out = String::new();
        let mut i = 0;
        while i < row.slots.len() {
            let Some(index) = row.slots[i] else {
                pad_to(&mut out, "", self.columns[i].width);
                i += 1;
                continue;
            };
            let span = &self.spans[index];
            let width: usize = self.columns[span.start..span.end]
                .iter()
                .map(|c| c.width)
                .sum();
            out.push_str(&bracket(&span.label, width));
            i = span.end;
        }
        out
    }
}

/// `label` followed by dashes, ending in a space; the label wins if it is
/// as wide as the bracket
fn bracket(label: &str, width: usize) -> String {
    let mut cells = vec!['-'; width];
    if let Some(last) = cells.last_mut() {
        *last = ' ';
    }
    for (cell, c) in cells.iter_mut().zip(label.chars()) {
        *cell = c;
    }
    cells.into_iter().collect()
}

fn pad_to(out: &mut String, text: &str, width: usize) {
    out.push_str(text);
    let len = text.chars().count();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
