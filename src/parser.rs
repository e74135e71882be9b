//! Bracketed tree parser
//!
//! Hand-rolled stack parser for treebank-style S-expressions such as
//! `(ROOT (S (NP (N bob)) (VP (V runs))))`. Tokens are separated by space,
//! tab, CR or LF; parentheses cannot be escaped.

use memchr::{memchr, memchr2_iter};
use thiserror::Error;

use crate::tree::{NodeId, Tree, TreeBuilder};

/// Label given to the synthesized root of an unlabeled outermost bracket
pub const ROOT_LABEL: &str = "ROOT";

/// Error type for bracket parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no opening paren")]
    NoOpeningParen,

    #[error("too many closing parens (byte {offset})")]
    UnbalancedExtraClose { offset: usize },

    #[error("didn't close all parens, depth {depth}")]
    UnclosedAtEnd { depth: usize },
}

/// An open bracket whose node is already in the arena
#[derive(Debug)]
struct Frame {
    id: NodeId,
    /// Nothing seen inside yet, so a token here is the label
    fresh: bool,
}

/// Parse a bracketed tree, labelling an unlabeled outermost bracket `ROOT`
pub fn parse(text: &str) -> Result<Tree, ParseError> {
    parse_with(text, true)
}

/// Parse a bracketed tree
///
/// With `add_root` unset, an outermost bracket that wraps a list of subtrees
/// keeps an empty label instead of becoming `ROOT`.
///
/// Nodes are added to the arena as brackets open, so nesting depth is bounded
/// by memory rather than by the call stack.
pub fn parse_with(text: &str, add_root: bool) -> Result<Tree, ParseError> {
    let Some(start) = memchr(b'(', text.as_bytes()) else {
        return Err(ParseError::NoOpeningParen);
    };

    let mut builder = TreeBuilder::new();
    let mut open: Vec<Frame> = Vec::new();
    let mut root: Option<NodeId> = None;
    // Depth inside groups after the first one; only checked for balance
    let mut trailing = 0;
    let mut token = String::new();

    for (i, c) in text[start..].char_indices() {
        if root.is_some() {
            match c {
                '(' => trailing += 1,
                ')' if trailing == 0 => {
                    return Err(ParseError::UnbalancedExtraClose { offset: start + i });
                }
                ')' => trailing -= 1,
                _ => {}
            }
            continue;
        }

        match c {
            '(' => {
                // A token glued to an opening paren is dropped
                token.clear();
                let id = builder.open(String::new());
                let top_level = open.len() == 1;
                if let Some(parent) = open.last_mut() {
                    if parent.fresh && top_level && add_root {
                        builder.set_label(parent.id, ROOT_LABEL.to_string());
                    }
                    parent.fresh = false;
                    builder.push_child(parent.id, id);
                }
                open.push(Frame { id, fresh: true });
            }
            ')' => {
                flush(&mut builder, &mut open, &mut token);
                let Some(frame) = open.pop() else {
                    return Err(ParseError::UnbalancedExtraClose { offset: start + i });
                };
                if open.is_empty() {
                    root = Some(frame.id);
                }
            }
            ' ' | '\t' | '\r' | '\n' => flush(&mut builder, &mut open, &mut token),
            _ => token.push(c),
        }
    }

    if !open.is_empty() {
        return Err(ParseError::UnclosedAtEnd { depth: open.len() });
    }
    if trailing > 0 {
        return Err(ParseError::UnclosedAtEnd { depth: trailing });
    }
    match root {
        Some(root) => Ok(builder.finish(root)),
        None => Err(ParseError::NoOpeningParen),
    }
}

/// The first token inside a bracket is its label; later ones are leaves
fn flush(builder: &mut TreeBuilder, open: &mut [Frame], token: &mut String) {
    if token.is_empty() {
        return;
    }
    let token = std::mem::take(token);
    let Some(frame) = open.last_mut() else {
        return;
    };
    if frame.fresh {
        frame.fresh = false;
        builder.set_label(frame.id, token);
    } else {
        let leaf = builder.leaf(token);
        builder.push_child(frame.id, leaf);
    }
}

/// True if `text` contains a bracket and its parens balance without ever
/// closing more than were opened
pub fn is_balanced(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth: isize = 0;
    let mut seen_open = false;
    for i in memchr2_iter(b'(', b')', bytes) {
        if bytes[i] == b'(' {
            seen_open = true;
            depth += 1;
        } else {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    seen_open && depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    #[test]
    fn test_parse_simple() {
        let tree = parse("(S (N bob) (V runs))").unwrap();

        assert_eq!(tree.text(tree.root()), "S");
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.to_string(), "(S (N bob) (V runs))");
    }

    #[test]
    fn test_parse_multiline_and_tabs() {
        let tree = parse("(S\n\t(N bob)\r\n  (V runs) )").unwrap();

        assert_eq!(tree.to_string(), "(S (N bob) (V runs))");
    }

    #[test]
    fn test_text_before_first_paren_discarded() {
        let tree = parse("id-17: (X y)").unwrap();

        assert_eq!(tree.to_string(), "(X y)");
    }

    #[test]
    fn test_adds_root_for_unlabeled_outer_bracket() {
        let tree = parse("( (S (NP (N dogs)) (VP (V bark))) )").unwrap();

        assert_eq!(tree.text(tree.root()), ROOT_LABEL);
        assert_eq!(tree.to_string(), "(ROOT (S (NP (N dogs)) (VP (V bark))))");
    }

    #[test]
    fn test_without_root() {
        let tree = parse_with("((A b) (C d))", false).unwrap();

        assert_eq!(tree.text(tree.root()), "");
        assert_eq!(tree.to_string(), "((A b) (C d))");
    }

    #[test]
    fn test_unlabeled_inner_bracket_has_empty_label() {
        let tree = parse("(S ((A b)) (C d))").unwrap();
        let first = tree.children(tree.root())[0];

        assert_eq!(tree.text(first), "");
        assert_eq!(tree.children(first).len(), 1);
    }

    #[test]
    fn test_multi_token_node_passes_through() {
        let tree = parse("(NP (CD 412 682 6878))").unwrap();
        let cd = tree.children(tree.root())[0];

        assert_eq!(tree.children(cd).len(), 3);
        assert!(
            tree.children(cd)
                .iter()
                .all(|&c| matches!(tree.node(c), Node::Leaf { .. }))
        );
    }

    #[test]
    fn test_token_before_open_paren_is_dropped() {
        let tree = parse("(A b(C d))").unwrap();

        assert_eq!(tree.to_string(), "(A (C d))");
        assert_eq!(tree.terminals(tree.root()), vec!["d"]);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;
        let text = format!("{}(N x){}", "(X ".repeat(depth), ")".repeat(depth));
        let tree = parse(&text).unwrap();

        assert_eq!(tree.len(), depth + 2);
        assert_eq!(tree.terminals(tree.root()), vec!["x"]);
        assert_eq!(tree.preterminal_nodes(tree.root()).unwrap().len(), 1);
        assert_eq!(tree.root_to_leaf_paths(tree.root())[0].len(), depth + 2);
        assert_eq!(tree.to_string(), text);
    }

    #[test]
    fn test_unclosed_trailing_group() {
        assert_eq!(
            parse("(A b) (C (d"),
            Err(ParseError::UnclosedAtEnd { depth: 2 })
        );
    }

    #[test]
    fn test_only_first_group_kept() {
        let tree = parse("(A b) (C d) trailing").unwrap();

        assert_eq!(tree.to_string(), "(A b)");
    }

    #[test]
    fn test_unicode_tokens() {
        let tree = parse("(S (N café) (V 走る))").unwrap();

        assert_eq!(tree.to_string(), "(S (N café) (V 走る))");
    }

    #[test]
    fn test_no_opening_paren() {
        assert_eq!(parse("no parens here"), Err(ParseError::NoOpeningParen));
        assert_eq!(parse(""), Err(ParseError::NoOpeningParen));
    }

    #[test]
    fn test_extra_close() {
        assert!(matches!(
            parse("(A (B c) ))"),
            Err(ParseError::UnbalancedExtraClose { offset: 10 })
        ));
    }

    #[test]
    fn test_unclosed() {
        assert_eq!(
            parse("(A (B c)"),
            Err(ParseError::UnclosedAtEnd { depth: 1 })
        );
        assert_eq!(
            parse("(A (B (C d"),
            Err(ParseError::UnclosedAtEnd { depth: 3 })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ParseError::NoOpeningParen.to_string(), "no opening paren");
        assert_eq!(
            ParseError::UnclosedAtEnd { depth: 2 }.to_string(),
            "didn't close all parens, depth 2"
        );
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("(A (B c))"));
        assert!(!is_balanced("(A (B c)"));
        assert!(!is_balanced(")("));
        assert!(!is_balanced("no parens"));
    }
}
