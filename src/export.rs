//! Sentence objects for JSON output
//!
//! A record becomes `{"tokens": [...], "parse": "..."}` when it parses, or
//! `{"text": "...", "sexpr_parse_failed": true}` when it does not.

use serde::Serialize;
use tracing::warn;

use crate::parser::parse;
use crate::segmenter::collapse_whitespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Sentence {
    Parsed {
        tokens: Vec<String>,
        parse: String,
    },
    Failed {
        text: String,
        sexpr_parse_failed: bool,
    },
}

impl Sentence {
    /// Build a sentence from a raw record
    ///
    /// The record is collapsed to one line first. An empty record gives an
    /// empty token list rather than a failure.
    pub fn from_record(raw: &str) -> Self {
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return Sentence::Parsed {
                tokens: Vec::new(),
                parse: collapsed,
            };
        }
        match parse(&collapsed) {
            Ok(tree) => Sentence::Parsed {
                tokens: tree
                    .terminals(tree.root())
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                parse: collapsed,
            },
            Err(e) => {
                warn!(error = %e, text = %collapsed, "could not parse record");
                Sentence::Failed {
                    text: collapsed,
                    sexpr_parse_failed: true,
                }
            }
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Sentence::Parsed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_sentence() {
        let sentence = Sentence::from_record("(ROOT (S (N bob)\n   (VP (V runs))))\n");

        assert_eq!(
            sentence,
            Sentence::Parsed {
                tokens: vec!["bob".to_string(), "runs".to_string()],
                parse: "(ROOT (S (N bob) (VP (V runs))))".to_string(),
            }
        );
        assert_eq!(
            serde_json::to_string(&sentence).unwrap(),
            r#"{"tokens":["bob","runs"],"parse":"(ROOT (S (N bob) (VP (V runs))))"}"#
        );
    }

    #[test]
    fn test_failed_sentence() {
        let sentence = Sentence::from_record("(S (N bob)");

        assert!(!sentence.is_parsed());
        assert_eq!(
            serde_json::to_string(&sentence).unwrap(),
            r#"{"text":"(S (N bob)","sexpr_parse_failed":true}"#
        );
    }

    #[test]
    fn test_empty_record() {
        let sentence = Sentence::from_record("  \n ");

        assert_eq!(
            serde_json::to_string(&sentence).unwrap(),
            r#"{"tokens":[],"parse":""}"#
        );
    }
}
