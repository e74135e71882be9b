//! Stream segmentation
//!
//! Splits a stream of lines into complete bracketed records. A record may
//! span several lines; it ends on the first non-blank line that brings the
//! running paren balance back to zero. Blank lines are dropped, even inside
//! an open record.

use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use memchr::memchr2_iter;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::ops::AddAssign;
use std::path::Path;
use tracing::debug;

/// One raw bracketed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Lines of the record joined with `\n`
    pub text: String,
    /// 1-based line on which the record starts
    pub line_num: usize,
}

impl Record {
    /// The record on a single line with whitespace runs collapsed
    pub fn collapsed(&self) -> String {
        collapse_whitespace(&self.text)
    }
}

/// Replace every run of whitespace with one space and trim both ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_ascii_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Input decoding counters
///
/// `lossy_lines` counts lines that were not valid UTF-8 and had bytes
/// replaced during decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TextStats {
    pub lines: usize,
    pub lossy_lines: usize,
}

impl AddAssign for TextStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.lossy_lines += other.lossy_lines;
    }
}

/// Running balance and buffer shared by both front ends
#[derive(Debug, Default)]
struct Accumulator {
    buf: String,
    balance: isize,
    start_line: usize,
}

impl Accumulator {
    fn push(&mut self, line: &str, line_num: usize) -> Option<Record> {
        if line.trim().is_empty() {
            return None;
        }
        if self.buf.is_empty() {
            self.start_line = line_num;
        } else {
            self.buf.push('\n');
        }
        self.buf.push_str(line);
        self.balance += paren_delta(line);

        if self.balance == 0 {
            Some(self.take())
        } else {
            None
        }
    }

    fn finish(&mut self) -> Option<Record> {
        if self.buf.is_empty() {
            return None;
        }
        debug!(
            line = self.start_line,
            balance = self.balance,
            "flushing unbalanced trailing record"
        );
        Some(self.take())
    }

    fn take(&mut self) -> Record {
        self.balance = 0;
        Record {
            text: std::mem::take(&mut self.buf),
            line_num: self.start_line,
        }
    }
}

fn paren_delta(line: &str) -> isize {
    let bytes = line.as_bytes();
    memchr2_iter(b'(', b')', bytes)
        .map(|i| if bytes[i] == b'(' { 1 } else { -1 })
        .sum()
}

/// Record iterator over already-decoded lines
///
/// Lines are expected without terminators, as produced by [`str::lines`].
///
/// ```
/// use parsetools::Segmenter;
///
/// let text = "(S (N a)\n   (V b))\n\n(S (N c))\n";
/// let records: Vec<_> = Segmenter::new(text.lines()).map(|r| r.text).collect();
/// assert_eq!(records, vec!["(S (N a)\n   (V b))", "(S (N c))"]);
/// ```
#[derive(Debug)]
pub struct Segmenter<I> {
    lines: I,
    line_num: usize,
    acc: Accumulator,
}

impl<I> Segmenter<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_num: 0,
            acc: Accumulator::default(),
        }
    }
}

impl<I, S> Iterator for Segmenter<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for line in self.lines.by_ref() {
            self.line_num += 1;
            if let Some(record) = self.acc.push(line.as_ref(), self.line_num) {
                return Some(record);
            }
        }
        self.acc.finish()
    }
}

/// Record iterator over a byte stream
///
/// Lines are decoded as UTF-8, replacing invalid sequences; the number of
/// such lines is available from [`RecordReader::stats`]. An I/O error is
/// yielded once and ends the iteration.
pub struct RecordReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_num: usize,
    stats: TextStats,
    acc: Accumulator,
    done: bool,
}

impl RecordReader<Box<dyn BufRead + Send>> {
    /// Create a reader from a file path
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead + Send> =
            if path.extension().is_some_and(|ext| ext == "gz") {
                Box::new(BufReader::new(MultiGzDecoder::new(file)))
            } else {
                Box::new(BufReader::new(file))
            };
        Ok(Self::new(reader))
    }
}

impl RecordReader<Cursor<Vec<u8>>> {
    /// Create a reader from an in-memory string
    pub fn from_string(text: &str) -> Self {
        Self::new(Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_num: 0,
            stats: TextStats::default(),
            acc: Accumulator::default(),
            done: false,
        }
    }

    /// Decoding counters for the lines read so far
    pub fn stats(&self) -> TextStats {
        self.stats
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let line = self.buf.trim_end_with(|c| c == '\n' || c == '\r');
        self.stats.lines += 1;
        let text = match line.to_str_lossy() {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => {
                self.stats.lossy_lines += 1;
                s
            }
        };
        Ok(Some(text))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.read_line() {
                Ok(Some(line)) => {
                    self.line_num += 1;
                    if let Some(record) = self.acc.push(&line, self.line_num) {
                        return Some(Ok(record));
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return self.acc.finish().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<I: Iterator<Item = Record>>(records: I) -> Vec<String> {
        records.map(|r| r.text).collect()
    }

    #[test]
    fn test_blank_line_separates_records() {
        let input = "(S (N a) (V b))\n\n(S (N c) (V d))\n";
        let records: Vec<_> = Segmenter::new(input.lines()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "(S (N a) (V b))");
        assert_eq!(records[1].text, "(S (N c) (V d))");
        assert_eq!(records[1].line_num, 3);
    }

    #[test]
    fn test_multiline_record() {
        let input = "(ROOT\n  (S (NP (N dogs))\n     (VP (V bark))))\n(X y)";

        assert_eq!(
            texts(Segmenter::new(input.lines())),
            vec![
                "(ROOT\n  (S (NP (N dogs))\n     (VP (V bark))))".to_string(),
                "(X y)".to_string()
            ]
        );
    }

    #[test]
    fn test_adjacent_records_without_blank_line() {
        let input = ["(A b)", "(C d)"];

        assert_eq!(texts(Segmenter::new(input.iter())), vec!["(A b)", "(C d)"]);
    }

    #[test]
    fn test_blank_line_inside_open_record_dropped() {
        let input = "(S (N a)\n\n   \n (V b))";
        let records: Vec<_> = Segmenter::new(input.lines()).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "(S (N a)\n (V b))");
        assert_eq!(records[0].line_num, 1);
    }

    #[test]
    fn test_unclosed_trailing_record_flushed() {
        let input = "(A b)\n(C (D e)\n";

        assert_eq!(
            texts(Segmenter::new(input.lines())),
            vec!["(A b)", "(C (D e)"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Segmenter::new("\n\n  \n".lines()).count(), 0);
    }

    #[test]
    fn test_reader_handles_crlf() {
        let reader = RecordReader::from_string("(A b)\r\n\r\n(C\r\n d)\r\n");
        let records: Vec<_> = reader.map(Result::unwrap).collect();

        assert_eq!(texts(records.into_iter()), vec!["(A b)", "(C\n d)"]);
    }

    #[test]
    fn test_reader_counts_lossy_lines() {
        let bytes = b"(A caf\xe9)\n(B ok)\n".to_vec();
        let mut reader = RecordReader::new(Cursor::new(bytes));
        let first = reader.next().unwrap().unwrap();
        let second = reader.next().unwrap().unwrap();

        assert_eq!(first.text, "(A caf\u{FFFD})");
        assert_eq!(second.text, "(B ok)");
        assert!(reader.next().is_none());
        assert_eq!(
            reader.stats(),
            TextStats {
                lines: 2,
                lossy_lines: 1
            }
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  (S\n\t(N a)   (V b))\n"), "(S (N a) (V b))");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_record_collapsed() {
        let record = Segmenter::new("(S\n  (N a))".lines()).next().unwrap();

        assert_eq!(record.collapsed(), "(S (N a))");
    }
}
