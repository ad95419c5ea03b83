//! Lexical span scanner.
//!
//! Finds the byte ranges occupied by string literals and comments in a Lua
//! source buffer so that every later pattern match can be filtered by "not
//! inside an excluded range". This is deliberately not a parser: it only
//! needs to be right about where strings and comments start and end, and it
//! never fails on malformed source.
//!
//! Two passes:
//! 1. String literals: quoted forms (with naive backslash escapes) and
//!    long-bracket forms `[=*[ ... ]=*]`.
//! 2. Comments: `--` line comments and `--[=*[ ... ]=*]` long comments.
//!    Comment detection consults the string spans so that `--` inside a
//!    string never opens a comment.

/// Inclusive byte range `[start, end]` within one source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte of the span.
    pub start: usize,
    /// Last byte of the span (inclusive).
    pub end: usize,
}

impl Span {
    /// Whether `offset` falls inside this span.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// String and comment spans of one source buffer.
#[derive(Debug, Default)]
pub struct ExcludedRanges {
    strings: Vec<Span>,
    comments: Vec<Span>,
}

impl ExcludedRanges {
    /// Scan `source` and collect its string and comment spans.
    pub fn scan(source: &str) -> Self {
        let strings = scan_strings(source.as_bytes());
        let comments = scan_comments(source.as_bytes(), &strings);
        Self { strings, comments }
    }

    /// String literal spans, in buffer order.
    pub fn strings(&self) -> &[Span] {
        &self.strings
    }

    /// Comment spans, in buffer order.
    pub fn comments(&self) -> &[Span] {
        &self.comments
    }

    /// Whether `offset` lies inside any string or comment span.
    pub fn contains(&self, offset: usize) -> bool {
        span_at(&self.strings, offset).is_some() || span_at(&self.comments, offset).is_some()
    }
}

/// Binary search for the span containing `offset`. Spans are disjoint and
/// sorted by start within each set.
fn span_at(spans: &[Span], offset: usize) -> Option<Span> {
    let idx = spans.partition_point(|s| s.start <= offset);
    if idx == 0 {
        return None;
    }
    let candidate = spans[idx - 1];
    candidate.contains(offset).then_some(candidate)
}

/// Try to read a long-bracket opener `[=*[` at `pos`.
///
/// Returns the `=` count (the bracket level) when the opener is present.
fn long_bracket_level(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let mut level = 0;
    while bytes.get(pos + 1 + level) == Some(&b'=') {
        level += 1;
    }
    (bytes.get(pos + 1 + level) == Some(&b'[')).then_some(level)
}

/// Find the closing `]=*]` of a level-`level` long bracket, searching from
/// `from`. Returns the byte offset of the closing `]` (the last byte of the
/// closing sequence).
fn find_long_bracket_close(bytes: &[u8], from: usize, level: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b']' {
            let mut eq = 0;
            while bytes.get(i + 1 + eq) == Some(&b'=') {
                eq += 1;
            }
            if eq == level && bytes.get(i + 1 + eq) == Some(&b']') {
                return Some(i + 1 + eq);
            }
        }
        i += 1;
    }
    None
}

fn scan_strings(bytes: &[u8]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        // Naive escape: the next byte is absorbed whatever it is.
                        Some(b'\\') => i += 2,
                        Some(&b) if b == quote => {
                            spans.push(Span { start, end: i });
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                        None => {
                            // Unterminated: close at end of buffer.
                            spans.push(Span {
                                start,
                                end: bytes.len() - 1,
                            });
                            break;
                        }
                    }
                }
            }
            b'[' => match long_bracket_level(bytes, i) {
                Some(level) => {
                    let body = i + 2 + level;
                    match find_long_bracket_close(bytes, body, level) {
                        Some(end) => {
                            spans.push(Span { start: i, end });
                            i = end + 1;
                        }
                        // No closer anywhere: not a long bracket after all.
                        None => i += 1,
                    }
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    spans
}

fn scan_comments(bytes: &[u8], strings: &[Span]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if let Some(span) = span_at(strings, i) {
            i = span.end + 1;
            continue;
        }
        if bytes[i] != b'-' || bytes[i + 1] != b'-' {
            i += 1;
            continue;
        }
        let start = i;
        let end = match long_bracket_level(bytes, i + 2) {
            Some(level) => {
                let body = i + 4 + level;
                // Unterminated long comment runs to end of buffer.
                find_long_bracket_close(bytes, body, level).unwrap_or(bytes.len() - 1)
            }
            None => match bytes[i + 2..].iter().position(|&b| b == b'\n') {
                // Up to the byte before the newline; `--\n` covers just `--`.
                Some(nl) => i + 2 + nl - 1,
                None => bytes.len() - 1,
            },
        };
        spans.push(Span { start, end });
        i = end + 1;
    }
    spans
}

/// 1-based line and column of a byte offset.
///
/// Lines are counted by `\n`; the column restarts after the last newline.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let prefix = &source.as_bytes()[..offset.min(source.len())];
    let line = 1 + prefix.iter().filter(|&&b| b == b'\n').count();
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };
    (line, column)
}
