//! Require-site extraction.
//!
//! Finds every textual `require` site in a source buffer: the parenthesized
//! form `require("name")`, the compact form `require "name"` / `require'name'`,
//! and the protected-call form `pcall(require, "name")`. Sites inside string
//! or comment spans are discarded.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::{line_col, ExcludedRanges};

/// Syntactic flavor of a require site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireKind {
    /// `require("name")`
    Standard,
    /// `require "name"` or `require"name"` (no parens)
    Compact,
    /// `pcall(require, "name")`
    Pcall,
}

/// One `require` occurrence in a source buffer.
#[derive(Debug, Clone)]
pub struct RequireSite {
    /// The import name between the quotes.
    pub module_name: String,
    /// Which pattern matched.
    pub kind: RequireKind,
    /// The full matched text, used as the rewrite range.
    pub raw_text: String,
    /// Byte offset of the match start.
    pub byte_offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column from the last newline.
    pub column: usize,
    /// The quote character used at the site (`'` or `"`).
    pub quote: char,
}

impl RequireSite {
    /// Byte offset one past the end of the matched text.
    pub fn byte_end(&self) -> usize {
        self.byte_offset + self.raw_text.len()
    }
}

// The regex crate has no backreferences, so each pattern spells out the two
// quote flavors as alternates.
static STANDARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#).unwrap()
});
// The optional `(` lets a compact match overlap an unclosed standard prefix;
// those are discarded below when the next non-space byte is `)`.
static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\b\s*\(?\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#).unwrap()
});
static PCALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bpcall\s*\(\s*require\s*,\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#).unwrap()
});

/// Extract every require site from `source`, masked by `excluded`.
///
/// Results are de-duplicated by byte range (the longer match wins) and
/// sorted by byte offset.
pub fn extract_requires(source: &str, excluded: &ExcludedRanges) -> Vec<RequireSite> {
    let mut candidates = Vec::new();
    collect(source, &PCALL_RE, RequireKind::Pcall, excluded, &mut candidates);
    collect(source, &STANDARD_RE, RequireKind::Standard, excluded, &mut candidates);
    collect(source, &COMPACT_RE, RequireKind::Compact, excluded, &mut candidates);

    // Longer raw text first at equal offsets, so overlap pruning keeps it.
    candidates.sort_by(|a, b| {
        a.byte_offset
            .cmp(&b.byte_offset)
            .then(b.raw_text.len().cmp(&a.raw_text.len()))
    });

    let mut sites: Vec<RequireSite> = Vec::new();
    for site in candidates {
        let overlaps = sites
            .last()
            .is_some_and(|kept| site.byte_offset < kept.byte_end());
        if !overlaps {
            sites.push(site);
        }
    }
    sites
}

fn collect(
    source: &str,
    re: &Regex,
    kind: RequireKind,
    excluded: &ExcludedRanges,
    out: &mut Vec<RequireSite>,
) {
    for caps in re.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        if excluded.contains(whole.start()) {
            continue;
        }
        if kind == RequireKind::Compact && followed_by_close_paren(source, whole.end()) {
            // Actually the inside of a standard form; skip to avoid
            // double-counting.
            continue;
        }
        let (module_name, quote) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (m.as_str().to_string(), '"'),
            (_, Some(m)) => (m.as_str().to_string(), '\''),
            _ => continue,
        };
        let (line, column) = line_col(source, whole.start());
        out.push(RequireSite {
            module_name,
            kind,
            raw_text: whole.as_str().to_string(),
            byte_offset: whole.start(),
            line,
            column,
            quote,
        });
    }
}

/// Whether the next non-space byte after `from` is `)`.
fn followed_by_close_paren(source: &str, from: usize) -> bool {
    source.as_bytes()[from..]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b')')
}
