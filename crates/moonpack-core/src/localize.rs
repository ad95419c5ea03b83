//! Auto-localization of module function declarations.
//!
//! Inside a bundled module thunk, a plain `function name(...)` would leak
//! into the host's global table and collide across modules. This pass
//! prefixes `local` to every non-dotted declaration so the function stays
//! private to its thunk. Entry sources are never localized: host callbacks
//! like `main` must remain global there.

use std::sync::LazyLock;

use regex::Regex;

use crate::edit::{apply_edits, SourceEdit};
use crate::scanner::{line_col, ExcludedRanges};

/// A plain (non-dotted, non-local) `function name(...)` declaration.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// The declared name.
    pub name: String,
    /// Byte offset of the `function` keyword.
    pub byte_offset: usize,
    /// 1-based line of the declaration.
    pub line: usize,
}

// Dotted (`a.b`) and colon (`a:b`) declarations fail the `\s*\(` tail and
// are therefore never captured.
static FUNCTION_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Find every plain function declaration outside excluded ranges that is not
/// already preceded by `local`.
pub fn function_declarations(source: &str, excluded: &ExcludedRanges) -> Vec<FunctionDecl> {
    let mut decls = Vec::new();
    for caps in FUNCTION_DECL_RE.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        if excluded.contains(whole.start()) {
            continue;
        }
        if preceded_by_local(source, whole.start()) {
            continue;
        }
        let (line, _) = line_col(source, whole.start());
        decls.push(FunctionDecl {
            name: caps[1].to_string(),
            byte_offset: whole.start(),
            line,
        });
    }
    decls
}

/// Whether the text before `offset` ends with the token `local`.
fn preceded_by_local(source: &str, offset: usize) -> bool {
    let before = source[..offset].trim_end();
    before.ends_with("local")
        && !before[..before.len() - "local".len()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Prefix `local` to every plain top-level function declaration.
///
/// Idempotent: declarations that already carry `local` are left alone.
pub fn localize_functions(source: &str, excluded: &ExcludedRanges) -> String {
    let edits = function_declarations(source, excluded)
        .into_iter()
        .map(|decl| SourceEdit::insert(decl.byte_offset, "local "))
        .collect();
    apply_edits(source, edits)
}
