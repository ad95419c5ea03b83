//! Unused imports.
//!
//! A `local var = require(...)` whose variable is never read afterwards
//! still executes the module (or external library) for its side effects,
//! which is occasionally intentional but usually a leftover.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::graph::DependencyGraph;
use crate::scanner::{line_col, ExcludedRanges};

use super::require_bindings;

/// An import bound to a variable that is never used.
#[derive(Debug, Clone)]
pub struct UnusedRequire {
    /// The bound variable.
    pub var_name: String,
    /// The import name between the quotes.
    pub module_name: String,
    /// File containing the binding.
    pub file_path: PathBuf,
    /// 1-based line of the binding.
    pub line: usize,
}

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());

pub(crate) fn check(graph: &DependencyGraph) -> Vec<UnusedRequire> {
    let mut findings = Vec::new();
    for module_id in &graph.order {
        let module = &graph.modules[module_id];
        let excluded = ExcludedRanges::scan(&module.source);

        for binding in require_bindings(&module.source, &excluded, &module.absolute_path) {
            if !binding.is_local {
                continue;
            }
            if !is_used(&module.source, &excluded, &binding.var_name, binding.line) {
                findings.push(UnusedRequire {
                    var_name: binding.var_name,
                    module_name: binding.module_name,
                    file_path: binding.file_path,
                    line: binding.line,
                });
            }
        }
    }
    findings
}

/// Whether `var` appears in any non-excluded region outside its own
/// declaration line.
fn is_used(source: &str, excluded: &ExcludedRanges, var: &str, declaration_line: usize) -> bool {
    IDENT_RE.find_iter(source).any(|m| {
        m.as_str() == var
            && !excluded.contains(m.start())
            && line_col(source, m.start()).0 != declaration_line
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_dependency_graph;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, contents: &str) {
        fs::write(dir.path().join(rel), contents).unwrap();
    }

    fn lint(dir: &TempDir) -> Vec<UnusedRequire> {
        let graph = build_dependency_graph(&dir.path().join("main.lua"), dir.path()).unwrap();
        check(&graph)
    }

    #[test]
    fn unused_import_is_flagged() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "local inspect = require('inspect')\nprint('hi')\n");

        let findings = lint(&dir);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].var_name, "inspect");
        assert_eq!(findings[0].module_name, "inspect");
        assert_eq!(findings[0].line, 1);
    }

    #[test]
    fn used_import_is_not_flagged() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.lua",
            "local inspect = require('inspect')\nprint(inspect({}))\n",
        );

        assert!(lint(&dir).is_empty());
    }

    #[test]
    fn use_inside_string_does_not_count() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.lua",
            "local inspect = require('inspect')\nprint('inspect is great')\n",
        );

        // The only later occurrence is inside a string literal.
        assert_eq!(lint(&dir).len(), 1);
    }

    #[test]
    fn use_inside_comment_does_not_count() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.lua",
            "local inspect = require('inspect')\n-- inspect gets used later, honest\n",
        );

        assert_eq!(lint(&dir).len(), 1);
    }

    #[test]
    fn global_binding_is_not_checked() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "inspect = require('inspect')\n");

        assert!(lint(&dir).is_empty());
    }

    #[test]
    fn property_use_counts_as_use() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.lua",
            "local sampev = require('lib.samp.events')\nfunction sampev.onServerMessage(c, t)\nend\n",
        );

        assert!(lint(&dir).is_empty());
    }
}
