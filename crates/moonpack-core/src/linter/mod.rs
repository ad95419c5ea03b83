//! Static lint analysis over a built module graph.
//!
//! Three checks, all advisory — lint findings are warnings carried in
//! [`LintResult`], never build failures:
//!
//! - duplicate assignments to the same external-table property across files
//!   (`duplicates`), which silently overwrite each other at runtime,
//! - MoonLoader event handlers declared in non-entry modules (`events`),
//!   where the host will never call them,
//! - imports that are never used (`unused`).

mod duplicates;
mod events;
mod unused;

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::graph::DependencyGraph;
use crate::scanner::{line_col, ExcludedRanges};

pub use duplicates::{DuplicateAssignment, ExternalAssignment};
pub use events::{MoonLoaderEventInModule, MOON_LOADER_EVENTS};
pub use unused::UnusedRequire;

/// All warnings produced by one lint pass.
#[derive(Debug, Default)]
pub struct LintResult {
    /// External-table properties assigned in more than one file.
    pub duplicate_assignments: Vec<DuplicateAssignment>,
    /// MoonLoader event handlers found outside the entry.
    pub moonloader_events_in_modules: Vec<MoonLoaderEventInModule>,
    /// Imports bound to a variable that is never read.
    pub unused_requires: Vec<UnusedRequire>,
}

impl LintResult {
    /// Whether the pass produced no warnings at all.
    pub fn is_empty(&self) -> bool {
        self.duplicate_assignments.is_empty()
            && self.moonloader_events_in_modules.is_empty()
            && self.unused_requires.is_empty()
    }

    /// Total number of warnings.
    pub fn warning_count(&self) -> usize {
        self.duplicate_assignments.len()
            + self.moonloader_events_in_modules.len()
            + self.unused_requires.len()
    }
}

/// Run every check over the graph.
///
/// Modules are visited in topological order, so output ordering is stable
/// for a fixed input tree.
pub fn lint_graph(graph: &DependencyGraph) -> LintResult {
    LintResult {
        duplicate_assignments: duplicates::check(graph),
        moonloader_events_in_modules: events::check(graph),
        unused_requires: unused::check(graph),
    }
}

/// A `<var> = require(<str>)` binding in one module's source.
#[derive(Debug, Clone)]
pub(crate) struct RequireBinding {
    /// Bound variable name.
    pub var_name: String,
    /// Import name between the quotes.
    pub module_name: String,
    /// Whether the binding is declared `local`.
    pub is_local: bool,
    /// File the binding lives in.
    pub file_path: PathBuf,
    /// 1-based line of the binding.
    pub line: usize,
}

static BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(local\s+)?\b([A-Za-z_][A-Za-z0-9_]*)\s*=\s*require\b\s*\(?\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#,
    )
    .unwrap()
});

/// Extract every require binding from one module's source.
pub(crate) fn require_bindings(
    source: &str,
    excluded: &ExcludedRanges,
    file_path: &std::path::Path,
) -> Vec<RequireBinding> {
    let mut bindings = Vec::new();
    for caps in BINDING_RE.captures_iter(source) {
        let whole = caps.get(0).unwrap();
        if excluded.contains(whole.start()) {
            continue;
        }
        let module_name = match (caps.get(3), caps.get(4)) {
            (Some(m), _) => m.as_str().to_string(),
            (_, Some(m)) => m.as_str().to_string(),
            _ => continue,
        };
        let (line, _) = line_col(source, whole.start());
        bindings.push(RequireBinding {
            var_name: caps[2].to_string(),
            module_name,
            is_local: caps.get(1).is_some(),
            file_path: file_path.to_path_buf(),
            line,
        });
    }
    bindings
}
