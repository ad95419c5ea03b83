//! Cross-file duplicate assignments to external tables.
//!
//! Two modules both writing `function sampev.onServerMessage(...)` register
//! competing handlers on the same host-provided table; whichever module the
//! loader runs last silently wins. This check aliases each external import
//! to its bound variable, then collects every assignment through that
//! variable's dotted properties and reports property paths written from more
//! than one file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::Regex;

use crate::graph::DependencyGraph;
use crate::resolver::Resolver;
use crate::scanner::{line_col, ExcludedRanges};

use super::require_bindings;

/// One assignment (or function declaration) targeting an external table
/// property.
#[derive(Debug, Clone)]
pub struct ExternalAssignment {
    /// Variable the external import is bound to.
    pub var_name: String,
    /// Full dotted path written, e.g. `sampev.onServerMessage`.
    pub property_path: String,
    /// The external import name the variable aliases.
    pub module_name: String,
    /// File containing the assignment.
    pub file_path: PathBuf,
    /// 1-based line of the assignment.
    pub line: usize,
}

/// A property path assigned in more than one file.
#[derive(Debug, Clone)]
pub struct DuplicateAssignment {
    /// The contested dotted path.
    pub property_path: String,
    /// Every occurrence, across all files.
    pub occurrences: Vec<ExternalAssignment>,
}

pub(crate) fn check(graph: &DependencyGraph) -> Vec<DuplicateAssignment> {
    let mut by_path: BTreeMap<String, Vec<ExternalAssignment>> = BTreeMap::new();

    for module_id in &graph.order {
        let module = &graph.modules[module_id];
        let excluded = ExcludedRanges::scan(&module.source);

        for binding in require_bindings(&module.source, &excluded, &module.absolute_path) {
            if Resolver::is_local(&binding.module_name) {
                continue;
            }
            for assignment in property_assignments(&module.source, &excluded, &binding) {
                by_path
                    .entry(assignment.property_path.clone())
                    .or_default()
                    .push(assignment);
            }
        }
    }

    by_path
        .into_iter()
        .filter(|(_, occurrences)| {
            let mut files: Vec<&PathBuf> = occurrences.iter().map(|o| &o.file_path).collect();
            files.sort();
            files.dedup();
            files.len() > 1
        })
        .map(|(property_path, occurrences)| DuplicateAssignment {
            property_path,
            occurrences,
        })
        .collect()
}

/// Find every `var.prop... =` assignment and `function var.prop...(`
/// declaration for one bound variable.
fn property_assignments(
    source: &str,
    excluded: &ExcludedRanges,
    binding: &super::RequireBinding,
) -> Vec<ExternalAssignment> {
    let var = regex::escape(&binding.var_name);
    let assign_re =
        Regex::new(&format!(r"\b{var}((?:\.[A-Za-z_][A-Za-z0-9_]*)+)\s*=(?:[^=]|\z)")).unwrap();
    let func_re =
        Regex::new(&format!(r"\bfunction\s+{var}((?:\.[A-Za-z_][A-Za-z0-9_]*)+)\s*\(")).unwrap();

    let mut out = Vec::new();
    for re in [&assign_re, &func_re] {
        for caps in re.captures_iter(source) {
            let whole = caps.get(0).unwrap();
            if excluded.contains(whole.start()) {
                continue;
            }
            let (line, _) = line_col(source, whole.start());
            out.push(ExternalAssignment {
                var_name: binding.var_name.clone(),
                property_path: format!("{}{}", binding.var_name, &caps[1]),
                module_name: binding.module_name.clone(),
                file_path: binding.file_path.clone(),
                line,
            });
        }
    }
    out.sort_by_key(|a| a.line);
    out
}
