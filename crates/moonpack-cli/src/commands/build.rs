//! `moonpack build` — run the bundler pipeline once and write the output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use moonpack_core::{
    build_dependency_graph, generate_bundle, lint_graph, load_config, LintResult,
};

use crate::output::StyledOutput;

pub fn execute(dir: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let written = run_build(dir, out)?;
    out.success_line(&format!("Bundle written to {}", written.display()));
    Ok(())
}

/// Full pipeline: config, graph, lint, emit, write. Returns the output path.
///
/// Shared with watch mode, which keeps running after failures.
pub fn run_build(dir: &Path, out: &mut StyledOutput) -> anyhow::Result<PathBuf> {
    let config = load_config(dir)?;
    let entry = config.entry_path(dir);
    let source_root = entry
        .parent()
        .ok_or_else(|| anyhow!("entry '{}' has no parent directory", config.entry))?
        .to_path_buf();

    let graph = build_dependency_graph(&entry, &source_root)?;
    let warnings = lint_graph(&graph);
    print_warnings(&warnings, out);

    let bundle = generate_bundle(&graph, &config);

    let out_dir = config.out_dir_path(dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let output_path = config.output_path(dir);
    fs::write(&output_path, bundle)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    out.info_line(&format!(
        "Bundled {} module(s) from {}",
        graph.order.len(),
        config.entry
    ));
    Ok(output_path)
}

fn print_warnings(warnings: &LintResult, out: &mut StyledOutput) {
    for dup in &warnings.duplicate_assignments {
        out.warning_line(&format!(
            "warning: '{}' is assigned in {} files:",
            dup.property_path,
            dup.occurrences.len()
        ));
        for occ in &dup.occurrences {
            out.plain_line(&format!("  {}:{}", occ.file_path.display(), occ.line));
        }
    }
    for event in &warnings.moonloader_events_in_modules {
        out.warning_line(&format!(
            "warning: MoonLoader event '{}' declared outside the entry at {}:{} (it will never fire)",
            event.event_name,
            event.file_path.display(),
            event.line
        ));
    }
    for unused in &warnings.unused_requires {
        out.warning_line(&format!(
            "warning: '{}' ({}) is required but never used at {}:{}",
            unused.var_name,
            unused.module_name,
            unused.file_path.display(),
            unused.line
        ));
    }
}
