//! MoonLoader event handlers in non-entry modules.
//!
//! MoonLoader only invokes its event callbacks on the entry script's global
//! scope. A `function main()` (or any other host event) declared inside a
//! bundled module ends up localized into a thunk where the host never sees
//! it, so such declarations are almost certainly a mistake.

use std::path::PathBuf;

use crate::graph::DependencyGraph;
use crate::localize::function_declarations;
use crate::scanner::ExcludedRanges;

/// Callback names MoonLoader invokes on the entry script.
pub const MOON_LOADER_EVENTS: &[&str] = &[
    "main",
    "onExitScript",
    "onQuitGame",
    "onScriptLoad",
    "onScriptTerminate",
    "onSystemInitialized",
    "onScriptMessage",
    "onSystemMessage",
    "onReceivePacket",
    "onReceiveRpc",
    "onSendPacket",
    "onSendRpc",
    "onWindowMessage",
    "onStartNewGame",
    "onLoadGame",
    "onSaveGame",
];

/// A host event handler declared outside the entry.
#[derive(Debug, Clone)]
pub struct MoonLoaderEventInModule {
    /// The event callback name.
    pub event_name: String,
    /// File the handler was declared in.
    pub file_path: PathBuf,
    /// 1-based line of the declaration.
    pub line: usize,
}

pub(crate) fn check(graph: &DependencyGraph) -> Vec<MoonLoaderEventInModule> {
    let mut findings = Vec::new();
    for module_id in &graph.order {
        if *module_id == graph.entry {
            continue;
        }
        let module = &graph.modules[module_id];
        let excluded = ExcludedRanges::scan(&module.source);
        for decl in function_declarations(&module.source, &excluded) {
            if MOON_LOADER_EVENTS.contains(&decl.name.as_str()) {
                findings.push(MoonLoaderEventInModule {
                    event_name: decl.name,
                    file_path: module.absolute_path.clone(),
                    line: decl.line,
                });
            }
        }
    }
    findings
}
