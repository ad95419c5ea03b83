//! `moonpack watch` — rebuild on filesystem changes.
//!
//! Watches the source root and the config files, queues events over an
//! mpsc channel, and debounces by draining the channel during a quiet
//! window before each rebuild. Build failures are printed and watching
//! continues; the next change gets a fresh run.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use notify::{recommended_watcher, Event, EventKind, RecursiveMode, Watcher};

use moonpack_core::load_config;

use crate::commands::build;
use crate::output::StyledOutput;

pub fn execute(dir: &Path, debounce_ms: u64, out: &mut StyledOutput) -> anyhow::Result<()> {
    // Resolve paths up front so a broken config fails immediately.
    let config = load_config(dir)?;
    let entry = config.entry_path(dir);
    let source_root = entry
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    let out_dir = config.out_dir_path(dir);

    rebuild(dir, out);

    let (tx, rx) = mpsc::channel();
    let mut watcher = recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    watcher
        .watch(&source_root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", source_root.display()))?;
    // Config lives in the project dir; watch it non-recursively so output
    // writes under out_dir do not feed back into the loop.
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;

    out.info_line(&format!(
        "Watching {} (ctrl-c to stop)",
        source_root.display()
    ));

    let debounce = Duration::from_millis(debounce_ms.max(1));
    loop {
        let event = match rx.recv() {
            Ok(Ok(event)) => event,
            Ok(Err(err)) => {
                out.error_line(&format!("watch error: {err}"));
                continue;
            }
            Err(_) => break,
        };
        if !is_relevant(&event, &out_dir) {
            continue;
        }

        // Editors fire bursts of events per save; wait for a quiet window.
        while rx.recv_timeout(debounce).is_ok() {}

        rebuild(dir, out);
    }
    Ok(())
}

fn rebuild(dir: &Path, out: &mut StyledOutput) {
    match build::run_build(dir, out) {
        Ok(path) => out.success_line(&format!("Bundle written to {}", path.display())),
        Err(err) => out.error_line(&format!("build failed: {err:#}")),
    }
}

/// Whether an event should trigger a rebuild.
///
/// Only content-affecting events count, and paths under the output
/// directory are ignored so our own writes never retrigger a build.
fn is_relevant(event: &Event, out_dir: &Path) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event.paths.iter().any(|p| !p.starts_with(out_dir))
}
