//! `moonpack init` — scaffold a new project.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde_json::json;

use moonpack_core::CONFIG_FILE;

use crate::output::StyledOutput;

const ENTRY_TEMPLATE: &str = "function main()
    while true do
        wait(0)
    end
end
";

pub fn execute(path: &Path, name: Option<String>, out: &mut StyledOutput) -> anyhow::Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{} already exists in {}", CONFIG_FILE, path.display());
    }

    let name = match name {
        Some(name) => name,
        None => path
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "my-script".to_string()),
    };

    let config = json!({
        "name": name,
        "version": "0.1.0",
        "entry": "src/main.lua",
        "outDir": "dist",
    });
    fs::write(
        &config_path,
        format!("{}\n", serde_json::to_string_pretty(&config)?),
    )
    .with_context(|| format!("failed to write {}", config_path.display()))?;

    let src_dir = path.join("src");
    fs::create_dir_all(&src_dir)?;
    let entry_path = src_dir.join("main.lua");
    if !entry_path.exists() {
        fs::write(&entry_path, ENTRY_TEMPLATE)
            .with_context(|| format!("failed to write {}", entry_path.display()))?;
    }

    out.success_line(&format!("Created project '{}' in {}", name, path.display()));
    out.plain_line("  moonpack.json");
    out.plain_line("  src/main.lua");
    out.info_line("Run `moonpack build` to bundle it.");
    Ok(())
}
