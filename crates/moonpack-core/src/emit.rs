//! Bundle emission.
//!
//! Produces the final script: a header with the project metadata, the
//! runtime loader shim, one deferred thunk per bundled module in dependency
//! order, then the rewritten entry source. Module-level code therefore runs
//! at most once, on the first `__load` of its id, and external requires
//! fall through to the host runtime untouched.

use std::collections::HashMap;

use crate::config::{Author, Config};
use crate::graph::DependencyGraph;
use crate::localize::localize_functions;
use crate::rewrite::rewrite_requires;
use crate::scanner::ExcludedRanges;

/// The loader shim every bundle carries.
const RUNTIME_SHIM: &str = "local __modules = {}
local __loaded = {}

local function __load(name)
    if __loaded[name] then return __loaded[name] end
    if __modules[name] then
        __loaded[name] = __modules[name]()
        return __loaded[name]
    end
    return require(name)
end";

/// Generate the complete bundle text for a built graph.
pub fn generate_bundle(graph: &DependencyGraph, config: &Config) -> String {
    let mut blocks = Vec::new();
    blocks.push(header_block(config));
    blocks.push(metadata_block(config));
    blocks.push(RUNTIME_SHIM.to_string());

    for module_id in &graph.order {
        if *module_id == graph.entry {
            continue;
        }
        let module = &graph.modules[module_id];
        blocks.push(module_thunk(
            module_id,
            &module.source,
            &module.require_mappings,
        ));
    }

    let entry = graph.entry_node();
    let entry_excluded = ExcludedRanges::scan(&entry.source);
    let entry_body = rewrite_requires(&entry.source, &entry_excluded, &entry.require_mappings);
    blocks.push(entry_body.trim_end_matches('\n').to_string());

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn header_block(config: &Config) -> String {
    let title = match &config.version {
        Some(version) => format!("-- {} v{}", config.name, version),
        None => format!("-- {}", config.name),
    };
    format!("{title}\n-- Bundled with moonpack. Do not edit; edit the sources instead.")
}

/// `script_*` metadata calls MoonLoader reads at load time.
fn metadata_block(config: &Config) -> String {
    let mut lines = vec![format!("script_name({})", quote(&config.name))];
    if let Some(author) = &config.author {
        lines.push(author_call(author));
    }
    if let Some(version) = &config.version {
        lines.push(format!("script_version({})", quote(version)));
    }
    if let Some(description) = &config.description {
        lines.push(format!("script_description({})", quote(description)));
    }
    if let Some(url) = &config.url {
        lines.push(format!("script_url({})", quote(url)));
    }
    lines.join("\n")
}

fn author_call(author: &Author) -> String {
    match author {
        Author::Single(name) => format!("script_author({})", quote(name)),
        Author::Many(names) => {
            let quoted: Vec<String> = names.iter().map(|n| quote(n)).collect();
            format!("script_authors({})", quoted.join(", "))
        }
    }
}

/// Single-quote a metadata value with backslash escapes.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Wrap one module as a deferred thunk registered under its id.
fn module_thunk(module_id: &str, source: &str, mappings: &HashMap<String, String>) -> String {
    let localized = localize_functions(source, &ExcludedRanges::scan(source));
    let rewritten = rewrite_requires(&localized, &ExcludedRanges::scan(&localized), mappings);
    let body = indent(rewritten.trim_end_matches('\n'));
    format!("__modules[\"{module_id}\"] = function()\n{body}\nend")
}

/// Indent every non-empty line by four spaces.
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_dependency_graph;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, contents: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
    }

    fn config(name: &str) -> Config {
        Config {
            name: name.to_string(),
            version: Some("1.2.0".to_string()),
            author: Some(Author::Single("ana".to_string())),
            description: None,
            url: None,
            entry: "main.lua".to_string(),
            out_dir: "dist".to_string(),
        }
    }

    fn bundle(dir: &TempDir) -> String {
        let graph = build_dependency_graph(&dir.path().join("main.lua"), dir.path()).unwrap();
        generate_bundle(&graph, &config("demo"))
    }

    #[test]
    fn header_and_metadata_come_first() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "print('hi')\n");

        let out = bundle(&dir);
        assert!(out.starts_with("-- demo v1.2.0\n"));
        assert!(out.contains("script_name('demo')"));
        assert!(out.contains("script_author('ana')"));
        assert!(out.contains("script_version('1.2.0')"));
    }

    #[test]
    fn shim_is_present_verbatim() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "print('hi')\n");

        let out = bundle(&dir);
        assert!(out.contains("local __modules = {}\nlocal __loaded = {}"));
        assert!(out.contains("local function __load(name)"));
        assert!(out.contains("return require(name)"));
    }

    #[test]
    fn modules_are_wrapped_and_entry_is_not() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "local u = require('./u')\nfunction main()\nend\n");
        write(&dir, "u.lua", "return {}\n");

        let out = bundle(&dir);
        assert!(out.contains("__modules[\"u\"] = function()\n    return {}\nend"));
        assert!(out.contains("local u = __load('u')"));
        // Entry functions stay global and unwrapped.
        assert!(out.contains("\nfunction main()\nend\n"));
        assert_eq!(out.matches("__modules[\"").count(), 1);
    }

    #[test]
    fn module_functions_are_localized_in_thunks() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "require('./helper')\n");
        write(&dir, "helper.lua", "function helper()\nend\n");

        let out = bundle(&dir);
        assert!(out.contains("    local function helper()"));
    }

    #[test]
    fn external_requires_pass_through() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.lua",
            "local x = require('samp.events')\nlocal y = require('./u')\n",
        );
        write(&dir, "u.lua", "return {}\n");

        let out = bundle(&dir);
        assert!(out.contains("require('samp.events')"));
        assert!(out.contains("__load('u')"));
    }

    #[test]
    fn modules_emit_in_dependency_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "require('./a')\n");
        write(&dir, "a.lua", "require('./b')\nreturn {}\n");
        write(&dir, "b.lua", "return {}\n");

        let out = bundle(&dir);
        let b_pos = out.find("__modules[\"b\"]").unwrap();
        let a_pos = out.find("__modules[\"a\"]").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn empty_lines_in_modules_stay_unindented() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "require('./u')\n");
        write(&dir, "u.lua", "local a = 1\n\nreturn a\n");

        let out = bundle(&dir);
        assert!(out.contains("    local a = 1\n\n    return a"));
    }

    #[test]
    fn metadata_values_are_escaped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "print('hi')\n");
        let graph = build_dependency_graph(&dir.path().join("main.lua"), dir.path()).unwrap();

        let mut cfg = config("it's\\here");
        cfg.description = Some("line one\nline two".to_string());
        let out = generate_bundle(&graph, &cfg);
        assert!(out.contains(r"script_name('it\'s\\here')"));
        assert!(out.contains(r"script_description('line one\nline two')"));
    }

    #[test]
    fn author_list_uses_plural_call() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "print('hi')\n");
        let graph = build_dependency_graph(&dir.path().join("main.lua"), dir.path()).unwrap();

        let mut cfg = config("demo");
        cfg.author = Some(Author::Many(vec!["ana".to_string(), "bo".to_string()]));
        let out = generate_bundle(&graph, &cfg);
        assert!(out.contains("script_authors('ana', 'bo')"));
    }

    #[test]
    fn rebundling_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.lua", "require('./a')\nrequire('./b')\n");
        write(&dir, "a.lua", "return 1\n");
        write(&dir, "b.lua", "return 2\n");

        assert_eq!(bundle(&dir), bundle(&dir));
    }
}
