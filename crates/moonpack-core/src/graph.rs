//! Dependency graph construction.
//!
//! Reads the entry file, recursively discovers every bundled dependency,
//! rejects require cycles, and produces the topological order the emitter
//! registers module thunks in.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, BuildResult};
use crate::requires::{extract_requires, RequireSite};
use crate::resolver::{Resolution, Resolver};
use crate::scanner::ExcludedRanges;

/// One discovered module.
#[derive(Debug)]
pub struct ModuleNode {
    /// Canonical module id.
    pub module_id: String,
    /// Absolute path of the source file.
    pub absolute_path: PathBuf,
    /// Raw source text.
    pub source: String,
    /// Every require site found in the source.
    pub requires: Vec<RequireSite>,
    /// Bundled dependencies, in first-appearance order, de-duplicated.
    pub dependencies: Vec<String>,
    /// Raw import name → bundled module id, consumed by the rewriter.
    pub require_mappings: HashMap<String, String>,
}

/// The complete module graph of one build.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Module id of the entry.
    pub entry: String,
    /// Every discovered module, keyed by module id.
    pub modules: HashMap<String, ModuleNode>,
    /// Topological order: dependencies before dependents, entry last.
    pub order: Vec<String>,
}

impl DependencyGraph {
    /// The entry module's node.
    pub fn entry_node(&self) -> &ModuleNode {
        &self.modules[&self.entry]
    }
}

/// Build the dependency graph rooted at `entry_path`.
///
/// Fails with `MODULE_NOT_FOUND` on the first unresolvable bundled import
/// and with `CIRCULAR_DEPENDENCY` when the finished graph has require
/// cycles. The result is deterministic for a fixed input tree.
pub fn build_dependency_graph(entry_path: &Path, source_root: &Path) -> BuildResult<DependencyGraph> {
    let resolver = Resolver::new(source_root);
    let entry_id = resolver.module_id_for_path(entry_path);

    let mut builder = GraphBuilder {
        resolver,
        modules: HashMap::new(),
    };
    builder.discover(entry_id.clone(), entry_path.to_path_buf())?;

    let cycles = find_cycles(&builder.modules);
    if !cycles.is_empty() {
        return Err(BuildError::CircularDependency { cycles });
    }

    let order = topological_order(&builder.modules, &entry_id);
    Ok(DependencyGraph {
        entry: entry_id,
        modules: builder.modules,
        order,
    })
}

struct GraphBuilder {
    resolver: Resolver,
    modules: HashMap<String, ModuleNode>,
}

impl GraphBuilder {
    fn discover(&mut self, module_id: String, path: PathBuf) -> BuildResult<()> {
        let source = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
        let excluded = ExcludedRanges::scan(&source);
        let requires = extract_requires(&source, &excluded);

        let mut dependencies = Vec::new();
        let mut require_mappings = HashMap::new();
        let mut pending = Vec::new();

        for site in &requires {
            match self.resolver.resolve(&site.module_name, &path) {
                Resolution::External => {}
                Resolution::NotFound { .. } => {
                    return Err(BuildError::ModuleNotFound {
                        module_name: site.module_name.clone(),
                        required_by: path.clone(),
                        line: site.line,
                    });
                }
                Resolution::Bundled(resolved) => {
                    if !dependencies.contains(&resolved.module_id) {
                        dependencies.push(resolved.module_id.clone());
                    }
                    require_mappings
                        .insert(site.module_name.clone(), resolved.module_id.clone());
                    pending.push(resolved);
                }
            }
        }

        // Insert before recursing so require cycles terminate discovery.
        self.modules.insert(
            module_id.clone(),
            ModuleNode {
                module_id,
                absolute_path: path,
                source,
                requires,
                dependencies,
                require_mappings,
            },
        );

        for resolved in pending {
            if !self.modules.contains_key(&resolved.module_id) {
                self.discover(resolved.module_id, resolved.absolute_path)?;
            }
        }
        Ok(())
    }
}

/// Find every distinct require cycle.
///
/// Depth-first search with a recursion stack; when an edge reaches a node
/// already on the stack, the stack slice from that node onward is a cycle.
/// Cycles are canonicalized by rotating to their lexicographically smallest
/// rotation, then de-duplicated and returned sorted by that key.
fn find_cycles(modules: &HashMap<String, ModuleNode>) -> Vec<Vec<String>> {
    let mut ids: Vec<&String> = modules.keys().collect();
    ids.sort();

    let mut visited = HashSet::new();
    let mut found: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for start in ids {
        if !visited.contains(start.as_str()) {
            let mut stack = Vec::new();
            let mut on_stack = HashSet::new();
            dfs_cycles(modules, start, &mut visited, &mut stack, &mut on_stack, &mut found);
        }
    }

    found.into_values().collect()
}

fn dfs_cycles<'a>(
    modules: &'a HashMap<String, ModuleNode>,
    node: &'a str,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    found: &mut BTreeMap<String, Vec<String>>,
) {
    visited.insert(node);
    on_stack.insert(node);
    stack.push(node);

    if let Some(module) = modules.get(node) {
        for dep in &module.dependencies {
            if on_stack.contains(dep.as_str()) {
                let from = stack.iter().position(|&n| n == dep.as_str()).unwrap_or(0);
                let cycle = canonicalize_cycle(&stack[from..]);
                found.entry(cycle.join("\u{1f}")).or_insert(cycle);
            } else if !visited.contains(dep.as_str()) {
                dfs_cycles(modules, dep, visited, stack, on_stack, found);
            }
        }
    }

    stack.pop();
    on_stack.remove(node);
}

/// Rotate a cycle's node list (without the closing duplicate) so it starts
/// at its lexicographically smallest element.
fn canonicalize_cycle(nodes: &[&str]) -> Vec<String> {
    let pivot = (0..nodes.len()).min_by_key(|&i| nodes[i]).unwrap_or(0);
    nodes[pivot..]
        .iter()
        .chain(nodes[..pivot].iter())
        .map(|n| n.to_string())
        .collect()
}

/// Post-order depth-first traversal from the entry: every dependency
/// precedes its dependents, and the entry comes out last.
fn topological_order(modules: &HashMap<String, ModuleNode>, entry: &str) -> Vec<String> {
    let mut order = Vec::with_capacity(modules.len());
    let mut visited = HashSet::new();
    visit_post_order(modules, entry, &mut visited, &mut order);
    order
}

fn visit_post_order<'a>(
    modules: &'a HashMap<String, ModuleNode>,
    node: &'a str,
    visited: &mut HashSet<&'a str>,
    order: &mut Vec<String>,
) {
    if !visited.insert(node) {
        return;
    }
    if let Some(module) = modules.get(node) {
        for dep in &module.dependencies {
            visit_post_order(modules, dep, visited, order);
        }
    }
    order.push(node.to_string());
}
