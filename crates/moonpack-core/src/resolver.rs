//! Module path resolution.
//!
//! Maps an import name to a file under the source root. Relative names
//! (`./utils`, `../lib/helper`) are bundled; everything else is external and
//! left for the host runtime's own `require` at load time.
//!
//! # Resolution order
//!
//! For `require('./utils')` from `src/main.lua`:
//! 1. Try `src/utils.lua`
//! 2. Try `src/utils/init.lua`

use std::path::{Component, Path, PathBuf};

/// A bundled module with its canonical id and file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Canonical key used in the module map and passed to `__load` at
    /// runtime: source-root-relative path, `/` separators, no extension,
    /// trailing `/init` collapsed.
    pub module_id: String,
    /// Absolute path to the module file.
    pub absolute_path: PathBuf,
}

/// Outcome of resolving one import name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The import is not bundled; its `require` passes through at runtime.
    External,
    /// The import maps to a file under the source root.
    Bundled(ResolvedModule),
    /// The import looks local but no file matched.
    NotFound {
        /// Candidate paths that were tried, in order.
        tried: Vec<PathBuf>,
    },
}

/// Relative-path module resolver rooted at the bundle's source directory.
#[derive(Debug, Clone)]
pub struct Resolver {
    source_root: PathBuf,
}

impl Resolver {
    /// Create a resolver for the given source root.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: normalize(&source_root.into()),
        }
    }

    /// The source root all module ids are relative to.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Whether an import name is bundled (relative) rather than external.
    pub fn is_local(import_name: &str) -> bool {
        import_name.starts_with("./") || import_name.starts_with("../")
    }

    /// Resolve `import_name` as written in `requester`.
    pub fn resolve(&self, import_name: &str, requester: &Path) -> Resolution {
        if !Self::is_local(import_name) {
            return Resolution::External;
        }

        let base_dir = requester.parent().unwrap_or(Path::new(""));
        let joined = normalize(&base_dir.join(import_name));

        let direct = if joined.extension().is_some_and(|e| e == "lua") {
            joined.clone()
        } else {
            let mut with_ext = joined.clone().into_os_string();
            with_ext.push(".lua");
            PathBuf::from(with_ext)
        };
        let init = joined.join("init.lua");

        // Direct file beats the init file.
        for candidate in [&direct, &init] {
            if candidate.is_file() {
                return Resolution::Bundled(ResolvedModule {
                    module_id: self.module_id_for_path(candidate),
                    absolute_path: candidate.clone(),
                });
            }
        }

        Resolution::NotFound {
            tried: vec![direct, init],
        }
    }

    /// Derive the canonical module id for a file under the source root.
    pub fn module_id_for_path(&self, path: &Path) -> String {
        let normalized = normalize(path);
        let relative = normalized
            .strip_prefix(&self.source_root)
            .unwrap_or(&normalized);

        let mut id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(stripped) = id.strip_suffix(".lua") {
            id = stripped.to_string();
        }
        if let Some(stripped) = id.strip_suffix("/init") {
            id = stripped.to_string();
        }
        id
    }
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, Resolver) {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::new(dir.path());
        (dir, resolver)
    }

    fn touch(dir: &TempDir, rel: &str) -> PathBuf {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "return {}\n").unwrap();
        path
    }

    #[test]
    fn non_relative_names_are_external() {
        let (_dir, resolver) = project();
        let requester = resolver.source_root().join("main.lua");
        assert_eq!(
            resolver.resolve("samp.events", &requester),
            Resolution::External
        );
        assert_eq!(resolver.resolve("moonloader", &requester), Resolution::External);
    }

    #[test]
    fn resolves_sibling_file() {
        let (dir, resolver) = project();
        touch(&dir, "utils.lua");
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./utils", &requester) {
            Resolution::Bundled(m) => assert_eq!(m.module_id, "utils"),
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn resolves_into_subdirectory() {
        let (dir, resolver) = project();
        touch(&dir, "lib/helper.lua");
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./lib/helper", &requester) {
            Resolution::Bundled(m) => assert_eq!(m.module_id, "lib/helper"),
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn parent_relative_import() {
        let (dir, resolver) = project();
        touch(&dir, "shared.lua");
        let requester = touch(&dir, "feature/mod.lua");

        match resolver.resolve("../shared", &requester) {
            Resolution::Bundled(m) => assert_eq!(m.module_id, "shared"),
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn init_file_fallback_collapses_in_id() {
        let (dir, resolver) = project();
        touch(&dir, "widgets/init.lua");
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./widgets", &requester) {
            Resolution::Bundled(m) => {
                assert_eq!(m.module_id, "widgets");
                assert!(m.absolute_path.ends_with("widgets/init.lua"));
            }
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn direct_file_beats_init_file() {
        let (dir, resolver) = project();
        touch(&dir, "thing.lua");
        touch(&dir, "thing/init.lua");
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./thing", &requester) {
            Resolution::Bundled(m) => assert!(m.absolute_path.ends_with("thing.lua")),
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn missing_module_reports_tried_candidates() {
        let (dir, resolver) = project();
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./ghost", &requester) {
            Resolution::NotFound { tried } => {
                assert_eq!(tried.len(), 2);
                assert!(tried[0].ends_with("ghost.lua"));
                assert!(tried[1].ends_with("ghost/init.lua"));
            }
            other => panic!("expected not-found, got {:?}", other),
        }
    }

    #[test]
    fn module_id_round_trip() {
        let (dir, resolver) = project();
        let path = touch(&dir, "net/packets.lua");
        let id = resolver.module_id_for_path(&path);
        assert_eq!(id, "net/packets");

        let requester = dir.path().join("main.lua");
        match resolver.resolve(&format!("./{}", id), &requester) {
            Resolution::Bundled(m) => assert_eq!(normalize(&path), normalize(&m.absolute_path)),
            other => panic!("expected bundled, got {:?}", other),
        }
    }

    #[test]
    fn explicit_extension_is_not_doubled() {
        let (dir, resolver) = project();
        touch(&dir, "utils.lua");
        let requester = dir.path().join("main.lua");

        match resolver.resolve("./utils.lua", &requester) {
            Resolution::Bundled(m) => assert_eq!(m.module_id, "utils"),
            other => panic!("expected bundled, got {:?}", other),
        }
    }
}
