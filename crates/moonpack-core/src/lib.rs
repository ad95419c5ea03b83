//! moonpack bundler core.
//!
//! Takes a MoonLoader Lua project whose entry script pulls in other files
//! through `require(name)` and produces one self-contained script the
//! loader can run directly. No transpilation: the pipeline discovers the
//! module graph, rewrites bundled require sites to a memoizing `__load`,
//! auto-localizes module functions, lints the graph, and concatenates the
//! result under a small runtime shim.
//!
//! - **Scanner**: string/comment spans that mask every later pattern match
//!   (`scanner` module)
//! - **Requires**: textual `require` site extraction (`requires` module)
//! - **Resolver**: relative import names to files under the source root
//!   (`resolver` module)
//! - **Graph**: recursive discovery, cycle detection, topological order
//!   (`graph` module)
//! - **Linter**: cross-file duplicate handlers, misplaced host events,
//!   unused imports (`linter` module)
//! - **Rewrite/Localize/Emit**: the output passes (`rewrite`, `localize`,
//!   `emit` modules)
//!
//! # Example
//!
//! ```rust,ignore
//! use moonpack_core::{build_dependency_graph, generate_bundle, lint_graph, load_config};
//!
//! let config = load_config(project_dir)?;
//! let entry = config.entry_path(project_dir);
//! let graph = build_dependency_graph(&entry, entry.parent().unwrap())?;
//! let warnings = lint_graph(&graph);
//! let bundle = generate_bundle(&graph, &config);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod edit;
pub mod emit;
pub mod error;
pub mod graph;
pub mod linter;
pub mod localize;
pub mod requires;
pub mod resolver;
pub mod rewrite;
pub mod scanner;

pub use config::{load_config, Author, Config, CONFIG_FILE, LOCAL_CONFIG_FILE};
pub use emit::generate_bundle;
pub use error::{BuildError, BuildResult};
pub use graph::{build_dependency_graph, DependencyGraph, ModuleNode};
pub use linter::{lint_graph, LintResult};
pub use resolver::{Resolution, ResolvedModule, Resolver};
