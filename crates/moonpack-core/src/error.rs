//! Build error taxonomy.
//!
//! Every fatal condition the bundler can hit maps to one variant with a
//! stable machine-readable code and a structured payload. Lint findings are
//! never errors; they travel in [`LintResult`](crate::linter::LintResult).

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the bundler core.
pub type BuildResult<T> = Result<T, BuildError>;

/// Fatal bundler errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No `moonpack.json` in the project directory.
    #[error("No moonpack.json found in {}", .directory.display())]
    ConfigNotFound {
        /// Directory that was searched.
        directory: PathBuf,
        /// Full path that was expected to exist.
        config_path: PathBuf,
    },

    /// The config file exists but is not valid JSON.
    #[error("Failed to parse {}: {underlying}", .config_path.display())]
    ConfigParseError {
        /// Path of the file that failed to parse.
        config_path: PathBuf,
        /// Parser message.
        underlying: String,
    },

    /// The config parsed but violates the schema.
    #[error("Invalid configuration in {}: {}", .config_path.display(), .errors.join("; "))]
    InvalidConfig {
        /// Path of the offending config file.
        config_path: PathBuf,
        /// Every violation found, aggregated.
        errors: Vec<String>,
    },

    /// A bundled import could not be resolved to a file.
    #[error("Module '{module_name}' not found (required by {} at line {line})", .required_by.display())]
    ModuleNotFound {
        /// The import name as written in source.
        module_name: String,
        /// File containing the failing require.
        required_by: PathBuf,
        /// 1-based line of the require site.
        line: usize,
    },

    /// The module graph contains at least one require cycle.
    #[error("Circular dependency detected: {}", format_cycles(.cycles))]
    CircularDependency {
        /// Every distinct cycle, canonicalized (first node repeated at display time).
        cycles: Vec<Vec<String>>,
    },

    /// File read or write failure.
    #[error("IO error on {}: {message}", .path.display())]
    Io {
        /// Path of the file being accessed.
        path: PathBuf,
        /// OS error message.
        message: String,
    },
}

impl BuildError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            BuildError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            BuildError::InvalidConfig { .. } => "INVALID_CONFIG",
            BuildError::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            BuildError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            BuildError::Io { .. } => "IO_ERROR",
        }
    }

    /// Wrap a filesystem failure with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Render each cycle as `a → b → a`, one per cycle, joined with `; `.
fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut nodes: Vec<&str> = cycle.iter().map(String::as_str).collect();
            if let Some(first) = nodes.first().copied() {
                nodes.push(first);
            }
            nodes.join(" \u{2192} ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
