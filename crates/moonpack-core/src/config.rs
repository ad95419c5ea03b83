//! Project configuration (`moonpack.json`).
//!
//! A project directory carries a `moonpack.json` and, optionally, a
//! `moonpack.local.json` whose top-level fields shallow-merge over it
//! (useful for machine-specific output directories that stay out of
//! version control). Validation collects every schema violation before
//! failing, so the user sees the whole list at once. Unknown fields are
//! ignored for forward compatibility.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{BuildError, BuildResult};

/// Name of the primary config file.
pub const CONFIG_FILE: &str = "moonpack.json";
/// Name of the optional local overlay.
pub const LOCAL_CONFIG_FILE: &str = "moonpack.local.json";

/// `author` accepts a single name or a list of names.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Author {
    /// One author.
    Single(String),
    /// Several authors.
    Many(Vec<String>),
}

impl Author {
    /// The author names as a slice, whichever form was written.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Author::Single(name) => vec![name.as_str()],
            Author::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Validated project configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Script name; also names the output file.
    pub name: String,
    /// Optional version, rendered as `v<version>` in the bundle header.
    pub version: Option<String>,
    /// Optional author or authors.
    pub author: Option<Author>,
    /// Optional one-line description.
    pub description: Option<String>,
    /// Optional project URL.
    pub url: Option<String>,
    /// Entry source file, relative to the project directory.
    pub entry: String,
    /// Output directory, absolute or relative to the project directory.
    pub out_dir: String,
}

impl Config {
    /// Absolute path of the entry file.
    pub fn entry_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.entry)
    }

    /// Absolute path of the output directory.
    pub fn out_dir_path(&self, project_dir: &Path) -> PathBuf {
        let out = Path::new(&self.out_dir);
        if out.is_absolute() {
            out.to_path_buf()
        } else {
            project_dir.join(out)
        }
    }

    /// Absolute path of the bundle this config produces.
    pub fn output_path(&self, project_dir: &Path) -> PathBuf {
        self.out_dir_path(project_dir).join(format!("{}.lua", self.name))
    }
}

/// Raw shape of the config file before validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    name: Option<Value>,
    version: Option<Value>,
    author: Option<Value>,
    description: Option<Value>,
    url: Option<Value>,
    entry: Option<Value>,
    #[serde(rename = "outDir")]
    out_dir: Option<Value>,
}

/// Load and validate the config for a project directory, applying the
/// local overlay when present.
pub fn load_config(project_dir: &Path) -> BuildResult<Config> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Err(BuildError::ConfigNotFound {
            directory: project_dir.to_path_buf(),
            config_path,
        });
    }

    let mut merged = parse_json_object(&config_path)?;

    let local_path = project_dir.join(LOCAL_CONFIG_FILE);
    if local_path.is_file() {
        let local = parse_json_object(&local_path)?;
        if let (Value::Object(base), Value::Object(overlay)) = (&mut merged, local) {
            // Shallow merge: local fields win wholesale.
            for (key, value) in overlay {
                base.insert(key, value);
            }
        }
    }

    validate(merged, &config_path)
}

fn parse_json_object(path: &Path) -> BuildResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| BuildError::ConfigParseError {
        config_path: path.to_path_buf(),
        underlying: e.to_string(),
    })
}

fn validate(value: Value, config_path: &Path) -> BuildResult<Config> {
    let raw: RawConfig = serde_json::from_value(value).unwrap_or_default();
    let mut errors = Vec::new();

    let name = required_string(raw.name, "name", &mut errors);
    let entry = required_string(raw.entry, "entry", &mut errors);
    let version = optional_string(raw.version, "version", &mut errors);
    let description = optional_string(raw.description, "description", &mut errors);
    let url = optional_string(raw.url, "url", &mut errors);
    let out_dir = optional_string(raw.out_dir, "outDir", &mut errors);

    let author = match raw.author {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<Author>(value) {
            Ok(author) => Some(author),
            Err(_) => {
                errors.push("\"author\" must be a string or a list of strings".to_string());
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(BuildError::InvalidConfig {
            config_path: config_path.to_path_buf(),
            errors,
        });
    }

    Ok(Config {
        name: name.unwrap_or_default(),
        version,
        author,
        description,
        url,
        entry: entry.unwrap_or_default(),
        out_dir: out_dir.unwrap_or_else(|| "dist".to_string()),
    })
}

fn required_string(value: Option<Value>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::String(_)) => {
            errors.push(format!("\"{field}\" must be a non-empty string"));
            None
        }
        Some(_) => {
            errors.push(format!("\"{field}\" must be a string"));
            None
        }
        None => {
            errors.push(format!("missing required field \"{field}\""));
            None
        }
    }
}

fn optional_string(value: Option<Value>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            errors.push(format!("\"{field}\" must be a string"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, json: &str) {
        fs::write(dir.path().join(name), json).unwrap();
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, CONFIG_FILE, r#"{"name": "hello", "entry": "src/main.lua"}"#);

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.name, "hello");
        assert_eq!(config.entry, "src/main.lua");
        assert_eq!(config.out_dir, "dist");
        assert!(config.version.is_none());
    }

    #[test]
    fn missing_config_file() {
        let dir = TempDir::new().unwrap();
        match load_config(dir.path()) {
            Err(BuildError::ConfigNotFound { config_path, .. }) => {
                assert!(config_path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, CONFIG_FILE, "{not json");

        match load_config(dir.path()) {
            Err(BuildError::ConfigParseError { .. }) => {}
            other => panic!("expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn validation_collects_every_error() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, CONFIG_FILE, r#"{"name": "", "version": 3}"#);

        match load_config(dir.path()) {
            Err(BuildError::InvalidConfig { errors, .. }) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("\"name\"")));
                assert!(errors.iter().any(|e| e.contains("\"entry\"")));
                assert!(errors.iter().any(|e| e.contains("\"version\"")));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn author_accepts_a_list() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            CONFIG_FILE,
            r#"{"name": "x", "entry": "main.lua", "author": ["ana", "bo"]}"#,
        );

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.author.unwrap().names(), vec!["ana", "bo"]);
    }

    #[test]
    fn local_overlay_wins() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            CONFIG_FILE,
            r#"{"name": "x", "entry": "main.lua", "outDir": "dist"}"#,
        );
        write_config(&dir, LOCAL_CONFIG_FILE, r#"{"outDir": "/tmp/out"}"#);

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.out_dir, "/tmp/out");
        assert!(config.out_dir_path(dir.path()).is_absolute());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            CONFIG_FILE,
            r#"{"name": "x", "entry": "main.lua", "futureKnob": {"a": 1}}"#,
        );

        assert!(load_config(dir.path()).is_ok());
    }

    #[test]
    fn output_path_joins_out_dir_and_name() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, CONFIG_FILE, r#"{"name": "tool", "entry": "main.lua"}"#);

        let config = load_config(dir.path()).unwrap();
        assert_eq!(
            config.output_path(dir.path()),
            dir.path().join("dist").join("tool.lua")
        );
    }
}
