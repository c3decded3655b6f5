// src/config.rs
//! Run configuration.
//!
//! Layered lowest to highest: built-in defaults, optional JSON file,
//! `LAZYMAP_*` environment variables, command-line flags (applied by
//! `commands`). Unknown keys in the file are rejected, missing keys fall back
//! to defaults.

use serde::{Deserialize, Serialize};
use std::{env, fmt, fs, path::Path, str::FromStr};

use crate::error::IndexError;

/// Source language of the code units under the root.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Rust,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "rust" | "rs" => Ok(Language::Rust),
            other => Err(format!("unknown language `{other}`")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Python => "python",
            Language::Rust => "rust",
        })
    }
}

/// How the dotted location of a unit is assembled.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum QualifyStyle {
    /// `prefix.parent_segment.base_name`
    #[default]
    Parent,
    /// `prefix.seg1.seg2...base_name`, every directory below the root.
    FullPath,
}

/// What happens when a symbol name is exported by more than one unit.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the entry recorded first in traversal order.
    #[default]
    FirstWins,
    /// Overwrite the value, keep the key's original position.
    LastWins,
}

/// Structural rules the walker applies. Derived from the language unless
/// overridden in the config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitLayout {
    pub extension: String,
    pub cache_dir: String,
    pub initializers: Vec<String>,
    pub transport_suffixes: Vec<String>,
}

impl UnitLayout {
    pub fn for_language(lang: Language) -> Self {
        match lang {
            Language::Python => UnitLayout {
                extension: "py".into(),
                cache_dir: "__pycache__".into(),
                initializers: vec!["__init__.py".into()],
                transport_suffixes: vec!["_grpc.py".into()],
            },
            Language::Rust => UnitLayout {
                extension: "rs".into(),
                cache_dir: "target".into(),
                initializers: vec!["mod.rs".into(), "lib.rs".into(), "main.rs".into()],
                transport_suffixes: vec!["_grpc.rs".into()],
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub language: Language,

    // Layout overrides; `None` means "use the language default".
    pub extension: Option<String>,
    pub cache_dir: Option<String>,
    pub initializers: Option<Vec<String>>,
    pub transport_suffixes: Option<Vec<String>>,

    /// Names starting with this are implementation-private.
    pub private_marker: String,
    /// Callees whose result, assigned at top level, is a class (python only).
    pub type_factories: Vec<String>,

    pub prefix: String,
    pub identifier: String,
    pub qualify: QualifyStyle,
    pub duplicates: DuplicatePolicy,

    /// Sort directory entries by name during traversal.
    pub sort: bool,
    /// Loader threads. 1 = sequential.
    pub jobs: usize,
    /// Gitignore-style file looked up at the root.
    pub ignore_file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            language: Language::Python,
            extension: None,
            cache_dir: None,
            initializers: None,
            transport_suffixes: None,
            private_marker: "_".into(),
            type_factories: vec![
                "type".into(),
                "GeneratedProtocolMessageType".into(),
                "namedtuple".into(),
                "NamedTuple".into(),
                "TypedDict".into(),
            ],
            prefix: String::new(),
            identifier: "_lazy_class_to_package_map".into(),
            qualify: QualifyStyle::Parent,
            duplicates: DuplicatePolicy::FirstWins,
            sort: true,
            jobs: 1,
            ignore_file: ".lazymapignore".into(),
        }
    }
}

impl IndexConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, IndexError> {
        let raw = fs::read_to_string(path).map_err(|e| IndexError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| IndexError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply `LAZYMAP_*` overrides. Unparseable values are reported and ignored.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(val) = get("LAZYMAP_LANGUAGE") {
            match val.parse() {
                Ok(lang) => self.language = lang,
                Err(e) => tracing::warn!(value = %val, "LAZYMAP_LANGUAGE: {e}, keeping {}", self.language),
            }
        }
        if let Some(val) = get("LAZYMAP_PREFIX") {
            self.prefix = val;
        }
        if let Some(val) = get("LAZYMAP_IDENTIFIER") {
            self.identifier = val;
        }
        if let Some(val) = get("LAZYMAP_JOBS") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => self.jobs = n,
                _ => tracing::warn!(value = %val, "invalid LAZYMAP_JOBS, keeping {}", self.jobs),
            }
        }
    }

    /// Effective walker rules: language defaults with file overrides on top.
    pub fn layout(&self) -> UnitLayout {
        let mut layout = UnitLayout::for_language(self.language);
        if let Some(ext) = &self.extension {
            layout.extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(dir) = &self.cache_dir {
            layout.cache_dir = dir.clone();
        }
        if let Some(init) = &self.initializers {
            layout.initializers = init.clone();
        }
        if let Some(sfx) = &self.transport_suffixes {
            layout.transport_suffixes = sfx.clone();
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn layout_defaults_follow_language() {
        let mut cfg = IndexConfig::default();
        assert_eq!(cfg.layout().cache_dir, "__pycache__");
        cfg.language = Language::Rust;
        let layout = cfg.layout();
        assert_eq!(layout.extension, "rs");
        assert!(layout.initializers.contains(&"mod.rs".to_string()));
    }

    #[test]
    fn layout_overrides_win() {
        let cfg = IndexConfig {
            extension: Some(".pyi".into()),
            transport_suffixes: Some(vec!["_pb2_grpc.pyi".into()]),
            ..IndexConfig::default()
        };
        let layout = cfg.layout();
        assert_eq!(layout.extension, "pyi");
        assert_eq!(layout.transport_suffixes, vec!["_pb2_grpc.pyi"]);
        assert_eq!(layout.cache_dir, "__pycache__");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: IndexConfig =
            serde_json::from_str(r#"{"prefix":"ns.v2.proto","duplicates":"last-wins"}"#).unwrap();
        assert_eq!(cfg.prefix, "ns.v2.proto");
        assert_eq!(cfg.duplicates, DuplicatePolicy::LastWins);
        assert_eq!(cfg.identifier, "_lazy_class_to_package_map");
        assert!(cfg.sort);
    }

    #[test]
    fn unknown_json_key_rejected() {
        assert!(serde_json::from_str::<IndexConfig>(r#"{"prefx":"x"}"#).is_err());
    }

    #[test]
    fn env_overrides_skip_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("LAZYMAP_LANGUAGE", "rs"),
            ("LAZYMAP_PREFIX", "a.b"),
            ("LAZYMAP_JOBS", "zero"),
        ]
        .into_iter()
        .collect();
        let mut cfg = IndexConfig::default();
        cfg.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.language, Language::Rust);
        assert_eq!(cfg.prefix, "a.b");
        assert_eq!(cfg.jobs, 1);
    }
}
