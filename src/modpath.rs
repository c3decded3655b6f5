// src/modpath.rs
//! Module-path entry: map a dotted namespace identifier onto a directory.
//!
//! `google.ads.v2.proto` with search path `/src` resolves to
//! `/src/google/ads/v2/proto`. The first search path holding that
//! directory wins.

use std::path::{Path, PathBuf};

use crate::error::IndexError;

pub fn resolve_module(name: &str, search_paths: &[PathBuf]) -> Result<PathBuf, IndexError> {
    let segments = split_module(name).ok_or_else(|| IndexError::ModuleNotFound {
        name: name.to_string(),
        searched: "<malformed name>".into(),
    })?;

    let defaults = [PathBuf::from(".")];
    let paths = if search_paths.is_empty() { &defaults[..] } else { search_paths };

    for base in paths {
        let candidate = segments.iter().fold(base.to_path_buf(), |p, s| p.join(s));
        if candidate.is_dir() {
            tracing::debug!(module = name, dir = %candidate.display(), "resolved module");
            return Ok(candidate);
        }
    }
    Err(IndexError::ModuleNotFound {
        name: name.to_string(),
        searched: paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Dotted name -> segments. `None` for empty segments or path syntax.
fn split_module(name: &str) -> Option<Vec<&str>> {
    let segs: Vec<&str> = name.trim().split('.').collect();
    let valid = segs.iter().all(|s| {
        !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
    });
    valid.then_some(segs)
}

/// True when `dir` looks like a package with an initializer file.
pub fn is_package(dir: &Path, initializers: &[String]) -> bool {
    initializers.iter().any(|i| dir.join(i).is_file())
}
