// src/scan.rs
//! Namespace walker: depth-first enumeration of candidate code units. Each
//! directory's files are yielded before any of its subdirectories.
//!
//! Exclusion rules, first match wins:
//!   1. directory named like the cache dir -> not descended into
//!   2. file without the unit extension
//!   3. transport-binding suffix or namespace initializer
//!   4. anything the root's ignore file matches

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    config::UnitLayout,
    error::{IndexError, UnitError},
    unit::CandidateUnit,
};

/// Lazy, single-pass iterator over the candidate units under a root.
///
/// Directory read errors come out as `Err` items carrying the offending path
/// so the caller can log them; they never stop the walk.
pub struct NamespaceWalker {
    root: PathBuf,
    root_segment: String,
    layout: UnitLayout,
    matcher: Option<Gitignore>,
    inner: walkdir::IntoIter,
}

impl NamespaceWalker {
    /// Validate `root` and prepare the walk. Fails before touching any unit.
    pub fn new(
        root: &Path,
        layout: UnitLayout,
        sort: bool,
        ignore_file: Option<&str>,
    ) -> Result<Self, IndexError> {
        if !root.exists() {
            return Err(IndexError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "does not exist",
            });
        }
        if !root.is_dir() {
            return Err(IndexError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "not a directory",
            });
        }
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let root_segment = root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let matcher = match ignore_file {
            Some(name) if !name.is_empty() && root.join(name).is_file() => {
                Some(build_matcher(&root, name)?)
            }
            _ => None,
        };

        // A directory's files come before its subdirectories. The sort is
        // stable, so unsorted walks keep enumeration order within each group.
        let walk = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by(move |a, b| {
                let by_kind = a.file_type().is_dir().cmp(&b.file_type().is_dir());
                if sort {
                    by_kind.then_with(|| a.file_name().cmp(b.file_name()))
                } else {
                    by_kind
                }
            });

        Ok(Self {
            root,
            root_segment,
            layout,
            matcher,
            inner: walk.into_iter(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_ignored(&self, rel: &Path, is_dir: bool) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|m| m.matched(rel, is_dir).is_ignore())
    }

    fn candidate(&self, path: &Path, file_name: &str, depth: usize) -> CandidateUnit {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let namespace: Vec<String> = rel
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        let parent_segment = namespace
            .last()
            .cloned()
            .unwrap_or_else(|| self.root_segment.clone());
        let base_name = strip_extension(file_name, &self.layout.extension).to_string();

        CandidateUnit {
            location: path.to_path_buf(),
            parent_segment,
            namespace,
            base_name,
            depth,
        }
    }
}

impl Iterator for NamespaceWalker {
    type Item = Result<CandidateUnit, UnitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(err) => {
                    let at = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| self.root.display().to_string());
                    return Some(Err(UnitError::Walk {
                        path: at,
                        message: err.to_string(),
                    }));
                }
            };
            let name = entry.file_name().to_string_lossy();
            let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());

            let kind = entry.file_type();
            if kind.is_dir() {
                if name == self.layout.cache_dir.as_str() || self.is_ignored(rel, true) {
                    self.inner.skip_current_dir();
                }
                continue;
            }
            // Symlinks are not followed here; a dangling one fails at load time.
            if !(kind.is_file() || kind.is_symlink()) || !admits_file(&self.layout, &name) {
                continue;
            }
            if self.is_ignored(rel, false) {
                continue;
            }
            let unit = self.candidate(entry.path(), &name, entry.depth());
            return Some(Ok(unit));
        }
    }
}

/// Rules 2 and 3 applied to a bare file name.
pub fn admits_file(layout: &UnitLayout, file_name: &str) -> bool {
    let dotted = format!(".{}", layout.extension);
    if file_name.len() <= dotted.len() || !file_name.ends_with(&dotted) {
        return false;
    }
    if layout.transport_suffixes.iter().any(|s| file_name.ends_with(s.as_str())) {
        return false;
    }
    !layout.initializers.iter().any(|i| i == file_name)
}

fn strip_extension<'a>(file_name: &'a str, ext: &str) -> &'a str {
    file_name
        .strip_suffix(ext)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name)
}

fn build_matcher(root: &Path, name: &str) -> Result<Gitignore, IndexError> {
    let path = root.join(name);
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&path) {
        return Err(IndexError::IgnoreFile {
            path,
            message: err.to_string(),
        });
    }
    builder.build().map_err(|e| IndexError::IgnoreFile {
        path,
        message: e.to_string(),
    })
}

/* ----------------------------- tests ----------------------------- */
