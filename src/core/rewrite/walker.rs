//! Candidate file enumeration.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Directories skipped at any depth unless the caller overrides the list.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git"];

/// Lazily enumerates files under a list of roots.
///
/// Entries are visited in lexicographic file-name order so repeated runs see
/// files in the same sequence. Holds no state between calls to `iter`.
#[derive(Debug, Clone, Default)]
pub struct Walker {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl Walker {
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(roots: &[P], extensions: &[S]) -> Self {
        Walker {
            roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
            extensions: normalize_extensions(extensions),
            exclude_dirs: Vec::new(),
        }
    }

    pub fn exclude_dirs<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.exclude_dirs = names.iter().map(|n| n.as_ref().to_string()).collect();
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Roots that do not exist (or are not directories). These are skipped by `iter`.
    pub fn missing_roots(&self) -> Vec<PathBuf> {
        self.roots.iter().filter(|r| !r.is_dir()).cloned().collect()
    }

    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Yields matching file paths, or `walk.failed` for entries that could
    /// not be enumerated beneath an existing root.
    pub fn iter(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        self.roots
            .iter()
            .filter(|root| root.is_dir())
            .flat_map(move |root| {
                WalkDir::new(root)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(move |entry| {
                        entry.depth() == 0
                            || !entry.file_type().is_dir()
                            || !self.is_excluded_dir(&entry.file_name().to_string_lossy())
                    })
                    .filter_map(move |entry| match entry {
                        Ok(entry) => {
                            if entry.file_type().is_file() && self.accepts(entry.path()) {
                                Some(Ok(entry.into_path()))
                            } else {
                                None
                            }
                        }
                        Err(e) => {
                            let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                            Some(Err(Error::walk_failed(&path, e.to_string())))
                        }
                    })
            })
    }
}

fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|e| e.as_ref().trim())
        .filter(|e| !e.is_empty())
        .map(|e| {
            if e.starts_with('.') {
                e.to_string()
            } else {
                format!(".{}", e)
            }
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
