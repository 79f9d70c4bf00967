//! Per-file rule application. Never writes.

use std::path::{Path, PathBuf};

use super::rule_set::{RuleHit, RuleSet};
use crate::error::Result;
use crate::utils::io;

/// One file's before/after state. Lives only until its write decision is made.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub original_content: String,
    pub transformed_content: String,
    pub changed: bool,
    pub hits: Vec<RuleHit>,
}

impl FileRecord {
    pub fn replacements(&self) -> usize {
        self.hits.iter().map(|h| h.replacements).sum()
    }
}

/// Read `path` as UTF-8 and run `rule_set` over it.
///
/// Fails with `file.read_failed` when the file is missing or not valid UTF-8.
pub fn transform(path: &Path, rule_set: &RuleSet) -> Result<FileRecord> {
    let original_content = io::read_text(path)?;
    Ok(transform_content(path, original_content, rule_set))
}

pub fn transform_content(path: &Path, original_content: String, rule_set: &RuleSet) -> FileRecord {
    let applied = rule_set.apply_counted(&original_content, path);
    let changed = applied.content != original_content;

    FileRecord {
        path: path.to_path_buf(),
        transformed_content: applied.content,
        original_content,
        changed,
        hits: applied.hits,
    }
}
