//! Rule-driven text rewriting across source trees.
//!
//! Walks one or more roots for files with matching extensions, applies an
//! ordered rule set to each file's content, and writes back only the files
//! that changed, taking a timestamped backup first when enabled.
//!
//! Rewriting is plain text substitution. Nothing here parses the files it edits.

mod backup;
mod rule;
mod rule_set;
mod run;
mod transform;
mod walker;

pub use backup::{BackupManager, BackupRecord, BACKUP_SUFFIX};
pub use rule::{MatchMode, ReplaceFn, Replacement, Rule};
pub use rule_set::{Applied, RuleHit, RuleSet, RuleSummary};
pub use run::{run, run_with, FileChange, RunError, RunOptions, RunReport};
pub use transform::{transform, transform_content, FileRecord};
pub use walker::{Walker, DEFAULT_EXCLUDE_DIRS};
