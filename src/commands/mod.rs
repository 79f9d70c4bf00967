use clap::Args;
use std::path::Path;

use treepatch::config::resolve_path;
use treepatch::{RunOptions, RunReport};

pub type CmdResult<T> = treepatch::Result<(T, i32)>;

pub mod replace;
pub mod rules;
pub mod run;

/// Flags shared by every command that walks and rewrites a tree.
///
/// Each flag overrides the matching rule-file setting when given.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Root directory to scan (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<String>,

    /// File-name suffix to consider, e.g. `tsx` or `.d.ts` (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory name to skip at any depth (repeatable; replaces the defaults)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Do not write timestamped backups before rewriting
    #[arg(long)]
    pub no_backup: bool,

    /// Collect backups in this directory instead of beside each file
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<String>,

    /// Report what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

impl TargetArgs {
    pub fn apply_to(&self, options: &mut RunOptions) {
        let cwd = Path::new(".");
        if !self.roots.is_empty() {
            options.roots = self.roots.iter().map(|r| resolve_path(r, cwd)).collect();
        }
        if !self.extensions.is_empty() {
            options.extensions = self.extensions.clone();
        }
        if !self.exclude_dirs.is_empty() {
            options.exclude_dirs = self.exclude_dirs.clone();
        }
        if self.no_backup {
            options.backup = false;
        }
        if let Some(dir) = &self.backup_dir {
            options.backup_dir = Some(resolve_path(dir, cwd));
        }
        options.dry_run = self.dry_run;
    }
}

/// Exit status for a finished run: non-zero whenever any file failed.
pub fn exit_code_for_report(report: &RunReport) -> i32 {
    if report.is_success() {
        0
    } else {
        1
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (treepatch::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Run(args) => dispatch!(args, run),
        crate::Commands::Replace(args) => dispatch!(args, replace),
        crate::Commands::Rules(args) => dispatch!(args, rules),
    }
}
