//! Run orchestration: walk, transform, back up, write, report.
//!
//! Files are processed one at a time. Per-file state machine:
//!
//! ```text
//! Unvisited -> Read -+-> ReadFailed
//!                    '-> RulesApplied -+-> Unchanged
//!                                      '-> ChangePending -> Backup taken/skipped -+-> Written
//!                                                                                 +-> BackupFailed
//!                                                                                 '-> WriteFailed
//! ```
//!
//! Every failure is recorded on the report and the run moves on to the next file.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::backup::{BackupManager, BackupRecord};
use super::rule_set::{RuleHit, RuleSet};
use super::transform::{self, FileRecord};
use super::walker::{Walker, DEFAULT_EXCLUDE_DIRS};
use crate::error::{Error, ErrorCode};
use crate::utils::io;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub backup: bool,
    pub backup_dir: Option<PathBuf>,
    /// Read and transform, but neither back up nor write.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(roots: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        RunOptions {
            roots,
            extensions,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            backup: true,
            backup_dir: None,
            dry_run: false,
        }
    }

    pub fn walker(&self) -> Walker {
        Walker::new(&self.roots, &self.extensions).exclude_dirs(&self.exclude_dirs)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunError {
    pub path: PathBuf,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl RunError {
    fn from_error(path: &Path, err: Error) -> Self {
        RunError {
            path: path.to_path_buf(),
            code: err.code,
            message: err.message,
            hints: err.hints.into_iter().map(|h| h.message).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: PathBuf,
    pub replacements: usize,
    pub rules: Vec<RuleHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub dry_run: bool,
    pub changes: Vec<FileChange>,
    pub errors: Vec<RunError>,
    pub missing_roots: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_replacements(&self) -> usize {
        self.changes.iter().map(|c| c.replacements).sum()
    }

    fn record_error(&mut self, path: &Path, err: Error) {
        crate::log_status!("rewrite", "{}", err.message);
        self.errors.push(RunError::from_error(path, err));
    }
}

/// Apply `rule_set` to every file the options select.
pub fn run(options: &RunOptions, rule_set: &RuleSet) -> RunReport {
    let backups = options.backup.then(|| {
        let manager = BackupManager::new();
        match &options.backup_dir {
            Some(dir) => manager.in_dir(dir),
            None => manager,
        }
    });
    run_with(options, rule_set, backups.as_ref())
}

/// Like [`run`], with a caller-supplied backup manager (`None` disables backups).
pub fn run_with(
    options: &RunOptions,
    rule_set: &RuleSet,
    backups: Option<&BackupManager>,
) -> RunReport {
    let walker = options.walker();
    let mut report = RunReport {
        dry_run: options.dry_run,
        missing_roots: walker.missing_roots(),
        ..RunReport::default()
    };

    for root in &report.missing_roots {
        crate::log_status!("walk", "Skipping missing root {}", root.display());
    }

    if rule_set.is_empty() {
        report.warnings.push("Rule set is empty; no file can change".to_string());
    }

    let mut seen = HashSet::new();
    for entry in walker.iter() {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                let path = err.details["path"]
                    .as_str()
                    .map(PathBuf::from)
                    .unwrap_or_default();
                report.record_error(&path, err);
                continue;
            }
        };

        // Repeated or nested roots reach the same file more than once.
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !seen.insert(key) {
            continue;
        }

        report.files_scanned += 1;

        match transform::transform(&path, rule_set) {
            Ok(record) => settle(&mut report, &record, options.dry_run, backups),
            Err(err) => report.record_error(&path, err),
        }
    }

    if report.files_scanned == 0 {
        let warning = if report.missing_roots.len() == options.roots.len() {
            "No root directory exists; nothing was scanned"
        } else {
            "No files matched the configured extensions"
        };
        crate::log_status!("run", "{}", warning);
        report.warnings.push(warning.to_string());
    }

    crate::log_status!(
        "run",
        "{} scanned, {} changed ({} replacements), {} errors",
        report.files_scanned,
        report.files_changed,
        report.total_replacements(),
        report.errors.len()
    );

    report
}

/// Record the outcome for one transformed file, writing it unless `dry_run`.
fn settle(
    report: &mut RunReport,
    record: &FileRecord,
    dry_run: bool,
    backups: Option<&BackupManager>,
) {
    if !record.changed {
        return;
    }

    if dry_run {
        crate::log_status!("rewrite", "Would change {}", record.path.display());
        report.files_changed += 1;
        report.changes.push(change_for(record, None));
        return;
    }

    match commit(record, backups) {
        Ok(backup) => {
            crate::log_status!(
                "rewrite",
                "{} ({} replacements)",
                record.path.display(),
                record.replacements()
            );
            report.files_changed += 1;
            report.changes.push(change_for(record, backup));
        }
        Err(err) => report.record_error(&record.path, err),
    }
}

/// Back up (when enabled) and then overwrite. A failed backup leaves the file untouched.
fn commit(
    record: &FileRecord,
    backups: Option<&BackupManager>,
) -> crate::error::Result<Option<BackupRecord>> {
    let backup = match backups {
        Some(manager) => Some(manager.snapshot(&record.path, &record.original_content)?),
        None => None,
    };

    io::write_file_atomic(&record.path, &record.transformed_content).map_err(|err| {
        let reason = err.details["error"].as_str().unwrap_or("write failed").to_string();
        Error::file_write_failed(
            &record.path,
            backup.as_ref().map(|b| b.backup_path.as_path()),
            reason,
        )
    })?;

    Ok(backup)
}

fn change_for(record: &FileRecord, backup: Option<BackupRecord>) -> FileChange {
    FileChange {
        path: record.path.clone(),
        replacements: record.replacements(),
        rules: record.hits.clone(),
        backup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::Rule;
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::tempdir;

    fn rules() -> RuleSet {
        RuleSet::new(vec![Rule::literal("@/app/components/ui/", "./ui/").unwrap()])
    }

    fn options(root: &Path) -> RunOptions {
        RunOptions::new(vec![root.to_path_buf()], vec!["tsx".to_string()])
    }

    fn backup_files(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().ends_with(".bak"))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn rewrites_changed_files_and_counts_all_scanned() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), "from \"@/app/components/ui/a\"").unwrap();
        fs::write(dir.path().join("b.tsx"), "nothing to see").unwrap();

        let report = run(&options(dir.path()), &rules());

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files_changed, 1);
        assert!(report.is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("a.tsx")).unwrap(),
            "from \"./ui/a\""
        );
        assert_eq!(report.changes[0].replacements, 1);
    }

    #[test]
    fn one_backup_per_changed_file_with_original_bytes() {
        let dir = tempdir().unwrap();
        let original = "import x from \"@/app/components/ui/x\"\n";
        fs::write(dir.path().join("a.tsx"), original).unwrap();
        fs::write(dir.path().join("b.tsx"), "untouched\n").unwrap();

        let manager = BackupManager::at(Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        let report = run_with(&options(dir.path()), &rules(), Some(&manager));

        let backups = backup_files(dir.path());
        assert_eq!(backups, vec![dir.path().join("a.tsx.20260102-030405.bak")]);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);
        assert_eq!(
            report.changes[0].backup.as_ref().map(|b| b.backup_path.clone()),
            Some(backups[0].clone())
        );
    }

    #[test]
    fn disabled_backup_writes_no_snapshot() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), "@/app/components/ui/").unwrap();

        let mut opts = options(dir.path());
        opts.backup = false;
        let report = run(&opts, &rules());

        assert_eq!(report.files_changed, 1);
        assert!(backup_files(dir.path()).is_empty());
        assert!(report.changes[0].backup.is_none());
    }

    #[test]
    fn dry_run_reports_without_touching_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), "@/app/components/ui/").unwrap();

        let mut opts = options(dir.path());
        opts.dry_run = true;
        let report = run(&opts, &rules());

        assert_eq!(report.files_changed, 1);
        assert!(report.dry_run);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.tsx")).unwrap(),
            "@/app/components/ui/"
        );
        assert!(backup_files(dir.path()).is_empty());
    }

    #[test]
    fn unreadable_file_is_recorded_and_run_continues() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), [0xffu8, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("b.tsx"), "@/app/components/ui/").unwrap();

        let report = run(&options(dir.path()), &rules());

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files_changed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::FileReadFailed);
        assert_eq!(report.errors[0].path, dir.path().join("a.tsx"));
        assert!(!report.is_success());
    }

    #[test]
    fn failed_backup_leaves_file_unmodified() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.tsx"), "@/app/components/ui/").unwrap();

        let manager = BackupManager::new().in_dir(blocker.join("sub"));
        let report = run_with(&options(&src), &rules(), Some(&manager));

        assert_eq!(report.files_changed, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::FileBackupFailed);
        assert_eq!(
            fs::read_to_string(src.join("a.tsx")).unwrap(),
            "@/app/components/ui/"
        );
    }

    #[test]
    fn write_failure_after_backup_keeps_backup_and_hints_at_it() {
        let dir = tempdir().unwrap();
        let backup_dir = dir.path().join("backups");
        let original = "@/app/components/ui/";
        // parent directory does not exist, so only the write step can fail
        let target = dir.path().join("vanished").join("a.tsx");
        let record = transform::transform_content(&target, original.to_string(), &rules());

        let manager = BackupManager::at(Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
            .in_dir(&backup_dir);
        let mut report = RunReport::default();
        settle(&mut report, &record, false, Some(&manager));

        let backup = backup_dir.join("a.tsx.20260102-030405.bak");
        assert_eq!(report.files_changed, 0);
        assert!(report.changes.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::FileWriteFailed);
        assert_eq!(report.errors[0].path, target);
        assert!(report.errors[0].hints[0].contains(&backup.display().to_string()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
    }

    #[test]
    fn repeated_and_nested_roots_visit_each_file_once() {
        let dir = tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("a.tsx"), "ui/x").unwrap();

        let rule_set = RuleSet::new(vec![Rule::literal("ui/", "ui/ui/").unwrap()]);
        let opts = RunOptions::new(
            vec![dir.path().to_path_buf(), dir.path().to_path_buf(), app.clone()],
            vec!["tsx".to_string()],
        );
        let manager = BackupManager::at(Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let report = run_with(&opts, &rule_set, Some(&manager));

        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.files_changed, 1);
        assert_eq!(fs::read_to_string(app.join("a.tsx")).unwrap(), "ui/ui/x");
        assert_eq!(backup_files(&app), vec![app.join("a.tsx.20260101-000000.bak")]);
        assert_eq!(fs::read_to_string(app.join("a.tsx.20260101-000000.bak")).unwrap(), "ui/x");
    }

    #[test]
    fn missing_root_is_not_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");

        let report = run(&options(&missing), &rules());

        assert_eq!(report.files_scanned, 0);
        assert!(report.errors.is_empty());
        assert_eq!(report.missing_roots, vec![missing]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("No root directory exists"));
    }

    #[test]
    fn empty_rule_set_is_warned_about() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), "x").unwrap();

        let report = run(&options(dir.path()), &RuleSet::default());

        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.files_changed, 0);
        assert!(report.warnings.iter().any(|w| w.contains("empty")));
    }
}
