use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use tempfile::tempdir;
use treepatch::config;
use treepatch::rewrite::{self, BackupManager, Rule, RuleSet, RunOptions};
use treepatch::ErrorCode;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn demo_options(name: &str, root: &Path) -> (RuleSet, RunOptions) {
    let loaded = config::load(&demo(name)).unwrap();
    let rule_set = loaded.file.rule_set().unwrap();
    let mut options = loaded.file.run_options(&loaded.base_dir);
    options.roots = vec![root.to_path_buf()];
    (rule_set, options)
}

#[test]
fn import_path_demo_rewrites_by_directory() {
    let dir = tempdir().unwrap();
    let card = write(
        dir.path(),
        "components/Card.tsx",
        "import { Button } from \"@/app/components/ui/button\";\n",
    );
    let page = write(
        dir.path(),
        "pages/Home.tsx",
        "import { Card } from \"@/app/components/Card\";\nimport { api } from \"@/app/lib/api\";\n",
    );

    let (rule_set, mut options) = demo_options("import-paths.json", dir.path());
    options.backup = false;
    let report = rewrite::run(&options, &rule_set);

    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.files_changed, 2);
    assert_eq!(
        fs::read_to_string(card).unwrap(),
        "import { Button } from \"./ui/button\";\n"
    );
    assert_eq!(
        fs::read_to_string(page).unwrap(),
        "import { Card } from \"../components/Card\";\nimport { api } from \"../lib/api\";\n"
    );
}

#[test]
fn regex_literal_demo_unescapes_backslashes() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "utils/phone.ts",
        "export const clean = (s: string) => s.replace(/\\\\D/g, '');\n",
    );

    let (rule_set, mut options) = demo_options("regex-literals.json", dir.path());
    options.backup = false;
    rewrite::run(&options, &rule_set);

    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "export const clean = (s: string) => s.replace(/\\D/g, '');\n"
    );
}

#[test]
fn response_field_demo_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "services/gifts.ts",
        "const gifts = response.data.data;\nconst first = response.data.items[0].gift_id;\nconst site = response.data.site_id;\n",
    );

    let (rule_set, mut options) = demo_options("response-fields.toml", dir.path());
    options.backup = false;

    let first = rewrite::run(&options, &rule_set);
    let after_first = fs::read_to_string(&path).unwrap();
    let second = rewrite::run(&options, &rule_set);

    assert_eq!(first.files_changed, 1);
    assert_eq!(
        after_first,
        "const gifts = response.data.items;\nconst first = response.data.items[0].giftId;\nconst site = response.data.siteId;\n"
    );
    assert_eq!(second.files_changed, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn backups_hold_pre_rewrite_bytes_and_are_not_rewalked() {
    let dir = tempdir().unwrap();
    let original = "import x from \"@/app/components/ui/x\";\n";
    let path = write(dir.path(), "components/X.tsx", original);

    let rule_set = RuleSet::new(vec![Rule::literal("@/app/components/ui/", "./ui/").unwrap()]);
    let options = RunOptions::new(vec![dir.path().to_path_buf()], vec!["tsx".to_string()]);
    let manager = BackupManager::at(Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap());

    let report = rewrite::run_with(&options, &rule_set, Some(&manager));
    let backup = dir.path().join("components/X.tsx.20260304-050607.bak");

    assert_eq!(report.changes.len(), 1);
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "import x from \"./ui/x\";\n"
    );

    // second run: nothing left to change, backup is not picked up as a source file
    let again = rewrite::run_with(&options, &rule_set, Some(&manager));
    assert_eq!(again.files_scanned, 1);
    assert_eq!(again.files_changed, 0);
}

#[test]
fn mixed_roots_and_bad_files_never_abort_the_run() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("present");
    write(&present, "a.ts", "OLD");
    write(&present, "b.ts", "OLD");
    fs::write(present.join("c.ts"), [0xc3u8, 0x28]).unwrap();

    let rule_set = RuleSet::new(vec![Rule::literal("OLD", "NEW").unwrap()]);
    let mut options = RunOptions::new(
        vec![dir.path().join("missing"), present.clone()],
        vec!["ts".to_string()],
    );
    options.backup = false;

    let report = rewrite::run(&options, &rule_set);

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_changed, 2);
    assert_eq!(report.missing_roots, vec![dir.path().join("missing")]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, ErrorCode::FileReadFailed);
    assert_eq!(report.errors[0].path, present.join("c.ts"));
    assert!(!report.is_success());
}

#[test]
fn report_serializes_for_presentation() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ts", "OLD OLD");

    let rule_set = RuleSet::new(vec![Rule::literal("OLD", "NEW").unwrap().named("old-to-new")]);
    let mut options = RunOptions::new(vec![dir.path().to_path_buf()], vec![]);
    options.dry_run = true;

    let report = rewrite::run(&options, &rule_set);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["filesScanned"], 1);
    assert_eq!(json["filesChanged"], 1);
    assert_eq!(json["dryRun"], true);
    assert_eq!(json["changes"][0]["replacements"], 2);
    assert_eq!(json["changes"][0]["rules"][0]["rule"], "old-to-new");
    assert!(json["errors"].as_array().unwrap().is_empty());
}
