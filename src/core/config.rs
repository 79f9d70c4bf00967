use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::rewrite::{MatchMode, Replacement, Rule, RuleSet, RunOptions, DEFAULT_EXCLUDE_DIRS};
use crate::utils::io;

/// Root structure of a rule file (`*.json`, or `*.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFile {
    #[serde(default)]
    pub roots: Vec<String>,

    /// File-name suffixes to consider. Empty means every file.
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    #[serde(default = "default_backup")]
    pub backup: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub find: String,
    pub replace: String,
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_backup() -> bool {
    true
}

/// A parsed rule file plus the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub file: RuleFile,
}

pub fn load(path: &Path) -> Result<LoadedConfig> {
    let content = io::read_text(path).map_err(|e| {
        Error::validation_invalid_argument(
            "config",
            e.message,
            Some(path.display().to_string()),
            None,
        )
    })?;

    let label = path.display().to_string();
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let file = if is_toml {
        parse_toml(&content, &label)?
    } else {
        parse_json(&content, &label)?
    };

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        base_dir,
        file,
    })
}

pub fn parse_json(content: &str, label: &str) -> Result<RuleFile> {
    let file: RuleFile =
        serde_json::from_str(content).map_err(|e| Error::config_invalid_json(label, e))?;
    file.validate()?;
    Ok(file)
}

pub fn parse_toml(content: &str, label: &str) -> Result<RuleFile> {
    let file: RuleFile = toml::from_str(content).map_err(|e| Error::config_invalid_toml(label, e))?;
    file.validate()?;
    Ok(file)
}

impl RuleFile {
    fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::config_invalid_value(
                "rules",
                None,
                "at least one rule is required",
            ));
        }
        Ok(())
    }

    /// Compile every rule. Fails on the first invalid pattern, before any file is touched.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, cfg)| cfg.to_rule(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleSet::new(rules))
    }

    pub fn run_options(&self, base_dir: &Path) -> RunOptions {
        let mut options = RunOptions::new(
            self.roots.iter().map(|r| resolve_path(r, base_dir)).collect(),
            self.extensions.clone(),
        );
        options.exclude_dirs = self.exclude_dirs.clone();
        options.backup = self.backup;
        options.backup_dir = self.backup_dir.as_deref().map(|d| resolve_path(d, base_dir));
        options
    }
}

impl RuleConfig {
    fn to_rule(&self, index: usize) -> Result<Rule> {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("rule-{}", index + 1));
        let rule = Rule::new(
            name,
            self.find.clone(),
            self.mode,
            Replacement::Template(self.replace.clone()),
        )?
        .with_priority(self.priority);

        Ok(match &self.scope {
            Some(scope) => rule.with_scope(scope.clone()),
            None => rule,
        })
    }
}

/// Expand `~` and resolve relative paths against `base_dir`.
pub fn resolve_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}
