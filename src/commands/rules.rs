use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use treepatch::config;
use treepatch::rewrite::RuleSummary;

use super::CmdResult;

#[derive(Args)]
pub struct RulesArgs {
    /// Rule file (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesOutput {
    command: &'static str,
    config: String,
    /// Rules in the order they are applied.
    rules: Vec<RuleSummary>,
}

pub fn run(args: RulesArgs) -> CmdResult<RulesOutput> {
    let loaded = config::load(&args.config)?;
    let rule_set = loaded.file.rule_set()?;

    Ok((
        RulesOutput {
            command: "rules",
            config: loaded.path.display().to_string(),
            rules: rule_set.summaries(),
        },
        0,
    ))
}
