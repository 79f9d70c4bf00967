use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use treepatch::validation::require_non_empty_vec;
use treepatch::{config, rewrite, RunReport};

use super::{exit_code_for_report, CmdResult, TargetArgs};

#[derive(Args)]
pub struct RunArgs {
    /// Rule file (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    command: &'static str,
    config: String,
    rules: usize,
    #[serde(flatten)]
    report: RunReport,
}

pub fn run(args: RunArgs) -> CmdResult<RunOutput> {
    let loaded = config::load(&args.config)?;
    let rule_set = loaded.file.rule_set()?;

    let mut options = loaded.file.run_options(&loaded.base_dir);
    args.target.apply_to(&mut options);
    require_non_empty_vec(
        &options.roots,
        "root",
        "Set \"roots\" in the rule file or pass --root",
    )?;

    let report = rewrite::run(&options, &rule_set);
    let exit_code = exit_code_for_report(&report);

    Ok((
        RunOutput {
            command: "run",
            config: loaded.path.display().to_string(),
            rules: rule_set.len(),
            report,
        },
        exit_code,
    ))
}
