use clap::Args;
use serde::Serialize;

use treepatch::rewrite::{self, MatchMode, Replacement, Rule, RuleSet, RunOptions};
use treepatch::validation::{require_non_empty, require_non_empty_vec};
use treepatch::RunReport;

use super::{exit_code_for_report, CmdResult, TargetArgs};

#[derive(Args)]
pub struct ReplaceArgs {
    /// Text to find (exact substring unless --regex)
    #[arg(long, allow_hyphen_values = true)]
    find: String,

    /// Replacement text (`$1` / `${name}` are expanded only with --regex)
    #[arg(long, allow_hyphen_values = true)]
    replace: String,

    /// Treat --find as a regular expression
    #[arg(long)]
    regex: bool,

    /// Glob limiting which files are rewritten, e.g. `*.tsx`
    #[arg(long, value_name = "GLOB")]
    scope: Option<String>,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutput {
    command: &'static str,
    find: String,
    replace: String,
    mode: MatchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(flatten)]
    report: RunReport,
}

pub fn run(args: ReplaceArgs) -> CmdResult<ReplaceOutput> {
    require_non_empty(&args.find, "find", "--find must not be empty")?;
    require_non_empty_vec(&args.target.roots, "root", "Pass --root at least once")?;

    let mode = if args.regex {
        MatchMode::Regex
    } else {
        MatchMode::Literal
    };

    let mut rule = Rule::new(
        "replace",
        args.find.clone(),
        mode,
        Replacement::Template(args.replace.clone()),
    )?;
    if let Some(scope) = &args.scope {
        rule = rule.with_scope(scope.clone());
    }
    let rule_set = RuleSet::new(vec![rule]);

    let mut options = RunOptions::new(Vec::new(), Vec::new());
    args.target.apply_to(&mut options);

    let report = rewrite::run(&options, &rule_set);
    let exit_code = exit_code_for_report(&report);

    Ok((
        ReplaceOutput {
            command: "replace",
            find: args.find,
            replace: args.replace,
            mode,
            scope: args.scope,
            report,
        },
        exit_code,
    ))
}
