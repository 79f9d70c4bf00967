use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{replace, rules, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "treepatch")]
#[command(version = VERSION)]
#[command(about = "Apply ordered find/replace rules across source trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rule file to its roots
    Run(run::RunArgs),
    /// Apply a single ad hoc find/replace rule
    Replace(replace::ReplaceArgs),
    /// List a rule file's rules in application order
    Rules(rules::RulesArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);

    if let Err(err) = output::print_json_result(json_result, exit_code) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
