//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("truth")
        .about("Type resolution for Truth documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(check_command())
        .subcommand(query_command())
}

/// Load documents and report faults.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Resolve every type and report faults")
        .after_help(
            r#"EXAMPLES:
  truth check shapes.truth              # one document
  truth check app.truth shapes.truth    # with its dependency
  truth check *.truth --strict          # fail on warnings too"#,
        )
        .arg(files_arg())
        .arg(strict_arg())
        .arg(color_arg())
}

/// Show the type at a path.
pub fn query_command() -> Command {
    Command::new("query")
        .about("Show the type at a path")
        .after_help(
            r#"EXAMPLES:
  truth query car.truth --path Car/Engine
  truth query car.truth -p SportsCar --full"#,
        )
        .arg(file_arg())
        .arg(path_arg())
        .arg(full_arg())
        .arg(color_arg())
}
