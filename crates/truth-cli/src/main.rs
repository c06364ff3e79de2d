mod cli;
mod commands;

use cli::{CheckParams, QueryParams, build_cli, verbosity};

fn main() {
    let matches = build_cli().get_matches();

    env_logger::Builder::new()
        .filter_level(verbosity(&matches))
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let code = match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into())
        }
        Some(("query", m)) => {
            let params = QueryParams::from_matches(m);
            commands::query::run(params.into())
        }
        _ => unreachable!("clap should have caught this"),
    };

    std::process::exit(code);
}
