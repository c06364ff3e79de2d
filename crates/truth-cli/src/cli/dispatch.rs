//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;
use log::LevelFilter;

use super::{ColorChoice, type_path};
use crate::commands::check::CheckArgs;
use crate::commands::query::QueryArgs;

pub struct CheckParams {
    pub files: Vec<PathBuf>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            files: m
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            files: p.files,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct QueryParams {
    pub file: PathBuf,
    pub path: Vec<String>,
    pub full: bool,
    pub color: ColorChoice,
}

impl QueryParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            file: m.get_one::<PathBuf>("file").cloned().unwrap_or_default(),
            path: m
                .get_one::<String>("path")
                .map(|path| type_path(path))
                .unwrap_or_default(),
            full: m.get_flag("full"),
            color: parse_color(m),
        }
    }
}

impl From<QueryParams> for QueryArgs {
    fn from(p: QueryParams) -> Self {
        Self {
            file: p.file,
            path: p.path,
            full: p.full,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    ColorChoice::from_arg(m.get_one::<String>("color").map(String::as_str))
}

/// Log level for the `-v` count. `RUST_LOG` still overrides it.
pub fn verbosity(m: &ArgMatches) -> LevelFilter {
    match m.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
