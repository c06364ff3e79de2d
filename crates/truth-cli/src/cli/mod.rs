mod args;
mod commands;
mod dispatch;


pub use commands::build_cli;
pub use dispatch::{CheckParams, QueryParams, verbosity};

/// Color output mode for rendered faults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Parses a `--color` value. Unknown values fall back to `Auto`.
    pub fn from_arg(value: Option<&str>) -> Self {
        match value {
            Some("always") => ColorChoice::Always,
            Some("never") => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }

    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            // Faults are the only colored output and go to stderr.
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// Splits a type path into its subjects.
///
/// Accepts the bare form `/Car/Engine/` as well as the displayed form
/// `memory://0//Car/Engine`, whose document part is dropped.
pub fn type_path(raw: &str) -> Vec<String> {
    let local = match raw.rfind("//") {
        Some(at) => &raw[at + 2..],
        None => raw,
    };
    local
        .split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
