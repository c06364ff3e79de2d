use std::path::PathBuf;

use super::loader::{load_program, print_faults};

pub struct CheckArgs {
    pub files: Vec<PathBuf>,
    pub strict: bool,
    pub color: bool,
}

/// Returns the process exit code.
pub fn run(args: CheckArgs) -> i32 {
    let (mut program, loaded) = match load_program(&args.files) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    let faults = program.verify();
    log::debug!(
        "{} errors, {} warnings",
        faults.error_count(),
        faults.warning_count()
    );
    print_faults(&program, &faults, &loaded, args.color);

    let failed = faults.has_errors() || (args.strict && faults.has_warnings());
    // Silent on success (like cargo check)
    i32::from(failed)
}
