use std::path::PathBuf;

use truth_lib::{DocumentId, Faults, Program};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no documents given")]
    Empty,

    #[error(transparent)]
    Program(#[from] truth_lib::Error),
}

/// A document loaded from disk, with the path it came from.
pub struct Loaded {
    pub id: DocumentId,
    pub path: PathBuf,
}

/// Loads every file into one program, in argument order.
pub fn load_program(files: &[PathBuf]) -> Result<(Program, Vec<Loaded>), LoadError> {
    if files.is_empty() {
        return Err(LoadError::Empty);
    }
    let mut program = Program::new();
    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        let id = program.load_file(path)?;
        log::debug!("loaded {} as {id:?}", path.display());
        loaded.push(Loaded {
            id,
            path: path.clone(),
        });
    }
    Ok((program, loaded))
}

/// Renders the faults of each loaded document to stderr.
pub fn print_faults(program: &Program, faults: &Faults, loaded: &[Loaded], color: bool) {
    for entry in loaded {
        let Some(document) = program.document(entry.id) else {
            continue;
        };
        let path = entry.path.to_string_lossy();
        let rendered = faults
            .printer()
            .document(document)
            .path(&path)
            .colored(color)
            .render();
        if !rendered.is_empty() {
            eprintln!("{rendered}");
        }
    }
}
