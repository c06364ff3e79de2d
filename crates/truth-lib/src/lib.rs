//! Truth: incremental type resolution for a hierarchical knowledge language.
//!
//! The engine is layered leaves first:
//! - `pattern` - regex-like pattern subjects with infix placeholders
//! - `document` - statements, spans, and edit transactions
//! - `phrase` - the location graph from document roots to subjects
//! - `parallel` - inheritance resolution and structural checks
//! - `types` - lazily materialized, version-scoped `Type` views
//! - `program` - the owner of all of the above
//! - `faults` - user-facing problems found along the way

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod document;
pub mod faults;
pub mod graph;
mod parallel;
pub mod pattern;
pub mod phrase;
pub mod program;
pub mod subject;
pub mod types;

mod invariants;

#[cfg(test)]
mod test_utils;

pub use document::{
    Document, DocumentId, EditTransaction, Span, SpanKey, Statement, StatementId,
};
pub use faults::{Fault, FaultKind, FaultSite, Faults, FaultsPrinter, Severity};
pub use pattern::{Pattern, PatternError};
pub use phrase::{ClarifierKey, Fork, PhraseId};
pub use program::{Program, ProgramConfig, ProgramEvent};
pub use subject::{Subject, Term};
pub use types::{Keyword, Type, TypeError};

/// Errors that can occur while managing a program's documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document {0:?} does not exist in this program")]
    UnknownDocument(DocumentId),

    #[error("a document with URI `{0}` is already loaded")]
    DuplicateUri(String),

    #[error("statement position {position} is out of bounds (document has {len} statements)")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for program operations.
pub type Result<T> = std::result::Result<T, Error>;
