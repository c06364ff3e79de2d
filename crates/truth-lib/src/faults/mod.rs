//! User-facing faults: problems in documents that do not stop the engine.
//!
//! Faults are collected, never thrown. Parse faults live with their
//! document and are recomputed when statements change; construction
//! faults live with the type context and are discarded on every reset.

mod message;
mod printer;


use std::ops::Range;

use crate::document::{DocumentId, StatementId};

pub use message::{Fault, FaultKind, Severity};
pub use printer::FaultsPrinter;

use message::RelatedInfo;

/// Where a fault points: a byte range inside one statement's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaultSite {
    pub document: DocumentId,
    pub statement: StatementId,
    pub range: Range<usize>,
}

impl FaultSite {
    pub fn new(document: DocumentId, statement: StatementId, range: Range<usize>) -> Self {
        Self {
            document,
            statement,
            range,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Faults {
    faults: Vec<Fault>,
}

#[must_use = "fault not emitted, call .emit()"]
pub struct FaultBuilder<'a> {
    faults: &'a mut Faults,
    fault: Fault,
}

impl Faults {
    pub fn new() -> Self {
        Self { faults: Vec::new() }
    }

    /// Create a fault with the given kind and site.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to add detail.
    pub fn report(&mut self, kind: FaultKind, site: FaultSite) -> FaultBuilder<'_> {
        FaultBuilder {
            faults: self,
            fault: Fault::with_default_message(kind, site),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fault> {
        self.faults.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.faults.iter().any(Fault::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.faults.iter().any(Fault::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.faults.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.faults.iter().filter(|f| f.is_warning()).count()
    }

    pub fn count_of(&self, kind: FaultKind) -> usize {
        self.faults.iter().filter(|f| f.kind == kind).count()
    }

    /// Faults located in `document`.
    pub fn in_document(&self, document: DocumentId) -> impl Iterator<Item = &Fault> {
        self.faults
            .iter()
            .filter(move |f| f.site.document == document)
    }

    pub fn extend(&mut self, other: Faults) {
        self.faults.extend(other.faults);
    }

    pub fn clear(&mut self) {
        self.faults.clear();
    }

    /// Drops faults that point into `statement`.
    pub(crate) fn forget_statement(&mut self, document: DocumentId, statement: StatementId) {
        self.faults
            .retain(|f| !(f.site.document == document && f.site.statement == statement));
    }

    /// Orders faults by document, statement and position.
    pub(crate) fn sort_by_site(&mut self, position_of: impl Fn(&FaultSite) -> (u32, usize)) {
        self.faults
            .sort_by_key(|f| (position_of(&f.site), f.site.range.start));
    }
}

impl<'a> FaultBuilder<'a> {
    /// Provide custom detail for this fault, rendered using the kind's template.
    pub fn message(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.fault.message = self.fault.kind.message(Some(&detail));
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, site: FaultSite) -> Self {
        self.fault.related.push(RelatedInfo::new(site, msg));
        self
    }

    pub fn emit(self) {
        log::debug!("fault: {}", self.fault);
        self.faults.faults.push(self.fault);
    }
}

impl<'a> IntoIterator for &'a Faults {
    type Item = &'a Fault;
    type IntoIter = std::slice::Iter<'a, Fault>;

    fn into_iter(self) -> Self::IntoIter {
        self.faults.iter()
    }
}
