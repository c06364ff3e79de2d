//! Declare/undeclare notifications for top-level subjects.

use crate::document::DocumentId;
use crate::phrase::ClarifierKey;
use crate::subject::Subject;

/// A change to the set of subjects declared at a document's top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramEvent {
    Declare { document: DocumentId, subject: Subject },
    Undeclare { document: DocumentId, subject: Subject },
}

#[derive(Debug, Clone)]
pub(crate) struct PendingUndeclare {
    pub document: DocumentId,
    pub subject: Subject,
    pub clarifier: ClarifierKey,
}

/// Events raised while inflating and deflating phrases.
#[derive(Debug)]
pub(crate) struct Notifications {
    enabled: bool,
    events: Vec<ProgramEvent>,
    pending: Vec<PendingUndeclare>,
}

impl Notifications {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_pending(&self, document: DocumentId, subject: &Subject) -> bool {
        self.pending
            .iter()
            .any(|p| p.document == document && &p.subject == subject)
    }

    pub fn declare(&mut self, document: DocumentId, subject: Subject) {
        if self.enabled {
            log::trace!("declare {subject:?} in {document:?}");
            self.events.push(ProgramEvent::Declare { document, subject });
        }
    }

    pub fn defer_undeclare(&mut self, pending: PendingUndeclare) {
        self.pending.push(pending);
    }

    /// Takes the undeclares queued during the current transaction.
    pub fn take_pending(&mut self) -> Vec<PendingUndeclare> {
        std::mem::take(&mut self.pending)
    }

    pub fn undeclare(&mut self, document: DocumentId, subject: Subject) {
        if self.enabled {
            log::trace!("undeclare {subject:?} in {document:?}");
            self.events.push(ProgramEvent::Undeclare { document, subject });
        }
    }

    pub fn drain(&mut self) -> Vec<ProgramEvent> {
        std::mem::take(&mut self.events)
    }
}
