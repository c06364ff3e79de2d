//! The program: documents, the phrase graph, and the type context.
//!
//! Every mutation goes through [`Program::add_document`],
//! [`Program::edit`] or [`Program::remove_document`]. Each advances the
//! version clock exactly once, which retires every type handed out
//! before it.

mod config;
mod events;

#[cfg(test)]
mod program_tests;

use std::path::Path;

use truth_core::{Interner, VersionClock, VersionStamp};

use crate::document::{
    Document, DocumentId, Documents, EditOp, EditTransaction, ParseContext, SpanKey,
};
use crate::faults::{FaultKind, FaultSite, Faults};
use crate::phrase::{PhraseId, Phrases, SpanLookup};
use crate::subject::{Subject, Term};
use crate::types::{Type, TypeContext};
use crate::{Error, Result};

pub use config::{DEFAULT_RECURSION_LIMIT, ProgramConfig};
pub use events::ProgramEvent;

pub(crate) use events::{Notifications, PendingUndeclare};

/// What type construction borrows from the program.
pub(crate) struct Env<'p> {
    pub phrases: &'p mut Phrases,
    pub documents: &'p Documents,
    pub interner: &'p Interner,
    pub version: VersionStamp,
    pub config: &'p ProgramConfig,
}

impl Env<'_> {
    pub fn display(&self, phrase: PhraseId) -> String {
        self.phrases.display(phrase, self.documents, self.interner)
    }
}

#[derive(Debug)]
pub struct Program {
    config: ProgramConfig,
    interner: Interner,
    clock: VersionClock,
    documents: Documents,
    phrases: Phrases,
    notifications: Notifications,
    types: TypeContext,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    pub fn new() -> Self {
        Self::with_config(ProgramConfig::default())
    }

    pub fn with_config(config: ProgramConfig) -> Self {
        Self {
            notifications: Notifications::new(config.emit_events),
            config,
            interner: Interner::new(),
            clock: VersionClock::new(),
            documents: Documents::default(),
            phrases: Phrases::new(),
            types: TypeContext::default(),
        }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn version(&self) -> VersionStamp {
        self.clock.now()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn phrases(&self) -> &Phrases {
        &self.phrases
    }

    pub(crate) fn types(&self) -> &TypeContext {
        &self.types
    }

    pub(crate) fn split_types(&mut self) -> (&mut TypeContext, Env<'_>) {
        let env = Env {
            phrases: &mut self.phrases,
            documents: &self.documents,
            interner: &self.interner,
            version: self.clock.now(),
            config: &self.config,
        };
        (&mut self.types, env)
    }

    /// Loads `source` under a generated `memory://` URI.
    pub fn add_document(&mut self, source: &str) -> DocumentId {
        let id = self.documents.allocate_id();
        self.insert_document(id, format!("memory://{}", id.as_u32()), source);
        id
    }

    pub fn add_document_with_uri(&mut self, uri: impl Into<String>, source: &str) -> Result<DocumentId> {
        let uri = uri.into();
        if self.documents.iter().any(|d| d.uri() == uri) {
            return Err(Error::DuplicateUri(uri));
        }
        let id = self.documents.allocate_id();
        self.insert_document(id, uri, source);
        Ok(id)
    }

    /// Reads and loads a file, using its path as the URI.
    pub fn load_file(&mut self, path: &Path) -> Result<DocumentId> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.add_document_with_uri(path.display().to_string(), &source)
    }

    fn insert_document(&mut self, id: DocumentId, uri: String, source: &str) {
        let root = self.phrases.create_root(id);
        let mut ctx = ParseContext {
            document: id,
            interner: &mut self.interner,
            pattern_size_limit: self.config.pattern_size_limit,
        };
        let document = Document::parse(&mut ctx, uri, root, source);
        log::debug!(
            "add document {} ({} statements)",
            document.uri(),
            document.len()
        );
        self.documents.insert(document);
        self.inflate_from(id, 0);
        self.commit();
    }

    pub fn remove_document(&mut self, id: DocumentId) -> Result<()> {
        if self.documents.get(id).is_none() {
            return Err(Error::UnknownDocument(id));
        }
        self.deflate_from(id, 0);
        if let Some(document) = self.documents.remove(id) {
            log::debug!("remove document {}", document.uri());
        }
        self.commit();
        Ok(())
    }

    /// Applies a batch of statement edits to one document.
    ///
    /// Statements from the first touched position onward are deflated
    /// against the old text, the edits are applied, and the same range is
    /// inflated against the new text. The version advances once. When an
    /// edit is out of bounds the edits before it stay applied and the
    /// error is returned.
    pub fn edit(&mut self, id: DocumentId, build: impl FnOnce(&mut EditTransaction)) -> Result<()> {
        if self.documents.get(id).is_none() {
            return Err(Error::UnknownDocument(id));
        }
        let mut tx = EditTransaction::new();
        build(&mut tx);
        let Some(first) = tx.first_position() else {
            return Ok(());
        };

        self.deflate_from(id, first);
        let mut outcome = Ok(());
        for op in tx.into_ops() {
            outcome = self.apply(id, op);
            if outcome.is_err() {
                break;
            }
        }
        self.inflate_from(id, first);
        self.commit();
        outcome
    }

    fn apply(&mut self, id: DocumentId, op: EditOp) -> Result<()> {
        let document = self
            .documents
            .get_mut(id)
            .ok_or(Error::UnknownDocument(id))?;
        let mut ctx = ParseContext {
            document: id,
            interner: &mut self.interner,
            pattern_size_limit: self.config.pattern_size_limit,
        };
        match op {
            EditOp::Insert { position, text } => document.insert(&mut ctx, position, &text).map(drop),
            EditOp::Delete { position, count } => document.delete(position, count),
            EditOp::Update { position, text } => document.update(&mut ctx, position, &text).map(drop),
        }
    }

    fn declaration_keys(&self, id: DocumentId, from: usize) -> Vec<SpanKey> {
        let Some(document) = self.documents.get(id) else {
            return Vec::new();
        };
        document
            .statements()
            .iter()
            .skip(from)
            .filter(|s| !s.is_noop())
            .flat_map(|s| s.declarations().iter().map(|span| span.key()))
            .collect()
    }

    fn inflate_from(&mut self, id: DocumentId, from: usize) {
        let Some(document) = self.documents.get(id) else {
            return;
        };
        for key in self.declaration_keys(id, from) {
            for phrase in self.phrases.from_span(document, key, SpanLookup::Create) {
                self.phrases.inflate(phrase, key, &mut self.notifications);
            }
        }
    }

    /// Deflates in reverse so nested declarations go before their containers.
    fn deflate_from(&mut self, id: DocumentId, from: usize) {
        let Some(document) = self.documents.get(id) else {
            return;
        };
        for key in self.declaration_keys(id, from).into_iter().rev() {
            for phrase in self.phrases.from_span(document, key, SpanLookup::Existing) {
                self.phrases.deflate(phrase, key, &mut self.notifications);
            }
        }
    }

    /// Ends a transaction: advances the clock and resolves deferred undeclares.
    fn commit(&mut self) {
        let version = self.clock.tick();
        log::debug!("program now at {version}");
        for pending in self.notifications.take_pending() {
            let still_declared = self.documents.get(pending.document).is_some_and(|document| {
                !self
                    .phrases
                    .peek(document.root(), &pending.subject, Some(&pending.clarifier))
                    .is_empty()
            });
            if !still_declared {
                self.notifications
                    .undeclare(pending.document, pending.subject);
            }
        }
    }

    /// Events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ProgramEvent> {
        self.notifications.drain()
    }

    fn subject_for(&self, text: &str) -> Option<Subject> {
        let text = text.trim();
        if text == truth_core::syntax::ANONYMOUS {
            return Some(Subject::Anonymous);
        }
        if text.ends_with(truth_core::syntax::TRUTH_EXTENSION) {
            return self.interner.get(text).map(Subject::Uri);
        }
        Term::lookup(&self.interner, text).map(Subject::Term)
    }

    /// Phrases at `path` below the document root. See [`Phrases::from_path_components`].
    pub fn phrases_at(&mut self, document: DocumentId, path: &[&str]) -> Vec<PhraseId> {
        let Some(root) = self.documents.get(document).map(Document::root) else {
            return Vec::new();
        };
        let Some(subjects) = path
            .iter()
            .map(|part| self.subject_for(part))
            .collect::<Option<Vec<_>>>()
        else {
            return Vec::new();
        };
        self.phrases.from_path_components(root, &subjects)
    }

    /// The type at `path` in `document`, e.g. `["Car", "Engine"]`.
    ///
    /// When homographs share the path, the first declared one is returned.
    pub fn query(&mut self, document: DocumentId, path: &[&str]) -> Option<Type> {
        let phrase = self.phrases_at(document, path).into_iter().next()?;
        Type::construct(self, phrase)
    }

    /// Materialized types named `name`, ignoring case. Settles the program first.
    pub fn lookup(&mut self, name: &str) -> Vec<Type> {
        self.settle();
        self.types.lookup(name)
    }

    /// Constructs every declared type, so that inbound indexes and
    /// construction faults are complete for the current version.
    pub fn settle(&mut self) {
        let version = self.version();
        self.types.ensure_current(version);
        if self.types.is_settled(version) {
            return;
        }
        log::debug!("settle {version}");
        let phrases: Vec<PhraseId> = self
            .documents
            .iter()
            .flat_map(|d| self.phrases.peek_recursive(d.root()))
            .collect();
        for phrase in phrases {
            Type::construct(self, phrase);
        }
        self.types.mark_settled();
    }

    /// Settles the program and collects every fault, ordered by location.
    pub fn verify(&mut self) -> Faults {
        self.settle();
        let mut faults = Faults::new();
        for document in self.documents.iter() {
            faults.extend(document.faults().clone());
            self.verify_dependencies(document, &mut faults);
            self.verify_homographs(document, &mut faults);
        }
        faults.extend(self.types.worker().faults().clone());

        let documents = &self.documents;
        faults.sort_by_site(|site: &FaultSite| {
            let position = documents
                .get(site.document)
                .and_then(|d| d.position_of(site.statement))
                .unwrap_or(usize::MAX);
            (site.document.as_u32(), position)
        });
        faults
    }

    fn verify_dependencies(&self, document: &Document, faults: &mut Faults) {
        for (position, statement) in document.statements().iter().enumerate() {
            if !statement.is_dependency() || document.parent_position(position).is_some() {
                continue;
            }
            let span = &statement.declarations()[0];
            let Subject::Uri(uri) = span.subject() else {
                continue;
            };
            let uri = self.interner.resolve(*uri);
            if self.documents.by_uri(uri).is_none() {
                faults
                    .report(
                        FaultKind::UnresolvedDependency,
                        FaultSite::new(document.id(), statement.id(), span.range()),
                    )
                    .message(uri)
                    .emit();
            }
        }
    }

    /// Homographs with members of their own make paths through them ambiguous.
    fn verify_homographs(&self, document: &Document, faults: &mut Faults) {
        let mut parents = vec![document.root()];
        parents.extend(self.phrases.peek_recursive(document.root()));
        for parent in parents {
            for subject in self.phrases.peek_subjects(parent) {
                let group = self.phrases.peek(parent, &subject, None);
                if group.len() < 2 || group.iter().all(|&p| self.phrases.peek_all(p).is_empty()) {
                    continue;
                }
                let name = subject.display(&self.interner).to_string();
                for &phrase in &group[1..] {
                    if let Some(site) = self.phrases.declaration_site(phrase, document) {
                        faults
                            .report(FaultKind::HomographAmbiguity, site)
                            .message(name.as_str())
                            .emit();
                    }
                }
            }
        }
    }
}
