//! The phrase graph: every location a declaration can occupy.
//!
//! A phrase is addressed by the subjects leading to it from a document
//! root, plus the clarifier key of its annotations. Phrases with the same
//! path but different annotations are homographs; statements that inflate
//! the same phrase are fragments of it. Hypothetical phrases stand in for
//! locations no statement declares and are never registered in the graph.

mod outbounds;

#[cfg(test)]
mod phrase_tests;

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use truth_core::{Interner, VersionStamp, syntax};

use crate::document::{Document, DocumentId, Documents, Span, SpanKey, StatementId};
use crate::faults::FaultSite;
use crate::invariants;
use crate::pattern::{Infix, InfixFlags};
use crate::program::{Notifications, PendingUndeclare};
use crate::subject::{Subject, Term};

pub use outbounds::{EdgeId, Fork};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhraseId(u32);

impl PhraseId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identity of an annotation set: sorted term ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ClarifierKey(String);

impl ClarifierKey {
    pub fn from_terms(terms: &[Term]) -> Self {
        let mut ids: Vec<u64> = terms.iter().map(|t| t.id()).collect();
        ids.sort_unstable();
        let parts: Vec<String> = ids.iter().map(u64::to_string).collect();
        Self(parts.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug)]
struct PhraseNode {
    document: DocumentId,
    parent: PhraseId,
    terminal: Subject,
    clarifiers: Vec<Term>,
    clarifier_key: ClarifierKey,
    length: usize,
    is_hypothetical: bool,
    is_disposed: bool,
    inflating_spans: IndexSet<SpanKey>,
    forwardings: IndexMap<Subject, IndexMap<ClarifierKey, PhraseId>>,
    outbounds: Option<(VersionStamp, Rc<[Fork]>)>,
}

/// Whether span resolution may add phrases to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanLookup {
    Create,
    Existing,
}

/// Arena of all phrases ever created by a program.
#[derive(Debug, Default)]
pub struct Phrases {
    nodes: Vec<PhraseNode>,
    hypotheticals: IndexMap<(PhraseId, Subject), PhraseId>,
}

impl Phrases {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: PhraseId) -> &PhraseNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: PhraseId) -> &mut PhraseNode {
        &mut self.nodes[id.0 as usize]
    }

    fn push(&mut self, node: PhraseNode) -> PhraseId {
        let id = PhraseId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn create_root(&mut self, document: DocumentId) -> PhraseId {
        let id = PhraseId(self.nodes.len() as u32);
        self.push(PhraseNode {
            document,
            parent: id,
            terminal: Subject::Anonymous,
            clarifiers: Vec::new(),
            clarifier_key: ClarifierKey::default(),
            length: 0,
            is_hypothetical: false,
            is_disposed: false,
            inflating_spans: IndexSet::new(),
            forwardings: IndexMap::new(),
            outbounds: None,
        })
    }

    fn create(
        &mut self,
        parent: PhraseId,
        terminal: Subject,
        clarifiers: Vec<Term>,
        is_hypothetical: bool,
    ) -> PhraseId {
        let parent_node = self.node(parent);
        let clarifier_key = ClarifierKey::from_terms(&clarifiers);
        let node = PhraseNode {
            document: parent_node.document,
            parent,
            terminal: terminal.clone(),
            clarifiers,
            clarifier_key: clarifier_key.clone(),
            length: parent_node.length + 1,
            is_hypothetical,
            is_disposed: false,
            inflating_spans: IndexSet::new(),
            forwardings: IndexMap::new(),
            outbounds: None,
        };
        let id = self.push(node);
        if !is_hypothetical {
            self.node_mut(parent)
                .forwardings
                .entry(terminal)
                .or_default()
                .insert(clarifier_key, id);
        }
        id
    }

    /// The unregistered phrase standing for `subject` under `parent`.
    /// There is at most one per location.
    pub(crate) fn hypothetical(&mut self, parent: PhraseId, subject: &Subject) -> PhraseId {
        if let Some(&id) = self.hypotheticals.get(&(parent, subject.clone())) {
            return id;
        }
        let id = self.create(parent, subject.clone(), Vec::new(), true);
        self.hypotheticals.insert((parent, subject.clone()), id);
        id
    }

    /// Number of phrases ever allocated, hypothetical ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn document(&self, id: PhraseId) -> DocumentId {
        self.node(id).document
    }

    /// The containing phrase. Roots are their own parent.
    pub fn parent(&self, id: PhraseId) -> PhraseId {
        self.node(id).parent
    }

    pub fn terminal(&self, id: PhraseId) -> &Subject {
        &self.node(id).terminal
    }

    pub fn clarifiers(&self, id: PhraseId) -> &[Term] {
        &self.node(id).clarifiers
    }

    pub fn clarifier_key(&self, id: PhraseId) -> &ClarifierKey {
        &self.node(id).clarifier_key
    }

    /// Number of subjects from the root; roots have length zero.
    pub fn length(&self, id: PhraseId) -> usize {
        self.node(id).length
    }

    pub fn is_root(&self, id: PhraseId) -> bool {
        self.node(id).length == 0
    }

    pub fn is_hypothetical(&self, id: PhraseId) -> bool {
        self.node(id).is_hypothetical
    }

    pub fn is_disposed(&self, id: PhraseId) -> bool {
        self.node(id).is_disposed
    }

    pub fn is_list_intrinsic(&self, id: PhraseId) -> bool {
        self.node(id).terminal.is_list()
    }

    pub fn is_list_extrinsic(&self, id: PhraseId) -> bool {
        self.node(id).clarifiers.iter().any(|t| t.is_list())
    }

    pub fn inflating_spans(&self, id: PhraseId) -> impl Iterator<Item = SpanKey> + '_ {
        self.node(id).inflating_spans.iter().copied()
    }

    /// Distinct statements whose declarations inflate this phrase.
    pub fn statements(&self, id: PhraseId) -> Vec<StatementId> {
        let mut out: Vec<StatementId> = Vec::new();
        for key in &self.node(id).inflating_spans {
            if !out.contains(&key.statement) {
                out.push(key.statement);
            }
        }
        out
    }

    /// Declaration spans that inflate this phrase.
    pub fn declarations<'d>(&self, id: PhraseId, document: &'d Document) -> Vec<&'d Span> {
        self.node(id)
            .inflating_spans
            .iter()
            .filter_map(|&key| document.span(key))
            .collect()
    }

    /// Annotation spans of every statement supporting this phrase.
    pub fn annotations<'d>(&self, id: PhraseId, document: &'d Document) -> Vec<&'d Span> {
        self.statements(id)
            .into_iter()
            .filter_map(|statement| document.statement(statement))
            .flat_map(|statement| statement.annotations())
            .collect()
    }

    /// Phrases under `id` with the given subject, optionally narrowed by clarifier key.
    pub fn peek(&self, id: PhraseId, subject: &Subject, key: Option<&ClarifierKey>) -> Vec<PhraseId> {
        let Some(by_key) = self.node(id).forwardings.get(subject) else {
            return Vec::new();
        };
        match key {
            Some(key) => by_key.get(key).copied().into_iter().collect(),
            None => by_key.values().copied().collect(),
        }
    }

    /// Every phrase directly under `id`.
    pub fn peek_all(&self, id: PhraseId) -> Vec<PhraseId> {
        self.node(id)
            .forwardings
            .values()
            .flat_map(|by_key| by_key.values().copied())
            .collect()
    }

    pub fn peek_subjects(&self, id: PhraseId) -> Vec<Subject> {
        self.node(id).forwardings.keys().cloned().collect()
    }

    /// Every phrase below `id`, depth-first.
    pub fn peek_recursive(&self, id: PhraseId) -> Vec<PhraseId> {
        let mut out = Vec::new();
        let mut stack: Vec<PhraseId> = self.peek_all(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.peek_all(next).into_iter().rev());
        }
        out
    }

    /// Phrases from the first level down to `id`, excluding the root.
    pub fn ancestry(&self, id: PhraseId) -> Vec<PhraseId> {
        let mut chain = Vec::new();
        let mut current = id;
        while !self.is_root(current) {
            chain.push(current);
            current = self.parent(current);
        }
        chain.reverse();
        chain
    }

    pub fn root_of(&self, id: PhraseId) -> PhraseId {
        let mut current = id;
        while !self.is_root(current) {
            current = self.parent(current);
        }
        current
    }

    /// The sibling declaring the same name with opposite list-ness.
    pub fn intrinsic_extrinsic_bridge(&self, id: PhraseId) -> Option<PhraseId> {
        let term = self.terminal(id).as_term()?;
        if self.is_root(id) {
            return None;
        }
        let opposite = Subject::Term(Term::new(term.name(), !term.is_list()));
        self.peek(self.parent(id), &opposite, None).into_iter().next()
    }

    /// The infix of an enclosing pattern that this phrase populates.
    pub fn parent_infix<'a>(&'a self, id: PhraseId, interner: &Interner) -> Option<&'a Infix> {
        let parent = self.parent(id);
        let pattern = self.terminal(parent).as_pattern()?;
        let term = self.terminal(id).as_term()?;
        let name = interner.resolve(term.name());
        pattern
            .infixes(InfixFlags::NONE)
            .into_iter()
            .find(|infix| infix.lhs.iter().any(|lhs| lhs == name))
    }

    /// Resolves the phrases a declaration span occupies, one per spine.
    pub fn from_span(
        &mut self,
        document: &Document,
        key: SpanKey,
        lookup: SpanLookup,
    ) -> Vec<PhraseId> {
        let mut out = Vec::new();
        'spines: for spine in document.spines(key) {
            let mut current = document.root();
            for span in spine {
                if span.is_cruft_marker() {
                    continue 'spines;
                }
                let Some(statement) = document.statement(span.key().statement) else {
                    continue 'spines;
                };
                let clarifiers = statement.clarifiers();
                let clarifier_key = ClarifierKey::from_terms(&clarifiers);
                let found = self.peek(current, span.subject(), Some(&clarifier_key));
                current = match (found.first(), lookup) {
                    (Some(&next), _) => next,
                    (None, SpanLookup::Create) => {
                        self.create(current, span.subject().clone(), clarifiers, false)
                    }
                    (None, SpanLookup::Existing) => continue 'spines,
                };
            }
            if !out.contains(&current) {
                out.push(current);
            }
        }
        out
    }

    /// Follows `path` from `root`, once per homograph of the first subject.
    ///
    /// Missing links below the first level become hypothetical phrases.
    /// An unknown first subject, or a homograph at any deeper level,
    /// yields no result.
    pub fn from_path_components(&mut self, root: PhraseId, path: &[Subject]) -> Vec<PhraseId> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for start in self.peek(root, first, None) {
            match self.walk_unambiguous(start, rest) {
                Some(found) => out.push(found),
                None => return Vec::new(),
            }
        }
        out
    }

    /// Like [`Phrases::from_path_components`], picking the first-level
    /// homograph by its annotations. Returns `None` when no such homograph
    /// exists or a deeper level is ambiguous.
    pub fn from_path_components_clarified(
        &mut self,
        root: PhraseId,
        path: &[Subject],
        clarifier: &ClarifierKey,
    ) -> Option<PhraseId> {
        let (first, rest) = path.split_first()?;
        let start = self.peek(root, first, Some(clarifier)).into_iter().next()?;
        self.walk_unambiguous(start, rest)
    }

    fn walk_unambiguous(&mut self, start: PhraseId, path: &[Subject]) -> Option<PhraseId> {
        let mut current = start;
        for subject in path {
            let found = self.peek(current, subject, None);
            current = match found.as_slice() {
                [] => self.hypothetical(current, subject),
                [single] => *single,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Records that `span` declares phrase `id`.
    pub(crate) fn inflate(&mut self, id: PhraseId, span: SpanKey, notes: &mut Notifications) {
        let node = self.node_mut(id);
        invariants::ensure_real(node.is_hypothetical, "inflate");
        let first = node.inflating_spans.is_empty();
        node.inflating_spans.insert(span);
        if first && node.length == 1 && !notes.is_pending(node.document, &node.terminal) {
            notes.declare(node.document, node.terminal.clone());
        }
    }

    /// Removes `span` from phrase `id`, disposing the phrase when nothing declares it.
    pub(crate) fn deflate(&mut self, id: PhraseId, span: SpanKey, notes: &mut Notifications) {
        let node = self.node_mut(id);
        invariants::ensure_real(node.is_hypothetical, "deflate");
        node.inflating_spans.shift_remove(&span);
        if node.inflating_spans.is_empty() {
            self.dispose(id, notes);
        }
    }

    pub(crate) fn dispose(&mut self, id: PhraseId, notes: &mut Notifications) {
        let node = self.node_mut(id);
        invariants::ensure_not_root(node.length);
        node.is_disposed = true;
        let parent = node.parent;
        let terminal = node.terminal.clone();
        let clarifier = node.clarifier_key.clone();
        let document = node.document;
        let length = node.length;

        let forwardings = &mut self.node_mut(parent).forwardings;
        if let Some(by_key) = forwardings.get_mut(&terminal) {
            by_key.shift_remove(&clarifier);
            if by_key.is_empty() {
                forwardings.shift_remove(&terminal);
            }
        }

        if length == 1 {
            notes.defer_undeclare(PendingUndeclare {
                document,
                subject: terminal,
                clarifier,
            });
        }
    }

    /// Source text of annotations `index..index + count` of this phrase's
    /// single statement. Empty when the phrase has several fragments.
    pub fn slice(&self, id: PhraseId, document: &Document, index: usize, count: usize) -> String {
        let statements = self.statements(id);
        let ([statement], true) = (statements.as_slice(), count > 0) else {
            return String::new();
        };
        let Some(statement) = document.statement(*statement) else {
            return String::new();
        };
        let annotations = statement.annotations();
        let Some(first) = annotations.get(index) else {
            return String::new();
        };
        let end = index.saturating_add(count - 1).min(annotations.len() - 1);
        statement.text()[first.range().start..annotations[end].range().end].to_string()
    }

    /// Site of the first declaration of this phrase.
    pub(crate) fn declaration_site(&self, id: PhraseId, document: &Document) -> Option<FaultSite> {
        let key = self.node(id).inflating_spans.first()?;
        let span = document.span(*key)?;
        Some(FaultSite::new(document.id(), key.statement, span.range()))
    }

    /// Site of the annotation a fork was read from.
    pub(crate) fn fork_site(&self, fork: &Fork, document: &Document) -> Option<FaultSite> {
        let term = Subject::Term(fork.term());
        for key in &self.node(fork.predecessor()).inflating_spans {
            let Some(statement) = document.statement(key.statement) else {
                continue;
            };
            if let Some(span) = statement.annotations().iter().find(|a| a.subject() == &term) {
                return Some(FaultSite::new(document.id(), key.statement, span.range()));
            }
        }
        self.declaration_site(fork.predecessor(), document)
    }

    /// `uri//A/B` form of this phrase.
    pub fn display(&self, id: PhraseId, documents: &Documents, interner: &Interner) -> String {
        self.render(id, documents, interner, false)
    }

    /// Like [`display`](Self::display), with each level's annotations,
    /// e.g. `uri//Mercury:Planet/Orbit:`.
    pub fn display_clarified(&self, id: PhraseId, documents: &Documents, interner: &Interner) -> String {
        self.render(id, documents, interner, true)
    }

    fn render(&self, id: PhraseId, documents: &Documents, interner: &Interner, clarified: bool) -> String {
        let uri = documents
            .get(self.document(id))
            .map(Document::uri)
            .unwrap_or_default();
        let mut out = format!("{uri}{}", syntax::TERMINAL);
        for phrase in self.ancestry(id) {
            out.push(syntax::TERMINAL);
            out.push_str(&self.terminal(phrase).display(interner).to_string());
            if clarified {
                let clarifiers: Vec<String> = self
                    .node(phrase)
                    .clarifiers
                    .iter()
                    .map(|t| t.display(interner).to_string())
                    .collect();
                out.push(':');
                out.push_str(&clarifiers.join(","));
            }
        }
        out
    }

    pub(crate) fn cached_outbounds(&self, id: PhraseId, version: VersionStamp) -> Option<Rc<[Fork]>> {
        match &self.node(id).outbounds {
            Some((stamp, forks)) if *stamp == version => Some(forks.clone()),
            _ => None,
        }
    }

    pub(crate) fn cache_outbounds(&mut self, id: PhraseId, version: VersionStamp, forks: Rc<[Fork]>) {
        self.node_mut(id).outbounds = Some((version, forks));
    }
}
