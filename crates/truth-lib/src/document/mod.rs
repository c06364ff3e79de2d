//! Documents: ordered statements, their spans, and the spines that place
//! each declaration in the phrase graph.

mod edit;
mod statement;


use indexmap::IndexMap;
use truth_core::Interner;

use crate::faults::Faults;
use crate::phrase::PhraseId;
use crate::{Error, Result};

pub use edit::{EditOp, EditTransaction};
pub use statement::{Span, SpanSide, Statement, StatementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl DocumentId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identity of a statement, stable while the statement exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(u32);

impl StatementId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A declaration or annotation span: its statement plus its position on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanKey {
    pub statement: StatementId,
    pub index: usize,
}

impl SpanKey {
    pub fn new(statement: StatementId, index: usize) -> Self {
        Self { statement, index }
    }
}

/// What statement parsing needs from the program.
pub(crate) struct ParseContext<'a> {
    pub document: DocumentId,
    pub interner: &'a mut Interner,
    pub pattern_size_limit: usize,
}

/// The declarations leading from a document root down to one span.
pub type Spine<'d> = Vec<&'d Span>;

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    uri: String,
    root: PhraseId,
    statements: Vec<Statement>,
    next_statement: u32,
    faults: Faults,
    text: String,
    offsets: IndexMap<StatementId, usize>,
}

impl Document {
    pub(crate) fn parse(
        ctx: &mut ParseContext<'_>,
        uri: String,
        root: PhraseId,
        source: &str,
    ) -> Self {
        let mut document = Self {
            id: ctx.document,
            uri,
            root,
            statements: Vec::new(),
            next_statement: 0,
            faults: Faults::new(),
            text: String::new(),
            offsets: IndexMap::new(),
        };
        for line in source.split('\n') {
            let statement = document.parse_statement(ctx, line);
            document.statements.push(statement);
        }
        document.refresh();
        document
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The phrase every top-level declaration descends from.
    pub fn root(&self) -> PhraseId {
        self.root
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Faults found while parsing statements.
    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// The current text, statements joined by newlines.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn statement(&self, id: StatementId) -> Option<&Statement> {
        self.position_of(id).map(|pos| &self.statements[pos])
    }

    pub fn statement_at(&self, position: usize) -> Option<&Statement> {
        self.statements.get(position)
    }

    pub fn position_of(&self, id: StatementId) -> Option<usize> {
        self.offsets.get_index_of(&id)
    }

    /// Byte offset of the statement within [`Document::text`].
    pub fn statement_offset(&self, id: StatementId) -> Option<usize> {
        self.offsets.get(&id).copied()
    }

    pub fn span(&self, key: SpanKey) -> Option<&Span> {
        self.statement(key.statement)?.declarations.get(key.index)
    }

    /// The nearest preceding statement with a smaller indent, skipping no-ops.
    pub fn parent_position(&self, position: usize) -> Option<usize> {
        let indent = self.statements.get(position)?.indent;
        (0..position)
            .rev()
            .find(|&p| !self.statements[p].is_noop() && self.statements[p].indent < indent)
    }

    /// Positions of the enclosing statements, outermost first.
    pub fn ancestry_positions(&self, position: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.parent_position(position);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent_position(p);
        }
        chain.reverse();
        chain
    }

    /// Every path from the root to the declaration `key`.
    ///
    /// An ancestor with several declarations multiplies the spines: the
    /// result is the cartesian product over the ancestry.
    pub fn spines(&self, key: SpanKey) -> Vec<Spine<'_>> {
        let Some(position) = self.position_of(key.statement) else {
            return Vec::new();
        };
        let Some(target) = self.statements[position].declarations.get(key.index) else {
            return Vec::new();
        };

        let mut spines: Vec<Spine<'_>> = vec![Vec::new()];
        for ancestor in self.ancestry_positions(position) {
            let declarations = &self.statements[ancestor].declarations;
            spines = spines
                .into_iter()
                .flat_map(|spine| {
                    declarations.iter().map(move |decl| {
                        let mut next = spine.clone();
                        next.push(decl);
                        next
                    })
                })
                .collect();
        }
        for spine in &mut spines {
            spine.push(target);
        }
        spines
    }

    /// URIs named by top-level dependency statements, in order.
    pub fn dependency_uris<'i>(&self, interner: &'i Interner) -> Vec<&'i str> {
        self.statements
            .iter()
            .enumerate()
            .filter(|(pos, s)| s.is_dependency() && self.parent_position(*pos).is_none())
            .filter_map(|(_, s)| match s.declarations[0].subject {
                crate::subject::Subject::Uri(sym) => Some(interner.resolve(sym)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn insert(
        &mut self,
        ctx: &mut ParseContext<'_>,
        position: usize,
        text: &str,
    ) -> Result<StatementId> {
        if position > self.statements.len() {
            return Err(self.out_of_bounds(position));
        }
        let statement = self.parse_statement(ctx, text);
        let id = statement.id;
        self.statements.insert(position, statement);
        self.refresh();
        Ok(id)
    }

    pub(crate) fn delete(&mut self, position: usize, count: usize) -> Result<()> {
        let end = position.saturating_add(count);
        if end > self.statements.len() {
            return Err(self.out_of_bounds(end));
        }
        for statement in self.statements.drain(position..end) {
            self.faults.forget_statement(self.id, statement.id);
        }
        self.refresh();
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        ctx: &mut ParseContext<'_>,
        position: usize,
        text: &str,
    ) -> Result<StatementId> {
        if position >= self.statements.len() {
            return Err(self.out_of_bounds(position));
        }
        let old = self.statements[position].id;
        self.faults.forget_statement(self.id, old);
        let statement = self.parse_statement(ctx, text);
        let id = statement.id;
        self.statements[position] = statement;
        self.refresh();
        Ok(id)
    }

    fn parse_statement(&mut self, ctx: &mut ParseContext<'_>, text: &str) -> Statement {
        let id = StatementId(self.next_statement);
        self.next_statement += 1;
        Statement::parse(ctx, &mut self.faults, id, text)
    }

    fn out_of_bounds(&self, position: usize) -> Error {
        Error::PositionOutOfBounds {
            position,
            len: self.statements.len(),
        }
    }

    fn refresh(&mut self) {
        self.text.clear();
        self.offsets.clear();
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                self.text.push('\n');
            }
            self.offsets.insert(statement.id, self.text.len());
            self.text.push_str(&statement.text);
        }
    }
}

/// All documents loaded in a program.
#[derive(Debug, Default)]
pub struct Documents {
    documents: IndexMap<DocumentId, Document>,
    next_id: u32,
}

impl Documents {
    pub(crate) fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, document: Document) {
        self.documents.insert(document.id, document);
    }

    pub(crate) fn remove(&mut self, id: DocumentId) -> Option<Document> {
        self.documents.shift_remove(&id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Finds a loaded document by URI.
    ///
    /// A relative reference such as `shapes.truth` matches any loaded URI
    /// ending in `/shapes.truth`.
    pub fn by_uri(&self, uri: &str) -> Option<&Document> {
        self.documents
            .values()
            .find(|d| d.uri == uri)
            .or_else(|| {
                let suffix = format!("/{uri}");
                self.documents.values().find(|d| d.uri.ends_with(&suffix))
            })
    }

    /// Dependencies of `id`, depth-first, each listed once.
    pub fn traverse_dependencies(&self, id: DocumentId, interner: &Interner) -> Vec<DocumentId> {
        let mut out = Vec::new();
        self.collect_dependencies(id, interner, &mut out);
        out.retain(|&dep| dep != id);
        out
    }

    fn collect_dependencies(&self, id: DocumentId, interner: &Interner, out: &mut Vec<DocumentId>) {
        let Some(document) = self.get(id) else {
            return;
        };
        for uri in document.dependency_uris(interner) {
            let Some(dep) = self.by_uri(uri) else {
                continue;
            };
            if dep.id == id || out.contains(&dep.id) {
                continue;
            }
            out.push(dep.id);
            self.collect_dependencies(dep.id, interner, out);
        }
    }
}
