//! Forks: the inheritance edges leaving a phrase.

use std::rc::Rc;

use truth_core::{Interner, VersionStamp};

use super::{PhraseId, Phrases};
use crate::document::Documents;
use crate::invariants;
use crate::subject::{Subject, Term};

/// Identity of an inheritance edge: a phrase and the position of the
/// annotation it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId {
    pub phrase: PhraseId,
    pub index: usize,
    /// Whether the annotation is a list term.
    pub is_list: bool,
}

/// One annotation of a phrase together with every phrase it could refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fork {
    predecessor: PhraseId,
    index: usize,
    successors: Vec<PhraseId>,
    term: Term,
    is_containment: bool,
}

impl Fork {
    pub fn predecessor(&self) -> PhraseId {
        self.predecessor
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Candidate targets, nearest scope first.
    pub fn successors(&self) -> &[PhraseId] {
        &self.successors
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn is_list(&self) -> bool {
        self.term.is_list()
    }

    /// Forks of unannotated nested declarations refer to their own name
    /// in an outer scope.
    pub fn is_containment(&self) -> bool {
        self.is_containment
    }

    pub fn edge(&self) -> EdgeId {
        EdgeId {
            phrase: self.predecessor,
            index: self.index,
            is_list: self.term.is_list(),
        }
    }
}

impl Phrases {
    /// Phrases visible from `id`, nearest first: its ancestors, the
    /// document root, then the roots of its dependencies.
    pub(crate) fn scope(&self, id: PhraseId, documents: &Documents, interner: &Interner) -> Vec<PhraseId> {
        let mut scope: Vec<PhraseId> = self.ancestry(id);
        scope.pop();
        scope.reverse();
        scope.push(self.root_of(id));
        for dependency in documents.traverse_dependencies(self.document(id), interner) {
            if let Some(document) = documents.get(dependency) {
                scope.push(document.root());
            }
        }
        scope
    }

    /// Inheritance edges leaving `id`, cached per program version.
    pub fn outbounds(
        &mut self,
        id: PhraseId,
        documents: &Documents,
        interner: &Interner,
        version: VersionStamp,
    ) -> Rc<[Fork]> {
        invariants::ensure_real(self.is_hypothetical(id), "compute outbounds of");
        if let Some(forks) = self.cached_outbounds(id, version) {
            return forks;
        }

        let clarifiers = self.clarifiers(id);
        let (terms, is_containment) = match self.terminal(id).as_term() {
            Some(term) if clarifiers.is_empty() && self.length(id) > 1 => (vec![term], true),
            _ => (clarifiers.to_vec(), false),
        };

        let scope = self.scope(id, documents, interner);
        let forks: Rc<[Fork]> = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| {
                let singular = Subject::Term(term.singular());
                let successors = scope
                    .iter()
                    .flat_map(|&level| self.peek(level, &singular, None))
                    .filter(|&phrase| phrase != id)
                    .collect();
                Fork {
                    predecessor: id,
                    index,
                    successors,
                    term,
                    is_containment,
                }
            })
            .collect();

        log::trace!("outbounds of {id:?}: {} forks", forks.len());
        self.cache_outbounds(id, version, forks.clone());
        forks
    }
}
