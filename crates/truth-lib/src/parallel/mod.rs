//! Parallels: inheritance resolution over the phrase graph.
//!
//! Every phrase a type is built from gets a parallel. Explicit parallels
//! belong to declared phrases and own their bases; implicit parallels
//! stand in for hypothetical phrases and only relay the parallels above
//! them. Two parallels are parallel to each other when they occupy the
//! same name in containers related by inheritance.

mod contract;
mod cruft;
pub(crate) mod provider;
mod sanitizer;
mod worker;

#[cfg(test)]
mod parallel_tests;

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};

use crate::invariants;
use crate::phrase::{EdgeId, PhraseId};

pub(crate) use contract::Contract;
pub(crate) use cruft::CruftCache;
pub(crate) use worker::ConstructionWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParallelId(u32);

#[derive(Debug)]
pub(crate) struct Explicit {
    /// Accepted bases, keyed by the edge they were read from.
    bases: IndexMap<EdgeId, ParallelId>,
    contract: Contract,
    bridge: Option<ParallelId>,
}

#[derive(Debug)]
pub(crate) enum ParallelKind {
    Explicit(Explicit),
    Implicit,
}

#[derive(Debug)]
pub(crate) struct ParallelData {
    phrase: PhraseId,
    container: Option<ParallelId>,
    parallels: Vec<ParallelId>,
    kind: ParallelKind,
}

/// All parallels of one construction generation.
#[derive(Debug, Default)]
pub(crate) struct ParallelGraph {
    nodes: Vec<ParallelData>,
    by_phrase: HashMap<PhraseId, ParallelId>,
    cruft: CruftCache,
}

impl ParallelGraph {
    fn data(&self, id: ParallelId) -> &ParallelData {
        &self.nodes[id.0 as usize]
    }

    fn data_mut(&mut self, id: ParallelId) -> &mut ParallelData {
        &mut self.nodes[id.0 as usize]
    }

    fn explicit(&self, id: ParallelId) -> Option<&Explicit> {
        match &self.data(id).kind {
            ParallelKind::Explicit(explicit) => Some(explicit),
            ParallelKind::Implicit => None,
        }
    }

    fn explicit_mut(&mut self, id: ParallelId) -> Option<&mut Explicit> {
        match &mut self.data_mut(id).kind {
            ParallelKind::Explicit(explicit) => Some(explicit),
            ParallelKind::Implicit => None,
        }
    }

    fn push(&mut self, data: ParallelData) -> ParallelId {
        let id = ParallelId(self.nodes.len() as u32);
        self.by_phrase.insert(data.phrase, id);
        self.nodes.push(data);
        id
    }

    pub fn create_explicit(&mut self, phrase: PhraseId, container: Option<ParallelId>) -> ParallelId {
        self.push(ParallelData {
            phrase,
            container,
            parallels: Vec::new(),
            kind: ParallelKind::Explicit(Explicit {
                bases: IndexMap::new(),
                contract: Contract::default(),
                bridge: None,
            }),
        })
    }

    pub fn create_implicit(
        &mut self,
        phrase: PhraseId,
        container: Option<ParallelId>,
        parallels: Vec<ParallelId>,
    ) -> ParallelId {
        self.push(ParallelData {
            phrase,
            container,
            parallels,
            kind: ParallelKind::Implicit,
        })
    }

    pub fn get(&self, phrase: PhraseId) -> Option<ParallelId> {
        self.by_phrase.get(&phrase).copied()
    }

    pub fn phrase(&self, id: ParallelId) -> PhraseId {
        self.data(id).phrase
    }

    pub fn container(&self, id: ParallelId) -> Option<ParallelId> {
        self.data(id).container
    }

    /// Outermost first, ending with `id`.
    pub fn containment(&self, id: ParallelId) -> Vec<ParallelId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(container) = self.container(current) {
            chain.push(container);
            current = container;
        }
        chain.reverse();
        chain
    }

    pub fn parallels(&self, id: ParallelId) -> &[ParallelId] {
        &self.data(id).parallels
    }

    pub fn is_explicit(&self, id: ParallelId) -> bool {
        self.explicit(id).is_some()
    }

    /// Sets the parallels of an explicit parallel and derives its contract.
    pub fn set_parallels(&mut self, id: ParallelId, parallels: Vec<ParallelId>) {
        let conditions: IndexSet<ParallelId> = self
            .effective_explicit(&parallels)
            .into_iter()
            .flat_map(|p| self.each_base(p))
            .collect();
        let data = self.data_mut(id);
        data.parallels = parallels;
        if let ParallelKind::Explicit(explicit) = &mut data.kind {
            explicit.contract = Contract::new(conditions.into_iter().collect());
        }
    }

    /// Explicit parallels reachable through implicit ones.
    pub fn effective_explicit(&self, parallels: &[ParallelId]) -> Vec<ParallelId> {
        let mut out = Vec::new();
        let mut queue: VecDeque<ParallelId> = parallels.iter().copied().collect();
        let mut seen = IndexSet::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            if self.is_explicit(next) {
                out.push(next);
            } else {
                queue.extend(self.parallels(next));
            }
        }
        out
    }

    pub fn cruft(&self) -> &CruftCache {
        &self.cruft
    }

    pub fn cruft_mut(&mut self) -> &mut CruftCache {
        &mut self.cruft
    }

    /// Accepted bases and the edges they came from, skipping cruft.
    pub fn base_edges(&self, id: ParallelId) -> Vec<(EdgeId, ParallelId)> {
        let Some(explicit) = self.explicit(id) else {
            return Vec::new();
        };
        explicit
            .bases
            .iter()
            .filter(|(edge, _)| !self.cruft.has_edge(**edge))
            .map(|(edge, base)| (*edge, *base))
            .collect()
    }

    pub fn each_base(&self, id: ParallelId) -> Vec<ParallelId> {
        let mut out: Vec<ParallelId> = Vec::new();
        for (_, base) in self.base_edges(id) {
            if !out.contains(&base) {
                out.push(base);
            }
        }
        out
    }

    /// Every transitive base, nearest first, excluding `id` itself.
    pub fn each_base_deep(&self, id: ParallelId) -> Vec<ParallelId> {
        let mut seen: IndexSet<ParallelId> = IndexSet::new();
        let mut queue = VecDeque::from(self.each_base(id));
        while let Some(next) = queue.pop_front() {
            if next == id || !seen.insert(next) {
                continue;
            }
            queue.extend(self.each_base(next));
        }
        seen.into_iter().collect()
    }

    pub fn has_edge(&self, id: ParallelId, edge: EdgeId) -> bool {
        self.explicit(id)
            .is_some_and(|explicit| explicit.bases.contains_key(&edge))
    }

    /// Whether `base` is a direct or transitive base of `id`.
    pub fn has_base(&self, id: ParallelId, base: ParallelId) -> bool {
        self.each_base_deep(id).contains(&base)
    }

    pub fn base_count(&self, id: ParallelId) -> usize {
        self.base_edges(id).len()
    }

    /// The base read from the earliest edge.
    ///
    /// # Panics
    /// When the parallel has no bases.
    pub fn first_base(&self, id: ParallelId) -> (EdgeId, ParallelId) {
        match self.base_edges(id).first() {
            Some(first) => *first,
            None => panic!("broken parallel invariant: {id:?} has no bases"),
        }
    }

    /// Nesting depth of list-ness along the first-base chain.
    pub fn list_dimensionality(&self, id: ParallelId) -> usize {
        let mut depth = 0;
        let mut current = id;
        let mut seen = IndexSet::new();
        while seen.insert(current) && self.base_count(current) > 0 {
            let (edge, base) = self.first_base(current);
            if edge.is_list {
                depth += 1;
            }
            current = base;
        }
        depth
    }

    pub(crate) fn insert_base(&mut self, id: ParallelId, edge: EdgeId, base: ParallelId) {
        let explicit = self
            .explicit_mut(id)
            .unwrap_or_else(|| panic!("broken parallel invariant: {id:?} is implicit"));
        invariants::ensure_new_edge(explicit.bases.contains_key(&edge));
        explicit.bases.insert(edge, base);
    }

    pub(crate) fn contract(&self, id: ParallelId) -> Option<&Contract> {
        self.explicit(id).map(|e| &e.contract)
    }

    pub(crate) fn contract_mut(&mut self, id: ParallelId) -> Option<&mut Contract> {
        self.explicit_mut(id).map(|e| &mut e.contract)
    }

    pub fn bridge_of(&self, id: ParallelId) -> Option<ParallelId> {
        self.explicit(id).and_then(|e| e.bridge)
    }

    /// Links the list and non-list parallels declaring the same name.
    ///
    /// # Panics
    /// When either side is already bridged, or both share list-ness.
    pub fn bridge(&mut self, a: ParallelId, b: ParallelId, same_polarity: bool) {
        let already = self.bridge_of(a).is_some() || self.bridge_of(b).is_some();
        invariants::ensure_bridgeable(already, same_polarity);
        if let Some(explicit) = self.explicit_mut(a) {
            explicit.bridge = Some(b);
        }
        if let Some(explicit) = self.explicit_mut(b) {
            explicit.bridge = Some(a);
        }
    }

    /// Explicit parallels whose subject satisfies `filter`, in creation order.
    pub fn explicit_where(&self, mut filter: impl FnMut(PhraseId) -> bool) -> Vec<ParallelId> {
        (0..self.nodes.len() as u32)
            .map(ParallelId)
            .filter(|&p| self.is_explicit(p) && filter(self.phrase(p)))
            .collect()
    }
}
