//! Builds parallels on demand.
//!
//! `drill` walks from a phrase's surface (top-level) phrase down to the
//! phrase itself, creating a parallel at each level. `excavate` resolves
//! the bases of an explicit parallel by drilling each fork's successors.
//! Both are memoized per generation, so the graph only grows as far as
//! the queries against it reach.

use indexmap::{IndexMap, IndexSet};

use super::{ParallelGraph, ParallelId, sanitizer};
use crate::faults::{FaultKind, Faults};
use crate::invariants;
use crate::phrase::{EdgeId, Fork, PhraseId};
use crate::program::Env;
use crate::subject::Subject;

#[derive(Debug, Default)]
pub(crate) struct ConstructionWorker {
    graph: ParallelGraph,
    faults: Faults,
    excavated: IndexSet<ParallelId>,
    depth: usize,
}

impl ConstructionWorker {
    pub fn graph(&self) -> &ParallelGraph {
        &self.graph
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// The parallel of `phrase`, building every level above it first.
    ///
    /// Returns `None` for phrases whose surface is hypothetical, and for
    /// hypothetical phrases no declared parallel reaches.
    pub fn drill(&mut self, env: &mut Env<'_>, phrase: PhraseId) -> Option<ParallelId> {
        if let Some(existing) = self.graph.get(phrase) {
            return Some(existing);
        }

        let ancestry = env.phrases.ancestry(phrase);
        let (&surface, rest) = ancestry.split_first()?;
        if env.phrases.is_hypothetical(surface) {
            return None;
        }
        if !self.enter(env, phrase) {
            return None;
        }

        log::debug!("drill {}", env.display(phrase));
        let mut current = match self.graph.get(surface) {
            Some(existing) => existing,
            None => {
                let created = self.graph.create_explicit(surface, None);
                self.maybe_bridge(env, created);
                self.excavate(env, created);
                created
            }
        };
        let mut result = Some(current);
        for &next in rest {
            match self.descend(env, current, next) {
                Some(descended) => current = descended,
                None => {
                    result = None;
                    break;
                }
            }
            result = Some(current);
        }

        self.depth -= 1;
        result
    }

    fn enter(&mut self, env: &Env<'_>, phrase: PhraseId) -> bool {
        if self.depth >= env.config.recursion_limit {
            log::warn!(
                "recursion limit {} reached at {}",
                env.config.recursion_limit,
                env.display(phrase)
            );
            if let Some(document) = env.documents.get(env.phrases.document(phrase))
                && let Some(site) = env.phrases.declaration_site(phrase, document)
            {
                self.faults.report(FaultKind::RecursionLimit, site).emit();
            }
            return false;
        }
        self.depth += 1;
        true
    }

    fn descend(&mut self, env: &mut Env<'_>, zenith: ParallelId, phrase: PhraseId) -> Option<ParallelId> {
        if let Some(existing) = self.graph.get(phrase) {
            return Some(existing);
        }
        if !self.enter(env, phrase) {
            return None;
        }

        let subject = env.phrases.terminal(phrase).clone();
        let result = if env.phrases.is_hypothetical(phrase) {
            let parallels = self.descend_parallels_first(env, zenith, &subject);
            if parallels.is_empty() {
                None
            } else {
                Some(self.graph.create_implicit(phrase, Some(zenith), parallels))
            }
        } else {
            let created = self.graph.create_explicit(phrase, Some(zenith));
            let parallels = self.descend_parallels_first(env, zenith, &subject);
            self.graph.set_parallels(created, parallels);
            self.maybe_bridge(env, created);
            self.excavate(env, created);
            Some(created)
        };

        self.depth -= 1;
        result
    }

    /// Parallels of `subject` found under `src`'s own parallels, then
    /// under its bases.
    fn descend_parallels_first(&mut self, env: &mut Env<'_>, src: ParallelId, subject: &Subject) -> Vec<ParallelId> {
        let mut out: Vec<ParallelId> = Vec::new();
        for parallel in self.graph.parallels(src).to_vec() {
            match self.descend_one(env, parallel, subject) {
                Some(found) => push_unique(&mut out, found),
                None => {
                    for found in self.descend_parallels_first(env, parallel, subject) {
                        push_unique(&mut out, found);
                    }
                }
            }
        }
        if self.graph.is_explicit(src) {
            for base in self.graph.each_base(src) {
                for found in self.descend_bases_first(env, base, subject) {
                    push_unique(&mut out, found);
                }
            }
        }
        out
    }

    fn descend_bases_first(&mut self, env: &mut Env<'_>, src: ParallelId, subject: &Subject) -> Vec<ParallelId> {
        match self.descend_one(env, src, subject) {
            Some(found) => vec![found],
            None => self.descend_parallels_first(env, src, subject),
        }
    }

    /// The explicit parallel of the declared phrase named `subject` directly under `src`.
    fn descend_one(&mut self, env: &mut Env<'_>, src: ParallelId, subject: &Subject) -> Option<ParallelId> {
        let src_phrase = self.graph.phrase(src);
        let real = env.phrases.peek(src_phrase, subject, None).into_iter().next()?;
        self.descend(env, src, real)
    }

    /// Resolves the bases of an explicit parallel, once per generation.
    fn excavate(&mut self, env: &mut Env<'_>, parallel: ParallelId) {
        if !self.graph.is_explicit(parallel) || !self.excavated.insert(parallel) {
            return;
        }
        let phrase = self.graph.phrase(parallel);
        log::debug!("excavate {}", env.display(phrase));
        let forks = env
            .phrases
            .outbounds(phrase, env.documents, env.interner, env.version);

        if env.phrases.terminal(phrase).is_pattern() {
            self.excavate_pattern(env, parallel, &forks);
            return;
        }

        for fork in forks.iter() {
            let edge = fork.edge();
            if self.graph.cruft().has_edge(edge) || self.graph.has_edge(parallel, edge) {
                continue;
            }

            if let Some(base) = self.drill_successors(env, fork) {
                self.try_add_literal_base(env, parallel, base, fork);
                continue;
            }

            if let Some((pattern, alias)) = self.find_alias(env, phrase, fork) {
                self.try_add_alias_base(env, parallel, pattern, fork, &alias);
                continue;
            }

            self.graph.cruft_mut().add_edge(edge);
            if !fork.is_containment() {
                let term = fork.term().display(env.interner).to_string();
                self.report(env, FaultKind::UnresolvedAnnotation, fork, term);
            }
        }

        if !self.graph.is_contract_satisfied(parallel) {
            log::debug!("{} leaves inherited conditions unmet", env.display(phrase));
        }
    }

    fn excavate_pattern(&mut self, env: &mut Env<'_>, parallel: ParallelId, forks: &[Fork]) {
        let mut table: IndexMap<ParallelId, EdgeId> = IndexMap::new();
        for fork in forks {
            let edge = fork.edge();
            if self.graph.cruft().has_edge(edge) {
                continue;
            }
            match self.drill_successors(env, fork) {
                Some(base) => {
                    table.entry(base).or_insert(edge);
                }
                None => {
                    self.graph.cruft_mut().add_edge(edge);
                    let term = fork.term().display(env.interner).to_string();
                    self.report(env, FaultKind::UnresolvedAnnotation, fork, term);
                }
            }
        }
        self.try_apply_pattern_bases(env, parallel, table);
    }

    /// The first successor, nearest scope first, that resolves to an explicit parallel.
    fn drill_successors(&mut self, env: &mut Env<'_>, fork: &Fork) -> Option<ParallelId> {
        fork.successors()
            .iter()
            .find_map(|&successor| {
                self.drill(env, successor)
                    .filter(|&base| self.graph.is_explicit(base))
            })
    }

    /// The nearest pattern in scope that accepts the fork's annotation.
    fn find_alias(&mut self, env: &mut Env<'_>, phrase: PhraseId, fork: &Fork) -> Option<(ParallelId, String)> {
        let document = env.documents.get(env.phrases.document(phrase))?;
        let term = fork.term().singular().display(env.interner).to_string();
        let mut matched = Vec::new();
        for level in env.phrases.scope(phrase, env.documents, env.interner) {
            for candidate in env.phrases.peek_all(level) {
                if candidate == phrase {
                    continue;
                }
                let Some(pattern) = env.phrases.terminal(candidate).as_pattern() else {
                    continue;
                };
                if !pattern.is_valid() {
                    continue;
                }
                let alias = if pattern.is_total() && pattern.can_match_combinator() {
                    env.phrases.slice(phrase, document, 0, usize::MAX)
                } else {
                    term.clone()
                };
                if pattern.test(&alias) {
                    matched.push((candidate, alias));
                }
            }
        }

        matched.into_iter().find_map(|(candidate, alias)| {
            self.drill(env, candidate)
                .filter(|&p| self.graph.is_explicit(p))
                .map(|p| (p, alias))
        })
    }

    /// Accepts `base` for `target` through `fork` unless a check rejects it.
    ///
    /// A rejected edge becomes cruft and a fault is reported.
    pub fn try_add_literal_base(&mut self, env: &mut Env<'_>, target: ParallelId, base: ParallelId, fork: &Fork) -> bool {
        let edge = fork.edge();
        let target_phrase = self.graph.phrase(target);
        invariants::ensure_new_edge(self.graph.has_edge(target, edge));
        invariants::ensure_pattern(env.phrases.terminal(target_phrase).is_pattern(), false);

        let Some(met) = self.check_contract_and_cycles(env, target, base, fork) else {
            return false;
        };

        if let Some(sibling) = sanitizer::list_fragment_conflict(env.phrases, target_phrase, fork) {
            self.graph.cruft_mut().add_edge(edge);
            let related = env
                .documents
                .get(env.phrases.document(sibling))
                .and_then(|document| env.phrases.declaration_site(sibling, document));
            let term = fork.term().display(env.interner).to_string();
            if let Some(site) = self.fork_site(env, fork) {
                let builder = self.faults.report(FaultKind::ListFragmentConflict, site).message(term);
                match related {
                    Some(related) => builder.related_to("conflicting fragment", related).emit(),
                    None => builder.emit(),
                }
            }
            return false;
        }

        if sanitizer::is_dimensional_conflict(&self.graph, target, base, edge) {
            self.graph.cruft_mut().add_edge(edge);
            let term = fork.term().display(env.interner).to_string();
            self.report(env, FaultKind::ListDimensionalConflict, fork, term);
            return false;
        }

        self.accept(env, target, base, edge, &met);
        true
    }

    /// Accepts a pattern `base` whose pattern matched `alias`.
    pub fn try_add_alias_base(
        &mut self,
        env: &mut Env<'_>,
        target: ParallelId,
        base: ParallelId,
        fork: &Fork,
        alias: &str,
    ) -> bool {
        let edge = fork.edge();
        let target_phrase = self.graph.phrase(target);
        invariants::ensure_new_edge(self.graph.has_edge(target, edge));
        invariants::ensure_pattern(env.phrases.terminal(target_phrase).is_pattern(), false);

        let Some(met) = self.check_contract_and_cycles(env, target, base, fork) else {
            return false;
        };

        log::trace!("alias `{alias}` resolves through {}", env.display(self.graph.phrase(base)));
        self.accept(env, target, base, edge, &met);
        true
    }

    /// Returns the contract conditions `base` meets, or `None` when the
    /// base violates the contract or closes a cycle.
    fn check_contract_and_cycles(
        &mut self,
        env: &mut Env<'_>,
        target: ParallelId,
        base: ParallelId,
        fork: &Fork,
    ) -> Option<Vec<ParallelId>> {
        let edge = fork.edge();
        let term = fork.term().display(env.interner).to_string();

        let has_conditions = self.graph.contract(target).is_some_and(|c| c.has_conditions());
        let met = self.graph.conditions_met_by(target, base);
        if has_conditions && met.is_empty() {
            self.graph.cruft_mut().add_edge(edge);
            self.report(env, FaultKind::ContractViolation, fork, term);
            return None;
        }

        if sanitizer::is_circular(&self.graph, target, base) {
            self.graph.cruft_mut().add_edge(edge);
            self.report(env, FaultKind::CircularReference, fork, term);
            return None;
        }

        Some(met)
    }

    fn accept(&mut self, env: &Env<'_>, target: ParallelId, base: ParallelId, edge: EdgeId, met: &[ParallelId]) {
        if let Some(contract) = self.graph.contract_mut(target) {
            contract.satisfy(met);
        }
        self.graph.insert_base(target, edge, base);
        log::trace!(
            "{} inherits {}",
            env.display(self.graph.phrase(target)),
            env.display(self.graph.phrase(base))
        );
    }

    /// Records the bases of a pattern parallel.
    ///
    /// Every supplied base is recorded. Patterns already constructed whose
    /// bases all lie within the new bases' closure are logged as sprawl.
    pub fn try_apply_pattern_bases(
        &mut self,
        env: &Env<'_>,
        target: ParallelId,
        table: IndexMap<ParallelId, EdgeId>,
    ) {
        let target_phrase = self.graph.phrase(target);
        invariants::ensure_pattern(env.phrases.terminal(target_phrase).is_pattern(), true);

        let bases: Vec<ParallelId> = table.keys().copied().collect();
        let deep: IndexSet<ParallelId> = bases
            .iter()
            .flat_map(|&base| self.graph.each_base_deep(base))
            .collect();

        if !deep.is_empty() {
            let sprawl = self
                .graph
                .explicit_where(|p| p != target_phrase && env.phrases.terminal(p).is_pattern())
                .into_iter()
                .filter(|&p| {
                    let others = self.graph.each_base(p);
                    !others.is_empty()
                        && others.iter().all(|b| deep.contains(b) || bases.contains(b))
                })
                .count();
            if sprawl > 0 {
                log::trace!(
                    "pattern {} sprawls over {sprawl} other patterns",
                    env.display(target_phrase)
                );
            }
        }

        for (base, edge) in table {
            self.graph.insert_base(target, edge, base);
        }
    }

    fn maybe_bridge(&mut self, env: &Env<'_>, parallel: ParallelId) {
        let phrase = self.graph.phrase(parallel);
        let Some(other) = env.phrases.intrinsic_extrinsic_bridge(phrase) else {
            return;
        };
        let Some(other_parallel) = self.graph.get(other) else {
            return;
        };
        if !self.graph.is_explicit(other_parallel)
            || self.graph.bridge_of(parallel).is_some()
            || self.graph.bridge_of(other_parallel).is_some()
        {
            return;
        }
        let same_polarity = env.phrases.is_list_intrinsic(phrase) == env.phrases.is_list_intrinsic(other);
        self.graph.bridge(parallel, other_parallel, same_polarity);
    }

    fn fork_site(&self, env: &Env<'_>, fork: &Fork) -> Option<crate::faults::FaultSite> {
        let document = env.documents.get(env.phrases.document(fork.predecessor()))?;
        env.phrases.fork_site(fork, document)
    }

    fn report(&mut self, env: &Env<'_>, kind: FaultKind, fork: &Fork, detail: String) {
        if let Some(site) = self.fork_site(env, fork) {
            self.faults.report(kind, site).message(detail).emit();
        }
    }
}

fn push_unique(out: &mut Vec<ParallelId>, id: ParallelId) {
    if !out.contains(&id) {
        out.push(id);
    }
}
