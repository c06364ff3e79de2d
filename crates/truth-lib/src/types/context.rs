//! Per-generation type storage and materialization.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use truth_core::VersionStamp;

use super::{Keyword, Type, TypeError};
use crate::graph::{self, Order};
use crate::invariants;
use crate::parallel::{ConstructionWorker, ParallelId, provider};
use crate::phrase::{EdgeId, PhraseId};
use crate::program::Env;
use crate::subject::{Subject, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TypeSlot(u32);

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TypeFlags {
    pub is_pattern: bool,
    pub is_uri: bool,
    pub is_anonymous: bool,
    pub is_fresh: bool,
    pub is_explicit: bool,
    pub is_refinement: bool,
    pub is_list_intrinsic: bool,
    pub is_list_extrinsic: bool,
}

#[derive(Debug)]
struct Seed {
    parallel: ParallelId,
    container: Option<TypeSlot>,
    parallels: Vec<TypeSlot>,
    bases: Vec<TypeSlot>,
    flags: TypeFlags,
}

#[derive(Debug, Default)]
struct Memo {
    containees: Option<Vec<TypeSlot>>,
    adjacents: Option<Vec<TypeSlot>>,
    parallel_roots: Option<Vec<TypeSlot>>,
    patterns: Option<Vec<TypeSlot>>,
    keywords: Option<Vec<(String, TypeSlot, bool)>>,
}

#[derive(Debug)]
struct TypeData {
    phrase: PhraseId,
    name: String,
    seed: Option<Seed>,
    memo: Memo,
}

/// Every type materialized since the program last changed.
///
/// When the program's version moves past the context's version the whole
/// context is dropped and a new generation starts; handles from earlier
/// generations report [`TypeError::Stale`].
#[derive(Debug, Default)]
pub(crate) struct TypeContext {
    generation: u32,
    version: VersionStamp,
    types: Vec<TypeData>,
    for_phrase: HashMap<PhraseId, TypeSlot>,
    for_name: IndexMap<String, Vec<TypeSlot>>,
    inbound_bases: IndexMap<TypeSlot, IndexSet<TypeSlot>>,
    inbound_parallels: IndexMap<TypeSlot, IndexSet<TypeSlot>>,
    worker: ConstructionWorker,
    settled: bool,
}

impl TypeContext {
    pub fn worker(&self) -> &ConstructionWorker {
        &self.worker
    }

    pub fn is_settled(&self, version: VersionStamp) -> bool {
        self.settled && !version.newer_than(self.version)
    }

    pub fn mark_settled(&mut self) {
        self.settled = true;
    }

    /// Starts a new generation when the program has changed.
    pub fn ensure_current(&mut self, version: VersionStamp) {
        if !version.newer_than(self.version) {
            return;
        }
        log::debug!(
            "reset type context: {} -> {} (generation {})",
            self.version,
            version,
            self.generation + 1
        );
        *self = TypeContext {
            generation: self.generation + 1,
            version,
            ..TypeContext::default()
        };
    }

    pub fn is_dirty(&self, ty: Type, version: VersionStamp) -> bool {
        ty.generation != self.generation || version.newer_than(self.version)
    }

    fn handle(&self, slot: TypeSlot) -> Type {
        Type {
            slot,
            generation: self.generation,
        }
    }

    fn data(&self, slot: TypeSlot) -> &TypeData {
        &self.types[slot.0 as usize]
    }

    fn data_mut(&mut self, slot: TypeSlot) -> &mut TypeData {
        &mut self.types[slot.0 as usize]
    }

    fn seed(&self, slot: TypeSlot) -> &Seed {
        match &self.data(slot).seed {
            Some(seed) => seed,
            None => panic!("broken type invariant: {slot:?} read before seeding"),
        }
    }

    fn check(&self, ty: Type, version: VersionStamp) -> Result<TypeSlot, TypeError> {
        if self.is_dirty(ty, version) || ty.slot.0 as usize >= self.types.len() {
            return Err(TypeError::Stale);
        }
        Ok(ty.slot)
    }

    /// Validates `ty` and materializes it if only its identity exists so far.
    fn guard(&mut self, env: &mut Env<'_>, ty: Type) -> Result<TypeSlot, TypeError> {
        let slot = self.check(ty, env.version)?;
        if self.data(slot).seed.is_none() {
            let phrase = self.data(slot).phrase;
            self.construct(env, phrase);
            invariants::ensure_seeded(self.data(slot).seed.is_some());
        }
        Ok(slot)
    }

    fn slot_for(&mut self, env: &Env<'_>, phrase: PhraseId) -> TypeSlot {
        if let Some(&slot) = self.for_phrase.get(&phrase) {
            return slot;
        }
        let slot = TypeSlot(self.types.len() as u32);
        let name = env.phrases.terminal(phrase).display(env.interner).to_string();
        self.for_name
            .entry(name.to_lowercase())
            .or_default()
            .push(slot);
        self.types.push(TypeData {
            phrase,
            name,
            seed: None,
            memo: Memo::default(),
        });
        self.for_phrase.insert(phrase, slot);
        slot
    }

    /// Materializes the type at `phrase`, with every container above it.
    pub fn construct(&mut self, env: &mut Env<'_>, phrase: PhraseId) -> Option<Type> {
        self.ensure_current(env.version);
        let phrase = provider::canonical(env.phrases, phrase);
        if env.phrases.is_root(phrase) {
            return None;
        }

        let slot = self.slot_for(env, phrase);
        if self.data(slot).seed.is_some() {
            return Some(self.handle(slot));
        }

        let parallel = self.worker.drill(env, phrase)?;
        for level in self.worker.graph().containment(parallel) {
            self.seed_from(env, level);
        }
        let slot = self.slot_for(env, self.worker.graph().phrase(parallel));
        self.data(slot).seed.as_ref()?;
        Some(self.handle(slot))
    }

    fn seed_from(&mut self, env: &mut Env<'_>, parallel: ParallelId) {
        let graph_phrase = self.worker.graph().phrase(parallel);
        let slot = self.slot_for(env, graph_phrase);
        if self.data(slot).seed.is_some() {
            return;
        }

        let graph = self.worker.graph();
        let container_phrase = graph.container(parallel).map(|c| graph.phrase(c));
        let parallel_phrases: Vec<PhraseId> = graph
            .parallels(parallel)
            .iter()
            .map(|&p| graph.phrase(p))
            .collect();
        let is_explicit = graph.is_explicit(parallel);
        let explicit_sources = if is_explicit {
            vec![parallel]
        } else {
            graph.effective_explicit(graph.parallels(parallel))
        };
        let mut base_phrases: Vec<PhraseId> = Vec::new();
        let mut edges: Vec<EdgeId> = Vec::new();
        for &source in &explicit_sources {
            for (edge, base) in graph.base_edges(source) {
                edges.push(edge);
                let phrase = graph.phrase(base);
                if !base_phrases.contains(&phrase) {
                    base_phrases.push(phrase);
                }
            }
        }
        let list_extrinsic = explicit_sources
            .iter()
            .any(|&p| env.phrases.is_list_extrinsic(graph.phrase(p)));

        let terminal = env.phrases.terminal(graph_phrase).clone();
        let own_name = terminal.as_term().map(Term::name);
        let is_refinement = own_name.is_some_and(|name| {
            edges
                .iter()
                .any(|&edge| edge_term(env, edge).is_some_and(|t| t.name() == name))
        });

        let flags = TypeFlags {
            is_pattern: terminal.is_pattern(),
            is_uri: terminal.is_uri(),
            is_anonymous: terminal.is_anonymous(),
            is_fresh: parallel_phrases.is_empty(),
            is_explicit,
            is_refinement,
            is_list_intrinsic: terminal.is_list(),
            is_list_extrinsic: list_extrinsic,
        };

        let container = container_phrase.map(|p| self.slot_for(env, p));
        let parallels: Vec<TypeSlot> = parallel_phrases
            .into_iter()
            .map(|p| self.slot_for(env, p))
            .collect();
        let bases: Vec<TypeSlot> = base_phrases
            .into_iter()
            .map(|p| self.slot_for(env, p))
            .collect();

        for &base in &bases {
            if !env.phrases.terminal(self.data(base).phrase).is_pattern() {
                self.inbound_bases.entry(base).or_default().insert(slot);
            }
        }
        for &p in &parallels {
            self.inbound_parallels.entry(p).or_default().insert(slot);
        }

        invariants::ensure_unseeded(self.data(slot).seed.is_some());
        self.data_mut(slot).seed = Some(Seed {
            parallel,
            container,
            parallels,
            bases,
            flags,
        });
    }

    pub fn name(&self, ty: Type, version: VersionStamp) -> Result<&str, TypeError> {
        let slot = self.check(ty, version)?;
        Ok(&self.data(slot).name)
    }

    pub fn phrase(&self, ty: Type, version: VersionStamp) -> Result<PhraseId, TypeError> {
        let slot = self.check(ty, version)?;
        Ok(self.data(slot).phrase)
    }

    pub fn flags(&mut self, env: &mut Env<'_>, ty: Type) -> Result<TypeFlags, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.seed(slot).flags)
    }

    pub fn container(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Option<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.seed(slot).container.map(|c| self.handle(c)))
    }

    pub fn parallels(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.handles(&self.seed(slot).parallels))
    }

    pub fn bases(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.handles(&self.seed(slot).bases))
    }

    fn handles(&self, slots: &[TypeSlot]) -> Vec<Type> {
        slots.iter().map(|&s| self.handle(s)).collect()
    }

    /// Statements that declare this type. Implicit types have none.
    pub fn statements(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<crate::StatementId>, TypeError> {
        let slot = self.guard(env, ty)?;
        if !self.seed(slot).flags.is_explicit {
            return Ok(Vec::new());
        }
        Ok(env.phrases.statements(self.data(slot).phrase))
    }

    /// Depth-first walk from `ty` along `next`.
    pub fn visit(
        &mut self,
        env: &mut Env<'_>,
        ty: Type,
        order: Order,
        mut next: impl FnMut(&mut Self, &mut Env<'_>, Type) -> Result<Vec<Type>, TypeError>,
    ) -> Result<Vec<Type>, TypeError> {
        self.guard(env, ty)?;
        graph::visit(ty, order, |t| next(self, env, t))
    }

    /// Types contained by this type, including those inherited from its
    /// parallels and bases.
    pub fn containees(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        if let Some(cached) = &self.data(slot).memo.containees {
            return Ok(self.handles(cached));
        }

        let mut subjects: IndexSet<Subject> = IndexSet::new();
        let parallels = self.visit(env, ty, Order::Post, |ctx, env, t| ctx.parallels(env, t))?;
        for parallel in parallels {
            let bases = self.visit(env, parallel, Order::Post, |ctx, env, t| ctx.bases(env, t))?;
            for base in bases {
                let base_slot = self.guard(env, base)?;
                if self.seed(base_slot).flags.is_explicit {
                    subjects.extend(env.phrases.peek_subjects(self.data(base_slot).phrase));
                }
            }
        }

        let own = self.data(slot).phrase;
        let mut out: Vec<TypeSlot> = Vec::new();
        for subject in subjects {
            for phrase in provider::forward(env.phrases, own, &subject) {
                if let Some(inner) = self.construct(env, phrase)
                    && !out.contains(&inner.slot)
                {
                    out.push(inner.slot);
                }
            }
        }

        let handles = self.handles(&out);
        self.data_mut(slot).memo.containees = Some(out);
        Ok(handles)
    }

    /// Types held by a list type itself. Empty for every other type.
    pub fn containees_intrinsic(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let flags = self.flags(env, ty)?;
        if flags.is_list_intrinsic || flags.is_list_extrinsic {
            return Err(TypeError::NotImplemented("containees_intrinsic of list types"));
        }
        Ok(Vec::new())
    }

    /// The other containees of this type's container, inherited ones
    /// included. Top-level types are adjacent to the document's other roots.
    pub fn adjacents(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        if let Some(cached) = &self.data(slot).memo.adjacents {
            return Ok(self.handles(cached));
        }
        let siblings: Vec<TypeSlot> = match self.container(env, ty)? {
            Some(container) => self
                .containees(env, container)?
                .into_iter()
                .map(|t| t.slot)
                .collect(),
            None => {
                let root = env.phrases.root_of(self.data(slot).phrase);
                let mut roots = Vec::new();
                for phrase in env.phrases.peek_all(root) {
                    if let Some(t) = self.construct(env, phrase) {
                        roots.push(t.slot);
                    }
                }
                roots
            }
        };
        let mut out: Vec<TypeSlot> = Vec::new();
        for sibling in siblings {
            if sibling != slot && !out.contains(&sibling) {
                out.push(sibling);
            }
        }
        let handles = self.handles(&out);
        self.data_mut(slot).memo.adjacents = Some(out);
        Ok(handles)
    }

    /// Parallels with no parallels of their own. Never includes this type.
    pub fn parallel_roots(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        if let Some(cached) = &self.data(slot).memo.parallel_roots {
            return Ok(self.handles(cached));
        }
        let all = self.visit(env, ty, Order::Pre, |ctx, env, t| ctx.parallels(env, t))?;
        let mut out = Vec::new();
        for parallel in all {
            let p = self.guard(env, parallel)?;
            if p != slot && self.seed(p).parallels.is_empty() {
                out.push(p);
            }
        }
        let handles = self.handles(&out);
        self.data_mut(slot).memo.parallel_roots = Some(out);
        Ok(handles)
    }

    /// Pattern types beside this type or its containers that inherit from it.
    pub fn patterns(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        if let Some(cached) = &self.data(slot).memo.patterns {
            return Ok(self.handles(cached));
        }

        let mut containers = vec![ty];
        let mut current = ty;
        while let Some(container) = self.container(env, current)? {
            containers.push(container);
            current = container;
        }

        let mut seen_labels: IndexSet<String> = IndexSet::new();
        let mut out = Vec::new();
        for container in containers {
            for adjacent in self.adjacents(env, container)? {
                let a = self.guard(env, adjacent)?;
                if !self.seed(a).flags.is_pattern {
                    continue;
                }
                let bases = self.seed(a).bases.clone();
                if !bases.contains(&container.slot) {
                    continue;
                }
                let label = bases
                    .iter()
                    .map(|&b| env.display(self.data(b).phrase))
                    .collect::<Vec<_>>()
                    .join(",");
                if seen_labels.insert(label) {
                    out.push(a);
                }
            }
        }

        let handles = self.handles(&out);
        self.data_mut(slot).memo.patterns = Some(out);
        Ok(handles)
    }

    fn keyword_slots(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<(String, TypeSlot, bool)>, TypeError> {
        let slot = self.guard(env, ty)?;
        if let Some(cached) = &self.data(slot).memo.keywords {
            return Ok(cached.clone());
        }

        let seed = self.seed(slot);
        let parallel = seed.parallel;
        let graph = self.worker.graph();
        let sources = if seed.flags.is_explicit {
            vec![parallel]
        } else {
            graph.effective_explicit(graph.parallels(parallel))
        };
        let mut pairs: Vec<(EdgeId, PhraseId)> = Vec::new();
        for source in sources {
            for (edge, base) in graph.base_edges(source) {
                pairs.push((edge, graph.phrase(base)));
            }
        }

        let mut out = Vec::new();
        for (edge, base_phrase) in pairs {
            let Some(term) = edge_term(env, edge) else {
                continue;
            };
            let word = term.display(env.interner).to_string();
            let is_alias = env.phrases.terminal(base_phrase) != &Subject::Term(term.singular());
            let base = self.slot_for(env, base_phrase);
            out.push((word, base, is_alias));
        }

        self.data_mut(slot).memo.keywords = Some(out.clone());
        Ok(out)
    }

    /// The annotations that produced this type's bases.
    pub fn keywords(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Keyword>, TypeError> {
        Ok(self
            .keyword_slots(env, ty)?
            .into_iter()
            .map(|(word, slot, is_alias)| Keyword {
                word,
                ty: self.handle(slot),
                is_alias,
            })
            .collect())
    }

    /// Annotations resolved through a pattern rather than a declared type.
    pub fn aliases(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<String>, TypeError> {
        Ok(self
            .keyword_slots(env, ty)?
            .into_iter()
            .filter(|(_, _, is_alias)| *is_alias)
            .map(|(word, _, _)| word)
            .collect())
    }

    /// The whole annotation side, rebuilt from the keywords.
    pub fn value(&mut self, env: &mut Env<'_>, ty: Type) -> Result<String, TypeError> {
        let words: Vec<String> = self
            .keyword_slots(env, ty)?
            .into_iter()
            .map(|(word, _, _)| word)
            .collect();
        Ok(words.join(", "))
    }

    /// Whether `base` is anywhere in the base graph walked from this type,
    /// the type itself included.
    pub fn is(&mut self, env: &mut Env<'_>, ty: Type, base: Type) -> Result<bool, TypeError> {
        let base = self.guard(env, base)?;
        let all = self.visit(env, ty, Order::Pre, |ctx, env, t| ctx.bases(env, t))?;
        Ok(all.iter().any(|t| t.slot == base))
    }

    /// Whether `containee` is contained directly, or is a parallel of a
    /// same-named containee.
    pub fn has(&mut self, env: &mut Env<'_>, ty: Type, containee: Type) -> Result<bool, TypeError> {
        let target = self.guard(env, containee)?;
        let containees = self.containees(env, ty)?;
        if containees.iter().any(|t| t.slot == target) {
            return Ok(true);
        }
        for inner in containees {
            if self.data(inner.slot).name != self.data(target).name {
                continue;
            }
            let parallels = self.visit(env, inner, Order::Pre, |ctx, env, t| ctx.parallels(env, t))?;
            if parallels.iter().any(|t| t.slot == target) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Follows containee names from `ty`.
    pub fn query(&mut self, env: &mut Env<'_>, ty: Type, path: &[&str]) -> Result<Option<Type>, TypeError> {
        let mut current = ty;
        for name in path {
            let containees = self.containees(env, current)?;
            let next = containees
                .into_iter()
                .find(|t| self.data(t.slot).name == *name);
            match next {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        if path.is_empty() {
            return Ok(None);
        }
        Ok(Some(current))
    }

    /// Types whose names match `name`, ignoring case.
    pub fn lookup(&self, name: &str) -> Vec<Type> {
        self.for_name
            .get(&name.to_lowercase())
            .map(|slots| {
                slots
                    .iter()
                    .filter(|&&s| self.data(s).seed.is_some())
                    .map(|&s| self.handle(s))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn inbound_bases(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.inbound(&self.inbound_bases, slot))
    }

    pub fn inbound_parallels(&mut self, env: &mut Env<'_>, ty: Type) -> Result<Vec<Type>, TypeError> {
        let slot = self.guard(env, ty)?;
        Ok(self.inbound(&self.inbound_parallels, slot))
    }

    fn inbound(&self, index: &IndexMap<TypeSlot, IndexSet<TypeSlot>>, slot: TypeSlot) -> Vec<Type> {
        index
            .get(&slot)
            .map(|set| set.iter().map(|&s| self.handle(s)).collect())
            .unwrap_or_default()
    }

    pub fn display(&self, env: &Env<'_>, ty: Type) -> Result<String, TypeError> {
        let slot = self.check(ty, env.version)?;
        Ok(env.display(self.data(slot).phrase))
    }

    /// Path form followed by the names of the bases.
    pub fn display_full(&mut self, env: &mut Env<'_>, ty: Type) -> Result<String, TypeError> {
        let mut out = self.display(env, ty)?;
        let bases = self.bases(env, ty)?;
        if !bases.is_empty() {
            let names: Vec<&str> = bases.iter().map(|b| self.data(b.slot).name.as_str()).collect();
            out.push_str(" : ");
            out.push_str(&names.join(", "));
        }
        Ok(out)
    }
}

/// The annotation term an edge was read from.
fn edge_term(env: &mut Env<'_>, edge: EdgeId) -> Option<Term> {
    let forks = env
        .phrases
        .outbounds(edge.phrase, env.documents, env.interner, env.version);
    forks.get(edge.index).map(|fork| fork.term())
}
