//! Structural checks run before a base is accepted.

use super::{ParallelGraph, ParallelId};
use crate::phrase::{EdgeId, Fork, PhraseId, Phrases};

/// `base` is `target` or already derives from it.
pub(crate) fn is_circular(graph: &ParallelGraph, target: ParallelId, base: ParallelId) -> bool {
    base == target || graph.has_base(base, target)
}

/// A fragment or homograph of `phrase` that disagrees with `fork` about
/// whether the declared name is a list.
pub(crate) fn list_fragment_conflict(phrases: &Phrases, phrase: PhraseId, fork: &Fork) -> Option<PhraseId> {
    if fork.is_containment() || phrases.is_root(phrase) {
        return None;
    }
    phrases
        .peek(phrases.parent(phrase), phrases.terminal(phrase), None)
        .into_iter()
        .filter(|&sibling| sibling != phrase)
        .find(|&sibling| phrases.is_list_extrinsic(sibling) != fork.is_list())
}

/// Adding `base` through `edge` would change the list depth established
/// by the bases `target` already has.
pub(crate) fn is_dimensional_conflict(
    graph: &ParallelGraph,
    target: ParallelId,
    base: ParallelId,
    edge: EdgeId,
) -> bool {
    if graph.base_count(target) == 0 {
        return false;
    }
    let existing = graph.list_dimensionality(target);
    let candidate = graph.list_dimensionality(base) + usize::from(edge.is_list);
    existing != candidate
}
