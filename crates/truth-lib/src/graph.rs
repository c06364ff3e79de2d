//! Cycle-safe traversal over any graph given as a successor function.

use std::hash::Hash;

use indexmap::IndexSet;

/// When a node is yielded relative to its successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Before its successors.
    Pre,
    /// After all of its successors.
    Post,
}

/// Depth-first walk from `start`, yielding each reachable node once.
///
/// Nodes are marked on entry, so cycles terminate in both orders.
pub fn visit<N, E>(
    start: N,
    order: Order,
    mut next: impl FnMut(N) -> Result<Vec<N>, E>,
) -> Result<Vec<N>, E>
where
    N: Copy + Eq + Hash,
{
    let mut entered = IndexSet::new();
    let mut out = Vec::new();
    walk(start, order, &mut next, &mut entered, &mut out)?;
    Ok(out)
}

fn walk<N, E>(
    node: N,
    order: Order,
    next: &mut impl FnMut(N) -> Result<Vec<N>, E>,
    entered: &mut IndexSet<N>,
    out: &mut Vec<N>,
) -> Result<(), E>
where
    N: Copy + Eq + Hash,
{
    if !entered.insert(node) {
        return Ok(());
    }
    if order == Order::Pre {
        out.push(node);
    }
    for successor in next(node)? {
        walk(successor, order, next, entered, out)?;
    }
    if order == Order::Post {
        out.push(node);
    }
    Ok(())
}

/// Follows a single-successor chain, e.g. containers, until it ends or repeats.
pub fn chain<N, E>(start: N, mut next: impl FnMut(N) -> Result<Option<N>, E>) -> Result<Vec<N>, E>
where
    N: Copy + Eq + Hash,
{
    visit(start, Order::Pre, |node| Ok(next(node)?.into_iter().collect()))
}
