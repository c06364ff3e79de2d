use indexmap::IndexSet;

use crate::phrase::EdgeId;

/// Edges rejected during construction. They are skipped on every later
/// visit so each problem is reported once per generation.
#[derive(Debug, Default)]
pub(crate) struct CruftCache {
    edges: IndexSet<EdgeId>,
}

impl CruftCache {
    pub fn add_edge(&mut self, edge: EdgeId) {
        self.edges.insert(edge);
    }

    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }
}
