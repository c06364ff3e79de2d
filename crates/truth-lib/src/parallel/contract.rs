use indexmap::IndexSet;

use super::{ParallelGraph, ParallelId};

/// What an overriding parallel owes the parallels it overrides: every
/// base must derive from at least one of their bases.
#[derive(Debug, Default)]
pub(crate) struct Contract {
    conditions: Vec<ParallelId>,
    unsatisfied: IndexSet<ParallelId>,
}

impl Contract {
    pub fn new(conditions: Vec<ParallelId>) -> Self {
        let unsatisfied = conditions.iter().copied().collect();
        Self {
            conditions,
            unsatisfied,
        }
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[ParallelId] {
        &self.conditions
    }

    pub fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    pub fn satisfy(&mut self, met: &[ParallelId]) {
        for condition in met {
            self.unsatisfied.shift_remove(condition);
        }
    }
}

impl ParallelGraph {
    /// Whether every condition `id` inherited has been met by some base.
    /// Parallels without a contract have nothing to meet.
    pub fn is_contract_satisfied(&self, id: ParallelId) -> bool {
        self.contract(id).is_none_or(Contract::is_satisfied)
    }

    /// Conditions of `id`'s contract that `base` meets by being, or
    /// deriving from, the condition.
    pub fn conditions_met_by(&self, id: ParallelId, base: ParallelId) -> Vec<ParallelId> {
        let Some(contract) = self.contract(id) else {
            return Vec::new();
        };
        contract
            .conditions()
            .iter()
            .copied()
            .filter(|&condition| condition == base || self.has_base(base, condition))
            .collect()
    }
}
