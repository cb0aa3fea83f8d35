use std::collections::HashMap;

use geocoin_core::{CellKey, Luck};

/// Memoized record of which cells hold a cache.
///
/// Each cell is decided once, on first query, and the decision is kept for
/// the lifetime of the world. The map grows with the number of distinct cells
/// ever visited; sessions cover a bounded play area so entries are never
/// evicted.
#[derive(Debug)]
pub(crate) struct SpawnDecisions {
    probability: f64,
    decisions: HashMap<CellKey, bool>,
}

impl SpawnDecisions {
    pub(crate) fn new(probability: f64) -> Self {
        Self {
            probability,
            decisions: HashMap::new(),
        }
    }

    /// Reports whether `key` holds a cache, deciding it on first query.
    pub(crate) fn should_spawn(&mut self, key: CellKey, luck: &dyn Luck) -> bool {
        let probability = self.probability;
        *self.decisions.entry(key).or_insert_with(|| {
            let will_spawn = luck.luck(&key.to_string()) < probability;
            tracing::trace!(%key, will_spawn, "decided cell");
            will_spawn
        })
    }

    /// Previously recorded decision, without deciding undecided cells.
    pub(crate) fn decided(&self, key: CellKey) -> Option<bool> {
        self.decisions.get(&key).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.decisions.len()
    }
}
