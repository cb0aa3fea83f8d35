use std::collections::{BTreeMap, HashMap};

use geocoin_core::{CellKey, Event, GridIndex, Luck, TokenValue};
use geocoin_system_exchange::Exchange;

use crate::{spawn_decisions::SpawnDecisions, TokenRetention};

/// Collaborators consulted when a cache materializes.
pub(crate) struct Generation<'a> {
    pub(crate) luck: &'a dyn Luck,
    pub(crate) decisions: &'a mut SpawnDecisions,
    pub(crate) grid: &'a GridIndex,
}

/// A materialized cache and the interaction surface opened on it, if any.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry {
    pub(crate) value: TokenValue,
    pub(crate) surface: Option<Exchange>,
}

/// Caches currently materialized inside the player's window.
#[derive(Debug)]
pub(crate) struct CacheRegistry {
    active: BTreeMap<CellKey, CacheEntry>,
    retention: TokenRetention,
    retained: HashMap<CellKey, TokenValue>,
}

impl CacheRegistry {
    pub(crate) fn new(retention: TokenRetention) -> Self {
        Self {
            active: BTreeMap::new(),
            retention,
            retained: HashMap::new(),
        }
    }

    /// Materializes the cache at `key` if the cell holds one.
    pub(crate) fn activate(
        &mut self,
        key: CellKey,
        generation: &mut Generation<'_>,
        out_events: &mut Vec<Event>,
    ) {
        if self.active.contains_key(&key) {
            return;
        }
        if !generation.decisions.should_spawn(key, generation.luck) {
            return;
        }

        let value = match self.retention {
            TokenRetention::Retain => self.retained.remove(&key),
            TokenRetention::Discard => None,
        }
        .unwrap_or_else(|| initial_value(key, generation.luck));

        let _ = self.active.insert(
            key,
            CacheEntry {
                value,
                surface: None,
            },
        );
        tracing::debug!(%key, %value, "cache spawned");
        out_events.push(Event::CacheSpawned {
            key,
            bounds: generation.grid.bounds_of(key),
            value,
        });
    }

    /// Dematerializes the cache at `key`, closing its surface first.
    pub(crate) fn deactivate(&mut self, key: CellKey, out_events: &mut Vec<Event>) {
        let Some(entry) = self.active.remove(&key) else {
            return;
        };

        if self.retention == TokenRetention::Retain {
            let _ = self.retained.insert(key, entry.value);
        }

        if entry.surface.is_some() {
            out_events.push(Event::SurfaceClosed { key });
        }
        tracing::debug!(%key, value = %entry.value, "cache despawned");
        out_events.push(Event::CacheDespawned { key });
    }

    /// Reconciles the active set with the window around `center`.
    ///
    /// The window spans `[-radius, radius)` cells on both axes. Caches inside
    /// both the old and the new window are left untouched.
    pub(crate) fn set_window(
        &mut self,
        center: CellKey,
        radius: u32,
        generation: &mut Generation<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let departed: Vec<CellKey> = self
            .active
            .keys()
            .copied()
            .filter(|key| !in_window(center, radius, *key))
            .collect();
        for key in departed {
            self.deactivate(key, out_events);
        }

        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        for di in -radius..radius {
            for dj in -radius..radius {
                self.activate(center.offset(di, dj), generation, out_events);
            }
        }
    }

    pub(crate) fn entry(&self, key: CellKey) -> Option<&CacheEntry> {
        self.active.get(&key)
    }

    pub(crate) fn entry_mut(&mut self, key: CellKey) -> Option<&mut CacheEntry> {
        self.active.get_mut(&key)
    }

    /// Active caches in ascending key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellKey, &CacheEntry)> {
        self.active.iter().map(|(key, entry)| (*key, entry))
    }

    pub(crate) fn retained_value(&self, key: CellKey) -> Option<TokenValue> {
        self.retained.get(&key).copied()
    }
}

/// Reports whether `key` falls inside the half-open window around `center`.
pub(crate) fn in_window(center: CellKey, radius: u32, key: CellKey) -> bool {
    let radius = i64::from(radius);
    let di = i64::from(key.i()) - i64::from(center.i());
    let dj = i64::from(key.j()) - i64::from(center.j());
    (-radius..radius).contains(&di) && (-radius..radius).contains(&dj)
}

/// Token a cache starts with: `floor(luck * 100) mod 10 + 1`, always in `1..=10`.
pub(crate) fn initial_value(key: CellKey, luck: &dyn Luck) -> TokenValue {
    let roll = luck.luck(&key.initial_value_key());
    let scaled = (roll * 100.0).floor() as u64;
    TokenValue::new(scaled % 10 + 1)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use geocoin_core::Position;

    use super::*;

    #[derive(Debug, Default)]
    struct TableLuck {
        values: HashMap<String, f64>,
    }

    impl TableLuck {
        fn with(mut self, key: &str, value: f64) -> Self {
            let _ = self.values.insert(key.to_owned(), value);
            self
        }
    }

    impl Luck for TableLuck {
        fn luck(&self, key: &str) -> f64 {
            self.values.get(key).copied().unwrap_or(0.99)
        }
    }

    fn grid() -> GridIndex {
        GridIndex::new(Position::new(0.0, 0.0), 1.0)
    }

    #[test]
    fn initial_value_follows_modulo_formula() {
        let luck = TableLuck::default()
            .with("0,0:initialValue", 0.23)
            .with("1,1:initialValue", 0.0)
            .with("2,2:initialValue", 0.999);
        assert_eq!(initial_value(CellKey::new(0, 0), &luck).get(), 4);
        assert_eq!(initial_value(CellKey::new(1, 1), &luck).get(), 1);
        assert_eq!(initial_value(CellKey::new(2, 2), &luck).get(), 10);
    }

    #[test]
    fn activation_is_idempotent() {
        let luck = TableLuck::default()
            .with("0,0", 0.05)
            .with("0,0:initialValue", 0.23);
        let grid = grid();
        let mut decisions = SpawnDecisions::new(0.1);
        let mut generation = Generation {
            luck: &luck,
            decisions: &mut decisions,
            grid: &grid,
        };
        let mut registry = CacheRegistry::new(TokenRetention::Retain);
        let mut events = Vec::new();

        registry.activate(CellKey::new(0, 0), &mut generation, &mut events);
        registry.activate(CellKey::new(0, 0), &mut generation, &mut events);
        registry.activate(CellKey::new(5, 5), &mut generation, &mut events);

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::CacheSpawned { key, value, .. }
                if key == CellKey::new(0, 0) && value == TokenValue::new(4)
        ));
    }

    #[test]
    fn deactivating_inactive_key_is_a_no_op() {
        let mut registry = CacheRegistry::new(TokenRetention::Retain);
        let mut events = Vec::new();
        registry.deactivate(CellKey::new(3, 3), &mut events);
        assert!(events.is_empty());
        assert_eq!(registry.retained_value(CellKey::new(3, 3)), None);
    }

    #[test]
    fn discard_policy_regenerates_value_on_reentry() {
        let luck = TableLuck::default()
            .with("0,0", 0.05)
            .with("0,0:initialValue", 0.23);
        let grid = grid();
        let mut decisions = SpawnDecisions::new(0.1);
        let mut generation = Generation {
            luck: &luck,
            decisions: &mut decisions,
            grid: &grid,
        };
        let mut registry = CacheRegistry::new(TokenRetention::Discard);
        let mut events = Vec::new();
        let key = CellKey::new(0, 0);

        registry.activate(key, &mut generation, &mut events);
        if let Some(entry) = registry.entry_mut(key) {
            entry.value = TokenValue::new(9);
        }
        registry.deactivate(key, &mut events);
        registry.activate(key, &mut generation, &mut events);

        let value = registry.entry(key).map(|entry| entry.value);
        assert_eq!(value, Some(TokenValue::new(4)));
        assert_eq!(registry.retained_value(key), None);
    }

    #[test]
    fn retain_policy_restores_value_on_reentry() {
        let luck = TableLuck::default()
            .with("0,0", 0.05)
            .with("0,0:initialValue", 0.23);
        let grid = grid();
        let mut decisions = SpawnDecisions::new(0.1);
        let mut generation = Generation {
            luck: &luck,
            decisions: &mut decisions,
            grid: &grid,
        };
        let mut registry = CacheRegistry::new(TokenRetention::Retain);
        let mut events = Vec::new();
        let key = CellKey::new(0, 0);

        registry.activate(key, &mut generation, &mut events);
        if let Some(entry) = registry.entry_mut(key) {
            entry.value = TokenValue::new(9);
        }
        registry.deactivate(key, &mut events);
        registry.activate(key, &mut generation, &mut events);

        let value = registry.entry(key).map(|entry| entry.value);
        assert_eq!(value, Some(TokenValue::new(9)));
        assert_eq!(registry.retained_value(key), None);
    }

    #[test]
    fn window_membership_is_half_open() {
        let center = CellKey::new(0, 0);
        assert!(in_window(center, 3, CellKey::new(-3, -3)));
        assert!(in_window(center, 3, CellKey::new(2, 2)));
        assert!(!in_window(center, 3, CellKey::new(3, 0)));
        assert!(!in_window(center, 3, CellKey::new(0, -4)));
        assert!(!in_window(center, 0, center));
    }
}
