#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Geocoin.

mod config;
mod registry;
mod spawn_decisions;

use geocoin_core::{
    CellKey, Command, Event, GridIndex, Luck, Position, TokenValue, WorldError, WELCOME_BANNER,
};
use geocoin_system_exchange::Exchange;

use crate::{
    registry::{CacheRegistry, Generation},
    spawn_decisions::SpawnDecisions,
};

pub use crate::config::{ConfigError, TokenRetention, WorldConfig, MAX_NEIGHBORHOOD_SIZE};

/// Represents the authoritative Geocoin world state.
///
/// Owns the spawn decisions, the active caches and the player. All mutation
/// flows through [`apply`], one command at a time.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    grid: GridIndex,
    luck: Box<dyn Luck>,
    decisions: SpawnDecisions,
    registry: CacheRegistry,
    player: Player,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Position,
    held: TokenValue,
}

impl World {
    /// Creates a world with the player standing in the origin cell.
    ///
    /// The initial window is materialized immediately; the resulting spawn
    /// and movement events are appended to `out_events` so adapters can draw
    /// the starting state.
    pub fn new<L>(
        config: WorldConfig,
        luck: L,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, ConfigError>
    where
        L: Luck + 'static,
    {
        config.validate()?;

        let grid = GridIndex::new(config.origin, config.cell_size);
        let position = grid.center_of(CellKey::new(0, 0));
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid,
            luck: Box::new(luck),
            decisions: SpawnDecisions::new(config.spawn_probability),
            registry: CacheRegistry::new(config.token_retention),
            player: Player {
                position,
                held: TokenValue::ZERO,
            },
            config,
        };
        tracing::info!(
            origin = %world.config.origin,
            radius = world.config.neighborhood_size,
            "world created"
        );
        world.relocate(position, out_events);
        Ok(world)
    }

    fn relocate(&mut self, position: Position, out_events: &mut Vec<Event>) {
        self.player.position = position;
        let cell = self.grid.cell_of(position);

        let mut generation = Generation {
            luck: self.luck.as_ref(),
            decisions: &mut self.decisions,
            grid: &self.grid,
        };
        self.registry.set_window(
            cell,
            self.config.neighborhood_size,
            &mut generation,
            out_events,
        );

        tracing::debug!(%cell, %position, "player moved");
        out_events.push(Event::PlayerMoved { position, cell });
    }

    fn open_surface(
        &mut self,
        key: CellKey,
        out_events: &mut Vec<Event>,
    ) -> Result<Exchange, WorldError> {
        let held = self.player.held;
        let entry = self
            .registry
            .entry_mut(key)
            .ok_or(WorldError::InvalidState { key })?;

        let exchange = Exchange::evaluate(held, entry.value);
        entry.surface = Some(exchange);
        out_events.push(Event::SurfaceOpened {
            key,
            action: exchange.action(),
            label: exchange.label(),
            value: entry.value,
        });
        Ok(exchange)
    }

    fn interact(&mut self, key: CellKey, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let opened = self
            .registry
            .entry(key)
            .ok_or(WorldError::InvalidState { key })?
            .surface;
        let exchange = match opened {
            Some(exchange) => exchange,
            None => self.open_surface(key, out_events)?,
        };

        let entry = self
            .registry
            .entry_mut(key)
            .ok_or(WorldError::InvalidState { key })?;
        let outcome = exchange.apply(self.player.held, entry.value);
        entry.value = outcome.cache;
        self.player.held = outcome.held;

        tracing::debug!(
            %key,
            label = %exchange.label(),
            cache = %outcome.cache,
            held = %outcome.held,
            "exchange applied"
        );
        out_events.push(Event::ExchangeApplied {
            key,
            action: exchange.action(),
            label: exchange.label(),
            cache_value: outcome.cache,
            held_value: outcome.held,
        });
        Ok(())
    }

    fn close_surface(&mut self, key: CellKey, out_events: &mut Vec<Event>) {
        let closed = self
            .registry
            .entry_mut(key)
            .and_then(|entry| entry.surface.take());
        if closed.is_some() {
            out_events.push(Event::SurfaceClosed { key });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Returns [`WorldError::InvalidState`] when `OpenCache` or `Interact` target a
/// cell without an active cache; nothing is mutated or emitted in that case.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::Move { direction } => {
            let position = world.grid.step(world.player.position, direction);
            world.relocate(position, out_events);
        }
        Command::Relocate { position } => {
            world.relocate(position, out_events);
        }
        Command::OpenCache { key } => {
            let _ = world.open_surface(key, out_events)?;
        }
        Command::Interact { key } => {
            world.interact(key, out_events)?;
        }
        Command::CloseCache { key } => {
            world.close_surface(key, out_events);
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use geocoin_core::{CellKey, ExchangeAction, ExchangeLabel, GridIndex, Position, TokenValue};

    use super::{registry, World, WorldConfig};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Lattice used to place caches and the player.
    #[must_use]
    pub fn grid(world: &World) -> &GridIndex {
        &world.grid
    }

    /// Continuous position of the player.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player.position
    }

    /// Cell at the center of the player's window.
    #[must_use]
    pub fn player_cell(world: &World) -> CellKey {
        world.grid.cell_of(world.player.position)
    }

    /// Token currently held by the player.
    #[must_use]
    pub fn held_value(world: &World) -> TokenValue {
        world.player.held
    }

    /// Reports whether `key` lies inside the player's current window.
    #[must_use]
    pub fn in_window(world: &World, key: CellKey) -> bool {
        registry::in_window(player_cell(world), world.config.neighborhood_size, key)
    }

    /// Spawn decision recorded for `key`, or `None` when the cell was never queried.
    #[must_use]
    pub fn spawn_decision(world: &World, key: CellKey) -> Option<bool> {
        world.decisions.decided(key)
    }

    /// Number of cells with a recorded spawn decision.
    #[must_use]
    pub fn decided_cell_count(world: &World) -> usize {
        world.decisions.len()
    }

    /// Token remembered for a cache outside the window, if any.
    #[must_use]
    pub fn retained_value(world: &World, key: CellKey) -> Option<TokenValue> {
        world.registry.retained_value(key)
    }

    /// Snapshot of the active cache at `key`.
    #[must_use]
    pub fn cache(world: &World, key: CellKey) -> Option<CacheSnapshot> {
        world
            .registry
            .entry(key)
            .map(|entry| CacheSnapshot::capture(key, entry))
    }

    /// Captures a read-only view of the active caches in ascending key order.
    #[must_use]
    pub fn cache_view(world: &World) -> CacheView {
        CacheView {
            snapshots: world
                .registry
                .iter()
                .map(|(key, entry)| CacheSnapshot::capture(key, entry))
                .collect(),
        }
    }

    /// Read-only snapshot describing all active caches.
    #[derive(Clone, Debug, Default)]
    pub struct CacheView {
        snapshots: Vec<CacheSnapshot>,
    }

    impl CacheView {
        /// Iterator over the captured caches in ascending key order.
        pub fn iter(&self) -> impl Iterator<Item = &CacheSnapshot> {
            self.snapshots.iter()
        }

        /// Keys of the captured caches.
        pub fn keys(&self) -> impl Iterator<Item = CellKey> + '_ {
            self.snapshots.iter().map(|snapshot| snapshot.key)
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CacheSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single cache used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CacheSnapshot {
        /// Cell anchoring the cache.
        pub key: CellKey,
        /// Token held by the cache.
        pub value: TokenValue,
        /// Offer fixed by the open interaction surface, if one is open.
        pub surface: Option<(ExchangeAction, ExchangeLabel)>,
    }

    impl CacheSnapshot {
        fn capture(key: CellKey, entry: &registry::CacheEntry) -> Self {
            Self {
                key,
                value: entry.value,
                surface: entry
                    .surface
                    .map(|exchange| (exchange.action(), exchange.label())),
            }
        }
    }
}
