#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Geocoin adapters.
//!
//! The world never draws anything. Adapters implement [`PresentationLayer`]
//! and feed world events through a [`Presenter`], which owns the mapping from
//! cells to view handles and turns each event into the matching call.

use std::collections::HashMap;

use geocoin_core::{CellBounds, CellKey, Event, ExchangeLabel, Position, TokenValue};

/// Opaque handle identifying a cache view created by a presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewHandle(u64);

impl ViewHandle {
    /// Creates a new handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Presentation layer capable of displaying Geocoin state.
///
/// Destroying an unknown handle or refreshing a surface that is not shown
/// must be a silent no-op.
pub trait PresentationLayer {
    /// Draws a cache occupying `bounds` and returns a handle to it.
    fn create_cache_view(
        &mut self,
        key: CellKey,
        bounds: CellBounds,
        value: TokenValue,
    ) -> ViewHandle;

    /// Removes a previously created cache view.
    fn destroy_cache_view(&mut self, handle: ViewHandle);

    /// Moves the player marker.
    fn update_player_view(&mut self, position: Position, cell: CellKey);

    /// Shows the interaction surface for a cache with its offered action.
    fn render_interaction_surface(
        &mut self,
        key: CellKey,
        label: ExchangeLabel,
        value: TokenValue,
    );

    /// Updates an open interaction surface after an exchange.
    fn refresh_interaction_surface(
        &mut self,
        key: CellKey,
        label: ExchangeLabel,
        value: TokenValue,
    );

    /// Hides the interaction surface for a cache.
    fn close_interaction_surface(&mut self, key: CellKey);

    /// Updates the status display of the player's token.
    fn update_held_value(&mut self, value: TokenValue);
}

/// Routes world events onto a [`PresentationLayer`].
#[derive(Debug, Default)]
pub struct Presenter {
    views: HashMap<CellKey, ViewHandle>,
}

impl Presenter {
    /// Creates a presenter with no views.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cache views currently alive.
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Handle of the view drawn for `key`, if any.
    #[must_use]
    pub fn view_for(&self, key: CellKey) -> Option<ViewHandle> {
        self.views.get(&key).copied()
    }

    /// Translates each event into presentation calls, in order.
    pub fn present<P>(&mut self, events: &[Event], layer: &mut P)
    where
        P: PresentationLayer + ?Sized,
    {
        for event in events {
            match *event {
                Event::CacheSpawned { key, bounds, value } => {
                    let handle = layer.create_cache_view(key, bounds, value);
                    if let Some(stale) = self.views.insert(key, handle) {
                        tracing::warn!(%key, handle = stale.get(), "replaced live cache view");
                        layer.destroy_cache_view(stale);
                    }
                }
                Event::CacheDespawned { key } => {
                    if let Some(handle) = self.views.remove(&key) {
                        layer.destroy_cache_view(handle);
                    }
                }
                Event::PlayerMoved { position, cell } => {
                    layer.update_player_view(position, cell);
                }
                Event::SurfaceOpened {
                    key, label, value, ..
                } => {
                    layer.render_interaction_surface(key, label, value);
                }
                Event::ExchangeApplied {
                    key,
                    label,
                    cache_value,
                    held_value,
                    ..
                } => {
                    layer.refresh_interaction_surface(key, label, cache_value);
                    layer.update_held_value(held_value);
                }
                Event::SurfaceClosed { key } => {
                    layer.close_interaction_surface(key);
                }
            }
        }
    }
}
