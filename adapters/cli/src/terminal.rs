//! Line-oriented presentation layer that narrates the game as text.

use std::{
    collections::HashMap,
    io::{self, Write},
};

use geocoin_core::{CellBounds, CellKey, ExchangeLabel, Position, TokenValue};
use geocoin_presentation::{PresentationLayer, ViewHandle};
use geocoin_world::{query, World};

/// Writes presentation updates as lines of text.
///
/// [`PresentationLayer`] calls cannot fail, so the first write error is kept
/// and reported by [`TerminalLayer::flush`].
#[derive(Debug)]
pub(crate) struct TerminalLayer<W: Write> {
    out: W,
    next_handle: u64,
    caches: HashMap<ViewHandle, CellKey>,
    error: Option<io::Error>,
}

impl<W: Write> TerminalLayer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            next_handle: 0,
            caches: HashMap::new(),
            error: None,
        }
    }

    /// Prints a free-form line such as the banner or a rejected command.
    pub(crate) fn notice(&mut self, message: &str) {
        self.line(format_args!("{message}"));
    }

    /// Prints the player's status and every cache in view.
    pub(crate) fn describe(&mut self, world: &World) {
        let cell = query::player_cell(world);
        self.line(format_args!(
            "you stand in cell {cell} holding {}",
            query::held_value(world)
        ));

        let view = query::cache_view(world);
        let mut empty = true;
        for cache in view.iter() {
            empty = false;
            let offer = cache
                .surface
                .map(|(_, label)| format!(" [open: {label}]"))
                .unwrap_or_default();
            self.line(format_args!(
                "  cache {} holds {}{offer}",
                cache.key, cache.value
            ));
        }
        if empty {
            self.line(format_args!("  no caches in view"));
        }
    }

    /// Flushes buffered output, surfacing any write error seen so far.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.out, "{args}") {
            self.error = Some(error);
        }
    }
}

impl<W: Write> PresentationLayer for TerminalLayer<W> {
    fn create_cache_view(
        &mut self,
        key: CellKey,
        _bounds: CellBounds,
        value: TokenValue,
    ) -> ViewHandle {
        self.next_handle += 1;
        let handle = ViewHandle::new(self.next_handle);
        let _ = self.caches.insert(handle, key);
        self.line(format_args!("a cache appears at {key} holding {value}"));
        handle
    }

    fn destroy_cache_view(&mut self, handle: ViewHandle) {
        if let Some(key) = self.caches.remove(&handle) {
            self.line(format_args!("the cache at {key} fades from view"));
        }
    }

    fn update_player_view(&mut self, position: Position, cell: CellKey) {
        self.line(format_args!("you are at {position}, cell {cell}"));
    }

    fn render_interaction_surface(
        &mut self,
        key: CellKey,
        label: ExchangeLabel,
        value: TokenValue,
    ) {
        self.line(format_args!(
            "cache {key} carries a token of {value}; `poke {key}` to {label}"
        ));
    }

    fn refresh_interaction_surface(
        &mut self,
        key: CellKey,
        label: ExchangeLabel,
        value: TokenValue,
    ) {
        self.line(format_args!("{label}: cache {key} now carries {value}"));
    }

    fn close_interaction_surface(&mut self, key: CellKey) {
        self.line(format_args!("cache {key} closed"));
    }

    fn update_held_value(&mut self, value: TokenValue) {
        self.line(format_args!("your token value: {value}"));
    }
}
