#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geocoin engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that adapters
//! translate into presentation updates.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geocoin.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves the player a single cell in the provided direction.
    Move {
        /// Direction of travel for the step.
        direction: Direction,
    },
    /// Places the player at an arbitrary position, such as a location fix.
    Relocate {
        /// Position the player should occupy afterwards.
        position: Position,
    },
    /// Opens the interaction surface of an active cache.
    OpenCache {
        /// Cell anchoring the cache.
        key: CellKey,
    },
    /// Applies the exchange offered by the cache's open interaction surface.
    Interact {
        /// Cell anchoring the cache.
        key: CellKey,
    },
    /// Closes the interaction surface of a cache.
    CloseCache {
        /// Cell anchoring the cache.
        key: CellKey,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a cache materialized inside the player's window.
    CacheSpawned {
        /// Cell anchoring the cache.
        key: CellKey,
        /// Spatial extent of the cell.
        bounds: CellBounds,
        /// Token value held by the cache at activation.
        value: TokenValue,
    },
    /// Confirms that a cache left the player's window.
    CacheDespawned {
        /// Cell that anchored the cache.
        key: CellKey,
    },
    /// Confirms that the player occupies a new position.
    PlayerMoved {
        /// Continuous position of the player.
        position: Position,
        /// Cell containing the position.
        cell: CellKey,
    },
    /// Announces that an interaction surface opened with a fixed offer.
    SurfaceOpened {
        /// Cell anchoring the cache.
        key: CellKey,
        /// Action the surface will apply when triggered.
        action: ExchangeAction,
        /// Display label of the offered action.
        label: ExchangeLabel,
        /// Token value held by the cache.
        value: TokenValue,
    },
    /// Reports the outcome of an applied exchange.
    ExchangeApplied {
        /// Cell anchoring the cache.
        key: CellKey,
        /// Action that was applied.
        action: ExchangeAction,
        /// Display label of the surface that applied the action.
        label: ExchangeLabel,
        /// Token value left in the cache.
        cache_value: TokenValue,
        /// Token value now held by the player.
        held_value: TokenValue,
    },
    /// Announces that an interaction surface closed.
    SurfaceClosed {
        /// Cell anchoring the cache.
        key: CellKey,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing latitude.
    North,
    /// Movement toward increasing longitude.
    East,
    /// Movement toward decreasing latitude.
    South,
    /// Movement toward decreasing longitude.
    West,
}

impl Direction {
    /// Unit offset along the `(i, j)` lattice axes.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::East => (0, 1),
            Self::South => (-1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Location of a single lattice cell.
///
/// `i` runs along latitude and `j` along longitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    i: i32,
    j: i32,
}

impl CellKey {
    /// Creates a new cell key.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Index along the latitude axis.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Index along the longitude axis.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Returns the key displaced by the provided lattice offsets.
    #[must_use]
    pub const fn offset(self, di: i32, dj: i32) -> Self {
        Self::new(self.i.saturating_add(di), self.j.saturating_add(dj))
    }

    /// Key used to derive the cache's initial token value.
    #[must_use]
    pub fn initial_value_key(&self) -> String {
        format!("{self}:initialValue")
    }
}

/// Canonical `"i,j"` form used as luck input.
impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

/// Continuous coordinate expressed in latitude and longitude units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Latitude component.
    pub lat: f64,
    /// Longitude component.
    pub lng: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn to_vec(self) -> DVec2 {
        DVec2::new(self.lat, self.lng)
    }

    fn from_vec(vec: DVec2) -> Self {
        Self::new(vec.x, vec.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Axis-aligned extent of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    south_west: Position,
    north_east: Position,
}

impl CellBounds {
    /// Creates bounds from the south-west and north-east corners.
    #[must_use]
    pub const fn new(south_west: Position, north_east: Position) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Corner with the lowest latitude and longitude.
    #[must_use]
    pub const fn south_west(&self) -> Position {
        self.south_west
    }

    /// Corner with the highest latitude and longitude.
    #[must_use]
    pub const fn north_east(&self) -> Position {
        self.north_east
    }

    /// Reports whether the position lies inside the half-open bounds.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.lat >= self.south_west.lat
            && position.lat < self.north_east.lat
            && position.lng >= self.south_west.lng
            && position.lng < self.north_east.lng
    }
}

/// Maps continuous positions onto the integer cell lattice and back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridIndex {
    origin: Position,
    cell_size: f64,
}

impl GridIndex {
    /// Creates a grid anchored at `origin` with square cells of `cell_size`.
    ///
    /// Callers are expected to supply a positive, finite cell size.
    #[must_use]
    pub const fn new(origin: Position, cell_size: f64) -> Self {
        Self { origin, cell_size }
    }

    /// Position of the south-west corner of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Edge length of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing the provided position.
    #[must_use]
    pub fn cell_of(&self, position: Position) -> CellKey {
        let cell = ((position.to_vec() - self.origin.to_vec()) / self.cell_size).floor();
        // Float-to-int casts saturate, so far-away positions clamp to the lattice edge.
        CellKey::new(cell.x as i32, cell.y as i32)
    }

    /// Spatial extent of the provided cell.
    #[must_use]
    pub fn bounds_of(&self, key: CellKey) -> CellBounds {
        let corner = self.corner(key);
        CellBounds::new(
            Position::from_vec(corner),
            Position::from_vec(corner + DVec2::splat(self.cell_size)),
        )
    }

    /// Midpoint of the provided cell.
    #[must_use]
    pub fn center_of(&self, key: CellKey) -> Position {
        Position::from_vec(self.corner(key) + DVec2::splat(self.cell_size * 0.5))
    }

    /// Position displaced by a single cell in the provided direction.
    #[must_use]
    pub fn step(&self, position: Position, direction: Direction) -> Position {
        let (di, dj) = direction.offset();
        let delta = DVec2::new(f64::from(di), f64::from(dj)) * self.cell_size;
        Position::from_vec(position.to_vec() + delta)
    }

    fn corner(&self, key: CellKey) -> DVec2 {
        self.origin.to_vec() + DVec2::new(f64::from(key.i()), f64::from(key.j())) * self.cell_size
    }
}

/// Scalar token exchanged between the player and caches.
///
/// Zero means "holding nothing".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenValue(u64);

impl TokenValue {
    /// Empty token.
    pub const ZERO: Self = Self(0);

    /// Creates a token with the provided value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Reports whether the token is empty.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Sum of two tokens, saturating at the numeric limit.
    #[must_use]
    pub const fn combined_with(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effect applied when an interaction surface is triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeAction {
    /// Player and cache trade their tokens.
    Swap,
    /// The cache's token merges into the player's equal token.
    Combine,
}

/// Label shown to the player for an offered exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeLabel {
    /// Empty-handed player picks up the cache's token.
    Get,
    /// Player leaves their token in an empty cache.
    Offer,
    /// Player and cache trade non-empty tokens.
    Swap,
    /// Player merges an equal token.
    Combine,
}

impl ExchangeLabel {
    /// Lowercase text rendered on the interaction surface.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Offer => "offer",
            Self::Swap => "swap",
            Self::Combine => "combine",
        }
    }
}

impl fmt::Display for ExchangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic pseudo-random function from a string key onto `[0, 1)`.
///
/// Implementations must return the same value for the same key on every call
/// and across process restarts.
pub trait Luck: fmt::Debug {
    /// Returns the luck value associated with `key`.
    fn luck(&self, key: &str) -> f64;
}

/// Contract violations reported by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The command referenced a cache that is not active.
    #[error("no active cache at cell {key}")]
    InvalidState {
        /// Cell referenced by the command.
        key: CellKey,
    },
}
