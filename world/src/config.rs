use geocoin_core::Position;
use serde::Deserialize;
use thiserror::Error;

/// Largest window radius the world accepts.
pub const MAX_NEIGHBORHOOD_SIZE: u32 = 256;

/// What happens to a cache's token when it leaves the player's window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRetention {
    /// The token is remembered and restored when the cache reappears.
    #[default]
    Retain,
    /// The token is dropped and regenerated from the cell's luck on reentry.
    Discard,
}

/// Parameters that shape world generation and the player's window.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Edge length of a lattice cell in coordinate units.
    pub cell_size: f64,
    /// Window radius in cells around the player's cell.
    pub neighborhood_size: u32,
    /// Probability that any given cell holds a cache.
    pub spawn_probability: f64,
    /// South-west corner of cell `(0, 0)`; the player starts in that cell.
    pub origin: Position,
    /// Token policy applied when caches leave the window.
    pub token_retention: TokenRetention,
}

impl WorldConfig {
    /// Cell size used by the reference game.
    pub const DEFAULT_CELL_SIZE: f64 = 1e-4;
    /// Window radius used by the reference game.
    pub const DEFAULT_NEIGHBORHOOD_SIZE: u32 = 3;
    /// Cache spawn probability used by the reference game.
    pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
    /// Starting location used by the reference game.
    pub const DEFAULT_ORIGIN: Position = Position::new(36.997936938057016, -122.05703507501151);

    /// Checks that every parameter lies in its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }

        if self.neighborhood_size == 0 || self.neighborhood_size > MAX_NEIGHBORHOOD_SIZE {
            return Err(ConfigError::InvalidNeighborhoodSize {
                neighborhood_size: self.neighborhood_size,
            });
        }

        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidSpawnProbability {
                spawn_probability: self.spawn_probability,
            });
        }

        if !self.origin.lat.is_finite() || !self.origin.lng.is_finite() {
            return Err(ConfigError::InvalidOrigin {
                origin: self.origin,
            });
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            neighborhood_size: Self::DEFAULT_NEIGHBORHOOD_SIZE,
            spawn_probability: Self::DEFAULT_SPAWN_PROBABILITY,
            origin: Self::DEFAULT_ORIGIN,
            token_retention: TokenRetention::default(),
        }
    }
}

/// Reasons a [`WorldConfig`] is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Cells must have a positive, finite size.
    #[error("cell_size must be positive and finite (received {cell_size})")]
    InvalidCellSize {
        /// Provided cell size.
        cell_size: f64,
    },
    /// The window must span at least one cell and stay bounded.
    #[error(
        "neighborhood_size must be between 1 and {max} (received {neighborhood_size})",
        max = MAX_NEIGHBORHOOD_SIZE
    )]
    InvalidNeighborhoodSize {
        /// Provided window radius.
        neighborhood_size: u32,
    },
    /// Probabilities live in `[0, 1]`.
    #[error("spawn_probability must lie within [0, 1] (received {spawn_probability})")]
    InvalidSpawnProbability {
        /// Provided probability.
        spawn_probability: f64,
    },
    /// The origin must be a finite coordinate.
    #[error("origin must be finite (received {origin})")]
    InvalidOrigin {
        /// Provided origin.
        origin: Position,
    },
}
