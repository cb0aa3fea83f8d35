//! Loads the world configuration from TOML and layers command-line overrides on top.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use geocoin_world::{TokenRetention, WorldConfig};

/// Settings given on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) neighborhood_size: Option<u32>,
    pub(crate) spawn_probability: Option<f64>,
    pub(crate) discard_tokens: bool,
}

impl Overrides {
    fn apply_to(self, config: &mut WorldConfig) {
        if let Some(radius) = self.neighborhood_size {
            config.neighborhood_size = radius;
        }
        if let Some(probability) = self.spawn_probability {
            config.spawn_probability = probability;
        }
        if self.discard_tokens {
            config.token_retention = TokenRetention::Discard;
        }
    }
}

/// Builds the world configuration from an optional file plus overrides.
///
/// The result is validated so a bad file is reported before the world starts.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<WorldConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse(&text).with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => WorldConfig::default(),
    };

    overrides.apply_to(&mut config);
    config.validate().context("invalid world configuration")?;
    tracing::debug!(?config, "configuration resolved");
    Ok(config)
}

fn parse(text: &str) -> Result<WorldConfig, toml::de::Error> {
    toml::from_str(text)
}
