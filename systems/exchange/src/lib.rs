#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Token exchange protocol between the player and a single cache.
//!
//! An [`Exchange`] is evaluated once when a cache's interaction surface opens
//! and stays fixed for that opening. Applying it repeatedly reuses the
//! evaluated action rather than re-deciding from the current tokens.

use geocoin_core::{ExchangeAction, ExchangeLabel, TokenValue};

/// Offer captured when an interaction surface opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Exchange {
    action: ExchangeAction,
    label: ExchangeLabel,
}

impl Exchange {
    /// Decides the exchange available for the provided tokens.
    #[must_use]
    pub fn evaluate(held: TokenValue, cache: TokenValue) -> Self {
        if cache == held && !cache.is_zero() {
            return Self {
                action: ExchangeAction::Combine,
                label: ExchangeLabel::Combine,
            };
        }

        let label = if held.is_zero() {
            ExchangeLabel::Get
        } else if cache.is_zero() {
            ExchangeLabel::Offer
        } else {
            ExchangeLabel::Swap
        };

        Self {
            action: ExchangeAction::Swap,
            label,
        }
    }

    /// Action applied when the surface is triggered.
    #[must_use]
    pub const fn action(&self) -> ExchangeAction {
        self.action
    }

    /// Label displayed on the surface.
    #[must_use]
    pub const fn label(&self) -> ExchangeLabel {
        self.label
    }

    /// Applies the captured action to the provided tokens.
    #[must_use]
    pub fn apply(&self, held: TokenValue, cache: TokenValue) -> Outcome {
        match self.action {
            ExchangeAction::Swap => Outcome {
                held: cache,
                cache: held,
            },
            ExchangeAction::Combine => Outcome {
                held: held.combined_with(cache),
                cache: TokenValue::ZERO,
            },
        }
    }
}

/// Tokens held by the player and the cache after an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// Token now held by the player.
    pub held: TokenValue,
    /// Token now held by the cache.
    pub cache: TokenValue,
}
