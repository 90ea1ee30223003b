//! Per-operation price snapshots.
//!
//! Every engine operation captures the prices it needs exactly once, up
//! front, and reads only from the snapshot afterwards — the moral
//! equivalent of snapshot isolation for a single-threaded sequencer.
//! Staleness is checked at capture time; a stale constituent fails the
//! whole capture.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use opensynth_oracle::{PriceOracle, StalenessPolicy};
use opensynth_types::{CurrencyKey, OpensynthError, Result};
use rust_decimal::Decimal;

/// Immutable set of prices backing one engine operation.
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    prices: HashMap<CurrencyKey, Decimal>,
    taken_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Capture fresh prices for `keys` from the oracle.
    ///
    /// Duplicate keys are read once.
    ///
    /// # Errors
    /// `PriceNotFound` for unknown keys; `StalePrice` if any quote is older
    /// than the policy allows at `now`.
    pub fn capture<O, I>(
        oracle: &O,
        keys: I,
        policy: StalenessPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self>
    where
        O: PriceOracle,
        I: IntoIterator<Item = CurrencyKey>,
    {
        let mut prices = HashMap::new();
        for key in keys {
            if prices.contains_key(&key) {
                continue;
            }
            let quote = oracle.price(&key)?;
            policy.ensure_fresh(&key, &quote, now)?;
            prices.insert(key, quote.value);
        }
        Ok(Self {
            prices,
            taken_at: now,
        })
    }

    /// Pin a fixed price into the snapshot — used for the base synth,
    /// which is the unit of account and always worth exactly 1.
    pub fn pin(&mut self, key: CurrencyKey, value: Decimal) {
        self.prices.insert(key, value);
    }

    /// Price of a currency within this snapshot.
    ///
    /// # Errors
    /// `PriceNotFound` if the key was not captured — an operation asking
    /// for a price it never declared.
    pub fn price(&self, key: &CurrencyKey) -> Result<Decimal> {
        self.prices
            .get(key)
            .copied()
            .ok_or_else(|| OpensynthError::PriceNotFound(key.clone()))
    }

    /// When the snapshot was taken.
    #[must_use]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}
