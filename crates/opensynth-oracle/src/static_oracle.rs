//! Deterministic in-memory oracle.
//!
//! The controllable price source for tests and local fixtures: prices are
//! set explicitly, timestamps included, so staleness behavior is fully
//! scriptable. Replaces the mutable aggregator contracts test fixtures use
//! upstream.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use opensynth_types::{CurrencyKey, OpensynthError, Result};

use crate::{PriceOracle, PriceQuote};

/// In-memory [`PriceOracle`] with explicitly set quotes.
#[derive(Debug, Default)]
pub struct StaticOracle {
    quotes: HashMap<CurrencyKey, PriceQuote>,
}

impl StaticOracle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
        }
    }

    /// Set the quote for a currency.
    pub fn set_price(&mut self, key: CurrencyKey, value: Decimal, updated_at: DateTime<Utc>) {
        self.quotes.insert(key, PriceQuote::new(value, updated_at));
    }

    /// Set the quote for a currency, stamped with the current time.
    pub fn set_price_now(&mut self, key: CurrencyKey, value: Decimal) {
        self.set_price(key, value, Utc::now());
    }

    /// Re-stamp an existing quote without changing its value.
    pub fn touch(&mut self, key: &CurrencyKey, updated_at: DateTime<Utc>) {
        if let Some(quote) = self.quotes.get_mut(key) {
            quote.updated_at = updated_at;
        }
    }
}

impl PriceOracle for StaticOracle {
    fn price(&self, key: &CurrencyKey) -> Result<PriceQuote> {
        self.quotes
            .get(key)
            .copied()
            .ok_or_else(|| OpensynthError::PriceNotFound(key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn set_and_read_price() {
        let mut oracle = StaticOracle::new();
        oracle.set_price_now(CurrencyKey::new("ETH"), Decimal::new(2000, 0));
        let quote = oracle.price(&CurrencyKey::new("ETH")).unwrap();
        assert_eq!(quote.value, Decimal::new(2000, 0));
    }

    #[test]
    fn unknown_key_fails() {
        let oracle = StaticOracle::new();
        let err = oracle.price(&CurrencyKey::new("DASH")).unwrap_err();
        assert!(matches!(err, OpensynthError::PriceNotFound(_)));
    }

    #[test]
    fn touch_restamps_quote() {
        let mut oracle = StaticOracle::new();
        let old = Utc::now() - Duration::seconds(7200);
        let key = CurrencyKey::new("ETH");
        oracle.set_price(key.clone(), Decimal::new(2000, 0), old);

        let fresh = Utc::now();
        oracle.touch(&key, fresh);
        let quote = oracle.price(&key).unwrap();
        assert_eq!(quote.updated_at, fresh);
        assert_eq!(quote.value, Decimal::new(2000, 0));
    }
}
