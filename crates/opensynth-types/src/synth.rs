//! Synth model types.
//!
//! All synths share identical mint/burn semantics, so a single value type
//! distinguished by currency key is enough — no per-flavor dispatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CurrencyKey;

/// A synthetic asset tracking an external price.
///
/// Supply moves only through engine-authorized mint and burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synth {
    /// Identity of the synth.
    pub key: CurrencyKey,
    /// Human-readable token symbol (e.g. "syUSD").
    pub symbol: String,
    /// Outstanding supply across all holders.
    pub total_supply: Decimal,
    /// Hard ceiling on `total_supply`.
    pub supply_cap: Decimal,
}

impl Synth {
    /// Create a synth with zero supply.
    #[must_use]
    pub fn new(key: CurrencyKey, symbol: impl Into<String>, supply_cap: Decimal) -> Self {
        Self {
            key,
            symbol: symbol.into(),
            total_supply: Decimal::ZERO,
            supply_cap,
        }
    }
}

/// Result of a `remaining_issuable_synths` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingIssuable {
    /// How much more synth value the user could mint right now.
    pub max_issuable: Decimal,
    /// The user's current debt value.
    pub already_issued: Decimal,
    /// Price-weighted value of all outstanding synth supply.
    pub total_system_debt: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_synth_has_zero_supply() {
        let s = Synth::new(CurrencyKey::new("syUSD"), "syUSD", Decimal::new(1_000_000, 0));
        assert_eq!(s.total_supply, Decimal::ZERO);
        assert_eq!(s.supply_cap, Decimal::new(1_000_000, 0));
    }

    #[test]
    fn synth_serde_roundtrip() {
        let s = Synth::new(CurrencyKey::new("syETH"), "syETH", Decimal::new(500_000, 0));
        let json = serde_json::to_string(&s).unwrap();
        let back: Synth = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
