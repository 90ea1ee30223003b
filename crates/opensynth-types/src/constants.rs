//! System-wide constants for the OpenSynth issuance engine.

use rust_decimal::Decimal;

/// Fractional digits carried by all monetary and ratio values.
pub const VALUE_DP: u32 = 18;

/// Default maximum oracle quote age in seconds before a price is stale.
pub const DEFAULT_MAX_PRICE_AGE_SECS: u64 = 3600;

/// Default key of the base synth (the unit of account).
pub const DEFAULT_BASE_SYNTH_KEY: &str = "syUSD";

/// Default issuance ratio: 0.285714286 ≈ 1/3.5, i.e. a 350% target
/// collateralization ratio.
#[must_use]
pub fn default_issuance_ratio() -> Decimal {
    Decimal::new(285_714_286, 9)
}

/// Default per-synth supply cap (1,000,000 canonical units).
#[must_use]
pub fn default_supply_cap() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenSynth";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuance_ratio_is_two_sevenths_ish() {
        // 0.285714286 × 3.5 ≈ 1 (to nine digits).
        let ratio = default_issuance_ratio();
        let product = ratio * Decimal::new(35, 1);
        assert_eq!(product, Decimal::new(1_000_000_001, 9));
    }

    #[test]
    fn defaults_positive() {
        assert!(default_issuance_ratio() > Decimal::ZERO);
        assert!(default_issuance_ratio() <= Decimal::ONE);
        assert!(default_supply_cap() > Decimal::ZERO);
    }
}
