//! # opensynth-oracle
//!
//! Price lookup for the OpenSynth issuance engine.
//!
//! The engine never talks to a price feed directly — it consumes the
//! [`PriceOracle`] trait, injected at construction. Staleness is not a
//! property of the oracle but of the caller: every quote carries its
//! `updated_at` timestamp and the caller applies a [`StalenessPolicy`].
//!
//! [`StaticOracle`] is the deterministic in-memory implementation used by
//! the test suites and local fixtures; it never performs network calls.

pub mod quote;
pub mod static_oracle;

pub use quote::{PriceQuote, StalenessPolicy};
pub use static_oracle::StaticOracle;

use opensynth_types::{CurrencyKey, Result};

/// Price lookup per currency key.
///
/// Implementations return the most recent quote they hold;
/// [`opensynth_types::OpensynthError::PriceNotFound`] when the key is
/// unknown. They never judge freshness — that is the caller's decision.
pub trait PriceOracle {
    fn price(&self, key: &CurrencyKey) -> Result<PriceQuote>;
}
