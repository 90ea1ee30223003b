//! Configuration for the OpenSynth issuance engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, CurrencyKey, UserId};

/// Configuration for a single issuance engine instance.
///
/// Constructed once at startup; the issuance ratio and per-synth supply
/// caps remain adjustable at runtime through the engine's administrative
/// surface, gated on `owner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The administrator account for currency/synth/parameter changes.
    pub owner: UserId,
    /// Key of the base synth credited by issuance — the unit of account,
    /// always priced at exactly 1.
    pub base_synth_key: CurrencyKey,
    /// Initial maximum debt-to-collateral fraction.
    pub issuance_ratio: Decimal,
    /// Maximum oracle quote age accepted by mutating operations.
    pub max_price_age_secs: u64,
}

impl EngineConfig {
    /// Create a config with protocol defaults for everything but the owner.
    #[must_use]
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            base_synth_key: CurrencyKey::new(constants::DEFAULT_BASE_SYNTH_KEY),
            issuance_ratio: constants::default_issuance_ratio(),
            max_price_age_secs: constants::DEFAULT_MAX_PRICE_AGE_SECS,
        }
    }
}
