//! Collateral model types.
//!
//! A [`CollateralCurrency`] is registered once by the administrator and is
//! immutable afterwards except for its `enabled` flag. A
//! [`CollateralPosition`] is the per-currency view of one user's deposits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CurrencyKey;

/// A currency accepted as collateral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralCurrency {
    /// Identity of the currency.
    pub key: CurrencyKey,
    /// Identifier of the upstream price feed serving this currency.
    pub price_feed_id: String,
    /// Disabled currencies reject new deposits; withdrawals stay open.
    pub enabled: bool,
}

impl CollateralCurrency {
    /// Register a new currency, enabled by default.
    #[must_use]
    pub fn new(key: CurrencyKey, price_feed_id: impl Into<String>) -> Self {
        Self {
            key,
            price_feed_id: price_feed_id.into(),
            enabled: true,
        }
    }
}

/// One user's deposited amount in a single collateral currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPosition {
    pub currency: CurrencyKey,
    pub deposited: Decimal,
}
