//! Price quotes and the caller-side staleness policy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use opensynth_types::{constants, CurrencyKey, OpensynthError, Result};

/// A price observation for one currency, in canonical units per unit of
/// the currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price in the canonical unit (18 fractional digits).
    pub value: Decimal,
    /// When the upstream feed last updated this price.
    pub updated_at: DateTime<Utc>,
}

impl PriceQuote {
    #[must_use]
    pub fn new(value: Decimal, updated_at: DateTime<Utc>) -> Self {
        Self { value, updated_at }
    }

    /// Age of the quote at `now`, in whole seconds. Quotes from the future
    /// (clock skew) report zero.
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_seconds().max(0)
    }
}

/// Caller-configured maximum quote age.
///
/// Mutating operations must treat a stale quote as a hard failure; the
/// policy is evaluated synchronously at the time of use — there is no
/// background refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessPolicy {
    pub max_age_secs: u64,
}

impl StalenessPolicy {
    #[must_use]
    pub fn new(max_age_secs: u64) -> Self {
        Self { max_age_secs }
    }

    /// Whether the quote is too old to use at `now`.
    #[must_use]
    pub fn is_stale(&self, quote: &PriceQuote, now: DateTime<Utc>) -> bool {
        quote.age_secs(now) > i64::try_from(self.max_age_secs).unwrap_or(i64::MAX)
    }

    /// Error with [`OpensynthError::StalePrice`] if the quote is stale.
    pub fn ensure_fresh(
        &self,
        key: &CurrencyKey,
        quote: &PriceQuote,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.is_stale(quote, now) {
            return Err(OpensynthError::StalePrice {
                key: key.clone(),
                age_secs: quote.age_secs(now),
                max_age_secs: self.max_age_secs,
            });
        }
        Ok(())
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(constants::DEFAULT_MAX_PRICE_AGE_SECS)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn quote_age() {
        let now = Utc::now();
        let quote = PriceQuote::new(Decimal::new(2000, 0), now - Duration::seconds(90));
        assert_eq!(quote.age_secs(now), 90);
    }

    #[test]
    fn future_quote_has_zero_age() {
        let now = Utc::now();
        let quote = PriceQuote::new(Decimal::ONE, now + Duration::seconds(30));
        assert_eq!(quote.age_secs(now), 0);
    }

    #[test]
    fn fresh_quote_passes() {
        let now = Utc::now();
        let policy = StalenessPolicy::new(3600);
        let quote = PriceQuote::new(Decimal::ONE, now - Duration::seconds(3600));
        assert!(!policy.is_stale(&quote, now));
        assert!(policy
            .ensure_fresh(&CurrencyKey::new("ETH"), &quote, now)
            .is_ok());
    }

    #[test]
    fn stale_quote_rejected() {
        let now = Utc::now();
        let policy = StalenessPolicy::new(3600);
        let quote = PriceQuote::new(Decimal::ONE, now - Duration::seconds(3601));
        let err = policy
            .ensure_fresh(&CurrencyKey::new("ETH"), &quote, now)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::StalePrice { .. }));
    }

    #[test]
    fn default_policy_uses_constant() {
        assert_eq!(
            StalenessPolicy::default().max_age_secs,
            constants::DEFAULT_MAX_PRICE_AGE_SECS
        );
    }

    #[test]
    fn quote_serde_roundtrip() {
        let quote = PriceQuote::new(Decimal::new(298_500_000, 8), Utc::now());
        let json = serde_json::to_string(&quote).unwrap();
        let back: PriceQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote, back);
    }
}
