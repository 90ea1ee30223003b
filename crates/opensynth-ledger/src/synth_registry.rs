//! Synth registry: metadata, balances, and supply caps for every synth.
//!
//! Supply moves only through [`SynthRegistry::mint`] and
//! [`SynthRegistry::burn`]; both are reachable solely from the engine,
//! which is what makes issuance "authorized".

use std::collections::HashMap;

use opensynth_types::{math, CurrencyKey, OpensynthError, Result, Synth, UserId};
use rust_decimal::Decimal;

/// The set of registered synths and all holder balances.
#[derive(Debug)]
pub struct SynthRegistry {
    /// Registered synths by currency key.
    synths: HashMap<CurrencyKey, Synth>,
    /// Per-(synth, user) balances.
    balances: HashMap<(CurrencyKey, UserId), Decimal>,
}

impl SynthRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            synths: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    /// Add a synth to the registry.
    ///
    /// # Errors
    /// Returns `DuplicateSynth` if the key is already taken.
    pub fn add_synth(&mut self, synth: Synth) -> Result<()> {
        if self.synths.contains_key(&synth.key) {
            return Err(OpensynthError::DuplicateSynth(synth.key));
        }
        self.synths.insert(synth.key.clone(), synth);
        Ok(())
    }

    /// Change a synth's supply cap. A cap below the current supply is
    /// allowed — it blocks further minting without touching balances.
    ///
    /// # Errors
    /// `SynthNotFound` for unknown keys, `InvalidAmount` for negative caps.
    pub fn set_supply_cap(&mut self, key: &CurrencyKey, cap: Decimal) -> Result<()> {
        if cap < Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount: cap });
        }
        let synth = self
            .synths
            .get_mut(key)
            .ok_or_else(|| OpensynthError::SynthNotFound(key.clone()))?;
        synth.supply_cap = cap;
        Ok(())
    }

    /// Validate that minting `amount` of `key` would be accepted.
    ///
    /// # Errors
    /// `InvalidAmount`, `SynthNotFound`, or `SupplyCapExceeded`.
    pub fn ensure_mintable(&self, key: &CurrencyKey, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        let synth = self
            .synths
            .get(key)
            .ok_or_else(|| OpensynthError::SynthNotFound(key.clone()))?;
        let new_supply = math::add(synth.total_supply, amount)?;
        if new_supply > synth.supply_cap {
            return Err(OpensynthError::SupplyCapExceeded {
                requested: new_supply,
                cap: synth.supply_cap,
            });
        }
        Ok(())
    }

    /// Credit `amount` of `key` to `user`, increasing total supply.
    ///
    /// # Errors
    /// See [`Self::ensure_mintable`]. State is untouched on error.
    pub fn mint(&mut self, key: &CurrencyKey, user: UserId, amount: Decimal) -> Result<()> {
        self.ensure_mintable(key, amount)?;

        let new_balance = math::add(self.balance_of(key, user), amount)?;
        let synth = self
            .synths
            .get_mut(key)
            .ok_or_else(|| OpensynthError::SynthNotFound(key.clone()))?;
        synth.total_supply = math::add(synth.total_supply, amount)?;
        self.balances.insert((key.clone(), user), new_balance);
        Ok(())
    }

    /// Debit `amount` of `key` from `user`, decreasing total supply.
    ///
    /// # Errors
    /// `InvalidAmount`, `SynthNotFound`, or `InsufficientBalance`. State is
    /// untouched on error.
    pub fn burn(&mut self, key: &CurrencyKey, user: UserId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        let balance = self.balance_of(key, user);
        if amount > balance {
            return Err(OpensynthError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
        let synth = self
            .synths
            .get_mut(key)
            .ok_or_else(|| OpensynthError::SynthNotFound(key.clone()))?;
        synth.total_supply = math::sub(synth.total_supply, amount)?;

        let new_balance = math::sub(balance, amount)?;
        if new_balance.is_zero() {
            self.balances.remove(&(key.clone(), user));
        } else {
            self.balances.insert((key.clone(), user), new_balance);
        }
        Ok(())
    }

    /// Balance of `user` in synth `key`. Zero for unknown pairs.
    #[must_use]
    pub fn balance_of(&self, key: &CurrencyKey, user: UserId) -> Decimal {
        self.balances
            .get(&(key.clone(), user))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Outstanding supply of synth `key`. Zero for unknown keys.
    #[must_use]
    pub fn total_supply(&self, key: &CurrencyKey) -> Decimal {
        self.synths
            .get(key)
            .map_or(Decimal::ZERO, |s| s.total_supply)
    }

    /// Look up a registered synth.
    #[must_use]
    pub fn synth(&self, key: &CurrencyKey) -> Option<&Synth> {
        self.synths.get(key)
    }

    /// Iterate all registered synths (for system-debt valuation).
    pub fn synths(&self) -> impl Iterator<Item = &Synth> {
        self.synths.values()
    }
}

impl Default for SynthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sy_usd() -> CurrencyKey {
        CurrencyKey::new("syUSD")
    }

    fn registry_with_usd(cap: Decimal) -> SynthRegistry {
        let mut registry = SynthRegistry::new();
        registry
            .add_synth(Synth::new(sy_usd(), "syUSD", cap))
            .unwrap();
        registry
    }

    #[test]
    fn mint_credits_user_and_supply() {
        let mut registry = registry_with_usd(Decimal::new(1_000_000, 0));
        let user = UserId::new();
        registry
            .mint(&sy_usd(), user, Decimal::new(5000, 0))
            .unwrap();
        assert_eq!(registry.balance_of(&sy_usd(), user), Decimal::new(5000, 0));
        assert_eq!(registry.total_supply(&sy_usd()), Decimal::new(5000, 0));
    }

    #[test]
    fn mint_beyond_cap_rejected() {
        let mut registry = registry_with_usd(Decimal::new(100, 0));
        let user = UserId::new();
        registry.mint(&sy_usd(), user, Decimal::new(60, 0)).unwrap();
        let err = registry
            .mint(&sy_usd(), user, Decimal::new(41, 0))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::SupplyCapExceeded { .. }));
        // State unchanged
        assert_eq!(registry.total_supply(&sy_usd()), Decimal::new(60, 0));
    }

    #[test]
    fn mint_unknown_synth_rejected() {
        let mut registry = SynthRegistry::new();
        let err = registry
            .mint(&sy_usd(), UserId::new(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::SynthNotFound(_)));
    }

    #[test]
    fn duplicate_synth_rejected() {
        let mut registry = registry_with_usd(Decimal::new(100, 0));
        let err = registry
            .add_synth(Synth::new(sy_usd(), "syUSD", Decimal::new(100, 0)))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::DuplicateSynth(_)));
    }

    #[test]
    fn burn_debits_user_and_supply() {
        let mut registry = registry_with_usd(Decimal::new(1_000_000, 0));
        let user = UserId::new();
        registry
            .mint(&sy_usd(), user, Decimal::new(5000, 0))
            .unwrap();
        registry
            .burn(&sy_usd(), user, Decimal::new(2000, 0))
            .unwrap();
        assert_eq!(registry.balance_of(&sy_usd(), user), Decimal::new(3000, 0));
        assert_eq!(registry.total_supply(&sy_usd()), Decimal::new(3000, 0));
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut registry = registry_with_usd(Decimal::new(1_000_000, 0));
        let user = UserId::new();
        registry.mint(&sy_usd(), user, Decimal::new(10, 0)).unwrap();
        let err = registry
            .burn(&sy_usd(), user, Decimal::new(11, 0))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::InsufficientBalance { .. }));
    }

    #[test]
    fn cap_can_drop_below_supply() {
        let mut registry = registry_with_usd(Decimal::new(1000, 0));
        let user = UserId::new();
        registry
            .mint(&sy_usd(), user, Decimal::new(500, 0))
            .unwrap();
        registry
            .set_supply_cap(&sy_usd(), Decimal::new(100, 0))
            .unwrap();
        // Existing balances untouched; new minting blocked.
        assert_eq!(registry.balance_of(&sy_usd(), user), Decimal::new(500, 0));
        let err = registry.mint(&sy_usd(), user, Decimal::ONE).unwrap_err();
        assert!(matches!(err, OpensynthError::SupplyCapExceeded { .. }));
    }

    #[test]
    fn negative_cap_rejected() {
        let mut registry = registry_with_usd(Decimal::new(1000, 0));
        let err = registry
            .set_supply_cap(&sy_usd(), Decimal::new(-1, 0))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::InvalidAmount { .. }));
    }

    #[test]
    fn synths_iteration_covers_all() {
        let mut registry = registry_with_usd(Decimal::new(1000, 0));
        registry
            .add_synth(Synth::new(
                CurrencyKey::new("syETH"),
                "syETH",
                Decimal::new(500, 0),
            ))
            .unwrap();
        assert_eq!(registry.synths().count(), 2);
    }
}
