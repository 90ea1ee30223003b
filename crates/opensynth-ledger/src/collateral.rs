//! Collateral ledger: per-user, per-currency deposits and receipt balances.
//!
//! The receipt balance reflects *collateral value*, not debt: it moves only
//! on deposit and withdrawal, priced at the quote effective at that moment,
//! and is untouched by mint/burn activity.

use std::collections::HashMap;

use opensynth_types::{
    math, CollateralCurrency, CollateralPosition, CurrencyKey, OpensynthError, Result, UserId,
};
use rust_decimal::Decimal;

/// Source of truth for deposited collateral and receipt balances.
#[derive(Debug)]
pub struct CollateralLedger {
    /// Registered collateral currencies.
    currencies: HashMap<CurrencyKey, CollateralCurrency>,
    /// Per-(user, currency) deposited amounts. Never negative.
    positions: HashMap<(UserId, CurrencyKey), Decimal>,
    /// Per-user receipt balances (price-weighted deposit value).
    receipts: HashMap<UserId, Decimal>,
}

impl CollateralLedger {
    /// Create an empty ledger with no registered currencies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            currencies: HashMap::new(),
            positions: HashMap::new(),
            receipts: HashMap::new(),
        }
    }

    // =====================================================================
    // Currency registry
    // =====================================================================

    /// Register a collateral currency. Immutable afterwards except for its
    /// enabled flag.
    ///
    /// # Errors
    /// Returns `DuplicateCurrency` if the key is already registered.
    pub fn register_currency(&mut self, currency: CollateralCurrency) -> Result<()> {
        if self.currencies.contains_key(&currency.key) {
            return Err(OpensynthError::DuplicateCurrency(currency.key));
        }
        self.currencies.insert(currency.key.clone(), currency);
        Ok(())
    }

    /// Enable or disable deposits for a registered currency.
    ///
    /// # Errors
    /// Returns `CurrencyNotRegistered` for unknown keys.
    pub fn set_enabled(&mut self, key: &CurrencyKey, enabled: bool) -> Result<()> {
        let currency = self
            .currencies
            .get_mut(key)
            .ok_or_else(|| OpensynthError::CurrencyNotRegistered(key.clone()))?;
        currency.enabled = enabled;
        Ok(())
    }

    /// Look up a registered currency.
    #[must_use]
    pub fn currency(&self, key: &CurrencyKey) -> Option<&CollateralCurrency> {
        self.currencies.get(key)
    }

    /// Validate that a deposit of `amount` into `key` would be accepted.
    ///
    /// # Errors
    /// `InvalidAmount`, `CurrencyNotRegistered`, or `CurrencyDisabled`.
    pub fn ensure_depositable(&self, key: &CurrencyKey, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        let currency = self
            .currencies
            .get(key)
            .ok_or_else(|| OpensynthError::CurrencyNotRegistered(key.clone()))?;
        if !currency.enabled {
            return Err(OpensynthError::CurrencyDisabled(key.clone()));
        }
        Ok(())
    }

    // =====================================================================
    // Deposits / withdrawals
    // =====================================================================

    /// Deposit collateral at the given price, increasing the position and
    /// the receipt balance by `amount × price`. Returns the value added.
    ///
    /// # Errors
    /// See [`Self::ensure_depositable`]; `ArithmeticOverflow` on overflow.
    pub fn deposit(
        &mut self,
        user: UserId,
        key: &CurrencyKey,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Decimal> {
        self.ensure_depositable(key, amount)?;

        let value = math::mul(amount, price)?;
        let position = self
            .positions
            .get(&(user, key.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO);
        let new_position = math::add(position, amount)?;
        let receipt = self.receipt_balance(user);
        let new_receipt = math::add(receipt, value)?;

        self.positions.insert((user, key.clone()), new_position);
        self.receipts.insert(user, new_receipt);
        Ok(value)
    }

    /// Withdraw collateral at the given price, decreasing the position and
    /// the receipt balance symmetrically. Returns the value removed.
    ///
    /// The free-collateral guard is the engine's responsibility and runs
    /// *before* this call; the ledger only enforces that the position
    /// itself is large enough.
    ///
    /// # Errors
    /// `InvalidAmount`, `CurrencyNotRegistered`, or `InsufficientCollateral`.
    pub fn withdraw(
        &mut self,
        user: UserId,
        key: &CurrencyKey,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        if !self.currencies.contains_key(key) {
            return Err(OpensynthError::CurrencyNotRegistered(key.clone()));
        }

        let position = self
            .positions
            .get(&(user, key.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO);
        if amount > position {
            return Err(OpensynthError::InsufficientCollateral {
                needed: amount,
                available: position,
            });
        }

        let value = math::mul(amount, price)?;
        let new_position = math::sub(position, amount)?;
        // Price drift since deposit can overshoot the receipt; clamp at zero.
        let new_receipt = math::sub(self.receipt_balance(user), value)?.max(Decimal::ZERO);

        self.positions.insert((user, key.clone()), new_position);
        self.receipts.insert(user, new_receipt);
        Ok(value)
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// Deposited amount for a (user, currency) pair.
    #[must_use]
    pub fn deposited(&self, user: UserId, key: &CurrencyKey) -> Decimal {
        self.positions
            .get(&(user, key.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// The user's receipt balance: total deposited collateral value.
    #[must_use]
    pub fn receipt_balance(&self, user: UserId) -> Decimal {
        self.receipts.get(&user).copied().unwrap_or(Decimal::ZERO)
    }

    /// All of a user's nonzero positions, sorted by currency key.
    #[must_use]
    pub fn positions(&self, user: UserId) -> Vec<CollateralPosition> {
        let mut positions: Vec<CollateralPosition> = self
            .positions
            .iter()
            .filter(|((u, _), amount)| *u == user && !amount.is_zero())
            .map(|((_, key), amount)| CollateralPosition {
                currency: key.clone(),
                deposited: *amount,
            })
            .collect();
        positions.sort_by(|a, b| a.currency.cmp(&b.currency));
        positions
    }

    /// Current collateral value: Σ `deposited × price` over all of the
    /// user's currencies, priced through `price_of`.
    ///
    /// # Errors
    /// Propagates the first `price_of` failure; `ArithmeticOverflow` on
    /// overflow.
    pub fn collateral_value<F>(&self, user: UserId, price_of: F) -> Result<Decimal>
    where
        F: Fn(&CurrencyKey) -> Result<Decimal>,
    {
        let mut total = Decimal::ZERO;
        for position in self.positions(user) {
            let price = price_of(&position.currency)?;
            let value = math::mul(position.deposited, price)?;
            total = math::add(total, value)?;
        }
        Ok(total)
    }
}

impl Default for CollateralLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth() -> CurrencyKey {
        CurrencyKey::new("ETH")
    }

    fn usdt() -> CurrencyKey {
        CurrencyKey::new("USDT")
    }

    fn ledger_with_eth() -> CollateralLedger {
        let mut ledger = CollateralLedger::new();
        ledger
            .register_currency(CollateralCurrency::new(eth(), "feed:eth-usd"))
            .unwrap();
        ledger
    }

    #[test]
    fn deposit_increases_position_and_receipt() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        let value = ledger
            .deposit(user, &eth(), Decimal::new(10, 0), Decimal::new(2000, 0))
            .unwrap();
        assert_eq!(value, Decimal::new(20_000, 0));
        assert_eq!(ledger.deposited(user, &eth()), Decimal::new(10, 0));
        assert_eq!(ledger.receipt_balance(user), Decimal::new(20_000, 0));
    }

    #[test]
    fn duplicate_currency_rejected() {
        let mut ledger = ledger_with_eth();
        let err = ledger
            .register_currency(CollateralCurrency::new(eth(), "feed:eth-usd"))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::DuplicateCurrency(_)));
    }

    #[test]
    fn deposit_unregistered_rejected() {
        let mut ledger = CollateralLedger::new();
        let err = ledger
            .deposit(UserId::new(), &eth(), Decimal::ONE, Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::CurrencyNotRegistered(_)));
    }

    #[test]
    fn deposit_disabled_rejected() {
        let mut ledger = ledger_with_eth();
        ledger.set_enabled(&eth(), false).unwrap();
        let err = ledger
            .deposit(UserId::new(), &eth(), Decimal::ONE, Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::CurrencyDisabled(_)));
    }

    #[test]
    fn deposit_zero_amount_rejected() {
        let mut ledger = ledger_with_eth();
        let err = ledger
            .deposit(UserId::new(), &eth(), Decimal::ZERO, Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::InvalidAmount { .. }));
    }

    #[test]
    fn withdraw_decreases_symmetrically() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(10, 0), Decimal::new(2000, 0))
            .unwrap();
        ledger
            .withdraw(user, &eth(), Decimal::new(4, 0), Decimal::new(2000, 0))
            .unwrap();
        assert_eq!(ledger.deposited(user, &eth()), Decimal::new(6, 0));
        assert_eq!(ledger.receipt_balance(user), Decimal::new(12_000, 0));
    }

    #[test]
    fn withdraw_more_than_deposited_rejected() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(5, 0), Decimal::ONE)
            .unwrap();
        let err = ledger
            .withdraw(user, &eth(), Decimal::new(6, 0), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, OpensynthError::InsufficientCollateral { .. }));
        // Balance unchanged
        assert_eq!(ledger.deposited(user, &eth()), Decimal::new(5, 0));
    }

    #[test]
    fn withdraw_allowed_when_disabled() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(5, 0), Decimal::ONE)
            .unwrap();
        ledger.set_enabled(&eth(), false).unwrap();
        assert!(ledger
            .withdraw(user, &eth(), Decimal::new(5, 0), Decimal::ONE)
            .is_ok());
    }

    #[test]
    fn round_trip_restores_balances() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(10, 0), Decimal::new(2000, 0))
            .unwrap();
        ledger
            .withdraw(user, &eth(), Decimal::new(10, 0), Decimal::new(2000, 0))
            .unwrap();
        assert_eq!(ledger.deposited(user, &eth()), Decimal::ZERO);
        assert_eq!(ledger.receipt_balance(user), Decimal::ZERO);
    }

    #[test]
    fn receipt_clamps_at_zero_on_price_drop() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(10, 0), Decimal::new(100, 0))
            .unwrap();
        // Price rose after deposit; withdrawing everything at the higher
        // price would overshoot the receipt.
        ledger
            .withdraw(user, &eth(), Decimal::new(10, 0), Decimal::new(150, 0))
            .unwrap();
        assert_eq!(ledger.receipt_balance(user), Decimal::ZERO);
    }

    #[test]
    fn collateral_value_sums_currencies() {
        let mut ledger = ledger_with_eth();
        ledger
            .register_currency(CollateralCurrency::new(usdt(), "feed:usdt-usd"))
            .unwrap();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::new(2, 0), Decimal::new(2000, 0))
            .unwrap();
        ledger
            .deposit(user, &usdt(), Decimal::new(500, 0), Decimal::ONE)
            .unwrap();

        let value = ledger
            .collateral_value(user, |key| {
                Ok(if *key == eth() {
                    Decimal::new(2000, 0)
                } else {
                    Decimal::ONE
                })
            })
            .unwrap();
        assert_eq!(value, Decimal::new(4500, 0));
    }

    #[test]
    fn collateral_value_propagates_price_failure() {
        let mut ledger = ledger_with_eth();
        let user = UserId::new();
        ledger
            .deposit(user, &eth(), Decimal::ONE, Decimal::ONE)
            .unwrap();
        let err = ledger
            .collateral_value(user, |key| Err(OpensynthError::PriceNotFound(key.clone())))
            .unwrap_err();
        assert!(matches!(err, OpensynthError::PriceNotFound(_)));
    }

    #[test]
    fn positions_sorted_and_nonzero() {
        let mut ledger = ledger_with_eth();
        ledger
            .register_currency(CollateralCurrency::new(usdt(), "feed:usdt-usd"))
            .unwrap();
        let user = UserId::new();
        ledger
            .deposit(user, &usdt(), Decimal::new(500, 0), Decimal::ONE)
            .unwrap();
        ledger
            .deposit(user, &eth(), Decimal::ONE, Decimal::ONE)
            .unwrap();
        ledger
            .withdraw(user, &usdt(), Decimal::new(500, 0), Decimal::ONE)
            .unwrap();

        let positions = ledger.positions(user);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].currency, eth());
    }
}
