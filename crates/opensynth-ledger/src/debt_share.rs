//! Debt-share ledger: the global debt pool and per-user share ownership.
//!
//! Shares are a proportional claim on system-wide synthetic debt, not a
//! token count. New shares are priced at the *current* debt-value-per-share,
//! so existing holders are not diluted when system debt has drifted with
//! prices between operations:
//!
//! ```text
//! shares_issued = debt_value_added  × total_shares / system_debt_value
//! shares_burned = debt_value_removed × total_shares / system_debt_value
//! debt_value(u) = shares[u] / total_shares × system_debt_value
//! ```
//!
//! Rounding bias: issuance rounds down, burning rounds up — margins always
//! land on the protocol side. A burn covering the user's entire debt value
//! retires the full share balance, so rounding dust cannot strand shares.
//!
//! Invariant: `Σ shares[u] == total_shares` after every mint/burn. A
//! mismatch is the one fatal condition in the system;
//! [`DebtShareLedger::verify_conservation`] detects it and the engine
//! halts on it.

use std::collections::HashMap;

use opensynth_types::{math, OpensynthError, Result, UserId};
use rust_decimal::Decimal;

/// Global debt pool with per-user share ownership.
#[derive(Debug)]
pub struct DebtShareLedger {
    /// Sum of all per-user shares.
    total_shares: Decimal,
    /// Per-user share balances. Zero balances are pruned.
    shares: HashMap<UserId, Decimal>,
}

impl DebtShareLedger {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_shares: Decimal::ZERO,
            shares: HashMap::new(),
        }
    }

    /// Total outstanding shares.
    #[must_use]
    pub fn total_shares(&self) -> Decimal {
        self.total_shares
    }

    /// Shares held by a user.
    #[must_use]
    pub fn shares_of(&self, user: UserId) -> Decimal {
        self.shares.get(&user).copied().unwrap_or(Decimal::ZERO)
    }

    /// Shares that a mint of `debt_value_added` would issue at the given
    /// system debt value. Pure; used by the engine for pre-validation.
    ///
    /// Bootstrap: with no shares outstanding, shares are issued 1:1 with
    /// debt value.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive values; `ArithmeticOverflow` on
    /// overflow or when `system_debt_value` is zero with shares outstanding.
    pub fn shares_for_mint(
        &self,
        debt_value_added: Decimal,
        system_debt_value: Decimal,
    ) -> Result<Decimal> {
        if debt_value_added <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount {
                amount: debt_value_added,
            });
        }
        if self.total_shares.is_zero() {
            return Ok(debt_value_added);
        }
        math::mul_div_down(debt_value_added, self.total_shares, system_debt_value)
    }

    /// Issue shares to `user` for `debt_value_added` of new debt.
    /// Returns the shares issued.
    ///
    /// # Errors
    /// See [`Self::shares_for_mint`]. State is untouched on error.
    pub fn mint_shares(
        &mut self,
        user: UserId,
        debt_value_added: Decimal,
        system_debt_value: Decimal,
    ) -> Result<Decimal> {
        let issued = self.shares_for_mint(debt_value_added, system_debt_value)?;
        let new_total = math::add(self.total_shares, issued)?;
        let new_held = math::add(self.shares_of(user), issued)?;

        self.total_shares = new_total;
        self.shares.insert(user, new_held);
        Ok(issued)
    }

    /// Retire shares from `user` for `debt_value_removed` of repaid debt.
    /// Returns the shares burned.
    ///
    /// Removing at least the user's whole debt value burns their entire
    /// share balance (full redemption absorbs rounding dust).
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive values; `InsufficientDebtShare` if
    /// the user holds fewer shares than the burn requires. State is
    /// untouched on error.
    pub fn burn_shares(
        &mut self,
        user: UserId,
        debt_value_removed: Decimal,
        system_debt_value: Decimal,
    ) -> Result<Decimal> {
        if debt_value_removed <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount {
                amount: debt_value_removed,
            });
        }
        let held = self.shares_of(user);
        if held.is_zero() {
            return Err(OpensynthError::InsufficientDebtShare {
                needed: debt_value_removed,
                held,
            });
        }

        let debt_value = self.debt_value_of(user, system_debt_value)?;
        let burned = if debt_value_removed >= debt_value {
            held
        } else {
            let burned =
                math::mul_div_up(debt_value_removed, self.total_shares, system_debt_value)?;
            if burned > held {
                return Err(OpensynthError::InsufficientDebtShare {
                    needed: burned,
                    held,
                });
            }
            burned
        };

        let new_total = math::sub(self.total_shares, burned)?;
        let new_held = math::sub(held, burned)?;

        self.total_shares = new_total;
        if new_held.is_zero() {
            self.shares.remove(&user);
        } else {
            self.shares.insert(user, new_held);
        }
        Ok(burned)
    }

    /// The user's share of system debt:
    /// `shares[u] / total_shares × system_debt_value`, rounded up so the
    /// withdrawal guard sees the conservative figure. Zero with no shares
    /// outstanding.
    pub fn debt_value_of(&self, user: UserId, system_debt_value: Decimal) -> Result<Decimal> {
        let held = self.shares_of(user);
        if self.total_shares.is_zero() || held.is_zero() {
            return Ok(Decimal::ZERO);
        }
        math::mul_div_up(held, system_debt_value, self.total_shares)
    }

    /// Recompute `Σ shares[u]` and compare against the running total.
    ///
    /// # Errors
    /// [`OpensynthError::ShareInvariantViolation`] on mismatch — the fatal
    /// condition; callers must stop mutating.
    pub fn verify_conservation(&self) -> Result<()> {
        let mut sum = Decimal::ZERO;
        for held in self.shares.values() {
            sum = math::add(sum, *held)?;
        }
        if sum != self.total_shares {
            tracing::warn!(
                total = %self.total_shares,
                sum = %sum,
                "debt-share conservation broken"
            );
            return Err(OpensynthError::ShareInvariantViolation {
                reason: format!(
                    "per-user shares sum to {sum}, total_shares is {}",
                    self.total_shares,
                ),
            });
        }
        Ok(())
    }

    /// Number of users holding shares.
    #[must_use]
    pub fn holder_count(&self) -> usize {
        self.shares.len()
    }

    /// Test-only: corrupt the running total to exercise the halt path.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn corrupt_total_for_test(&mut self, total: Decimal) {
        self.total_shares = total;
    }
}

impl Default for DebtShareLedger {
    fn default() -> Self {
        Self::new()
    }
}
