//! Issuance controller — the computation gate for every mint and withdraw.
//!
//! The controller owns the protocol-wide issuance ratio and derives every
//! limit the engine enforces: issuable synth value, per-currency free
//! collateral, and the system debt valuation behind both. It is pure —
//! nothing here mutates a ledger.
//!
//! ## Design principles
//!
//! - **Fail-closed**: a missing or stale price fails the computation
//! - **No bypass**: every mint/withdraw path goes through the controller
//! - **Snapshot-fed**: all prices come from the operation's one
//!   [`PriceSnapshot`], never from the oracle directly

use opensynth_ledger::{CollateralLedger, DebtShareLedger, SynthRegistry};
use opensynth_types::{math, CurrencyKey, OpensynthError, Result, UserId};
use rust_decimal::Decimal;

use crate::PriceSnapshot;

/// Borrowed view over the three ledgers a computation reads.
#[derive(Clone, Copy)]
pub struct LedgerView<'a> {
    pub collateral: &'a CollateralLedger,
    pub debt: &'a DebtShareLedger,
    pub synths: &'a SynthRegistry,
}

impl LedgerView<'_> {
    /// The user's collateral value under the snapshot's prices.
    pub fn collateral_value(&self, user: UserId, snap: &PriceSnapshot) -> Result<Decimal> {
        self.collateral.collateral_value(user, |key| snap.price(key))
    }

    /// Price-weighted value of all outstanding synth supply. Synths with
    /// zero supply contribute nothing and need no price.
    pub fn system_debt_value(&self, snap: &PriceSnapshot) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for synth in self.synths.synths() {
            if synth.total_supply.is_zero() {
                continue;
            }
            let price = snap.price(&synth.key)?;
            let value = math::mul(synth.total_supply, price)?;
            total = math::add(total, value)?;
        }
        Ok(total)
    }

    /// The user's current debt value.
    pub fn debt_value_of(&self, user: UserId, snap: &PriceSnapshot) -> Result<Decimal> {
        let system_debt = self.system_debt_value(snap)?;
        self.debt.debt_value_of(user, system_debt)
    }
}

/// Computes issuance limits and withdrawal guards.
#[derive(Debug)]
pub struct IssuanceController {
    /// Maximum debt-to-collateral fraction (inverse of the target
    /// collateralization ratio). Always in (0, 1].
    issuance_ratio: Decimal,
}

impl IssuanceController {
    /// Create a controller.
    ///
    /// # Errors
    /// `InvalidRatio` unless `0 < ratio ≤ 1`.
    pub fn new(issuance_ratio: Decimal) -> Result<Self> {
        Self::validate_ratio(issuance_ratio)?;
        Ok(Self { issuance_ratio })
    }

    /// Current issuance ratio.
    #[must_use]
    pub fn issuance_ratio(&self) -> Decimal {
        self.issuance_ratio
    }

    /// Change the issuance ratio. Applies prospectively: existing positions
    /// are not invalidated, but every subsequent computation uses the new
    /// value.
    ///
    /// # Errors
    /// `InvalidRatio` unless `0 < ratio ≤ 1`.
    pub fn set_issuance_ratio(&mut self, ratio: Decimal) -> Result<()> {
        Self::validate_ratio(ratio)?;
        self.issuance_ratio = ratio;
        Ok(())
    }

    fn validate_ratio(ratio: Decimal) -> Result<()> {
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(OpensynthError::InvalidRatio { ratio });
        }
        Ok(())
    }

    /// Maximum synth value the user could mint after additionally
    /// depositing `additional_collateral` of `key`. Clamped at zero.
    ///
    /// Pure simulation — no state is touched.
    pub fn issuable_synth_expected(
        &self,
        user: UserId,
        key: &CurrencyKey,
        additional_collateral: Decimal,
        view: LedgerView<'_>,
        snap: &PriceSnapshot,
    ) -> Result<Decimal> {
        let mut collateral_value = view.collateral_value(user, snap)?;
        if additional_collateral > Decimal::ZERO {
            let price = snap.price(key)?;
            let added = math::mul(additional_collateral, price)?;
            collateral_value = math::add(collateral_value, added)?;
        }

        let cap = math::mul_down(collateral_value, self.issuance_ratio)?;
        let debt_value = view.debt_value_of(user, snap)?;
        Ok(math::sub(cap, debt_value)?.max(Decimal::ZERO))
    }

    /// Withdrawable amount of `key`: the collateral value not locked behind
    /// outstanding debt, converted to units of `key` at the snapshot price,
    /// clamped at zero and at the deposited amount.
    pub fn free_collateral(
        &self,
        user: UserId,
        key: &CurrencyKey,
        view: LedgerView<'_>,
        snap: &PriceSnapshot,
    ) -> Result<Decimal> {
        let deposited = view.collateral.deposited(user, key);
        if deposited.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let collateral_value = view.collateral_value(user, snap)?;
        let debt_value = view.debt_value_of(user, snap)?;
        if debt_value.is_zero() {
            return Ok(deposited);
        }

        // Value the debt keeps locked, at the current ratio.
        let locked = math::div_up(debt_value, self.issuance_ratio)?;
        let free_value = math::sub(collateral_value, locked)?.max(Decimal::ZERO);

        let price = snap.price(key)?;
        let free_units = math::div_down(free_value, price)?;
        Ok(free_units.min(deposited))
    }
}
