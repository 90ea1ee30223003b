//! Issuance engine — the public contract surface of OpenSynth.
//!
//! Orchestrates mint, burn, deposit, and withdraw across the collateral,
//! debt-share, and synth ledgers. Collaborators are injected once at
//! construction and held directly; there is no runtime lookup-by-name.
//!
//! Every mutating operation is all-or-nothing: preconditions, price
//! lookups, and limit computations all run against one [`PriceSnapshot`]
//! before the first ledger write. After each successful mutation the
//! engine re-checks debt-share conservation; a violation latches the
//! engine into a halted state that refuses all further mutations.

use chrono::Utc;
use opensynth_ledger::{AuditJournal, CollateralLedger, DebtShareLedger, SynthRegistry};
use opensynth_oracle::{PriceOracle, StalenessPolicy};
use opensynth_types::{
    math, CollateralCurrency, CurrencyKey, EngineConfig, LedgerEvent, OpensynthError,
    RemainingIssuable, Result, Synth, UserId,
};
use rust_decimal::Decimal;

use crate::{IssuanceController, LedgerView, PriceSnapshot};

/// The issuance engine: one logical sequencer over all ledgers.
#[derive(Debug)]
pub struct IssuanceEngine<O: PriceOracle> {
    oracle: O,
    collateral: CollateralLedger,
    debt: DebtShareLedger,
    synths: SynthRegistry,
    controller: IssuanceController,
    journal: AuditJournal,
    staleness: StalenessPolicy,
    base_synth_key: CurrencyKey,
    owner: UserId,
    halted: bool,
}

impl<O: PriceOracle> IssuanceEngine<O> {
    /// Construct an engine from config and an injected oracle.
    ///
    /// The registry starts empty: the owner must `add_synth` the base
    /// synth (and register collateral currencies) before issuance can
    /// happen, mirroring a deployment sequence.
    ///
    /// # Errors
    /// `InvalidRatio` if the configured issuance ratio is out of range.
    pub fn new(config: EngineConfig, oracle: O) -> Result<Self> {
        let controller = IssuanceController::new(config.issuance_ratio)?;
        Ok(Self {
            oracle,
            collateral: CollateralLedger::new(),
            debt: DebtShareLedger::new(),
            synths: SynthRegistry::new(),
            controller,
            journal: AuditJournal::new(),
            staleness: StalenessPolicy::new(config.max_price_age_secs),
            base_synth_key: config.base_synth_key,
            owner: config.owner,
            halted: false,
        })
    }

    // =====================================================================
    // User operations (mutating)
    // =====================================================================

    /// Deposit collateral without minting. Returns the value credited to
    /// the receipt balance.
    pub fn deposit_collateral(
        &mut self,
        user: UserId,
        key: &CurrencyKey,
        amount: Decimal,
    ) -> Result<Decimal> {
        self.ensure_active()?;
        self.collateral.ensure_depositable(key, amount)?;

        let snap = self.capture_keys(vec![key.clone()])?;
        let price = snap.price(key)?;

        let value = self.collateral.deposit(user, key, amount, price)?;
        tracing::info!(%user, currency = %key, %amount, %value, "collateral deposited");
        self.journal.append(LedgerEvent::CollateralDeposited {
            user,
            currency: key.clone(),
            amount,
            value,
        });
        self.check_invariants()?;
        Ok(value)
    }

    /// Deposit `collateral_amount` of `key` and mint up to
    /// `synth_requested` of the base synth against it, bounded by the
    /// issuance cap. Fails `BelowMinimumOutput` if the mintable amount
    /// lands under `min_synth_out`. Returns the synth amount minted.
    ///
    /// The whole operation is validated against one price snapshot before
    /// any ledger is touched.
    pub fn issue_synths(
        &mut self,
        user: UserId,
        key: &CurrencyKey,
        collateral_amount: Decimal,
        synth_requested: Decimal,
        min_synth_out: Decimal,
    ) -> Result<Decimal> {
        self.ensure_active()?;
        if synth_requested <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount {
                amount: synth_requested,
            });
        }
        self.collateral.ensure_depositable(key, collateral_amount)?;

        let snap = self.capture_keys(self.position_and_debt_keys(user, Some(key)))?;
        let price = snap.price(key)?;

        // Cap as if the deposit had already been applied.
        let cap = self.controller.issuable_synth_expected(
            user,
            key,
            collateral_amount,
            self.view(),
            &snap,
        )?;
        let minted = synth_requested.min(cap);
        if minted < min_synth_out {
            return Err(OpensynthError::BelowMinimumOutput {
                minted,
                minimum: min_synth_out,
            });
        }

        let system_debt = self.view().system_debt_value(&snap)?;
        if minted > Decimal::ZERO {
            // Pre-validate the mutations so the apply phase cannot fail.
            self.debt.shares_for_mint(minted, system_debt)?;
            self.synths.ensure_mintable(&self.base_synth_key, minted)?;
        }

        let value = self.collateral.deposit(user, key, collateral_amount, price)?;
        self.journal.append(LedgerEvent::CollateralDeposited {
            user,
            currency: key.clone(),
            amount: collateral_amount,
            value,
        });

        if minted > Decimal::ZERO {
            let shares = self.debt.mint_shares(user, minted, system_debt)?;
            let base = self.base_synth_key.clone();
            self.synths.mint(&base, user, minted)?;
            self.journal.append(LedgerEvent::SynthsIssued {
                user,
                synth: base,
                amount: minted,
                shares,
            });
            tracing::info!(%user, currency = %key, %collateral_amount, %minted, %shares, "synths issued");
        } else {
            tracing::info!(%user, currency = %key, %collateral_amount, "collateral deposited, nothing issuable");
        }

        self.check_invariants()?;
        Ok(minted)
    }

    /// Burn `amount` of the base synth, retiring the matching debt shares.
    /// Collateral is untouched — release happens only through
    /// [`Self::withdraw_collateral`].
    pub fn burn_synths(&mut self, user: UserId, amount: Decimal) -> Result<()> {
        self.ensure_active()?;
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        let balance = self.synths.balance_of(&self.base_synth_key, user);
        if amount > balance {
            return Err(OpensynthError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }

        let snap = self.capture_keys(self.debt_keys())?;
        let system_debt = self.view().system_debt_value(&snap)?;

        // The share ledger is the authoritative guard; it rejects before
        // mutating, and the synth burn below is covered by the balance
        // check above.
        let shares = self.debt.burn_shares(user, amount, system_debt)?;
        let base = self.base_synth_key.clone();
        self.synths.burn(&base, user, amount)?;
        self.journal.append(LedgerEvent::SynthsBurned {
            user,
            synth: base,
            amount,
            shares,
        });
        tracing::info!(%user, %amount, %shares, "synths burned");

        self.check_invariants()
    }

    /// Withdraw collateral, bounded by the free-collateral guard. Returns
    /// the value debited from the receipt balance.
    pub fn withdraw_collateral(
        &mut self,
        user: UserId,
        key: &CurrencyKey,
        amount: Decimal,
    ) -> Result<Decimal> {
        self.ensure_active()?;
        if amount <= Decimal::ZERO {
            return Err(OpensynthError::InvalidAmount { amount });
        }
        if self.collateral.currency(key).is_none() {
            return Err(OpensynthError::CurrencyNotRegistered(key.clone()));
        }

        let snap = self.capture_keys(self.position_and_debt_keys(user, Some(key)))?;
        let free = self
            .controller
            .free_collateral(user, key, self.view(), &snap)?;
        if amount > free {
            return Err(OpensynthError::OverflowFreeCollateral {
                requested: amount,
                free,
            });
        }

        let price = snap.price(key)?;
        let value = self.collateral.withdraw(user, key, amount, price)?;
        self.journal.append(LedgerEvent::CollateralWithdrawn {
            user,
            currency: key.clone(),
            amount,
            value,
        });
        tracing::info!(%user, currency = %key, %amount, %value, "collateral withdrawn");

        self.check_invariants()?;
        Ok(value)
    }

    // =====================================================================
    // User operations (read-only)
    // =====================================================================

    /// Synth value the user could mint after additionally depositing
    /// `additional_collateral` of `key`. Pure simulation.
    pub fn issuable_synth_expected(
        &self,
        user: UserId,
        key: &CurrencyKey,
        additional_collateral: Decimal,
    ) -> Result<Decimal> {
        let snap = self.capture_keys(self.position_and_debt_keys(user, Some(key)))?;
        self.controller
            .issuable_synth_expected(user, key, additional_collateral, self.view(), &snap)
    }

    /// Withdrawable amount of `key` for the user right now.
    pub fn check_free_collateral(&self, user: UserId, key: &CurrencyKey) -> Result<Decimal> {
        let snap = self.capture_keys(self.position_and_debt_keys(user, Some(key)))?;
        self.controller
            .free_collateral(user, key, self.view(), &snap)
    }

    /// Issuance headroom, current debt, and total system debt in one read.
    /// Calling this twice with no mutation in between yields identical
    /// results.
    pub fn remaining_issuable_synths(&self, user: UserId) -> Result<RemainingIssuable> {
        let snap = self.capture_keys(self.position_and_debt_keys(user, None))?;
        let view = self.view();

        let collateral_value = view.collateral_value(user, &snap)?;
        let cap = math::mul_down(collateral_value, self.controller.issuance_ratio())?;
        let total_system_debt = view.system_debt_value(&snap)?;
        let already_issued = view.debt.debt_value_of(user, total_system_debt)?;

        Ok(RemainingIssuable {
            max_issuable: math::sub(cap, already_issued)?.max(Decimal::ZERO),
            already_issued,
            total_system_debt,
        })
    }

    /// The user's receipt balance — total deposited collateral value,
    /// independent of debt.
    #[must_use]
    pub fn receipt_balance_of(&self, user: UserId) -> Decimal {
        self.collateral.receipt_balance(user)
    }

    /// The user's balance in a synth.
    #[must_use]
    pub fn synth_balance_of(&self, key: &CurrencyKey, user: UserId) -> Decimal {
        self.synths.balance_of(key, user)
    }

    /// Deposited amount for a (user, currency) pair.
    #[must_use]
    pub fn deposited(&self, user: UserId, key: &CurrencyKey) -> Decimal {
        self.collateral.deposited(user, key)
    }

    /// Current issuance ratio.
    #[must_use]
    pub fn issuance_ratio(&self) -> Decimal {
        self.controller.issuance_ratio()
    }

    /// A registered collateral currency, if any.
    #[must_use]
    pub fn collateral_currency(&self, key: &CurrencyKey) -> Option<&CollateralCurrency> {
        self.collateral.currency(key)
    }

    /// A registered synth, if any.
    #[must_use]
    pub fn synth(&self, key: &CurrencyKey) -> Option<&Synth> {
        self.synths.synth(key)
    }

    /// The audit journal.
    #[must_use]
    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    /// Whether the engine has latched into the halted state.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    // =====================================================================
    // Administrative operations (owner-gated)
    // =====================================================================

    /// Register a collateral currency.
    pub fn register_collateral_currency(
        &mut self,
        caller: UserId,
        key: CurrencyKey,
        price_feed_id: impl Into<String>,
    ) -> Result<()> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        self.collateral
            .register_currency(CollateralCurrency::new(key.clone(), price_feed_id))?;
        self.journal
            .append(LedgerEvent::CurrencyRegistered { currency: key });
        Ok(())
    }

    /// Enable or disable deposits for a collateral currency.
    pub fn set_currency_enabled(
        &mut self,
        caller: UserId,
        key: &CurrencyKey,
        enabled: bool,
    ) -> Result<()> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        self.collateral.set_enabled(key, enabled)?;
        self.journal.append(LedgerEvent::CurrencyEnabledSet {
            currency: key.clone(),
            enabled,
        });
        Ok(())
    }

    /// Change the protocol-wide issuance ratio. Takes effect for all
    /// subsequent operations immediately.
    pub fn set_issuance_ratio(&mut self, caller: UserId, ratio: Decimal) -> Result<()> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        self.controller.set_issuance_ratio(ratio)?;
        self.journal.append(LedgerEvent::IssuanceRatioSet { ratio });
        tracing::info!(%ratio, "issuance ratio changed");
        Ok(())
    }

    /// Change a synth's supply cap.
    pub fn set_supply_cap(
        &mut self,
        caller: UserId,
        key: &CurrencyKey,
        cap: Decimal,
    ) -> Result<()> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        self.synths.set_supply_cap(key, cap)?;
        self.journal.append(LedgerEvent::SupplyCapSet {
            synth: key.clone(),
            cap,
        });
        Ok(())
    }

    /// Add a synth to the registry.
    pub fn add_synth(&mut self, caller: UserId, synth: Synth) -> Result<()> {
        self.ensure_active()?;
        self.ensure_owner(caller)?;
        let key = synth.key.clone();
        self.synths.add_synth(synth)?;
        self.journal.append(LedgerEvent::SynthAdded { synth: key });
        Ok(())
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn view(&self) -> LedgerView<'_> {
        LedgerView {
            collateral: &self.collateral,
            debt: &self.debt,
            synths: &self.synths,
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.halted {
            return Err(OpensynthError::EngineHalted);
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: UserId) -> Result<()> {
        if caller != self.owner {
            return Err(OpensynthError::Unauthorized { caller });
        }
        Ok(())
    }

    /// Currency keys needed to value outstanding debt: every synth with
    /// nonzero supply. The base synth is pinned at 1, not fetched.
    fn debt_keys(&self) -> Vec<CurrencyKey> {
        self.synths
            .synths()
            .filter(|s| !s.total_supply.is_zero())
            .map(|s| s.key.clone())
            .collect()
    }

    /// Keys for a full position valuation: the user's collateral
    /// currencies, the debt keys, and the operation's own currency.
    fn position_and_debt_keys(&self, user: UserId, extra: Option<&CurrencyKey>) -> Vec<CurrencyKey> {
        let mut keys: Vec<CurrencyKey> = self
            .collateral
            .positions(user)
            .into_iter()
            .map(|p| p.currency)
            .collect();
        keys.extend(self.debt_keys());
        if let Some(extra) = extra {
            keys.push(extra.clone());
        }
        keys
    }

    /// Capture one consistent snapshot for the given keys and pin the base
    /// synth at exactly 1.
    fn capture_keys(&self, keys: Vec<CurrencyKey>) -> Result<PriceSnapshot> {
        let base = self.base_synth_key.clone();
        let keys = keys.into_iter().filter(|k| *k != base);
        let mut snap = PriceSnapshot::capture(&self.oracle, keys, self.staleness, Utc::now())?;
        snap.pin(base, Decimal::ONE);
        Ok(snap)
    }

    /// Re-check the fatal invariant; on violation latch the halt flag so
    /// every subsequent mutating call is refused.
    fn check_invariants(&mut self) -> Result<()> {
        if let Err(err) = self.debt.verify_conservation() {
            self.halted = true;
            tracing::error!(%err, "debt-share conservation broken, engine halted");
            return Err(err);
        }
        Ok(())
    }

    /// Test-only: corrupt the debt-share total to exercise the halt latch.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn corrupt_debt_shares_for_test(&mut self, total: Decimal) {
        self.debt.corrupt_total_for_test(total);
    }
}
