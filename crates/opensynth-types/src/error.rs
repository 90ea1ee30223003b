//! Error types for the OpenSynth issuance engine.
//!
//! All errors use the `OS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Oracle / price errors
//! - 2xx: Collateral errors
//! - 3xx: Debt-share errors
//! - 4xx: Synth errors
//! - 5xx: Issuance errors
//! - 6xx: Administration errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CurrencyKey, UserId};

/// Central error enum for all OpenSynth operations.
///
/// Every failure is synchronous and leaves state untouched; nothing is
/// retried internally. [`OpensynthError::ShareInvariantViolation`] is the
/// one fatal kind — the engine latches into a halted state when it occurs.
#[derive(Debug, Error)]
pub enum OpensynthError {
    // =================================================================
    // Oracle / Price Errors (1xx)
    // =================================================================
    /// The oracle quote for a currency is older than the configured maximum.
    #[error("OS_ERR_100: Stale price for {key}: quote is {age_secs}s old (max {max_age_secs}s)")]
    StalePrice {
        key: CurrencyKey,
        age_secs: i64,
        max_age_secs: u64,
    },

    /// No price is available for this currency key.
    #[error("OS_ERR_101: No price for currency: {0}")]
    PriceNotFound(CurrencyKey),

    // =================================================================
    // Collateral Errors (2xx)
    // =================================================================
    /// Not enough deposited collateral for the requested withdrawal.
    #[error("OS_ERR_200: Insufficient collateral: need {needed}, have {available}")]
    InsufficientCollateral { needed: Decimal, available: Decimal },

    /// The withdrawal exceeds the user's free collateral in this currency.
    #[error("OS_ERR_201: Overflow free collateral: requested {requested}, free {free}")]
    OverflowFreeCollateral { requested: Decimal, free: Decimal },

    /// The currency key is not registered as collateral.
    #[error("OS_ERR_202: Collateral currency not registered: {0}")]
    CurrencyNotRegistered(CurrencyKey),

    /// The currency is registered but disabled for new deposits.
    #[error("OS_ERR_203: Collateral currency disabled: {0}")]
    CurrencyDisabled(CurrencyKey),

    /// A collateral currency with this key already exists.
    #[error("OS_ERR_204: Collateral currency already registered: {0}")]
    DuplicateCurrency(CurrencyKey),

    /// The amount is zero or negative.
    #[error("OS_ERR_205: Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    // =================================================================
    // Debt-Share Errors (3xx)
    // =================================================================
    /// The burn would remove more shares than the user holds.
    #[error("OS_ERR_300: Insufficient debt shares: need {needed}, hold {held}")]
    InsufficientDebtShare { needed: Decimal, held: Decimal },

    /// Per-user shares no longer sum to the share total — critical safety
    /// alert; the engine halts all further mutations.
    #[error("OS_ERR_301: Debt-share invariant violation: {reason}")]
    ShareInvariantViolation { reason: String },

    // =================================================================
    // Synth Errors (4xx)
    // =================================================================
    /// Not enough synth balance to burn.
    #[error("OS_ERR_400: Insufficient synth balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// Minting would push total supply past the synth's cap.
    #[error("OS_ERR_401: Supply cap exceeded: supply after mint {requested}, cap {cap}")]
    SupplyCapExceeded { requested: Decimal, cap: Decimal },

    /// No synth is registered under this key.
    #[error("OS_ERR_402: Synth not found: {0}")]
    SynthNotFound(CurrencyKey),

    /// A synth with this key already exists.
    #[error("OS_ERR_403: Synth already registered: {0}")]
    DuplicateSynth(CurrencyKey),

    // =================================================================
    // Issuance Errors (5xx)
    // =================================================================
    /// The mintable amount came out below the caller's minimum.
    #[error("OS_ERR_500: Below minimum output: can mint {minted}, minimum {minimum}")]
    BelowMinimumOutput { minted: Decimal, minimum: Decimal },

    /// A broken invariant was detected earlier; all mutations are refused.
    #[error("OS_ERR_501: Engine halted after invariant violation")]
    EngineHalted,

    // =================================================================
    // Administration Errors (6xx)
    // =================================================================
    /// The caller is not the configured owner.
    #[error("OS_ERR_600: Unauthorized administrative call from {caller}")]
    Unauthorized { caller: UserId },

    /// The issuance ratio must lie in (0, 1].
    #[error("OS_ERR_601: Invalid issuance ratio: {ratio}")]
    InvalidRatio { ratio: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Arithmetic overflowed (or divided by zero); the operation is rejected
    /// rather than wrapping.
    #[error("OS_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Unrecoverable internal error.
    #[error("OS_ERR_901: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpensynthError>;
