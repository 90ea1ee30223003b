//! Ledger event types for the OpenSynth audit trail.
//!
//! Every successful mutation produces a [`LedgerRecord`] that is chained to
//! its predecessor by SHA-256, forming an append-only journal. Records are
//! observational only — journal contents never feed back into accounting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CurrencyKey, UserId};

/// The action an audit record proves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Collateral was deposited; `value` is the deposit priced in the
    /// canonical unit at deposit time.
    CollateralDeposited {
        user: UserId,
        currency: CurrencyKey,
        amount: Decimal,
        value: Decimal,
    },
    /// Collateral was withdrawn; `value` priced at withdrawal time.
    CollateralWithdrawn {
        user: UserId,
        currency: CurrencyKey,
        amount: Decimal,
        value: Decimal,
    },
    /// Synths were minted against collateral; `shares` is the debt-share
    /// amount issued alongside.
    SynthsIssued {
        user: UserId,
        synth: CurrencyKey,
        amount: Decimal,
        shares: Decimal,
    },
    /// Synths were burned; `shares` is the debt-share amount retired.
    SynthsBurned {
        user: UserId,
        synth: CurrencyKey,
        amount: Decimal,
        shares: Decimal,
    },
    /// A collateral currency was registered.
    CurrencyRegistered { currency: CurrencyKey },
    /// A collateral currency was enabled or disabled.
    CurrencyEnabledSet { currency: CurrencyKey, enabled: bool },
    /// A synth was added to the registry.
    SynthAdded { synth: CurrencyKey },
    /// A synth's supply cap was changed.
    SupplyCapSet { synth: CurrencyKey, cap: Decimal },
    /// The protocol-wide issuance ratio was changed.
    IssuanceRatioSet { ratio: Decimal },
}

impl LedgerEvent {
    /// Stable tag used in hashing and log output.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CollateralDeposited { .. } => "COLLATERAL_DEPOSITED",
            Self::CollateralWithdrawn { .. } => "COLLATERAL_WITHDRAWN",
            Self::SynthsIssued { .. } => "SYNTHS_ISSUED",
            Self::SynthsBurned { .. } => "SYNTHS_BURNED",
            Self::CurrencyRegistered { .. } => "CURRENCY_REGISTERED",
            Self::CurrencyEnabledSet { .. } => "CURRENCY_ENABLED_SET",
            Self::SynthAdded { .. } => "SYNTH_ADDED",
            Self::SupplyCapSet { .. } => "SUPPLY_CAP_SET",
            Self::IssuanceRatioSet { .. } => "ISSUANCE_RATIO_SET",
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One link in the hash-chained audit journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Position in the journal, starting at 0.
    pub sequence: u64,
    /// The recorded action.
    pub event: LedgerEvent,
    /// SHA-256 over the event fields.
    pub payload_hash: [u8; 32],
    /// `payload_hash` of the previous record (zeroes for the first).
    pub prev_hash: [u8; 32],
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
}
