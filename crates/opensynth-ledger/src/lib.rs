//! # opensynth-ledger
//!
//! The accounting plane of OpenSynth: three independent ledgers plus an
//! append-only audit journal.
//!
//! 1. **CollateralLedger**: per-(user, currency) deposits and the
//!    price-weighted receipt balance
//! 2. **DebtShareLedger**: the global debt pool and per-user share ownership
//! 3. **SynthRegistry**: synth metadata, balances, and supply caps
//! 4. **AuditJournal**: hash-chained record of every successful mutation
//!
//! ## Mutation flow
//!
//! ```text
//! Engine → CollateralLedger.deposit() → DebtShareLedger.mint_shares()
//!        → SynthRegistry.mint() → AuditJournal.append()
//! ```
//!
//! Each ledger validates its own preconditions and mutates only after all
//! computation has succeeded, so a returned error always means "state
//! unchanged". Cross-ledger preconditions (the free-collateral guard, the
//! issuance cap) live in the engine crate.

pub mod collateral;
pub mod debt_share;
pub mod journal;
pub mod synth_registry;

pub use collateral::CollateralLedger;
pub use debt_share::DebtShareLedger;
pub use journal::AuditJournal;
pub use synth_registry::SynthRegistry;
