//! # opensynth-engine
//!
//! The orchestration plane of OpenSynth: the [`IssuanceController`]
//! computation gate and the [`IssuanceEngine`] public surface.
//!
//! ## Architecture
//!
//! The engine holds direct handles to its collaborators — injected once at
//! construction, no runtime lookup-by-name registry:
//!
//! ```text
//! issue_synths → PriceSnapshot.capture() → IssuanceController (cap, guards)
//!              → CollateralLedger.deposit() → DebtShareLedger.mint_shares()
//!              → SynthRegistry.mint() → AuditJournal.append()
//! ```
//!
//! ## Execution model
//!
//! One logical sequencer: every mutating operation takes `&mut self`, so
//! operations apply strictly in arrival order and never observe a
//! partially-applied sibling. Each operation reads prices exactly once into
//! a [`PriceSnapshot`] and validates every precondition against it before
//! the first state change — a failed operation leaves no trace.

pub mod controller;
pub mod engine;
pub mod snapshot;

pub use controller::{IssuanceController, LedgerView};
pub use engine::IssuanceEngine;
pub use snapshot::PriceSnapshot;
