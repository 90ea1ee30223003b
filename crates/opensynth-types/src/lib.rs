//! # opensynth-types
//!
//! Shared types, errors, and configuration for the **OpenSynth** issuance
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`CurrencyKey`]
//! - **Collateral model**: [`CollateralCurrency`], [`CollateralPosition`]
//! - **Synth model**: [`Synth`], [`RemainingIssuable`]
//! - **Audit model**: [`LedgerEvent`], [`LedgerRecord`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`OpensynthError`] with `OS_ERR_` prefix codes
//! - **Arithmetic**: checked 18-decimal fixed-point helpers in [`math`]
//! - **Constants**: system-wide limits and defaults

pub mod collateral;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod math;
pub mod synth;

// Re-export all primary types at crate root for ergonomic imports:
//   use opensynth_types::{UserId, CurrencyKey, Synth, ...};

pub use collateral::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use synth::*;

// Constants are accessed via `opensynth_types::constants::FOO` and math
// helpers via `opensynth_types::math::mul` (not re-exported to avoid
// name collisions).
