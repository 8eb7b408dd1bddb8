// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Data model, solver configuration, and error hierarchy for the
//! finite-horizon LQ tracking kernel over Markov jump-linear systems.
//!
//! Matrix stacks indexed by mode are `Array3<f64>` with the mode on
//! axis 0, so every mode's matrix is a contiguous axis-0 view.

pub mod config;
pub mod error;
pub mod model;
pub mod schedule;

pub use config::{SolverConfig, DEFAULT_MAX_SVD_SWEEPS};
pub use error::{JumpLqError, JumpLqResult};
pub use model::{JumpLinearModel, TrackingProblem};
pub use schedule::{FeedforwardTensor, GainTensor, TrackingSchedule, ValueFunction, ValueTrace};
