// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Backward Recursion Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Finite-horizon LQ tracking gains for Markov jump-linear systems.
//!
//! One backward dynamic-programming sweep from the terminal stage `N`
//! down to stage `0`, mixing cost-to-go matrices across modes with the
//! transition probabilities.
//!
//! # Invariants
//!
//! 1. **Strictly backward**: stage `k` reads only the value function of
//!    stage `k + 1` and the immutable inputs.
//! 2. **Snapshot discipline**: the next-stage value function is held in
//!    one buffer while the current stage is written to the other; the
//!    buffers are swapped only after every mode of the stage is solved.
//! 3. **Exact symmetry**: every `K` leaves the stage with mirrored
//!    entries bitwise equal.
//! 4. **Deterministic**: each mixture is summed over next modes in index
//!    order on one thread, so the parallel and sequential paths agree
//!    bit for bit.
//! 5. **All or nothing**: on any error no schedule is returned.

pub mod engine;
pub mod terms;

pub use engine::{solve, TrackingSolver};
pub use terms::{ModeTerms, StageSolution};

pub use jumplq_types::{
    FeedforwardTensor, GainTensor, JumpLinearModel, JumpLqError, JumpLqResult, SolverConfig,
    TrackingProblem, TrackingSchedule, ValueFunction, ValueTrace,
};
