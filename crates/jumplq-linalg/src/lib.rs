// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Dense Linear Algebra
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Numerical primitives for the backward recursion:
//!   - forced symmetrisation `(X + X^T) / 2`
//!   - one-sided (Hestenes) Jacobi SVD
//!   - Moore–Penrose pseudo-inverse with a stated relative cutoff
//!
//! Pure Rust on top of `ndarray`; no LAPACK.

pub mod pinv;
pub mod svd;
pub mod sym;

pub use pinv::{default_rcond, pinv, PseudoInverse};
pub use svd::{jacobi_svd, Svd};
pub use sym::{all_finite, symmetrize, symmetrize_in_place};

use thiserror::Error;

/// Failures of the dense primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Jacobi sweeps exhausted before the columns became orthogonal.
    #[error("jacobi svd did not converge within {sweeps} sweeps")]
    NotConverged { sweeps: usize },

    /// NaN or Inf in the operand.
    #[error("matrix contains non-finite entries")]
    NonFinite,
}

pub type LinalgResult<T> = Result<T, LinalgError>;
