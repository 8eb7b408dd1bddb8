// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — One-Sided Jacobi SVD
// ─────────────────────────────────────────────────────────────────────
//! Hestenes one-sided Jacobi SVD for small dense matrices.
//!
//! Plane rotations are applied to column pairs of a working copy `W` of
//! `A` (and accumulated in `V`) until every pair is orthogonal to within
//! a relative tolerance. Then `A = W V^T`, the singular values are the
//! column norms of `W`, and `U[:, j] = W[:, j] / s_j`. `U` is never formed.
//!
//! Columns whose squared norm falls below `m * eps^2 * ||A||_F^2` are left
//! out of the rotations and report a singular value of exactly zero, since
//! they were never orthogonalised against the rest.
//!
//! For the input-cost matrices of a tracking problem (`p` rarely above a
//! few dozen) convergence takes well under ten sweeps.

use ndarray::{Array1, Array2, ArrayView2};

use crate::sym::all_finite;
use crate::{LinalgError, LinalgResult};

/// Relative orthogonality tolerance between rotated columns.
const JACOBI_TOL: f64 = 1e-14;

/// Thin SVD `A = W V^T` with `W = U diag(s)`, `W: m x n`, `V: n x n`.
///
/// Singular values are in column order, not sorted.
#[derive(Debug, Clone)]
pub struct Svd {
    pub singular_values: Array1<f64>,
    pub v: Array2<f64>,
    /// Rotated working matrix `W = U diag(s)`.
    pub w: Array2<f64>,
    /// Sweeps performed, including the final rotation-free one.
    pub sweeps: usize,
}

impl Svd {
    /// Largest singular value (0 for an empty or zero matrix).
    pub fn max_singular_value(&self) -> f64 {
        self.singular_values.iter().copied().fold(0.0, f64::max)
    }
}

/// One-sided Jacobi SVD of `a` (`m x n`).
///
/// Fails with `NotConverged` if a full rotation-free sweep is not reached
/// within `max_sweeps`, and with `NonFinite` on NaN/Inf input.
pub fn jacobi_svd(a: ArrayView2<'_, f64>, max_sweeps: usize) -> LinalgResult<Svd> {
    if !all_finite(&a) {
        return Err(LinalgError::NonFinite);
    }
    let (m, n) = a.dim();
    let mut w = a.to_owned();
    let mut v = Array2::<f64>::eye(n);
    let tol = JACOBI_TOL.max(4.0 * m as f64 * f64::EPSILON);
    // Columns below this squared norm are numerically zero; rotating
    // them only chases rounding noise.
    let frob_sq: f64 = a.iter().map(|x| x * x).sum();
    let negligible = m as f64 * f64::EPSILON * f64::EPSILON * frob_sq;

    let mut converged = false;
    let mut sweeps = 0;
    while sweeps < max_sweeps {
        sweeps += 1;
        let mut rotated = false;

        for p in 0..n {
            for q in (p + 1)..n {
                let mut alpha = 0.0;
                let mut beta = 0.0;
                let mut gamma = 0.0;
                for i in 0..m {
                    let wp = w[[i, p]];
                    let wq = w[[i, q]];
                    alpha += wp * wp;
                    beta += wq * wq;
                    gamma += wp * wq;
                }
                if alpha <= negligible || beta <= negligible {
                    continue;
                }
                if gamma == 0.0 || gamma.abs() <= tol * alpha.sqrt() * beta.sqrt() {
                    continue;
                }
                rotated = true;

                // Smaller root of t^2 + 2*zeta*t - 1 = 0
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + 1.0f64.hypot(zeta));
                let c = 1.0 / 1.0f64.hypot(t);
                let s = c * t;

                for i in 0..m {
                    let wp = w[[i, p]];
                    let wq = w[[i, q]];
                    w[[i, p]] = c * wp - s * wq;
                    w[[i, q]] = s * wp + c * wq;
                }
                for i in 0..n {
                    let vp = v[[i, p]];
                    let vq = v[[i, q]];
                    v[[i, p]] = c * vp - s * vq;
                    v[[i, q]] = s * vp + c * vq;
                }
            }
        }

        if !rotated {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(LinalgError::NotConverged { sweeps });
    }

    let singular_values = Array1::from_shape_fn(n, |j| {
        let norm_sq = w.column(j).dot(&w.column(j));
        if norm_sq <= negligible {
            0.0
        } else {
            norm_sq.sqrt()
        }
    });

    Ok(Svd {
        singular_values,
        v,
        w,
        sweeps,
    })
}
