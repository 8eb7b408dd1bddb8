// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Moore–Penrose Pseudo-Inverse
// ─────────────────────────────────────────────────────────────────────
//! `A^+ = V diag(1 / s_j) U^T`, summed only over singular values above
//! `rcond * s_max`.
//!
//! With `W = U diag(s)` from the one-sided Jacobi sweep this is
//! `A^+[r, c] = sum_j V[r, j] * W[c, j] / s_j^2`, which never forms `U`.
//! The zero matrix maps to the zero matrix.

use ndarray::{Array2, ArrayView2};

use crate::svd::jacobi_svd;
use crate::LinalgResult;

/// Conventional relative cutoff `max(rows, cols) * eps`.
pub fn default_rcond(rows: usize, cols: usize) -> f64 {
    rows.max(cols).max(1) as f64 * f64::EPSILON
}

/// Pseudo-inverse together with its numerical rank.
#[derive(Debug, Clone)]
pub struct PseudoInverse {
    /// `n x m` for an `m x n` operand.
    pub matrix: Array2<f64>,
    /// Singular values kept above the cutoff.
    pub rank: usize,
}

/// Moore–Penrose pseudo-inverse of `a`.
///
/// `rcond = None` uses [`default_rcond`].
pub fn pinv(
    a: ArrayView2<'_, f64>,
    rcond: Option<f64>,
    max_sweeps: usize,
) -> LinalgResult<PseudoInverse> {
    let (m, n) = a.dim();
    let svd = jacobi_svd(a, max_sweeps)?;
    let rcond = rcond.unwrap_or_else(|| default_rcond(m, n));
    let cutoff = rcond * svd.max_singular_value();

    let mut matrix = Array2::zeros((n, m));
    let mut rank = 0;
    for (j, &s) in svd.singular_values.iter().enumerate() {
        if s <= cutoff || s == 0.0 {
            continue;
        }
        rank += 1;
        let inv_sq = 1.0 / (s * s);
        for r in 0..n {
            let v_rj = svd.v[[r, j]] * inv_sq;
            if v_rj == 0.0 {
                continue;
            }
            for c in 0..m {
                matrix[[r, c]] += v_rj * svd.w[[c, j]];
            }
        }
    }

    if rank < m.min(n) {
        log::debug!(
            "pinv: rank {rank} of {m}x{n} operand (cutoff {cutoff:.3e}, {} sweeps)",
            svd.sweeps
        );
    }

    Ok(PseudoInverse { matrix, rank })
}
