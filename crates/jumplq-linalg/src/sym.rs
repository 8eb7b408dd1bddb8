// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Symmetry Helpers
// ─────────────────────────────────────────────────────────────────────

use ndarray::{Array2, ArrayBase, ArrayView2, Data, Dimension};

/// `(X + X^T) / 2` for a square `X`.
pub fn symmetrize(x: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut out = x.to_owned();
    symmetrize_in_place(&mut out);
    out
}

/// Average mirrored off-diagonal pairs; the diagonal is untouched.
pub fn symmetrize_in_place(x: &mut Array2<f64>) {
    debug_assert_eq!(x.nrows(), x.ncols(), "symmetrize needs a square matrix");
    let n = x.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (x[[i, j]] + x[[j, i]]);
            x[[i, j]] = avg;
            x[[j, i]] = avg;
        }
    }
}

pub fn all_finite<S, D>(a: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    a.iter().all(|v| v.is_finite())
}
