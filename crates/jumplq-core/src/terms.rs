// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Per-Stage Terms
// ─────────────────────────────────────────────────────────────────────
//! The two halves of one stage:
//!   1. per next-mode terms from `(K_next, sigma_next)`
//!   2. per current-mode mixtures over the transition row, the
//!      pseudo-inverse of the mixed input cost, and the resulting gain,
//!      feedforward and updated value function.

use ndarray::{Array1, Array2};

use jumplq_linalg::{all_finite, pinv, symmetrize, symmetrize_in_place};
use jumplq_types::{JumpLqError, JumpLqResult, SolverConfig, TrackingProblem, ValueFunction};

/// Quantities of next mode `i` that every current mode mixes.
#[derive(Debug, Clone)]
pub struct ModeTerms {
    /// `Q + sym(A^T K A)`, `n x n`.
    pub qaka: Array2<f64>,
    /// `R + sym(B^T K B)`, `p x p`.
    pub rbkb: Array2<f64>,
    /// `B^T K A`, `p x n`.
    pub bka: Array2<f64>,
    /// `A^T sigma`, `n`.
    pub a_sigma: Array1<f64>,
    /// `B^T sigma`, `p`.
    pub b_sigma: Array1<f64>,
}

impl ModeTerms {
    pub fn compute(problem: &TrackingProblem, next: &ValueFunction, mode: usize) -> Self {
        let model = &problem.model;
        let a = model.a(mode);
        let b = model.b(mode);
        let k = next.k(mode);
        let sigma = next.sigma(mode);

        let ka = k.dot(&a);
        let kb = k.dot(&b);

        let mut qaka = model.q(mode).to_owned();
        qaka += &symmetrize(a.t().dot(&ka).view());

        let mut rbkb = model.r(mode).to_owned();
        rbkb += &symmetrize(b.t().dot(&kb).view());

        Self {
            qaka,
            rbkb,
            bka: b.t().dot(&ka),
            a_sigma: a.t().dot(&sigma),
            b_sigma: b.t().dot(&sigma),
        }
    }
}

/// Everything stage `k` produces for current mode `j`.
#[derive(Debug, Clone)]
pub struct StageSolution {
    /// `-pinv(P3) P2`, `p x n`.
    pub gain: Array2<f64>,
    /// `pinv(P3) s2`, `p`.
    pub feedforward: Array1<f64>,
    /// `sym(P1 - P2^T pinv(P3) P2)`.
    pub k: Array2<f64>,
    /// `ref[:, k] + s1 - P2^T pinv(P3) s2`.
    pub sigma: Array1<f64>,
    /// Numerical rank of the mixed input cost.
    pub rank: usize,
}

impl StageSolution {
    /// Mix `terms` over row `mode` of the transition matrix and solve.
    pub fn compute(
        problem: &TrackingProblem,
        config: &SolverConfig,
        terms: &[ModeTerms],
        stage: usize,
        mode: usize,
    ) -> JumpLqResult<Self> {
        let n = problem.model.state_dim();
        let p = problem.model.input_dim();
        let degenerate = |reason: String| JumpLqError::NumericalDegeneracy {
            stage,
            mode,
            reason,
        };

        let mut p1 = Array2::<f64>::zeros((n, n));
        let mut p2 = Array2::<f64>::zeros((p, n));
        let mut p3 = Array2::<f64>::zeros((p, p));
        let mut s1 = Array1::<f64>::zeros(n);
        let mut s2 = Array1::<f64>::zeros(p);

        // Summation order is the next-mode index, always on this thread.
        for (&t, next) in problem.transition_row(mode).iter().zip(terms) {
            p1.scaled_add(t, &next.qaka);
            p2.scaled_add(t, &next.bka);
            p3.scaled_add(t, &next.rbkb);
            s1.scaled_add(t, &next.a_sigma);
            s2.scaled_add(t, &next.b_sigma);
        }

        if config.check_finite && !all_finite(&p3) {
            return Err(degenerate("mixed input cost is not finite".to_string()));
        }

        let p3_pinv = pinv(p3.view(), config.pinv_rcond, config.max_svd_sweeps)
            .map_err(|e| degenerate(format!("pseudo-inverse failed: {e}")))?;
        let pinv_p2 = p3_pinv.matrix.dot(&p2);
        let feedforward = p3_pinv.matrix.dot(&s2);
        let gain = -&pinv_p2;

        let mut k = &p1 - &p2.t().dot(&pinv_p2);
        symmetrize_in_place(&mut k);

        let mut sigma = problem.ref_column(stage).to_owned();
        sigma += &s1;
        sigma -= &p2.t().dot(&feedforward);

        if config.check_finite
            && !(all_finite(&gain) && all_finite(&feedforward) && all_finite(&k) && all_finite(&sigma))
        {
            return Err(degenerate("non-finite gain or value function".to_string()));
        }

        Ok(Self {
            gain,
            feedforward,
            k,
            sigma,
            rank: p3_pinv.rank,
        })
    }
}
