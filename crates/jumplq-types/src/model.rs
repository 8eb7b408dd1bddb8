// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Augmented System Model and Problem Definition
// ─────────────────────────────────────────────────────────────────────
//! Read-only inputs of the backward recursion.
//!
//! Every stack is `(num_modes, rows, cols)` in standard layout. Fields
//! are public so hosts can build them in place; the engine re-runs
//! [`TrackingProblem::validate`] before touching any buffer.

use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{JumpLqError, JumpLqResult};

fn shape_str(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

/// Per-mode dynamics and cost matrices of a Markov jump-linear system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpLinearModel {
    /// State matrices, `(modes, n, n)`.
    pub a: Array3<f64>,
    /// Input matrices, `(modes, n, p)`.
    pub b: Array3<f64>,
    /// State-cost matrices, `(modes, n, n)`.
    pub q: Array3<f64>,
    /// Input-cost matrices, `(modes, p, p)`.
    pub r: Array3<f64>,
}

impl JumpLinearModel {
    pub fn new(
        a: Array3<f64>,
        b: Array3<f64>,
        q: Array3<f64>,
        r: Array3<f64>,
    ) -> JumpLqResult<Self> {
        let model = Self { a, b, q, r };
        model.validate()?;
        Ok(model)
    }

    /// Single-mode model from plain matrices.
    pub fn single_mode(
        a: Array2<f64>,
        b: Array2<f64>,
        q: Array2<f64>,
        r: Array2<f64>,
    ) -> JumpLqResult<Self> {
        Self::new(
            a.insert_axis(Axis(0)),
            b.insert_axis(Axis(0)),
            q.insert_axis(Axis(0)),
            r.insert_axis(Axis(0)),
        )
    }

    /// Check that all stacks agree on modes, `n` and `p`.
    pub fn validate(&self) -> JumpLqResult<()> {
        let (modes, n, n_cols) = self.a.dim();
        if modes == 0 {
            return Err(JumpLqError::dims("A", "at least one mode", 0));
        }
        if n == 0 || n_cols != n {
            return Err(JumpLqError::dims(
                "A",
                format!("{modes}xNxN with N >= 1"),
                shape_str(self.a.shape()),
            ));
        }

        let (b_modes, b_rows, p) = self.b.dim();
        if b_modes != modes || b_rows != n || p == 0 {
            return Err(JumpLqError::dims(
                "B",
                format!("{modes}x{n}xP with P >= 1"),
                shape_str(self.b.shape()),
            ));
        }

        if self.q.dim() != (modes, n, n) {
            return Err(JumpLqError::dims(
                "Q",
                format!("{modes}x{n}x{n}"),
                shape_str(self.q.shape()),
            ));
        }

        if self.r.dim() != (modes, p, p) {
            return Err(JumpLqError::dims(
                "R",
                format!("{modes}x{p}x{p}"),
                shape_str(self.r.shape()),
            ));
        }
        Ok(())
    }

    pub fn num_modes(&self) -> usize {
        self.a.len_of(Axis(0))
    }

    /// State dimension `n`.
    pub fn state_dim(&self) -> usize {
        self.a.len_of(Axis(1))
    }

    /// Input dimension `p`.
    pub fn input_dim(&self) -> usize {
        self.b.len_of(Axis(2))
    }

    pub fn a(&self, mode: usize) -> ArrayView2<'_, f64> {
        self.a.index_axis(Axis(0), mode)
    }

    pub fn b(&self, mode: usize) -> ArrayView2<'_, f64> {
        self.b.index_axis(Axis(0), mode)
    }

    pub fn q(&self, mode: usize) -> ArrayView2<'_, f64> {
        self.q.index_axis(Axis(0), mode)
    }

    pub fn r(&self, mode: usize) -> ArrayView2<'_, f64> {
        self.r.index_axis(Axis(0), mode)
    }
}

/// Complete input of one backward sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingProblem {
    pub model: JumpLinearModel,
    /// Row-stochastic `(modes, modes)`; entry `[j, m]` is the probability
    /// of moving from mode `j` to mode `m`.
    pub transition: Array2<f64>,
    /// Terminal quadratic cost, shared by every mode.
    pub terminal_cost: Array2<f64>,
    /// Number of control stages `N`.
    pub horizon: usize,
    /// `(n, >= N + 1)`; column `k` drives the affine term at stage `k`,
    /// column `N` is the terminal weighting.
    pub ref_weightings: Array2<f64>,
}

impl TrackingProblem {
    pub fn new(
        model: JumpLinearModel,
        transition: Array2<f64>,
        terminal_cost: Array2<f64>,
        horizon: usize,
        ref_weightings: Array2<f64>,
    ) -> JumpLqResult<Self> {
        let problem = Self {
            model,
            transition,
            terminal_cost,
            horizon,
            ref_weightings,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Structural preconditions of the recursion.
    pub fn validate(&self) -> JumpLqResult<()> {
        self.model.validate()?;
        let modes = self.model.num_modes();
        let n = self.model.state_dim();

        if self.transition.dim() != (modes, modes) {
            return Err(JumpLqError::dims(
                "transition matrix",
                format!("{modes}x{modes}"),
                shape_str(self.transition.shape()),
            ));
        }
        if self.terminal_cost.dim() != (n, n) {
            return Err(JumpLqError::dims(
                "terminal cost",
                format!("{n}x{n}"),
                shape_str(self.terminal_cost.shape()),
            ));
        }
        if self.horizon == 0 {
            return Err(JumpLqError::dims("horizon length", ">= 1", 0));
        }
        let (ref_rows, ref_cols) = self.ref_weightings.dim();
        let min_cols = self.horizon.checked_add(1).ok_or_else(|| {
            JumpLqError::dims("horizon length", "representable horizon + 1", self.horizon)
        })?;
        if ref_rows != n || ref_cols < min_cols {
            return Err(JumpLqError::dims(
                "reference weightings",
                format!("{n}x(>= {min_cols})"),
                shape_str(self.ref_weightings.shape()),
            ));
        }
        Ok(())
    }

    /// Reject NaN/Inf anywhere in the numeric inputs.
    pub fn ensure_finite(&self) -> JumpLqResult<()> {
        let stacks = [
            ("A", &self.model.a),
            ("B", &self.model.b),
            ("Q", &self.model.q),
            ("R", &self.model.r),
        ];
        for (name, stack) in stacks {
            if let Some(idx) = stack.indexed_iter().find(|(_, v)| !v.is_finite()) {
                return Err(JumpLqError::Validation(format!(
                    "{name} has non-finite entry at {:?}",
                    idx.0
                )));
            }
        }
        let planes = [
            ("transition matrix", &self.transition),
            ("terminal cost", &self.terminal_cost),
            ("reference weightings", &self.ref_weightings),
        ];
        for (name, plane) in planes {
            if let Some(((i, j), _)) = plane.indexed_iter().find(|(_, v)| !v.is_finite()) {
                return Err(JumpLqError::Validation(format!(
                    "{name} has non-finite entry at ({i}, {j})"
                )));
            }
        }
        Ok(())
    }

    /// Check that every transition row is a probability distribution.
    pub fn validate_transition_rows(&self, tolerance: f64) -> JumpLqResult<()> {
        for (j, row) in self.transition.outer_iter().enumerate() {
            if let Some(p) = row.iter().find(|&&p| p < 0.0) {
                return Err(JumpLqError::Validation(format!(
                    "transition row {j} has negative probability {p}"
                )));
            }
            let sum = row.sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(JumpLqError::Validation(format!(
                    "transition row {j} sums to {sum}, expected 1 within {tolerance}"
                )));
            }
        }
        Ok(())
    }

    /// Reference weighting column for `stage` (0..=N).
    pub fn ref_column(&self, stage: usize) -> ArrayView1<'_, f64> {
        self.ref_weightings.column(stage)
    }

    pub fn transition_row(&self, mode: usize) -> ArrayView1<'_, f64> {
        self.transition.row(mode)
    }
}
