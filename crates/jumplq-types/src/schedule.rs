// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Value Function and Result Tensors
// ─────────────────────────────────────────────────────────────────────

use ndarray::{Array1, Array2, Array3, Array4, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{JumpLqError, JumpLqResult};

/// Gains `L[k, j]`, shape `(N, modes, p, n)`, stage-major.
pub type GainTensor = Array4<f64>;

/// Feedforward terms `[k, j]`, shape `(N, modes, p)`, stage-major.
pub type FeedforwardTensor = Array3<f64>;

/// Zero-filled buffer whose reservation failure is reported instead of aborting.
fn try_zeroed(shape: &[usize]) -> JumpLqResult<Vec<f64>> {
    let elements = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(JumpLqError::AllocationFailure {
            elements: usize::MAX,
        })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(elements)
        .map_err(|_| JumpLqError::AllocationFailure { elements })?;
    buf.resize(elements, 0.0);
    Ok(buf)
}

/// Quadratic-plus-affine cost-to-go `(K, sigma)` for every mode at one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFunction {
    /// `(modes, n, n)`, symmetric per mode.
    pub k: Array3<f64>,
    /// `(modes, n)`.
    pub sigma: Array2<f64>,
}

impl ValueFunction {
    /// Terminal value: the same `K` and `sigma` broadcast to every mode.
    pub fn terminal(
        num_modes: usize,
        terminal_cost: ArrayView2<'_, f64>,
        terminal_sigma: ArrayView1<'_, f64>,
    ) -> Self {
        let n = terminal_cost.nrows();
        let mut k = Array3::zeros((num_modes, n, n));
        let mut sigma = Array2::zeros((num_modes, n));
        for mut slice in k.outer_iter_mut() {
            slice.assign(&terminal_cost);
        }
        for mut row in sigma.outer_iter_mut() {
            row.assign(&terminal_sigma);
        }
        Self { k, sigma }
    }

    pub fn num_modes(&self) -> usize {
        self.k.len_of(Axis(0))
    }

    pub fn k(&self, mode: usize) -> ArrayView2<'_, f64> {
        self.k.index_axis(Axis(0), mode)
    }

    pub fn sigma(&self, mode: usize) -> ArrayView1<'_, f64> {
        self.sigma.index_axis(Axis(0), mode)
    }

    /// Largest `|K[i,j] - K[j,i]|` over all modes.
    pub fn max_asymmetry(&self) -> f64 {
        self.k
            .outer_iter()
            .map(|k| {
                let mut worst = 0.0f64;
                for i in 0..k.nrows() {
                    for j in (i + 1)..k.ncols() {
                        worst = worst.max((k[[i, j]] - k[[j, i]]).abs());
                    }
                }
                worst
            })
            .fold(0.0, f64::max)
    }
}

/// Value functions for stages `0..=N`; index `N` is the terminal value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueTrace {
    pub stages: Vec<ValueFunction>,
}

impl ValueTrace {
    pub fn at(&self, stage: usize) -> Option<&ValueFunction> {
        self.stages.get(stage)
    }

    pub fn terminal(&self) -> Option<&ValueFunction> {
        self.stages.last()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Per-stage, per-mode feedback gains and feedforward terms.
///
/// Layout is stage-major: `gains[[k, j, .., ..]]` is the `p x n` gain for
/// stage `k` in mode `j`, `feedforward[[k, j, ..]]` the matching `p`-vector.
/// The control law is `u = L[k, j] * x + feedforward[k, j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSchedule {
    pub gains: GainTensor,
    pub feedforward: FeedforwardTensor,
}

impl TrackingSchedule {
    /// Allocate fully sized, zero-filled result buffers.
    pub fn try_zeros(
        horizon: usize,
        num_modes: usize,
        input_dim: usize,
        state_dim: usize,
    ) -> JumpLqResult<Self> {
        let gain_shape = [horizon, num_modes, input_dim, state_dim];
        let ff_shape = [horizon, num_modes, input_dim];
        let gain_buf = try_zeroed(&gain_shape)?;
        let ff_buf = try_zeroed(&ff_shape)?;
        let elements = gain_buf.len() + ff_buf.len();

        let gains =
            Array4::from_shape_vec((horizon, num_modes, input_dim, state_dim), gain_buf)
                .map_err(|_| JumpLqError::AllocationFailure { elements })?;
        let feedforward = Array3::from_shape_vec((horizon, num_modes, input_dim), ff_buf)
            .map_err(|_| JumpLqError::AllocationFailure { elements })?;
        Ok(Self { gains, feedforward })
    }

    pub fn horizon(&self) -> usize {
        self.gains.len_of(Axis(0))
    }

    pub fn num_modes(&self) -> usize {
        self.gains.len_of(Axis(1))
    }

    pub fn input_dim(&self) -> usize {
        self.gains.len_of(Axis(2))
    }

    pub fn state_dim(&self) -> usize {
        self.gains.len_of(Axis(3))
    }

    /// Gain `L[stage, mode]` (`p x n`). Panics when out of range.
    pub fn gain(&self, stage: usize, mode: usize) -> ArrayView2<'_, f64> {
        self.gains
            .index_axis(Axis(0), stage)
            .index_axis_move(Axis(0), mode)
    }

    /// Feedforward term for `(stage, mode)` (`p`). Panics when out of range.
    pub fn feedforward(&self, stage: usize, mode: usize) -> ArrayView1<'_, f64> {
        self.feedforward
            .index_axis(Axis(0), stage)
            .index_axis_move(Axis(0), mode)
    }

    pub fn get_gain(&self, stage: usize, mode: usize) -> Option<ArrayView2<'_, f64>> {
        (stage < self.horizon() && mode < self.num_modes()).then(|| self.gain(stage, mode))
    }

    pub fn get_feedforward(&self, stage: usize, mode: usize) -> Option<ArrayView1<'_, f64>> {
        (stage < self.horizon() && mode < self.num_modes()).then(|| self.feedforward(stage, mode))
    }

    /// Write one `(stage, mode)` cell.
    pub fn write_cell(
        &mut self,
        stage: usize,
        mode: usize,
        gain: ArrayView2<'_, f64>,
        feedforward: ArrayView1<'_, f64>,
    ) {
        self.gains
            .index_axis_mut(Axis(0), stage)
            .index_axis_move(Axis(0), mode)
            .assign(&gain);
        self.feedforward
            .index_axis_mut(Axis(0), stage)
            .index_axis_move(Axis(0), mode)
            .assign(&feedforward);
    }

    /// Control input `u = L[stage, mode] * x + feedforward[stage, mode]`.
    pub fn control_input(
        &self,
        stage: usize,
        mode: usize,
        state: ArrayView1<'_, f64>,
    ) -> JumpLqResult<Array1<f64>> {
        if stage >= self.horizon() {
            return Err(JumpLqError::dims(
                "stage index",
                format!("< {}", self.horizon()),
                stage,
            ));
        }
        if mode >= self.num_modes() {
            return Err(JumpLqError::dims(
                "mode index",
                format!("< {}", self.num_modes()),
                mode,
            ));
        }
        if state.len() != self.state_dim() {
            return Err(JumpLqError::dims(
                "state vector",
                self.state_dim(),
                state.len(),
            ));
        }
        Ok(self.gain(stage, mode).dot(&state) + self.feedforward(stage, mode))
    }

    /// Split into the raw `(gains, feedforward)` tensors.
    pub fn into_parts(self) -> (GainTensor, FeedforwardTensor) {
        (self.gains, self.feedforward)
    }
}
