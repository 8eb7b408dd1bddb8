// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Solver Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{JumpLqError, JumpLqResult};

/// Jacobi sweep limit for the SVD behind every pseudo-inverse.
pub const DEFAULT_MAX_SVD_SWEEPS: usize = 64;

/// Runtime configuration for the backward recursion.
///
/// The defaults reproduce the plain recursion: conventional
/// Moore–Penrose tolerance, no transition-row re-validation, per-mode
/// work spread over the rayon pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative singular-value cutoff for the pseudo-inverse.
    /// Singular values `<= rcond * sigma_max` are treated as zero.
    /// `None` selects `max(rows, cols) * f64::EPSILON`.
    pub pinv_rcond: Option<f64>,

    /// Maximum one-sided Jacobi sweeps before the SVD is declared
    /// non-convergent (surfaced as `NumericalDegeneracy`).
    /// Default: 64.
    pub max_svd_sweeps: usize,

    /// Evaluate the per-mode terms of a stage on the rayon pool.
    /// Results are bit-identical to the sequential path.
    /// Default: true.
    pub parallel_modes: bool,

    /// Reject non-finite mixed input-cost matrices or gains.
    /// Default: true.
    pub check_finite: bool,

    /// When set, every transition row must be non-negative and sum to 1
    /// within this tolerance. Default: None (rows are trusted).
    pub row_sum_tolerance: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pinv_rcond: None,
            max_svd_sweeps: DEFAULT_MAX_SVD_SWEEPS,
            parallel_modes: true,
            check_finite: true,
            row_sum_tolerance: None,
        }
    }
}

impl SolverConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> JumpLqResult<()> {
        if let Some(rcond) = self.pinv_rcond {
            if !rcond.is_finite() || !(0.0..1.0).contains(&rcond) {
                return Err(JumpLqError::Config(format!(
                    "pinv_rcond must be in [0, 1), got {rcond}"
                )));
            }
        }
        if self.max_svd_sweeps == 0 {
            return Err(JumpLqError::Config(
                "max_svd_sweeps must be >= 1".to_string(),
            ));
        }
        if let Some(tol) = self.row_sum_tolerance {
            if !tol.is_finite() || tol < 0.0 {
                return Err(JumpLqError::Config(format!(
                    "row_sum_tolerance must be finite and >= 0, got {tol}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> JumpLqResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| JumpLqError::Config(format!("JSON parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
