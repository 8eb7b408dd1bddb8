// ─────────────────────────────────────────────────────────────────────
// JumpLQ Kernel — Backward Sweep
// ─────────────────────────────────────────────────────────────────────
//! Stage loop of the recursion:
//!   1. Snapshot `(K, sigma)` of stage `k + 1` (the `next` buffer)
//!   2. Per next-mode terms (`ModeTerms`), independent across modes
//!   3. Per current-mode mixtures + pseudo-inverse (`StageSolution`)
//!   4. Write gains/feedforward for stage `k`, fill the `current` buffer
//!   5. Swap buffers
//!
//! Steps 2 and 3 run on the rayon pool when `parallel_modes` is set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use jumplq_types::{
    FeedforwardTensor, GainTensor, JumpLinearModel, JumpLqError, JumpLqResult, SolverConfig,
    TrackingProblem, TrackingSchedule, ValueFunction, ValueTrace,
};

use crate::terms::{ModeTerms, StageSolution};

/// Backward recursion engine with its numerical configuration.
#[derive(Debug, Clone, Default)]
pub struct TrackingSolver {
    config: SolverConfig,
}

impl TrackingSolver {
    pub fn new(config: SolverConfig) -> JumpLqResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run the full sweep and return the gain/feedforward schedule.
    pub fn solve(&self, problem: &TrackingProblem) -> JumpLqResult<TrackingSchedule> {
        self.run(problem, None, false).map(|(schedule, _)| schedule)
    }

    /// Like [`solve`](Self::solve), also returning `(K, sigma)` for stages `0..=N`.
    pub fn solve_with_trace(
        &self,
        problem: &TrackingProblem,
    ) -> JumpLqResult<(TrackingSchedule, ValueTrace)> {
        let (schedule, trace) = self.run(problem, None, true)?;
        Ok((schedule, trace.unwrap_or_default()))
    }

    /// Like [`solve`](Self::solve), checking `cancel` once before every stage.
    pub fn solve_cancellable(
        &self,
        problem: &TrackingProblem,
        cancel: &AtomicBool,
    ) -> JumpLqResult<TrackingSchedule> {
        self.run(problem, Some(cancel), false)
            .map(|(schedule, _)| schedule)
    }

    fn check_preconditions(&self, problem: &TrackingProblem) -> JumpLqResult<()> {
        problem.validate()?;
        if self.config.check_finite {
            problem.ensure_finite()?;
        }
        if let Some(tol) = self.config.row_sum_tolerance {
            problem.validate_transition_rows(tol)?;
        }
        let ref_cols = problem.ref_weightings.ncols();
        if ref_cols > problem.horizon + 1 {
            log::warn!(
                "reference weightings have {ref_cols} columns; columns past {} are ignored",
                problem.horizon
            );
        }
        Ok(())
    }

    fn run(
        &self,
        problem: &TrackingProblem,
        cancel: Option<&AtomicBool>,
        keep_trace: bool,
    ) -> JumpLqResult<(TrackingSchedule, Option<ValueTrace>)> {
        self.check_preconditions(problem)?;

        let modes = problem.model.num_modes();
        let n = problem.model.state_dim();
        let p = problem.model.input_dim();
        let horizon = problem.horizon;
        let start = Instant::now();
        log::debug!(
            "backward sweep: {modes} modes, n={n}, p={p}, horizon={horizon}, parallel={}",
            self.config.parallel_modes
        );

        let mut schedule = TrackingSchedule::try_zeros(horizon, modes, p, n)?;

        // K_N and sigma_N are mode-independent.
        let mut next = ValueFunction::terminal(
            modes,
            problem.terminal_cost.view(),
            problem.ref_column(horizon),
        );
        let mut current = ValueFunction {
            k: Array3::zeros((modes, n, n)),
            sigma: Array2::zeros((modes, n)),
        };

        // Collected last-stage-first, reversed once at the end.
        let mut trace = keep_trace.then(|| {
            let mut stages = Vec::with_capacity(horizon + 1);
            stages.push(next.clone());
            stages
        });

        for stage in (0..horizon).rev() {
            if let Some(flag) = cancel {
                if flag.load(Ordering::SeqCst) {
                    log::info!("backward sweep cancelled before stage {stage}");
                    return Err(JumpLqError::Cancelled { stage });
                }
            }

            let terms = self.mode_terms(problem, &next);
            let solutions = self.stage_solutions(problem, &terms, stage)?;

            let mut min_rank = p;
            for (mode, sol) in solutions.into_iter().enumerate() {
                schedule.write_cell(stage, mode, sol.gain.view(), sol.feedforward.view());
                current.k.index_axis_mut(Axis(0), mode).assign(&sol.k);
                current.sigma.index_axis_mut(Axis(0), mode).assign(&sol.sigma);
                min_rank = min_rank.min(sol.rank);
            }
            log::trace!("stage {stage} solved (min input-cost rank {min_rank}/{p})");

            std::mem::swap(&mut next, &mut current);
            if let Some(stages) = trace.as_mut() {
                stages.push(next.clone());
            }
        }

        log::debug!(
            "backward sweep finished in {:.3} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        let trace = trace.map(|mut stages| {
            stages.reverse();
            ValueTrace { stages }
        });
        Ok((schedule, trace))
    }

    fn mode_terms(&self, problem: &TrackingProblem, next: &ValueFunction) -> Vec<ModeTerms> {
        let modes = problem.model.num_modes();
        if self.config.parallel_modes && modes > 1 {
            (0..modes)
                .into_par_iter()
                .map(|i| ModeTerms::compute(problem, next, i))
                .collect()
        } else {
            (0..modes)
                .map(|i| ModeTerms::compute(problem, next, i))
                .collect()
        }
    }

    /// Solve every current mode; the lowest failing mode is reported.
    fn stage_solutions(
        &self,
        problem: &TrackingProblem,
        terms: &[ModeTerms],
        stage: usize,
    ) -> JumpLqResult<Vec<StageSolution>> {
        let modes = problem.model.num_modes();
        let results: Vec<JumpLqResult<StageSolution>> = if self.config.parallel_modes && modes > 1
        {
            (0..modes)
                .into_par_iter()
                .map(|j| StageSolution::compute(problem, &self.config, terms, stage, j))
                .collect()
        } else {
            (0..modes)
                .map(|j| StageSolution::compute(problem, &self.config, terms, stage, j))
                .collect()
        };
        results.into_iter().collect()
    }
}

/// One-call form of the recursion with the default configuration.
///
/// Stacks are `(modes, rows, cols)`. Returns gains `(N, modes, p, n)` and
/// feedforward terms `(N, modes, p)`, both stage-major.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    a: Array3<f64>,
    b: Array3<f64>,
    q: Array3<f64>,
    r: Array3<f64>,
    transition: Array2<f64>,
    terminal_cost: Array2<f64>,
    horizon: usize,
    ref_weightings: Array2<f64>,
) -> JumpLqResult<(GainTensor, FeedforwardTensor)> {
    let problem = TrackingProblem::new(
        JumpLinearModel::new(a, b, q, r)?,
        transition,
        terminal_cost,
        horizon,
        ref_weightings,
    )?;
    TrackingSolver::default()
        .solve(&problem)
        .map(TrackingSchedule::into_parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn scalar_problem(horizon: usize, refs: Array2<f64>) -> TrackingProblem {
        let model = JumpLinearModel::single_mode(
            array![[1.0]],
            array![[1.0]],
            array![[1.0]],
            array![[1.0]],
        )
        .expect("consistent model");
        TrackingProblem::new(model, array![[1.0]], array![[1.0]], horizon, refs)
            .expect("valid problem")
    }

    /// Three-mode networked loop: nominal, free input, dropped packet.
    fn network_problem(horizon: usize) -> TrackingProblem {
        let (modes, n, p) = (3, 3, 2);
        let mut a = Array3::zeros((modes, n, n));
        let mut b = Array3::zeros((modes, n, p));
        let mut q = Array3::zeros((modes, n, n));
        let mut r = Array3::zeros((modes, p, p));
        for i in 0..modes {
            for row in 0..n {
                for col in 0..n {
                    let base = if row == col { 1.0 } else { 0.0 };
                    a[[i, row, col]] =
                        base + 0.1 * ((row * n + col + i) as f64 * 0.7).sin();
                }
                q[[i, row, row]] = 1.0 + 0.5 * i as f64;
            }
            q[[i, 0, 2]] = 0.1;
            q[[i, 2, 0]] = 0.1;
        }
        for i in 0..2 {
            for row in 0..n {
                for col in 0..p {
                    b[[i, row, col]] = 0.2 + 0.3 * ((row + 2 * col + i) as f64 * 1.3).cos();
                }
            }
        }
        // mode 0 pays for input; mode 1 is free; mode 2 drops the packet
        r[[0, 0, 0]] = 0.1;
        r[[0, 1, 1]] = 0.2;
        r[[2, 0, 0]] = 0.1;
        r[[2, 1, 1]] = 0.2;

        let model = JumpLinearModel::new(a, b, q, r).expect("consistent model");
        let transition = array![[0.7, 0.2, 0.1], [0.3, 0.5, 0.2], [0.25, 0.25, 0.5]];
        let terminal = Array2::eye(n) * 2.0;
        let refs = Array2::from_shape_fn((n, horizon + 1), |(row, col)| {
            ((row + 1) as f64 * 0.3 + col as f64 * 0.11).sin()
        });
        TrackingProblem::new(model, transition, terminal, horizon, refs).expect("valid problem")
    }

    fn sequential() -> TrackingSolver {
        TrackingSolver::new(SolverConfig {
            parallel_modes: false,
            ..SolverConfig::default()
        })
        .expect("valid config")
    }

    fn assert_bitwise_eq(a: &TrackingSchedule, b: &TrackingSchedule) {
        assert_eq!(a.gains.dim(), b.gains.dim());
        for (x, y) in a.gains.iter().zip(b.gains.iter()) {
            assert_eq!(x.to_bits(), y.to_bits(), "gain {x} vs {y}");
        }
        for (x, y) in a.feedforward.iter().zip(b.feedforward.iter()) {
            assert_eq!(x.to_bits(), y.to_bits(), "feedforward {x} vs {y}");
        }
    }

    #[test]
    fn test_scalar_hand_worked() {
        let problem = scalar_problem(2, array![[0.5, 1.0, 2.0]]);
        let (schedule, trace) = TrackingSolver::default()
            .solve_with_trace(&problem)
            .expect("solvable");

        assert!((schedule.gain(1, 0)[[0, 0]] + 0.5).abs() < 1e-14);
        assert!((schedule.gain(0, 0)[[0, 0]] + 0.6).abs() < 1e-14);
        assert!((schedule.feedforward(1, 0)[0] - 1.0).abs() < 1e-14);
        assert!((schedule.feedforward(0, 0)[0] - 0.8).abs() < 1e-14);

        assert_eq!(trace.len(), 3);
        let expected_k = [1.6, 1.5, 1.0];
        let expected_sigma = [1.3, 2.0, 2.0];
        for stage in 0..3 {
            let vf = trace.at(stage).expect("stage in trace");
            assert!(
                (vf.k(0)[[0, 0]] - expected_k[stage]).abs() < 1e-14,
                "K[{stage}] = {}",
                vf.k(0)[[0, 0]]
            );
            assert!(
                (vf.sigma(0)[0] - expected_sigma[stage]).abs() < 1e-14,
                "sigma[{stage}] = {}",
                vf.sigma(0)[0]
            );
        }
    }

    #[test]
    fn test_two_mode_packet_loss_mixture() {
        let b = Array3::from_shape_vec((2, 1, 1), vec![1.0, 0.0]).expect("shape");
        let model = JumpLinearModel::new(
            Array3::ones((2, 1, 1)),
            b,
            Array3::ones((2, 1, 1)),
            Array3::ones((2, 1, 1)),
        )
        .expect("consistent model");
        let problem = TrackingProblem::new(
            model,
            array![[0.2, 0.8], [0.6, 0.4]],
            array![[1.0]],
            1,
            array![[0.0, 0.0]],
        )
        .expect("valid problem");
        let schedule = TrackingSolver::default().solve(&problem).expect("solvable");
        assert!((schedule.gain(0, 0)[[0, 0]] + 1.0 / 6.0).abs() < 1e-14);
        assert!((schedule.gain(0, 1)[[0, 0]] + 0.375).abs() < 1e-14);
    }

    #[test]
    fn test_single_stage_matches_direct_formula() {
        let model = JumpLinearModel::new(
            Array3::from_shape_vec((2, 2, 2), vec![1.0, 0.1, 0.0, 1.0, 0.9, 0.2, -0.1, 1.1])
                .expect("shape"),
            Array3::from_shape_vec((2, 2, 1), vec![0.0, 0.1, 0.05, 0.2]).expect("shape"),
            Array3::from_shape_vec((2, 2, 2), vec![1.0, 0.0, 0.0, 1.0, 2.0, 0.3, 0.3, 1.0])
                .expect("shape"),
            Array3::from_shape_vec((2, 1, 1), vec![0.5, 0.25]).expect("shape"),
        )
        .expect("consistent model");
        let transition = array![[0.9, 0.1], [0.4, 0.6]];
        let terminal = array![[2.0, 0.5], [0.5, 1.0]];
        let refs = array![[0.1, 1.0], [0.2, -1.0]];
        let problem =
            TrackingProblem::new(model, transition.clone(), terminal.clone(), 1, refs.clone())
                .expect("valid problem");

        let (schedule, trace) = sequential().solve_with_trace(&problem).expect("solvable");

        let terminal_vf = trace.terminal().expect("terminal in trace");
        for mode in 0..2 {
            assert_eq!(terminal_vf.k(mode), terminal);
            assert_eq!(terminal_vf.sigma(mode), refs.column(1));
        }

        let r_n = refs.column(1);
        for j in 0..2 {
            let mut p1 = Array2::<f64>::zeros((2, 2));
            let mut p2 = Array2::<f64>::zeros((1, 2));
            let mut p3 = 0.0;
            let mut s1 = Array1::<f64>::zeros(2);
            let mut s2 = 0.0;
            for m in 0..2 {
                let t = transition[[j, m]];
                let a = problem.model.a(m);
                let b = problem.model.b(m);
                p1 = p1 + (&problem.model.q(m) + &a.t().dot(&terminal).dot(&a)) * t;
                p2 = p2 + b.t().dot(&terminal).dot(&a) * t;
                p3 += t * (problem.model.r(m)[[0, 0]] + b.t().dot(&terminal).dot(&b)[[0, 0]]);
                s1 = s1 + a.t().dot(&r_n) * t;
                s2 += t * b.t().dot(&r_n)[0];
            }
            let gain = &p2 * (-1.0 / p3);
            let ff = s2 / p3;
            let k = &p1 - &(p2.t().dot(&p2) / p3);
            let sigma = &refs.column(0) + &s1 - &(p2.row(0).to_owned() * (s2 / p3));

            let first = trace.at(0).expect("stage 0 in trace");
            for c in 0..2 {
                assert!(
                    (schedule.gain(0, j)[[0, c]] - gain[[0, c]]).abs() < 1e-12,
                    "L[0,{j}][{c}] = {} vs {}",
                    schedule.gain(0, j)[[0, c]],
                    gain[[0, c]]
                );
                assert!((first.sigma(j)[c] - sigma[c]).abs() < 1e-12);
                for rr in 0..2 {
                    assert!(
                        (first.k(j)[[rr, c]] - k[[rr, c]]).abs() < 1e-12,
                        "K[{j}][{rr},{c}]"
                    );
                }
            }
            assert!((schedule.feedforward(0, j)[0] - ff).abs() < 1e-12);
        }
    }

    #[test]
    fn test_value_function_symmetric_every_stage() {
        let problem = network_problem(25);
        let (_, trace) = TrackingSolver::default()
            .solve_with_trace(&problem)
            .expect("solvable");
        assert_eq!(trace.len(), 26);
        for (stage, vf) in trace.stages.iter().enumerate() {
            assert_eq!(
                vf.max_asymmetry(),
                0.0,
                "K at stage {stage} is not exactly symmetric"
            );
        }
    }

    #[test]
    fn test_rejects_b_r_mismatch() {
        let problem = TrackingProblem {
            model: JumpLinearModel {
                a: Array3::ones((1, 2, 2)),
                b: Array3::ones((1, 2, 2)),
                q: Array3::ones((1, 2, 2)),
                r: Array3::ones((1, 1, 1)),
            },
            transition: array![[1.0]],
            terminal_cost: Array2::eye(2),
            horizon: 3,
            ref_weightings: Array2::zeros((2, 4)),
        };
        let err = TrackingSolver::default().solve(&problem).unwrap_err();
        assert!(
            matches!(err, JumpLqError::InvalidDimensions { ref what, .. } if what == "R"),
            "{err:?}"
        );
    }

    #[test]
    fn test_zero_input_cost_minimum_norm() {
        // n = 1, p = 2; the second input channel is structurally decoupled.
        let model = JumpLinearModel::single_mode(
            array![[1.0]],
            array![[1.0, 0.0]],
            array![[1.0]],
            Array2::zeros((2, 2)),
        )
        .expect("consistent model");
        let problem =
            TrackingProblem::new(model, array![[1.0]], array![[1.0]], 3, array![[0.0, 0.0, 0.0, 1.0]])
                .expect("valid problem");
        let (schedule, trace) = TrackingSolver::default()
            .solve_with_trace(&problem)
            .expect("singular input cost is handled");

        assert!(schedule.gains.iter().all(|v| v.is_finite()));
        assert!(schedule.feedforward.iter().all(|v| v.is_finite()));
        for stage in 0..3 {
            // Deadbeat on channel 0, nothing on the decoupled channel 1.
            assert!((schedule.gain(stage, 0)[[0, 0]] + 1.0).abs() < 1e-14);
            assert_eq!(schedule.gain(stage, 0)[[1, 0]], 0.0);
            assert_eq!(schedule.feedforward(stage, 0)[1], 0.0);
            assert!((trace.at(stage).expect("stage in trace").k(0)[[0, 0]] - 1.0).abs() < 1e-14);
        }
        assert!((schedule.feedforward(2, 0)[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_zero_input_matrix_and_cost() {
        let model = JumpLinearModel::single_mode(
            array![[0.5]],
            array![[0.0]],
            array![[1.0]],
            array![[0.0]],
        )
        .expect("consistent model");
        let problem =
            TrackingProblem::new(model, array![[1.0]], array![[1.0]], 2, array![[0.0, 0.0, 0.0]])
                .expect("valid problem");
        let schedule = TrackingSolver::default().solve(&problem).expect("solvable");
        assert!(schedule.gains.iter().all(|&v| v == 0.0));
        assert!(schedule.feedforward.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_idempotent_bitwise() {
        let problem = network_problem(15);
        let solver = TrackingSolver::default();
        let first = solver.solve(&problem).expect("solvable");
        let second = solver.solve(&problem).expect("solvable");
        assert_bitwise_eq(&first, &second);
    }

    #[test]
    fn test_parallel_matches_sequential_bitwise() {
        let problem = network_problem(15);
        let parallel = TrackingSolver::default().solve(&problem).expect("solvable");
        let serial = sequential().solve(&problem).expect("solvable");
        assert_bitwise_eq(&parallel, &serial);
    }

    #[test]
    fn test_horizon_extension_preserves_tail() {
        let short = network_problem(4);
        let mut long = short.clone();
        long.horizon = 5;
        let n = short.model.state_dim();
        let mut refs = Array2::zeros((n, 6));
        refs.column_mut(0).fill(0.42);
        refs.slice_mut(ndarray::s![.., 1..]).assign(&short.ref_weightings);
        long.ref_weightings = refs;

        let solver = TrackingSolver::default();
        let s = solver.solve(&short).expect("solvable");
        let l = solver.solve(&long).expect("solvable");

        for k in 0..4 {
            for j in 0..3 {
                for (x, y) in s.gain(k, j).iter().zip(l.gain(k + 1, j).iter()) {
                    assert_eq!(x.to_bits(), y.to_bits(), "gain stage {k} mode {j}");
                }
                for (x, y) in s.feedforward(k, j).iter().zip(l.feedforward(k + 1, j).iter()) {
                    assert_eq!(x.to_bits(), y.to_bits(), "feedforward stage {k} mode {j}");
                }
            }
        }
    }

    #[test]
    fn test_extra_reference_columns_ignored() {
        let exact = scalar_problem(2, array![[0.5, 1.0, 2.0]]);
        let padded = scalar_problem(2, array![[0.5, 1.0, 2.0, 99.0]]);
        let solver = TrackingSolver::default();
        let a = solver.solve(&exact).expect("solvable");
        let b = solver.solve(&padded).expect("solvable");
        assert_bitwise_eq(&a, &b);
    }

    #[test]
    fn test_cancellation_before_first_stage() {
        let problem = network_problem(10);
        let flag = AtomicBool::new(true);
        let err = TrackingSolver::default()
            .solve_cancellable(&problem, &flag)
            .unwrap_err();
        assert_eq!(err, JumpLqError::Cancelled { stage: 9 });

        flag.store(false, Ordering::SeqCst);
        assert!(TrackingSolver::default()
            .solve_cancellable(&problem, &flag)
            .is_ok());
    }

    #[test]
    fn test_svd_non_convergence_is_degeneracy() {
        let model = JumpLinearModel::single_mode(
            array![[1.0]],
            array![[0.0, 0.0]],
            array![[1.0]],
            array![[2.0, 1.0], [1.0, 3.0]],
        )
        .expect("consistent model");
        let problem =
            TrackingProblem::new(model, array![[1.0]], array![[1.0]], 4, Array2::zeros((1, 5)))
                .expect("valid problem");
        let solver = TrackingSolver::new(SolverConfig {
            max_svd_sweeps: 1,
            ..SolverConfig::default()
        })
        .expect("valid config");
        let err = solver.solve(&problem).unwrap_err();
        assert!(
            matches!(err, JumpLqError::NumericalDegeneracy { stage: 3, mode: 0, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut problem = network_problem(3);
        problem.model.q[[1, 0, 0]] = f64::NAN;
        let err = TrackingSolver::default().solve(&problem).unwrap_err();
        assert!(matches!(err, JumpLqError::Validation(_)), "{err:?}");
    }

    #[test]
    fn test_row_sum_tolerance() {
        let mut problem = network_problem(3);
        problem.transition[[0, 0]] = 0.75;
        let strict = TrackingSolver::new(SolverConfig {
            row_sum_tolerance: Some(1e-9),
            ..SolverConfig::default()
        })
        .expect("valid config");
        assert!(matches!(
            strict.solve(&problem),
            Err(JumpLqError::Validation(_))
        ));
        assert!(TrackingSolver::default().solve(&problem).is_ok());
    }

    #[test]
    fn test_solver_rejects_bad_config() {
        let err = TrackingSolver::new(SolverConfig {
            pinv_rcond: Some(-1.0),
            ..SolverConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, JumpLqError::Config(_)));
    }

    #[test]
    fn test_free_function_layout() {
        let problem = network_problem(6);
        let (gains, feedforward) = solve(
            problem.model.a.clone(),
            problem.model.b.clone(),
            problem.model.q.clone(),
            problem.model.r.clone(),
            problem.transition.clone(),
            problem.terminal_cost.clone(),
            6,
            problem.ref_weightings.clone(),
        )
        .expect("solvable");
        assert_eq!(gains.shape(), &[6, 3, 2, 3]);
        assert_eq!(feedforward.shape(), &[6, 3, 2]);

        let schedule = TrackingSolver::default().solve(&problem).expect("solvable");
        assert_eq!(gains, schedule.gains);
        assert_eq!(feedforward, schedule.feedforward);
    }

    #[test]
    fn test_free_function_rejects_mismatch() {
        let err = solve(
            Array3::ones((2, 1, 1)),
            Array3::ones((2, 1, 1)),
            Array3::ones((2, 1, 1)),
            Array3::ones((2, 1, 1)),
            Array2::eye(3),
            array![[1.0]],
            2,
            Array2::zeros((1, 3)),
        )
        .unwrap_err();
        assert!(err.is_precondition(), "{err:?}");
    }

    #[test]
    fn test_control_input_scalar_tracking() {
        let problem = scalar_problem(2, array![[0.5, 1.0, 2.0]]);
        let schedule = TrackingSolver::default().solve(&problem).expect("solvable");
        let u = schedule
            .control_input(0, 0, array![1.0].view())
            .expect("dims match");
        assert!((u[0] - 0.2).abs() < 1e-14, "u = {}", u[0]);
    }

    #[test]
    fn test_schedule_serde_roundtrip_shapes() {
        let schedule = TrackingSolver::default()
            .solve(&network_problem(2))
            .expect("solvable");
        let json = serde_json::to_string(&schedule).expect("serialisable");
        let back: TrackingSchedule = serde_json::from_str(&json).expect("deserialisable");
        assert_eq!(back.gains.shape(), schedule.gains.shape());
        assert_eq!(back.feedforward.shape(), schedule.feedforward.shape());
    }
}
