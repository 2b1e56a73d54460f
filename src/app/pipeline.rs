//! Shared "experiment pipeline" logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! problem generation -> exact solve -> sketched solves per size -> residual stats
//!
//! The CLI can then focus on presentation (printing, plotting, exporting).

use chrono::Utc;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::data::{Problem, generate_problem, trial_seed};
use crate::domain::{QrCheck, RunConfig, RunReport, SketchStats};
use crate::error::{AppError, LstsqError};
use crate::math::{
    GaussianEmbedding, QrFactorization, SolveMethod, qr_factorize, residual_norm, sketch_and_solve,
};

/// All computed outputs of a single `lstsq run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub solution: DVector<f64>,
    pub report: RunReport,
}

/// Execute the full experiment and return the computed outputs.
pub fn run_experiment(config: &RunConfig) -> Result<RunOutput, AppError> {
    config.validate()?;

    let problem = generate_problem(config.rows, config.cols, config.seed)?;
    run_experiment_with_problem(config, problem)
}

/// Execute the experiment on a caller-supplied problem.
pub fn run_experiment_with_problem(config: &RunConfig, problem: Problem) -> Result<RunOutput, AppError> {
    if problem.rows() != config.rows || problem.cols() != config.cols {
        return Err(AppError::new(
            2,
            format!(
                "Problem is {}x{} but the configuration expects {}x{}.",
                problem.rows(),
                problem.cols(),
                config.rows,
                config.cols
            ),
        ));
    }

    let method = SolveMethod::from(config.solver);

    // 1) Exact solve.
    let solution = method.solve(&problem.a, &problem.b)?;
    let exact_residual = residual_norm(&problem.a, &solution, &problem.b)?;
    info!("exact residual {exact_residual:.6} ({}x{})", config.rows, config.cols);

    // Below this the exact fit is treated as zero-residual and only the
    // absolute excess is reported.
    let residual_floor = f64::EPSILON.sqrt() * problem.b.norm();

    // 2) Sketched solves, one embedding per trial.
    let mut sketches = Vec::with_capacity(config.sketch_sizes.len());
    for &s in &config.sketch_sizes {
        let residuals = sketch_residuals(&problem, s, config.trials, config.seed, method)?;
        let stats = summarize(s, &residuals, exact_residual, residual_floor);
        debug!(
            "sketch {s}: mean residual {:.6} over {} trials",
            stats.mean_residual, stats.trials
        );
        sketches.push(stats);
    }

    let report = RunReport {
        tool: "lstsq".to_string(),
        generated: Utc::now(),
        rows: config.rows,
        cols: config.cols,
        seed: config.seed,
        solver: config.solver,
        exact_residual,
        sketches,
    };

    Ok(RunOutput { solution, report })
}

/// Residual norms of the sketched solution for each trial.
///
/// Trials are independent, so they run in parallel; each draws its embedding
/// from its own seed.
fn sketch_residuals(
    problem: &Problem,
    sketch_size: usize,
    trials: usize,
    seed: u64,
    method: SolveMethod,
) -> Result<Vec<f64>, LstsqError> {
    (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut builder = GaussianEmbedding::seeded(trial_seed(seed, sketch_size, trial));
            let x = sketch_and_solve(&mut builder, sketch_size, &problem.a, &problem.b, method)?;
            residual_norm(&problem.a, &x, &problem.b)
        })
        .collect()
}

fn summarize(sketch_size: usize, residuals: &[f64], exact_residual: f64, residual_floor: f64) -> SketchStats {
    let trials = residuals.len();
    let mean = residuals.iter().sum::<f64>() / trials.max(1) as f64;
    let min = residuals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = residuals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let relative_excess = (exact_residual > residual_floor).then(|| mean / exact_residual - 1.0);

    SketchStats {
        sketch_size,
        trials,
        mean_residual: mean,
        min_residual: min,
        max_residual: max,
        absolute_excess: mean - exact_residual,
        relative_excess,
    }
}

/// Outputs of `lstsq qr`.
#[derive(Debug, Clone)]
pub struct QrRunOutput {
    pub a: DMatrix<f64>,
    pub factors: QrFactorization,
    pub check: QrCheck,
}

/// Factorize a random `rows × cols` matrix and compare against nalgebra's QR.
pub fn run_qr_check(rows: usize, cols: usize, seed: u64) -> Result<QrRunOutput, AppError> {
    if rows < cols || cols == 0 {
        return Err(AppError::new(
            2,
            format!("QR check needs rows >= cols > 0 (got {rows}x{cols})."),
        ));
    }

    let a = generate_problem(rows, cols, seed)?.a;
    let factors = qr_factorize(&a)?;
    let check = check_factorization(&a, &factors);

    Ok(QrRunOutput { a, factors, check })
}

/// Compute the diagnostics reported by `lstsq qr` for the factors of `a`.
pub fn check_factorization(a: &DMatrix<f64>, qr: &QrFactorization) -> QrCheck {
    let (rows, cols) = a.shape();

    let orthogonality_error = (qr.q.tr_mul(&qr.q) - DMatrix::identity(cols, cols)).norm();
    let a_norm = a.norm();
    let recon = (qr.reconstruct() - a).norm();
    let reconstruction_error = if a_norm > 0.0 { recon / a_norm } else { recon };

    let mut max_below_diagonal: f64 = 0.0;
    for j in 0..cols {
        for i in (j + 1)..cols {
            max_below_diagonal = max_below_diagonal.max(qr.r[(i, j)].abs());
        }
    }

    // Householder QR is unique up to the signs of R's rows.
    let reference = a.clone().qr().r();
    let max_diag_mismatch = (0..cols)
        .map(|i| (qr.r[(i, i)].abs() - reference[(i, i)].abs()).abs())
        .fold(0.0, f64::max);

    QrCheck {
        rows,
        cols,
        orthogonality_error,
        reconstruction_error,
        max_below_diagonal,
        max_diag_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SolverKind;

    fn config(solver: SolverKind) -> RunConfig {
        RunConfig {
            rows: 120,
            cols: 6,
            sketch_sizes: vec![12, 40, 120],
            trials: 8,
            seed: 3,
            solver,
            plot: false,
            plot_width: 60,
            plot_height: 15,
            export_json: None,
            export_csv: None,
        }
    }

    #[test]
    fn experiment_reports_every_sketch_size() {
        let out = run_experiment(&config(SolverKind::Qr)).unwrap();
        let report = &out.report;
        assert_eq!(out.solution.len(), 6);
        assert_eq!(report.sketches.len(), 3);
        assert!(report.exact_residual > 0.0);

        for stats in &report.sketches {
            assert_eq!(stats.trials, 8);
            assert!(stats.min_residual <= stats.mean_residual);
            assert!(stats.mean_residual <= stats.max_residual);
            assert!(stats.min_residual >= report.exact_residual - 1e-9);
            assert!(stats.absolute_excess >= -1e-9);
            assert!(stats.relative_excess.unwrap() >= -1e-9);
        }

        let first = report.sketches.first().unwrap().mean_residual;
        let last = report.sketches.last().unwrap().mean_residual;
        assert!(first > last, "s=12: {first}, s=120: {last}");
    }

    #[test]
    fn experiment_is_reproducible() {
        let a = run_experiment(&config(SolverKind::Qr)).unwrap();
        let b = run_experiment(&config(SolverKind::Qr)).unwrap();
        assert_eq!(a.solution, b.solution);
        assert_eq!(a.report.sketches, b.report.sketches);
    }

    #[test]
    fn solvers_agree_on_random_problem() {
        let qr = run_experiment(&config(SolverKind::Qr)).unwrap();
        let ne = run_experiment(&config(SolverKind::Normal)).unwrap();
        assert!((qr.report.exact_residual - ne.report.exact_residual).abs() < 1e-8);
    }

    #[test]
    fn invalid_config_is_rejected_before_solving() {
        let mut cfg = config(SolverKind::Qr);
        cfg.sketch_sizes = vec![3];
        assert_eq!(run_experiment(&cfg).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn mismatched_problem_is_rejected() {
        let cfg = config(SolverKind::Qr);
        let problem = generate_problem(50, 6, 1).unwrap();
        assert!(run_experiment_with_problem(&cfg, problem).is_err());
    }

    #[test]
    fn zero_exact_residual_keeps_the_absolute_excess() {
        let stats = summarize(4, &[0.5, 1.5], 0.0, 0.0);
        assert_eq!(stats.relative_excess, None);
        assert_eq!(stats.absolute_excess, 1.0);

        let stats = summarize(4, &[0.5, 1.5], 1e-12, 1e-8);
        assert_eq!(stats.relative_excess, None);

        let stats = summarize(4, &[3.0], 2.0, 1e-8);
        assert_eq!(stats.relative_excess, Some(0.5));
        assert_eq!(stats.absolute_excess, 1.0);
    }

    #[test]
    fn square_problem_has_no_relative_excess() {
        let mut cfg = config(SolverKind::Qr);
        cfg.rows = 6;
        cfg.sketch_sizes = vec![6];
        cfg.trials = 2;
        let out = run_experiment(&cfg).unwrap();

        assert!(out.report.exact_residual < 1e-10);
        let stats = &out.report.sketches[0];
        assert_eq!(stats.relative_excess, None);
        assert!((stats.absolute_excess - (stats.mean_residual - out.report.exact_residual)).abs() < 1e-15);
    }

    #[test]
    fn qr_check_is_tight() {
        let out = run_qr_check(40, 7, 5).unwrap();
        let check = &out.check;
        assert_eq!(out.factors.q.shape(), (40, 7));
        assert_eq!((check.rows, check.cols), (40, 7));
        assert!(check.orthogonality_error < 1e-12);
        assert!(check.reconstruction_error < 1e-12);
        assert_eq!(check.max_below_diagonal, 0.0);
        assert!(check.max_diag_mismatch < 1e-10);

        assert!(run_qr_check(3, 4, 0).is_err());
    }
}
