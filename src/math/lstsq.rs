//! Linear least squares.
//!
//! We solve
//!
//! ```text
//! minimize ‖A x - b‖₂,   A: m × n, m ≥ n
//! ```
//!
//! by factorizing `A = Q R` and back-substituting `R x = Qᵀ b`. This keeps the
//! conditioning of `A` rather than squaring it the way the normal equations do.
//!
//! `least_squares_normal` is kept as the simpler fallback that forms `AᵀA`; it
//! is only accurate for well-conditioned problems.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{LstsqError, Result};
use crate::math::qr::qr_factorize;

/// Which solver to use for the (sub)problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMethod {
    /// Householder QR + back substitution.
    #[default]
    Qr,
    /// Cholesky on `AᵀA x = Aᵀb`.
    NormalEquations,
}

impl SolveMethod {
    pub fn solve(self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
        match self {
            SolveMethod::Qr => least_squares(a, b),
            SolveMethod::NormalEquations => least_squares_normal(a, b),
        }
    }
}

/// Solve `argmin_x ‖A x - b‖₂` via Householder QR.
pub fn least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    check_problem("least_squares", a, b)?;

    let qr = qr_factorize(a)?;
    let qtb = qr.q.tr_mul(b);
    let tol = pivot_tolerance(&qr.r, a.nrows());

    back_substitute(&qr.r, &qtb, tol)
}

/// Solve the normal equations `AᵀA x = Aᵀb` with a Cholesky factorization.
///
/// Squares the condition number of `A`; prefer [`least_squares`].
pub fn least_squares_normal(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    check_problem("least_squares_normal", a, b)?;

    let ata = a.tr_mul(a);
    let atb = a.tr_mul(b);

    // nalgebra does not report which pivot failed.
    let chol = ata.cholesky().ok_or_else(|| {
        warn!("least_squares_normal: AᵀA is not positive definite");
        LstsqError::SingularSystem { index: 0 }
    })?;

    Ok(chol.solve(&atb))
}

/// Solve the upper triangular system `R x = y`.
///
/// A diagonal entry with magnitude `<= tol`, or one that is not finite, is
/// reported as `SingularSystem` instead of being divided through.
pub fn back_substitute(r: &DMatrix<f64>, y: &DVector<f64>, tol: f64) -> Result<DVector<f64>> {
    let n = r.ncols();
    if r.nrows() != n {
        return Err(LstsqError::dims(
            "back_substitute",
            "square R",
            format!("{}x{}", r.nrows(), n),
        ));
    }
    if y.len() != n {
        return Err(LstsqError::dims("back_substitute", format!("rhs of length {n}"), y.len()));
    }

    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let pivot = r[(i, i)];
        if !pivot.is_finite() || pivot.abs() <= tol {
            warn!("back_substitute: pivot {i} is {pivot:e} (tol {tol:e})");
            return Err(LstsqError::SingularSystem { index: i });
        }

        let mut acc = y[i];
        for k in (i + 1)..n {
            acc -= r[(i, k)] * x[k];
        }
        x[i] = acc / pivot;
    }

    Ok(x)
}

/// `‖A x - b‖₂`.
pub fn residual_norm(a: &DMatrix<f64>, x: &DVector<f64>, b: &DVector<f64>) -> Result<f64> {
    if a.ncols() != x.len() {
        return Err(LstsqError::dims(
            "residual_norm",
            format!("x of length {}", a.ncols()),
            x.len(),
        ));
    }
    if a.nrows() != b.len() {
        return Err(LstsqError::dims(
            "residual_norm",
            format!("b of length {}", a.nrows()),
            b.len(),
        ));
    }

    Ok((a * x - b).norm())
}

fn check_problem(op: &'static str, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<()> {
    let (m, n) = a.shape();
    if m != b.len() {
        return Err(LstsqError::dims(op, format!("b of length {m}"), b.len()));
    }
    if m < n {
        return Err(LstsqError::dims(op, format!("rows >= cols ({n})"), format!("{m}x{n}")));
    }
    if n == 0 {
        return Err(LstsqError::dims(op, "at least one column", "0 columns"));
    }
    Ok(())
}

/// Pivots at or below `max(m, n) · ε · max|R[k,k]|` are treated as zero.
fn pivot_tolerance(r: &DMatrix<f64>, rows: usize) -> f64 {
    let max_diag = r.diagonal().amax();
    let tol = rows.max(r.ncols()) as f64 * f64::EPSILON * max_diag;
    debug!("pivot tolerance {tol:e} (max |R_kk| = {max_diag:e})");
    tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_problem(m: usize, n: usize, seed: u64) -> (DMatrix<f64>, DVector<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = DMatrix::from_fn(m, n, |_, _| rng.r#gen::<f64>());
        let b = DVector::from_fn(m, |_, _| rng.r#gen::<f64>());
        (a, b)
    }

    #[test]
    fn identity_system_is_solved_exactly() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let x = least_squares(&a, &b).unwrap();
        assert!((x - &b).norm() < 1e-14);

        let res = residual_norm(&a, &b, &b).unwrap();
        assert_eq!(res, 0.0);
    }

    #[test]
    fn constant_fit_returns_mean() {
        let a = DMatrix::from_element(3, 1, 1.0);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let x = least_squares(&a, &b).unwrap();
        assert_eq!(x.len(), 1);
        assert!((x[0] - 2.0).abs() < 1e-14, "x = {}", x[0]);

        let res = residual_norm(&a, &x, &b).unwrap();
        assert!((res - 2.0_f64.sqrt()).abs() < 1e-14, "residual = {res}");
    }

    #[test]
    fn line_fit_recovers_exact_coefficients() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let x = least_squares(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
        assert!(residual_norm(&a, &x, &b).unwrap() < 1e-12);
    }

    #[test]
    fn residual_is_orthogonal_to_columns() {
        let (a, b) = random_problem(60, 5, 3);
        let x = least_squares(&a, &b).unwrap();
        let r = &a * &x - &b;
        let grad = a.tr_mul(&r);
        assert!(grad.amax() < 1e-10, "Aᵀ(Ax - b) = {grad}");
    }

    #[test]
    fn normal_equations_agree_on_well_conditioned_input() {
        let (a, b) = random_problem(40, 4, 9);
        let x_qr = least_squares(&a, &b).unwrap();
        let x_ne = least_squares_normal(&a, &b).unwrap();
        assert!((&x_qr - &x_ne).norm() < 1e-8);

        let x_via = SolveMethod::NormalEquations.solve(&a, &b).unwrap();
        assert_eq!(x_via, x_ne);
    }

    #[test]
    fn rank_deficient_matrix_is_singular() {
        // Second column is twice the first.
        let a = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0]);
        let b = DVector::from_row_slice(&[1.0, 0.0, 1.0, 0.0]);
        let err = least_squares(&a, &b).unwrap_err();
        assert_eq!(err, LstsqError::SingularSystem { index: 1 });
    }

    #[test]
    fn zero_matrix_is_singular() {
        let a = DMatrix::<f64>::zeros(4, 2);
        let b = DVector::from_element(4, 1.0);
        assert!(matches!(
            least_squares(&a, &b),
            Err(LstsqError::SingularSystem { .. })
        ));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = DMatrix::<f64>::identity(3, 2);
        let b = DVector::from_element(4, 1.0);
        assert!(matches!(
            least_squares(&a, &b),
            Err(LstsqError::DimensionMismatch { .. })
        ));

        let wide = DMatrix::<f64>::zeros(2, 3);
        let b2 = DVector::from_element(2, 1.0);
        assert!(matches!(
            least_squares(&wide, &b2),
            Err(LstsqError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn residual_rejects_mismatched_rhs() {
        let a = DMatrix::<f64>::identity(3, 2);
        let x = DVector::from_element(2, 1.0);
        let b = DVector::from_element(2, 1.0);
        let err = residual_norm(&a, &x, &b).unwrap_err();
        match err {
            LstsqError::DimensionMismatch { op, expected, got } => {
                assert_eq!(op, "residual_norm");
                assert_eq!(expected, "b of length 3");
                assert_eq!(got, "2");
            }
            other => panic!("unexpected error: {other}"),
        }

        let short_x = DVector::from_element(1, 1.0);
        let b3 = DVector::from_element(3, 1.0);
        assert!(residual_norm(&a, &short_x, &b3).is_err());
    }

    #[test]
    fn huge_entries_solve_without_overflow() {
        let a = DMatrix::from_element(2, 1, 1e155);
        let b = DVector::from_element(2, 1e155);
        let x = least_squares(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-14, "x = {}", x[0]);
    }

    #[test]
    fn tiny_entries_solve_without_underflow() {
        let a = DMatrix::from_element(2, 1, 1e-170);
        let b = DVector::from_row_slice(&[1.0, 0.0]);
        let x = least_squares(&a, &b).unwrap();
        assert!((x[0] / 5e169 - 1.0).abs() < 1e-14, "x = {:e}", x[0]);
    }

    #[test]
    fn non_finite_pivot_is_singular() {
        let r = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, f64::NAN]);
        let y = DVector::from_row_slice(&[1.0, 1.0]);
        let err = back_substitute(&r, &y, 1e-12).unwrap_err();
        assert_eq!(err, LstsqError::SingularSystem { index: 1 });

        let r = DMatrix::from_row_slice(1, 1, &[f64::INFINITY]);
        let err = back_substitute(&r, &DVector::from_element(1, 1.0), 0.0).unwrap_err();
        assert_eq!(err, LstsqError::SingularSystem { index: 0 });
    }

    #[test]
    fn back_substitution_solves_triangular_system() {
        let r = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, -1.0, 0.0, 3.0, 2.0, 0.0, 0.0, 4.0]);
        let x_true = DVector::from_row_slice(&[1.0, -2.0, 0.5]);
        let y = &r * &x_true;
        let x = back_substitute(&r, &y, 0.0).unwrap();
        assert!((x - x_true).norm() < 1e-14);
    }
}
