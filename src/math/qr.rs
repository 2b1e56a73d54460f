//! Householder QR factorization.
//!
//! For a tall matrix `A` (`m × n`, `m ≥ n`) we reduce a working copy to upper
//! triangular form one column at a time:
//!
//! ```text
//! H_{n-1} ⋯ H_1 H_0 A = [R; 0]
//! ```
//!
//! and accumulate `Qᵀ = H_{n-1} ⋯ H_0` alongside. The returned factors are the
//! thin ones: `Q` is `m × n` with orthonormal columns and `R` is `n × n`.
//!
//! Reflections are applied as rank-1 updates to the trailing block, which is
//! the same as forming each full-size `H_j` and multiplying, without the
//! `O(m²)` matrix per column.

use log::trace;
use nalgebra::DMatrix;

use crate::error::{LstsqError, Result};
use crate::math::householder::householder;

/// Thin QR factors of an `m × n` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct QrFactorization {
    /// `m × n`, orthonormal columns.
    pub q: DMatrix<f64>,
    /// `n × n`, upper triangular.
    pub r: DMatrix<f64>,
}

impl QrFactorization {
    /// `Q R`, i.e. the reconstructed input.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.q * &self.r
    }
}

/// Factorize `a` as `Q R`.
///
/// `a` is not modified. Fails with `DimensionMismatch` when `a` has fewer
/// rows than columns.
pub fn qr_factorize(a: &DMatrix<f64>) -> Result<QrFactorization> {
    let (m, n) = a.shape();
    if m < n {
        return Err(LstsqError::dims(
            "qr_factorize",
            format!("rows >= cols ({n})"),
            format!("{m}x{n}"),
        ));
    }
    trace!("qr_factorize: {m}x{n}");

    let mut r = a.clone();
    let mut reflectors = Vec::with_capacity(n);

    for j in 0..n {
        let segment = r.view((j, j), (m - j, 1)).column(0).clone_owned();
        let reflector = householder(&segment)?;

        // Columns left of `j` are already zero in rows `j..`.
        reflector.apply_left(&mut r, j, j);
        for i in (j + 1)..m {
            r[(i, j)] = 0.0;
        }
        reflectors.push(reflector);
    }

    // Before `H_j` is applied, columns `..j` are still `e_k` with zeros in
    // rows `j..`, so only the trailing block changes.
    let mut q = DMatrix::<f64>::identity(m, n);
    for (j, reflector) in reflectors.iter().enumerate().rev() {
        reflector.apply_left(&mut q, j, j);
    }

    let r = r.rows(0, n).into_owned();

    Ok(QrFactorization { q, r })
}
