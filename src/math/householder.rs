//! Householder reflectors.
//!
//! A reflector is stored as `(v, τ)` with `v[0] = 1`, representing
//!
//! ```text
//! H = I - τ v vᵀ
//! ```
//!
//! `H` is symmetric and orthogonal, and maps the input segment `x` onto
//! `‖x‖ e₁`.
//!
//! Numerical notes:
//! - The first entry of the unnormalized vector is `α - ‖x‖`. For `α > 0` that
//!   difference cancels catastrophically when the tail is small, so we use the
//!   algebraically equal form `-σ / (α + ‖x‖)` with `σ = ‖x[1..]‖²`.
//! - `τ = 2 v₀² / (σ + v₀²)`, which lies in `[0, 2]`.
//! - `v` and `τ` do not depend on the scale of `x`, so the segment is divided
//!   by its largest magnitude first. Otherwise `σ` overflows for entries near
//!   `1e155` and underflows to zero for entries near `1e-170`.

use nalgebra::{DMatrix, DVector};

use crate::error::{LstsqError, Result};

/// A single Householder reflection `I - τ v vᵀ`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflector {
    /// Householder vector, normalized so that `v[0] == 1`.
    pub v: DVector<f64>,
    /// Scale in `[0, 2]`; zero means the identity.
    pub tau: f64,
}

impl Reflector {
    /// Whether this reflector is the identity.
    pub fn is_identity(&self) -> bool {
        self.tau == 0.0
    }

    /// Apply `H` from the left to the trailing block `target[row0.., col0..]`.
    ///
    /// The block must have exactly `v.len()` rows. Each column is updated as
    /// a rank-1 correction `b -= τ (vᵀ b) v`, so `H` is never formed.
    pub fn apply_left(&self, target: &mut DMatrix<f64>, row0: usize, col0: usize) {
        if self.is_identity() {
            return;
        }
        debug_assert_eq!(target.nrows() - row0, self.v.len());

        for c in col0..target.ncols() {
            let mut w = 0.0;
            for (i, vi) in self.v.iter().enumerate() {
                w += vi * target[(row0 + i, c)];
            }
            w *= self.tau;
            for (i, vi) in self.v.iter().enumerate() {
                target[(row0 + i, c)] -= w * vi;
            }
        }
    }
}

/// Build the reflector that zeroes every entry of `x` except the first.
pub fn householder(x: &DVector<f64>) -> Result<Reflector> {
    if x.is_empty() {
        return Err(LstsqError::dims("householder", "non-empty vector", "length 0"));
    }

    let mut v = x.clone();
    let scale = x.amax();
    if scale > 0.0 && scale.is_finite() {
        v /= scale;
    }

    let alpha = v[0];
    let sigma = v.rows(1, v.len() - 1).norm_squared();
    v[0] = 1.0;

    if sigma == 0.0 && alpha >= 0.0 {
        return Ok(Reflector { v, tau: 0.0 });
    }

    let t = (alpha * alpha + sigma).sqrt();
    let v0 = if alpha <= 0.0 {
        alpha - t
    } else {
        -sigma / (alpha + t)
    };

    let v0_sq = v0 * v0;
    let tau = 2.0 * v0_sq / (sigma + v0_sq);

    for i in 1..v.len() {
        v[i] /= v0;
    }

    Ok(Reflector { v, tau })
}
